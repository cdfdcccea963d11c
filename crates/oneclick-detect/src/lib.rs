//! # OneClick Detect
//!
//! Finds phone numbers in page text and turns them into clickable spans.
//!
//! - [`patterns`]: the ordered recognition rules
//! - [`keypad`]: letter-to-digit mapping and dial string canonicalisation
//! - [`resolver`]: per-text-node candidate resolution
//! - [`dom`]: page model, text rewriter, mutation watcher and notifications
//! - [`site`]: per-site enable/disable gate
//! - [`display`]: human formatting of dialed numbers

pub mod display;
pub mod dom;
mod error;
pub mod keypad;
pub mod patterns;
pub mod resolver;
pub mod site;

pub use display::format_for_display;
pub use dom::{
    ClickableSpan, MutationRecord, MutationWatcher, Notification, NotificationKind, Page,
    WatchReport,
};
pub use error::DetectError;
pub use keypad::{DialRequest, canonical_dial_string, letters_to_digits};
pub use resolver::{NumberCandidate, resolve};
pub use site::click_to_call_enabled;
