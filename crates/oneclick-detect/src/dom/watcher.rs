//! Rewrites content inserted after the initial scan.

use markup5ever_rcdom::Handle;
use tracing::debug;

use super::page::{MutationRecord, Page};
use super::rewriter::rewrite_subtree;
use super::{is_connected, is_element, within_skipped};

/// Counters for one [`MutationWatcher::process`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchReport {
    pub records: usize,
    pub subtrees_scanned: usize,
    pub spans_created: usize,
    pub body_rescans: usize,
}

/// Drives the rewriter from a page's mutation records.
///
/// Only inserted element nodes are scanned, each on its own subtree. Bare
/// text nodes inserted directly are not picked up.
#[derive(Debug, Default, Clone, Copy)]
pub struct MutationWatcher;

impl MutationWatcher {
    pub fn new() -> Self {
        Self
    }

    /// Initial pass over the body, then start observing. Returns the spans created.
    pub fn start(&self, page: &Page) -> usize {
        let spans = rewrite_subtree(page, page.body());
        page.observe();
        debug!(spans, "Initial scan complete, observing insertions");
        spans
    }

    pub fn stop(&self, page: &Page) {
        page.disconnect();
    }

    /// Handle pending records until the queue is empty.
    ///
    /// The rewriter's own replacements are recorded too; they only add text
    /// nodes and marked spans, so the next round is a no-op.
    pub fn process(&self, page: &Page) -> WatchReport {
        let mut report = WatchReport::default();

        loop {
            let records = page.take_mutations();
            if records.is_empty() {
                break;
            }
            for record in records {
                report.records += 1;
                match record {
                    MutationRecord::ChildList { added, .. } => {
                        for node in added.iter().filter(|node| should_scan(node)) {
                            report.subtrees_scanned += 1;
                            report.spans_created += rewrite_subtree(page, node);
                        }
                    }
                    MutationRecord::RescanBody => {
                        report.body_rescans += 1;
                        report.spans_created += rewrite_subtree(page, page.body());
                    }
                }
            }
        }

        if report.spans_created > 0 {
            debug!(
                subtrees = report.subtrees_scanned,
                spans = report.spans_created,
                "Wrapped numbers in inserted content"
            );
        }
        report
    }
}

fn should_scan(node: &Handle) -> bool {
    is_element(node) && is_connected(node) && !within_skipped(node)
}
