//! Text node rewriting.

use markup5ever_rcdom::{Handle, NodeData};
use oneclick_protocols::CallError;
use tracing::debug;

use super::page::Page;
use super::{
    attribute, create_element, create_text, find_elements, has_class, is_skipped_element,
    text_content, text_of, within_skipped,
};
use crate::keypad::DialRequest;
use crate::resolver::{NumberCandidate, resolve};

/// Class of the clickable span wrapping a recognised number.
pub const PHONE_CLASS: &str = "vaspian-phone";

const NUMBER_ATTR: &str = "data-phone-number";

/// Rewrite every eligible text node under `root`. Returns the number of spans created.
pub fn rewrite_subtree(page: &Page, root: &Handle) -> usize {
    if within_skipped(root) {
        return 0;
    }

    let mut text_nodes = Vec::new();
    collect_text_nodes(root, &mut text_nodes);

    let spans: usize = text_nodes
        .iter()
        .map(|node| rewrite_text_node(page, node))
        .sum();
    if spans > 0 {
        debug!(spans, "Wrapped phone numbers");
    }
    spans
}

fn collect_text_nodes(node: &Handle, out: &mut Vec<Handle>) {
    match node.data {
        NodeData::Text { .. } => out.push(node.clone()),
        NodeData::Element { .. } if is_skipped_element(node) => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text_nodes(child, out);
            }
        }
    }
}

fn rewrite_text_node(page: &Page, node: &Handle) -> usize {
    let Some(text) = text_of(node) else {
        return 0;
    };
    let candidates = resolve(&text);
    if candidates.is_empty() {
        return 0;
    }

    let (fragment, spans) = build_fragment(&text, &candidates);
    if spans == 0 || !page.replace_node(node, fragment) {
        return 0;
    }
    spans
}

/// Split `text` into literal gaps and clickable spans.
///
/// A candidate starting inside a span already emitted is dropped, so no
/// character of the original text appears twice.
fn build_fragment(text: &str, candidates: &[NumberCandidate]) -> (Vec<Handle>, usize) {
    let mut fragment = Vec::new();
    let mut spans = 0;
    let mut last = 0;

    for candidate in candidates {
        if candidate.start < last {
            continue;
        }
        if candidate.start > last {
            fragment.push(create_text(&text[last..candidate.start]));
        }
        fragment.push(phone_span(candidate));
        spans += 1;
        last = candidate.end();
    }

    if last < text.len() {
        fragment.push(create_text(&text[last..]));
    }
    (fragment, spans)
}

fn phone_span(candidate: &NumberCandidate) -> Handle {
    let title = format!("Click to call {}", candidate.text);
    let number = candidate.dial_string();
    let span = create_element(
        "span",
        &[("class", PHONE_CLASS), ("title", &title), (NUMBER_ATTR, &number)],
    );
    super::append(&span, create_text(&candidate.text));
    span
}

/// A recognised number as it sits in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickableSpan {
    /// Text shown on the page.
    pub text: String,
    /// Canonical dial string.
    pub number: String,
}

impl ClickableSpan {
    pub fn from_element(node: &Handle) -> Option<Self> {
        if !has_class(node, PHONE_CLASS) {
            return None;
        }
        Some(Self {
            text: text_content(node),
            number: attribute(node, NUMBER_ATTR)?,
        })
    }

    /// The request a click on this span submits.
    pub fn dial_request(&self) -> Result<DialRequest, CallError> {
        DialRequest::new(&self.number)
    }
}

/// Every clickable span under `root`, in document order.
pub fn clickable_spans(root: &Handle) -> Vec<ClickableSpan> {
    find_elements(root, &|node| has_class(node, PHONE_CLASS))
        .iter()
        .filter_map(ClickableSpan::from_element)
        .collect()
}

#[cfg(test)]
#[path = "rewriter_tests.rs"]
mod tests;
