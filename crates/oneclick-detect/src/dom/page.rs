//! A parsed page with mutation recording.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::Rc;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, RcDom};
use tracing::{debug, warn};

use super::{append, find_element, parent_of, serialize_node, tag_name};
use crate::error::DetectError;

/// Default bound on unprocessed mutation records.
pub const DEFAULT_MAX_PENDING_MUTATIONS: usize = 1024;

/// A change observed after [`Page::observe`].
#[derive(Clone)]
pub enum MutationRecord {
    /// Nodes inserted under `target`.
    ChildList { target: Handle, added: Vec<Handle> },
    /// The backlog overflowed; the whole body has to be scanned again.
    RescanBody,
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationRecord::ChildList { target, added } => f
                .debug_struct("ChildList")
                .field("target", &tag_name(target))
                .field("added", &added.len())
                .finish(),
            MutationRecord::RescanBody => f.write_str("RescanBody"),
        }
    }
}

struct MutationQueue {
    records: VecDeque<MutationRecord>,
    capacity: usize,
    overflowed: bool,
}

impl MutationQueue {
    fn push(&mut self, record: MutationRecord) {
        if self.overflowed {
            return;
        }
        if self.records.len() >= self.capacity {
            warn!(
                capacity = self.capacity,
                "Mutation backlog full, falling back to a full body rescan"
            );
            self.records.clear();
            self.records.push_back(MutationRecord::RescanBody);
            self.overflowed = true;
            return;
        }
        self.records.push_back(record);
    }

    fn drain(&mut self) -> Vec<MutationRecord> {
        self.overflowed = false;
        self.records.drain(..).collect()
    }
}

/// A parsed HTML document.
///
/// Structural changes made through the page are recorded once
/// [`observe`](Page::observe) has been called.
pub struct Page {
    dom: RcDom,
    body: Handle,
    observing: Cell<bool>,
    queue: RefCell<MutationQueue>,
}

impl Page {
    pub fn parse(html: &str) -> Result<Self, DetectError> {
        Self::parse_with_limit(html, DEFAULT_MAX_PENDING_MUTATIONS)
    }

    pub fn parse_with_limit(html: &str, max_pending_mutations: usize) -> Result<Self, DetectError> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let body = find_element(&dom.document, &|node| tag_name(node) == Some("body"))
            .ok_or(DetectError::MissingBody)?;

        Ok(Self {
            dom,
            body,
            observing: Cell::new(false),
            queue: RefCell::new(MutationQueue {
                records: VecDeque::new(),
                capacity: max_pending_mutations.max(1),
                overflowed: false,
            }),
        })
    }

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    pub fn body(&self) -> &Handle {
        &self.body
    }

    /// Start recording insertions.
    pub fn observe(&self) {
        self.observing.set(true);
    }

    /// Stop recording and drop anything pending.
    pub fn disconnect(&self) {
        self.observing.set(false);
        self.queue.borrow_mut().drain();
    }

    pub fn is_observing(&self) -> bool {
        self.observing.get()
    }

    pub fn pending_mutations(&self) -> usize {
        self.queue.borrow().records.len()
    }

    pub fn take_mutations(&self) -> Vec<MutationRecord> {
        self.queue.borrow_mut().drain()
    }

    fn record(&self, target: &Handle, added: Vec<Handle>) {
        if !self.observing.get() || added.is_empty() {
            return;
        }
        self.queue.borrow_mut().push(MutationRecord::ChildList {
            target: target.clone(),
            added,
        });
    }

    pub fn append_child(&self, parent: &Handle, child: Handle) {
        append(parent, child.clone());
        self.record(parent, vec![child]);
    }

    /// Parse `html` as body content and append the resulting nodes to `parent`.
    pub fn insert_html(&self, parent: &Handle, html: &str) -> Vec<Handle> {
        let fragment = parse_document(RcDom::default(), Default::default()).one(html);
        let Some(fragment_body) = find_element(&fragment.document, &|node| {
            tag_name(node) == Some("body")
        }) else {
            return Vec::new();
        };

        let nodes = mem::take(&mut *fragment_body.children.borrow_mut());
        for node in &nodes {
            append(parent, node.clone());
        }
        debug!(count = nodes.len(), "Inserted nodes");
        self.record(parent, nodes.clone());
        nodes
    }

    /// Replace `old` with `replacements`, in place. Returns `false` if `old` is detached.
    pub fn replace_node(&self, old: &Handle, replacements: Vec<Handle>) -> bool {
        let Some(parent) = parent_of(old) else {
            return false;
        };
        let Some(index) = parent
            .children
            .borrow()
            .iter()
            .position(|child| Rc::ptr_eq(child, old))
        else {
            return false;
        };

        for node in &replacements {
            node.parent.set(Some(Rc::downgrade(&parent)));
        }
        parent
            .children
            .borrow_mut()
            .splice(index..=index, replacements.iter().cloned());
        old.parent.set(None);

        self.record(&parent, replacements);
        true
    }

    /// Detach `node` from its parent. Returns `false` if it was already detached.
    pub fn remove_node(&self, node: &Handle) -> bool {
        let Some(parent) = parent_of(node) else {
            return false;
        };
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
        node.parent.set(None);
        true
    }

    /// The whole document as HTML.
    pub fn to_html(&self) -> Result<String, DetectError> {
        serialize_node(&self.dom.document, false)
    }

    /// Inner HTML of the body.
    pub fn body_html(&self) -> Result<String, DetectError> {
        serialize_node(&self.body, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{create_text, text_content};

    #[test]
    fn test_parse_finds_body() {
        let page = Page::parse("<p>hello</p>").unwrap();
        assert_eq!(tag_name(page.body()), Some("body"));
        assert_eq!(page.body_html().unwrap(), "<p>hello</p>");
    }

    #[test]
    fn test_mutations_recorded_only_when_observing() {
        let page = Page::parse("<div id=\"feed\"></div>").unwrap();
        page.insert_html(page.body(), "<p>before</p>");
        assert_eq!(page.pending_mutations(), 0);

        page.observe();
        let added = page.insert_html(page.body(), "<p>after</p><p>more</p>");
        assert_eq!(added.len(), 2);
        let records = page.take_mutations();
        assert_eq!(records.len(), 1);
        match &records[0] {
            MutationRecord::ChildList { added, .. } => assert_eq!(added.len(), 2),
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(page.pending_mutations(), 0);
    }

    #[test]
    fn test_overflow_collapses_to_rescan() {
        let page = Page::parse_with_limit("", 2).unwrap();
        page.observe();
        for _ in 0..5 {
            page.insert_html(page.body(), "<p>x</p>");
        }
        let records = page.take_mutations();
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], MutationRecord::RescanBody));

        page.insert_html(page.body(), "<p>y</p>");
        assert_eq!(page.pending_mutations(), 1);
    }

    #[test]
    fn test_replace_node_keeps_position() {
        let page = Page::parse("<p>a<b>b</b>c</p>").unwrap();
        let paragraph = page.body().children.borrow()[0].clone();
        let first = paragraph.children.borrow()[0].clone();

        let replaced = page.replace_node(
            &first,
            vec![create_text("x"), create_text("y")],
        );
        assert!(replaced);
        assert_eq!(text_content(&paragraph), "xybc");
        assert!(parent_of(&first).is_none());
        assert!(!page.replace_node(&first, Vec::new()));
    }

    #[test]
    fn test_remove_node() {
        let page = Page::parse("<p>a</p><p>b</p>").unwrap();
        let first = page.body().children.borrow()[0].clone();
        assert!(page.remove_node(&first));
        assert_eq!(page.body_html().unwrap(), "<p>b</p>");
        assert!(!page.remove_node(&first));
    }

    #[test]
    fn test_disconnect_drops_pending() {
        let page = Page::parse("").unwrap();
        page.observe();
        page.insert_html(page.body(), "<p>x</p>");
        page.disconnect();
        assert_eq!(page.pending_mutations(), 0);
        page.insert_html(page.body(), "<p>y</p>");
        assert_eq!(page.pending_mutations(), 0);
    }
}
