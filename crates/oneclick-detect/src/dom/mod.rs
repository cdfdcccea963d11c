//! Page model over an `RcDom` tree.

mod notification;
mod page;
mod rewriter;
mod watcher;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::{Attribute, LocalName, QualName, ns, serialize};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};

use crate::error::DetectError;

pub use notification::{Notification, NotificationKind};
pub use page::{MutationRecord, Page};
pub use rewriter::{ClickableSpan, PHONE_CLASS, clickable_spans, rewrite_subtree};
pub use watcher::{MutationWatcher, WatchReport};

/// Classes carried by elements this crate injects. Text under them is never rewritten.
pub const MARKER_CLASSES: [&str; 4] = [
    "vaspian-phone",
    "vaspian-notification",
    "vaspian-notification-content",
    "vaspian-notification-body",
];

pub(crate) fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    new_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
}

pub(crate) fn create_svg_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    new_element(QualName::new(None, ns!(svg), LocalName::from(tag)), attrs)
}

fn new_element(name: QualName, attrs: &[(&str, &str)]) -> Handle {
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

pub(crate) fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Append `child` to `parent`, fixing up the parent pointer.
pub(crate) fn append(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub(crate) fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

/// Local name of an element, `None` for other node kinds.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn attribute(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    attribute(node, "class").is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// Contents of a text node.
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Concatenated text of `node` and its descendants.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

pub(crate) fn is_marker(node: &Handle) -> bool {
    MARKER_CLASSES.iter().any(|class| has_class(node, class))
}

/// Elements whose text is never scanned.
pub(crate) fn is_skipped_element(node: &Handle) -> bool {
    matches!(tag_name(node), Some("script" | "style")) || is_marker(node)
}

/// Whether `node` or any of its ancestors is skipped.
pub(crate) fn within_skipped(node: &Handle) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if is_skipped_element(&n) {
            return true;
        }
        current = parent_of(&n);
    }
    false
}

/// Whether `node` is still attached to a document.
pub(crate) fn is_connected(node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if matches!(current.data, NodeData::Document) {
            return true;
        }
        match parent_of(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Depth-first search for the first descendant element matching `predicate`.
pub fn find_element(root: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in root.children.borrow().iter() {
        if is_element(child) && predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, predicate) {
            return Some(found);
        }
    }
    None
}

/// All descendant elements matching `predicate`, in document order.
pub fn find_elements(root: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Vec<Handle> {
    let mut out = Vec::new();
    collect_elements(root, predicate, &mut out);
    out
}

fn collect_elements(node: &Handle, predicate: &dyn Fn(&Handle) -> bool, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child) && predicate(child) {
            out.push(child.clone());
        }
        collect_elements(child, predicate, out);
    }
}

/// Serialize `node` to HTML, either with or without the node itself.
pub fn serialize_node(node: &Handle, include_node: bool) -> Result<String, DetectError> {
    let opts = SerializeOpts {
        traversal_scope: if include_node {
            TraversalScope::IncludeNode
        } else {
            TraversalScope::ChildrenOnly(None)
        },
        ..Default::default()
    };

    let mut output = Vec::new();
    serialize(&mut output, &SerializableHandle::from(node.clone()), opts)?;
    Ok(String::from_utf8(output)?)
}
