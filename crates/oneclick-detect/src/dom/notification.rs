//! In-page call status notifications.

use markup5ever_rcdom::Handle;

use super::page::Page;
use super::{append, create_element, create_svg_element};
use crate::display::format_for_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// A status box appended to the page body.
///
/// Every element of the box carries marker classes, so the rewriter never
/// wraps the number shown inside it.
pub struct Notification {
    kind: NotificationKind,
    title: String,
    shows_number: bool,
    element: Option<Handle>,
}

impl Notification {
    /// "Calling (716) 923-4121 from 101".
    pub fn calling(number: &str, extension: Option<&str>) -> Self {
        let formatted = format_for_display(number);
        let title = match extension.filter(|ext| !ext.is_empty()) {
            Some(ext) => format!("Calling {} from {}", formatted, ext),
            None => format!("Calling {}", formatted),
        };
        Self {
            kind: NotificationKind::Success,
            title,
            shows_number: true,
            element: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: message.into(),
            shows_number: false,
            element: None,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_attached(&self) -> bool {
        self.element.is_some()
    }

    /// Append the notification to the body. Attaching twice is a no-op.
    pub fn attach(&mut self, page: &Page) -> Handle {
        if let Some(element) = &self.element {
            return element.clone();
        }

        let root_class = format!(
            "vaspian-notification vaspian-notification-{}",
            self.kind.as_str()
        );
        let root = create_element("div", &[("class", &root_class)]);
        let content = create_element("div", &[("class", "vaspian-notification-content")]);
        let icon = create_element("div", &[("class", "vaspian-notification-icon")]);
        append(&icon, self.icon());

        let body = create_element("div", &[("class", "vaspian-notification-body")]);
        let title_class = if self.shows_number {
            "vaspian-notification-number"
        } else {
            "vaspian-notification-title"
        };
        let title = create_element("div", &[("class", title_class)]);
        append(&title, super::create_text(&self.title));
        append(&body, title);

        append(&content, icon);
        append(&content, body);
        append(&root, content);

        page.append_child(page.body(), root.clone());
        self.element = Some(root.clone());
        root
    }

    /// Remove the notification from the page. Returns `false` if it was not attached.
    pub fn detach(&mut self, page: &Page) -> bool {
        match self.element.take() {
            Some(element) => page.remove_node(&element),
            None => false,
        }
    }

    fn icon(&self) -> Handle {
        let svg = create_svg_element("svg", &[("viewBox", "0 0 24 24")]);
        match self.kind {
            NotificationKind::Success => append(
                &svg,
                create_svg_element(
                    "path",
                    &[(
                        "d",
                        "M22 16.92v3a2 2 0 0 1-2.18 2 19.79 19.79 0 0 1-8.63-3.07 19.5 19.5 0 0 1-6-6 \
                         19.79 19.79 0 0 1-3.07-8.67A2 2 0 0 1 4.11 2h3a2 2 0 0 1 2 1.72 12.84 12.84 \
                         0 0 0 .7 2.81 2 2 0 0 1-.45 2.11L8.09 9.91a16 16 0 0 0 6 6l1.27-1.27a2 2 0 0 \
                         1 2.11-.45 12.84 12.84 0 0 0 2.81.7A2 2 0 0 1 22 16.92z",
                    )],
                ),
            ),
            NotificationKind::Error => {
                append(
                    &svg,
                    create_svg_element("circle", &[("cx", "12"), ("cy", "12"), ("r", "10")]),
                );
                append(
                    &svg,
                    create_svg_element(
                        "line",
                        &[("x1", "12"), ("y1", "8"), ("x2", "12"), ("y2", "12")],
                    ),
                );
                append(
                    &svg,
                    create_svg_element(
                        "line",
                        &[("x1", "12"), ("y1", "16"), ("x2", "12.01"), ("y2", "16")],
                    ),
                );
            }
        }
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MutationWatcher, clickable_spans, find_element, has_class, text_content};

    #[test]
    fn test_calling_title() {
        let notification = Notification::calling("7169234121", Some("101"));
        assert_eq!(notification.title(), "Calling (716) 923-4121 from 101");
        assert_eq!(notification.kind(), NotificationKind::Success);

        let notification = Notification::calling("+17169234121", None);
        assert_eq!(notification.title(), "Calling +1 (716) 923-4121");

        let notification = Notification::calling("7169234121", Some(""));
        assert_eq!(notification.title(), "Calling (716) 923-4121");
    }

    #[test]
    fn test_attach_structure() {
        let page = Page::parse("").unwrap();
        let mut notification = Notification::error("Login failed. Please check your credentials.");
        let root = notification.attach(&page);

        assert!(has_class(&root, "vaspian-notification"));
        assert!(has_class(&root, "vaspian-notification-error"));
        let content = find_element(&root, &|n| has_class(n, "vaspian-notification-content"));
        assert!(content.is_some());
        let title = find_element(&root, &|n| has_class(n, "vaspian-notification-title")).unwrap();
        assert_eq!(
            text_content(&title),
            "Login failed. Please check your credentials."
        );
        assert!(find_element(&root, &|n| has_class(n, "vaspian-notification-icon")).is_some());
    }

    #[test]
    fn test_number_in_notification_never_wrapped() {
        let page = Page::parse("").unwrap();
        let watcher = MutationWatcher::new();
        watcher.start(&page);

        let mut notification = Notification::calling("7169234121", Some("101"));
        notification.attach(&page);
        let report = watcher.process(&page);

        assert_eq!(report.spans_created, 0);
        assert!(clickable_spans(page.body()).is_empty());
    }

    #[test]
    fn test_detach() {
        let page = Page::parse("<p>x</p>").unwrap();
        let mut notification = Notification::calling("7169234121", None);
        notification.attach(&page);
        assert!(notification.is_attached());

        assert!(notification.detach(&page));
        assert!(!notification.is_attached());
        assert_eq!(page.body_html().unwrap(), "<p>x</p>");
        assert!(!notification.detach(&page));
    }
}
