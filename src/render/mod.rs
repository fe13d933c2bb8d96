//! Formatting of fetched documents into fragments, plus the per-document
//! placeholders for the empty and unavailable states.

pub mod archive;
pub mod progress;
pub mod signal;

use crate::fetch::{ARCHIVE_PATH, PROGRESS_PATH, README_PATH, SIGNAL_PATH};
use crate::html::{el, Node};
use crate::panel::PanelKind;

/// The four retrieved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Signal,
    Archive,
    Progress,
    Readme,
}

impl Document {
    pub fn path(&self) -> &'static str {
        match self {
            Document::Signal => SIGNAL_PATH,
            Document::Archive => ARCHIVE_PATH,
            Document::Progress => PROGRESS_PATH,
            Document::Readme => README_PATH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Document::Signal => "signal",
            Document::Archive => "archive",
            Document::Progress => "progress",
            Document::Readme => "readme",
        }
    }

    /// Message used when the response status is not a success.
    pub fn status_message(&self) -> &'static str {
        match self {
            Document::Signal => "Signal data not available",
            Document::Archive => "Archive not available",
            Document::Progress => "Progress data not available",
            Document::Readme => "README not available",
        }
    }

    fn empty_text(&self) -> &'static str {
        match self {
            Document::Signal => "No signal data found.",
            Document::Archive => "No archived signals found.",
            Document::Progress => "No progress data found.",
            Document::Readme => "README is empty.",
        }
    }

    fn unavailable_label(&self) -> &'static str {
        match self {
            Document::Signal => "signal",
            Document::Archive => "archive",
            Document::Progress => "progress",
            Document::Readme => "README",
        }
    }
}

impl From<PanelKind> for Document {
    fn from(kind: PanelKind) -> Self {
        match kind {
            PanelKind::Archive => Document::Archive,
            PanelKind::Progress => Document::Progress,
            PanelKind::Readme => Document::Readme,
        }
    }
}

/// How a load resolved. Shape failures are `Empty`, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ready(Vec<Node>),
    Empty,
    Unavailable(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Ready(_) => "ready",
            Outcome::Empty => "empty",
            Outcome::Unavailable(_) => "unavailable",
        }
    }

    /// Fragment for the container. The landing signal never shows the
    /// underlying error; the opt-in panels do.
    pub fn into_nodes(self, doc: Document) -> Vec<Node> {
        match self {
            Outcome::Ready(nodes) => nodes,
            Outcome::Empty => vec![muted(doc.empty_text())],
            Outcome::Unavailable(_) if doc == Document::Signal => vec![muted(SIGNAL_UNAVAILABLE)],
            Outcome::Unavailable(msg) => vec![el("p")
                .attr("style", "color:#b00;")
                .child(el("em").text(format!(
                    "Unable to load {}: {}",
                    doc.unavailable_label(),
                    msg
                )))
                .into()],
        }
    }
}

pub const SIGNAL_UNAVAILABLE: &str =
    "Signal data not yet available. Generate signals/latest.json to see broadcast information.";

pub(crate) fn muted(s: &str) -> Node {
    el("p").class("center-muted").child(el("em").text(s)).into()
}

/// Inline `span.tag` badge.
pub(crate) fn badge(s: &str) -> Node {
    el("span").class("tag").text(s).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::render_fragment;

    #[test]
    fn signal_hides_error_text() {
        let nodes = Outcome::Unavailable("boom".into()).into_nodes(Document::Signal);
        let html = render_fragment(&nodes);
        assert!(html.contains("Signal data not yet available"));
        assert!(!html.contains("boom"));
    }

    #[test]
    fn panels_show_error_text_escaped() {
        let html =
            render_fragment(&Outcome::Unavailable("<x>".into()).into_nodes(Document::Archive));
        assert_eq!(
            html,
            "<p style=\"color:#b00;\"><em>Unable to load archive: &lt;x&gt;</em></p>"
        );
    }

    #[test]
    fn empty_differs_from_unavailable() {
        let empty = render_fragment(&Outcome::Empty.into_nodes(Document::Progress));
        assert_eq!(empty, "<p class=\"center-muted\"><em>No progress data found.</em></p>");
        let gone =
            render_fragment(&Outcome::Unavailable("x".into()).into_nodes(Document::Progress));
        assert_ne!(empty, gone);
    }
}
