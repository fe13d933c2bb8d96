use serde_json::Value;

use super::{badge, Outcome};
use crate::html::{el, Node};
use crate::normalize::display;
use crate::signals::Signal;

/// The signal summary, inserted as markup without escaping.
///
/// This is the one place document text becomes raw HTML outside the README
/// pipeline. The upstream generator writes simple inline formatting here;
/// if the data source stops being trusted, escape it in this function.
pub fn summary_markup(summary: Option<&Value>) -> Node {
    Node::Raw(display(summary))
}

pub fn build(doc: &Value) -> Outcome {
    match Signal::from_value(doc) {
        Some(signal) => Outcome::Ready(vec![card(&signal)]),
        None => Outcome::Empty,
    }
}

fn labeled(label: &str) -> Node {
    el("strong").text(format!("{}:", label)).into()
}

pub fn card(signal: &Signal) -> Node {
    let mut card = el("div")
        .class("card")
        .child(el("h3").text(signal.heading()))
        .child(
            el("p")
                .child(labeled("Summary"))
                .text(" ")
                .child(summary_markup(signal.summary.as_ref())),
        )
        .child(
            el("p")
                .child(labeled("Broadcast Time"))
                .text(format!(" {}", display(signal.broadcast_time().map(Value::String).as_ref()))),
        )
        .child(
            el("p")
                .child(labeled("Rating"))
                .text(" ")
                .child(badge(signal.rating())),
        );

    if !signal.tags.is_empty() {
        let mut p = el("p").child(labeled("Tags")).text(" ");
        for (i, tag) in signal.tags.iter().enumerate() {
            if i > 0 {
                p = p.text(" ");
            }
            p = p.child(badge(tag));
        }
        card = card.child(p);
    }

    if let Some(notes) = signal.notes() {
        card = card.child(
            el("details")
                .child(el("summary").text("📋 Additional Notes"))
                .child(
                    el("div")
                        .class("card")
                        .attr("style", "padding:.5rem")
                        .text(notes),
                ),
        );
    }

    card.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn html(doc: Value) -> String {
        match build(&doc) {
            Outcome::Ready(nodes) => crate::html::render_fragment(&nodes),
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[test]
    fn summary_is_raw_markup() {
        let out = html(json!({"summary": "Hit <b>10k</b> steps"}));
        assert!(out.contains("<strong>Summary:</strong> Hit <b>10k</b> steps"));
    }

    #[test]
    fn other_fields_are_escaped() {
        let out = html(json!({"title": "<i>t</i>", "tags": ["<b>x</b>"], "rating": "<u>"}));
        assert!(out.contains("<h3>💪 &lt;i&gt;t&lt;/i&gt;</h3>"));
        assert!(out.contains("<span class=\"tag\">&lt;b&gt;x&lt;/b&gt;</span>"));
        assert!(out.contains("<span class=\"tag\">&lt;u&gt;</span>"));
    }

    #[test]
    fn missing_fields_show_placeholder() {
        let out = html(json!({}));
        assert!(out.contains("<strong>Summary:</strong> —"));
        assert!(out.contains("<strong>Broadcast Time:</strong> —"));
        assert!(out.contains("<span class=\"tag\">normal</span>"));
        assert!(!out.contains("Tags:"));
        assert!(!out.contains("details"));
    }

    #[test]
    fn notes_render_as_text() {
        let out = html(json!({"payload": {"notes": "a <b>"}}));
        assert!(out.contains("<summary>📋 Additional Notes</summary>"));
        assert!(out.contains("a &lt;b&gt;"));
    }

    #[test]
    fn non_object_is_empty() {
        assert_eq!(build(&json!("hello")), Outcome::Empty);
    }
}
