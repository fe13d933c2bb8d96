use serde_json::Value;

use super::Outcome;
use crate::html::{el, Node};
use crate::signals::{parse_archive, ArchiveEntry};

/// One card per entry inside a `div.cols` grid. A non-sequence or empty
/// document is `Empty`.
pub fn build(doc: &Value) -> Outcome {
    let entries = parse_archive(doc).unwrap_or_default();
    if entries.is_empty() {
        return Outcome::Empty;
    }
    let list = el("div")
        .class("cols")
        .children(entries.iter().map(card));
    Outcome::Ready(vec![list.into()])
}

fn card(entry: &ArchiveEntry) -> Node {
    el("div")
        .class("card")
        .child(el("h4").text(entry.heading()))
        .child(el("div").class("meta").text(entry.meta_line()))
        .child(el("p").text(entry.summary.clone().unwrap_or_default()))
        .child(
            el("details")
                .child(el("summary").text("More"))
                .child(
                    el("pre")
                        .attr("style", "white-space:pre-wrap")
                        .text(entry.payload_json()),
                ),
        )
        .into()
}
