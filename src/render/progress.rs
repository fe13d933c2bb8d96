use serde_json::Value;

use super::{badge, Outcome};
use crate::html::{el, Node};
use crate::normalize::{display, in_control_label};
use crate::progress::{
    parse_progress, CoachingEntry, SkillTrack, StepRecord, DONE_GLYPH, NOT_DONE_GLYPH,
};

/// One section per skill track, one card per coaching entry, one list item
/// per step. Missing or empty `skills` is `Empty`.
pub fn build(doc: &Value) -> Outcome {
    let skills = parse_progress(doc);
    if skills.is_empty() {
        return Outcome::Empty;
    }
    let outer = el("div")
        .attr("style", "display:grid;gap:1rem")
        .children(skills.iter().map(skill_section));
    Outcome::Ready(vec![outer.into()])
}

fn skill_section(skill: &SkillTrack) -> Node {
    let mut right = el("div").class("meta");
    if let Some(status) = &skill.status {
        right = right.child(badge(status));
    }
    if let Some(updated) = &skill.last_update {
        right = right.child(
            el("span")
                .class("meta")
                .attr("style", "margin-left:.5rem")
                .text(format!("Updated: {}", updated)),
        );
    }

    let header = el("div")
        .attr(
            "style",
            "display:flex;justify-content:space-between;align-items:baseline",
        )
        .child(el("h3").text(skill.label()))
        .child(right);

    let grid = el("div")
        .class("cols")
        .children(skill.coachings.iter().map(coaching_card));

    el("div").class("skill").child(header).child(grid).into()
}

fn coaching_card(entry: &CoachingEntry) -> Node {
    let meta = format!(
        "Target: {} / day · Metric: {} · {}",
        display(entry.steps_target.as_ref()),
        display(entry.steps_metric.as_ref()),
        in_control_label(entry.in_control.as_ref()),
    );

    let mut card = el("div")
        .class("card")
        .child(el("h4").text(entry.display_title()))
        .child(el("div").class("meta").text(meta))
        .child(
            el("div")
                .class("meta")
                .attr("style", "margin:.25rem 0 .5rem")
                .text(format!("Last: {}", display(entry.last_activity.as_ref()))),
        )
        .child(progress_bar(entry.percent()));

    if !entry.steps.is_empty() {
        card = card.child(
            el("ul")
                .class("steps")
                .children(entry.steps.iter().map(step_item)),
        );
    }
    card.into()
}

pub fn progress_bar(percent: u8) -> Node {
    el("div")
        .class("progress-outer")
        .child(
            el("div")
                .class("progress-inner")
                .attr("style", format!("width:{}%", percent))
                .attr("role", "progressbar")
                .attr("aria-valuenow", percent.to_string()),
        )
        .into()
}

fn step_item(step: &StepRecord) -> Node {
    let symbol = if step.is_done() { DONE_GLYPH } else { NOT_DONE_GLYPH };

    let mut bits = Vec::new();
    if let Some(last) = &step.last_activity {
        bits.push(format!("Last: {}", last));
    }
    if let Some(count) = &step.count {
        bits.push(match count {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }

    el("li")
        .class("step")
        .child(
            el("div")
                .class("step-left")
                .child(el("span").class("step-mark").text(symbol))
                .child(
                    el("div")
                        .child(el("div").class("step-title").text(step.display_title()))
                        .child(el("div").class("step-sub").text(bits.join(" · "))),
                ),
        )
        .into()
}
