//! Toggle and load-once state for the collapsible panels.

use crate::html::{el, Node};
use crate::logging::log_panel_transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Archive,
    Progress,
    Readme,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Archive, PanelKind::Progress, PanelKind::Readme];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::Archive => "archive",
            PanelKind::Progress => "progress",
            PanelKind::Readme => "readme",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "archive" => Some(PanelKind::Archive),
            "progress" => Some(PanelKind::Progress),
            "readme" => Some(PanelKind::Readme),
            _ => None,
        }
    }

    /// Noun used in the button label.
    fn noun(&self) -> &'static str {
        match self {
            PanelKind::Archive => "archive",
            PanelKind::Progress => "progress",
            PanelKind::Readme => "README",
        }
    }

    pub fn show_label(&self) -> String {
        format!("Show {}", self.noun())
    }

    pub fn hide_label(&self) -> String {
        format!("Hide {}", self.noun())
    }

    pub fn loading_text(&self) -> String {
        format!("Loading {}...", self.noun())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Collapsed,
    Expanded,
}

impl Visibility {
    fn as_str(&self) -> &'static str {
        match self {
            Visibility::Collapsed => "collapsed",
            Visibility::Expanded => "expanded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// What the caller must do after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Collapsed,
    Expanded,
    /// Expanded for the first time: the caller owns the one load.
    ExpandedStartLoad,
}

/// One panel's button and container, as the host would hold them.
#[derive(Debug, Clone)]
pub struct Panel {
    pub kind: PanelKind,
    visibility: Visibility,
    load: LoadState,
    content: Vec<Node>,
}

impl Panel {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            visibility: Visibility::Collapsed,
            load: LoadState::NotLoaded,
            content: Vec::new(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_expanded(&self) -> bool {
        self.visibility == Visibility::Expanded
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.is_expanded() {
            "true"
        } else {
            "false"
        }
    }

    pub fn button_label(&self) -> String {
        if self.is_expanded() {
            self.kind.hide_label()
        } else {
            self.kind.show_label()
        }
    }

    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// Flip visibility. The first expansion moves `NotLoaded -> Loading`
    /// before returning, so no later toggle can start a second load.
    pub fn toggle(&mut self) -> Toggle {
        match self.visibility {
            Visibility::Expanded => {
                self.visibility = Visibility::Collapsed;
                log_panel_transition(self.kind.as_str(), "expanded", "collapsed", false);
                Toggle::Collapsed
            }
            Visibility::Collapsed => self.expand(),
        }
    }

    /// Expand without ever collapsing. An already expanded panel is left
    /// as is and reports `Expanded`.
    pub fn expand(&mut self) -> Toggle {
        if self.is_expanded() {
            return Toggle::Expanded;
        }
        self.visibility = Visibility::Expanded;
        let effect = if self.load == LoadState::NotLoaded {
            self.load = LoadState::Loading;
            self.content = vec![loading_placeholder(self.kind)];
            Toggle::ExpandedStartLoad
        } else {
            Toggle::Expanded
        };
        log_panel_transition(
            self.kind.as_str(),
            Visibility::Collapsed.as_str(),
            self.visibility.as_str(),
            effect == Toggle::ExpandedStartLoad,
        );
        effect
    }

    /// Install the result of the one load. Content survives later collapses.
    pub fn finish_load(&mut self, content: Vec<Node>) {
        self.content = content;
        self.load = LoadState::Loaded;
    }
}

fn loading_placeholder(kind: PanelKind) -> Node {
    el("p")
        .class("center-muted")
        .child(el("em").text(kind.loading_text()))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_collapsed_and_unloaded() {
        let p = Panel::new(PanelKind::Archive);
        assert_eq!(p.visibility(), Visibility::Collapsed);
        assert_eq!(p.load_state(), LoadState::NotLoaded);
        assert_eq!(p.aria_expanded(), "false");
        assert_eq!(p.button_label(), "Show archive");
    }

    #[test]
    fn first_expand_starts_exactly_one_load() {
        let mut p = Panel::new(PanelKind::Readme);
        assert_eq!(p.toggle(), Toggle::ExpandedStartLoad);
        assert_eq!(p.load_state(), LoadState::Loading);
        assert_eq!(p.button_label(), "Hide README");
        assert_eq!(p.aria_expanded(), "true");

        // Collapse and re-expand while the load is still outstanding.
        assert_eq!(p.toggle(), Toggle::Collapsed);
        assert_eq!(p.toggle(), Toggle::Expanded);
        assert_eq!(p.load_state(), LoadState::Loading);
    }

    #[test]
    fn collapse_keeps_content() {
        let mut p = Panel::new(PanelKind::Progress);
        p.toggle();
        assert_eq!(p.content()[0].text_content(), "Loading progress...");
        p.finish_load(vec![crate::html::text("done")]);
        assert_eq!(p.toggle(), Toggle::Collapsed);
        assert_eq!(p.button_label(), "Show progress");
        assert_eq!(p.content()[0].text_content(), "done");
        assert_eq!(p.toggle(), Toggle::Expanded);
        assert_eq!(p.load_state(), LoadState::Loaded);
    }

    #[test]
    fn expand_never_collapses() {
        let mut p = Panel::new(PanelKind::Archive);
        assert_eq!(p.expand(), Toggle::ExpandedStartLoad);
        assert_eq!(p.expand(), Toggle::Expanded);
        assert!(p.is_expanded());
        assert_eq!(p.load_state(), LoadState::Loading);

        p.toggle();
        assert_eq!(p.expand(), Toggle::Expanded);
        assert!(p.is_expanded());
    }

    #[test]
    fn parses_names() {
        assert_eq!(PanelKind::parse(" README "), Some(PanelKind::Readme));
        assert_eq!(PanelKind::parse("signal"), None);
    }
}
