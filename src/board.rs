//! The page: an always-on signal container plus three toggled panels.
//!
//! Each panel sits behind its own lock, held only for synchronous state
//! changes and never across a fetch. Panels share nothing else, so one
//! panel failing or hanging leaves the others alone.

use anyhow::Result;
use futures_util::future::join_all;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::fetch::{fetch_logged, Fetcher, HttpFetcher, SiteFetcher};
use crate::html::{el, render_fragment, Element, Node};
use crate::logging::{log, log_outcome, obj, v_str, Domain, Level, ProfileScope};
use crate::markdown::ReadmeRenderer;
use crate::panel::{Panel, PanelKind, Toggle};
use crate::render::{self, Document, Outcome};

pub struct Board {
    fetcher: Arc<dyn Fetcher>,
    readme: ReadmeRenderer,
    signal: Mutex<Vec<Node>>,
    archive: Mutex<Panel>,
    progress: Mutex<Panel>,
    readme_panel: Mutex<Panel>,
}

impl Board {
    pub fn new(fetcher: Arc<dyn Fetcher>, readme: ReadmeRenderer) -> Self {
        Self {
            fetcher,
            readme,
            signal: Mutex::new(Vec::new()),
            archive: Mutex::new(Panel::new(PanelKind::Archive)),
            progress: Mutex::new(Panel::new(PanelKind::Progress)),
            readme_panel: Mutex::new(Panel::new(PanelKind::Readme)),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = match &cfg.base_url {
            Some(url) => Arc::new(HttpFetcher::new(url, cfg.http_timeout)?),
            None => Arc::new(SiteFetcher::new(cfg.site_root.clone())),
        };
        log(
            Level::Info,
            Domain::System,
            "board.config",
            obj(&[
                (
                    "source",
                    v_str(&cfg
                        .base_url
                        .clone()
                        .unwrap_or_else(|| cfg.site_root.display().to_string())),
                ),
                ("markdown", Value::Bool(cfg.markdown)),
                ("sanitize", Value::Bool(cfg.sanitize)),
            ]),
        );
        Ok(Self::new(
            fetcher,
            ReadmeRenderer::from_flags(cfg.markdown, cfg.sanitize),
        ))
    }

    fn panel_lock(&self, kind: PanelKind) -> MutexGuard<'_, Panel> {
        let lock = match kind {
            PanelKind::Archive => &self.archive,
            PanelKind::Progress => &self.progress,
            PanelKind::Readme => &self.readme_panel,
        };
        lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch and render the landing signal. There is no toggle for it.
    pub async fn boot(&self) {
        let nodes = self.load(Document::Signal).await;
        *self.signal.lock().unwrap_or_else(|p| p.into_inner()) = nodes;
    }

    /// Activate a panel's toggle button. The first expansion performs the
    /// panel's only fetch; everything after reuses what was rendered.
    pub async fn toggle(&self, kind: PanelKind) -> Toggle {
        let effect = self.panel_lock(kind).toggle();
        self.settle(kind, effect).await
    }

    /// Expand every listed panel, concurrently. Panels already expanded stay
    /// expanded; a kind listed twice is opened once.
    pub async fn expand(&self, kinds: &[PanelKind]) {
        let pending: Vec<_> = kinds
            .iter()
            .copied()
            .map(|k| async move {
                let effect = self.panel_lock(k).expand();
                self.settle(k, effect).await
            })
            .collect();
        join_all(pending).await;
    }

    async fn settle(&self, kind: PanelKind, effect: Toggle) -> Toggle {
        if effect == Toggle::ExpandedStartLoad {
            let nodes = self.load(kind.into()).await;
            self.panel_lock(kind).finish_load(nodes);
        }
        effect
    }

    async fn load(&self, doc: Document) -> Vec<Node> {
        let _scope = ProfileScope::with_context(
            Domain::Render,
            doc.as_str(),
            &[("path", v_str(doc.path()))],
        );
        let outcome = self.fetch_outcome(doc).await;
        let items = match &outcome {
            Outcome::Ready(nodes) => nodes.len(),
            _ => 0,
        };
        log_outcome(doc.as_str(), outcome.label(), items);
        outcome.into_nodes(doc)
    }

    async fn fetch_outcome(&self, doc: Document) -> Outcome {
        let resp = match fetch_logged(self.fetcher.as_ref(), doc.path()).await {
            Ok(resp) => resp,
            Err(err) => return Outcome::Unavailable(format!("{:#}", err)),
        };
        if !resp.is_success() {
            return Outcome::Unavailable(doc.status_message().to_string());
        }
        let decoded = match doc {
            Document::Readme => resp.text().map(|md| self.readme_outcome(&md)),
            Document::Signal => resp.json().map(|j| render::signal::build(&j)),
            Document::Archive => resp.json().map(|j| render::archive::build(&j)),
            Document::Progress => resp.json().map(|j| render::progress::build(&j)),
        };
        decoded.unwrap_or_else(|err| Outcome::Unavailable(format!("{:#}", err)))
    }

    fn readme_outcome(&self, markdown: &str) -> Outcome {
        if markdown.trim().is_empty() {
            return Outcome::Empty;
        }
        Outcome::Ready(vec![self.readme.render(markdown)])
    }

    /// Snapshot of a panel's button and container state.
    pub fn panel(&self, kind: PanelKind) -> Panel {
        self.panel_lock(kind).clone()
    }

    pub fn signal_nodes(&self) -> Vec<Node> {
        self.signal.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn signal_html(&self) -> String {
        render_fragment(&self.signal_nodes())
    }

    pub fn container_html(&self, kind: PanelKind) -> String {
        render_fragment(self.panel_lock(kind).content())
    }

    /// The whole page as the host would currently show it.
    pub fn page(&self) -> String {
        let mut body = el("body").child(
            el("section")
                .attr("id", "signal")
                .child(
                    el("div")
                        .attr("id", "signal-container")
                        .children(self.signal_nodes()),
                ),
        );
        for kind in PanelKind::ALL {
            body = body.child(panel_section(&self.panel(kind)));
        }
        let doc: Node = el("html")
            .attr("lang", "en")
            .child(
                el("head")
                    .child(el("meta").attr("charset", "utf-8"))
                    .child(el("title").text("Signal Board")),
            )
            .child(body)
            .into();
        format!("<!doctype html>\n{}\n", doc.to_html())
    }
}

fn panel_section(panel: &Panel) -> Element {
    let name = panel.kind.as_str();
    let mut container = el("div").attr("id", format!("{}-container", name));
    if !panel.is_expanded() {
        container = container.class("hidden");
    }
    el("section")
        .attr("id", name)
        .child(
            el("button")
                .attr("id", format!("{}-toggle", name))
                .attr("aria-expanded", panel.aria_expanded())
                .text(panel.button_label()),
        )
        .child(container.children(panel.content().to_vec()))
}
