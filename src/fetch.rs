//! Document retrieval.
//!
//! A [`Fetcher`] answers GETs for the fixed relative paths the board uses.
//! Non-success statuses come back as an ordinary [`Response`]; only
//! transport problems are errors.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::logging::{log_fetch, log_fetch_failure};

pub const SIGNAL_PATH: &str = "./signals/latest.json";
pub const ARCHIVE_PATH: &str = "./signals/archive.latest.json";
pub const PROGRESS_PATH: &str = "./signals/funnel_progress.json";
pub const README_PATH: &str = "./README.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(404, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("invalid JSON body")
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone()).context("body is not valid UTF-8")
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, path: &str) -> Result<Response>;
}

/// GET with structured logging of the outcome.
pub async fn fetch_logged(fetcher: &dyn Fetcher, path: &str) -> Result<Response> {
    match fetcher.get(path).await {
        Ok(resp) => {
            log_fetch(path, resp.status, &resp.body);
            Ok(resp)
        }
        Err(err) => {
            log_fetch_failure(path, &format!("{:#}", err));
            Err(err)
        }
    }
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).with_context(|| format!("invalid base URL {}", base_url))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("cannot resolve {} against {}", path, self.base))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, path: &str) -> Result<Response> {
        let url = self.resolve(path)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(Response::new(status, body.to_vec()))
    }
}

// =============================================================================
// Local site directory
// =============================================================================

/// Serves paths from a directory, the way a static host would.
pub struct SiteFetcher {
    root: PathBuf,
}

impl SiteFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);
        let mut out = self.root.clone();
        for component in rel.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => out.push(part),
                _ => return Err(anyhow!("path escapes site root: {}", path)),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl Fetcher for SiteFetcher {
    async fn get(&self, path: &str) -> Result<Response> {
        let file = self.resolve(path)?;
        match tokio::fs::read(&file).await {
            Ok(body) => Ok(Response::new(200, body)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Response::not_found()),
            Err(err) => Err(err).with_context(|| format!("reading {}", file.display())),
        }
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Fixed responses keyed by path; unknown paths are 404. Counts requests so
/// callers can check memoization.
#[derive(Default)]
pub struct StaticFetcher {
    routes: Mutex<HashMap<String, std::result::Result<Response, String>>>,
    hits: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, status: u16, body: &str) -> Self {
        self.set(path, Ok(Response::new(status, body.as_bytes())));
        self
    }

    /// Make `path` fail at the transport level with `message`.
    pub fn failing(self, path: &str, message: &str) -> Self {
        self.set(path, Err(message.to_string()));
        self
    }

    fn set(&self, path: &str, entry: std::result::Result<Response, String>) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(path.to_string(), entry);
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn get(&self, path: &str) -> Result<Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .routes
            .lock()
            .map_err(|_| anyhow!("route table poisoned"))?
            .get(path)
            .cloned();
        match entry {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Response::not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn site_fetcher_reads_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("signals")).unwrap();
        std::fs::write(dir.path().join("signals/latest.json"), "{\"title\":\"x\"}").unwrap();

        let f = SiteFetcher::new(dir.path());
        let resp = f.get(SIGNAL_PATH).await.unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.json().unwrap()["title"], "x");

        let missing = f.get(ARCHIVE_PATH).await.unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.is_success());
    }

    #[tokio::test]
    async fn site_fetcher_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let f = SiteFetcher::new(dir.path());
        assert!(f.get("../etc/passwd").await.is_err());
    }

    #[test]
    fn http_fetcher_resolves_relative_paths() {
        let f = HttpFetcher::new("https://example.org/board", Duration::from_secs(1)).unwrap();
        assert_eq!(
            f.resolve(PROGRESS_PATH).unwrap().as_str(),
            "https://example.org/board/signals/funnel_progress.json"
        );
        assert!(HttpFetcher::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn static_fetcher_routes_and_counts() {
        let f = StaticFetcher::new()
            .with(README_PATH, 200, "# hi")
            .failing(ARCHIVE_PATH, "connection refused");
        assert_eq!(f.get(README_PATH).await.unwrap().text().unwrap(), "# hi");
        assert_eq!(f.get(SIGNAL_PATH).await.unwrap().status, 404);
        let err = f.get(ARCHIVE_PATH).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(f.hits(), 3);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(Response::new(200, "{nope").json().is_err());
    }
}
