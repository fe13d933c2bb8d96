use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory served as the site root when no base URL is set.
    pub site_root: PathBuf,
    /// Fetch over HTTP from here instead of the site root.
    pub base_url: Option<String>,
    pub http_timeout: Duration,
    /// Convert the README from Markdown.
    pub markdown: bool,
    /// Sanitize README HTML; without it the README is shown escaped.
    pub sanitize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            base_url: None,
            http_timeout: Duration::from_secs(10),
            markdown: true,
            sanitize: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            site_root: std::env::var("SIGNALBOARD_SITE")
                .map(PathBuf::from)
                .unwrap_or(defaults.site_root),
            base_url: std::env::var("SIGNALBOARD_BASE_URL").ok().filter(|v| !v.trim().is_empty()),
            http_timeout: std::env::var("SIGNALBOARD_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            markdown: flag("SIGNALBOARD_MARKDOWN").unwrap_or(defaults.markdown),
            sanitize: flag("SIGNALBOARD_SANITIZE").unwrap_or(defaults.sanitize),
        }
    }
}

fn flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert!(c.markdown && c.sanitize);
        assert_eq!(c.http_timeout, Duration::from_secs(10));
        assert!(c.base_url.is_none());
    }
}
