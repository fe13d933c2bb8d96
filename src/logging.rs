//! Structured logging for the board.
//!
//! Every record is one JSON object per line on stderr (stdout carries the
//! page snapshot). When `LOG_DIR` is set, records are also appended to
//! `<LOG_DIR>/<run_id>/events.jsonl`.
//!
//! Filtering:
//! - `LOG_LEVEL`   minimum level (trace, debug, info, warn, error, fatal)
//! - `LOG_DOMAINS` comma-separated domains, or "all"

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Fetch,  // Document retrieval
    Render, // Fragment construction, placeholders
    Panel,  // Toggle transitions, load state
    System, // Startup, config, output
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Render => "render",
            Domain::Panel => "panel",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let events = std::env::var("LOG_DIR").ok().and_then(|base| {
            let mut run_dir = PathBuf::from(base);
            run_dir.push(&run_id);
            if let Err(err) = create_dir_all(&run_dir) {
                eprintln!("[log] failed to create run dir: {}", err);
                return None;
            }
            match File::create(run_dir.join("events.jsonl")) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(err) => {
                    eprintln!("[log] failed to create events log: {}", err);
                    None
                }
            }
        });
        RunContext { run_id, events }
    })
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }

    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, mut fields: Map<String, Value>) {
    let ctx = ensure_run_context();

    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    if let Some(panel) = fields.remove("panel") {
        entry.insert("panel".to_string(), panel);
    }
    entry.insert("data".to_string(), Value::Object(fields));

    let line = Value::Object(entry).to_string();
    if let Some(events) = &ctx.events {
        write_line(events, &line);
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain helpers
// =============================================================================

/// Log a completed retrieval, with a digest of the body for later comparison.
pub fn log_fetch(path: &str, status: u16, body: &[u8]) {
    log(
        Level::Debug,
        Domain::Fetch,
        "fetch.response",
        obj(&[
            ("path", v_str(path)),
            ("status", json!(status)),
            ("bytes", json!(body.len())),
            ("sha256", v_str(&body_digest(body))),
        ]),
    );
}

/// Log a transport failure. Never fatal.
pub fn log_fetch_failure(path: &str, error: &str) {
    log(
        Level::Warn,
        Domain::Fetch,
        "fetch.failed",
        obj(&[("path", v_str(path)), ("msg", v_str(error))]),
    );
}

pub fn log_panel_transition(panel: &str, from: &str, to: &str, will_load: bool) {
    log(
        Level::Debug,
        Domain::Panel,
        "panel.transition",
        obj(&[
            ("panel", v_str(panel)),
            ("from", v_str(from)),
            ("to", v_str(to)),
            ("load", Value::Bool(will_load)),
        ]),
    );
}

/// Log how a panel's load resolved: ready, empty or unavailable.
pub fn log_outcome(panel: &str, outcome: &str, items: usize) {
    log(
        Level::Info,
        Domain::Render,
        "render.outcome",
        obj(&[
            ("panel", v_str(panel)),
            ("outcome", v_str(outcome)),
            ("items", json!(items)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn body_digest(body: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(body))
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    domain: Domain,
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(domain: Domain, label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            domain,
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, self.domain, "profile", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_matches_severity() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::Fatal.as_str(), "fatal");
    }

    #[test]
    fn digest_is_stable_hex() {
        let d = body_digest(b"{}");
        assert_eq!(d.len(), 64);
        assert_eq!(d, body_digest(b"{}"));
        assert_ne!(d, body_digest(b"[]"));
    }

    #[test]
    fn obj_keeps_pairs() {
        let m = obj(&[("a", v_str("x")), ("b", v_num(1.5))]);
        assert_eq!(m.get("a"), Some(&Value::String("x".into())));
        assert_eq!(m.get("b"), Some(&json!(1.5)));
    }
}
