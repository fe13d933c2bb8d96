//! Render the board for a static site and print the page.
//!
//! Usage:
//!   signalboard [options]
//!
//! Options:
//!   --site=<dir>        Site root to read documents from (default: $SIGNALBOARD_SITE or .)
//!   --base-url=<url>    Fetch documents over HTTP from this base instead
//!   --expand=<panels>   Comma-separated panels to open: archive,progress,readme or all
//!   --out=<file>        Write the page here instead of stdout

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::path::PathBuf;

use signalboard::board::Board;
use signalboard::config::Config;
use signalboard::logging::{log, obj, v_str, Domain, Level};
use signalboard::panel::PanelKind;

#[derive(Debug, Default, PartialEq)]
struct Args {
    site: Option<PathBuf>,
    base_url: Option<String>,
    expand: Vec<PanelKind>,
    out: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    for arg in args {
        if let Some(v) = arg.strip_prefix("--site=") {
            parsed.site = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--base-url=") {
            parsed.base_url = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--expand=") {
            parsed.expand = parse_panels(v)?;
        } else if let Some(v) = arg.strip_prefix("--out=") {
            parsed.out = Some(PathBuf::from(v));
        } else if arg == "--help" || arg == "-h" {
            parsed.help = true;
        } else {
            return Err(anyhow!("unknown argument: {}", arg));
        }
    }
    Ok(parsed)
}

fn parse_panels(list: &str) -> Result<Vec<PanelKind>> {
    if list.trim() == "all" {
        return Ok(PanelKind::ALL.to_vec());
    }
    let mut out = Vec::new();
    for name in list.split(',').filter(|s| !s.trim().is_empty()) {
        let kind = PanelKind::parse(name).ok_or_else(|| anyhow!("unknown panel: {}", name))?;
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    Ok(out)
}

fn print_usage() {
    eprintln!(
        "Usage: signalboard [--site=<dir>] [--base-url=<url>] \
         [--expand=archive,progress,readme|all] [--out=<file>]"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(2);
        }
    };
    if args.help {
        print_usage();
        return Ok(());
    }

    let mut cfg = Config::from_env();
    if let Some(site) = args.site {
        cfg.site_root = site;
        cfg.base_url = None;
    }
    if let Some(url) = args.base_url {
        cfg.base_url = Some(url);
    }

    let board = Board::from_config(&cfg)?;
    board.boot().await;
    board.expand(&args.expand).await;

    let page = board.page();
    match &args.out {
        Some(path) => {
            std::fs::write(path, &page).with_context(|| format!("writing {}", path.display()))?;
            log(
                Level::Info,
                Domain::System,
                "page.written",
                obj(&[
                    ("path", v_str(&path.display().to_string())),
                    ("bytes", json!(page.len())),
                ]),
            );
        }
        None => print!("{}", page),
    }
    Ok(())
}
