//! Read-only renderer for a static signal board: the latest signal, the
//! signal archive, workflow progress and the README.

pub mod board;
pub mod config;
pub mod fetch;
pub mod html;
pub mod logging;
pub mod markdown;
pub mod normalize;
pub mod panel;
pub mod progress;
pub mod render;
pub mod signals;
