//! CLI commands module.

mod classify;
mod config;
mod recognize;
mod replay;
mod util;

pub use classify::ClassifyCommand;
pub use config::ConfigCommand;
pub use recognize::RecognizeCommand;
pub use replay::ReplayCommand;

pub(crate) use util::*;
