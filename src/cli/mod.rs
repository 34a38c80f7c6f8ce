mod handler;
mod output;

pub use handler::{AppAction, Cli};
pub use output::*;
