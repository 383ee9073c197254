//! Process settings: a TOML file chosen on the command line, overridable from the environment.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
