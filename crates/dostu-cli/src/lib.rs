pub mod command;
pub mod config;
pub mod render;
pub mod repl;

pub use config::Config;
pub use repl::Repl;
