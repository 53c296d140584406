mod args;
pub mod confirm;

pub use args::{Args, Command, OutputFormat, SelectArgs};
