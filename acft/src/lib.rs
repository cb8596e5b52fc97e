pub mod checkpoints;
pub mod commands;
pub mod completions;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod events;
pub mod fs;
pub mod harness;
pub mod parser;
pub mod paths;
pub mod relations;
pub mod utils;
pub mod validation;
