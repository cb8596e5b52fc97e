pub mod generator;

pub use generator::{completion_script, Shell};
