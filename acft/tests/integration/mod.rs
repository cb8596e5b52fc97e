//! Integration tests for acft
//!
//! These tests build throwaway project/work trees and drive the checkpoint
//! commands end to end, both through the library and the compiled binary.

pub mod cli;
pub mod helpers;
pub mod lifecycle;
pub mod relationships;
pub mod sweep;
