//! Unit tests - pure compilation stages, no files or environment involved
//!
//! Each stage is exercised through the public API only.

mod condition_tests;
mod graph_tests;
