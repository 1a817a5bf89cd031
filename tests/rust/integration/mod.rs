//! Integration tests - whole requests through `QueryCompiler`
//!
//! These tests cover request parsing, configuration loading and the full
//! compile pipeline together.

mod compile_scenarios;
mod request_file_tests;
