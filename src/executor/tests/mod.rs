//! Tests for the executor
//!
//! Organized by feature area

mod basic_tests;
mod helpers;
