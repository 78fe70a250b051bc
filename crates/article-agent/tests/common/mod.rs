//! Shared test utilities for article-agent integration tests.
//!
//! This module provides:
//! - `TestHarness` for running the pipeline against a canned generator
//! - Builder patterns for plans, requests and config files

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{RecordingProgress, TestHarness};
