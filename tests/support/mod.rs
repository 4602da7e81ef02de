//! Test support module
//!
//! Shared catalog builders and rstest fixtures for integration tests.

#![allow(dead_code)]

pub mod helpers;

pub mod fixtures;
