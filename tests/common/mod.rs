//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod engine;
pub mod server;
pub mod signers;
