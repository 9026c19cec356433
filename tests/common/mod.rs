//! Shared helpers for integration tests against real git repositories.

pub mod assertions;
pub mod fixtures;
pub mod repository;
