//! Consolidated test utilities for gitcms
//!
//! Integration tests run against real git repositories in temporary
//! directories, with config and cache directories isolated per test.

pub mod assertions;
pub mod fixtures;
pub mod repository;
