//! Common assertion helpers for gitcms command output

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

pub fn setup_incomplete() -> impl Predicate<str> {
    predicates::str::contains("Setup is not complete")
}

pub fn invalid_value(field: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Invalid value for '{field}'"))
}

/// A `key  value` line as printed by the settings summary
pub fn has_setting(key: &str, value: &str) -> impl Predicate<str> {
    predicates::str::contains(key).and(predicates::str::contains(value))
}
