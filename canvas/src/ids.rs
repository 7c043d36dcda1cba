//! Entity and map id generation.
//!
//! The model never invents ids itself; it asks an [`IdGenerator`]. Browser
//! builds use [`TimestampIds`], tests use [`SequentialIds`] so assertions can
//! name ids up front.

#[cfg(test)]
#[path = "ids_test.rs"]
mod ids_test;

use std::collections::HashSet;

use crate::consts::ID_SUFFIX_LEN;

/// Source of fresh identifiers.
pub trait IdGenerator {
    /// Produce a new id starting with `prefix`.
    fn next_id(&mut self, prefix: &str) -> String;
}

/// `{prefix}_{epoch_ms}_{random}` ids, never repeated within one generator.
#[derive(Debug, Default)]
pub struct TimestampIds {
    issued: HashSet<String>,
}

impl TimestampIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TimestampIds {
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let id = format!("{prefix}_{}_{}", now_ms(), &suffix[..ID_SUFFIX_LEN]);
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Deterministic `{prefix}_{n}` ids with a counter shared across prefixes.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue counting from `next`.
    #[must_use]
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}_{}", self.next)
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u128 {
    js_sys::Date::now() as u128
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}
