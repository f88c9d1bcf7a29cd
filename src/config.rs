//! Read-only runtime configuration.
//!
//! Shared across concurrent aggregate calls; nothing here is mutated after
//! construction.

use serde::{Deserialize, Serialize};

/// Tunables for the aggregation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Ceiling on `in`-set query size; matches the remote store's limit.
    pub batch_limit: usize,
    /// Credit weight assumed when course metadata cannot be fetched.
    pub default_course_credits: u32,
    /// Display name substituted for unresolved or corrupt profiles.
    pub unknown_name_placeholder: String,
    /// Capacity of the display-name cache.
    pub name_cache_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            batch_limit: 10,
            default_course_credits: 3,
            unknown_name_placeholder: "Unknown Student (Profile Error)".to_string(),
            name_cache_capacity: 256,
        }
    }
}
