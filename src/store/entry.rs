//! Stored Value Module
//!
//! A single in-memory store entry with an absolute expiry.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Value ==
/// A serialized payload plus expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// The stored string
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl StoredValue {
    // == Constructor ==
    /// Creates a value that expires `ttl_secs` from now.
    pub fn new(value: String, ttl_secs: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_secs.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches `expires_at`,
    /// so a zero TTL is expired on arrival.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    /// Remaining lifetime in whole seconds, 0 once expired.
    pub fn ttl_remaining(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms()) / 1000
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
