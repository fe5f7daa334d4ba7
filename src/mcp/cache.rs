//! Time-bounded in-memory store for the discovered tool listing.
//!
//! Natural expiry and explicit refresh are the only removal paths. The two
//! operations are simple enough to be race-tolerant under last-writer-wins;
//! concurrent discoveries may both write and the last one sticks.

use crate::mcp::client::ToolDescriptor;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    tools: Vec<ToolDescriptor>,
    stored_at: Instant,
    ttl: Duration,
}

#[derive(Default)]
pub struct ToolCache {
    entry: Option<CacheEntry>,
}

impl ToolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the listing while its age is strictly less than its TTL.
    /// A stale entry is cleared as a side effect of the check.
    pub fn get_tools(&mut self) -> Option<Vec<ToolDescriptor>> {
        match &self.entry {
            Some(entry) if entry.stored_at.elapsed() < entry.ttl => Some(entry.tools.clone()),
            Some(_) => {
                self.entry = None;
                None
            }
            None => None,
        }
    }

    pub fn set_tools(&mut self, tools: Vec<ToolDescriptor>, ttl: Option<Duration>) {
        self.entry = Some(CacheEntry {
            tools,
            stored_at: Instant::now(),
            ttl: ttl.unwrap_or(DEFAULT_TTL),
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Host-facing verb; behaviorally identical to [`ToolCache::invalidate`].
    pub fn force_refresh(&mut self) {
        self.invalidate();
    }

    /// Elapsed time since the entry was stored. Diagnostics only; expiry
    /// decisions happen in [`ToolCache::get_tools`].
    pub fn cache_age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|entry| entry.stored_at.elapsed())
    }
}
