use anyhow::{Context, Result};
use ipmap::loader::{self, EntryFormat};
use ipmap::{IpMap, Match, MatchSource};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// JSON shape of one lookup hit
#[derive(Serialize)]
pub struct MatchOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
    /// `"source": "exact"` with `addr`, or `"source": "range"` with `range`
    #[serde(flatten)]
    pub source: MatchSource,
    pub value: &'a Value,
}

impl<'a> MatchOutput<'a> {
    pub fn new(hit: &Match<'a, Value>) -> Self {
        Self {
            address: None,
            source: hit.source,
            value: hit.value,
        }
    }

    pub fn with_address(mut self, address: &'a str) -> Self {
        self.address = Some(address);
        self
    }
}

/// Load an entry file in the named format
pub fn load_entries(entries: &Path, format: &str) -> Result<IpMap<Value>> {
    let format: EntryFormat = format.parse()?;
    loader::load_files(&[entries], format)
        .with_context(|| format!("Failed to load entries: {}", entries.display()))
}
