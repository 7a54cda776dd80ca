use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli_utils::{load_entries, MatchOutput};

/// Look up one address; returns whether anything matched
pub fn cmd_query(
    entries: PathBuf,
    address: String,
    format: String,
    all: bool,
    quiet: bool,
) -> Result<bool> {
    let map = load_entries(&entries, &format)?;

    let hits = if all {
        map.lookup_all(&address)
    } else {
        map.lookup_match(&address)
            .map(|hit| hit.into_iter().collect::<Vec<_>>())
    }
    .with_context(|| format!("Query failed for: {}", address))?;

    if !quiet {
        // Always return an array for consistency
        let results: Vec<MatchOutput<'_>> = hits.iter().map(MatchOutput::new).collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(!hits.is_empty())
}
