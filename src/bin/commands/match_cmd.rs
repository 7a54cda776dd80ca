use anyhow::{Context, Result};
use ipmap::file_reader;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use crate::cli_utils::{load_entries, MatchOutput};

#[derive(Default)]
struct MatchStats {
    lines: u64,
    matches: u64,
    misses: u64,
    skipped: u64,
}

pub fn cmd_match(
    entries: PathBuf,
    inputs: Vec<PathBuf>,
    format: String,
    show_stats: bool,
) -> Result<()> {
    let start = Instant::now();
    let map = load_entries(&entries, &format)?;
    let load_time = start.elapsed();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut stats = MatchStats::default();
    let mut line = Vec::new();

    for input in &inputs {
        let mut reader = file_reader::open(input)
            .with_context(|| format!("Failed to open input file: {}", input.display()))?;

        while file_reader::read_line(&mut reader, &mut line)
            .with_context(|| format!("Failed to read: {}", input.display()))?
        {
            let text = line.trim_ascii();
            if text.is_empty() {
                continue;
            }
            stats.lines += 1;

            // Non-UTF-8 and non-address lines are skipped, not fatal
            let Ok(address) = std::str::from_utf8(text) else {
                stats.skipped += 1;
                continue;
            };
            match map.lookup_match(address) {
                Ok(Some(hit)) => {
                    stats.matches += 1;
                    let output = MatchOutput::new(&hit).with_address(address);
                    serde_json::to_writer(&mut out, &output)?;
                    out.write_all(b"\n")?;
                }
                Ok(None) => stats.misses += 1,
                Err(err) => {
                    debug!(line = address, %err, "skipping line");
                    stats.skipped += 1;
                }
            }
        }
    }
    out.flush()?;

    if show_stats {
        let elapsed = start.elapsed();
        eprintln!("[INFO] Entries loaded:   {:.2?}", load_time);
        eprintln!("[INFO] Lines processed:  {}", stats.lines);
        eprintln!("[INFO] Matches:          {}", stats.matches);
        eprintln!("[INFO] Misses:           {}", stats.misses);
        eprintln!("[INFO] Skipped:          {}", stats.skipped);
        eprintln!("[INFO] Total time:       {:.2?}", elapsed);
    }

    Ok(())
}
