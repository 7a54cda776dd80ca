use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::load_entries;

pub fn cmd_inspect(entries: PathBuf, format: String, json_output: bool) -> Result<()> {
    let map = load_entries(&entries, &format)?;
    let stats = map.stats();

    if json_output {
        let mut output = json!({
            "file": entries.display().to_string(),
            "format": format,
        });
        if let (serde_json::Value::Object(out), serde_json::Value::Object(counts)) =
            (&mut output, serde_json::to_value(stats)?)
        {
            out.extend(counts);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Entries: {}", entries.display());
        println!("Format:  {}", format);
        println!();
        println!("  Exact addresses: {}", stats.exact_entries);
        println!("  CIDR ranges:     {}", stats.range_entries);
        println!("  Range height:    {}", stats.range_height);
    }

    Ok(())
}
