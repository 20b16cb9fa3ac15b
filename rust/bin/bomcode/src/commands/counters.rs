//! Counter store management commands.

use std::path::Path;

use anyhow::Result;
use bom::sequence::store::decode_counters;
use bom::{Counters, SequenceStore};

use crate::commands::run::open_store;
use crate::config::ClientConfig;

/// Parse a `GGG=N` operator counter.
pub fn parse_counter(s: &str) -> Result<(String, u64), String> {
    let (group, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected GROUP=N, got \"{}\"", s))?;
    let group = group.trim();
    if !bom::model::is_group_code(group) {
        return Err(format!("group must be three digits, got \"{}\"", group));
    }
    let value = value
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid counter value \"{}\": {}", value, e))?;
    Ok((group.to_string(), value))
}

fn print_counters(counters: &Counters, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(counters)?);
        return Ok(());
    }
    if counters.is_empty() {
        println!("No counters stored.");
        return Ok(());
    }
    println!("{:6} {:>10}", "GROUP", "LAST");
    for (group, value) in counters {
        println!("{:6} {:>10}", group, value);
    }
    Ok(())
}

/// Print stored counters.
pub fn show(config: &ClientConfig, json_output: bool) -> Result<()> {
    let store = open_store(config)?;
    let snapshot = store.load()?;
    if let Some(reason) = &snapshot.corrupt {
        eprintln!("Warning: counter store unreadable ({}); showing empty.", reason);
    }
    print_counters(&snapshot.counters, json_output)
}

/// Raise stored counters. Values below the stored ones are ignored.
pub fn raise(config: &ClientConfig, values: Vec<(String, u64)>) -> Result<()> {
    let manual: Counters = values.into_iter().collect();
    let store = open_store(config)?;
    let after = store.raise(&manual, config.engine.max_commit_attempts)?;
    for (group, requested) in &manual {
        let now = after.get(group).copied().unwrap_or(0);
        if now > *requested {
            println!("Group {}: kept {} (requested {} is lower).", group, now, requested);
        } else {
            println!("Group {}: now {}.", group, now);
        }
    }
    Ok(())
}

/// Merge a JSON counter document (`{"100": 42}`) into the store.
pub fn import(config: &ClientConfig, file: &Path) -> Result<()> {
    let raw = std::fs::read(file)?;
    let imported = decode_counters(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a counter document: {}", file.display(), e))?;
    let store = open_store(config)?;
    let after = store.raise(&imported, config.engine.max_commit_attempts)?;
    println!(
        "Imported {} groups from {}; store now holds {} groups.",
        imported.len(),
        file.display(),
        after.len()
    );
    Ok(())
}

/// Write the stored counters as a JSON document.
pub fn export(config: &ClientConfig, file: Option<&Path>) -> Result<()> {
    let store = open_store(config)?;
    let snapshot = store.load()?;
    let doc = serde_json::to_string_pretty(&snapshot.counters)?;
    match file {
        Some(path) => {
            std::fs::write(path, doc + "\n")?;
            println!("Exported {} groups to {}.", snapshot.counters.len(), path.display());
        }
        None => println!("{}", doc),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counter_values() {
        assert_eq!(parse_counter("100=42"), Ok(("100".to_string(), 42)));
        assert_eq!(parse_counter(" 205 = 7 "), Ok(("205".to_string(), 7)));
        assert!(parse_counter("100").is_err());
        assert!(parse_counter("10=1").is_err());
        assert!(parse_counter("100=-1").is_err());
        assert!(parse_counter("abc=1").is_err());
    }

    #[test]
    fn import_then_export() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ClientConfig {
            store: tmp.path().join("c.redb").to_string_lossy().to_string(),
            ..Default::default()
        };
        let doc = tmp.path().join("state.json");
        std::fs::write(&doc, r#"{"100": 12, "300": 4}"#).unwrap();

        import(&config, &doc).unwrap();
        raise(&config, vec![("100".into(), 5), ("300".into(), 9)]).unwrap();

        let out = tmp.path().join("export.json");
        export(&config, Some(&out)).unwrap();
        let back = decode_counters(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(
            back,
            Counters::from([("100".to_string(), 12), ("300".to_string(), 9)])
        );
    }

    #[test]
    fn import_rejects_garbage() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ClientConfig {
            store: tmp.path().join("c.redb").to_string_lossy().to_string(),
            ..Default::default()
        };
        let doc = tmp.path().join("bad.json");
        std::fs::write(&doc, "[1, 2]").unwrap();
        assert!(import(&config, &doc).is_err());
    }
}
