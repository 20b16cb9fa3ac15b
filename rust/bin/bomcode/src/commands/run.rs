//! `bomcode run`: code a BOM export.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use bom::{Batch, CodingEngine, Counters, Inheritance, KvSequenceStore, PartRow, RunOutput};
use bomcode_kv::RedbStore;

use crate::config::ClientConfig;
use crate::tsv;

/// Options for one run, resolved from flags.
pub struct RunOptions<'a> {
    pub input: &'a Path,
    pub out: Option<&'a Path>,
    pub output: &'a str,
    pub counters: Vec<(String, u64)>,
    pub width: Option<usize>,
    pub inherit: bool,
    pub dry_run: bool,
}

/// Open the configured counter store.
pub fn open_store(config: &ClientConfig) -> Result<Arc<KvSequenceStore>> {
    let path = config.store_path();
    tracing::debug!(path = %path.display(), "opening counter store");
    let kv = RedbStore::open(&path)
        .map_err(|e| anyhow::anyhow!("failed to open counter store {}: {}", path.display(), e))?;
    Ok(Arc::new(KvSequenceStore::new(Arc::new(kv))))
}

pub fn run(opts: RunOptions<'_>, config: &ClientConfig) -> Result<()> {
    let text = std::fs::read_to_string(opts.input)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", opts.input.display(), e))?;
    let batch = bom::ingest(tsv::parse(&text));

    let mut engine_config = config.engine.clone();
    if let Some(width) = opts.width {
        engine_config.width = width;
    }
    if opts.inherit {
        engine_config.inheritance = Inheritance::FirstDescendant;
    }

    let manual: Counters = opts.counters.into_iter().collect();
    let output = execute(batch, &manual, engine_config, config, opts.dry_run)?;

    for line in output.log.lines() {
        eprintln!("{}", line);
    }
    if !output.committed {
        eprintln!("Dry run: counter store left unchanged.");
    }

    let rendered = render(&output, opts.output)?;
    match opts.out {
        Some(path) => {
            std::fs::write(path, rendered)?;
            eprintln!("Wrote {} rows to {}", output.rows.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn execute(
    batch: Batch,
    manual: &Counters,
    engine_config: bom::EngineConfig,
    config: &ClientConfig,
    dry_run: bool,
) -> Result<RunOutput> {
    let store = open_store(config)?;
    let engine = CodingEngine::new(engine_config, store)?;
    let output = if dry_run {
        engine.preview(batch, manual)?
    } else {
        engine.run(batch, manual)?
    };
    Ok(output)
}

fn render(output: &RunOutput, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(output)? + "\n"),
        "tsv" => Ok(tsv::render(&output.rows)),
        "table" => Ok(table(&output.rows)),
        other => anyhow::bail!("Unknown output format \"{}\". Use table, json or tsv.", other),
    }
}

fn table(rows: &[PartRow]) -> String {
    let mut out = format!(
        "{:10} {:32} {:20} {:13} {:16} {:16}\n",
        "ITEM", "TITLE", "PART NUMBER", "PROCESS", "FINAL CODE", "PARENT CODE"
    );
    for row in rows {
        let parent = if row.parent_code.is_empty() { "-" } else { &row.parent_code };
        out.push_str(&format!(
            "{:10} {:32} {:20} {:13} {:16} {:16}\n",
            row.item_id,
            truncate(&row.title, 32),
            truncate(&row.part_number, 20),
            row.process_label(),
            row.final_code,
            parent
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max - 1).collect();
    t.push('~');
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> ClientConfig {
        ClientConfig {
            store: dir.join("counters.redb").to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn run_writes_tsv_and_advances_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("bom.tsv");
        let out = tmp.path().join("out.tsv");
        std::fs::write(
            &input,
            "Nº DO ITEM\tTÍTULO\tNº DA PEÇA\tQTD.\tPROCESSO\tGRUPO DE PRODUTO\n\
             1\tCaixa\t12-3456-7890-A\t1\t\t\n\
             1.1\tParafuso\tM6\t4\t\t100 - FIXADORES\n",
        )
        .unwrap();
        let config = config_in(tmp.path());

        let opts = RunOptions {
            input: &input,
            out: Some(&out),
            output: "tsv",
            counters: vec![("100".into(), 9)],
            width: None,
            inherit: false,
            dry_run: false,
        };
        run(opts, &config).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1\tCAIXA\t12-3456-7890-A\tMANUFACTURED\t"));
        assert!(lines[2].contains("\t100-0010\t12-3456-7890-A\t"), "{}", lines[2]);

        let store = open_store(&config).unwrap();
        use bom::SequenceStore;
        assert_eq!(store.load().unwrap().counters["100"], 10);
    }

    #[test]
    fn dry_run_leaves_store_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("bom.tsv");
        std::fs::write(&input, "ITEM ID\tPART NUMBER\tPRODUCT GROUP\n1\tX\t200\n").unwrap();
        let out = tmp.path().join("o.json");
        let config = config_in(tmp.path());

        let opts = RunOptions {
            input: &input,
            out: Some(&out),
            output: "json",
            counters: Vec::new(),
            width: None,
            inherit: false,
            dry_run: true,
        };
        run(opts, &config).unwrap();

        let store = open_store(&config).unwrap();
        use bom::SequenceStore;
        assert!(store.load().unwrap().counters.is_empty());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let output = RunOutput {
            rows: Vec::new(),
            counters: Counters::new(),
            log: bom::RunLog::new(),
            committed: false,
            attempts: 1,
        };
        assert!(render(&output, "xml").is_err());
        assert!(render(&output, "table").unwrap().starts_with("ITEM"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }
}
