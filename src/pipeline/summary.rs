// src/pipeline/summary.rs

//! Stage summary aggregation.
//!
//! An aggregator is an ordinary task whose action merges the outputs of
//! its dependencies into one table. Only dependencies that ended the
//! current run successfully are read; files left on disk by earlier failed
//! runs are never picked up. Zero surviving inputs is not an error: the
//! summary is then just the header. Only a failure to read a surviving
//! input or to write the table itself fails the aggregator.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::dag::{AggregateSpec, SummaryKind, TaskId};
use crate::fs::FileSystem;

pub const QC_SUMMARY_HEADER: &str = "Sample,Read Length,Raw reads,Reads after QC";
pub const DGE_SUMMARY_KEY_COLUMNS: &str = "Kingdom,Feature";

/// Fields extracted from one per-sample QC statistics file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QcStats {
    pub read_length: String,
    pub raw_reads: String,
    pub reads_after_qc: String,
}

/// Parse the QC tool's `<sample>.stats.txt`.
///
/// The file is `key: value` lines; reads are counted once before and once
/// after trimming under a `Reads #` key, and the read length under a
/// `Reads Length` key. Percentage suffixes like `950 (95.00 %)` are
/// stripped.
pub fn parse_qc_stats(content: &str) -> Option<QcStats> {
    let mut read_counts: Vec<String> = Vec::new();
    let mut read_length: Option<String> = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value
            .trim()
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if key.eq_ignore_ascii_case("Reads #") {
            read_counts.push(value);
        } else if read_length.is_none()
            && (key.eq_ignore_ascii_case("Reads Length")
                || key.eq_ignore_ascii_case("Mean Reads Length")
                || key.eq_ignore_ascii_case("Read Length"))
        {
            read_length = Some(value);
        }
    }

    Some(QcStats {
        read_length: read_length?,
        raw_reads: read_counts.first()?.clone(),
        reads_after_qc: read_counts.get(1)?.clone(),
    })
}

/// Run one aggregation action.
pub fn run_aggregation(
    spec: &AggregateSpec,
    succeeded_deps: &[TaskId],
    fs: &dyn FileSystem,
) -> Result<()> {
    let succeeded: HashSet<&str> = succeeded_deps.iter().map(|s| s.as_str()).collect();

    let table = match spec.kind {
        SummaryKind::QcStats => aggregate_qc(spec, &succeeded, fs)?,
        SummaryKind::DgeTable => aggregate_dge(spec, &succeeded, fs)?,
    };

    // Write-then-rename: an interrupted write must not leave a partial
    // table satisfying the output target.
    let scratch = crate::fs::scratch_path(&spec.output);
    fs.write(&scratch, table.as_bytes())
        .with_context(|| format!("writing summary table {}", scratch.display()))?;
    fs.rename(&scratch, &spec.output)
        .with_context(|| format!("publishing summary table {}", spec.output.display()))?;

    Ok(())
}

fn aggregate_qc(
    spec: &AggregateSpec,
    succeeded: &HashSet<&str>,
    fs: &dyn FileSystem,
) -> Result<String> {
    let mut table = String::from(QC_SUMMARY_HEADER);
    table.push('\n');

    let mut seen_keys: HashSet<String> = HashSet::new();

    for input in &spec.inputs {
        if !succeeded.contains(input.source.as_str()) {
            debug!(source = %input.source, "skipping non-succeeded dependency");
            continue;
        }

        let sample = input.key.join("/");
        if !seen_keys.insert(sample.clone()) {
            warn!(key = %sample, "duplicate summary key; keeping first occurrence");
            continue;
        }

        let content = fs
            .read_to_string(&input.path)
            .with_context(|| format!("reading QC stats {}", input.path.display()))?;
        let Some(stats) = parse_qc_stats(&content) else {
            bail!("unrecognized QC stats format in {}", input.path.display());
        };

        table.push_str(&format!(
            "{},{},{},{}\n",
            sample, stats.read_length, stats.raw_reads, stats.reads_after_qc
        ));
    }

    Ok(table)
}

fn aggregate_dge(
    spec: &AggregateSpec,
    succeeded: &HashSet<&str>,
    fs: &dyn FileSystem,
) -> Result<String> {
    let mut rows: Vec<String> = Vec::new();
    let mut inner_header: Option<String> = None;
    let mut seen_keys: HashSet<String> = HashSet::new();

    for input in &spec.inputs {
        if !succeeded.contains(input.source.as_str()) {
            debug!(source = %input.source, "skipping non-succeeded dependency");
            continue;
        }

        let key = input.key.join(",");
        if !seen_keys.insert(key.clone()) {
            warn!(key = %key, "duplicate summary key; keeping first occurrence");
            continue;
        }

        let content = fs
            .read_to_string(&input.path)
            .with_context(|| format!("reading DGE table {}", input.path.display()))?;

        let mut lines = content.lines();
        let Some(header) = lines.next() else {
            // Empty table: nothing from this feature, not an error.
            continue;
        };

        match &inner_header {
            None => inner_header = Some(header.to_string()),
            Some(first) if first != header => {
                warn!(
                    path = %input.path.display(),
                    "DGE table header differs from first table; concatenating anyway"
                );
            }
            Some(_) => {}
        }

        for line in lines {
            if line.is_empty() {
                continue;
            }
            rows.push(format!("{key},{line}"));
        }
    }

    let mut table = String::from(DGE_SUMMARY_KEY_COLUMNS);
    if let Some(header) = inner_header {
        table.push(',');
        table.push_str(&header);
    }
    table.push('\n');
    for row in rows {
        table.push_str(&row);
        table.push('\n');
    }

    Ok(table)
}
