use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, info};

use crate::db::RawSnapshot;

/// A data row and the file line it starts on
#[derive(Debug, Clone)]
pub struct CsvRow {
    pub line: usize,
    pub snapshot: RawSnapshot,
}

#[derive(Debug)]
struct CsvColumnMapping {
    date: usize,
    total_assets: usize,
    net_flow: Option<usize>,
    note: Option<usize>,
}

/// Read a snapshot export (`date, total_assets, net_flow, note`) without
/// interpreting the amounts.
///
/// Headers are matched case-insensitively and ignore spaces/underscores, so
/// `Total_Assets`, `total assets` and `TotalAssets` all work. `net_flow` and
/// `note` columns are optional. Blank lines and quoted multi-line cells are
/// accounted for in each row's `line`.
pub fn parse_snapshot_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<CsvRow>> {
    let path = file_path.as_ref();
    info!("Parsing snapshot CSV file: {:?}", path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file {:?}", path))?;
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let mapping = find_columns(&headers)?;
    debug!("Column mapping: {:?}", mapping);

    let mut lines = LineCounter::new(content);
    let mut rows = Vec::new();
    for (record_idx, result) in reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|pos| lines.line_at(pos.byte() as usize))
            .unwrap_or(record_idx + 2);

        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        rows.push(CsvRow {
            line,
            snapshot: RawSnapshot {
                date: record.get(mapping.date).unwrap_or_default().to_string(),
                total_assets: field(Some(mapping.total_assets)),
                net_flow: field(mapping.net_flow),
                note: field(mapping.note),
            },
        });
    }

    info!("Read {} snapshot rows from CSV", rows.len());
    Ok(rows)
}

/// Maps record byte offsets to 1-based file lines. A record's offset may
/// point at blank lines before it, which are skipped. Offsets must not
/// decrease between calls.
struct LineCounter<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            bytes: content.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let offset = offset.clamp(self.pos, self.bytes.len());
        let start = self.bytes[offset..]
            .iter()
            .position(|b| *b != b'\n' && *b != b'\r')
            .map_or(self.bytes.len(), |skip| offset + skip);
        self.line += self.bytes[self.pos..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.pos = start;
        self.line
    }
}

fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else if header.contains('\t') && !header.contains(',') {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn find_columns(headers: &StringRecord) -> Result<CsvColumnMapping> {
    let mut date = None;
    let mut total_assets = None;
    let mut net_flow = None;
    let mut note = None;

    for (idx, header) in headers.iter().enumerate() {
        match normalize_header(header).as_str() {
            "date" => date = date.or(Some(idx)),
            "totalassets" | "assets" | "networth" => total_assets = total_assets.or(Some(idx)),
            "netflow" | "flow" | "cashflow" => net_flow = net_flow.or(Some(idx)),
            "note" | "notes" => note = note.or(Some(idx)),
            _ => {}
        }
    }

    Ok(CsvColumnMapping {
        date: date.ok_or_else(|| anyhow!("CSV has no 'date' column"))?,
        total_assets: total_assets.ok_or_else(|| anyhow!("CSV has no 'total_assets' column"))?,
        net_flow,
        note,
    })
}
