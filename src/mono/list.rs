// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono list`: show recorded subtrees.

use std::fmt::Write;

use tracing::warn;

use crate::error::{GmashError, GmashResult};
use crate::mono::Monorepo;
use crate::mono::store::SubtreeRecord;

/// Every readable record, sorted by remote. Corrupt files are logged.
///
/// # Errors
///
/// Returns an error if the metadata directory cannot be listed.
pub fn list_subtrees(repo: &Monorepo) -> GmashResult<Vec<SubtreeRecord>> {
    let mut records: Vec<SubtreeRecord> = repo
        .store()
        .list()?
        .into_iter()
        .filter_map(|stored| match stored.record {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(record = %stored.name, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect();
    records.sort_by(|a, b| a.remote.cmp(&b.remote));
    Ok(records)
}

fn flags(record: &SubtreeRecord) -> String {
    let flags: Vec<&str> = [(record.squash, "squash"), (record.owned, "owned")]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(",")
    }
}

/// Aligned table with a header row.
#[must_use]
pub fn render_table(records: &[SubtreeRecord]) -> String {
    let header = ["REMOTE", "BRANCH", "PREFIX", "URL", "FLAGS"];
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.remote.clone(),
                r.branch.clone(),
                r.prefix.clone(),
                r.url.clone(),
                flags(r),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 5]| {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i + 1 == cells.len() {
                out.push_str(cell);
            } else {
                let _ = write!(out, "{cell:<width$}  ", width = widths[i]);
            }
        }
        out
    };

    std::iter::once(line(header))
        .chain(rows.iter().map(|row| line(row.each_ref().map(String::as_str))))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns `GmashError::Other` if serialization fails.
pub fn render_json(records: &[SubtreeRecord]) -> GmashResult<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| GmashError::Other(e.to_string().into_boxed_str()))
}
