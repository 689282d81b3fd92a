// mdex - Markdown Data Extensions
//
// Copyright (c) 2025 mdex contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tabular data parsing.
//!
//! One markdown table per data block: a header row with `!`-prefixed
//! cells, an optional separator row, then data rows matched to headers
//! positionally. A row whose cell count differs from the header is
//! rejected whole; an empty cell becomes an explicit null.

use crate::convert::ValueConverter;
use crate::data_parser::BlockCtx;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::DataEntry;
use crate::lex::TokenKind;
use crate::limits::Limits;
use crate::scanner::Block;
use crate::schema::DataSchema;
use crate::validate::{check_type_shape, validate_headers, HeaderColumn};
use crate::value::Value;

/// Parses a tabular data block into entries.
pub(crate) fn parse_table(
    block: &Block,
    schema: &DataSchema,
    ctx: &BlockCtx,
    limits: &Limits,
    converter: &dyn ValueConverter,
    diags: &mut Vec<Diagnostic>,
) -> Vec<DataEntry> {
    let mut entries: Vec<DataEntry> = Vec::new();
    let mut headers: Option<Vec<HeaderColumn>> = None;
    // The separator row is only recognized directly after the header.
    let mut separator_window = false;
    let mut entry_limit_hit = false;

    for token in &block.tokens {
        match &token.kind {
            TokenKind::TableHeader => {
                if headers.is_some() {
                    diags.push(ctx.stamp(Diagnostic::new(
                        DiagnosticKind::InvalidTableSyntax,
                        "second table header in block ignored",
                        token.line(),
                    )));
                    continue;
                }
                let cells = split_row(&token.raw);
                let cols = validate_headers(&cells, schema);
                for col in cols.iter().filter(|c| !c.valid) {
                    diags.push(ctx.stamp(
                        Diagnostic::new(
                            DiagnosticKind::InvalidFieldName,
                            format!(
                                "header '{}' is not a field of schema '{}'",
                                col.name, schema.name
                            ),
                            token.line(),
                        )
                        .with_field(&col.name),
                    ));
                }
                headers = Some(cols);
                separator_window = true;
            }
            TokenKind::TableRow => {
                let Some(cols) = &headers else {
                    diags.push(ctx.stamp(Diagnostic::new(
                        DiagnosticKind::InvalidTableSyntax,
                        "table row before table header",
                        token.line(),
                    )));
                    continue;
                };
                let cells = split_row(&token.raw);
                if separator_window && is_separator_row(&cells) {
                    separator_window = false;
                    continue;
                }
                separator_window = false;

                if cells.len() != cols.len() {
                    diags.push(ctx.stamp(Diagnostic::new(
                        DiagnosticKind::ColumnCountMismatch,
                        format!(
                            "row has {} cells but the header declares {}",
                            cells.len(),
                            cols.len()
                        ),
                        token.line(),
                    )));
                    continue;
                }
                if entries.len() >= limits.max_entries_per_block {
                    if !entry_limit_hit {
                        entry_limit_hit = true;
                        diags.push(ctx.stamp(Diagnostic::new(
                            DiagnosticKind::LimitExceeded,
                            format!(
                                "entry count exceeds limit {}",
                                limits.max_entries_per_block
                            ),
                            token.line(),
                        )));
                    }
                    continue;
                }

                let mut entry = DataEntry::new(&schema.name, token.line(), entries.len());
                for (cell, col) in cells.iter().zip(cols.iter()) {
                    if !col.valid {
                        continue;
                    }
                    let Some(field) = schema.field(&col.name) else {
                        continue;
                    };
                    if cell.is_empty() {
                        entry.set(&col.name, Value::Null);
                        continue;
                    }
                    if let Some(problem) = check_type_shape(cell, field) {
                        diags.push(ctx.stamp(
                            Diagnostic::warning(
                                DiagnosticKind::TypeShapeMismatch,
                                problem,
                                token.line(),
                            )
                            .with_field(&col.name),
                        ));
                    }
                    entry.set(&col.name, converter.convert(Some(cell.as_str()), field));
                }
                entries.push(entry);
            }
            TokenKind::Comment | TokenKind::Newline | TokenKind::Eof => {}
            _ => diags.push(ctx.stamp(Diagnostic::new(
                DiagnosticKind::InvalidEntrySyntax,
                format!("unexpected content in tabular data block: '{}'", token.raw),
                token.line(),
            ))),
        }
    }

    entries
}

/// Splits a `|`-delimited row into trimmed cells, dropping the empty
/// edges produced by leading/trailing pipes.
pub(crate) fn split_row(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// A separator row: every cell is dashes with optional alignment colons.
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty()
                && c.contains('-')
                && c.chars().all(|ch| ch == '-' || ch == ':')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DefaultConverter;
    use crate::lex::tokenize;
    use crate::scanner::scan_blocks;
    use crate::schema::{FieldDefinition, FieldType};

    fn schema() -> DataSchema {
        let mut s = DataSchema::new("people", 1);
        s.fields.push(FieldDefinition::new("name", 2));
        let mut age = FieldDefinition::new("age", 3);
        age.field_type = FieldType::Number;
        s.fields.push(age);
        s
    }

    fn parse(input: &str) -> (Vec<DataEntry>, Vec<Diagnostic>) {
        let limits = Limits::default();
        let (tokens, _) = tokenize(input, &limits);
        let mut diags = Vec::new();
        let blocks = scan_blocks(&tokens, &mut diags);
        assert!(diags.is_empty());
        let block = &blocks[0];
        let ctx = BlockCtx::for_block(block);
        let mut out = Vec::new();
        let entries = parse_table(block, &schema(), &ctx, &limits, &DefaultConverter, &mut out);
        (entries, out)
    }

    // ==================== split_row tests ====================

    #[test]
    fn test_split_row_standard() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("|a|b|"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_row_missing_edges() {
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a | b"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_row_empty_cells() {
        assert_eq!(split_row("| a |  | c |"), vec!["a", "", "c"]);
        assert_eq!(split_row("|  |"), vec![""]);
    }

    // ==================== is_separator_row tests ====================

    #[test]
    fn test_separator_rows() {
        assert!(is_separator_row(&split_row("|---|---|")));
        assert!(is_separator_row(&split_row("| :--- | ---: |")));
        assert!(is_separator_row(&split_row("| :-: |")));
        assert!(!is_separator_row(&split_row("| a | --- |")));
        assert!(!is_separator_row(&split_row("| : |")));
    }

    // ==================== parse_table tests ====================

    #[test]
    fn test_basic_table() {
        let (entries, diags) = parse(
            "!? data people\n| !name | !age |\n|---|---|\n| John | 41 |\n| Jane | 38 |\n!#\n",
        );
        assert!(diags.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("name"), Some(&Value::Text("John".into())));
        assert_eq!(entries[0].get("age"), Some(&Value::Number(41.0)));
        assert_eq!(entries[0].record_index, 0);
        assert_eq!(entries[1].record_index, 1);
        assert_eq!(entries[1].line, 5);
    }

    #[test]
    fn test_separator_optional() {
        let (entries, diags) = parse("!? data people\n| !name | !age |\n| John | 41 |\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_headers_without_bang_accepted() {
        let (entries, diags) = parse("!? data people\n| name | age |\n| John | 41 |\n!#\n");
        // The tokenizer only calls a row a header when some cell is
        // `!`-prefixed, so this block has no header at all; parse_table
        // sees rows without a header.
        assert!(entries.is_empty());
        assert!(diags
            .iter()
            .all(|d| d.kind == DiagnosticKind::InvalidTableSyntax));
    }

    #[test]
    fn test_mixed_bang_headers() {
        let (entries, diags) = parse("!? data people\n| !name | age |\n| John | 41 |\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("age"), Some(&Value::Number(41.0)));
    }

    #[test]
    fn test_unknown_header_skipped_rest_populated() {
        let (entries, diags) =
            parse("!? data people\n| !name | !nickname |\n| John | Johnny |\n!#\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidFieldName);
        assert_eq!(diags[0].field, "nickname");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("name"), Some(&Value::Text("John".into())));
        // The invalid column's cell is dropped, not even null.
        assert_eq!(entries[0].get("nickname"), None);
    }

    #[test]
    fn test_column_count_mismatch_rejects_row() {
        let (entries, diags) =
            parse("!? data people\n| !name | !age |\n| John |\n| Jane | 38 |\n!#\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ColumnCountMismatch);
        assert_eq!(diags[0].line, 3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("name"), Some(&Value::Text("Jane".into())));
        assert_eq!(entries[0].record_index, 0);
    }

    #[test]
    fn test_empty_cell_is_null() {
        let (entries, diags) = parse("!? data people\n| !name | !age |\n| John |  |\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(entries[0].get("age"), Some(&Value::Null));
    }

    #[test]
    fn test_type_shape_warning() {
        let (entries, diags) =
            parse("!? data people\n| !name | !age |\n| John | old |\n!#\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::TypeShapeMismatch);
        assert!(!diags[0].is_error());
        // Conversion still happens, best-effort.
        assert_eq!(entries[0].get("age"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_second_header_ignored() {
        let (entries, diags) = parse(
            "!? data people\n| !name | !age |\n| John | 1 |\n| !name | !age |\n| Jane | 2 |\n!#\n",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidTableSyntax);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_late_dash_row_is_data() {
        let (entries, diags) =
            parse("!? data people\n| !name |\n| John |\n| --- |\n!#\n");
        // Only the row directly after the header may be a separator.
        assert!(diags.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].get("name"), Some(&Value::Text("---".into())));
    }

    #[test]
    fn test_entry_limit() {
        let limits = Limits {
            max_entries_per_block: 1,
            ..Limits::default()
        };
        let input = "!? data people\n| !name |\n| a |\n| b |\n| c |\n!#\n";
        let (tokens, _) = tokenize(input, &limits);
        let mut diags = Vec::new();
        let blocks = scan_blocks(&tokens, &mut diags);
        let ctx = BlockCtx::for_block(&blocks[0]);
        let mut out = Vec::new();
        let entries = parse_table(&blocks[0], &schema(), &ctx, &limits, &DefaultConverter, &mut out);
        assert_eq!(entries.len(), 1);
        let limit_errors = out
            .iter()
            .filter(|d| d.kind == DiagnosticKind::LimitExceeded)
            .count();
        assert_eq!(limit_errors, 1);
    }
}
