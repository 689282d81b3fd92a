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

//! Free-form data parsing.
//!
//! `!field value` assignment lines accumulate into the current record;
//! `!-` (or the end of the block) flushes it. In an assignment the colon
//! takes precedence over the first space as the separator, but only when
//! everything before the colon is a single bare word — so
//! `!name: John: Doe` assigns `John: Doe` to `name`.

use crate::convert::ValueConverter;
use crate::data_parser::BlockCtx;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::DataEntry;
use crate::lex::TokenKind;
use crate::limits::Limits;
use crate::scanner::Block;
use crate::schema::DataSchema;
use crate::validate::check_type_shape;
use crate::value::Value;

/// Parses a free-form data block into entries.
pub(crate) fn parse_freeform(
    block: &Block,
    schema: &DataSchema,
    ctx: &BlockCtx,
    limits: &Limits,
    converter: &dyn ValueConverter,
    diags: &mut Vec<Diagnostic>,
) -> Vec<DataEntry> {
    let mut entries: Vec<DataEntry> = Vec::new();
    let mut current: Option<DataEntry> = None;
    let mut entry_limit_hit = false;

    for token in &block.tokens {
        match &token.kind {
            TokenKind::FieldValue => {
                let (name, value) = split_assignment(&token.raw);
                if name.is_empty() {
                    diags.push(ctx.stamp(Diagnostic::new(
                        DiagnosticKind::InvalidEntrySyntax,
                        "missing field name in assignment",
                        token.line(),
                    )));
                    continue;
                }
                if !schema.has_field(name) {
                    diags.push(ctx.stamp(
                        Diagnostic::new(
                            DiagnosticKind::InvalidFieldName,
                            format!(
                                "field '{}' is not a field of schema '{}'",
                                name, schema.name
                            ),
                            token.line(),
                        )
                        .with_field(name),
                    ));
                    continue;
                }
                let entry = current
                    .get_or_insert_with(|| DataEntry::new(&schema.name, token.line(), 0));
                if value.is_empty() {
                    entry.set(name, Value::Null);
                    continue;
                }
                // Membership was checked just above.
                if let Some(field) = schema.field(name) {
                    if let Some(problem) = check_type_shape(value, field) {
                        diags.push(ctx.stamp(
                            Diagnostic::warning(
                                DiagnosticKind::TypeShapeMismatch,
                                problem,
                                token.line(),
                            )
                            .with_field(name),
                        ));
                    }
                    entry.set(name, converter.convert(Some(value), field));
                }
            }
            TokenKind::RecordSeparator => {
                flush_record(
                    &mut current,
                    &mut entries,
                    ctx,
                    limits,
                    &mut entry_limit_hit,
                    diags,
                    token.line(),
                );
            }
            TokenKind::Comment | TokenKind::Newline | TokenKind::Eof => {}
            _ => diags.push(ctx.stamp(Diagnostic::new(
                DiagnosticKind::InvalidEntrySyntax,
                format!("unexpected content in data block: '{}'", token.raw),
                token.line(),
            ))),
        }
    }
    let last_line = block.info.end_line.unwrap_or(block.info.start_line);
    flush_record(
        &mut current,
        &mut entries,
        ctx,
        limits,
        &mut entry_limit_hit,
        diags,
        last_line,
    );

    entries
}

/// Flushes the in-progress record, dropping it when empty.
fn flush_record(
    current: &mut Option<DataEntry>,
    entries: &mut Vec<DataEntry>,
    ctx: &BlockCtx,
    limits: &Limits,
    entry_limit_hit: &mut bool,
    diags: &mut Vec<Diagnostic>,
    line: usize,
) {
    let Some(mut entry) = current.take() else {
        return;
    };
    if entry.is_empty() {
        return;
    }
    if entries.len() >= limits.max_entries_per_block {
        if !*entry_limit_hit {
            *entry_limit_hit = true;
            diags.push(ctx.stamp(Diagnostic::new(
                DiagnosticKind::LimitExceeded,
                format!("entry count exceeds limit {}", limits.max_entries_per_block),
                line,
            )));
        }
        return;
    }
    entry.record_index = entries.len();
    entries.push(entry);
}

/// Splits an assignment payload into field name and value.
///
/// The colon wins when the text before the first colon is a single bare
/// word; otherwise the first run of whitespace splits.
pub(crate) fn split_assignment(payload: &str) -> (&str, &str) {
    let payload = payload.trim();
    if let Some(colon) = payload.find(':') {
        let head = payload[..colon].trim();
        if !head.is_empty() && !head.contains(char::is_whitespace) {
            return (head, payload[colon + 1..].trim());
        }
    }
    match payload.find(char::is_whitespace) {
        Some(space) => (&payload[..space], payload[space..].trim()),
        None => (payload, ""),
    }
}
