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

//! Data block orchestration: format detection and sub-parser dispatch.
//!
//! A data block is either tabular (markdown table with `!`-prefixed
//! header cells) or free-form (`!field value` lines with `!-` record
//! separators). Detection is a pre-scan over the whole block, so a block
//! carrying indicators of both formats fails as `mixed_data_format`
//! before any entry is produced — partial mixing is never attempted.

use crate::convert::ValueConverter;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::DataEntry;
use crate::freeform;
use crate::lex::{BlockType, TokenKind};
use crate::limits::Limits;
use crate::scanner::Block;
use crate::schema::DataSchema;
use crate::table;

/// Diagnostic context threaded through both sub-parsers.
#[derive(Debug, Clone)]
pub(crate) struct BlockCtx {
    pub number: usize,
    pub block_type: BlockType,
    pub schema: String,
}

impl BlockCtx {
    pub fn for_block(block: &Block) -> Self {
        Self {
            number: block.info.number,
            block_type: block.info.block_type,
            schema: block.info.schema_name.clone(),
        }
    }

    /// Stamps block and schema context onto a diagnostic.
    pub fn stamp(&self, d: Diagnostic) -> Diagnostic {
        d.with_schema(&self.schema).in_block(self.number, self.block_type)
    }
}

/// The detected entry format of a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataFormat {
    Tabular,
    Freeform,
    /// Both tabular and free-form indicators present.
    Mixed,
    /// Table rows with no table header anywhere in the block.
    RowsWithoutHeader,
    /// No data-shaped tokens at all.
    Empty,
}

/// Pre-scans a block's tokens to commit to one entry format.
pub(crate) fn detect_format(block: &Block) -> DataFormat {
    let mut has_header = false;
    let mut has_row = false;
    let mut has_freeform = false;
    for token in &block.tokens {
        match token.kind {
            TokenKind::TableHeader => has_header = true,
            TokenKind::TableRow => has_row = true,
            TokenKind::FieldValue | TokenKind::RecordSeparator => has_freeform = true,
            _ => {}
        }
    }
    if (has_header || has_row) && has_freeform {
        DataFormat::Mixed
    } else if has_header {
        DataFormat::Tabular
    } else if has_freeform {
        DataFormat::Freeform
    } else if has_row {
        DataFormat::RowsWithoutHeader
    } else {
        DataFormat::Empty
    }
}

/// Parses a data block against its schema, returning the entries.
///
/// A `Mixed` or header-less block produces zero entries plus one error;
/// the rest of the document is unaffected.
pub(crate) fn parse_data(
    block: &Block,
    schema: &DataSchema,
    limits: &Limits,
    converter: &dyn ValueConverter,
    diags: &mut Vec<Diagnostic>,
) -> Vec<DataEntry> {
    let ctx = BlockCtx::for_block(block);
    match detect_format(block) {
        DataFormat::Tabular => table::parse_table(block, schema, &ctx, limits, converter, diags),
        DataFormat::Freeform => {
            freeform::parse_freeform(block, schema, &ctx, limits, converter, diags)
        }
        DataFormat::Mixed => {
            diags.push(ctx.stamp(Diagnostic::new(
                DiagnosticKind::MixedDataFormat,
                "block mixes tabular and free-form data entries",
                block.info.start_line,
            )));
            Vec::new()
        }
        DataFormat::RowsWithoutHeader => {
            let line = block
                .tokens
                .iter()
                .find(|t| t.kind == TokenKind::TableRow)
                .map(|t| t.line())
                .unwrap_or(block.info.start_line);
            diags.push(ctx.stamp(Diagnostic::new(
                DiagnosticKind::InvalidTableSyntax,
                "table row before any table header",
                line,
            )));
            Vec::new()
        }
        DataFormat::Empty => Vec::new(),
    }
}
