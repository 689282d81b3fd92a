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

//! Top-level document parsing.
//!
//! The pipeline runs in phases over the whole in-memory document:
//! tokenize, scan block structure, route each closed block to the schema
//! or data parser, aggregate. Each block is processed behind a panic
//! guard: a fault inside one block becomes a single `internal_error`
//! diagnostic and the remaining blocks still parse.

use crate::cache::SchemaCache;
use crate::convert::{DefaultConverter, ValueConverter};
use crate::data_parser;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::DataEntry;
use crate::lex::{self, BlockType};
use crate::limits::Limits;
use crate::result::ParseResult;
use crate::scanner::{self, Block};
use crate::schema::DataSchema;
use crate::schema_parser;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

/// Options for one parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Resource limits.
    pub limits: Limits,
}

impl ParseOptions {
    /// Creates a builder with default options.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Fluent builder for [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    limits: Limits,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum input size in bytes.
    pub fn max_input_size(mut self, size: usize) -> Self {
        self.limits.max_input_size = size;
        self
    }

    /// Maximum line length in bytes.
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.limits.max_line_length = length;
        self
    }

    /// Maximum fields per schema.
    pub fn max_schema_fields(mut self, count: usize) -> Self {
        self.limits.max_schema_fields = count;
        self
    }

    /// Maximum entries per data block.
    pub fn max_entries_per_block(mut self, count: usize) -> Self {
        self.limits.max_entries_per_block = count;
        self
    }

    /// Maximum blocks per document.
    pub fn max_blocks(mut self, count: usize) -> Self {
        self.limits.max_blocks = count;
        self
    }

    pub fn build(self) -> ParseOptions {
        ParseOptions {
            limits: self.limits,
        }
    }
}

/// Parses a document with a fresh schema cache and default options.
pub fn parse(input: &str) -> ParseResult {
    let mut cache = SchemaCache::new();
    parse_with_cache(input, &mut cache)
}

/// Parses a document against a caller-owned schema cache.
///
/// Schemas defined by the document are stored into the cache; schemas
/// already present (for example pre-populated for external references)
/// are visible to the document's data blocks.
pub fn parse_with_cache(input: &str, cache: &mut SchemaCache) -> ParseResult {
    parse_with_options(input, &ParseOptions::default(), cache)
}

/// Parses a document with explicit options.
pub fn parse_with_options(
    input: &str,
    options: &ParseOptions,
    cache: &mut SchemaCache,
) -> ParseResult {
    parse_with_converter(input, options, cache, &DefaultConverter)
}

/// Parses a document with a custom value converter.
pub fn parse_with_converter(
    input: &str,
    options: &ParseOptions,
    cache: &mut SchemaCache,
    converter: &dyn ValueConverter,
) -> ParseResult {
    let started = Instant::now();
    let mut result = ParseResult::new();
    result.metadata.total_lines = input.split('\n').count();

    if input.len() > options.limits.max_input_size {
        result.push_diagnostic(Diagnostic::new(
            DiagnosticKind::LimitExceeded,
            format!(
                "input size {} exceeds limit {}",
                input.len(),
                options.limits.max_input_size
            ),
            1,
        ));
        result.metadata.parse_time_ms = started.elapsed().as_millis() as u64;
        return result;
    }

    let (tokens, lex_diags) = lex::tokenize(input, &options.limits);
    for d in lex_diags {
        result.push_diagnostic(d);
    }

    let mut scan_diags = Vec::new();
    let mut blocks = scanner::scan_blocks(&tokens, &mut scan_diags);
    for d in scan_diags {
        result.push_diagnostic(d);
    }

    if blocks.len() > options.limits.max_blocks {
        result.push_diagnostic(Diagnostic::new(
            DiagnosticKind::LimitExceeded,
            format!(
                "block count {} exceeds limit {}",
                blocks.len(),
                options.limits.max_blocks
            ),
            blocks[options.limits.max_blocks].info.start_line,
        ));
        blocks.truncate(options.limits.max_blocks);
    }

    for block in &blocks {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut local = Vec::new();
            let routed = route_block(block, cache, &options.limits, converter, &mut local);
            (routed, local)
        }));
        match outcome {
            Ok((routed, local)) => {
                for d in local {
                    result.push_diagnostic(d);
                }
                match routed {
                    Routed::Schema(Some(schema)) => {
                        cache.set(schema.name.clone(), schema.clone());
                        result.schemas.insert(schema.name.clone(), schema);
                    }
                    Routed::Schema(None) => {}
                    Routed::Entries { schema_name, entries } => {
                        result.data.entry(schema_name).or_default().extend(entries);
                    }
                    Routed::Skipped => {}
                }
            }
            Err(_) => {
                result.push_diagnostic(
                    Diagnostic::new(
                        DiagnosticKind::InternalError,
                        format!(
                            "internal parser fault while processing block '{}'",
                            block.info.schema_name
                        ),
                        block.info.start_line,
                    )
                    .with_schema(&block.info.schema_name)
                    .in_block(block.info.number, block.info.block_type),
                );
            }
        }
    }

    result.metadata.schemas_found = result.schemas.len();
    result.metadata.data_entries_found = result.data.values().map(Vec::len).sum();
    result.metadata.parse_time_ms = started.elapsed().as_millis() as u64;
    result
}

enum Routed {
    Schema(Option<DataSchema>),
    Entries {
        schema_name: String,
        entries: Vec<DataEntry>,
    },
    Skipped,
}

fn route_block(
    block: &Block,
    cache: &SchemaCache,
    limits: &Limits,
    converter: &dyn ValueConverter,
    diags: &mut Vec<Diagnostic>,
) -> Routed {
    match block.info.block_type {
        BlockType::DataDef => Routed::Schema(schema_parser::parse_schema(block, limits, diags)),
        BlockType::Data => {
            let info = &block.info;
            if let Some(path) = &info.external_path {
                diags.push(
                    Diagnostic::warning(
                        DiagnosticKind::ExternalSchema,
                        format!(
                            "external schema '{}' is not resolved here; pre-populate the schema cache under '{}'",
                            path, info.schema_name
                        ),
                        info.start_line,
                    )
                    .with_schema(&info.schema_name)
                    .in_block(info.number, info.block_type),
                );
            }
            match cache.get(&info.schema_name) {
                Some(schema) => {
                    let schema = schema.clone();
                    let entries =
                        data_parser::parse_data(block, &schema, limits, converter, diags);
                    Routed::Entries {
                        schema_name: info.schema_name.clone(),
                        entries,
                    }
                }
                None => {
                    diags.push(
                        Diagnostic::new(
                            DiagnosticKind::SchemaNotFound,
                            format!("no schema named '{}' has been defined", info.schema_name),
                            info.start_line,
                        )
                        .with_schema(&info.schema_name)
                        .in_block(info.number, info.block_type),
                    );
                    Routed::Skipped
                }
            }
        }
    }
}
