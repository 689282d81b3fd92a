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

//! Diagnostics accumulated during parsing.
//!
//! A [`Diagnostic`] is one fixed-shape record used for both errors and
//! warnings. Every context field is always present, with sentinel values
//! (`0`, empty string, `None`) standing in for "not applicable", so the
//! shape never drifts between call sites. Diagnostics are values: nothing
//! is thrown across a block boundary.

use crate::lex::BlockType;
use std::fmt;
use thiserror::Error;

/// Whether a diagnostic blocks schema registration / entry production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The construct failed; degraded output.
    Error,
    /// The construct was accepted with a caveat.
    Warning,
}

/// The closed set of diagnostic kinds.
///
/// Each kind has a stable snake_case [`code`](DiagnosticKind::code) used in
/// tests and in the JSON projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticKind {
    // Lexical
    InvalidBlockSyntax,
    InvalidBlockType,
    InvalidSchemaName,
    UnclosedReference,
    EmptyReferencePath,
    UnterminatedComment,
    // Structural
    NestedBlocks,
    UnmatchedBlockEnd,
    MissingBlockStart,
    EmptyBlock,
    BlockNotClosed,
    // Schema definition
    DuplicateField,
    InvalidFieldName,
    InvalidSchemaSyntax,
    MissingAttributeComma,
    UnclosedLiteral,
    InvalidAttribute,
    UnknownAttribute,
    InvalidDataType,
    InvalidIndexReference,
    // Data entry
    SchemaNotFound,
    MixedDataFormat,
    InvalidTableSyntax,
    ColumnCountMismatch,
    InvalidEntrySyntax,
    TypeShapeMismatch,
    ExternalSchema,
    // Resource / internal
    LimitExceeded,
    InternalError,
}

impl DiagnosticKind {
    /// Stable snake_case identifier for this kind.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidBlockSyntax => "invalid_block_syntax",
            Self::InvalidBlockType => "invalid_block_type",
            Self::InvalidSchemaName => "invalid_schema_name",
            Self::UnclosedReference => "unclosed_reference",
            Self::EmptyReferencePath => "empty_reference_path",
            Self::UnterminatedComment => "unterminated_comment",
            Self::NestedBlocks => "nested_blocks",
            Self::UnmatchedBlockEnd => "unmatched_block_end",
            Self::MissingBlockStart => "missing_block_start",
            Self::EmptyBlock => "empty_block",
            Self::BlockNotClosed => "block_not_closed",
            Self::DuplicateField => "duplicate_field",
            Self::InvalidFieldName => "invalid_field_name",
            Self::InvalidSchemaSyntax => "invalid_schema_syntax",
            Self::MissingAttributeComma => "missing_attribute_comma",
            Self::UnclosedLiteral => "unclosed_literal",
            Self::InvalidAttribute => "invalid_attribute",
            Self::UnknownAttribute => "unknown_attribute",
            Self::InvalidDataType => "invalid_data_type",
            Self::InvalidIndexReference => "invalid_index_reference",
            Self::SchemaNotFound => "schema_not_found",
            Self::MixedDataFormat => "mixed_data_format",
            Self::InvalidTableSyntax => "invalid_table_syntax",
            Self::ColumnCountMismatch => "column_count_mismatch",
            Self::InvalidEntrySyntax => "invalid_entry_syntax",
            Self::TypeShapeMismatch => "type_shape_mismatch",
            Self::ExternalSchema => "external_schema",
            Self::LimitExceeded => "limit_exceeded",
            Self::InternalError => "internal_error",
        }
    }

    /// The default severity for this kind.
    pub const fn default_severity(&self) -> Severity {
        match self {
            Self::UnknownAttribute
            | Self::InvalidDataType
            | Self::TypeShapeMismatch
            | Self::ExternalSchema => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single parse diagnostic with full source context.
///
/// Sentinels: `column == 0` means unknown, empty `schema`/`field` mean
/// no schema/field context, `block == 0` means outside any block.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at line {line}: {message}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Error or warning.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number; 0 when unknown.
    pub column: usize,
    /// Schema name in scope; empty when none.
    pub schema: String,
    /// Field name in scope; empty when none.
    pub field: String,
    /// Sequential number of the block in scope; 0 when outside any block.
    pub block: usize,
    /// Type of the block in scope.
    pub block_type: Option<BlockType>,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's default severity.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            line,
            column: 0,
            schema: String::new(),
            field: String::new(),
            block: 0,
            block_type: None,
        }
    }

    /// Creates a warning regardless of the kind's default severity.
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, line: usize) -> Self {
        let mut d = Self::new(kind, message, line);
        d.severity = Severity::Warning;
        d
    }

    /// Attaches a column number.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Attaches the schema name in scope.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Attaches the field name in scope.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Attaches block number and type context.
    pub fn in_block(mut self, number: usize, block_type: BlockType) -> Self {
        self.block = number;
        self.block_type = Some(block_type);
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
