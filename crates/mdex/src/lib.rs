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

//! Markdown Data Extensions.
//!
//! mdex embeds typed schema definitions and data records in plain
//! markdown documents. This facade crate re-exports the parser and data
//! model from `mdex-core` and the JSON projection from `mdex-json`.
//!
//! ```
//! let result = mdex::parse("!? datadef t\n!fname: name\n!#\n!? data t\n!name Ada\n!#\n");
//! assert!(result.errors.is_empty());
//! assert_eq!(result.entries("t").len(), 1);
//! ```

pub use mdex_core::{
    parse, parse_with_cache, parse_with_converter, parse_with_options, tokenize, AttrValue,
    Block, BlockHeader, BlockInfo, BlockType, DataEntry, DataSchema, DefaultConverter,
    Diagnostic, DiagnosticKind, FieldDefinition, FieldType, IndexDefinition, Limits,
    ParseMetadata, ParseOptions, ParseOptionsBuilder, ParseResult, SchemaCache, Severity,
    SourcePos, Token, TokenKind, Value, ValueConverter,
};

/// JSON projection of parse results.
pub mod json {
    pub use mdex_json::{to_json, to_json_value, JsonError, ToJsonConfig};
}
