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

//! Core parser and data model for Markdown Data Extensions.
//!
//! mdex documents are ordinary markdown with embedded typed blocks:
//! `!? datadef <name> ... !#` declares a schema (field and index
//! definitions), `!? data <name> ... !#` carries records for it, either
//! as a markdown table with `!`-prefixed header cells or as free-form
//! `!field value` lines separated by `!-`.
//!
//! Parsing is a single synchronous pass: the [`lex`] module tokenizes the
//! whole document, the block scanner pairs block markers, and each block
//! is routed to the schema or data parser. Problems accumulate as
//! [`Diagnostic`] values in the returned [`ParseResult`]; a bad construct
//! degrades to a diagnostic plus best-effort continuation, and a failure
//! in one block never prevents later blocks from parsing.
//!
//! ```
//! use mdex_core::parse;
//!
//! let doc = "\
//! !? datadef people
//! !fname: name
//! !fname: age, type: number
//! !#
//!
//! !? data people
//! | !name | !age |
//! |-------|------|
//! | John  | 41   |
//! !#
//! ";
//! let result = parse(doc);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.entries("people").len(), 1);
//! ```

mod cache;
pub mod convert;
mod data_parser;
mod diagnostic;
mod entry;
mod freeform;
pub mod lex;
mod limits;
mod parser;
mod result;
mod scanner;
mod schema;
mod schema_parser;
mod table;
mod validate;
mod value;

pub use cache::SchemaCache;
pub use convert::{DefaultConverter, ValueConverter};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use entry::DataEntry;
pub use lex::{tokenize, BlockHeader, BlockType, SourcePos, Token, TokenKind};
pub use limits::Limits;
pub use parser::{
    parse, parse_with_cache, parse_with_converter, parse_with_options, ParseOptions,
    ParseOptionsBuilder,
};
pub use result::{ParseMetadata, ParseResult};
pub use scanner::{Block, BlockInfo};
pub use schema::{AttrValue, DataSchema, FieldDefinition, FieldType, IndexDefinition};
pub use value::Value;
