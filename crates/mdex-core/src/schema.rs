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

//! Schema model: field definitions, attribute values, indexes.

use std::fmt;

/// Declared type of a field.
///
/// An unrecognized type keyword in the source falls back to `Text` with an
/// `invalid_data_type` warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Time,
    Boolean,
}

impl FieldType {
    /// Parses a declared type keyword. Exact lowercase match only.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A `format`/`valid` attribute value.
///
/// Closed set of shapes so consumers pattern-match exhaustively instead of
/// probing a loosely typed bag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    /// A single pattern or keyword, e.g. `currency`.
    Single(String),
    /// An input pattern paired with a display pattern, `{input,display}`.
    Dual {
        input: String,
        display: String,
    },
    /// A numeric range bag, `{min: 0, max: 100}`.
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// One field declared by a `!fname:` line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDefinition {
    /// Field name, unique within the schema (case-sensitive).
    pub name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// Display label.
    pub label: Option<String>,
    /// Format specification.
    pub format: Option<AttrValue>,
    /// Validation specification. Structural only; the core never evaluates
    /// it as a business rule.
    pub valid: Option<AttrValue>,
    /// Whether the field was declared required.
    pub required: bool,
    /// Line the definition appeared on.
    pub line: usize,
}

impl FieldDefinition {
    /// Creates a text field with no attributes.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Text,
            label: None,
            format: None,
            valid: None,
            required: false,
            line,
        }
    }
}

/// One `!index:` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexDefinition {
    /// The raw `+`-joined spec string, e.g. `"name+email"`.
    pub name: String,
    /// Referenced field names, in declaration order.
    pub fields: Vec<String>,
}

/// A parsed schema: the ordered fields and indexes of one `datadef` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSchema {
    /// Schema name as declared on the block start line.
    pub name: String,
    /// Ordered field definitions.
    pub fields: Vec<FieldDefinition>,
    /// Ordered index definitions.
    pub indexes: Vec<IndexDefinition>,
    /// External source path, when the schema came from a `[name](path)`
    /// reference resolved by the caller.
    pub source_path: Option<String>,
    /// Line of the block start that declared the schema.
    pub line: usize,
}

impl DataSchema {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
            source_path: None,
            line,
        }
    }

    /// Looks up a field definition by name (case-sensitive).
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the schema declares a field with this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Ordered field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
