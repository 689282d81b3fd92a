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

//! Header and type-shape validation shared by both data sub-parsers.
//!
//! Checks here are structural: does a header/field name exist in the
//! schema, and can a raw value plausibly have the declared type's shape.
//! Range checks, enumerations and other business rules are out of scope.

use crate::convert::{parse_bool, parse_number};
use crate::schema::{DataSchema, FieldDefinition, FieldType};

/// One validated table header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderColumn {
    /// Field name after stripping the `!` prefix.
    pub name: String,
    /// Whether the name exists in the schema. Invalid columns keep their
    /// position so rows still align, but their cells are dropped.
    pub valid: bool,
}

/// Validates header cells against the schema's field set.
///
/// Cells are accepted with or without the `!` prefix. Returns one column
/// per cell; the caller reports `invalid_field_name` for each invalid one.
pub(crate) fn validate_headers(cells: &[String], schema: &DataSchema) -> Vec<HeaderColumn> {
    cells
        .iter()
        .map(|cell| {
            let name = cell.trim().trim_start_matches('!').trim().to_string();
            let valid = schema.has_field(&name);
            HeaderColumn { name, valid }
        })
        .collect()
}

/// Checks whether a raw value can plausibly have the declared type's
/// shape. Returns a description of the mismatch, or `None` when the shape
/// is fine. Text fields always pass.
pub(crate) fn check_type_shape(raw: &str, field: &FieldDefinition) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match field.field_type {
        FieldType::Text => None,
        FieldType::Number => parse_number(raw)
            .is_none()
            .then(|| format!("'{}' does not look like a number", raw)),
        FieldType::Boolean => parse_bool(raw)
            .is_none()
            .then(|| format!("'{}' does not look like a boolean", raw)),
        FieldType::Date => (!raw.chars().any(|c| c.is_ascii_digit()))
            .then(|| format!("'{}' does not look like a date", raw)),
        FieldType::Time => (!raw.contains(':') || !raw.chars().any(|c| c.is_ascii_digit()))
            .then(|| format!("'{}' does not look like a time", raw)),
    }
}
