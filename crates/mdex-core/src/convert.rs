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

//! Raw-to-typed value conversion.
//!
//! The parsers hand raw cell/field strings to a [`ValueConverter`] keyed by
//! the field's declared type. Conversion never fails: unparseable input
//! coerces to a best-effort value (`0` for numbers, `false` for ambiguous
//! booleans) instead of failing the record. [`DefaultConverter`] is what
//! `parse` uses; callers with their own locale/formatting stack implement
//! the trait and pass it to `parse_with_converter`.

use crate::schema::{FieldDefinition, FieldType};
use crate::value::Value;

/// Conversion seam between the parsers and value typing.
pub trait ValueConverter {
    /// Converts a raw string (or `None` for an explicitly empty value)
    /// into a typed value. Must not fail.
    fn convert(&self, raw: Option<&str>, field: &FieldDefinition) -> Value;
}

/// Best-effort converter used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl ValueConverter for DefaultConverter {
    fn convert(&self, raw: Option<&str>, field: &FieldDefinition) -> Value {
        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Value::Null,
        };
        match field.field_type {
            FieldType::Text => Value::Text(raw.to_string()),
            FieldType::Number => Value::Number(parse_number(raw).unwrap_or(0.0)),
            FieldType::Boolean => Value::Bool(parse_bool(raw).unwrap_or(false)),
            FieldType::Date => Value::Date(raw.trim().to_string()),
            FieldType::Time => Value::Time(raw.trim().to_string()),
        }
    }
}

/// Parses a number leniently: currency symbols, thousands separators,
/// percent signs and surrounding whitespace are stripped first.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '%' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Recognizes common boolean spellings; `None` when ambiguous.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
