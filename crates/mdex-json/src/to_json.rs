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

//! ParseResult to JSON conversion.

use mdex_core::{
    AttrValue, DataEntry, DataSchema, Diagnostic, ParseResult, Severity, Value,
};
use serde_json::{json, Map, Number, Value as JsonValue};
use thiserror::Error;

/// Conversion failure.
#[derive(Debug, Error)]
pub enum JsonError {
    /// serde_json refused the assembled document.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration for JSON output.
#[derive(Debug, Clone)]
pub struct ToJsonConfig {
    /// Attach `__line__`/`__index__` keys to each entry object.
    pub include_positions: bool,
    /// Pretty-print the output.
    pub pretty: bool,
}

impl Default for ToJsonConfig {
    fn default() -> Self {
        Self {
            include_positions: false,
            pretty: true,
        }
    }
}

/// Converts a parse result to a JSON string.
pub fn to_json(result: &ParseResult, config: &ToJsonConfig) -> Result<String, JsonError> {
    let value = to_json_value(result, config);
    let rendered = if config.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

/// Converts a parse result to a `serde_json::Value`.
pub fn to_json_value(result: &ParseResult, config: &ToJsonConfig) -> JsonValue {
    let mut schemas = Map::with_capacity(result.schemas.len());
    for (name, schema) in &result.schemas {
        schemas.insert(name.clone(), schema_to_json(schema));
    }

    let mut data = Map::with_capacity(result.data.len());
    for (name, entries) in &result.data {
        let rows: Vec<JsonValue> = entries.iter().map(|e| entry_to_json(e, config)).collect();
        data.insert(name.clone(), JsonValue::Array(rows));
    }

    json!({
        "schemas": JsonValue::Object(schemas),
        "data": JsonValue::Object(data),
        "errors": diagnostics_to_json(&result.errors),
        "warnings": diagnostics_to_json(&result.warnings),
        "metadata": {
            "parse_time_ms": result.metadata.parse_time_ms,
            "total_lines": result.metadata.total_lines,
            "schemas_found": result.metadata.schemas_found,
            "data_entries_found": result.metadata.data_entries_found,
        },
    })
}

fn schema_to_json(schema: &DataSchema) -> JsonValue {
    let fields: Vec<JsonValue> = schema
        .fields
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "type": f.field_type.keyword(),
                "label": f.label,
                "format": f.format.as_ref().map(attr_to_json),
                "valid": f.valid.as_ref().map(attr_to_json),
                "required": f.required,
                "line": f.line,
            })
        })
        .collect();
    let indexes: Vec<JsonValue> = schema
        .indexes
        .iter()
        .map(|i| json!({ "name": i.name, "fields": i.fields }))
        .collect();
    json!({
        "name": schema.name,
        "fields": fields,
        "indexes": indexes,
        "source_path": schema.source_path,
        "line": schema.line,
    })
}

fn attr_to_json(attr: &AttrValue) -> JsonValue {
    match attr {
        AttrValue::Single(s) => JsonValue::String(s.clone()),
        AttrValue::Dual { input, display } => json!({ "input": input, "display": display }),
        AttrValue::Range { min, max } => json!({ "min": min, "max": max }),
    }
}

fn entry_to_json(entry: &DataEntry, config: &ToJsonConfig) -> JsonValue {
    let mut map = Map::with_capacity(entry.fields.len() + 2);
    for (name, value) in &entry.fields {
        map.insert(name.clone(), value_to_json(value));
    }
    if config.include_positions {
        map.insert("__line__".to_string(), JsonValue::from(entry.line));
        map.insert("__index__".to_string(), JsonValue::from(entry.record_index));
    }
    JsonValue::Object(map)
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Number(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Date(s) | Value::Time(s) => JsonValue::String(s.clone()),
    }
}

fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> JsonValue {
    let list: Vec<JsonValue> = diagnostics
        .iter()
        .map(|d| {
            json!({
                "code": d.kind.code(),
                "severity": match d.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                },
                "message": d.message,
                "line": d.line,
                "column": d.column,
                "schema": d.schema,
                "field": d.field,
                "block": d.block,
                "block_type": d.block_type.map(|t| t.keyword()),
            })
        })
        .collect();
    JsonValue::Array(list)
}
