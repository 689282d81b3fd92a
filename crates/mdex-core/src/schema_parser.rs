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

//! Schema definition parsing.
//!
//! Consumes the content tokens of a `datadef` block. Field definitions are
//! comma-separated with quote-aware splitting; a `format`/`valid` value
//! that opens a `{` without closing it in the same component re-joins the
//! following components (re-inserting the comma) until the brace closes.
//! A schema is returned only when its block produced zero errors — a
//! partially bad schema is never registered.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::lex::{is_valid_name, TokenKind};
use crate::limits::Limits;
use crate::scanner::Block;
use crate::schema::{AttrValue, DataSchema, FieldDefinition, FieldType, IndexDefinition};

/// The fixed attribute key set of a field definition.
const ATTR_KEYS: [&str; 5] = ["type", "label", "format", "valid", "required"];

/// Parses a `datadef` block into a schema.
///
/// All diagnostics are stamped with the block's schema/number context and
/// appended to `diags`. Returns `None` when any error occurred; callers
/// must not register a `None` schema.
pub(crate) fn parse_schema(
    block: &Block,
    limits: &Limits,
    diags: &mut Vec<Diagnostic>,
) -> Option<DataSchema> {
    let info = &block.info;
    let mut local: Vec<Diagnostic> = Vec::new();
    let mut schema = DataSchema::new(&info.schema_name, info.start_line);
    let mut field_limit_hit = false;

    for token in &block.tokens {
        match &token.kind {
            TokenKind::FieldDef => parse_field_def(
                &token.raw,
                token.line(),
                &mut schema,
                limits,
                &mut field_limit_hit,
                &mut local,
            ),
            TokenKind::IndexDef => parse_index_def(&token.raw, token.line(), &mut schema, &mut local),
            TokenKind::Comment | TokenKind::Newline | TokenKind::Eof => {}
            _ => local.push(Diagnostic::new(
                DiagnosticKind::InvalidSchemaSyntax,
                format!("unexpected content in schema definition block: '{}'", token.raw),
                token.line(),
            )),
        }
    }

    let ok = local.iter().all(|d| !d.is_error());
    for d in local {
        diags.push(
            d.with_schema(&info.schema_name)
                .in_block(info.number, info.block_type),
        );
    }
    ok.then_some(schema)
}

/// Parses one `!fname:` payload into a field definition.
fn parse_field_def(
    payload: &str,
    line: usize,
    schema: &mut DataSchema,
    limits: &Limits,
    field_limit_hit: &mut bool,
    diags: &mut Vec<Diagnostic>,
) {
    if payload.trim().is_empty() {
        diags.push(Diagnostic::new(
            DiagnosticKind::InvalidFieldName,
            "missing field name in definition",
            line,
        ));
        return;
    }

    // A very common authoring mistake is dropping the comma between a
    // quoted value and the next attribute. Catch it up front so the
    // author gets one actionable diagnostic instead of cascading
    // attribute errors.
    if let Some(keyword) = detect_missing_comma(payload) {
        diags.push(Diagnostic::new(
            DiagnosticKind::MissingAttributeComma,
            format!("missing comma before '{}' attribute", keyword),
            line,
        ));
        return;
    }

    let parts = split_quoted(payload);
    let name = parts[0].trim();
    if !is_valid_name(name) {
        diags.push(
            Diagnostic::new(
                DiagnosticKind::InvalidFieldName,
                format!(
                    "invalid field name '{}': must start with a letter followed by letters, digits or underscores",
                    name
                ),
                line,
            )
            .with_field(name),
        );
        return;
    }
    if schema.has_field(name) {
        diags.push(
            Diagnostic::new(
                DiagnosticKind::DuplicateField,
                format!("field '{}' is already defined; first definition wins", name),
                line,
            )
            .with_field(name),
        );
        return;
    }
    if schema.fields.len() >= limits.max_schema_fields {
        if !*field_limit_hit {
            *field_limit_hit = true;
            diags.push(Diagnostic::new(
                DiagnosticKind::LimitExceeded,
                format!("schema field count exceeds limit {}", limits.max_schema_fields),
                line,
            ));
        }
        return;
    }

    let mut field = FieldDefinition::new(name, line);
    let mut i = 1;
    while i < parts.len() {
        let comp = parts[i].trim();
        if comp.is_empty() {
            i += 1;
            continue;
        }
        let Some(colon) = comp.find(':') else {
            diags.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidAttribute,
                    format!("expected 'key: value' in '{}'", comp),
                    line,
                )
                .with_field(name),
            );
            i += 1;
            continue;
        };
        let key = comp[..colon].trim();
        let mut value = comp[colon + 1..].trim().to_string();

        if matches!(key, "format" | "valid") && value.starts_with('{') && !braces_closed(&value) {
            // The quote-aware comma split cut inside a braced value.
            // Re-join the following components, restoring the commas,
            // until the brace closes.
            let mut closed = false;
            while i + 1 < parts.len() {
                i += 1;
                value.push(',');
                value.push_str(&parts[i]);
                if braces_closed(&value) {
                    closed = true;
                    break;
                }
            }
            if !closed {
                diags.push(
                    Diagnostic::new(
                        DiagnosticKind::UnclosedLiteral,
                        format!("'{}' value opens '{{' but never closes it", key),
                        line,
                    )
                    .with_field(name),
                );
                break;
            }
            value = value.trim().to_string();
        }

        match key {
            "type" => match FieldType::from_keyword(strip_quotes(&value)) {
                Some(t) => field.field_type = t,
                None => {
                    diags.push(
                        Diagnostic::warning(
                            DiagnosticKind::InvalidDataType,
                            format!("unknown type '{}', defaulting to text", value),
                            line,
                        )
                        .with_field(name),
                    );
                    field.field_type = FieldType::Text;
                }
            },
            "label" => field.label = Some(strip_quotes(&value).to_string()),
            "format" => field.format = Some(parse_attr_value(&value)),
            "valid" => field.valid = Some(parse_attr_value(&value)),
            "required" => match strip_quotes(&value).to_ascii_lowercase().as_str() {
                "true" => field.required = true,
                "false" => field.required = false,
                _ => diags.push(
                    Diagnostic::new(
                        DiagnosticKind::InvalidAttribute,
                        format!("required must be \"true\" or \"false\", got '{}'", value),
                        line,
                    )
                    .with_field(name),
                ),
            },
            _ => diags.push(
                Diagnostic::warning(
                    DiagnosticKind::UnknownAttribute,
                    format!("unknown attribute '{}'", key),
                    line,
                )
                .with_field(name),
            ),
        }
        i += 1;
    }

    schema.fields.push(field);
}

/// Parses one `!index:` payload. Every referenced field must already be
/// defined; forward references invalidate the whole index.
fn parse_index_def(
    payload: &str,
    line: usize,
    schema: &mut DataSchema,
    diags: &mut Vec<Diagnostic>,
) {
    let spec = strip_quotes(payload.trim()).trim();
    if spec.is_empty() {
        diags.push(Diagnostic::new(
            DiagnosticKind::InvalidSchemaSyntax,
            "empty index definition",
            line,
        ));
        return;
    }

    let mut fields = Vec::new();
    let mut ok = true;
    for part in spec.split('+') {
        let part = part.trim();
        if part.is_empty() {
            diags.push(Diagnostic::new(
                DiagnosticKind::InvalidSchemaSyntax,
                "empty field name in index definition",
                line,
            ));
            ok = false;
            continue;
        }
        if !schema.has_field(part) {
            diags.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidIndexReference,
                    format!("index references undefined field '{}'", part),
                    line,
                )
                .with_field(part),
            );
            ok = false;
            continue;
        }
        fields.push(part.to_string());
    }

    if ok {
        schema.indexes.push(IndexDefinition {
            name: spec.to_string(),
            fields,
        });
    }
}

/// Splits on commas that are not inside double quotes.
fn split_quoted(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Returns `true` when every `{` in the string has been closed.
fn braces_closed(s: &str) -> bool {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

/// Strips one pair of surrounding double quotes, if present.
fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|x| x.strip_suffix('"'))
        .unwrap_or(s)
}

/// Detects a recognized attribute keyword directly following a closing
/// quote with no comma in between. Returns the keyword.
fn detect_missing_comma(payload: &str) -> Option<&'static str> {
    let mut in_quotes = false;
    for (i, c) in payload.char_indices() {
        if c != '"' {
            continue;
        }
        if !in_quotes {
            in_quotes = true;
            continue;
        }
        in_quotes = false;
        let after = payload[i + 1..].trim_start();
        let ident: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        if let Some(&key) = ATTR_KEYS.iter().find(|&&k| k == ident) {
            if after[ident.len()..].trim_start().starts_with(':') {
                return Some(key);
            }
        }
    }
    None
}

/// Parses a `format`/`valid` value into its closed attribute shape.
fn parse_attr_value(value: &str) -> AttrValue {
    let v = value.trim();
    if let Some(inner) = v.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let inner = inner.trim();
        if let Some(range) = parse_range_bag(inner) {
            return range;
        }
        if let Some((a, b)) = split_top_level_comma(inner) {
            return AttrValue::Dual {
                input: strip_quotes(a).to_string(),
                display: strip_quotes(b).to_string(),
            };
        }
        return AttrValue::Single(strip_quotes(inner).to_string());
    }
    AttrValue::Single(strip_quotes(v).to_string())
}

/// Recognizes a `{min: .., max: ..}` bag. `None` when any key is not
/// min/max, so the value falls through to the dual/single shapes.
fn parse_range_bag(inner: &str) -> Option<AttrValue> {
    let mut min = None;
    let mut max = None;
    let mut any = false;
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, val) = part.split_once(':')?;
        match key.trim() {
            "min" => {
                min = val.trim().parse::<f64>().ok();
                any = true;
            }
            "max" => {
                max = val.trim().parse::<f64>().ok();
                any = true;
            }
            _ => return None,
        }
    }
    any.then_some(AttrValue::Range { min, max })
}

/// Finds the first comma at brace depth zero outside quotes.
fn split_top_level_comma(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => depth -= 1,
            ',' if !in_quotes && depth == 0 => return Some((&s[..i], &s[i + 1..])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;
    use crate::scanner::scan_blocks;
    use crate::Severity;

    /// Parses a full datadef block body; panics when the input is not a
    /// single clean block.
    fn parse(input: &str) -> (Option<DataSchema>, Vec<Diagnostic>) {
        let limits = Limits::default();
        let (tokens, lex_diags) = tokenize(input, &limits);
        assert!(lex_diags.is_empty(), "lex diagnostics: {:?}", lex_diags);
        let mut diags = Vec::new();
        let blocks = scan_blocks(&tokens, &mut diags);
        assert!(diags.is_empty(), "scan diagnostics: {:?}", diags);
        assert_eq!(blocks.len(), 1);
        let mut out = Vec::new();
        let schema = parse_schema(&blocks[0], &limits, &mut out);
        (schema, out)
    }

    // ==================== Field definitions ====================

    #[test]
    fn test_bare_field() {
        let (schema, diags) = parse("!? datadef t\n!fname: name\n!#\n");
        assert!(diags.is_empty());
        let schema = schema.unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].name, "name");
        assert_eq!(schema.fields[0].field_type, FieldType::Text);
    }

    #[test]
    fn test_field_with_attributes() {
        let (schema, diags) = parse(
            "!? datadef t\n!fname: price, type: number, label: \"Unit price\", required: true\n!#\n",
        );
        assert!(diags.is_empty());
        let schema = schema.unwrap();
        let f = &schema.fields[0];
        assert_eq!(f.field_type, FieldType::Number);
        assert_eq!(f.label.as_deref(), Some("Unit price"));
        assert!(f.required);
    }

    #[test]
    fn test_quoted_label_with_comma() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: name, label: \"Last, First\"\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(
            schema.unwrap().fields[0].label.as_deref(),
            Some("Last, First")
        );
    }

    #[test]
    fn test_duplicate_field_first_wins() {
        let (schema, diags) =
            parse("!? datadef p\n!fname: name\n!fname: name, type: number\n!#\n");
        assert!(schema.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DuplicateField);
        assert_eq!(diags[0].field, "name");
        assert_eq!(diags[0].schema, "p");
    }

    #[test]
    fn test_invalid_field_name() {
        let (schema, diags) = parse("!? datadef t\n!fname: 2fast\n!#\n");
        assert!(schema.is_none());
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidFieldName);
    }

    #[test]
    fn test_unknown_type_is_warning_only() {
        let (schema, diags) = parse("!? datadef t\n!fname: x, type: integer\n!#\n");
        let schema = schema.expect("warning must not fail the schema");
        assert_eq!(schema.fields[0].field_type, FieldType::Text);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidDataType);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_unknown_attribute_is_warning() {
        let (schema, diags) = parse("!? datadef t\n!fname: x, color: red\n!#\n");
        assert!(schema.is_some());
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownAttribute);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_invalid_required_literal() {
        let (schema, diags) = parse("!? datadef t\n!fname: x, required: maybe\n!#\n");
        assert!(schema.is_none());
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidAttribute);
    }

    #[test]
    fn test_required_case_insensitive() {
        let (schema, diags) = parse("!? datadef t\n!fname: x, required: TRUE\n!#\n");
        assert!(diags.is_empty());
        assert!(schema.unwrap().fields[0].required);
    }

    // ==================== Missing comma heuristic ====================

    #[test]
    fn test_missing_comma_after_quoted_value() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: price, label: \"Price\" format: currency\n!#\n");
        assert!(schema.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MissingAttributeComma);
        assert!(diags[0].message.contains("format"));
    }

    #[test]
    fn test_comma_after_quoted_value_is_fine() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: price, label: \"Price\", format: currency\n!#\n");
        assert!(diags.is_empty());
        assert!(schema.is_some());
    }

    // ==================== Braced values ====================

    #[test]
    fn test_dual_format_rejoined_across_comma() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: day, type: date, format: {MM/DD/YYYY,YYYY-MM-DD}\n!#\n");
        assert!(diags.is_empty());
        let schema = schema.unwrap();
        assert_eq!(
            schema.fields[0].format,
            Some(AttrValue::Dual {
                input: "MM/DD/YYYY".into(),
                display: "YYYY-MM-DD".into(),
            })
        );
    }

    #[test]
    fn test_range_bag() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: age, type: number, valid: {min: 0, max: 130}\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(
            schema.unwrap().fields[0].valid,
            Some(AttrValue::Range {
                min: Some(0.0),
                max: Some(130.0),
            })
        );
    }

    #[test]
    fn test_unclosed_literal() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: day, format: {MM/DD/YYYY, required: true\n!#\n");
        assert!(schema.is_none());
        assert!(diags
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnclosedLiteral));
    }

    #[test]
    fn test_single_braced_value() {
        let (schema, diags) = parse("!? datadef t\n!fname: code, format: {A-Z0-9}\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(
            schema.unwrap().fields[0].format,
            Some(AttrValue::Single("A-Z0-9".into()))
        );
    }

    // ==================== Indexes ====================

    #[test]
    fn test_index_over_defined_fields() {
        let (schema, diags) = parse(
            "!? datadef t\n!fname: name\n!fname: email\n!index: \"name+email\"\n!#\n",
        );
        assert!(diags.is_empty());
        let schema = schema.unwrap();
        assert_eq!(schema.indexes.len(), 1);
        assert_eq!(schema.indexes[0].name, "name+email");
        assert_eq!(schema.indexes[0].fields, vec!["name", "email"]);
    }

    #[test]
    fn test_index_forward_reference_rejected() {
        let (schema, diags) =
            parse("!? datadef t\n!fname: name\n!index: \"name+email\"\n!fname: email\n!#\n");
        assert!(schema.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidIndexReference);
        assert_eq!(diags[0].field, "email");
    }

    #[test]
    fn test_index_single_field() {
        let (schema, diags) = parse("!? datadef t\n!fname: name\n!index: \"name\"\n!#\n");
        assert!(diags.is_empty());
        assert_eq!(schema.unwrap().indexes[0].fields, vec!["name"]);
    }

    // ==================== Stray content ====================

    #[test]
    fn test_stray_content_is_syntax_error() {
        let (schema, diags) = parse("!? datadef t\n!fname: name\nprose here\n!#\n");
        assert!(schema.is_none());
        assert!(diags
            .iter()
            .any(|d| d.kind == DiagnosticKind::InvalidSchemaSyntax));
    }

    #[test]
    fn test_comments_allowed() {
        let (schema, diags) =
            parse("!? datadef t\n<!-- the schema -->\n!fname: name\n!#\n");
        assert!(diags.is_empty());
        assert!(schema.is_some());
    }

    // ==================== Limits ====================

    #[test]
    fn test_field_limit() {
        let limits = Limits {
            max_schema_fields: 2,
            ..Limits::default()
        };
        let input = "!? datadef t\n!fname: a\n!fname: b\n!fname: c\n!fname: d\n!#\n";
        let (tokens, _) = tokenize(input, &limits);
        let mut diags = Vec::new();
        let blocks = scan_blocks(&tokens, &mut diags);
        let mut out = Vec::new();
        let schema = parse_schema(&blocks[0], &limits, &mut out);
        assert!(schema.is_none());
        let limit_errors = out
            .iter()
            .filter(|d| d.kind == DiagnosticKind::LimitExceeded)
            .count();
        assert_eq!(limit_errors, 1);
    }

    // ==================== Helpers ====================

    #[test]
    fn test_split_quoted() {
        assert_eq!(split_quoted("a, b"), vec!["a", " b"]);
        assert_eq!(split_quoted("a, \"b, c\", d"), vec!["a", " \"b, c\"", " d"]);
        assert_eq!(split_quoted("only"), vec!["only"]);
    }

    #[test]
    fn test_braces_closed() {
        assert!(braces_closed("{a}"));
        assert!(braces_closed("{a{b}}"));
        assert!(braces_closed("plain"));
        assert!(!braces_closed("{a"));
        assert!(!braces_closed("{a{b}"));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"x\""), "x");
        assert_eq!(strip_quotes("x"), "x");
        assert_eq!(strip_quotes("\"unterminated"), "\"unterminated");
    }

    #[test]
    fn test_detect_missing_comma() {
        assert_eq!(
            detect_missing_comma("price, label: \"Price\" format: currency"),
            Some("format")
        );
        assert_eq!(
            detect_missing_comma("price, label: \"Price\", format: currency"),
            None
        );
        // Keyword-looking text inside quotes must not trigger.
        assert_eq!(detect_missing_comma("x, label: \"format: odd\""), None);
    }

    #[test]
    fn test_parse_attr_value_shapes() {
        assert_eq!(
            parse_attr_value("currency"),
            AttrValue::Single("currency".into())
        );
        assert_eq!(
            parse_attr_value("{\"a\",\"b\"}"),
            AttrValue::Dual {
                input: "a".into(),
                display: "b".into(),
            }
        );
        assert_eq!(
            parse_attr_value("{min: 1, max: 2}"),
            AttrValue::Range {
                min: Some(1.0),
                max: Some(2.0),
            }
        );
    }
}
