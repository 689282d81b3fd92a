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

//! Command implementations.

use colored::Colorize;
use mdex_core::{parse, Diagnostic, ParseResult};
use mdex_json::{to_json as render_json, ToJsonConfig};
use std::fs;

/// Default maximum file size (64 MB), overridable via `MDEX_MAX_FILE_SIZE`.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

fn max_file_size() -> u64 {
    std::env::var("MDEX_MAX_FILE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Reads a file after checking it against the size guard.
pub fn read_file(path: &str) -> Result<String, String> {
    let metadata =
        fs::metadata(path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
    let limit = max_file_size();
    if metadata.len() > limit {
        return Err(format!(
            "'{}' is {} bytes, larger than the {} byte limit",
            path,
            metadata.len(),
            limit
        ));
    }
    fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path, e))
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let tag = if diagnostic.is_error() {
        format!("{}", diagnostic.kind).red().bold()
    } else {
        format!("{}", diagnostic.kind).yellow()
    };
    let mut location = format!("line {}", diagnostic.line);
    if diagnostic.column > 0 {
        location.push_str(&format!(", column {}", diagnostic.column));
    }
    println!("  {} [{}] {}", tag, location, diagnostic.message);
}

fn print_diagnostics(result: &ParseResult) {
    for diagnostic in &result.errors {
        print_diagnostic(diagnostic);
    }
    for diagnostic in &result.warnings {
        print_diagnostic(diagnostic);
    }
}

/// Validate a document: parse it and report every diagnostic.
///
/// Returns `Err` when the document cannot be read or contains any parse
/// error, so the binary exits nonzero.
pub fn validate(file: &str) -> Result<(), String> {
    let content = read_file(file)?;
    let result = parse(&content);

    if result.has_errors() {
        println!("{} {}", "✗".red().bold(), file);
        print_diagnostics(&result);
        return Err(format!(
            "{} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        ));
    }

    println!("{} {}", "✓".green().bold(), file);
    println!("  Schemas: {}", result.metadata.schemas_found);
    println!("  Entries: {}", result.metadata.data_entries_found);
    println!("  Lines: {}", result.metadata.total_lines);
    if !result.warnings.is_empty() {
        println!("  Warnings: {}", result.warnings.len());
        print_diagnostics(&result);
    }
    Ok(())
}

/// Convert a document's embedded data to JSON.
pub fn to_json(
    file: &str,
    compact: bool,
    positions: bool,
    output: Option<&str>,
) -> Result<(), String> {
    let content = read_file(file)?;
    let result = parse(&content);

    let config = ToJsonConfig {
        include_positions: positions,
        pretty: !compact,
    };
    let rendered = render_json(&result, &config).map_err(|e| e.to_string())?;

    match output {
        Some(path) => fs::write(path, rendered)
            .map_err(|e| format!("cannot write '{}': {}", path, e))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Summarize the schemas and entries in a document.
pub fn inspect(file: &str) -> Result<(), String> {
    let content = read_file(file)?;
    let result = parse(&content);

    println!("{}", file.bold());
    for (name, schema) in &result.schemas {
        println!("  schema {}", name.cyan());
        for field in &schema.fields {
            let mut notes = vec![field.field_type.keyword().to_string()];
            if field.required {
                notes.push("required".to_string());
            }
            if let Some(label) = &field.label {
                notes.push(format!("label \"{}\"", label));
            }
            println!("    {} ({})", field.name, notes.join(", "));
        }
        for index in &schema.indexes {
            println!("    index {}", index.name);
        }
    }
    for (name, entries) in &result.data {
        println!("  data {}: {} entries", name.cyan(), entries.len());
    }
    if !result.errors.is_empty() || !result.warnings.is_empty() {
        println!(
            "  {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        );
        print_diagnostics(&result);
    }
    Ok(())
}
