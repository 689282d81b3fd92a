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

//! Aggregated parse output.

use crate::diagnostic::Diagnostic;
use crate::entry::DataEntry;
use crate::schema::DataSchema;
use std::collections::BTreeMap;

/// Summary counters for one parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseMetadata {
    /// Wall-clock parse time in milliseconds.
    pub parse_time_ms: u64,
    /// Number of `\n`-delimited lines in the input.
    pub total_lines: usize,
    /// Schemas successfully parsed from this document.
    pub schemas_found: usize,
    /// Data entries produced from this document.
    pub data_entries_found: usize,
}

/// Everything one parse call produced.
///
/// Errors and warnings are ordered as they were discovered. A failure in
/// one block never removes the output of another.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Schemas defined in this document, by name.
    pub schemas: BTreeMap<String, DataSchema>,
    /// Entries grouped by schema name, in document order.
    pub data: BTreeMap<String, Vec<DataEntry>>,
    /// Error diagnostics.
    pub errors: Vec<Diagnostic>,
    /// Warning diagnostics.
    pub warnings: Vec<Diagnostic>,
    /// Summary counters.
    pub metadata: ParseMetadata,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic to the matching severity list.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Returns `true` if any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Entries recorded for a schema name; empty when none.
    pub fn entries(&self, schema_name: &str) -> &[DataEntry] {
        self.data.get(schema_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, DiagnosticKind};

    #[test]
    fn test_push_diagnostic_splits_by_severity() {
        let mut r = ParseResult::new();
        r.push_diagnostic(Diagnostic::new(DiagnosticKind::EmptyBlock, "e", 1));
        r.push_diagnostic(Diagnostic::new(DiagnosticKind::InvalidDataType, "w", 2));
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.warnings.len(), 1);
        assert!(r.has_errors());
    }

    #[test]
    fn test_entries_missing_schema_is_empty() {
        let r = ParseResult::new();
        assert!(r.entries("nope").is_empty());
    }
}
