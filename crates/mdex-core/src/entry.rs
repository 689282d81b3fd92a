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

//! Data entries: one logical record per table row or free-form segment.

use crate::value::Value;

/// One record produced by the table or free-form parser.
///
/// `fields` preserves source order. A name absent from the vector means the
/// field was not supplied; a present name with [`Value::Null`] means it was
/// supplied explicitly empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataEntry {
    /// Name of the schema the entry belongs to.
    pub schema_name: String,
    /// Ordered field name/value pairs.
    pub fields: Vec<(String, Value)>,
    /// Line the record started on.
    pub line: usize,
    /// 0-based index of the record within its block.
    pub record_index: usize,
}

impl DataEntry {
    pub fn new(schema_name: impl Into<String>, line: usize, record_index: usize) -> Self {
        Self {
            schema_name: schema_name.into(),
            fields: Vec::new(),
            line,
            record_index,
        }
    }

    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the record carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sets a field value, overwriting an earlier assignment to the same
    /// name while keeping its original position.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Ordered field names present in the record.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new() {
        let e = DataEntry::new("people", 7, 0);
        assert_eq!(e.schema_name, "people");
        assert_eq!(e.line, 7);
        assert_eq!(e.record_index, 0);
        assert!(e.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut e = DataEntry::new("people", 1, 0);
        e.set("name", Value::Text("John".into()));
        e.set("age", Value::Number(41.0));
        assert_eq!(e.get("name"), Some(&Value::Text("John".into())));
        assert_eq!(e.get("age"), Some(&Value::Number(41.0)));
        assert_eq!(e.get("email"), None);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut e = DataEntry::new("people", 1, 0);
        e.set("name", Value::Text("John".into()));
        e.set("city", Value::Text("Oslo".into()));
        e.set("name", Value::Text("Jane".into()));
        let names: Vec<&str> = e.field_names().collect();
        assert_eq!(names, vec!["name", "city"]);
        assert_eq!(e.get("name"), Some(&Value::Text("Jane".into())));
    }

    #[test]
    fn test_null_is_present_not_missing() {
        let mut e = DataEntry::new("people", 1, 0);
        e.set("name", Value::Null);
        assert!(!e.is_empty());
        assert_eq!(e.get("name"), Some(&Value::Null));
        assert_eq!(e.get("other"), None);
    }
}
