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

//! Schema cache shared across parse calls.
//!
//! The cache is an explicit, caller-constructed object passed into each
//! parse call; there is no process-wide instance. It outlives a single
//! parse so a `datadef` parsed once can serve later documents, and so
//! callers can pre-populate schemas for `[name](path)` external
//! references before invoking parse. Callers that want full isolation
//! between documents call [`SchemaCache::clear`] (or construct a fresh
//! cache) between parses. `set` is last-write-wins; the cache provides no
//! locking of its own.

use crate::schema::DataSchema;
use std::collections::HashMap;

/// A name-keyed schema store with an explicit get/set/clear lifecycle.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    schemas: HashMap<String, DataSchema>,
}

impl SchemaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<&DataSchema> {
        self.schemas.get(name)
    }

    /// Stores a schema under a name, replacing any previous entry.
    pub fn set(&mut self, name: impl Into<String>, schema: DataSchema) {
        self.schemas.insert(name.into(), schema);
    }

    /// Removes all cached schemas.
    pub fn clear(&mut self) {
        self.schemas.clear();
    }

    /// Returns `true` if a schema is cached under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
