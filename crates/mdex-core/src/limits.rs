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

//! Resource limits for parsing.
//!
//! Exceeding a limit produces a `limit_exceeded` diagnostic bounding only
//! the construct the limit guards; the rest of the document still parses.

/// Configurable limits bounding parser resources.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum input size in bytes (default: 64MB).
    pub max_input_size: usize,
    /// Maximum line length in bytes (default: 64KB).
    pub max_line_length: usize,
    /// Maximum fields per schema (default: 256).
    pub max_schema_fields: usize,
    /// Maximum entries per data block (default: 100k).
    pub max_entries_per_block: usize,
    /// Maximum blocks per document (default: 10k).
    pub max_blocks: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024,
            max_line_length: 64 * 1024,
            max_schema_fields: 256,
            max_entries_per_block: 100_000,
            max_blocks: 10_000,
        }
    }
}

impl Limits {
    /// Limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_input_size: usize::MAX,
            max_line_length: usize::MAX,
            max_schema_fields: usize::MAX,
            max_entries_per_block: usize::MAX,
            max_blocks: usize::MAX,
        }
    }
}
