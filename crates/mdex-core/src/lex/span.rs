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

//! Source position tracking for the tokenizer.
//!
//! Every token carries the position of its first character so downstream
//! parsers can attach precise line/column information to diagnostics
//! without re-scanning the source.

use std::fmt;

/// A position in the source document.
///
/// Line and column are 1-indexed; `offset` is the 0-based byte offset of
/// the position in the original input. A default position (all zeros)
/// means "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePos {
    line: usize,
    column: usize,
    offset: usize,
}

impl SourcePos {
    /// Creates a new source position.
    #[inline]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position at the start of the document (line 1, column 1, offset 0).
    #[inline]
    pub const fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Returns the 1-based line number.
    #[inline]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the 1-based column number.
    #[inline]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Returns the 0-based byte offset.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Advances the position by `n` columns (`n` bytes on the same line).
    #[inline]
    pub fn advance_cols(&mut self, n: usize) {
        self.column += n;
        self.offset += n;
    }

    /// Moves past a newline: increments line, resets column, advances
    /// offset by the width of the line terminator.
    #[inline]
    pub fn next_line(&mut self, terminator_len: usize) {
        self.line += 1;
        self.column = 1;
        self.offset += terminator_len;
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
