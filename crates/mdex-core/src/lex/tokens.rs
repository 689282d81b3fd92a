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

//! Token model and identifier validation.
//!
//! `TokenKind` is a closed sum type so the block scanner and both data
//! sub-parsers are forced to handle every kind exhaustively.

use crate::lex::span::SourcePos;
use std::fmt;

/// The kind of block a `!?` line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockType {
    /// A schema definition block (`!? datadef <name>`).
    DataDef,
    /// A data entry block (`!? data <name>`).
    Data,
}

impl BlockType {
    /// Parses a block type keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "datadef" => Some(Self::DataDef),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    /// The keyword used in block start lines.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::DataDef => "datadef",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The parsed payload of a well-formed block start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Whether this opens a schema definition or a data block.
    pub block_type: BlockType,
    /// The declared schema name.
    pub schema_name: String,
    /// External schema path from the `[name](path)` form, if present.
    pub external_path: Option<String>,
}

/// Token kinds produced by the tokenizer.
///
/// For `FieldDef`, `IndexDef` and `FieldValue` the token's `raw` field
/// holds the payload after the marker (`!fname:`, `!index:`, `!`); for all
/// other kinds it holds the raw line text.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `!? <type> <name>` — opens a block.
    BlockStart(BlockHeader),
    /// `!#` — closes the current block.
    BlockEnd,
    /// `!fname: <payload>` — a field definition line.
    FieldDef,
    /// `!index: <payload>` — an index definition line.
    IndexDef,
    /// `!<name>[:] <value>` — a free-form assignment line.
    FieldValue,
    /// `!-` — separates free-form records.
    RecordSeparator,
    /// A `|`-delimited row containing at least one `!`-prefixed cell.
    TableHeader,
    /// Any other `|`-delimited row.
    TableRow,
    /// `<!-- ... -->`, possibly spanning lines.
    Comment,
    /// Plain markdown text.
    Text,
    /// A line terminator.
    Newline,
    /// A standalone `[name](path)` reference at the start of a line.
    ExternalRef {
        /// The reference name.
        name: String,
        /// The reference target path.
        path: String,
    },
    /// End of input; always the final token.
    Eof,
}

impl TokenKind {
    /// Returns `true` for kinds that only make sense inside a block.
    ///
    /// These are the kinds that trigger a `missing_block_start` diagnostic
    /// when they appear outside any block.
    pub fn is_data_shaped(&self) -> bool {
        matches!(
            self,
            Self::FieldDef
                | Self::IndexDef
                | Self::FieldValue
                | Self::RecordSeparator
                | Self::TableHeader
                | Self::TableRow
        )
    }

    /// Returns `true` for tokens that do not count as block content when
    /// deciding whether a block is empty.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment | Self::Newline)
    }
}

/// A positioned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What the tokenizer recognized.
    pub kind: TokenKind,
    /// Raw source text (payload only for definition/value kinds).
    pub raw: String,
    /// Position of the token's first character.
    pub pos: SourcePos,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            kind,
            raw: raw.into(),
            pos,
        }
    }

    /// Shorthand for the token's 1-based line number.
    #[inline]
    pub fn line(&self) -> usize {
        self.pos.line()
    }
}

/// Checks whether a string is a valid schema or field name:
/// a letter followed by letters, digits or underscores.
pub fn is_valid_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes[1..]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== BlockType tests ====================

    #[test]
    fn test_block_type_from_keyword() {
        assert_eq!(BlockType::from_keyword("datadef"), Some(BlockType::DataDef));
        assert_eq!(BlockType::from_keyword("data"), Some(BlockType::Data));
        assert_eq!(BlockType::from_keyword("schema"), None);
        assert_eq!(BlockType::from_keyword(""), None);
        assert_eq!(BlockType::from_keyword("Data"), None);
    }

    #[test]
    fn test_block_type_display() {
        assert_eq!(format!("{}", BlockType::DataDef), "datadef");
        assert_eq!(format!("{}", BlockType::Data), "data");
    }

    // ==================== TokenKind tests ====================

    #[test]
    fn test_data_shaped_kinds() {
        assert!(TokenKind::FieldDef.is_data_shaped());
        assert!(TokenKind::IndexDef.is_data_shaped());
        assert!(TokenKind::FieldValue.is_data_shaped());
        assert!(TokenKind::RecordSeparator.is_data_shaped());
        assert!(TokenKind::TableHeader.is_data_shaped());
        assert!(TokenKind::TableRow.is_data_shaped());

        assert!(!TokenKind::Text.is_data_shaped());
        assert!(!TokenKind::Comment.is_data_shaped());
        assert!(!TokenKind::Newline.is_data_shaped());
        assert!(!TokenKind::BlockEnd.is_data_shaped());
        assert!(!TokenKind::Eof.is_data_shaped());
    }

    #[test]
    fn test_trivia_kinds() {
        assert!(TokenKind::Comment.is_trivia());
        assert!(TokenKind::Newline.is_trivia());
        assert!(!TokenKind::Text.is_trivia());
        assert!(!TokenKind::FieldValue.is_trivia());
    }

    // ==================== is_valid_name tests ====================

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("customers"));
        assert!(is_valid_name("Order2"));
        assert!(is_valid_name("first_name"));
        assert!(is_valid_name("a"));
        assert!(is_valid_name("A1_b2"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1customers"));
        assert!(!is_valid_name("_private"));
        assert!(!is_valid_name("my-name"));
        assert!(!is_valid_name("my name"));
        assert!(!is_valid_name("naïve"));
    }

    // ==================== Token tests ====================

    #[test]
    fn test_token_line_shorthand() {
        let tok = Token::new(TokenKind::BlockEnd, "!#", SourcePos::new(7, 1, 40));
        assert_eq!(tok.line(), 7);
    }
}
