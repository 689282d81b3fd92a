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

//! Lexical analysis for Markdown Data Extensions.
//!
//! [`tokenize`] converts a full document into a flat token sequence in a
//! single forward pass, using bounded lookahead to disambiguate the `!`
//! markers (`!?`, `!#`, `!-`, `!fname:`, `!index:`), HTML comments, and
//! bracketed external references. Lexical problems are reported as
//! diagnostics alongside the tokens; tokenization always runs to the end
//! of input and finishes with an [`TokenKind::Eof`] token.

pub mod span;
pub mod tokens;

pub use span::SourcePos;
pub use tokens::{is_valid_name, BlockHeader, BlockType, Token, TokenKind};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::limits::Limits;
use memchr::memchr;
use memchr::memmem;

/// Tokenizes a document.
///
/// Returns the token stream (terminated by `Eof`) and any lexical
/// diagnostics. Diagnostics never abort tokenization.
pub fn tokenize(input: &str, limits: &Limits) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut t = Tokenizer::new(input, limits);
    t.run();
    (t.tokens, t.diags)
}

struct Tokenizer<'a> {
    input: &'a str,
    limits: &'a Limits,
    /// Current byte offset.
    offset: usize,
    /// Current 1-based line number.
    line: usize,
    /// Byte offset where the current line starts.
    line_start: usize,
    tokens: Vec<Token>,
    diags: Vec<Diagnostic>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, limits: &'a Limits) -> Self {
        Self {
            input,
            limits,
            offset: 0,
            line: 1,
            line_start: 0,
            tokens: Vec::new(),
            diags: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.offset < self.input.len() {
            self.next_unit();
        }
        let eof_pos = SourcePos::new(self.line, self.offset - self.line_start + 1, self.offset);
        self.tokens.push(Token::new(TokenKind::Eof, "", eof_pos));
    }

    /// Position of the byte at `abs`.
    fn pos_at(&self, abs: usize) -> SourcePos {
        SourcePos::new(self.line, abs - self.line_start + 1, abs)
    }

    /// Scans one logical unit starting at `self.offset`.
    ///
    /// A unit is usually a whole line, but a comment or an external
    /// reference consumes only its own extent and leaves the remainder of
    /// the line as the next unit.
    fn next_unit(&mut self) {
        let bytes = self.input.as_bytes();
        let (content_end, next_offset, has_newline) =
            match memchr(b'\n', &bytes[self.offset..]) {
                Some(rel) => {
                    let nl = self.offset + rel;
                    let end = if nl > self.offset && bytes[nl - 1] == b'\r' {
                        nl - 1
                    } else {
                        nl
                    };
                    (end, nl + 1, true)
                }
                None => (self.input.len(), self.input.len(), false),
            };

        let segment = &self.input[self.offset..content_end];
        if segment.len() > self.limits.max_line_length {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::LimitExceeded,
                format!(
                    "line length {} exceeds limit {}",
                    segment.len(),
                    self.limits.max_line_length
                ),
                self.line,
            ));
            self.finish_line(content_end, next_offset, has_newline);
            return;
        }

        let content = segment.trim_start();
        let content_start = self.offset + (segment.len() - content.len());
        let content = content.trim_end();
        let pos = self.pos_at(content_start);

        if content.is_empty() {
            self.finish_line(content_end, next_offset, has_newline);
            return;
        }

        if content.starts_with("<!--") {
            self.scan_comment(content_start);
            return;
        }
        if content.starts_with('[') {
            if self.scan_external_ref(content_start, content) {
                return;
            }
            self.tokens.push(Token::new(TokenKind::Text, content, pos));
            self.finish_line(content_end, next_offset, has_newline);
            return;
        }

        if let Some(rest) = content.strip_prefix('!') {
            self.scan_marker_line(content, rest, pos);
        } else if content.starts_with('|') {
            let is_header = content.split('|').any(|c| c.trim().starts_with('!'));
            let kind = if is_header {
                TokenKind::TableHeader
            } else {
                TokenKind::TableRow
            };
            self.tokens.push(Token::new(kind, content, pos));
        } else {
            self.tokens.push(Token::new(TokenKind::Text, content, pos));
        }
        self.finish_line(content_end, next_offset, has_newline);
    }

    /// Dispatches a line starting with `!`.
    fn scan_marker_line(&mut self, content: &str, rest: &str, pos: SourcePos) {
        if let Some(after) = rest.strip_prefix('?') {
            match self.scan_block_start(after, pos) {
                Some(header) => {
                    self.tokens
                        .push(Token::new(TokenKind::BlockStart(header), content, pos));
                }
                // Malformed block start degrades to text; the diagnostic
                // has already been reported.
                None => self.tokens.push(Token::new(TokenKind::Text, content, pos)),
            }
        } else if rest.starts_with('#') {
            self.tokens.push(Token::new(TokenKind::BlockEnd, content, pos));
        } else if rest.starts_with('-') {
            self.tokens
                .push(Token::new(TokenKind::RecordSeparator, content, pos));
        } else if let Some(payload) = rest.strip_prefix("fname:") {
            self.tokens
                .push(Token::new(TokenKind::FieldDef, payload.trim(), pos));
        } else if let Some(payload) = rest.strip_prefix("index:") {
            self.tokens
                .push(Token::new(TokenKind::IndexDef, payload.trim(), pos));
        } else if rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.tokens
                .push(Token::new(TokenKind::FieldValue, rest.trim(), pos));
        } else {
            // `!` followed by anything that cannot start a field name
            // (markdown images, a bare `!`) stays plain text.
            self.tokens.push(Token::new(TokenKind::Text, content, pos));
        }
    }

    /// Parses the payload of a `!?` line. Returns `None` after reporting a
    /// diagnostic when the payload is malformed.
    fn scan_block_start(&mut self, after_marker: &str, pos: SourcePos) -> Option<BlockHeader> {
        let rest = after_marker.trim_start();
        if rest.is_empty() {
            self.diags.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidBlockSyntax,
                    "missing block type after '!?'",
                    pos.line(),
                )
                .with_column(pos.column()),
            );
            return None;
        }

        let (word, after_word) = match rest.find(char::is_whitespace) {
            Some(i) => (&rest[..i], rest[i..].trim_start()),
            None => (rest, ""),
        };
        let block_type = match BlockType::from_keyword(word) {
            Some(bt) => bt,
            None => {
                self.diags.push(
                    Diagnostic::new(
                        DiagnosticKind::InvalidBlockType,
                        format!("unknown block type '{}', expected 'datadef' or 'data'", word),
                        pos.line(),
                    )
                    .with_column(pos.column()),
                );
                return None;
            }
        };

        let name_part = after_word.trim();
        if name_part.is_empty() {
            self.diags.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidBlockSyntax,
                    format!("missing schema name after '!? {}'", word),
                    pos.line(),
                )
                .with_column(pos.column()),
            );
            return None;
        }

        if name_part.starts_with('[') {
            if block_type != BlockType::Data {
                self.diags.push(Diagnostic::new(
                    DiagnosticKind::InvalidBlockSyntax,
                    "external schema references are only valid on data blocks",
                    pos.line(),
                ));
                return None;
            }
            return self.scan_block_external(name_part, pos).map(|(name, path)| BlockHeader {
                block_type,
                schema_name: name,
                external_path: Some(path),
            });
        }

        if !is_valid_name(name_part) {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::InvalidSchemaName,
                format!(
                    "invalid schema name '{}': must start with a letter followed by letters, digits or underscores",
                    name_part
                ),
                pos.line(),
            ));
            return None;
        }

        Some(BlockHeader {
            block_type,
            schema_name: name_part.to_string(),
            external_path: None,
        })
    }

    /// Parses the `[name](path)` form of a block start payload.
    fn scan_block_external(&mut self, part: &str, pos: SourcePos) -> Option<(String, String)> {
        let close = match part.find(']') {
            Some(i) => i,
            None => {
                self.diags.push(Diagnostic::new(
                    DiagnosticKind::InvalidSchemaName,
                    "unclosed '[' in external schema reference",
                    pos.line(),
                ));
                return None;
            }
        };
        let name = part[1..close].trim();
        let after = &part[close + 1..];
        if !after.starts_with('(') {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::InvalidBlockSyntax,
                "expected '(' after ']' in external schema reference",
                pos.line(),
            ));
            return None;
        }
        let paren = &after[1..];
        let pclose = match paren.find(')') {
            Some(i) => i,
            None => {
                self.diags.push(Diagnostic::new(
                    DiagnosticKind::UnclosedReference,
                    "unclosed '(' in external schema reference",
                    pos.line(),
                ));
                return None;
            }
        };
        let path = paren[..pclose].trim();
        if path.is_empty() {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::EmptyReferencePath,
                "empty path in external schema reference",
                pos.line(),
            ));
            return None;
        }
        if !is_valid_name(name) {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::InvalidSchemaName,
                format!("invalid schema name '{}' in external reference", name),
                pos.line(),
            ));
            return None;
        }
        Some((name.to_string(), path.to_string()))
    }

    /// Scans a `<!-- -->` comment, which may span lines. On success the
    /// cursor lands just past `-->`, leaving any trailing text on the line
    /// as the next logical unit.
    fn scan_comment(&mut self, start_abs: usize) {
        let pos = self.pos_at(start_abs);
        match memmem::find(self.input[start_abs..].as_bytes(), b"-->") {
            Some(rel) => {
                let end_abs = start_abs + rel + 3;
                let raw = &self.input[start_abs..end_abs];
                self.tokens
                    .push(Token::new(TokenKind::Comment, raw, pos));
                self.advance_over(start_abs, end_abs);
                // A comment that ends exactly at end of line still needs
                // its newline consumed; the main loop handles that by
                // seeing an all-whitespace remainder.
            }
            None => {
                self.diags.push(
                    Diagnostic::new(
                        DiagnosticKind::UnterminatedComment,
                        "comment is never closed with '-->'",
                        pos.line(),
                    )
                    .with_column(pos.column()),
                );
                let raw = &self.input[start_abs..];
                self.tokens
                    .push(Token::new(TokenKind::Comment, raw, pos));
                self.advance_over(start_abs, self.input.len());
            }
        }
    }

    /// Tries to scan a standalone `[name](path)` reference. Returns `true`
    /// if a token was produced and the cursor advanced; `false` to fall
    /// back to plain text.
    fn scan_external_ref(&mut self, start_abs: usize, content: &str) -> bool {
        let pos = self.pos_at(start_abs);
        let Some(close) = content.find(']') else {
            return false;
        };
        let after = &content[close + 1..];
        if !after.starts_with('(') {
            return false;
        }
        let Some(pclose) = after.find(')') else {
            self.diags.push(
                Diagnostic::new(
                    DiagnosticKind::UnclosedReference,
                    "unclosed '(' in reference",
                    pos.line(),
                )
                .with_column(pos.column()),
            );
            return false;
        };
        let name = content[1..close].trim();
        let path = after[1..pclose].trim();
        if path.is_empty() {
            self.diags.push(
                Diagnostic::new(
                    DiagnosticKind::EmptyReferencePath,
                    "empty path in reference",
                    pos.line(),
                )
                .with_column(pos.column()),
            );
            return false;
        }
        let raw_len = close + 1 + pclose + 1;
        self.tokens.push(Token::new(
            TokenKind::ExternalRef {
                name: name.to_string(),
                path: path.to_string(),
            },
            &content[..raw_len],
            pos,
        ));
        self.advance_over(start_abs, start_abs + raw_len);
        true
    }

    /// Consumes the rest of the current line and its terminator, emitting
    /// the `Newline` token.
    fn finish_line(&mut self, content_end: usize, next_offset: usize, has_newline: bool) {
        if has_newline {
            let pos = self.pos_at(content_end);
            self.tokens.push(Token::new(TokenKind::Newline, "\n", pos));
            self.line += 1;
            self.line_start = next_offset;
        }
        self.offset = next_offset;
    }

    /// Moves the cursor from `from` to `to`, keeping line accounting in
    /// sync across any newlines inside the consumed slice.
    fn advance_over(&mut self, from: usize, to: usize) {
        let slice = self.input[from..to].as_bytes();
        let mut searched = 0;
        while let Some(rel) = memchr(b'\n', &slice[searched..]) {
            let abs = from + searched + rel;
            self.line += 1;
            self.line_start = abs + 1;
            searched += rel + 1;
        }
        self.offset = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        tokenize(input, &Limits::default())
    }

    fn kinds(tokens: &[Token]) -> Vec<&TokenKind> {
        tokens.iter().map(|t| &t.kind).collect()
    }

    fn non_trivia(tokens: &[Token]) -> Vec<&Token> {
        tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .collect()
    }

    // ==================== Basic recognition ====================

    #[test]
    fn test_empty_input() {
        let (tokens, diags) = lex("");
        assert_eq!(kinds(&tokens), vec![&TokenKind::Eof]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_plain_text_line() {
        let (tokens, diags) = lex("just some markdown\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].raw, "just some markdown");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_block_start_datadef() {
        let (tokens, diags) = lex("!? datadef people\n");
        assert!(diags.is_empty());
        match &tokens[0].kind {
            TokenKind::BlockStart(h) => {
                assert_eq!(h.block_type, BlockType::DataDef);
                assert_eq!(h.schema_name, "people");
                assert!(h.external_path.is_none());
            }
            other => panic!("expected block start, got {:?}", other),
        }
    }

    #[test]
    fn test_block_start_data_external() {
        let (tokens, diags) = lex("!? data [customers](./schemas/customers.md)\n");
        assert!(diags.is_empty());
        match &tokens[0].kind {
            TokenKind::BlockStart(h) => {
                assert_eq!(h.block_type, BlockType::Data);
                assert_eq!(h.schema_name, "customers");
                assert_eq!(h.external_path.as_deref(), Some("./schemas/customers.md"));
            }
            other => panic!("expected block start, got {:?}", other),
        }
    }

    #[test]
    fn test_block_end_and_separator() {
        let (tokens, _) = lex("!#\n!-\n");
        let toks = non_trivia(&tokens);
        assert_eq!(toks[0].kind, TokenKind::BlockEnd);
        assert_eq!(toks[1].kind, TokenKind::RecordSeparator);
    }

    #[test]
    fn test_field_and_index_definitions() {
        let (tokens, _) = lex("!fname: name, type: text\n!index: \"name+email\"\n");
        let toks = non_trivia(&tokens);
        assert_eq!(toks[0].kind, TokenKind::FieldDef);
        assert_eq!(toks[0].raw, "name, type: text");
        assert_eq!(toks[1].kind, TokenKind::IndexDef);
        assert_eq!(toks[1].raw, "\"name+email\"");
    }

    #[test]
    fn test_field_value_line() {
        let (tokens, _) = lex("!name John Doe\n");
        assert_eq!(tokens[0].kind, TokenKind::FieldValue);
        assert_eq!(tokens[0].raw, "name John Doe");
    }

    #[test]
    fn test_table_header_vs_row() {
        let (tokens, _) = lex("| !name | !age |\n| John | 41 |\n");
        let toks = non_trivia(&tokens);
        assert_eq!(toks[0].kind, TokenKind::TableHeader);
        assert_eq!(toks[1].kind, TokenKind::TableRow);
    }

    #[test]
    fn test_markdown_image_is_text() {
        let (tokens, diags) = lex("![logo](logo.png)\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_bare_bang_is_text() {
        let (tokens, _) = lex("!\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }

    // ==================== Comments ====================

    #[test]
    fn test_single_line_comment() {
        let (tokens, diags) = lex("<!-- note -->\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].raw, "<!-- note -->");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_multi_line_comment() {
        let (tokens, diags) = lex("<!-- first\nsecond -->\ntext\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert!(tokens[0].raw.contains("second"));
        assert!(diags.is_empty());
        let text = tokens.iter().find(|t| t.kind == TokenKind::Text).unwrap();
        assert_eq!(text.raw, "text");
        assert_eq!(text.line(), 3);
    }

    #[test]
    fn test_unterminated_comment_reported() {
        let (tokens, diags) = lex("<!-- never closed\nmore\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnterminatedComment);
        // Everything after the open marker is swallowed by the comment.
        assert_eq!(
            kinds(&tokens),
            vec![&TokenKind::Comment, &TokenKind::Eof]
        );
    }

    #[test]
    fn test_text_after_comment_on_same_line() {
        let (tokens, _) = lex("<!-- c --> trailing\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[1].raw, "trailing");
    }

    // ==================== External references ====================

    #[test]
    fn test_standalone_external_ref() {
        let (tokens, diags) = lex("[people](./people.md)\n");
        match &tokens[0].kind {
            TokenKind::ExternalRef { name, path } => {
                assert_eq!(name, "people");
                assert_eq!(path, "./people.md");
            }
            other => panic!("expected external ref, got {:?}", other),
        }
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unclosed_bracket_falls_back_to_text() {
        let (tokens, diags) = lex("[not a ref\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unclosed_paren_reported() {
        let (tokens, diags) = lex("[ref](path\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnclosedReference);
    }

    #[test]
    fn test_empty_ref_path_reported() {
        let (tokens, diags) = lex("[ref]()\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::EmptyReferencePath);
    }

    // ==================== Block start errors ====================

    #[test]
    fn test_missing_block_type() {
        let (tokens, diags) = lex("!?\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidBlockSyntax);
    }

    #[test]
    fn test_invalid_block_type() {
        let (_, diags) = lex("!? schema people\n");
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidBlockType);
        assert!(diags[0].message.contains("schema"));
    }

    #[test]
    fn test_missing_schema_name() {
        let (_, diags) = lex("!? datadef\n");
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidBlockSyntax);
    }

    #[test]
    fn test_invalid_schema_name() {
        let (_, diags) = lex("!? datadef 1people\n");
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidSchemaName);
    }

    #[test]
    fn test_block_external_unclosed_paren() {
        let (_, diags) = lex("!? data [customers](./x.md\n");
        assert_eq!(diags[0].kind, DiagnosticKind::UnclosedReference);
    }

    #[test]
    fn test_block_external_empty_path() {
        let (_, diags) = lex("!? data [customers]()\n");
        assert_eq!(diags[0].kind, DiagnosticKind::EmptyReferencePath);
    }

    #[test]
    fn test_external_on_datadef_rejected() {
        let (_, diags) = lex("!? datadef [people](./p.md)\n");
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidBlockSyntax);
    }

    // ==================== Position tracking ====================

    #[test]
    fn test_line_numbers() {
        let (tokens, _) = lex("first\nsecond\nthird");
        let texts: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Text)
            .collect();
        assert_eq!(texts[0].line(), 1);
        assert_eq!(texts[1].line(), 2);
        assert_eq!(texts[2].line(), 3);
    }

    #[test]
    fn test_column_of_indented_token() {
        let (tokens, _) = lex("   !name v\n");
        assert_eq!(tokens[0].kind, TokenKind::FieldValue);
        assert_eq!(tokens[0].pos.column(), 4);
    }

    #[test]
    fn test_offsets_are_bytewise() {
        let (tokens, _) = lex("ab\n!x y\n");
        let fv = tokens
            .iter()
            .find(|t| t.kind == TokenKind::FieldValue)
            .unwrap();
        assert_eq!(fv.pos.offset(), 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let (tokens, diags) = lex("!? datadef t\r\n!fname: name\r\n!#\r\n");
        assert!(diags.is_empty());
        let toks = non_trivia(&tokens);
        assert!(matches!(toks[0].kind, TokenKind::BlockStart(_)));
        assert_eq!(toks[1].kind, TokenKind::FieldDef);
        assert_eq!(toks[1].raw, "name");
        assert_eq!(toks[2].kind, TokenKind::BlockEnd);
        assert_eq!(toks[1].line(), 2);
    }

    #[test]
    fn test_always_terminates_with_eof() {
        for input in ["", "\n", "!?", "<!--", "| a |", "!? bad"] {
            let (tokens, _) = lex(input);
            assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof, "input: {:?}", input);
        }
    }

    // ==================== Limits ====================

    #[test]
    fn test_line_length_limit() {
        let mut limits = Limits::default();
        limits.max_line_length = 8;
        let (tokens, diags) = tokenize("short\nthis line is too long\nok\n", &limits);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::LimitExceeded);
        assert_eq!(diags[0].line, 2);
        let texts: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Text)
            .map(|t| t.raw.as_str())
            .collect();
        assert_eq!(texts, vec!["short", "ok"]);
    }
}
