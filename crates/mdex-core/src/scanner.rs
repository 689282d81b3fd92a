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

//! Block structure recognition.
//!
//! The scanner walks the token stream once, pairing `!?`/`!#` markers into
//! blocks. At most one block is open at a time: a nested `!?` is rejected
//! and the open block stays open. Structural problems degrade to
//! diagnostics; every well-formed block (and the trailing unclosed one, if
//! any) is still collected for routing.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::lex::{BlockType, Token, TokenKind};

/// Metadata of one `!? ... !#` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Whether this is a schema definition or a data block.
    pub block_type: BlockType,
    /// Schema name declared on the start line.
    pub schema_name: String,
    /// External schema path, when declared as `[name](path)`.
    pub external_path: Option<String>,
    /// 1-based sequential block number, used for diagnostic context.
    pub number: usize,
    /// Line of the `!?` marker.
    pub start_line: usize,
    /// Line of the `!#` marker; `None` when the block was never closed.
    pub end_line: Option<usize>,
}

/// One scanned block: its metadata plus the content tokens between the
/// markers (markers themselves excluded).
#[derive(Debug, Clone)]
pub struct Block {
    pub info: BlockInfo,
    pub tokens: Vec<Token>,
}

impl Block {
    /// Returns `true` if the block holds no content besides comments and
    /// newlines.
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(|t| t.kind.is_trivia())
    }
}

/// Pairs block markers over one pass of the token stream.
pub(crate) fn scan_blocks(tokens: &[Token], diags: &mut Vec<Diagnostic>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut open: Option<Block> = None;
    let mut counter = 0usize;

    for token in tokens {
        match &token.kind {
            TokenKind::BlockStart(header) => {
                if let Some(current) = &open {
                    diags.push(
                        Diagnostic::new(
                            DiagnosticKind::NestedBlocks,
                            format!(
                                "block '{}' opened before block '{}' (line {}) was closed",
                                header.schema_name,
                                current.info.schema_name,
                                current.info.start_line
                            ),
                            token.line(),
                        )
                        .in_block(current.info.number, current.info.block_type),
                    );
                } else {
                    counter += 1;
                    open = Some(Block {
                        info: BlockInfo {
                            block_type: header.block_type,
                            schema_name: header.schema_name.clone(),
                            external_path: header.external_path.clone(),
                            number: counter,
                            start_line: token.line(),
                            end_line: None,
                        },
                        tokens: Vec::new(),
                    });
                }
            }
            TokenKind::BlockEnd => match open.take() {
                Some(mut block) => {
                    block.info.end_line = Some(token.line());
                    if block.is_empty() {
                        diags.push(
                            Diagnostic::new(
                                DiagnosticKind::EmptyBlock,
                                format!("block '{}' has no content", block.info.schema_name),
                                block.info.start_line,
                            )
                            .with_schema(&block.info.schema_name)
                            .in_block(block.info.number, block.info.block_type),
                        );
                    }
                    blocks.push(block);
                }
                None => {
                    diags.push(Diagnostic::new(
                        DiagnosticKind::UnmatchedBlockEnd,
                        "'!#' without a matching '!?'",
                        token.line(),
                    ));
                }
            },
            TokenKind::Eof => {
                if let Some(mut block) = open.take() {
                    diags.push(
                        Diagnostic::new(
                            DiagnosticKind::BlockNotClosed,
                            format!(
                                "block '{}' opened at line {} is never closed",
                                block.info.schema_name, block.info.start_line
                            ),
                            block.info.start_line,
                        )
                        .with_schema(&block.info.schema_name)
                        .in_block(block.info.number, block.info.block_type),
                    );
                    block.info.end_line = None;
                    // Best-effort: the accumulated content is still routed.
                    blocks.push(block);
                }
            }
            kind => match &mut open {
                Some(block) => block.tokens.push(token.clone()),
                None => {
                    if kind.is_data_shaped() {
                        diags.push(Diagnostic::new(
                            DiagnosticKind::MissingBlockStart,
                            "data content outside of a '!? ... !#' block",
                            token.line(),
                        ));
                    }
                    // Plain text, comments and newlines between blocks are
                    // ordinary markdown.
                }
            },
        }
    }

    blocks
}
