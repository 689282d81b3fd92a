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

//! Library backing the `mdex` binary.
//!
//! Commands:
//!
//! - **validate**: parse a document and report diagnostics; nonzero exit
//!   when any error is present
//! - **to-json**: project the parsed schemas, data and diagnostics to JSON
//! - **inspect**: human-readable summary of schemas and entry counts

pub mod cli;
pub mod commands;
