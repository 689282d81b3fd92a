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

//! mdex command line interface.
//!
//! ```bash
//! # Validate a document
//! mdex validate notes.md
//!
//! # Convert the embedded data to JSON
//! mdex to-json notes.md --compact
//!
//! # Summarize schemas and entries
//! mdex inspect notes.md
//! ```

use clap::Parser;
use mdex_cli::cli::Commands;
use std::process::ExitCode;

/// Markdown Data Extensions toolkit.
#[derive(Parser)]
#[command(name = "mdex")]
#[command(author, version, about = "Markdown Data Extensions toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
