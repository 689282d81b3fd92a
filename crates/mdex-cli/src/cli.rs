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

//! Command definitions and dispatch.

use crate::commands;
use clap::Subcommand;

/// All mdex subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a document's embedded schemas and data
    Validate {
        /// Path to the markdown file
        file: String,
    },
    /// Convert a document's embedded data to JSON
    ToJson {
        /// Path to the markdown file
        file: String,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Attach line/index metadata to each entry
        #[arg(long)]
        positions: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Summarize the schemas and entries in a document
    Inspect {
        /// Path to the markdown file
        file: String,
    },
}

impl Commands {
    /// Executes the selected command.
    pub fn execute(self) -> Result<(), String> {
        match self {
            Commands::Validate { file } => commands::validate(&file),
            Commands::ToJson {
                file,
                compact,
                positions,
                output,
            } => commands::to_json(&file, compact, positions, output.as_deref()),
            Commands::Inspect { file } => commands::inspect(&file),
        }
    }
}
