// Dweve svscope - SystemVerilog Source Indexer
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
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

//! Single-file inspection commands.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;
use svscope_core::ParseOptions;

/// Commands that show one stage of the pipeline for one file.
#[derive(Subcommand)]
pub enum InspectCommands {
    /// Print the tokens of a file
    ///
    /// Uses the structural grammar by default, or the preprocessor grammar
    /// with `--preproc`. The file is not preprocessed first.
    Tokens {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Tokenize with the preprocessor grammar
        #[arg(long)]
        preproc: bool,
    },

    /// Print a file after macro expansion, includes and conditionals
    Preprocess {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the symbols declared in a file
    ///
    /// Shows an indented tree by default. `--json` prints the compact
    /// positional array encoding used for symbol caches.
    Symbols {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the compact JSON encoding
        #[arg(long)]
        json: bool,
    },
}

impl InspectCommands {
    pub fn execute(self, options: &ParseOptions) -> Result<(), CliError> {
        match self {
            InspectCommands::Tokens { file, preproc } => commands::tokens(&file, preproc, options),
            InspectCommands::Preprocess { file } => commands::preprocess(&file, options),
            InspectCommands::Symbols { file, json } => commands::symbols(&file, json, options),
        }
    }
}
