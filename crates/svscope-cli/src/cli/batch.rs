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

//! Batch indexing commands.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;
use svscope_core::ParseOptions;

/// Commands that work on many files.
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Index a set of files into a JSON report
    ///
    /// Each entry holds the file's compact symbol encoding, the packages it
    /// depends on, its includes and any diagnostics. Files that cannot be
    /// read are listed with an error and make the command fail after the
    /// report is written.
    Index {
        /// Input file paths
        #[arg(value_name = "FILES", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Index files in parallel, one session per worker
        #[arg(short, long)]
        parallel: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl BatchCommands {
    pub fn execute(self, options: &ParseOptions) -> Result<(), CliError> {
        match self {
            BatchCommands::Index {
                files,
                parallel,
                output,
            } => commands::index(&files, parallel, output.as_deref(), options),
        }
    }
}
