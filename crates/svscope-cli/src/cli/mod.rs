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

//! Command-line structure for svscope.
//!
//! Subcommands are grouped by category and flattened into one top-level
//! list:
//!
//! - [`inspect`]: single-file views (tokens, preprocess, symbols)
//! - [`batch`]: indexing many files at once (index)
//! - [`utility`]: shell completion

mod batch;
mod inspect;
mod utility;

use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use svscope_core::{ParseOptions, UserDefine};

pub use batch::BatchCommands;
pub use inspect::InspectCommands;
pub use utility::UtilityCommands;

/// svscope - SystemVerilog source indexer
///
/// Tokenizes, preprocesses and indexes SystemVerilog sources.
///
/// # Examples
///
/// ```bash
/// # Show the symbols of one file
/// svscope -I rtl/include symbols rtl/top.sv
///
/// # Index a tree into a JSON report
/// svscope -D SIMULATION index rtl/*.sv --parallel -o index.json
/// ```
#[derive(Parser)]
#[command(name = "svscope")]
#[command(author, version, about = "svscope - SystemVerilog source indexer", long_about = None)]
pub struct Cli {
    /// Add a directory to the include search path
    #[arg(short = 'I', long = "include", value_name = "DIR", global = true)]
    pub include: Vec<PathBuf>,

    /// Predefine a macro, as NAME or NAME=VALUE
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]", global = true)]
    pub define: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Build parse options from the global flags.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidInput`] for a `-D` value without a macro
    /// name, such as `-D =1`.
    pub fn parse_options(&self) -> Result<ParseOptions, CliError> {
        let mut builder = ParseOptions::builder().include_paths(self.include.iter().cloned());
        for spec in &self.define {
            if UserDefine::parse(spec).is_none() {
                return Err(CliError::InvalidInput(format!(
                    "define '{}' has no macro name",
                    spec
                )));
            }
            builder = builder.define(spec);
        }
        Ok(builder.build())
    }

    /// Run the selected command.
    pub fn execute(self) -> Result<(), CliError> {
        let options = self.parse_options()?;
        self.command.execute(&options)
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Inspect(InspectCommands),

    #[command(flatten)]
    Batch(BatchCommands),

    #[command(flatten)]
    Utility(UtilityCommands),
}

impl Commands {
    /// Dispatch to the command's category.
    pub fn execute(self, options: &ParseOptions) -> Result<(), CliError> {
        match self {
            Commands::Inspect(cmd) => cmd.execute(options),
            Commands::Batch(cmd) => cmd.execute(options),
            Commands::Utility(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "svscope", "symbols", "top.sv", "-I", "inc", "-D", "W=8", "-D", "SIM",
        ])
        .unwrap();
        let options = cli.parse_options().unwrap();
        assert_eq!(options.include_paths, vec![PathBuf::from("inc")]);
        assert_eq!(options.defines.len(), 2);
        assert_eq!(options.defines[0].name, "W");
        assert_eq!(options.defines[0].value, "8");
        assert_eq!(options.defines[1].value, "");
    }

    #[test]
    fn test_define_without_name_rejected() {
        let cli = Cli::try_parse_from(["svscope", "-D", "=1", "preprocess", "top.sv"]).unwrap();
        assert!(matches!(
            cli.parse_options(),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_index_requires_files() {
        assert!(Cli::try_parse_from(["svscope", "index"]).is_err());
    }
}
