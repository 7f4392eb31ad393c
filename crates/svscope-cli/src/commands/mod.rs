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

//! CLI command implementations.

mod completion;
mod index;
mod preprocess;
mod symbols;
mod tokens;

pub use completion::generate_completion_for_command;
pub use index::{index, index_files, FileReport, IndexReport};
pub use preprocess::preprocess;
pub use symbols::{render_tree, symbols};
pub use tokens::{render_tokens, tokens};

use crate::error::CliError;
use colored::Colorize;
use std::fs;
use std::path::Path;
use svscope_core::SvError;

/// Read a source file, rejecting files over `max_size` bytes before
/// loading them.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the file cannot be read or is not UTF-8, and
/// [`CliError::FileTooLarge`] if it exceeds `max_size`.
pub fn read_source(path: &Path, max_size: usize) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;
    if metadata.len() > max_size as u64 {
        return Err(CliError::FileTooLarge {
            path: path.to_path_buf(),
            actual: metadata.len(),
            max: max_size as u64,
        });
    }
    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// The name a file is indexed under.
pub(crate) fn file_key(path: &Path) -> String {
    path.display().to_string()
}

/// Print diagnostics to stderr.
pub(crate) fn report_diagnostics(diagnostics: &[SvError]) {
    for diagnostic in diagnostics {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
}
