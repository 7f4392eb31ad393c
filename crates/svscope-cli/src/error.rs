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

//! Error types for the svscope CLI.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by CLI commands.
///
/// Problems inside a source file (unresolved includes, bad macro calls) are
/// not errors here; they are reported as diagnostics and the command still
/// succeeds. `CliError` covers what stops a command from producing output.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// File size exceeds the configured limit.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes")]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
    },

    /// The core library refused the input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serializing a report to JSON failed.
    #[error("JSON error: {message}")]
    Json { message: String },

    /// A command-line value was malformed, such as a `-D` define with no name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some files of a batch could not be indexed.
    #[error("{failed} of {total} files failed to index")]
    IndexFailed { failed: usize, total: usize },
}

impl CliError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io_error(path: impl AsRef<Path>, source: io::Error) -> Self {
        CliError::Io {
            path: path.as_ref().to_path_buf(),
            message: source.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json {
            message: err.to_string(),
        }
    }
}

impl From<svscope_core::SvError> for CliError {
    fn from(err: svscope_core::SvError) -> Self {
        match (err.kind, err.file.as_ref()) {
            (svscope_core::SvErrorKind::Io, Some(file)) => CliError::Io {
                path: PathBuf::from(file),
                message: err.message,
            },
            _ => CliError::Parse(err.to_string()),
        }
    }
}
