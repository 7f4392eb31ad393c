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

//! Batch indexing of many files into one JSON report.

use super::{file_key, read_source};
use crate::error::CliError;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use svscope_core::{ParseOptions, Session, SvError};
use tracing::debug;

/// Index result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    /// Compact symbol encoding, absent if the file could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<serde_json::Value>,
    pub pkgdeps: Vec<String>,
    pub includes: Vec<String>,
    pub diagnostics: Vec<SvError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn failed(file: String, error: &CliError) -> Self {
        Self {
            file,
            symbols: None,
            pkgdeps: Vec::new(),
            includes: Vec::new(),
            diagnostics: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Index results for a batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub files: Vec<FileReport>,
    pub indexed: usize,
    pub failed: usize,
}

/// Index `files` and write the report to `output` or stdout.
///
/// # Errors
///
/// Returns [`CliError::IndexFailed`] after the report is written if any file
/// could not be read, or an I/O error if the report cannot be written.
pub fn index(
    files: &[PathBuf],
    parallel: bool,
    output: Option<&Path>,
    options: &ParseOptions,
) -> Result<(), CliError> {
    let report = index_files(files, parallel, options);
    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => fs::write(path, json + "\n").map_err(|e| CliError::io_error(path, e))?,
        None => println!("{}", json),
    }

    for entry in report.files.iter().filter(|f| f.error.is_some()) {
        eprintln!(
            "{} {} - {}",
            "✗".red().bold(),
            entry.file,
            entry.error.as_deref().unwrap_or_default()
        );
    }
    eprintln!(
        "{} {}  {} {}",
        "Indexed:".green().bold(),
        report.indexed,
        "Failed:".red().bold(),
        report.failed
    );

    if report.failed > 0 {
        return Err(CliError::IndexFailed {
            failed: report.failed,
            total: files.len(),
        });
    }
    Ok(())
}

/// Index `files` without printing anything.
///
/// Sequential runs share one session, so headers included by several files
/// are read once. Parallel runs give each worker its own session.
pub fn index_files(files: &[PathBuf], parallel: bool, options: &ParseOptions) -> IndexReport {
    let reports: Vec<FileReport> = if parallel {
        files
            .par_iter()
            .map_init(
                || Session::new(options.clone()),
                |session, path| index_one(session, path),
            )
            .collect()
    } else {
        let mut session = Session::new(options.clone());
        files.iter().map(|path| index_one(&mut session, path)).collect()
    };

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    IndexReport {
        indexed: reports.len() - failed,
        failed,
        files: reports,
    }
}

fn index_one(session: &mut Session, path: &Path) -> FileReport {
    let file = file_key(path);
    let text = match read_source(path, session.options().limits.max_file_size) {
        Ok(text) => text,
        Err(e) => return FileReport::failed(file, &e),
    };
    let output = session.parse(&file, &text);
    debug!(
        file = %file,
        containers = output.symbols.containers.len(),
        diagnostics = output.diagnostics.len(),
        "indexed"
    );
    FileReport {
        symbols: Some(output.symbols.to_value()),
        pkgdeps: output.pkgdeps.into_iter().collect(),
        includes: output.symbols.includes.clone(),
        diagnostics: output.diagnostics,
        error: None,
        file,
    }
}
