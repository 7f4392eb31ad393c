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

//! Preprocessed text dump.

use super::{file_key, read_source, report_diagnostics};
use crate::error::CliError;
use std::path::Path;
use svscope_core::{ParseOptions, Session};

/// Print `file` after preprocessing. Diagnostics go to stderr.
pub fn preprocess(file: &Path, options: &ParseOptions) -> Result<(), CliError> {
    let text = read_source(file, options.limits.max_file_size)?;
    let mut session = Session::new(options.clone());
    let output = session.preprocess(&file_key(file), &text);
    report_diagnostics(&output.diagnostics);
    print!("{}", output.text());
    Ok(())
}
