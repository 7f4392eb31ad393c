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

//! Token dump command.

use super::read_source;
use crate::error::CliError;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;
use svscope_core::tokenizer::Token;
use svscope_core::{grammars, ParseOptions};

/// Print the tokens of `file`, one per line, as offset, innermost scope and
/// quoted text.
pub fn tokens(file: &Path, preproc: bool, options: &ParseOptions) -> Result<(), CliError> {
    let text = read_source(file, options.limits.max_file_size)?;
    let grammar = if preproc {
        grammars::preprocessor()
    } else {
        grammars::structural()
    };
    let tokens = grammar.tokenize(&text, None);
    tracing::debug!(file = %file.display(), count = tokens.len(), "tokenized");
    print!("{}", render_tokens(&tokens));
    Ok(())
}

/// Format tokens as `offset scope "text"` lines.
pub fn render_tokens(tokens: &[Token]) -> String {
    let width = tokens
        .iter()
        .map(|t| t.scope().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for token in tokens {
        let scope = format!("{:<width$}", token.scope(), width = width);
        let _ = writeln!(out, "{:>6}  {}  {:?}", token.offset, scope.cyan(), token.text);
    }
    out
}
