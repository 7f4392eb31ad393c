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

//! Symbol dump command.

use super::{file_key, read_source, report_diagnostics};
use crate::error::CliError;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;
use svscope_core::{Container, Definition, FileSymbolsInfo, ParseOptions, Session, Symbol};

/// Print the symbols of `file`, as a tree or as the compact JSON encoding.
pub fn symbols(file: &Path, json: bool, options: &ParseOptions) -> Result<(), CliError> {
    let text = read_source(file, options.limits.max_file_size)?;
    let mut session = Session::new(options.clone());
    let output = session.parse(&file_key(file), &text);
    report_diagnostics(&output.diagnostics);
    if json {
        println!("{}", output.symbols.to_json());
    } else {
        print!("{}", render_tree(&output.symbols));
    }
    Ok(())
}

/// Render symbols as an indented tree: one line per symbol with its kind
/// and definition range, container members indented below the container.
///
/// # Examples
///
/// ```
/// use svscope_core::{InMemoryProvider, ParseOptions, Session};
/// use svscope_cli::commands::render_tree;
///
/// colored::control::set_override(false);
/// let mut session = Session::with_provider(ParseOptions::default(), InMemoryProvider::new());
/// let out = session.parse("top.sv", "module top; wire w; endmodule\n");
/// let tree = render_tree(&out.symbols);
/// assert!(tree.starts_with("top  module"));
/// assert!(tree.contains("\n  w  net"));
/// ```
pub fn render_tree(info: &FileSymbolsInfo) -> String {
    let mut out = String::new();
    for symbol in &info.symbols {
        write_symbol(&mut out, symbol, 0);
    }
    for container in &info.containers {
        write_container(&mut out, container, 0);
    }
    for include in &info.includes {
        let _ = writeln!(out, "{} {}", "include".dimmed(), include);
    }
    out
}

fn write_container(out: &mut String, container: &Container, depth: usize) {
    write_symbol(out, &container.symbol, depth);
    let indent = "  ".repeat(depth + 1);
    for import in &container.info.imports {
        let _ = writeln!(out, "{}{} {}", indent, "import".dimmed(), import);
    }
    for export in &container.info.exports {
        let _ = writeln!(out, "{}{} {}", indent, "export".dimmed(), export);
    }
    for symbol in &container.info.symbols {
        write_symbol(out, symbol, depth + 1);
    }
    for child in &container.info.containers {
        write_container(out, child, depth + 1);
    }
}

fn write_symbol(out: &mut String, symbol: &Symbol, depth: usize) {
    let tag = symbol.tag();
    let kind = match tag.get(1) {
        Some(arg) if !arg.is_empty() => format!("{} {}", tag[0], arg),
        _ => tag[0].clone(),
    };
    let _ = writeln!(
        out,
        "{}{}  {}  {}",
        "  ".repeat(depth),
        symbol.name.bold(),
        kind.green(),
        location(&symbol.definition).dimmed()
    );
}

fn location(definition: &Definition) -> String {
    match definition {
        Definition::Single(range) => range.to_string(),
        Definition::Multi(segments) => segments
            .iter()
            .map(|(file, range)| format!("{}:{}", file, range))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
