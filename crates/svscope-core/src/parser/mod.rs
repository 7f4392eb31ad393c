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

//! Structural parser.
//!
//! The preprocessed text is tokenized with the structural grammar and
//! walked by a set of handlers, one per declaration form. Handlers build
//! the [`SymbolTable`] directly; procedural code, expressions and the
//! bodies of classes, properties and similar constructs are skipped.
//!
//! # Recovery
//!
//! A token no handler accepts is logged and skipped. Parsing a file never
//! fails; malformed input only degrades the symbols found after it.
//!
//! # Locations
//!
//! Every token keeps its offset in the preprocessed text. The locator
//! maps those offsets back through the post tokens to the files they came
//! from, so a declaration assembled from a macro in a header has a
//! definition spanning both files.

mod containers;
mod cursor;
mod declarations;
mod generate;
mod locator;
mod skip;

use crate::error::SvError;
use crate::grammars::{self, sv};
use crate::limits::Limits;
use crate::preprocessor::PreprocOutput;
use crate::symbols::{ContainerId, Definition, FileSymbolsInfo, Symbol, SymbolKind, SymbolTable};
use cursor::{Cursor, ParseToken};
use locator::Locator;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Symbols of one parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub symbols: FileSymbolsInfo,
    /// Packages referenced through `pkg::` or imported.
    pub pkgdeps: BTreeSet<String>,
    /// Preprocessing problems and exceeded limits.
    pub diagnostics: Vec<SvError>,
}

/// Parse preprocessed output into `table`.
///
/// Symbols already in `table` with the same name, tag and container path
/// are updated in place, so parsing a document again after an edit does not
/// duplicate them. Whatever the new text no longer declares is dropped.
pub fn parse_preprocessed(
    output: &PreprocOutput,
    table: &mut SymbolTable,
    limits: &Limits,
) -> ParseOutput {
    table.begin_parse();
    let text = output.text();
    let mut diagnostics = output.diagnostics.clone();

    let raw = grammars::structural().tokenize(&text, None);
    if raw.is_empty() && !text.is_empty() {
        let diagnostic = SvError::grammar("structural grammar produced no tokens")
            .with_file(&*output.file);
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
    }
    let mut tokens = cursor::significant(raw);
    if tokens.len() > limits.max_tokens {
        let diagnostic = SvError::limit(format!(
            "{} tokens, limit is {}; the rest of the file is ignored",
            tokens.len(),
            limits.max_tokens
        ))
        .with_file(&*output.file);
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
        tokens.truncate(limits.max_tokens);
    }

    for symbol in &output.symbols {
        table.add_symbol(SymbolTable::ROOT, symbol.clone());
    }

    let mut parser = Parser::new(tokens, &text, output, table);
    parser.run();
    let pkgdeps = parser.pkgdeps;
    table.end_parse();
    debug!(file = %output.file, packages = pkgdeps.len(), "parsed");

    ParseOutput {
        symbols: table.to_file_info(output.includes.clone()),
        pkgdeps,
        diagnostics,
    }
}

/// Handler state for one document.
pub(crate) struct Parser<'a> {
    cursor: Cursor,
    /// The preprocessed text the tokens index into.
    text: &'a str,
    locator: Locator<'a>,
    table: &'a mut SymbolTable,
    /// Open containers, innermost last. Never empty.
    stack: Vec<ContainerId>,
    pkgdeps: BTreeSet<String>,
}

impl<'a> Parser<'a> {
    fn new(
        tokens: Vec<ParseToken>,
        text: &'a str,
        output: &'a PreprocOutput,
        table: &'a mut SymbolTable,
    ) -> Self {
        let pkgdeps = tokens
            .iter()
            .filter(|t| t.is(sv::PACKAGE_NAME))
            .map(|t| t.text.clone())
            .collect();
        Self {
            cursor: Cursor::new(tokens),
            text,
            locator: Locator::new(output),
            table,
            stack: vec![SymbolTable::ROOT],
            pkgdeps,
        }
    }

    fn run(&mut self) {
        while !self.cursor.at_end() {
            self.item_or_skip();
        }
    }

    // ==================== Dispatch ====================

    /// Run one item handler, or log and skip a token if none applies.
    fn item_or_skip(&mut self) {
        let before = self.cursor.mark();
        let start = self.cursor.pos();
        if self.item() && self.cursor.pos() > start {
            return;
        }
        self.cursor.reset(before);
        if let Some(token) = self.cursor.peek() {
            warn!(
                token = %token.text,
                at = %self.locator.describe(token.start),
                "skipping unexpected token"
            );
        }
        self.cursor.bump();
    }

    /// Parse items until a token of scope `end`, which is consumed along
    /// with its label.
    fn items_until(&mut self, end: &str) {
        while let Some(token) = self.cursor.peek() {
            if token.is(end) {
                self.cursor.bump();
                self.cursor.eat_label();
                return;
            }
            self.item_or_skip();
        }
    }

    /// Dispatch on the current token's scope. Returns false without
    /// consuming anything if no handler applies.
    fn item(&mut self) -> bool {
        let Some(token) = self.cursor.peek() else {
            return false;
        };
        let first = self.cursor.pos();
        let scope = token.scope.clone();
        let text = token.text.clone();
        match &*scope {
            sv::CONTAINER => self.container(first, false),
            sv::PACKAGE => self.package(),
            sv::ROUTINE => self.routine(first, false),
            sv::DIRECTION => self.port_declaration(),
            sv::PARAMETER => self.parameter_declaration(),
            sv::TYPEDEF => self.typedef(),
            sv::MODPORT => self.modport(),
            sv::IMPORT => self.import(),
            sv::EXPORT => self.export(),
            sv::GENVAR => self.genvar(),
            sv::GENERATE | sv::END_GENERATE | sv::SEMICOLON => {
                self.cursor.bump();
                true
            }
            sv::NET_TYPE | sv::DATA_TYPE | sv::STRUCT | sv::ENUM => self.data_declaration(),
            sv::MODIFIER => self.qualified_item(),
            sv::IDENTIFIER | sv::PACKAGE_NAME => self.identifier_item(),
            sv::ASSIGN | sv::SYSTEM_IDENTIFIER => {
                self.cursor.skip_to_semicolon();
                true
            }
            sv::ALWAYS => {
                self.cursor.bump();
                self.cursor.skip_statement();
                true
            }
            sv::ASSERTION => {
                self.cursor.skip_statement();
                true
            }
            sv::CONSTRUCT => self.construct(first),
            sv::OTHER => self.other_item(&text),
            sv::CONTROL => match text.as_str() {
                "if" => self.generate_if(),
                "for" => self.generate_for(),
                _ => false,
            },
            sv::CASE => self.generate_case(),
            sv::BEGIN => self.generate_block(),
            _ => false,
        }
    }

    // ==================== Container stack ====================

    fn scope(&self) -> ContainerId {
        self.stack.last().copied().unwrap_or(SymbolTable::ROOT)
    }

    fn token(&self, index: usize) -> Option<&ParseToken> {
        self.cursor.token(index)
    }

    /// Index of the last consumed token.
    fn last(&self) -> usize {
        self.cursor.pos().saturating_sub(1)
    }

    fn definition(&self, first: usize, last: usize) -> Definition {
        match (self.token(first), self.token(last.max(first))) {
            (Some(a), Some(b)) => self.locator.definition(a.start, b.end),
            _ => Definition::default(),
        }
    }

    /// A symbol named by token `name`, spanning tokens `first..=last`.
    fn symbol(&self, name: usize, kind: SymbolKind, first: usize, last: usize) -> Option<Symbol> {
        let text = self.token(name)?.text.clone();
        Some(self.named_symbol(text, name, kind, first, last))
    }

    /// Like [`Parser::symbol`] with an explicit name; token `at` gives the
    /// declaration location.
    fn named_symbol(
        &self,
        name: String,
        at: usize,
        kind: SymbolKind,
        first: usize,
        last: usize,
    ) -> Symbol {
        let mut symbol = Symbol::new(name, kind).with_definition(self.definition(first, last));
        if let Some(location) = self
            .token(at)
            .and_then(|t| self.locator.location(t.start, t.end))
        {
            symbol = symbol.with_declaration(location);
        }
        symbol
    }

    /// Declare a leaf symbol named by token `name`, spanning tokens
    /// `first..=last`, in the current scope.
    fn declare(&mut self, name: usize, kind: SymbolKind, first: usize, last: usize) {
        if let Some(symbol) = self.symbol(name, kind, first, last) {
            let scope = self.scope();
            self.table.add_symbol(scope, symbol);
        }
    }

    /// Enter a container named by token `name`.
    fn enter(&mut self, name: usize, kind: SymbolKind, first: usize) {
        if let Some(symbol) = self.symbol(name, kind, first, first) {
            self.push_container(symbol);
        }
    }

    fn push_container(&mut self, symbol: Symbol) {
        let parent = self.scope();
        let id = self.table.open_container(parent, symbol);
        self.stack.push(id);
    }

    /// Leave the innermost container, recording its span from token
    /// `first` to the last consumed token.
    fn leave(&mut self, first: usize) {
        if self.stack.len() <= 1 {
            return;
        }
        let definition = self.definition(first, self.last());
        if let Some(id) = self.stack.pop() {
            self.table.set_definition(id, definition);
        }
    }

    /// Source text of tokens `from..to`, whitespace collapsed.
    fn text_between(&self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        let (Some(a), Some(b)) = (self.token(from), self.token(to - 1)) else {
            return String::new();
        };
        let raw = self.text.get(a.start..b.end).unwrap_or_default();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
