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

//! Generate constructs.
//!
//! Items inside generate blocks are declared in the enclosing design unit;
//! named blocks are recorded as `generate-block` symbols.

use super::Parser;
use crate::grammars::sv;
use crate::symbols::SymbolKind;

impl Parser<'_> {
    /// `if (cond) body [else body]`
    pub(super) fn generate_if(&mut self) -> bool {
        self.cursor.bump();
        self.cursor.skip_balanced();
        self.generate_body();
        if self.cursor.eat_text("else") {
            self.generate_body();
        }
        true
    }

    /// `for (init; cond; step) body`
    pub(super) fn generate_for(&mut self) -> bool {
        self.cursor.bump();
        self.cursor.skip_balanced();
        self.generate_body();
        true
    }

    /// `case (expr) label {, label} : body ... endcase`
    pub(super) fn generate_case(&mut self) -> bool {
        self.cursor.bump();
        self.cursor.skip_balanced();
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::END_CASE) {
                self.cursor.bump();
                break;
            }
            if token.is_hard_end() {
                break;
            }
            let start = self.cursor.pos();
            if self.cursor.eat_text("default") {
                self.cursor.eat(sv::COLON);
            } else {
                self.skip_case_labels();
            }
            self.generate_body();
            if self.cursor.pos() == start {
                self.cursor.bump();
            }
        }
        true
    }

    /// Skip case item expressions up to and including their colon.
    fn skip_case_labels(&mut self) {
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::COLON) {
                self.cursor.bump();
                return;
            }
            if token.is(sv::SEMICOLON) || token.is_hard_end() {
                return;
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
    }

    /// A `begin ... end` block or a single item.
    fn generate_body(&mut self) {
        if self.cursor.is(sv::BEGIN) {
            self.generate_block();
        } else if self.cursor.peek().is_some_and(|t| !t.is_hard_end()) {
            self.item_or_skip();
        }
    }

    /// `begin [: name] items end [: name]`
    pub(super) fn generate_block(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        let label = self.cursor.eat_label();
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::END) {
                self.cursor.bump();
                self.cursor.eat_label();
                break;
            }
            if token.is_hard_end() {
                break;
            }
            self.item_or_skip();
        }
        if let Some(name) = label {
            self.declare(name, SymbolKind::GenerateBlock, first, self.last());
        }
        true
    }
}
