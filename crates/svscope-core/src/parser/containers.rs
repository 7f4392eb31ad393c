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

//! Design units, routines and skipped constructs.

use super::Parser;
use crate::grammars::sv;
use crate::symbols::SymbolKind;
use tracing::debug;

impl Parser<'_> {
    /// `module`, `macromodule`, `interface` or `program`, starting at the
    /// keyword; `first` is where any leading `extern` was.
    pub(super) fn container(&mut self, first: usize, prototype: bool) -> bool {
        let keyword = match self.cursor.peek() {
            Some(token) => token.text.clone(),
            None => return false,
        };
        self.cursor.bump();
        if keyword == "interface" && self.cursor.is(sv::CONSTRUCT) {
            // interface class
            return self.construct(first);
        }
        while self.cursor.eat(sv::MODIFIER) {}

        let Some(name) = self.cursor.eat_identifier() else {
            debug!(keyword = %keyword, "design unit without a name");
            return true;
        };
        let kind = match keyword.as_str() {
            "interface" => SymbolKind::Interface,
            "program" => SymbolKind::Program,
            _ => SymbolKind::Module,
        };
        self.enter(name, kind, first);

        // Header: package imports, parameter ports, ports.
        loop {
            if self.cursor.is(sv::IMPORT) {
                self.import();
            } else if self.cursor.is(sv::HASH) {
                self.parameter_port_list();
            } else if self.cursor.is(sv::PAREN_OPEN) {
                self.port_list();
            } else {
                break;
            }
        }
        self.cursor.eat(sv::SEMICOLON);

        if !prototype {
            self.items_until(sv::END_CONTAINER);
        }
        self.leave(first);
        true
    }

    pub(super) fn package(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        while self.cursor.eat(sv::MODIFIER) {}
        let Some(name) = self.cursor.eat_identifier() else {
            self.cursor.skip_to_semicolon();
            return true;
        };
        self.enter(name, SymbolKind::Package, first);
        self.cursor.eat(sv::SEMICOLON);
        self.items_until(sv::END_PACKAGE);
        self.leave(first);
        true
    }

    // ==================== Routines ====================

    /// A function or task, starting at the keyword. Prototypes (`extern`,
    /// `pure virtual`, DPI imports) have no body.
    pub(super) fn routine(&mut self, first: usize, prototype: bool) -> bool {
        let task = self.cursor.is_text("task");
        self.cursor.bump();
        while self.cursor.eat(sv::MODIFIER) {}

        // Everything up to `(` or `;` is the return type and the name; the
        // name is the last identifier, or `new` for constructors.
        let header = self.cursor.pos();
        let mut name = None;
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::PAREN_OPEN) || token.is(sv::SEMICOLON) || token.is_hard_end() {
                break;
            }
            if token.is(sv::IDENTIFIER) || token.text == "new" {
                name = Some(self.cursor.pos());
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
        let Some(name) = name else {
            self.cursor.skip_to_semicolon();
            return true;
        };

        let kind = if task {
            SymbolKind::Task
        } else {
            let mut type_end = name;
            // `cls::method` keeps the class scope out of the return type.
            while type_end > header
                && self
                    .token(type_end - 1)
                    .is_some_and(|t| t.is(sv::SCOPE_RESOLUTION) || t.is(sv::PACKAGE_NAME))
            {
                type_end -= 1;
            }
            let return_type = self.text_between(header, type_end);
            SymbolKind::Function {
                return_type: (!return_type.is_empty()).then_some(return_type),
            }
        };
        self.enter(name, kind, first);

        if self.cursor.is(sv::PAREN_OPEN) {
            self.port_list();
        }
        self.cursor.eat(sv::SEMICOLON);
        if !prototype {
            self.routine_body();
        }
        self.leave(first);
        true
    }

    /// Declarations and statements up to `endfunction` or `endtask`.
    fn routine_body(&mut self) {
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::END_ROUTINE) {
                self.cursor.bump();
                self.cursor.eat_label();
                return;
            }
            if [
                sv::END_CONTAINER,
                sv::END_PACKAGE,
                sv::END_GENERATE,
                sv::END_CONSTRUCT,
            ]
            .iter()
            .any(|scope| token.is(scope))
            {
                return;
            }
            let start = self.cursor.pos();
            let scope = token.scope.clone();
            match &*scope {
                sv::DIRECTION => {
                    self.port_declaration();
                }
                sv::PARAMETER => {
                    self.parameter_declaration();
                }
                sv::TYPEDEF => {
                    self.typedef();
                }
                sv::IMPORT => {
                    self.import();
                }
                sv::DATA_TYPE | sv::NET_TYPE | sv::STRUCT | sv::ENUM | sv::MODIFIER => {
                    self.data_declaration();
                }
                sv::IDENTIFIER | sv::PACKAGE_NAME if self.looks_like_declaration() => {
                    self.data_declaration();
                }
                _ => self.cursor.skip_statement(),
            }
            if self.cursor.pos() == start {
                self.cursor.bump();
            }
        }
    }

    /// `type name` followed by `;`, `,`, `=` or a dimension.
    fn looks_like_declaration(&mut self) -> bool {
        let before = self.cursor.mark();
        self.cursor.skip_type_reference();
        self.cursor.skip_dimensions();
        let declares = self.cursor.eat(sv::IDENTIFIER)
            && (self.cursor.is(sv::SEMICOLON)
                || self.cursor.is(sv::COMMA)
                || self.cursor.is(sv::ASSIGN_OP)
                || self.cursor.is(sv::BRACKET_OPEN));
        self.cursor.reset(before);
        declares
    }

    // ==================== Skipped constructs ====================

    /// Constructs recorded by name with their body skipped: classes,
    /// covergroups, properties, sequences, checkers, clocking blocks,
    /// primitives, configs and specify blocks.
    pub(super) fn construct(&mut self, first: usize) -> bool {
        let keyword = match self.cursor.peek() {
            Some(token) => token.text.clone(),
            None => return false,
        };
        let kind = match keyword.as_str() {
            "class" => Some(SymbolKind::Class),
            "covergroup" => Some(SymbolKind::Covergroup),
            "property" => Some(SymbolKind::Property),
            "sequence" => Some(SymbolKind::Sequence),
            "checker" => Some(SymbolKind::Checker),
            "clocking" => Some(SymbolKind::Clocking),
            "primitive" => Some(SymbolKind::Primitive),
            "config" => Some(SymbolKind::Config),
            _ => None,
        };
        let end = match keyword.as_str() {
            "covergroup" => "endgroup".to_string(),
            other => format!("end{}", other),
        };
        self.cursor.bump();
        while self.cursor.eat(sv::MODIFIER) {}
        let name = self.cursor.eat_identifier();
        self.cursor.skip_past(&end);
        self.cursor.eat_label();
        if let (Some(kind), Some(name)) = (kind, name) {
            self.declare(name, kind, first, self.last());
        }
        true
    }

    /// Items led by a modifier: `extern module`, `virtual class`,
    /// `pure virtual function`, or a qualified data declaration.
    pub(super) fn qualified_item(&mut self) -> bool {
        let first = self.cursor.pos();
        let before = self.cursor.mark();
        let mut prototype = false;
        let mut virtual_ = false;
        while let Some(token) = self.cursor.peek() {
            if !token.is(sv::MODIFIER) {
                break;
            }
            prototype |= matches!(token.text.as_str(), "extern" | "pure");
            virtual_ |= token.text == "virtual";
            self.cursor.bump();
        }
        // `virtual interface bus_if vif;` is a variable
        if self.cursor.is(sv::CONTAINER) && !(virtual_ && self.cursor.is_text("interface")) {
            return self.container(first, prototype);
        }
        if self.cursor.is(sv::ROUTINE) {
            return self.routine(first, prototype);
        }
        if self.cursor.is(sv::CONSTRUCT) {
            return self.construct(first);
        }
        self.cursor.reset(before);
        self.data_declaration()
    }

    /// Items led by an uncategorized keyword.
    pub(super) fn other_item(&mut self, keyword: &str) -> bool {
        match keyword {
            "let" => self.let_declaration(),
            "nettype" => self.nettype(),
            "default" | "global" => {
                let first = self.cursor.pos();
                self.cursor.bump();
                if self.cursor.is(sv::CONSTRUCT) {
                    return self.construct(first);
                }
                // default disable iff ...;
                self.cursor.skip_to_semicolon();
                true
            }
            "bind" | "timeunit" | "timeprecision" | "defparam" | "alias" => {
                self.cursor.skip_to_semicolon();
                true
            }
            _ => false,
        }
    }
}
