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

//! Declaration handlers: data types, ports, parameters, typedefs,
//! aggregates, instances, modports, genvars, imports and exports.

use super::Parser;
use crate::grammars::sv;
use crate::symbols::SymbolKind;

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl Parser<'_> {
    // ==================== Data types ====================

    /// Consume a data type, if one is present, and return its text.
    ///
    /// A bare identifier only counts as a type name when another identifier
    /// follows it, so `a` in `input a` is left for the caller as the
    /// declared name. Anonymous struct, union and enum bodies become
    /// containers and are referred to by their synthetic name.
    pub(super) fn data_type(&mut self) -> String {
        let start = self.cursor.pos();
        let mut anonymous = None;

        self.cursor.eat_text("var");
        if self.cursor.eat(sv::NET_TYPE) && self.cursor.is(sv::PAREN_OPEN) {
            // drive or charge strength
            self.cursor.skip_balanced();
        }
        self.skip_type_qualifiers();

        if self.cursor.is(sv::STRUCT) || self.cursor.is(sv::ENUM) {
            anonymous = Some(self.anonymous_aggregate());
        } else if self.cursor.is(sv::DATA_TYPE) {
            self.cursor.bump();
        } else if self.cursor.is(sv::PACKAGE_NAME) {
            self.cursor.skip_type_reference();
        } else if self.cursor.is(sv::IDENTIFIER) {
            let before = self.cursor.mark();
            self.cursor.skip_type_reference();
            let after = self.cursor.mark();
            self.cursor.skip_dimensions();
            let named = self.cursor.is(sv::IDENTIFIER);
            self.cursor.reset(if named { after } else { before });
        } else if self.cursor.is_text("interface") {
            self.cursor.bump();
            if self.cursor.is(sv::DOT) && self.cursor.nth_is(1, sv::IDENTIFIER) {
                // generic interface port with a modport
                self.cursor.bump();
                self.cursor.bump();
            } else if self.cursor.is(sv::IDENTIFIER)
                && !self.cursor.nth_is(1, sv::SEMICOLON)
                && !self.cursor.nth_is(1, sv::COMMA)
                && !self.cursor.nth_is(1, sv::PAREN_CLOSE)
            {
                // virtual interface bus_if vif
                self.cursor.skip_type_reference();
            }
        } else if self.cursor.is_text("type") {
            self.cursor.bump();
            self.cursor.skip_balanced();
        }

        let dims_start = self.cursor.pos();
        loop {
            self.skip_type_qualifiers();
            if !self.cursor.is(sv::BRACKET_OPEN) {
                break;
            }
            self.cursor.skip_balanced();
        }

        match anonymous {
            Some(name) => {
                let dims = self.text_between(dims_start, self.cursor.pos());
                if dims.is_empty() {
                    name
                } else {
                    format!("{} {}", name, dims)
                }
            }
            None => self.text_between(start, self.cursor.pos()),
        }
    }

    fn skip_type_qualifiers(&mut self) {
        while self.cursor.peek().is_some_and(|t| {
            t.is(sv::MODIFIER)
                && matches!(
                    t.text.as_str(),
                    "signed" | "unsigned" | "vectored" | "scalared"
                )
        }) {
            self.cursor.bump();
        }
    }

    /// An unnamed struct, union or enum body, entered as a container named
    /// `struct#N`, `union#N` or `enum#N`.
    fn anonymous_aggregate(&mut self) -> String {
        let first = self.cursor.pos();
        let keyword = self
            .cursor
            .peek()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        let kind = match keyword.as_str() {
            "union" => SymbolKind::Union,
            "enum" => SymbolKind::Enum,
            _ => SymbolKind::Struct,
        };
        let name = self.table.anonymous_name(&keyword);
        let symbol = self.named_symbol(name.clone(), first, kind, first, first);
        self.push_container(symbol);
        self.aggregate_body();
        self.leave(first);
        name
    }

    /// Parse a struct, union or enum body into the current container. The
    /// cursor is at the keyword.
    fn aggregate_body(&mut self) {
        let is_enum = self.cursor.is(sv::ENUM);
        self.cursor.bump();
        // `packed`, `tagged`, `signed` or an enum base type.
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::BRACE_OPEN) || token.is(sv::SEMICOLON) || token.is_hard_end() {
                break;
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
        if !self.cursor.eat(sv::BRACE_OPEN) {
            return;
        }
        if is_enum {
            self.enum_members();
        } else {
            self.struct_members();
        }
        self.cursor.eat(sv::BRACE_CLOSE);
    }

    fn enum_members(&mut self) {
        while let Some(name) = self.cursor.eat_identifier() {
            self.cursor.skip_dimensions();
            if self.cursor.eat(sv::ASSIGN_OP) {
                self.cursor.skip_expression();
            }
            self.declare(name, SymbolKind::EnumMember, name, self.last());
            if !self.cursor.eat(sv::COMMA) {
                break;
            }
        }
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::BRACE_CLOSE) || token.is_hard_end() {
                break;
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
    }

    fn struct_members(&mut self) {
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::BRACE_CLOSE) || token.is_hard_end() {
                break;
            }
            let first = self.cursor.pos();
            // rand, randc
            while self.cursor.eat(sv::MODIFIER) {}
            let data_type = self.data_type();
            if self.cursor.is(sv::IDENTIFIER) {
                self.declarators(first, &SymbolKind::Field { data_type });
            } else {
                self.cursor.skip_to_semicolon();
            }
            if self.cursor.pos() == first {
                self.cursor.bump();
            }
        }
    }

    // ==================== Declarator lists ====================

    /// `name [dims] [= init] {, name [dims] [= init]} ;`
    ///
    /// The first symbol's definition starts at token `first` so it covers
    /// the type; later ones start at their own name.
    pub(super) fn declarators(&mut self, first: usize, kind: &SymbolKind) {
        let mut item_start = first;
        while let Some(name) = self.cursor.eat_identifier() {
            self.cursor.skip_dimensions();
            if self.cursor.eat(sv::ASSIGN_OP) {
                self.cursor.skip_expression();
            }
            self.declare(name, kind.clone(), item_start, self.last());
            if !self.cursor.eat(sv::COMMA) {
                break;
            }
            item_start = self.cursor.pos();
        }
        self.cursor.skip_to_semicolon();
    }

    /// Variable and net declarations, including ones with user-defined or
    /// anonymous aggregate types.
    pub(super) fn data_declaration(&mut self) -> bool {
        let first = self.cursor.pos();
        // const, static, automatic, rand, local, ...
        while self.cursor.peek().is_some_and(|t| {
            t.is(sv::MODIFIER) && !matches!(t.text.as_str(), "signed" | "unsigned")
        }) {
            self.cursor.bump();
        }
        let net = self.cursor.is(sv::NET_TYPE);
        let data_type = self.data_type();
        if !self.cursor.is(sv::IDENTIFIER) {
            if self.cursor.pos() == first {
                return false;
            }
            self.cursor.skip_to_semicolon();
            return true;
        }
        let kind = if net {
            SymbolKind::Net { net_type: data_type }
        } else {
            SymbolKind::Variable { data_type }
        };
        self.declarators(first, &kind);
        true
    }

    /// An item starting with an identifier: a label, a module or interface
    /// instantiation, or a declaration with a user-defined type.
    pub(super) fn identifier_item(&mut self) -> bool {
        if self.cursor.is(sv::IDENTIFIER) && self.cursor.nth_is(1, sv::COLON) {
            self.cursor.bump();
            self.cursor.bump();
            return true;
        }
        let before = self.cursor.mark();
        self.cursor.skip_type_reference();
        self.cursor.skip_dimensions();
        let declares = self.cursor.is(sv::IDENTIFIER);
        let instance = declares && {
            self.cursor.bump();
            self.cursor.skip_dimensions();
            self.cursor.is(sv::PAREN_OPEN)
        };
        self.cursor.reset(before);
        if instance {
            self.instances()
        } else if declares {
            self.data_declaration()
        } else {
            false
        }
    }

    /// `type [#(...)] name [dims] (...) {, name [dims] (...)} ;`
    fn instances(&mut self) -> bool {
        let first = self.cursor.pos();
        while self.cursor.is(sv::PACKAGE_NAME) {
            self.cursor.bump();
            self.cursor.eat(sv::SCOPE_RESOLUTION);
        }
        if self.cursor.eat_identifier().is_none() {
            return false;
        }
        let module_type = self.text_between(first, self.cursor.pos());
        if self.cursor.eat(sv::HASH) && !self.cursor.skip_balanced() {
            self.cursor.bump();
        }
        let mut item_start = first;
        while let Some(name) = self.cursor.eat_identifier() {
            self.cursor.skip_dimensions();
            self.cursor.skip_balanced();
            let kind = SymbolKind::Instance {
                module_type: module_type.clone(),
            };
            self.declare(name, kind, item_start, self.last());
            if !self.cursor.eat(sv::COMMA) {
                break;
            }
            item_start = self.cursor.pos();
        }
        self.cursor.skip_to_semicolon();
        true
    }

    // ==================== Ports and parameters ====================

    /// A port declaration in a module or routine body.
    pub(super) fn port_declaration(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        let data_type = non_empty(self.data_type());
        self.declarators(first, &SymbolKind::Port { data_type });
        true
    }

    /// A parenthesized port list, ANSI or not. The cursor is at `(`.
    ///
    /// Ports without their own direction or type inherit the previous
    /// port's type.
    pub(super) fn port_list(&mut self) {
        self.cursor.bump();
        let mut data_type: Option<String> = None;
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::PAREN_CLOSE) {
                self.cursor.bump();
                break;
            }
            if token.is(sv::SEMICOLON) || token.is_hard_end() {
                break;
            }
            let first = self.cursor.pos();
            let directed = self.cursor.eat(sv::DIRECTION);
            let explicit = self.data_type();
            if directed || !explicit.is_empty() {
                data_type = non_empty(explicit);
            }
            // `.name(expr)` ports
            let name = if self.cursor.eat(sv::DOT) {
                let name = self.cursor.eat_identifier();
                self.cursor.skip_balanced();
                name
            } else {
                self.cursor.eat_identifier()
            };
            if let Some(name) = name {
                self.cursor.skip_dimensions();
                if self.cursor.eat(sv::ASSIGN_OP) {
                    self.cursor.skip_expression();
                }
                let kind = SymbolKind::Port {
                    data_type: data_type.clone(),
                };
                self.declare(name, kind, first, self.last());
            }
            self.cursor.skip_expression();
            self.cursor.eat(sv::COMMA);
            if self.cursor.pos() == first {
                self.cursor.bump();
            }
        }
    }

    /// `#( ... )` parameter port list of a module, interface or program.
    pub(super) fn parameter_port_list(&mut self) {
        self.cursor.bump();
        if !self.cursor.eat(sv::PAREN_OPEN) {
            return;
        }
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::PAREN_CLOSE) {
                self.cursor.bump();
                break;
            }
            if token.is(sv::SEMICOLON) || token.is_hard_end() {
                break;
            }
            let first = self.cursor.pos();
            self.cursor.eat(sv::PARAMETER);
            self.cursor.eat_text("type");
            self.data_type();
            if let Some(name) = self.cursor.eat_identifier() {
                self.cursor.skip_dimensions();
                if self.cursor.eat(sv::ASSIGN_OP) {
                    self.cursor.skip_expression();
                }
                self.declare(name, SymbolKind::ParameterPort, first, self.last());
            }
            self.cursor.skip_expression();
            self.cursor.eat(sv::COMMA);
            if self.cursor.pos() == first {
                self.cursor.bump();
            }
        }
    }

    /// `parameter`, `localparam` or `specparam` declarations.
    pub(super) fn parameter_declaration(&mut self) -> bool {
        let first = self.cursor.pos();
        let local = self.cursor.is_text("localparam");
        self.cursor.bump();
        self.cursor.eat_text("type");
        self.data_type();
        let kind = if local {
            SymbolKind::Localparam
        } else {
            SymbolKind::Parameter
        };
        self.declarators(first, &kind);
        true
    }

    // ==================== Typedefs ====================

    pub(super) fn typedef(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();

        if self.cursor.is(sv::STRUCT) || self.cursor.is(sv::ENUM) {
            self.aggregate_typedef(first);
            return true;
        }

        // Forward declarations: `typedef class c;`, `typedef interface class c;`
        if self.cursor.is(sv::CONSTRUCT) || self.cursor.is_text("interface") {
            let start = self.cursor.pos();
            while self.cursor.is(sv::CONSTRUCT) || self.cursor.is_text("interface") {
                self.cursor.bump();
            }
            let aliased_type = self.text_between(start, self.cursor.pos());
            if let Some(name) = self.cursor.eat_identifier() {
                self.cursor.skip_to_semicolon();
                self.enter(name, SymbolKind::Typedef { aliased_type }, first);
                self.leave(first);
            } else {
                self.cursor.skip_to_semicolon();
            }
            return true;
        }

        let aliased_type = self.data_type();
        match self.cursor.eat_identifier() {
            Some(name) => {
                self.cursor.skip_dimensions();
                self.cursor.skip_to_semicolon();
                self.enter(name, SymbolKind::Typedef { aliased_type }, first);
                self.leave(first);
            }
            None => self.cursor.skip_to_semicolon(),
        }
        true
    }

    /// `typedef struct|union|enum ... { ... } name;`
    ///
    /// The name comes after the body, so it is found by scanning ahead and
    /// rewinding before the body is parsed into the new container.
    fn aggregate_typedef(&mut self, first: usize) {
        let keyword = self
            .cursor
            .peek()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        let body = self.cursor.mark();
        self.cursor.bump();
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::BRACE_OPEN) || token.is(sv::SEMICOLON) || token.is_hard_end() {
                break;
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
        let has_body = self.cursor.skip_balanced();
        self.cursor.skip_dimensions();
        let name = self.cursor.eat_identifier();
        self.cursor.reset(body);

        let Some(name) = name else {
            self.cursor.skip_to_semicolon();
            return;
        };
        self.enter(
            name,
            SymbolKind::Typedef {
                aliased_type: keyword,
            },
            first,
        );
        if has_body {
            self.aggregate_body();
        }
        self.cursor.skip_to_semicolon();
        self.leave(first);
    }

    // ==================== Interface and package items ====================

    /// `modport name (...) {, name (...)} ;`
    pub(super) fn modport(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        let mut item_start = first;
        while let Some(name) = self.cursor.eat_identifier() {
            self.cursor.skip_balanced();
            self.declare(name, SymbolKind::Modport, item_start, self.last());
            if !self.cursor.eat(sv::COMMA) {
                break;
            }
            item_start = self.cursor.pos();
        }
        self.cursor.skip_to_semicolon();
        true
    }

    pub(super) fn genvar(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        self.declarators(first, &SymbolKind::Genvar);
        true
    }

    /// Package imports, or a DPI import prototype.
    pub(super) fn import(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        if self.cursor.eat(sv::STRING) {
            // "DPI-C" [context | pure] [c_name =] function|task ...
            while self.cursor.peek().is_some_and(|t| {
                t.is(sv::MODIFIER) || t.is(sv::IDENTIFIER) || t.is(sv::ASSIGN_OP)
            }) {
                self.cursor.bump();
            }
            if self.cursor.is(sv::ROUTINE) {
                return self.routine(first, true);
            }
            self.cursor.skip_to_semicolon();
            return true;
        }
        self.package_items(true);
        true
    }

    /// Package exports. DPI exports declare nothing.
    pub(super) fn export(&mut self) -> bool {
        self.cursor.bump();
        if self.cursor.is(sv::STRING) {
            self.cursor.skip_to_semicolon();
            return true;
        }
        self.package_items(false);
        true
    }

    /// `pkg::name` or `pkg::*` items of an import or export.
    fn package_items(&mut self, import: bool) {
        loop {
            let start = self.cursor.pos();
            self.cursor.skip_expression();
            let item: String = self
                .text_between(start, self.cursor.pos())
                .split_whitespace()
                .collect();
            if let Some((package, _)) = item.split_once("::") {
                if package != "*" {
                    self.pkgdeps.insert(package.to_string());
                }
                let scope = self.scope();
                if import {
                    self.table.add_import(scope, &item);
                } else {
                    self.table.add_export(scope, &item);
                }
            }
            if !self.cursor.eat(sv::COMMA) {
                break;
            }
        }
        self.cursor.skip_to_semicolon();
    }

    // ==================== Other declarations ====================

    /// `let name [(args)] = expr;`
    pub(super) fn let_declaration(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        let name = self.cursor.eat_identifier();
        self.cursor.skip_to_semicolon();
        if let Some(name) = name {
            self.declare(name, SymbolKind::Let, first, self.last());
        }
        true
    }

    /// `nettype data_type name [with resolver];`
    pub(super) fn nettype(&mut self) -> bool {
        let first = self.cursor.pos();
        self.cursor.bump();
        let mut name = None;
        while let Some(token) = self.cursor.peek() {
            if token.is(sv::SEMICOLON) || token.text == "with" || token.is_hard_end() {
                break;
            }
            if token.is(sv::IDENTIFIER) {
                name = Some(self.cursor.pos());
            }
            if !self.cursor.skip_balanced() {
                self.cursor.bump();
            }
        }
        self.cursor.skip_to_semicolon();
        if let Some(name) = name {
            self.declare(name, SymbolKind::Nettype, first, self.last());
        }
        true
    }
}
