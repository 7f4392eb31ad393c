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

//! Arena-backed symbol table used while parsing.
//!
//! Containers live in a flat vector and refer to each other by
//! [`ContainerId`]. A symbol's identity is its `(name, tag, container path)`
//! triple: adding a symbol that already exists in a scope updates it in
//! place, and re-opening an existing container clears its old contents so a
//! file can be parsed into the same table over and over without leaving
//! duplicates behind.
//!
//! A parse is bracketed by [`SymbolTable::begin_parse`] and
//! [`SymbolTable::end_parse`]. Children of a re-opened container are kept as
//! reuse candidates until the parse ends; the ones the new text no longer
//! declares are then released, and their slots are recycled.

use super::model::{Container, ContainerSymbolsInfo, Definition, FileSymbolsInfo, Symbol};

/// Index of a container node in a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

impl ContainerId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeContents {
    symbols: Vec<Symbol>,
    imports: Vec<String>,
    exports: Vec<String>,
    children: Vec<ContainerId>,
}

#[derive(Debug, Clone)]
struct Node {
    /// `None` only for the root.
    symbol: Option<Symbol>,
    parent: Option<ContainerId>,
    /// Container path of everything declared inside this node.
    inner_path: Vec<String>,
    contents: ScopeContents,
    /// Children from before the container was re-opened, not yet claimed
    /// by the current parse.
    previous: Vec<ContainerId>,
}

impl Node {
    fn new(symbol: Option<Symbol>, parent: Option<ContainerId>, inner_path: Vec<String>) -> Self {
        Self {
            symbol,
            parent,
            inner_path,
            contents: ScopeContents::default(),
            previous: Vec::new(),
        }
    }
}

/// Symbol table for one file.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    nodes: Vec<Node>,
    /// Released slots, reused before the arena grows.
    free: Vec<ContainerId>,
    anonymous: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// The file-level scope.
    pub const ROOT: ContainerId = ContainerId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, None, Vec::new())],
            free: Vec::new(),
            anonymous: 0,
        }
    }

    /// Rebuild a table from previously extracted symbols.
    pub fn from_file_info(info: &FileSymbolsInfo) -> Self {
        let mut table = Self::new();
        for symbol in &info.symbols {
            table.add_symbol(Self::ROOT, symbol.clone());
        }
        for name in &info.imports {
            table.add_import(Self::ROOT, name);
        }
        for name in &info.exports {
            table.add_export(Self::ROOT, name);
        }
        for container in &info.containers {
            table.restore_container(Self::ROOT, container);
        }
        table
    }

    fn restore_container(&mut self, parent: ContainerId, container: &Container) {
        let id = self.open_container(parent, container.symbol.clone());
        for symbol in &container.info.symbols {
            self.add_symbol(id, symbol.clone());
        }
        for name in &container.info.imports {
            self.add_import(id, name);
        }
        for name in &container.info.exports {
            self.add_export(id, name);
        }
        for child in &container.info.containers {
            self.restore_container(id, child);
        }
    }

    /// Start a parse into this table.
    ///
    /// The file scope is emptied; its containers stay available for reuse
    /// until [`end_parse`](Self::end_parse).
    pub fn begin_parse(&mut self) {
        self.anonymous = 0;
        self.reset_contents(Self::ROOT);
    }

    /// Finish a parse: release every container the parse did not re-open.
    pub fn end_parse(&mut self) {
        let mut pending = vec![Self::ROOT];
        while let Some(id) = pending.pop() {
            for stale in std::mem::take(&mut self.nodes[id.0].previous) {
                self.release(stale);
            }
            pending.extend(self.nodes[id.0].contents.children.iter().copied());
        }
    }

    /// Clear a node's contents, keeping its children as reuse candidates.
    fn reset_contents(&mut self, id: ContainerId) {
        let node = &mut self.nodes[id.0];
        let old = std::mem::take(&mut node.contents);
        node.previous.extend(old.children);
    }

    /// Free `id` and everything below it.
    fn release(&mut self, id: ContainerId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let node = std::mem::replace(&mut self.nodes[id.0], Node::new(None, None, Vec::new()));
            pending.extend(node.contents.children);
            pending.extend(node.previous);
            self.free.push(id);
        }
    }

    fn find_child(&self, ids: &[ContainerId], symbol: &Symbol) -> Option<usize> {
        ids.iter().position(|child| {
            self.nodes[child.0]
                .symbol
                .as_ref()
                .is_some_and(|s| s.same_key(symbol))
        })
    }

    /// A name for an anonymous struct, union or enum body, e.g. `struct#0`.
    ///
    /// The index counts anonymous bodies in parse order, so parsing the same
    /// text again yields the same names.
    pub fn anonymous_name(&mut self, prefix: &str) -> String {
        let name = format!("{}#{}", prefix, self.anonymous);
        self.anonymous += 1;
        name
    }

    /// Number of live container nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.nodes[id.0].parent
    }

    /// The container's own symbol; `None` for the root.
    pub fn symbol(&self, id: ContainerId) -> Option<&Symbol> {
        self.nodes[id.0].symbol.as_ref()
    }

    /// Container path given to symbols declared directly inside `id`.
    pub fn path(&self, id: ContainerId) -> &[String] {
        &self.nodes[id.0].inner_path
    }

    /// Leaf symbols declared directly inside `id`.
    pub fn symbols(&self, id: ContainerId) -> &[Symbol] {
        &self.nodes[id.0].contents.symbols
    }

    /// Child containers of `id`, in declaration order.
    pub fn children(&self, id: ContainerId) -> &[ContainerId] {
        &self.nodes[id.0].contents.children
    }

    /// Add a leaf symbol to `parent`, replacing an existing symbol with the
    /// same key. Returns the symbol's index within the scope.
    pub fn add_symbol(&mut self, parent: ContainerId, mut symbol: Symbol) -> usize {
        symbol.container_path = self.nodes[parent.0].inner_path.clone();
        let symbols = &mut self.nodes[parent.0].contents.symbols;
        match symbols.iter().position(|s| s.same_key(&symbol)) {
            Some(index) => {
                symbols[index] = symbol;
                index
            }
            None => {
                symbols.push(symbol);
                symbols.len() - 1
            }
        }
    }

    /// Enter a container declared inside `parent`.
    ///
    /// If `parent` already has a container with the same key, from this
    /// parse or the one before, it is reused and emptied; otherwise a node
    /// is allocated.
    pub fn open_container(&mut self, parent: ContainerId, mut symbol: Symbol) -> ContainerId {
        symbol.container_path = self.nodes[parent.0].inner_path.clone();

        let existing = match self.find_child(&self.nodes[parent.0].contents.children, &symbol) {
            Some(index) => Some(self.nodes[parent.0].contents.children[index]),
            None => self
                .find_child(&self.nodes[parent.0].previous, &symbol)
                .map(|index| {
                    let id = self.nodes[parent.0].previous.remove(index);
                    self.nodes[parent.0].contents.children.push(id);
                    id
                }),
        };
        if let Some(id) = existing {
            self.reset_contents(id);
            self.nodes[id.0].symbol = Some(symbol);
            return id;
        }

        let mut inner_path = symbol.container_path.clone();
        inner_path.push(symbol.name.clone());
        let node = Node::new(Some(symbol), Some(parent), inner_path);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                ContainerId(self.nodes.len() - 1)
            }
        };
        self.nodes[parent.0].contents.children.push(id);
        id
    }

    /// Record where a container's declaration text ends up.
    pub fn set_definition(&mut self, id: ContainerId, definition: Definition) {
        if let Some(symbol) = self.nodes[id.0].symbol.as_mut() {
            symbol.definition = definition;
        }
    }

    pub fn add_import(&mut self, id: ContainerId, name: &str) {
        let imports = &mut self.nodes[id.0].contents.imports;
        if !imports.iter().any(|i| i == name) {
            imports.push(name.to_string());
        }
    }

    pub fn add_export(&mut self, id: ContainerId, name: &str) {
        let exports = &mut self.nodes[id.0].contents.exports;
        if !exports.iter().any(|e| e == name) {
            exports.push(name.to_string());
        }
    }

    fn container_info(&self, id: ContainerId) -> ContainerSymbolsInfo {
        let contents = &self.nodes[id.0].contents;
        ContainerSymbolsInfo {
            symbols: contents.symbols.clone(),
            imports: contents.imports.clone(),
            exports: contents.exports.clone(),
            containers: self.containers(id),
        }
    }

    fn containers(&self, id: ContainerId) -> Vec<Container> {
        self.nodes[id.0]
            .contents
            .children
            .iter()
            .filter_map(|&child| {
                let symbol = self.nodes[child.0].symbol.clone()?;
                Some(Container {
                    symbol,
                    info: self.container_info(child),
                })
            })
            .collect()
    }

    /// Materialize the tree reachable from the root.
    pub fn to_file_info(&self, includes: Vec<String>) -> FileSymbolsInfo {
        let root = self.container_info(Self::ROOT);
        FileSymbolsInfo {
            symbols: root.symbols,
            imports: root.imports,
            exports: root.exports,
            containers: root.containers,
            includes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, Range};
    use crate::symbols::SymbolKind;

    fn range(line: u32) -> Range {
        Range::new(Position::new(line, 0), Position::new(line, 1))
    }

    // ==================== Upsert tests ====================

    #[test]
    fn test_add_symbol_sets_path() {
        let mut table = SymbolTable::new();
        let top = table.open_container(SymbolTable::ROOT, Symbol::new("top", SymbolKind::Module));
        let f = table.open_container(top, Symbol::new("f", SymbolKind::Task));
        table.add_symbol(f, Symbol::new("x", SymbolKind::Port { data_type: None }));
        assert_eq!(table.symbols(f)[0].container_path, vec!["top", "f"]);
        assert_eq!(table.symbol(f).unwrap().container_path, vec!["top"]);
        assert_eq!(table.parent(f), Some(top));
    }

    #[test]
    fn test_add_symbol_updates_in_place() {
        let mut table = SymbolTable::new();
        let first = table.add_symbol(
            SymbolTable::ROOT,
            Symbol::new("W", SymbolKind::Parameter).with_definition(Definition::Single(range(1))),
        );
        let second = table.add_symbol(
            SymbolTable::ROOT,
            Symbol::new("W", SymbolKind::Parameter).with_definition(Definition::Single(range(5))),
        );
        assert_eq!(first, second);
        let symbols = table.symbols(SymbolTable::ROOT);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].definition, Definition::Single(range(5)));
    }

    #[test]
    fn test_same_name_different_tag_is_distinct() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolTable::ROOT, Symbol::new("a", SymbolKind::Parameter));
        table.add_symbol(SymbolTable::ROOT, Symbol::new("a", SymbolKind::Localparam));
        assert_eq!(table.symbols(SymbolTable::ROOT).len(), 2);
    }

    #[test]
    fn test_reopen_container_clears_contents() {
        let mut table = SymbolTable::new();
        let m = table.open_container(SymbolTable::ROOT, Symbol::new("m", SymbolKind::Module));
        table.add_symbol(m, Symbol::new("old", SymbolKind::Parameter));
        table.add_import(m, "pkg");
        let again = table.open_container(SymbolTable::ROOT, Symbol::new("m", SymbolKind::Module));
        assert_eq!(m, again);
        assert!(table.symbols(again).is_empty());
        assert_eq!(table.children(SymbolTable::ROOT).len(), 1);
    }

    // ==================== Reparse tests ====================

    /// Open `m` with a nested function `f`, as one parse of a file would.
    fn parse_module_with_function(table: &mut SymbolTable) -> (ContainerId, ContainerId) {
        table.begin_parse();
        let m = table.open_container(SymbolTable::ROOT, Symbol::new("m", SymbolKind::Module));
        let f = table.open_container(m, Symbol::new("f", SymbolKind::Function { return_type: None }));
        table.end_parse();
        (m, f)
    }

    #[test]
    fn test_reparse_reuses_nested_containers() {
        let mut table = SymbolTable::new();
        let first = parse_module_with_function(&mut table);
        for _ in 0..4 {
            assert_eq!(parse_module_with_function(&mut table), first);
        }
        assert_eq!(table.node_count(), 3);
        assert_eq!(table.children(first.0), &[first.1]);
    }

    #[test]
    fn test_end_parse_releases_undeclared_containers() {
        let mut table = SymbolTable::new();
        table.begin_parse();
        table.add_symbol(SymbolTable::ROOT, Symbol::new("OLD", SymbolKind::Macro {
            replacement: "1".into(),
        }));
        let a = table.open_container(SymbolTable::ROOT, Symbol::new("a", SymbolKind::Module));
        table.open_container(a, Symbol::new("t", SymbolKind::Task));
        table.end_parse();
        assert_eq!(table.node_count(), 3);

        table.begin_parse();
        table.open_container(SymbolTable::ROOT, Symbol::new("b", SymbolKind::Module));
        table.end_parse();

        let info = table.to_file_info(Vec::new());
        assert!(info.symbols.is_empty());
        let names: Vec<&str> = info.containers.iter().map(|c| c.symbol.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
        assert_eq!(table.node_count(), 2);
    }

    #[test]
    fn test_released_slots_are_recycled() {
        let mut table = SymbolTable::new();
        for name in ["a", "b", "c", "d"] {
            table.begin_parse();
            table.open_container(SymbolTable::ROOT, Symbol::new(name, SymbolKind::Module));
            table.end_parse();
        }
        assert_eq!(table.node_count(), 2);
        assert!(table.nodes.len() <= 3);
    }

    // ==================== Anonymous naming tests ====================

    #[test]
    fn test_anonymous_names_restart_per_parse() {
        let mut table = SymbolTable::new();
        assert_eq!(table.anonymous_name("struct"), "struct#0");
        assert_eq!(table.anonymous_name("enum"), "enum#1");
        table.begin_parse();
        assert_eq!(table.anonymous_name("struct"), "struct#0");
    }

    // ==================== Conversion tests ====================

    #[test]
    fn test_to_file_info_and_back() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolTable::ROOT, Symbol::new("WIDTH", SymbolKind::Macro {
            replacement: "8".into(),
        }));
        let pkg = table.open_container(SymbolTable::ROOT, Symbol::new("p", SymbolKind::Package));
        table.add_symbol(pkg, Symbol::new("N", SymbolKind::Parameter));
        table.add_export(pkg, "q::*");
        table.add_export(pkg, "q::*");

        let info = table.to_file_info(vec!["defs.svh".into()]);
        assert_eq!(info.symbols.len(), 1);
        assert_eq!(info.containers[0].info.exports, vec!["q::*"]);
        assert_eq!(info.includes, vec!["defs.svh"]);

        let rebuilt = SymbolTable::from_file_info(&info).to_file_info(info.includes.clone());
        assert_eq!(rebuilt, info);
    }
}
