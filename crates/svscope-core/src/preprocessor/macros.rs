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

//! Macro definitions, the macro table and its change log.

use crate::grammars::pre;
use crate::tokenizer::Token;
use std::collections::HashMap;
use std::sync::Arc;

/// Classification of a preprocessor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreTokenKind {
    Identifier,
    /// `` `name``: a directive or a macro invocation.
    Macro,
    /// `` `ifdef``, `` `ifndef``, `` `elsif``, `` `else`` or `` `endif``.
    Conditional,
    /// `` `" ``
    Quote,
    /// `` `\`" ``
    EscapedQuote,
    /// ``` `` ```
    Concat,
    LineContinuation,
    Number,
    String,
    LineComment,
    /// Any piece of a `/* ... */` comment.
    BlockComment,
    Whitespace,
    Newline,
    Open,
    Close,
    Comma,
    Operator,
    Invalid,
}

impl PreTokenKind {
    /// Classify a token produced by the preprocessor grammar.
    pub fn classify(token: &Token) -> Self {
        if token.has_scope(pre::BLOCK_COMMENT) {
            return PreTokenKind::BlockComment;
        }
        match token.scope() {
            pre::IDENTIFIER => PreTokenKind::Identifier,
            pre::MACRO => PreTokenKind::Macro,
            pre::CONDITIONAL => PreTokenKind::Conditional,
            pre::QUOTE => PreTokenKind::Quote,
            pre::ESCAPED_QUOTE => PreTokenKind::EscapedQuote,
            pre::CONCAT => PreTokenKind::Concat,
            pre::LINE_CONTINUATION => PreTokenKind::LineContinuation,
            pre::NUMBER => PreTokenKind::Number,
            pre::STRING => PreTokenKind::String,
            pre::LINE_COMMENT => PreTokenKind::LineComment,
            pre::WHITESPACE => PreTokenKind::Whitespace,
            pre::NEWLINE => PreTokenKind::Newline,
            pre::OPEN => PreTokenKind::Open,
            pre::CLOSE => PreTokenKind::Close,
            pre::COMMA => PreTokenKind::Comma,
            pre::OPERATOR => PreTokenKind::Operator,
            _ => PreTokenKind::Invalid,
        }
    }

    /// Whitespace-like tokens: skipped between a macro name and its
    /// arguments and trimmed from both ends of actual arguments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            PreTokenKind::Whitespace
                | PreTokenKind::Newline
                | PreTokenKind::LineContinuation
                | PreTokenKind::LineComment
                | PreTokenKind::BlockComment
        )
    }
}

/// One token of a macro body or parameter default, with byte offsets in the
/// file that defined the macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroToken {
    pub text: String,
    pub kind: PreTokenKind,
    pub start: usize,
    pub end: usize,
}

/// A formal parameter of a function-like macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroParam {
    pub name: String,
    /// Tokens used when the actual argument is empty.
    pub default: Option<Vec<MacroToken>>,
}

/// A `` `define``d macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    /// `None` for object-like macros; `Some` (possibly empty) for
    /// function-like ones.
    pub params: Option<Vec<MacroParam>>,
    pub body: Vec<MacroToken>,
    /// File the macro was defined in; `None` for user defines.
    pub origin: Option<Arc<str>>,
    /// Byte span of the `` `define`` directive in `origin`.
    pub span: (usize, usize),
    /// Byte span of the macro name in `origin`.
    pub name_span: (usize, usize),
}

impl Macro {
    /// An object-like macro with no origin file.
    pub fn user(name: impl Into<String>, body: Vec<MacroToken>) -> Self {
        Self {
            name: name.into(),
            params: None,
            body,
            origin: None,
            span: (0, 0),
            name_span: (0, 0),
        }
    }

    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }

    /// The replacement text as written.
    pub fn replacement(&self) -> String {
        self.body.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Macros currently defined, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
    order: Vec<String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a macro. Returns the definition it replaced, if any.
    pub fn define(&mut self, definition: Macro) -> Option<Macro> {
        let name = definition.name.clone();
        let previous = self.macros.insert(name.clone(), definition);
        match previous {
            Some(_) => {
                // Redefinition moves the macro to the end.
                self.order.retain(|n| *n != name);
                self.order.push(name);
            }
            None => self.order.push(name),
        }
        previous
    }

    pub fn undef(&mut self, name: &str) -> Option<Macro> {
        let removed = self.macros.remove(name);
        if removed.is_some() {
            self.order.retain(|n| n != name);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.macros.clear();
        self.order.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Iterate in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.order.iter().filter_map(|name| self.macros.get(name))
    }
}

/// One edit to a macro table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroChange {
    Add(Macro),
    Delete(String),
    DeleteAll,
}

/// The ordered edits one file's directives made to the macro table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroChangeLog {
    changes: Vec<MacroChange>,
}

impl MacroChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: MacroChange) {
        self.changes.push(change);
    }

    /// Append every change of another log.
    pub fn extend(&mut self, other: &MacroChangeLog) {
        self.changes.extend(other.changes.iter().cloned());
    }

    pub fn changes(&self) -> &[MacroChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply the recorded edits to `table` in order.
    pub fn replay(&self, table: &mut MacroTable) {
        for change in &self.changes {
            match change {
                MacroChange::Add(definition) => {
                    table.define(definition.clone());
                }
                MacroChange::Delete(name) => {
                    table.undef(name);
                }
                MacroChange::DeleteAll => table.clear(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, text: &str) -> Macro {
        Macro::user(
            name,
            vec![MacroToken {
                text: text.to_string(),
                kind: PreTokenKind::Number,
                start: 0,
                end: text.len(),
            }],
        )
    }

    // ==================== MacroTable tests ====================

    #[test]
    fn test_define_and_lookup() {
        let mut table = MacroTable::new();
        assert!(table.define(object("W", "8")).is_none());
        assert_eq!(table.get("W").unwrap().replacement(), "8");
        assert!(!table.get("W").unwrap().is_function_like());
    }

    #[test]
    fn test_redefine_returns_previous_and_moves_to_end() {
        let mut table = MacroTable::new();
        table.define(object("A", "1"));
        table.define(object("B", "2"));
        let previous = table.define(object("A", "3")).unwrap();
        assert_eq!(previous.replacement(), "1");
        let names: Vec<_> = table.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_undef_and_clear() {
        let mut table = MacroTable::new();
        table.define(object("A", "1"));
        table.define(object("B", "2"));
        assert!(table.undef("A").is_some());
        assert!(table.undef("A").is_none());
        assert_eq!(table.len(), 1);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }

    // ==================== MacroChangeLog tests ====================

    #[test]
    fn test_replay_reproduces_table() {
        let mut log = MacroChangeLog::new();
        log.push(MacroChange::Add(object("A", "1")));
        log.push(MacroChange::Add(object("B", "2")));
        log.push(MacroChange::Delete("A".into()));
        log.push(MacroChange::Add(object("C", "3")));

        let mut table = MacroTable::new();
        table.define(object("X", "0"));
        log.replay(&mut table);
        let names: Vec<_> = table.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["X", "B", "C"]);
    }

    #[test]
    fn test_replay_delete_all() {
        let mut log = MacroChangeLog::new();
        log.push(MacroChange::DeleteAll);
        log.push(MacroChange::Add(object("A", "1")));
        let mut table = MacroTable::new();
        table.define(object("X", "0"));
        log.replay(&mut table);
        assert_eq!(table.len(), 1);
        assert!(table.contains("A"));
    }

    #[test]
    fn test_log_extend() {
        let mut first = MacroChangeLog::new();
        first.push(MacroChange::DeleteAll);
        let mut second = MacroChangeLog::new();
        second.push(MacroChange::Delete("Z".into()));
        first.extend(&second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.changes()[1], MacroChange::Delete("Z".into()));
    }
}
