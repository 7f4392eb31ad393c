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

//! The scan loop that runs a compiled [`Grammar`] over text.

use super::grammar::{Action, ContextId, Grammar, Pattern, Scope, StateAction};
use regex::Captures;
use tracing::error;

/// One token of tokenizer output.
///
/// Tokens are contiguous: concatenating the text of all tokens returned by
/// one [`Grammar::tokenize`] call reproduces the input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The matched text.
    pub text: String,
    /// Byte offset of the first character in the input.
    pub offset: usize,
    /// Scope names, outermost first.
    pub scopes: Vec<Scope>,
}

impl Token {
    /// The innermost scope, or `""` if the token has none.
    pub fn scope(&self) -> &str {
        self.scopes.last().map(|s| &**s).unwrap_or("")
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Returns true if `scope` appears anywhere in the scope stack.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| &**s == scope)
    }

    /// Number of times `scope` appears in the scope stack.
    pub fn scope_depth(&self, scope: &str) -> usize {
        self.scopes.iter().filter(|s| &***s == scope).count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    context: ContextId,
    /// Length of the scope stack before this context's scope was pushed.
    scope_base: usize,
}

/// Mutable state of one tokenize call.
struct Scanner<'g> {
    grammar: &'g Grammar,
    frames: Vec<Frame>,
    scopes: Vec<Scope>,
    saved: Vec<(Vec<Frame>, Vec<Scope>)>,
    tokens: Vec<Token>,
}

impl Grammar {
    /// Tokenize `text`.
    ///
    /// Scanning starts in the `Main` context with `initial_scopes` as the
    /// scope stack, or `[Main.scope]` when `None`. At each offset the active
    /// context's patterns are tried in order and the first match wins.
    /// Characters no pattern matches are collected into a single token with
    /// the grammar's invalid scope.
    ///
    /// A pattern that matches the empty string or whose captures do not tile
    /// the match is a grammar bug; it is logged and an empty vector is
    /// returned.
    pub fn tokenize(&self, text: &str, initial_scopes: Option<&[Scope]>) -> Vec<Token> {
        let main = &self.contexts[self.main.0];
        let scopes = match initial_scopes {
            Some(scopes) => scopes.to_vec(),
            None => main.scope.iter().cloned().collect(),
        };
        let mut scanner = Scanner {
            grammar: self,
            frames: vec![Frame {
                context: self.main,
                scope_base: 0,
            }],
            scopes,
            saved: Vec::new(),
            tokens: Vec::with_capacity(text.len() / 4 + 1),
        };

        let mut pos = 0;
        let mut invalid_start: Option<usize> = None;
        while pos < text.len() {
            let rest = &text[pos..];
            let context = &self.contexts[scanner.current().0];
            let matched = context
                .patterns
                .iter()
                .find_map(|pattern| pattern.regex.captures(rest).map(|caps| (pattern, caps)));

            let Some((pattern, caps)) = matched else {
                invalid_start.get_or_insert(pos);
                pos += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            };

            let len = caps.get(0).map_or(0, |m| m.end());
            if len == 0 {
                error!(
                    context = %context.name,
                    pattern = %pattern.source,
                    offset = pos,
                    "grammar pattern matched the empty string"
                );
                return Vec::new();
            }

            if let Some(start) = invalid_start.take() {
                scanner.emit_invalid(&text[start..pos], start);
            }
            if !scanner.emit_captures(pattern, &caps, pos) {
                error!(
                    context = %context.name,
                    pattern = %pattern.source,
                    offset = pos,
                    "grammar pattern captures do not tile the match"
                );
                return Vec::new();
            }
            if let Some(state) = pattern.state {
                scanner.apply_state(state);
            }
            if let Some(action) = &pattern.action {
                scanner.apply_action(action);
            }
            pos += len;
        }
        if let Some(start) = invalid_start {
            scanner.emit_invalid(&text[start..], start);
        }
        scanner.tokens
    }
}

impl<'g> Scanner<'g> {
    fn current(&self) -> ContextId {
        self.frames.last().map_or(self.grammar.main, |f| f.context)
    }

    fn emit_invalid(&mut self, text: &str, offset: usize) {
        let mut scopes = self.scopes.clone();
        scopes.push(self.grammar.invalid_scope.clone());
        self.tokens.push(Token {
            text: text.to_string(),
            offset,
            scopes,
        });
    }

    fn emit(&mut self, text: &str, offset: usize, pattern_scope: &Option<Scope>, scope: &Option<Scope>) {
        let mut scopes = Vec::with_capacity(self.scopes.len() + 2);
        scopes.extend(self.scopes.iter().cloned());
        scopes.extend(pattern_scope.iter().cloned());
        scopes.extend(scope.iter().cloned());
        self.tokens.push(Token {
            text: text.to_string(),
            offset,
            scopes,
        });
    }

    /// Emit one token per non-empty capture. Returns false if the captures
    /// leave gaps or overlap.
    fn emit_captures(&mut self, pattern: &Pattern, caps: &Captures<'_>, base: usize) -> bool {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        if caps.len() == 1 {
            self.emit(whole.as_str(), base, &pattern.scopes[0], &None);
            return true;
        }
        let mut cursor = 0;
        for group in 1..caps.len() {
            let Some(m) = caps.get(group) else {
                continue;
            };
            if m.is_empty() {
                continue;
            }
            if m.start() != cursor {
                return false;
            }
            self.emit(m.as_str(), base + m.start(), &pattern.scopes[0], &pattern.scopes[group]);
            cursor = m.end();
        }
        cursor == whole.end()
    }

    fn apply_state(&mut self, state: StateAction) {
        match state {
            StateAction::Save => self.saved.push((self.frames.clone(), self.scopes.clone())),
            StateAction::Restore => {
                if let Some((frames, scopes)) = self.saved.last() {
                    self.frames = frames.clone();
                    self.scopes = scopes.clone();
                }
            }
            StateAction::Delete => {
                self.saved.pop();
            }
        }
    }

    fn apply_action(&mut self, action: &Action) {
        match action {
            Action::Push(context) => self.push_context(*context),
            Action::Pop(replacement) => {
                if self.frames.len() > 1 {
                    if let Some(frame) = self.frames.pop() {
                        self.scopes.truncate(frame.scope_base);
                    }
                }
                if let Some(context) = replacement {
                    self.push_context(*context);
                }
            }
            Action::PushScopes(names) => self.scopes.extend(names.iter().cloned()),
            Action::PopScopes(names) => {
                // Unwind past each name in turn; an unmatched closer empties
                // the stack.
                for name in names {
                    while let Some(top) = self.scopes.pop() {
                        if top == *name {
                            break;
                        }
                    }
                }
            }
        }
    }

    fn push_context(&mut self, context: ContextId) {
        self.frames.push(Frame {
            context,
            scope_base: self.scopes.len(),
        });
        if let Some(scope) = &self.grammar.contexts[context.0].scope {
            self.scopes.push(scope.clone());
        }
    }
}
