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

//! Token cursor over the significant structural tokens.

use crate::grammars::sv;
use crate::tokenizer::{Scope, Token};

/// A structural token with trivia removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseToken {
    pub(crate) text: String,
    /// Innermost scope.
    pub(crate) scope: Scope,
    /// Byte offsets in the preprocessed text.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl ParseToken {
    pub(crate) fn is(&self, scope: &str) -> bool {
        &*self.scope == scope
    }

    pub(crate) fn is_open(&self) -> bool {
        self.is(sv::PAREN_OPEN) || self.is(sv::BRACKET_OPEN) || self.is(sv::BRACE_OPEN)
    }

    pub(crate) fn is_close(&self) -> bool {
        self.is(sv::PAREN_CLOSE) || self.is(sv::BRACKET_CLOSE) || self.is(sv::BRACE_CLOSE)
    }

    /// Keywords that close a region. Skipping never runs past one of these
    /// at nesting depth zero.
    pub(crate) fn is_hard_end(&self) -> bool {
        [
            sv::END_CONTAINER,
            sv::END_PACKAGE,
            sv::END_ROUTINE,
            sv::END_GENERATE,
            sv::END_CONSTRUCT,
            sv::END,
            sv::END_CASE,
            sv::JOIN,
        ]
        .iter()
        .any(|scope| self.is(scope))
    }
}

fn is_trivia(token: &Token) -> bool {
    matches!(token.scope(), sv::WHITESPACE | sv::LINE_COMMENT)
        || token.has_scope(sv::BLOCK_COMMENT)
        || token.has_scope(sv::ATTRIBUTE)
}

/// Drop trivia and fold each string literal into a single token.
pub(crate) fn significant(tokens: Vec<Token>) -> Vec<ParseToken> {
    let mut out: Vec<ParseToken> = Vec::with_capacity(tokens.len() / 2 + 1);
    let mut in_string = false;
    for token in tokens {
        if token.has_scope(sv::STRING) {
            let end = token.end();
            match out.last_mut() {
                Some(last) if in_string => {
                    last.text.push_str(&token.text);
                    last.end = end;
                    if token.text == "\"" && !token.has_scope(sv::ESCAPE) {
                        in_string = false;
                    }
                }
                _ => {
                    out.push(ParseToken {
                        scope: Scope::from(sv::STRING),
                        start: token.offset,
                        end,
                        text: token.text,
                    });
                    in_string = true;
                }
            }
            continue;
        }
        in_string = false;
        if is_trivia(&token) {
            continue;
        }
        let Some(scope) = token.scopes.last().cloned() else {
            continue;
        };
        out.push(ParseToken {
            scope,
            start: token.offset,
            end: token.end(),
            text: token.text,
        });
    }
    out
}

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark(usize);

/// Walks a token vector. Only [`Cursor::reset`] moves backwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cursor {
    tokens: Vec<ParseToken>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<ParseToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub(crate) fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    pub(crate) fn token(&self, index: usize) -> Option<&ParseToken> {
        self.tokens.get(index)
    }

    pub(crate) fn peek(&self) -> Option<&ParseToken> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&ParseToken> {
        self.tokens.get(self.pos + n)
    }

    /// The most recently consumed token.
    pub(crate) fn prev(&self) -> Option<&ParseToken> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub(crate) fn is(&self, scope: &str) -> bool {
        self.peek().is_some_and(|t| t.is(scope))
    }

    pub(crate) fn nth_is(&self, n: usize, scope: &str) -> bool {
        self.peek_nth(n).is_some_and(|t| t.is(scope))
    }

    pub(crate) fn is_text(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    /// Consume one token.
    pub(crate) fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, scope: &str) -> bool {
        let hit = self.is(scope);
        if hit {
            self.bump();
        }
        hit
    }

    pub(crate) fn eat_text(&mut self, text: &str) -> bool {
        let hit = self.is_text(text);
        if hit {
            self.bump();
        }
        hit
    }

    /// Consume an identifier and return its index.
    pub(crate) fn eat_identifier(&mut self) -> Option<usize> {
        if self.is(sv::IDENTIFIER) {
            self.bump();
            Some(self.pos - 1)
        } else {
            None
        }
    }

    /// If at an opening bracket, move past its matching closer.
    pub(crate) fn skip_balanced(&mut self) -> bool {
        if !self.peek().is_some_and(ParseToken::is_open) {
            return false;
        }
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_open() {
                depth += 1;
            } else if token.is_close() {
                depth -= 1;
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
        true
    }

    /// Skip past the next semicolon at nesting depth zero. Stops in front
    /// of a region-closing keyword.
    pub(crate) fn skip_to_semicolon(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 {
                if token.is(sv::SEMICOLON) {
                    self.bump();
                    return;
                }
                if token.is_hard_end() {
                    return;
                }
            }
            if token.is_open() {
                depth += 1;
            } else if token.is_close() {
                depth = depth.saturating_sub(1);
            }
            self.bump();
        }
    }

    /// Skip from an opening keyword to just past its matching closer,
    /// counting nested openers of the same kind.
    pub(crate) fn skip_block(&mut self, open: &str, close: &str) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth = depth.saturating_sub(1);
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
    }

    /// Skip past the first token whose text is `end`.
    pub(crate) fn skip_past(&mut self, end: &str) {
        while let Some(token) = self.peek() {
            let found = token.text == end;
            self.bump();
            if found {
                break;
            }
        }
    }

    /// Skip a type reference: `name`, `pkg::name`, `name #(...)`,
    /// `cls#(T)::name` or `intf.modport` when a name follows.
    pub(crate) fn skip_type_reference(&mut self) {
        loop {
            while self.is(sv::PACKAGE_NAME) {
                self.bump();
                self.eat(sv::SCOPE_RESOLUTION);
            }
            if !self.eat(sv::IDENTIFIER) {
                return;
            }
            if self.is(sv::HASH) && self.nth_is(1, sv::PAREN_OPEN) {
                self.bump();
                self.skip_balanced();
            }
            if !self.eat(sv::SCOPE_RESOLUTION) {
                break;
            }
        }
        if self.is(sv::DOT) && self.nth_is(1, sv::IDENTIFIER) && self.nth_is(2, sv::IDENTIFIER) {
            self.bump();
            self.bump();
        }
    }

    /// Skip an expression up to a comma, semicolon or unmatched closing
    /// bracket at depth zero.
    pub(crate) fn skip_expression(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0
                && (token.is(sv::COMMA)
                    || token.is(sv::SEMICOLON)
                    || token.is_close()
                    || token.is_hard_end())
            {
                return;
            }
            if token.is_open() {
                depth += 1;
            } else if token.is_close() {
                depth -= 1;
            }
            self.bump();
        }
    }

    /// Skip unpacked or packed dimensions.
    pub(crate) fn skip_dimensions(&mut self) {
        while self.is(sv::BRACKET_OPEN) {
            self.skip_balanced();
        }
    }

    /// Consume an optional `: label` after a block or region end.
    pub(crate) fn eat_label(&mut self) -> Option<usize> {
        if self.is(sv::COLON) && self.nth_is(1, sv::IDENTIFIER) {
            self.bump();
            return self.eat_identifier();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::structural;

    fn cursor(text: &str) -> Cursor {
        Cursor::new(significant(structural().tokenize(text, None)))
    }

    fn texts(text: &str) -> Vec<String> {
        significant(structural().tokenize(text, None))
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    // ==================== Token preparation tests ====================

    #[test]
    fn test_trivia_removed() {
        assert_eq!(
            texts("wire /* c */ a; // tail\n(* keep *) logic b;"),
            vec!["wire", "a", ";", "logic", "b", ";"]
        );
    }

    #[test]
    fn test_strings_folded() {
        let tokens = significant(structural().tokenize(r#"x = "a \"b\" c"; y = "";"#, None));
        let strings: Vec<_> = tokens.iter().filter(|t| t.is(sv::STRING)).collect();
        assert_eq!(strings.len(), 2);
        assert_eq!(strings[0].text, r#""a \"b\" c""#);
        assert_eq!(strings[1].text, r#""""#);
        assert_eq!(tokens.last().unwrap().text, ";");
    }

    #[test]
    fn test_offsets_kept() {
        let tokens = significant(structural().tokenize("  wire  a;", None));
        assert_eq!((tokens[0].start, tokens[0].end), (2, 6));
        assert_eq!((tokens[1].start, tokens[1].end), (8, 9));
    }

    // ==================== Cursor tests ====================

    #[test]
    fn test_mark_and_reset() {
        let mut c = cursor("a b c");
        let mark = c.mark();
        c.bump();
        c.bump();
        assert!(c.is_text("c"));
        c.reset(mark);
        assert!(c.is_text("a"));
    }

    #[test]
    fn test_bump_stops_at_end() {
        let mut c = cursor("a");
        c.bump();
        c.bump();
        assert!(c.at_end());
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn test_skip_balanced_mixed() {
        let mut c = cursor("( a [ b ] { c ( d ) } ) e");
        assert!(c.skip_balanced());
        assert!(c.is_text("e"));
        assert!(!c.skip_balanced());
    }

    #[test]
    fn test_skip_to_semicolon_nested() {
        let mut c = cursor("x = f(a; b); y;");
        c.skip_to_semicolon();
        assert!(c.is_text("y"));
    }

    #[test]
    fn test_skip_to_semicolon_stops_at_end_keyword() {
        let mut c = cursor("assign a = b endmodule");
        c.skip_to_semicolon();
        assert!(c.is_text("endmodule"));
    }

    #[test]
    fn test_skip_block_nested() {
        let mut c = cursor("begin begin end end : blk after");
        c.skip_block(sv::BEGIN, sv::END);
        assert_eq!(c.eat_label().map(|i| c.token(i).unwrap().text.clone()), Some("blk".into()));
        assert!(c.is_text("after"));
    }

    #[test]
    fn test_skip_past() {
        let mut c = cursor("class a; x; endclass y");
        c.skip_past("endclass");
        assert!(c.is_text("y"));
    }

    #[test]
    fn test_skip_type_reference() {
        let mut c = cursor("pkg::cfg_t #(8) x");
        c.skip_type_reference();
        assert!(c.is_text("x"));
        let mut c = cursor("bus_if.master m");
        c.skip_type_reference();
        assert!(c.is_text("m"));
        let mut c = cursor("fifo#(int)::handle h");
        c.skip_type_reference();
        assert!(c.is_text("h"));
    }

    #[test]
    fn test_skip_expression() {
        let mut c = cursor("f(a, b) + {c, d}, next");
        c.skip_expression();
        assert!(c.is(sv::COMMA));
        let mut c = cursor("8) rest");
        c.skip_expression();
        assert!(c.is(sv::PAREN_CLOSE));
    }
}
