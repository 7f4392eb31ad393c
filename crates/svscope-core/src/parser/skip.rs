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

//! Bounded statement skipping.
//!
//! Procedural code is never parsed. The skipper only knows how many
//! statements each control keyword is followed by and how blocks are
//! delimited, which is enough to find where a statement ends. It keeps an
//! explicit work stack instead of recursing, so deeply nested code cannot
//! exhaust the call stack.

use super::cursor::Cursor;
use crate::grammars::sv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Work {
    /// One statement.
    Statement,
    /// An optional `else` followed by a statement.
    Else,
    /// The `while (...);` tail of a `do` loop.
    DoWhile,
}

impl Cursor {
    /// Skip one procedural statement, including nested blocks.
    pub(crate) fn skip_statement(&mut self) {
        let mut work = vec![Work::Statement];
        while let Some(item) = work.pop() {
            match item {
                Work::Else => {
                    if self.eat_text("else") {
                        work.push(Work::Statement);
                    }
                }
                Work::DoWhile => {
                    if self.eat_text("while") {
                        self.skip_balanced();
                        self.eat(sv::SEMICOLON);
                    }
                }
                Work::Statement => {
                    if !self.statement(&mut work) {
                        return;
                    }
                }
            }
        }
    }

    /// Consume the head of one statement, pushing whatever must follow it.
    /// Returns false at a region end, which is left unconsumed.
    fn statement(&mut self, work: &mut Vec<Work>) -> bool {
        self.skip_statement_prefixes();
        let Some(token) = self.peek() else {
            return false;
        };
        if token.is_hard_end() {
            return false;
        }
        let scope = token.scope.clone();
        let text = token.text.clone();
        match &*scope {
            sv::SEMICOLON => self.bump(),
            sv::BEGIN => {
                self.skip_block(sv::BEGIN, sv::END);
                self.eat_label();
            }
            sv::FORK => {
                self.skip_block(sv::FORK, sv::JOIN);
                self.eat_label();
            }
            sv::CASE => self.skip_block(sv::CASE, sv::END_CASE),
            sv::ASSERTION => {
                self.bump();
                // `assert property`, `cover sequence`, `assert final`, `assert #0`
                if self.is(sv::CONSTRUCT) || self.is_text("final") {
                    self.bump();
                } else if self.eat(sv::HASH) {
                    self.bump();
                }
                self.skip_balanced();
                work.push(Work::Else);
                if !self.is_text("else") {
                    work.push(Work::Statement);
                }
            }
            sv::CONTROL => {
                self.bump();
                match text.as_str() {
                    "if" => {
                        self.skip_balanced();
                        work.push(Work::Else);
                        work.push(Work::Statement);
                    }
                    "for" | "foreach" | "while" | "repeat" => {
                        self.skip_balanced();
                        work.push(Work::Statement);
                    }
                    "forever" => work.push(Work::Statement),
                    "do" => {
                        work.push(Work::DoWhile);
                        work.push(Work::Statement);
                    }
                    "wait" => {
                        if self.eat(sv::FORK) {
                            self.eat(sv::SEMICOLON);
                        } else {
                            self.skip_balanced();
                            work.push(Work::Statement);
                        }
                    }
                    "wait_order" => {
                        self.skip_balanced();
                        work.push(Work::Else);
                        if !self.is_text("else") {
                            work.push(Work::Statement);
                        }
                    }
                    _ => self.skip_to_semicolon(),
                }
            }
            _ => self.skip_to_semicolon(),
        }
        true
    }

    /// Labels, event controls, delays and `unique`/`priority` qualifiers.
    fn skip_statement_prefixes(&mut self) {
        loop {
            let Some(token) = self.peek() else {
                return;
            };
            if token.is(sv::IDENTIFIER) && self.nth_is(1, sv::COLON) {
                self.bump();
                self.bump();
            } else if token.is(sv::AT) {
                self.bump();
                if !self.skip_balanced() {
                    // `@*`, `@(*)` or `@ev`
                    self.bump();
                }
            } else if token.is(sv::HASH) || token.text == "##" {
                self.bump();
                if !self.skip_balanced() {
                    self.bump();
                }
            } else if token.is(sv::CONTROL)
                && matches!(token.text.as_str(), "unique" | "unique0" | "priority")
            {
                self.bump();
            } else {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::cursor::significant;
    use super::*;
    use crate::grammars::structural;

    /// Skip one statement and return the text of the next token.
    fn after(text: &str) -> String {
        let mut cursor = Cursor::new(significant(structural().tokenize(text, None)));
        cursor.skip_statement();
        cursor
            .peek()
            .map(|t| t.text.clone())
            .unwrap_or_else(|| "<eof>".into())
    }

    // ==================== Simple statement tests ====================

    #[test]
    fn test_simple_statement() {
        assert_eq!(after("a = b + c; NEXT"), "NEXT");
        assert_eq!(after("; NEXT"), "NEXT");
    }

    #[test]
    fn test_event_and_delay_prefixes() {
        assert_eq!(after("@(posedge clk) q <= d; NEXT"), "NEXT");
        assert_eq!(after("@* x = y; NEXT"), "NEXT");
        assert_eq!(after("#5 x = 1; NEXT"), "NEXT");
        assert_eq!(after("#(DELAY) x = 1; NEXT"), "NEXT");
    }

    // ==================== Block tests ====================

    #[test]
    fn test_begin_end_block() {
        assert_eq!(after("begin a; begin b; end end NEXT"), "NEXT");
        assert_eq!(after("begin : blk a; end : blk NEXT"), "NEXT");
    }

    #[test]
    fn test_fork_join() {
        assert_eq!(after("fork a; b; join_none NEXT"), "NEXT");
    }

    #[test]
    fn test_case() {
        assert_eq!(
            after("unique case (s) 0: a; 1: begin b; end default: ; endcase NEXT"),
            "NEXT"
        );
    }

    // ==================== Control flow tests ====================

    #[test]
    fn test_if_else_chain() {
        assert_eq!(after("if (a) x; else if (b) y; else z; NEXT"), "NEXT");
        assert_eq!(after("if (a) begin x; end NEXT"), "NEXT");
    }

    #[test]
    fn test_loops() {
        assert_eq!(after("for (int i = 0; i < 4; i++) a[i] = 0; NEXT"), "NEXT");
        assert_eq!(after("foreach (a[i]) begin a[i] = 0; end NEXT"), "NEXT");
        assert_eq!(after("forever #1 clk = ~clk; NEXT"), "NEXT");
        assert_eq!(after("do x++; while (x < 4); NEXT"), "NEXT");
        assert_eq!(after("repeat (3) @(posedge clk); NEXT"), "NEXT");
    }

    #[test]
    fn test_wait_fork() {
        assert_eq!(after("wait fork; NEXT"), "NEXT");
        assert_eq!(after("wait (done) x = 1; NEXT"), "NEXT");
    }

    // ==================== Assertion tests ====================

    #[test]
    fn test_assertion_action_blocks() {
        assert_eq!(after("assert (a); NEXT"), "NEXT");
        assert_eq!(after("assert (a) else $error(\"bad\"); NEXT"), "NEXT");
        assert_eq!(after("assert (a) $display(\"ok\"); else $fatal; NEXT"), "NEXT");
        assert_eq!(
            after("a1: assert property (@(posedge clk) a |-> b) else $error; NEXT"),
            "NEXT"
        );
        assert_eq!(after("assert final (x); NEXT"), "NEXT");
    }

    // ==================== Robustness tests ====================

    #[test]
    fn test_stops_at_region_end() {
        assert_eq!(after("endmodule"), "endmodule");
        assert_eq!(after("x = 1 endfunction"), "endfunction");
    }

    #[test]
    fn test_unterminated_input() {
        assert_eq!(after("if (a"), "<eof>");
        assert_eq!(after("begin x;"), "<eof>");
    }

    #[test]
    fn test_deep_nesting() {
        let mut text = String::new();
        for _ in 0..5000 {
            text.push_str("if (a) ");
        }
        text.push_str("x; NEXT");
        assert_eq!(after(&text), "NEXT");
    }
}
