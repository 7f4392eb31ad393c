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

use super::{IDENT, NUMBER as NUMBER_LITERAL};
use crate::tokenizer::{ContextDef, GrammarBuilder, PatternDef};

/// Scope names produced by the preprocessor grammar.
pub mod scopes {
    pub const IDENTIFIER: &str = "identifier";
    pub const MACRO: &str = "macro.identifier";
    pub const CONDITIONAL: &str = "macro.conditional";
    pub const QUOTE: &str = "macro.quote";
    pub const ESCAPED_QUOTE: &str = "macro.escaped_quote";
    pub const CONCAT: &str = "macro.concat";
    pub const LINE_CONTINUATION: &str = "line_continuation";
    pub const NUMBER: &str = "number";
    pub const STRING: &str = "string.quoted";
    pub const LINE_COMMENT: &str = "comment.line";
    pub const BLOCK_COMMENT: &str = "comment.block";
    pub const WHITESPACE: &str = "whitespace";
    pub const NEWLINE: &str = "newline";
    pub const OPEN: &str = "punctuation.open";
    pub const CLOSE: &str = "punctuation.close";
    pub const COMMA: &str = "punctuation.comma";
    pub const OPERATOR: &str = "operator";

    pub const PAREN_BLOCK: &str = "parantheses.block";
    pub const BRACE_BLOCK: &str = "braces.block";
    pub const BRACKET_BLOCK: &str = "brackets.block";
}

use scopes::*;

pub(super) fn builder() -> GrammarBuilder {
    GrammarBuilder::new()
        .context(
            "Main",
            ContextDef::new("")
                .pattern(PatternDef::new(r"\\\r?\n", &[LINE_CONTINUATION]))
                .pattern(PatternDef::new(r"//[^\r\n]*", &[LINE_COMMENT]))
                .pattern(PatternDef::new(r"/\*", &[BLOCK_COMMENT]).push("BlockComment"))
                .pattern(PatternDef::new(r#""(?:[^"\\\r\n]|\\(?s:.))*"?"#, &[STRING]))
                // Two-character macro escapes.
                .pattern(PatternDef::new(r#"`\\`""#, &[ESCAPED_QUOTE]))
                .pattern(PatternDef::new(r#"`""#, &[QUOTE]))
                .pattern(PatternDef::new(r"``", &[CONCAT]))
                // Conditional chains snapshot the bracket scopes so every
                // branch starts from the same state.
                .pattern(PatternDef::new(r"`(?:ifdef|ifndef)\b", &[CONDITIONAL]).save())
                .pattern(PatternDef::new(r"`(?:elsif|else)\b", &[CONDITIONAL]).restore())
                .pattern(PatternDef::new(r"`endif\b", &[CONDITIONAL]).delete())
                .pattern(PatternDef::new(format!("`{}", IDENT), &[MACRO]))
                .pattern(PatternDef::new(IDENT, &[IDENTIFIER]))
                .pattern(PatternDef::new(r"\\\S+", &[IDENTIFIER]))
                .pattern(PatternDef::new(r"\$[A-Za-z0-9_$]+", &[IDENTIFIER]))
                .pattern(PatternDef::new(NUMBER_LITERAL, &[NUMBER]))
                .pattern(PatternDef::new(r"[ \t\x0B\x0C]+", &[WHITESPACE]))
                .pattern(PatternDef::new(r"\r?\n|\r", &[NEWLINE]))
                .pattern(PatternDef::new(r"\(", &[OPEN]).push_scopes(&[PAREN_BLOCK]))
                .pattern(PatternDef::new(r"\)", &[CLOSE]).pop_scopes(&[PAREN_BLOCK]))
                .pattern(PatternDef::new(r"\{", &[OPEN]).push_scopes(&[BRACE_BLOCK]))
                .pattern(PatternDef::new(r"\}", &[CLOSE]).pop_scopes(&[BRACE_BLOCK]))
                .pattern(PatternDef::new(r"\[", &[OPEN]).push_scopes(&[BRACKET_BLOCK]))
                .pattern(PatternDef::new(r"\]", &[CLOSE]).pop_scopes(&[BRACKET_BLOCK]))
                .pattern(PatternDef::new(",", &[COMMA]))
                .pattern(PatternDef::new(r#"[^\s\w$\\"`(){}\[\],/]+|/|`"#, &[OPERATOR])),
        )
        .context(
            "BlockComment",
            ContextDef::new(BLOCK_COMMENT)
                .pattern(PatternDef::new(r"\*/", &[""]).pop())
                .pattern(PatternDef::new(r"[^*]+|\*", &[""])),
        )
}

#[cfg(test)]
mod tests {
    use super::super::preprocessor;
    use super::scopes;
    use crate::tokenizer::Token;

    fn kinds(tokens: &[Token]) -> Vec<(&str, &str)> {
        tokens.iter().map(|t| (t.text.as_str(), t.scope())).collect()
    }

    // ==================== Classification tests ====================

    #[test]
    fn test_define_line() {
        let tokens = preprocessor().tokenize("`define W 8 // width\n", None);
        assert_eq!(
            kinds(&tokens),
            vec![
                ("`define", scopes::MACRO),
                (" ", scopes::WHITESPACE),
                ("W", scopes::IDENTIFIER),
                (" ", scopes::WHITESPACE),
                ("8", scopes::NUMBER),
                (" ", scopes::WHITESPACE),
                ("// width", scopes::LINE_COMMENT),
                ("\n", scopes::NEWLINE),
            ]
        );
    }

    #[test]
    fn test_macro_escapes() {
        let tokens = preprocessor().tokenize(r#"`"a``b`\`"`""#, None);
        let found: Vec<_> = tokens.iter().map(|t| t.scope()).collect();
        assert_eq!(
            found,
            vec![
                scopes::QUOTE,
                scopes::IDENTIFIER,
                scopes::CONCAT,
                scopes::IDENTIFIER,
                scopes::ESCAPED_QUOTE,
                scopes::QUOTE,
            ]
        );
    }

    #[test]
    fn test_string_is_one_token() {
        let tokens = preprocessor().tokenize(r#"x = "a \"`FOO\" b";"#, None);
        let string = tokens.iter().find(|t| t.scope() == scopes::STRING).unwrap();
        assert_eq!(string.text, r#""a \"`FOO\" b""#);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = preprocessor().tokenize("a /* x\n * y */ b", None);
        let comment: String = tokens
            .iter()
            .filter(|t| t.has_scope(scopes::BLOCK_COMMENT))
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(comment, "/* x\n * y */");
        assert_eq!(tokens.last().unwrap().scope(), scopes::IDENTIFIER);
    }

    #[test]
    fn test_line_continuation() {
        let tokens = preprocessor().tokenize("a \\\n b", None);
        assert!(tokens
            .iter()
            .any(|t| t.scope() == scopes::LINE_CONTINUATION && t.text == "\\\n"));
    }

    #[test]
    fn test_bracket_depth_scopes() {
        let tokens = preprocessor().tokenize("f(a, {b, c})", None);
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert!(b.has_scope(scopes::PAREN_BLOCK));
        assert!(b.has_scope(scopes::BRACE_BLOCK));
        let last = tokens.last().unwrap();
        assert_eq!(last.text, ")");
    }

    #[test]
    fn test_conditional_restores_bracket_state() {
        let text = "`ifdef A\n(\n`else\n(\n`endif\nx)\ny";
        let tokens = preprocessor().tokenize(text, None);
        let x = tokens.iter().find(|t| t.text == "x").unwrap();
        let y = tokens.iter().find(|t| t.text == "y").unwrap();
        assert_eq!(x.scope_depth(scopes::PAREN_BLOCK), 1);
        assert_eq!(y.scope_depth(scopes::PAREN_BLOCK), 0);
    }

    #[test]
    fn test_comment_slash_is_not_operator() {
        let tokens = preprocessor().tokenize("a=//c\nb/2", None);
        assert_eq!(tokens[1].text, "=");
        assert_eq!(tokens[2].scope(), scopes::LINE_COMMENT);
        assert!(tokens.iter().any(|t| t.text == "/" && t.scope() == scopes::OPERATOR));
    }
}
