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

/// Scope names produced by the structural grammar.
///
/// Keywords are scoped by the role they play for the parser rather than by
/// the language reference's keyword tables.
pub mod scopes {
    pub const SOURCE: &str = "source.systemverilog";

    pub const CONTAINER: &str = "keyword.container";
    pub const END_CONTAINER: &str = "keyword.endcontainer";
    pub const PACKAGE: &str = "keyword.package";
    pub const END_PACKAGE: &str = "keyword.endpackage";
    pub const ROUTINE: &str = "keyword.routine";
    pub const END_ROUTINE: &str = "keyword.endroutine";
    pub const DIRECTION: &str = "keyword.direction";
    pub const PARAMETER: &str = "keyword.parameter";
    pub const TYPEDEF: &str = "keyword.typedef";
    pub const STRUCT: &str = "keyword.struct";
    pub const ENUM: &str = "keyword.enum";
    pub const MODPORT: &str = "keyword.modport";
    pub const IMPORT: &str = "keyword.import";
    pub const EXPORT: &str = "keyword.export";
    pub const GENVAR: &str = "keyword.genvar";
    pub const GENERATE: &str = "keyword.generate";
    pub const END_GENERATE: &str = "keyword.endgenerate";
    pub const NET_TYPE: &str = "keyword.net_type";
    pub const DATA_TYPE: &str = "keyword.data_type";
    pub const MODIFIER: &str = "keyword.modifier";
    pub const ASSIGN: &str = "keyword.assign";
    pub const ALWAYS: &str = "keyword.always";
    pub const ASSERTION: &str = "keyword.assertion";
    pub const CONTROL: &str = "keyword.control";
    pub const BEGIN: &str = "keyword.begin";
    pub const END: &str = "keyword.end";
    pub const FORK: &str = "keyword.fork";
    pub const JOIN: &str = "keyword.join";
    pub const CASE: &str = "keyword.case";
    pub const END_CASE: &str = "keyword.endcase";
    /// Keywords that open a body the parser skips wholesale.
    pub const CONSTRUCT: &str = "keyword.construct";
    pub const END_CONSTRUCT: &str = "keyword.endconstruct";
    pub const OTHER: &str = "keyword.other";

    pub const IDENTIFIER: &str = "identifier";
    pub const PACKAGE_NAME: &str = "identifier.package";
    pub const SYSTEM_IDENTIFIER: &str = "identifier.system";
    pub const MACRO: &str = "macro.identifier";
    pub const NUMBER: &str = "number";
    pub const STRING: &str = "string.quoted";
    pub const ESCAPE: &str = "constant.character.escape";
    pub const LINE_COMMENT: &str = "comment.line";
    pub const BLOCK_COMMENT: &str = "comment.block";
    pub const ATTRIBUTE: &str = "meta.attribute";
    pub const WHITESPACE: &str = "whitespace";

    pub const PAREN_OPEN: &str = "punctuation.paren.open";
    pub const PAREN_CLOSE: &str = "punctuation.paren.close";
    pub const BRACKET_OPEN: &str = "punctuation.bracket.open";
    pub const BRACKET_CLOSE: &str = "punctuation.bracket.close";
    pub const BRACE_OPEN: &str = "punctuation.brace.open";
    pub const BRACE_CLOSE: &str = "punctuation.brace.close";
    pub const SEMICOLON: &str = "punctuation.semicolon";
    pub const COMMA: &str = "punctuation.comma";
    pub const COLON: &str = "punctuation.colon";
    pub const DOT: &str = "punctuation.dot";
    pub const HASH: &str = "punctuation.hash";
    pub const SCOPE_RESOLUTION: &str = "operator.scope_resolution";
    pub const ASSIGN_OP: &str = "operator.assign";
    pub const AT: &str = "operator.at";
    pub const EVENT_STAR: &str = "operator.event_star";
    pub const OPERATOR: &str = "operator";

    pub const BEGIN_BLOCK: &str = "begin.block";
    pub const FORK_BLOCK: &str = "fork.block";
    pub const CASE_BLOCK: &str = "case.block";
    pub const PAREN_BLOCK: &str = "parantheses.block";
    pub const BRACKET_BLOCK: &str = "brackets.block";
    pub const BRACE_BLOCK: &str = "braces.block";
}

use scopes::*;

fn keywords(words: &[&str], scope: &str) -> PatternDef {
    PatternDef::new(format!(r"(?:{})\b", words.join("|")), &[scope])
}

const CONSTRUCTS: &[&str] = &[
    "class", "covergroup", "property", "sequence", "checker", "clocking", "specify", "config",
    "primitive",
];

const END_CONSTRUCTS: &[&str] = &[
    "endclass", "endgroup", "endproperty", "endsequence", "endchecker", "endclocking",
    "endspecify", "endconfig", "endprimitive",
];

const OTHER_KEYWORDS: &[&str] = &[
    "let", "nettype", "bind", "timeunit", "timeprecision", "defparam", "default", "global",
    "alias", "extends", "implements", "with", "inside", "dist", "posedge", "negedge", "edge",
    "or", "and", "not", "iff", "new", "null", "this", "super", "type", "randomize", "matches",
    "solve", "before", "constraint", "cell", "design", "instance", "liblist", "library",
    "use", "incdir", "include", "throughout", "within", "intersect", "first_match",
];

pub(super) fn builder() -> GrammarBuilder {
    GrammarBuilder::new()
        .context(
            "Main",
            ContextDef::new(SOURCE)
                .pattern(PatternDef::new(r"\s+", &[WHITESPACE]))
                .pattern(PatternDef::new(r"//[^\r\n]*", &[LINE_COMMENT]))
                .pattern(PatternDef::new(r"/\*", &[BLOCK_COMMENT]).push("BlockComment"))
                .pattern(PatternDef::new(r"\(\*\s*\)", &[EVENT_STAR]))
                .pattern(PatternDef::new(r"\(\*", &[ATTRIBUTE]).push("Attribute"))
                .pattern(PatternDef::new(r#"""#, &[STRING]).push("String"))
                .include("Keywords")
                .pattern(PatternDef::new(
                    format!(r"({})(\s*)(::)", IDENT),
                    &["", PACKAGE_NAME, WHITESPACE, SCOPE_RESOLUTION],
                ))
                .pattern(PatternDef::new(IDENT, &[IDENTIFIER]))
                .pattern(PatternDef::new(r"\\\S+", &[IDENTIFIER]))
                .pattern(PatternDef::new(r"\$[A-Za-z0-9_$]+", &[SYSTEM_IDENTIFIER]))
                .pattern(PatternDef::new(format!("`{}", IDENT), &[MACRO]))
                .pattern(PatternDef::new(NUMBER_LITERAL, &[NUMBER]))
                .include("Punctuation"),
        )
        .context(
            "Keywords",
            ContextDef::new("")
                .pattern(keywords(&["module", "macromodule", "interface", "program"], CONTAINER))
                .pattern(keywords(
                    &["endmodule", "endinterface", "endprogram"],
                    END_CONTAINER,
                ))
                .pattern(keywords(&["package"], PACKAGE))
                .pattern(keywords(&["endpackage"], END_PACKAGE))
                .pattern(keywords(&["function", "task"], ROUTINE))
                .pattern(keywords(&["endfunction", "endtask"], END_ROUTINE))
                .pattern(keywords(&["input", "output", "inout", "ref"], DIRECTION))
                .pattern(keywords(&["parameter", "localparam", "specparam"], PARAMETER))
                .pattern(keywords(&["typedef"], TYPEDEF))
                .pattern(keywords(&["struct", "union"], STRUCT))
                .pattern(keywords(&["enum"], ENUM))
                .pattern(keywords(&["modport"], MODPORT))
                .pattern(keywords(&["import"], IMPORT))
                .pattern(keywords(&["export"], EXPORT))
                .pattern(keywords(&["genvar"], GENVAR))
                .pattern(keywords(&["generate"], GENERATE))
                .pattern(keywords(&["endgenerate"], END_GENERATE))
                .pattern(keywords(
                    &[
                        "wire", "tri0", "tri1", "triand", "trior", "trireg", "tri", "wand", "wor",
                        "supply0", "supply1", "uwire", "interconnect",
                    ],
                    NET_TYPE,
                ))
                .pattern(keywords(
                    &[
                        "logic", "bit", "reg", "byte", "shortint", "longint", "integer", "int",
                        "time", "shortreal", "realtime", "real", "string", "chandle", "event",
                        "void", "var",
                    ],
                    DATA_TYPE,
                ))
                .pattern(keywords(
                    &[
                        "signed", "unsigned", "packed", "tagged", "const", "static", "automatic",
                        "protected", "local", "randc", "rand", "virtual", "pure", "extern",
                        "vectored", "scalared",
                    ],
                    MODIFIER,
                ))
                .pattern(keywords(&["assign", "deassign", "force", "release"], ASSIGN))
                .pattern(keywords(
                    &["always_comb", "always_ff", "always_latch", "always", "initial", "final"],
                    ALWAYS,
                ))
                .pattern(keywords(
                    &["assert", "assume", "cover", "restrict", "expect"],
                    ASSERTION,
                ))
                .pattern(keywords(&["begin"], BEGIN).push_scopes(&[BEGIN_BLOCK]))
                .pattern(keywords(&["end"], END).pop_scopes(&[BEGIN_BLOCK]))
                .pattern(keywords(&["fork"], FORK).push_scopes(&[FORK_BLOCK]))
                .pattern(keywords(&["join_any", "join_none", "join"], JOIN).pop_scopes(&[FORK_BLOCK]))
                .pattern(
                    keywords(&["casex", "casez", "case", "randcase"], CASE)
                        .push_scopes(&[CASE_BLOCK]),
                )
                .pattern(keywords(&["endcase"], END_CASE).pop_scopes(&[CASE_BLOCK]))
                .pattern(keywords(
                    &[
                        "if", "else", "foreach", "for", "while", "do", "repeat", "forever",
                        "return", "break", "continue", "wait_order", "wait", "disable",
                        "unique0", "unique", "priority",
                    ],
                    CONTROL,
                ))
                .pattern(keywords(CONSTRUCTS, CONSTRUCT))
                .pattern(keywords(END_CONSTRUCTS, END_CONSTRUCT))
                .pattern(keywords(OTHER_KEYWORDS, OTHER)),
        )
        .context(
            "Punctuation",
            ContextDef::new("")
                .pattern(PatternDef::new(r"\(", &[PAREN_OPEN]).push_scopes(&[PAREN_BLOCK]))
                .pattern(PatternDef::new(r"\)", &[PAREN_CLOSE]).pop_scopes(&[PAREN_BLOCK]))
                .pattern(PatternDef::new(r"\[", &[BRACKET_OPEN]).push_scopes(&[BRACKET_BLOCK]))
                .pattern(PatternDef::new(r"\]", &[BRACKET_CLOSE]).pop_scopes(&[BRACKET_BLOCK]))
                .pattern(PatternDef::new(r"\{", &[BRACE_OPEN]).push_scopes(&[BRACE_BLOCK]))
                .pattern(PatternDef::new(r"\}", &[BRACE_CLOSE]).pop_scopes(&[BRACE_BLOCK]))
                .pattern(PatternDef::new("::", &[SCOPE_RESOLUTION]))
                .pattern(PatternDef::new(";", &[SEMICOLON]))
                .pattern(PatternDef::new(",", &[COMMA]))
                .pattern(PatternDef::new(
                    concat!(
                        r"<<<=|>>>=|===|!==|==\?|!=\?|<->|->>|\|->|\|=>|&&&|<<=|>>=|",
                        r"\+\+|--|\*\*|==|!=|<=|>=|&&|\|\||->|<<<|>>>|<<|>>|",
                        r"\+=|-=|\*=|/=|%=|&=|\|=|\^=|~&|~\||~\^|\^~|\.\*|##|@@|:=|:/|\+:|-:",
                    ),
                    &[OPERATOR],
                ))
                .pattern(PatternDef::new(":", &[COLON]))
                .pattern(PatternDef::new(r"\.", &[DOT]))
                .pattern(PatternDef::new("#", &[HASH]))
                .pattern(PatternDef::new("=", &[ASSIGN_OP]))
                .pattern(PatternDef::new("@", &[AT]))
                .pattern(PatternDef::new(r"[-+*/%!~&|^<>?']", &[OPERATOR])),
        )
        .context(
            "String",
            ContextDef::new(STRING)
                .pattern(PatternDef::new(r#"""#, &[""]).pop())
                .pattern(PatternDef::new(r"\\(?s:.)", &[ESCAPE]))
                .pattern(PatternDef::new(r#"[^"\\]+|\\"#, &[""])),
        )
        .context(
            "BlockComment",
            ContextDef::new(BLOCK_COMMENT)
                .pattern(PatternDef::new(r"\*/", &[""]).pop())
                .pattern(PatternDef::new(r"[^*]+|\*", &[""])),
        )
        .context(
            "Attribute",
            ContextDef::new(ATTRIBUTE)
                .pattern(PatternDef::new(r"\*\)", &[""]).pop())
                .pattern(PatternDef::new(r"[^*]+|\*", &[""])),
        )
}
