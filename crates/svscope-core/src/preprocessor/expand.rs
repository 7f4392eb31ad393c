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

//! Macro invocation: argument splitting, substitution, escapes and rescan.

use super::macros::{Macro, MacroToken, PreTokenKind};
use super::run::{is_directive, trim_trivia, Run, Tok};
use crate::error::SvError;
use std::collections::HashMap;
use tracing::debug;

/// Work done on behalf of one invocation in source text.
#[derive(Debug, Default)]
pub(super) struct Budget {
    expansions: usize,
    /// A limit was already reported for this invocation.
    reported: bool,
}

impl Run<'_> {
    /// Expand the macro invocation at `tokens[pos]`. Returns the expansion
    /// and the index just past the invocation and its arguments.
    pub(super) fn expand_at(
        &mut self,
        tokens: &[Tok],
        pos: usize,
        depth: usize,
        budget: &mut Budget,
    ) -> (Vec<Tok>, usize) {
        let call = &tokens[pos];
        let name = &call.text[1..];

        match name {
            "__FILE__" => {
                let text = format!("\"{}\"", call.file);
                return (vec![call.with_text(text, PreTokenKind::String)], pos + 1);
            }
            "__LINE__" => {
                let line = self
                    .sources
                    .get(&call.file)
                    .map_or(0, |index| index.position(call.start).line as usize + 1);
                return (
                    vec![call.with_text(line.to_string(), PreTokenKind::Number)],
                    pos + 1,
                );
            }
            _ => {}
        }

        let Some(definition) = self.macros.get(name).cloned() else {
            let message = if is_directive(name) {
                format!("directive `{} cannot appear in macro text", name)
            } else {
                format!("undefined macro `{}", name)
            };
            self.diagnose(
                SvError::macro_error(message)
                    .with_file(&*call.file)
                    .with_offset(call.start),
            );
            return (Vec::new(), pos + 1);
        };

        let (actuals, next) = if definition.is_function_like() {
            match split_actuals(tokens, pos + 1) {
                Some(found) => found,
                None => {
                    self.diagnose(
                        SvError::macro_error(format!("macro `{} expects arguments", name))
                            .with_file(&*call.file)
                            .with_offset(call.start),
                    );
                    return (Vec::new(), pos + 1);
                }
            }
        } else {
            (Vec::new(), pos + 1)
        };

        let limits = &self.options.limits;
        let exceeded = if depth >= limits.max_macro_depth {
            Some(format!(
                "macro `{} nests deeper than {} expansions",
                name, limits.max_macro_depth
            ))
        } else if budget.expansions >= limits.max_macro_expansions {
            Some(format!(
                "macro `{} needs more than {} expansions",
                name, limits.max_macro_expansions
            ))
        } else {
            None
        };
        if let Some(message) = exceeded {
            if !budget.reported {
                budget.reported = true;
                self.diagnose(
                    SvError::limit(message)
                        .with_file(&*call.file)
                        .with_offset(call.start),
                );
            }
            return (Vec::new(), next);
        }
        budget.expansions += 1;

        let Some(body) = self.substitute(&definition, actuals, call, depth, budget) else {
            return (Vec::new(), next);
        };
        let body = apply_escapes(body);
        debug!(name = %definition.name, depth, tokens = body.len(), "expand");
        (self.expand_tokens(body, depth + 1, budget), next)
    }

    /// Expand every invocation in `tokens`.
    ///
    /// Conditional directives carried in a macro body are evaluated against
    /// the macro table at the point of expansion; only the taken branch is
    /// kept.
    fn expand_tokens(&mut self, tokens: Vec<Tok>, depth: usize, budget: &mut Budget) -> Vec<Tok> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut branches = BranchStack::default();
        let mut pos = 0;
        while pos < tokens.len() {
            match tokens[pos].kind {
                PreTokenKind::Conditional => pos = self.body_conditional(&tokens, pos, &mut branches),
                _ if !branches.active() => pos += 1,
                PreTokenKind::Macro => {
                    let (expanded, next) = self.expand_at(&tokens, pos, depth, budget);
                    out.extend(expanded);
                    pos = next;
                }
                _ => {
                    out.push(tokens[pos].clone());
                    pos += 1;
                }
            }
        }
        if let Some(open) = branches.unterminated() {
            self.diagnose(
                SvError::macro_error("unterminated conditional in macro body")
                    .with_file(&*open.file)
                    .with_offset(open.start),
            );
        }
        out
    }

    /// Apply the conditional directive at `tokens[pos]`. Returns the index
    /// past the directive and its operand.
    fn body_conditional(&mut self, tokens: &[Tok], pos: usize, branches: &mut BranchStack) -> usize {
        let directive = &tokens[pos];
        let mut next = pos + 1;
        let mut operand = || {
            while tokens.get(next).is_some_and(|t| t.kind.is_trivia()) {
                next += 1;
            }
            match tokens.get(next) {
                Some(t) if t.kind == PreTokenKind::Identifier => {
                    next += 1;
                    Some(t.text.clone())
                }
                _ => None,
            }
        };

        let stray = match &directive.text[1..] {
            "ifdef" | "ifndef" => {
                let defined = operand().is_some_and(|name| self.macros.contains(&name));
                branches.open(directive.clone(), defined == (directive.text == "`ifdef"));
                false
            }
            "elsif" => {
                let defined = operand().is_some_and(|name| self.macros.contains(&name));
                !branches.elsif(defined)
            }
            "else" => !branches.otherwise(),
            _ => !branches.close(),
        };
        if stray {
            self.diagnose(
                SvError::macro_error(format!(
                    "{} without matching `ifdef in macro body",
                    directive.text
                ))
                .with_file(&*directive.file)
                .with_offset(directive.start),
            );
        }
        debug!(directive = %directive.text, active = branches.active(), "macro body conditional");
        next
    }

    /// Replace formal parameters in the body. `None` if the invocation
    /// passes more arguments than the macro takes.
    fn substitute(
        &mut self,
        definition: &Macro,
        mut actuals: Vec<Vec<Tok>>,
        call: &Tok,
        depth: usize,
        budget: &mut Budget,
    ) -> Option<Vec<Tok>> {
        let params = definition.params.as_deref().unwrap_or(&[]);
        // `FOO()` passes one empty argument to a macro with none.
        if params.is_empty() && actuals.len() == 1 && actuals[0].is_empty() {
            actuals.clear();
        }
        if actuals.len() > params.len() {
            self.diagnose(
                SvError::macro_error(format!(
                    "macro `{} takes {} argument(s), {} given",
                    definition.name,
                    params.len(),
                    actuals.len()
                ))
                .with_file(&*call.file)
                .with_offset(call.start),
            );
            return None;
        }

        let given = actuals.len();
        let mut values: HashMap<&str, Vec<Tok>> = HashMap::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let actual = actuals.get_mut(i).map(std::mem::take).unwrap_or_default();
            let value = if !actual.is_empty() {
                self.expand_tokens(actual, depth + 1, budget)
            } else if let Some(default) = &param.default {
                default
                    .iter()
                    .map(|t| body_token(definition, t, call))
                    .collect()
            } else {
                if i >= given {
                    self.diagnose(
                        SvError::macro_error(format!(
                            "missing argument `{}` of macro `{}",
                            param.name, definition.name
                        ))
                        .with_file(&*call.file)
                        .with_offset(call.start),
                    );
                }
                Vec::new()
            };
            values.insert(param.name.as_str(), value);
        }

        let mut out = Vec::with_capacity(definition.body.len());
        for token in &definition.body {
            match values.get(token.text.as_str()) {
                Some(value) if token.kind == PreTokenKind::Identifier => {
                    out.extend(value.iter().cloned())
                }
                _ => out.push(body_token(definition, token, call)),
            }
        }
        Some(out)
    }
}

/// `ifdef nesting inside one expansion.
#[derive(Debug, Default)]
struct BranchStack {
    /// Opening directive, whether some branch was taken, whether the
    /// current branch is taken.
    frames: Vec<(Tok, bool, bool)>,
}

impl BranchStack {
    fn active(&self) -> bool {
        self.frames.iter().all(|&(_, _, current)| current)
    }

    fn open(&mut self, directive: Tok, taken: bool) {
        self.frames.push((directive, taken, taken));
    }

    /// Returns false for an `elsif` with no open conditional.
    fn elsif(&mut self, defined: bool) -> bool {
        let Some((_, any, current)) = self.frames.last_mut() else {
            return false;
        };
        *current = !*any && defined;
        *any |= *current;
        true
    }

    fn otherwise(&mut self) -> bool {
        let Some((_, any, current)) = self.frames.last_mut() else {
            return false;
        };
        *current = !*any;
        *any = true;
        true
    }

    fn close(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    fn unterminated(&self) -> Option<&Tok> {
        self.frames.first().map(|(directive, _, _)| directive)
    }
}

/// A body token placed at its definition site, or at the invocation for
/// macros without an origin file.
fn body_token(definition: &Macro, token: &MacroToken, call: &Tok) -> Tok {
    match &definition.origin {
        Some(origin) => Tok {
            text: token.text.clone(),
            kind: token.kind,
            start: token.start,
            end: token.end,
            file: origin.clone(),
        },
        None => call.with_text(token.text.clone(), token.kind),
    }
}

/// Split `( a, b, ... )` starting at or after `start` into trimmed actual
/// arguments. `None` if no argument list follows.
fn split_actuals(tokens: &[Tok], start: usize) -> Option<(Vec<Vec<Tok>>, usize)> {
    let mut pos = start;
    while tokens.get(pos).map_or(false, |t| t.kind.is_trivia()) {
        pos += 1;
    }
    if tokens.get(pos).map(|t| t.text.as_str()) != Some("(") {
        return None;
    }
    pos += 1;

    let mut depth = 1usize;
    let mut actuals = Vec::new();
    let mut current = Vec::new();
    while let Some(token) = tokens.get(pos) {
        pos += 1;
        match token.kind {
            PreTokenKind::Open => depth += 1,
            PreTokenKind::Close => {
                depth -= 1;
                if depth == 0 {
                    trim_trivia(&mut current, |t: &Tok| t.kind);
                    actuals.push(current);
                    return Some((actuals, pos));
                }
            }
            PreTokenKind::Comma if depth == 1 => {
                trim_trivia(&mut current, |t: &Tok| t.kind);
                actuals.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(token.clone());
    }
    None
}

/// Resolve the two-character escapes of a substituted body.
fn apply_escapes(tokens: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match token.kind {
            PreTokenKind::Quote => out.push(token.with_text("\"".into(), PreTokenKind::Operator)),
            PreTokenKind::EscapedQuote => {
                out.push(token.with_text("\\\"".into(), PreTokenKind::Operator))
            }
            PreTokenKind::LineContinuation => {
                out.push(token.with_text(" ".into(), PreTokenKind::Whitespace))
            }
            PreTokenKind::Concat => match (out.pop(), iter.next()) {
                (Some(prev), Some(next)) => out.push(splice(prev, next)),
                (Some(only), None) | (None, Some(only)) => out.push(only),
                (None, None) => {}
            },
            _ => out.push(token),
        }
    }
    out
}

/// Join two tokens around a ``` `` ```.
fn splice(prev: Tok, next: Tok) -> Tok {
    let text = format!("{}{}", prev.text, next.text);
    let kind = if text.starts_with('`') {
        PreTokenKind::Macro
    } else {
        PreTokenKind::Identifier
    };
    let end = if next.file == prev.file && next.end >= prev.start {
        next.end
    } else {
        prev.end
    };
    Tok {
        text,
        kind,
        start: prev.start,
        end,
        file: prev.file,
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SvErrorKind;
    use crate::options::ParseOptions;
    use crate::preprocessor::{IncludeCache, PreprocOutput, Run};
    use crate::source::InMemoryProvider;

    fn run_with(options: &ParseOptions, text: &str) -> PreprocOutput {
        let mut cache = IncludeCache::new();
        let provider = InMemoryProvider::new();
        Run::new(&mut cache, &provider, options).preprocess("/rtl/top.sv", text)
    }

    fn run(text: &str) -> PreprocOutput {
        run_with(&ParseOptions::default(), text)
    }

    /// The last line of the preprocessed text.
    fn last_line(out: &PreprocOutput) -> String {
        let text = out.text();
        text.trim_end().rsplit('\n').next().unwrap_or("").to_string()
    }

    // ==================== object-like tests ====================

    #[test]
    fn test_object_like_substitution() {
        let out = run("`define N 4\nx = `N;");
        assert_eq!(last_line(&out), "x = 4;");
    }

    #[test]
    fn test_nested_invocation_is_rescanned() {
        let out = run("`define A `B + 1\n`define B 2\nx = `A;");
        assert_eq!(last_line(&out), "x = 2 + 1;");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_undefined_macro_is_dropped() {
        let out = run("x = `NOPE;");
        assert_eq!(out.text(), "x = ;");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, SvErrorKind::Macro);
    }

    #[test]
    fn test_self_recursion_hits_depth_limit() {
        let options = ParseOptions::builder().max_macro_depth(8).build();
        let out = run_with(&options, "`define LOOP `LOOP x\ny = `LOOP;");
        assert_eq!(
            out.diagnostics
                .iter()
                .filter(|d| d.kind == SvErrorKind::Limit)
                .count(),
            1
        );
        assert!(last_line(&out).starts_with("y = "));
    }

    #[test]
    fn test_expansion_budget() {
        let options = ParseOptions::builder().max_macro_expansions(3).build();
        let text = "`define A x\n`define B `A `A `A `A `A\ny = `B;";
        let out = run_with(&options, text);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, SvErrorKind::Limit);
    }

    // ==================== function-like tests ====================

    #[test]
    fn test_function_like_substitution() {
        let out = run("`define ADD(a, b) (a + b)\nx = `ADD(1, 2);");
        assert_eq!(last_line(&out), "x = (1 + 2);");
    }

    #[test]
    fn test_nested_brackets_protect_commas() {
        let out = run("`define FIRST(a, b) a\nx = `FIRST({1, 2}, f(3, 4));");
        assert_eq!(last_line(&out), "x = {1, 2};");
    }

    #[test]
    fn test_actuals_are_trimmed() {
        let out = run("`define W(a) [a]\nx = `W(  y  /* c */ );");
        assert_eq!(last_line(&out), "x = [y];");
    }

    #[test]
    fn test_empty_actual_uses_default() {
        let out = run("`define D(a, b=7) a+b\nx = `D(1, );\ny = `D(1,  \t );");
        let text = out.text();
        assert!(text.contains("x = 1+7;"), "{}", text);
        assert!(text.contains("y = 1+7;"), "{}", text);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_omitted_actual_uses_default() {
        let out = run("`define D(a, b=7) a+b\nx = `D(1);");
        assert_eq!(last_line(&out), "x = 1+7;");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_actual_without_default() {
        let out = run("`define D(a, b) a+b\nx = `D(1);");
        assert_eq!(last_line(&out), "x = 1+;");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_actual_without_default_is_silent() {
        let out = run("`define D(a, b) a+b\nx = `D(1, );");
        assert_eq!(last_line(&out), "x = 1+;");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_too_many_actuals() {
        let out = run("`define ONE(a) a\nx = `ONE(1, 2);");
        assert_eq!(last_line(&out), "x = ;");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_parens_for_zero_params() {
        let out = run("`define Z() zero\nx = `Z();");
        assert_eq!(last_line(&out), "x = zero;");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_argument_list() {
        let out = run("`define F(a) a\nx = `F;");
        assert_eq!(last_line(&out), "x = ;");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_actual_is_expanded() {
        let out = run("`define N 3\n`define ID(a) a\nx = `ID(`N);");
        assert_eq!(last_line(&out), "x = 3;");
    }

    // ==================== escape tests ====================

    #[test]
    fn test_stringify_escape() {
        let out = run("`define STR(x) `\"x`\"\ns = `STR(hello);");
        assert_eq!(last_line(&out), "s = \"hello\";");
    }

    #[test]
    fn test_escaped_quote() {
        let out = run("`define Q `\\`\"\ns = `Q;");
        assert_eq!(last_line(&out), "s = \\\";");
    }

    #[test]
    fn test_token_concatenation() {
        let out = run("`define CAT(a, b) a``b\nwire `CAT(data, _in);");
        assert_eq!(last_line(&out), "wire data_in;");
    }

    #[test]
    fn test_concatenation_forms_invocation() {
        let out = run("`define FOO_1 one\n`define SEL(n) `FOO_``n\nx = `SEL(1);");
        assert_eq!(last_line(&out), "x = one;");
    }

    #[test]
    fn test_continuation_becomes_space() {
        let out = run("`define TWO a \\\n b\nx = `TWO;");
        assert_eq!(last_line(&out), "x = a   b;");
    }

    // ==================== body conditional tests ====================

    #[test]
    fn test_body_conditional_takes_defined_branch() {
        let out = run("`define A\n`define SEL `ifdef A one `else two `endif\nx = `SEL;");
        let line = last_line(&out);
        assert!(line.contains("one"), "{line}");
        assert!(!line.contains("two"), "{line}");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_body_conditional_follows_table_at_expansion() {
        let out = run("`define SEL `ifdef A one `elsif B two `else three `endif\n`define B\nx = `SEL;");
        let line = last_line(&out);
        assert!(line.contains("two"), "{line}");
        assert!(!line.contains("one") && !line.contains("three"), "{line}");
    }

    #[test]
    fn test_body_conditional_skips_nested_invocation() {
        let out = run("`define SEL `ifdef A `NOPE `endif ok\nx = `SEL;");
        assert!(last_line(&out).contains("ok"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_body_conditional_is_reported() {
        let out = run("`define SEL `ifdef A one\nx = `SEL;");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, SvErrorKind::Macro);
    }

    // ==================== builtin tests ====================

    #[test]
    fn test_file_and_line() {
        let out = run("\n\nf = `__FILE__; l = `__LINE__;");
        assert_eq!(last_line(&out), "f = \"/rtl/top.sv\"; l = 3;");
    }

    // ==================== attribution tests ====================

    #[test]
    fn test_expansion_points_at_definition() {
        let out = run("`define T logic\n`T x;");
        let logic = out.post_tokens.iter().find(|t| t.text == "logic").unwrap();
        assert_eq!((logic.start, logic.end), (10, 15));
    }

    #[test]
    fn test_user_define_points_at_invocation() {
        let options = ParseOptions::builder().define("T=logic").build();
        let out = run_with(&options, "`T x;");
        let logic = out.post_tokens.iter().find(|t| t.text == "logic").unwrap();
        assert_eq!((logic.start, logic.end), (0, 2));
    }
}
