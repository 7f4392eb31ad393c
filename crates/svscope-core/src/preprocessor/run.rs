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

//! Directive processing: `` `define``, conditionals, `` `include`` and the
//! pass-through directives.

use super::cache::{IncludeCache, PreprocIncInfo};
use super::expand::Budget;
use super::macros::{
    Macro, MacroChange, MacroChangeLog, MacroParam, MacroTable, MacroToken, PreTokenKind,
};
use super::{Emitter, PreprocOutput};
use crate::error::{SvError, SvErrorKind};
use crate::grammars;
use crate::options::ParseOptions;
use crate::position::LineIndex;
use crate::source::{normalize_path, SourceProvider};
use crate::symbols::{Definition, Location, Symbol, SymbolKind};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Directives other than conditionals. A macro cannot use these names.
const DIRECTIVES: &[&str] = &[
    "define",
    "undef",
    "undefineall",
    "include",
    "resetall",
    "celldefine",
    "endcelldefine",
    "nounconnected_drive",
    "end_keywords",
    "timescale",
    "pragma",
    "line",
    "begin_keywords",
    "default_nettype",
    "unconnected_drive",
];

pub(super) fn is_directive(name: &str) -> bool {
    DIRECTIVES.contains(&name)
}

/// A preprocessor token tagged with the file its offsets refer to.
#[derive(Debug, Clone)]
pub(super) struct Tok {
    pub(super) text: String,
    pub(super) kind: PreTokenKind,
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) file: Arc<str>,
}

impl Tok {
    pub(super) fn with_text(&self, text: String, kind: PreTokenKind) -> Tok {
        Tok {
            text,
            kind,
            start: self.start,
            end: self.end,
            file: self.file.clone(),
        }
    }

    fn to_macro_token(&self) -> MacroToken {
        MacroToken {
            text: self.text.clone(),
            kind: self.kind,
            start: self.start,
            end: self.end,
        }
    }
}

fn lex(file: &Arc<str>, text: &str) -> Vec<Tok> {
    grammars::preprocessor()
        .tokenize(text, None)
        .into_iter()
        .map(|token| {
            let kind = PreTokenKind::classify(&token);
            let start = token.offset;
            let end = token.end();
            Tok {
                text: token.text,
                kind,
                start,
                end,
                file: file.clone(),
            }
        })
        .collect()
}

/// Drop trivia from both ends of a token list.
pub(super) fn trim_trivia<T>(tokens: &mut Vec<T>, kind: impl Fn(&T) -> PreTokenKind) {
    while tokens.last().map_or(false, |t| kind(t).is_trivia()) {
        tokens.pop();
    }
    let leading = tokens.iter().take_while(|t| kind(t).is_trivia()).count();
    tokens.drain(..leading);
}

/// Per-file scan state.
struct FileState {
    file: Arc<str>,
    index: LineIndex,
    tokens: Vec<Tok>,
    pos: usize,
    out: Emitter,
    log: MacroChangeLog,
    symbols: Vec<Symbol>,
    includes: Vec<String>,
    sources: BTreeMap<Arc<str>, LineIndex>,
    /// One entry per open conditional: whether a branch has been taken.
    conditions: Vec<bool>,
    depth: usize,
}

impl FileState {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<PreTokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Skip whitespace and comments that do not end the line.
    fn skip_inline(&mut self) {
        while matches!(
            self.peek_kind(),
            Some(
                PreTokenKind::Whitespace
                    | PreTokenKind::BlockComment
                    | PreTokenKind::LineContinuation
            )
        ) {
            self.pos += 1;
        }
    }

    /// Stop before the newline or line comment that ends the line.
    fn skip_to_line_end(&mut self) {
        while !matches!(
            self.peek_kind(),
            None | Some(PreTokenKind::Newline | PreTokenKind::LineComment)
        ) {
            self.pos += 1;
        }
    }

    /// The identifier operand of a directive, if present.
    fn operand(&mut self) -> Option<String> {
        self.skip_inline();
        let token = self.peek()?;
        if token.kind != PreTokenKind::Identifier {
            return None;
        }
        let name = token.text.clone();
        self.pos += 1;
        Some(name)
    }

    /// Skip an inactive conditional branch, stopping at the `` `elsif``,
    /// `` `else`` or `` `endif`` that belongs to it.
    fn skip_branch(&mut self) {
        let mut nested = 0usize;
        while let Some(token) = self.peek() {
            if token.kind == PreTokenKind::Conditional {
                match &token.text[1..] {
                    "ifdef" | "ifndef" => nested += 1,
                    "endif" if nested == 0 => return,
                    "endif" => nested -= 1,
                    "elsif" | "else" if nested == 0 => return,
                    _ => {}
                }
            }
            self.pos += 1;
        }
    }

    fn take_branch(&mut self) {
        if let Some(taken) = self.conditions.last_mut() {
            *taken = true;
        }
    }

    fn splice(&mut self, path: &Path, info: &PreprocIncInfo) {
        self.out.append(&info.post_tokens, &info.token_order);
        self.log.extend(&info.macro_log);
        let name = path.to_string_lossy().into_owned();
        for include in std::iter::once(&name).chain(info.includes.iter()) {
            if !self.includes.contains(include) {
                self.includes.push(include.clone());
            }
        }
        for (file, index) in &info.sources {
            self.sources
                .entry(file.clone())
                .or_insert_with(|| index.clone());
        }
    }

    fn into_info(mut self) -> PreprocIncInfo {
        self.sources.insert(self.file.clone(), self.index);
        let (post_tokens, token_order) = self.out.finish();
        PreprocIncInfo {
            symbols: self.symbols,
            post_tokens,
            token_order,
            includes: self.includes,
            macro_log: self.log,
            sources: self.sources,
        }
    }
}

/// One top-level preprocessing run: the macro table and diagnostics of a
/// document and everything it includes.
pub(crate) struct Run<'a> {
    cache: &'a mut IncludeCache,
    provider: &'a dyn SourceProvider,
    pub(super) options: &'a ParseOptions,
    pub(super) macros: MacroTable,
    /// Line indexes of every file scanned or replayed in this run.
    pub(super) sources: BTreeMap<Arc<str>, LineIndex>,
    diagnostics: Vec<SvError>,
    in_progress: HashSet<PathBuf>,
}

impl<'a> Run<'a> {
    /// Start a run with the user defines of `options` in the macro table.
    pub(crate) fn new(
        cache: &'a mut IncludeCache,
        provider: &'a dyn SourceProvider,
        options: &'a ParseOptions,
    ) -> Self {
        let mut macros = MacroTable::new();
        let command_line: Arc<str> = Arc::from("<command line>");
        for define in &options.defines {
            let mut body = lex(&command_line, &define.value);
            trim_trivia(&mut body, |t| t.kind);
            let body = body.iter().map(Tok::to_macro_token).collect();
            macros.define(Macro::user(define.name.clone(), body));
        }
        Self {
            cache,
            provider,
            options,
            macros,
            sources: BTreeMap::new(),
            diagnostics: Vec::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Preprocess `text` as the document `file`.
    pub(crate) fn preprocess(mut self, file: &str, text: &str) -> PreprocOutput {
        let file: Arc<str> = Arc::from(file);
        let max_file_size = self.options.limits.max_file_size;
        if text.len() > max_file_size {
            self.diagnose(
                SvError::limit(format!(
                    "file is {} bytes, limit is {}",
                    text.len(),
                    max_file_size
                ))
                .with_file(&*file),
            );
            let mut output = PreprocOutput::empty(file);
            output.macros = self.macros;
            output.diagnostics = self.diagnostics;
            return output;
        }

        let path = normalize_path(Path::new(&*file));
        self.in_progress.insert(path.clone());
        let info = self.process(file.clone(), text, 0);
        self.in_progress.remove(&path);

        debug!(
            file = %file,
            tokens = info.post_tokens.len(),
            includes = info.includes.len(),
            "preprocessed"
        );
        PreprocOutput {
            file,
            symbols: info.symbols,
            post_tokens: info.post_tokens,
            token_order: info.token_order,
            includes: info.includes,
            macros: self.macros,
            sources: self.sources,
            diagnostics: self.diagnostics,
        }
    }

    pub(super) fn diagnose(&mut self, diagnostic: SvError) {
        match diagnostic.kind {
            SvErrorKind::Grammar | SvErrorKind::IncludeCycle => error!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    fn process(&mut self, file: Arc<str>, text: &str, depth: usize) -> PreprocIncInfo {
        let index = LineIndex::new(text);
        self.sources.insert(file.clone(), index.clone());
        let tokens = lex(&file, text);
        if tokens.is_empty() && !text.is_empty() {
            self.diagnose(
                SvError::grammar("preprocessor grammar produced no tokens").with_file(&*file),
            );
        }

        let mut st = FileState {
            file,
            index,
            tokens,
            pos: 0,
            out: Emitter::default(),
            log: MacroChangeLog::new(),
            symbols: Vec::new(),
            includes: Vec::new(),
            sources: BTreeMap::new(),
            conditions: Vec::new(),
            depth,
        };
        self.scan(&mut st);
        st.into_info()
    }

    fn scan(&mut self, st: &mut FileState) {
        while let Some(kind) = st.peek_kind() {
            match kind {
                PreTokenKind::Conditional => self.conditional(st),
                PreTokenKind::Macro => self.directive(st),
                _ => {
                    let token = &st.tokens[st.pos];
                    let text = token.text.clone();
                    let (start, end) = (token.start, token.end);
                    st.out.push(&st.file, text, start, end);
                    st.pos += 1;
                }
            }
        }
        if !st.conditions.is_empty() {
            self.diagnose(
                SvError::macro_error(format!(
                    "{} conditional block(s) missing `endif",
                    st.conditions.len()
                ))
                .with_file(&*st.file),
            );
        }
    }

    fn directive(&mut self, st: &mut FileState) {
        let token = &st.tokens[st.pos];
        let name = token.text[1..].to_string();
        let at = token.start;
        match name.as_str() {
            "define" => self.define(st),
            "undef" => {
                st.pos += 1;
                match st.operand() {
                    Some(name) => {
                        self.macros.undef(&name);
                        st.log.push(MacroChange::Delete(name));
                    }
                    None => self.diagnose(
                        SvError::macro_error("`undef without a macro name")
                            .with_file(&*st.file)
                            .with_offset(at),
                    ),
                }
            }
            "undefineall" => {
                st.pos += 1;
                self.macros.clear();
                st.log.push(MacroChange::DeleteAll);
            }
            "include" => self.include_directive(st),
            "resetall" | "celldefine" | "endcelldefine" | "nounconnected_drive"
            | "end_keywords" => st.pos += 1,
            "timescale" | "pragma" | "line" => {
                st.pos += 1;
                st.skip_to_line_end();
            }
            "begin_keywords" => {
                st.pos += 1;
                st.skip_inline();
                if st.peek_kind() == Some(PreTokenKind::String) {
                    st.pos += 1;
                }
            }
            "default_nettype" | "unconnected_drive" => {
                st.pos += 1;
                st.operand();
            }
            _ => self.invocation(st),
        }
    }

    fn invocation(&mut self, st: &mut FileState) {
        let mut budget = Budget::default();
        let (expanded, next) = self.expand_at(&st.tokens, st.pos, 0, &mut budget);
        st.pos = next;
        st.out.split();
        for token in expanded {
            st.out.push(&token.file, token.text, token.start, token.end);
        }
        st.out.split();
    }

    fn define(&mut self, st: &mut FileState) {
        let start = st.tokens[st.pos].start;
        st.pos += 1;
        st.skip_inline();
        let name = match st.peek() {
            Some(token) if token.kind == PreTokenKind::Identifier => token.clone(),
            _ => {
                self.diagnose(
                    SvError::macro_error("`define without a macro name")
                        .with_file(&*st.file)
                        .with_offset(start),
                );
                st.skip_to_line_end();
                return;
            }
        };
        st.pos += 1;

        // A parameter list must follow the name with no space in between.
        let params = match st.peek() {
            Some(token) if token.text == "(" => Some(self.define_params(st)),
            _ => None,
        };
        let mut end = st.tokens[st.pos - 1].end;

        let mut body = Vec::new();
        while let Some(token) = st.peek() {
            match token.kind {
                PreTokenKind::Newline | PreTokenKind::LineComment => break,
                PreTokenKind::BlockComment => {}
                _ => body.push(token.to_macro_token()),
            }
            st.pos += 1;
        }
        trim_trivia(&mut body, |t| t.kind);
        if let Some(last) = body.last() {
            end = end.max(last.end);
        }

        let definition = Macro {
            name: name.text.clone(),
            params,
            body,
            origin: Some(st.file.clone()),
            span: (start, end),
            name_span: (name.start, name.end),
        };
        let symbol = Symbol::new(
            name.text.clone(),
            SymbolKind::Macro {
                replacement: definition.replacement(),
            },
        )
        .with_definition(Definition::Single(st.index.range(start, end)))
        .with_declaration(Location::local(st.index.range(name.start, name.end)));
        match st.symbols.iter_mut().find(|s| s.same_key(&symbol)) {
            Some(existing) => *existing = symbol,
            None => st.symbols.push(symbol),
        }

        debug!(name = %definition.name, function_like = definition.is_function_like(), "define");
        if self.macros.define(definition.clone()).is_some() {
            st.log.push(MacroChange::Delete(definition.name.clone()));
        }
        st.log.push(MacroChange::Add(definition));
    }

    /// Parse `(a, b = default, ...)` after a macro name.
    fn define_params(&mut self, st: &mut FileState) -> Vec<MacroParam> {
        st.pos += 1;
        let mut params = Vec::new();
        while let Some(token) = st.peek() {
            match token.kind {
                PreTokenKind::Whitespace
                | PreTokenKind::BlockComment
                | PreTokenKind::LineContinuation
                | PreTokenKind::Comma => st.pos += 1,
                PreTokenKind::Close => {
                    st.pos += 1;
                    break;
                }
                PreTokenKind::Newline | PreTokenKind::LineComment => break,
                PreTokenKind::Identifier => {
                    let name = token.text.clone();
                    st.pos += 1;
                    st.skip_inline();
                    let has_default = st.peek().map_or(false, |t| t.text.starts_with('='));
                    let default = has_default.then(|| param_default(st));
                    params.push(MacroParam { name, default });
                }
                _ => {
                    let diagnostic = SvError::macro_error(format!(
                        "unexpected `{}` in macro parameter list",
                        token.text
                    ))
                    .with_file(&*st.file)
                    .with_offset(token.start);
                    self.diagnose(diagnostic);
                    st.pos += 1;
                }
            }
        }
        params
    }

    fn conditional(&mut self, st: &mut FileState) {
        let token = st.tokens[st.pos].clone();
        st.pos += 1;
        match &token.text[1..] {
            "ifdef" | "ifndef" => {
                let defined = self.operand_defined(st, &token);
                let taken = if token.text == "`ifdef" {
                    defined
                } else {
                    !defined
                };
                st.conditions.push(taken);
                if !taken {
                    st.skip_branch();
                }
            }
            "elsif" => {
                let defined = self.operand_defined(st, &token);
                match st.conditions.last().copied() {
                    None => self.stray(st, &token),
                    Some(false) if defined => st.take_branch(),
                    Some(_) => st.skip_branch(),
                }
            }
            "else" => match st.conditions.last().copied() {
                None => self.stray(st, &token),
                Some(true) => st.skip_branch(),
                Some(false) => st.take_branch(),
            },
            _ => {
                if st.conditions.pop().is_none() {
                    self.stray(st, &token);
                }
            }
        }
    }

    fn operand_defined(&mut self, st: &mut FileState, directive: &Tok) -> bool {
        match st.operand() {
            Some(name) => self.macros.contains(&name),
            None => {
                self.diagnose(
                    SvError::macro_error(format!("{} without a macro name", directive.text))
                        .with_file(&*st.file)
                        .with_offset(directive.start),
                );
                false
            }
        }
    }

    fn stray(&mut self, st: &FileState, directive: &Tok) {
        self.diagnose(
            SvError::macro_error(format!("{} without matching `ifdef", directive.text))
                .with_file(&*st.file)
                .with_offset(directive.start),
        );
    }

    fn include_directive(&mut self, st: &mut FileState) {
        let at = st.tokens[st.pos].start;
        st.pos += 1;
        st.skip_inline();
        let (kind, angle) = match st.peek() {
            Some(token) => (Some(token.kind), token.text.starts_with('<')),
            None => (None, false),
        };
        let spec = match kind {
            Some(PreTokenKind::String) => {
                let spec = unquote(&st.tokens[st.pos].text).to_string();
                st.pos += 1;
                Some(spec)
            }
            Some(_) if angle => angle_spec(st),
            Some(PreTokenKind::Macro) => {
                let mut budget = Budget::default();
                let (expanded, next) = self.expand_at(&st.tokens, st.pos, 0, &mut budget);
                st.pos = next;
                let text: String = expanded
                    .iter()
                    .filter(|t| !t.kind.is_trivia())
                    .map(|t| t.text.as_str())
                    .collect();
                if text.starts_with('"') {
                    Some(unquote(&text).to_string())
                } else {
                    text.strip_prefix('<')
                        .and_then(|s| s.strip_suffix('>'))
                        .map(str::to_string)
                }
            }
            _ => None,
        };
        match spec {
            Some(spec) => self.include(st, &spec, at),
            None => {
                self.diagnose(
                    SvError::include("malformed `include directive")
                        .with_file(&*st.file)
                        .with_offset(at),
                );
                st.skip_to_line_end();
            }
        }
    }

    fn include(&mut self, st: &mut FileState, spec: &str, at: usize) {
        let max_depth = self.options.limits.max_include_depth;
        if st.depth >= max_depth {
            let diagnostic = SvError::limit(format!(
                "include depth limit of {} reached at \"{}\"",
                max_depth, spec
            ));
            self.diagnose(diagnostic.with_file(&*st.file).with_offset(at));
            return;
        }

        let path = match self.cache.resolved(spec) {
            Some(path) => path.to_path_buf(),
            None => match self.resolve(spec, &st.file) {
                Some(path) => {
                    self.cache.remember(spec, path.clone());
                    path
                }
                None => {
                    self.diagnose(
                        SvError::include(format!("cannot resolve include \"{}\"", spec))
                            .with_file(&*st.file)
                            .with_offset(at),
                    );
                    return;
                }
            },
        };

        if self.in_progress.contains(&path) {
            self.diagnose(
                SvError::include_cycle(format!("{} includes itself", path.display()))
                    .with_file(&*st.file)
                    .with_offset(at),
            );
            return;
        }

        let info = match self.cache.get(&path) {
            Some(info) => {
                debug!(path = %path.display(), "include cache hit");
                info.macro_log.replay(&mut self.macros);
                for (file, index) in &info.sources {
                    self.sources
                        .entry(file.clone())
                        .or_insert_with(|| index.clone());
                }
                info
            }
            None => {
                let text = match self.provider.read_source(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        self.diagnose(
                            SvError::io(format!("cannot read {}: {}", path.display(), e))
                                .with_file(&*st.file)
                                .with_offset(at),
                        );
                        return;
                    }
                };
                let max_file_size = self.options.limits.max_file_size;
                if text.len() > max_file_size {
                    self.diagnose(
                        SvError::limit(format!(
                            "{} is {} bytes, limit is {}",
                            path.display(),
                            text.len(),
                            max_file_size
                        ))
                        .with_file(&*st.file)
                        .with_offset(at),
                    );
                    return;
                }

                debug!(path = %path.display(), depth = st.depth + 1, "include");
                let file: Arc<str> = Arc::from(path.to_string_lossy().as_ref());
                self.in_progress.insert(path.clone());
                let info = Arc::new(self.process(file, &text, st.depth + 1));
                self.in_progress.remove(&path);
                self.cache.insert(path.clone(), info.clone());
                info
            }
        };
        st.splice(&path, &info);
    }

    /// Find the file an include spec names: next to the including file
    /// first, then along the include paths, then anywhere the provider
    /// knows of a file ending in the spec.
    fn resolve(&self, spec: &str, including: &str) -> Option<PathBuf> {
        let spec_path = Path::new(spec);
        if spec_path.is_absolute() {
            let path = normalize_path(spec_path);
            return self.provider.exists(&path).then_some(path);
        }
        if let Some(dir) = Path::new(including).parent() {
            let candidate = normalize_path(&dir.join(spec_path));
            if self.provider.exists(&candidate) {
                return Some(candidate);
            }
        }
        for base in &self.options.include_paths {
            if base.ends_with(spec_path) && self.provider.exists(base) {
                return Some(normalize_path(base));
            }
            let candidate = normalize_path(&base.join(spec_path));
            if self.provider.exists(&candidate) {
                return Some(candidate);
            }
        }
        self.provider.files_with_suffix(spec_path).into_iter().next()
    }
}

/// Tokens of a parameter default, starting at the `=`.
fn param_default(st: &mut FileState) -> Vec<MacroToken> {
    let mut tokens = Vec::new();
    let first = &st.tokens[st.pos];
    // The operator rule may have glued `=` to what follows, as in `=-1`.
    if first.text.len() > 1 {
        tokens.push(MacroToken {
            text: first.text[1..].to_string(),
            kind: PreTokenKind::Operator,
            start: first.start + 1,
            end: first.end,
        });
    }
    st.pos += 1;

    let mut depth = 0usize;
    while let Some(token) = st.peek() {
        match token.kind {
            PreTokenKind::Newline | PreTokenKind::LineComment => break,
            PreTokenKind::Comma | PreTokenKind::Close if depth == 0 => break,
            PreTokenKind::Open => depth += 1,
            PreTokenKind::Close => depth -= 1,
            _ => {}
        }
        if token.kind != PreTokenKind::BlockComment {
            tokens.push(token.to_macro_token());
        }
        st.pos += 1;
    }
    trim_trivia(&mut tokens, |t| t.kind);
    tokens
}

/// Collect `<path>` of an angle-bracket include.
fn angle_spec(st: &mut FileState) -> Option<String> {
    let mut spec = String::new();
    while let Some(token) = st.peek() {
        if matches!(token.kind, PreTokenKind::Newline | PreTokenKind::LineComment) {
            return None;
        }
        spec.push_str(&token.text);
        st.pos += 1;
        if let Some(close) = spec[1..].find('>') {
            return Some(spec[1..close + 1].trim().to_string());
        }
    }
    None
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text)
}
