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

//! Declarative grammar definitions and their compiled form.
//!
//! A grammar is a set of named contexts. Each context carries an optional
//! scope name and an ordered list of patterns, possibly pulling in the
//! patterns of other contexts through `include`. Grammars are described
//! with [`ContextDef`] and [`PatternDef`] values and compiled once by
//! [`GrammarBuilder::build`], which resolves forward references, names
//! inline contexts, flattens includes and checks every pattern against the
//! capture/scope contract.
//!
//! # Pattern scopes
//!
//! `scopes[0]` is the pattern scope and applies to every token the pattern
//! emits; `scopes[i]` is the scope of capture group `i`. An empty string
//! means "no scope". A pattern therefore always lists exactly one scope more
//! than it has capture groups. Capture groups must tile the match without
//! gaps or overlap; use `(?:...)` for grouping that should not emit a token.
//!
//! # Examples
//!
//! ```
//! use svscope_core::tokenizer::{ContextDef, GrammarBuilder, PatternDef};
//!
//! let grammar = GrammarBuilder::new()
//!     .context(
//!         "Main",
//!         ContextDef::new("source")
//!             .pattern(PatternDef::new(r"[a-z]+", &["word"]))
//!             .pattern(PatternDef::new(r#"""#, &["quote"]).push(
//!                 ContextDef::new("string")
//!                     .pattern(PatternDef::new(r#"""#, &["quote"]).pop())
//!                     .pattern(PatternDef::new(r#"[^"]+"#, &["body"])),
//!             ))
//!             .pattern(PatternDef::new(r"\s+", &["space"])),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let tokens = grammar.tokenize("say \"hi\"", None);
//! assert_eq!(tokens.len(), 5);
//! assert_eq!(tokens[3].scope(), "body");
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// An interned scope name.
pub type Scope = Arc<str>;

/// Name of the context every tokenization starts in.
pub const MAIN_CONTEXT: &str = "Main";

/// Default scope for runs of characters no pattern matched.
pub const DEFAULT_INVALID_SCOPE: &str = "invalid.illegal";

/// Errors detected while compiling a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The grammar has no `Main` context.
    #[error("grammar has no \"Main\" context")]
    MissingMain,

    /// Two contexts share a name.
    #[error("context \"{0}\" is defined more than once")]
    DuplicateContext(String),

    /// A push, pop or include names a context that does not exist.
    #[error("context \"{context}\" references unknown context \"{reference}\"")]
    UnknownContext { context: String, reference: String },

    /// Contexts include each other in a loop.
    #[error("include cycle through context \"{0}\"")]
    IncludeCycle(String),

    /// A pattern failed to compile.
    #[error("context \"{context}\": invalid pattern /{pattern}/: {source}")]
    InvalidRegex {
        context: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A pattern's scope list does not line up with its capture groups.
    #[error(
        "context \"{context}\": pattern /{pattern}/ has {groups} capture groups but {scopes} scopes (expected {})",
        .groups + 1
    )]
    ScopeCountMismatch {
        context: String,
        pattern: String,
        groups: usize,
        scopes: usize,
    },
}

/// Stack effect of a state action, applied before the pattern's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    /// Push a snapshot of the context and scope stacks.
    Save,
    /// Replace the current stacks with the top snapshot, keeping it.
    Restore,
    /// Drop the top snapshot without restoring it.
    Delete,
}

/// Reference to a context from a pattern action.
#[derive(Debug, Clone)]
pub enum ContextRef {
    /// A named context, possibly defined later in the grammar.
    Named(String),
    /// A one-off context defined in place; it is given a generated name.
    Inline(Box<ContextDef>),
}

impl From<&str> for ContextRef {
    fn from(name: &str) -> Self {
        ContextRef::Named(name.to_string())
    }
}

impl From<ContextDef> for ContextRef {
    fn from(def: ContextDef) -> Self {
        ContextRef::Inline(Box::new(def))
    }
}

#[derive(Debug, Clone)]
enum ActionDef {
    Push(ContextRef),
    Pop(Option<ContextRef>),
    PushScopes(Vec<String>),
    PopScopes(Vec<String>),
}

/// Source form of a pattern.
#[derive(Debug, Clone)]
pub struct PatternDef {
    regex: String,
    scopes: Vec<String>,
    action: Option<ActionDef>,
    state: Option<StateAction>,
}

impl PatternDef {
    /// A pattern with its scope list (pattern scope first, then one per
    /// capture group).
    pub fn new(regex: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            regex: regex.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            action: None,
            state: None,
        }
    }

    /// Enter a context after matching.
    pub fn push(mut self, context: impl Into<ContextRef>) -> Self {
        self.action = Some(ActionDef::Push(context.into()));
        self
    }

    /// Leave the current context after matching.
    pub fn pop(mut self) -> Self {
        self.action = Some(ActionDef::Pop(None));
        self
    }

    /// Leave the current context and enter another in the same step.
    pub fn pop_into(mut self, context: impl Into<ContextRef>) -> Self {
        self.action = Some(ActionDef::Pop(Some(context.into())));
        self
    }

    /// Append scope names without changing the context.
    pub fn push_scopes(mut self, scopes: &[&str]) -> Self {
        self.action = Some(ActionDef::PushScopes(
            scopes.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Unwind scope names pushed with [`PatternDef::push_scopes`].
    pub fn pop_scopes(mut self, scopes: &[&str]) -> Self {
        self.action = Some(ActionDef::PopScopes(
            scopes.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn save(mut self) -> Self {
        self.state = Some(StateAction::Save);
        self
    }

    pub fn restore(mut self) -> Self {
        self.state = Some(StateAction::Restore);
        self
    }

    pub fn delete(mut self) -> Self {
        self.state = Some(StateAction::Delete);
        self
    }
}

#[derive(Debug, Clone)]
enum EntryDef {
    Pattern(PatternDef),
    Include(String),
}

/// Source form of a context.
#[derive(Debug, Clone, Default)]
pub struct ContextDef {
    scope: String,
    entries: Vec<EntryDef>,
}

impl ContextDef {
    /// A context whose tokens get `scope` (empty for none).
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            entries: Vec::new(),
        }
    }

    /// Append a pattern.
    pub fn pattern(mut self, pattern: PatternDef) -> Self {
        self.entries.push(EntryDef::Pattern(pattern));
        self
    }

    /// Append several patterns.
    pub fn patterns(mut self, patterns: impl IntoIterator<Item = PatternDef>) -> Self {
        self.entries
            .extend(patterns.into_iter().map(EntryDef::Pattern));
        self
    }

    /// Splice in the patterns of another named context at this point.
    pub fn include(mut self, context: &str) -> Self {
        self.entries.push(EntryDef::Include(context.to_string()));
        self
    }
}

/// Index of a compiled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum Action {
    Push(ContextId),
    Pop(Option<ContextId>),
    PushScopes(Vec<Scope>),
    PopScopes(Vec<Scope>),
}

#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub(crate) regex: Regex,
    pub(crate) source: String,
    /// `scopes[0]` is the pattern scope, `scopes[i]` the scope of group `i`.
    pub(crate) scopes: Vec<Option<Scope>>,
    pub(crate) action: Option<Action>,
    pub(crate) state: Option<StateAction>,
}

#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub(crate) name: String,
    pub(crate) scope: Option<Scope>,
    /// Patterns with includes already flattened, in declaration order.
    pub(crate) patterns: Vec<Pattern>,
}

/// A compiled grammar, ready to tokenize text.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) contexts: Vec<Context>,
    pub(crate) main: ContextId,
    pub(crate) invalid_scope: Scope,
}

impl Grammar {
    /// Name and scope of every compiled context, in id order.
    pub fn contexts(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.contexts
            .iter()
            .map(|c| (c.name.as_str(), c.scope.as_deref()))
    }

    /// The scope given to unmatched input.
    pub fn invalid_scope(&self) -> &str {
        &self.invalid_scope
    }

    /// Re-check the capture/scope contract of every compiled pattern.
    pub fn check_patterns(&self) -> Result<(), GrammarError> {
        for context in &self.contexts {
            for pattern in &context.patterns {
                if pattern.regex.captures_len() != pattern.scopes.len() {
                    return Err(GrammarError::ScopeCountMismatch {
                        context: context.name.clone(),
                        pattern: pattern.source.clone(),
                        groups: pattern.regex.captures_len() - 1,
                        scopes: pattern.scopes.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder that compiles [`ContextDef`]s into a [`Grammar`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    contexts: Vec<(String, ContextDef)>,
    invalid_scope: Option<String>,
}

/// A context after reference resolution but before include flattening.
struct RawContext {
    name: String,
    scope: Option<Scope>,
    entries: Vec<RawEntry>,
}

enum RawEntry {
    Pattern(Pattern),
    Include(ContextId),
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named context.
    pub fn context(mut self, name: &str, def: ContextDef) -> Self {
        self.contexts.push((name.to_string(), def));
        self
    }

    /// Override the scope used for unmatched input.
    pub fn invalid_scope(mut self, scope: &str) -> Self {
        self.invalid_scope = Some(scope.to_string());
        self
    }

    /// Compile the grammar.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut interner = Interner::default();

        let mut ids: HashMap<String, ContextId> = HashMap::new();
        for (index, (name, _)) in self.contexts.iter().enumerate() {
            if ids.insert(name.clone(), ContextId(index)).is_some() {
                return Err(GrammarError::DuplicateContext(name.clone()));
            }
        }
        let main = *ids.get(MAIN_CONTEXT).ok_or(GrammarError::MissingMain)?;

        // Pending contexts still to be resolved; inline contexts are appended
        // as they are discovered and get the next free id.
        let mut pending: Vec<(String, ContextDef)> = self.contexts;
        let mut raw: Vec<RawContext> = Vec::with_capacity(pending.len());
        let mut next = 0;
        while next < pending.len() {
            let (name, def) = std::mem::take(&mut pending[next]);
            let mut entries = Vec::with_capacity(def.entries.len());
            for entry in def.entries {
                match entry {
                    EntryDef::Include(target) => {
                        let id = resolve(&ids, &name, &target)?;
                        entries.push(RawEntry::Include(id));
                    }
                    EntryDef::Pattern(pattern) => {
                        let action = match pattern.action {
                            None => None,
                            Some(ActionDef::Push(target)) => Some(Action::Push(
                                resolve_ref(&ids, &mut pending, &name, target)?,
                            )),
                            Some(ActionDef::Pop(None)) => Some(Action::Pop(None)),
                            Some(ActionDef::Pop(Some(target))) => Some(Action::Pop(Some(
                                resolve_ref(&ids, &mut pending, &name, target)?,
                            ))),
                            Some(ActionDef::PushScopes(names)) => Some(Action::PushScopes(
                                names.iter().map(|n| interner.intern(n)).collect(),
                            )),
                            Some(ActionDef::PopScopes(names)) => Some(Action::PopScopes(
                                names.iter().map(|n| interner.intern(n)).collect(),
                            )),
                        };
                        let regex = Regex::new(&format!("^(?:{})", pattern.regex)).map_err(
                            |source| GrammarError::InvalidRegex {
                                context: name.clone(),
                                pattern: pattern.regex.clone(),
                                source,
                            },
                        )?;
                        if regex.captures_len() != pattern.scopes.len() {
                            return Err(GrammarError::ScopeCountMismatch {
                                context: name.clone(),
                                pattern: pattern.regex,
                                groups: regex.captures_len() - 1,
                                scopes: pattern.scopes.len(),
                            });
                        }
                        let scopes = pattern
                            .scopes
                            .iter()
                            .map(|s| interner.intern_opt(s))
                            .collect();
                        entries.push(RawEntry::Pattern(Pattern {
                            regex,
                            source: pattern.regex,
                            scopes,
                            action,
                            state: pattern.state,
                        }));
                    }
                }
            }
            raw.push(RawContext {
                scope: interner.intern_opt(&def.scope),
                name,
                entries,
            });
            next += 1;
        }

        let mut flattened: Vec<Option<Vec<Pattern>>> = vec![None; raw.len()];
        let mut visiting = vec![false; raw.len()];
        for index in 0..raw.len() {
            flatten(&raw, index, &mut flattened, &mut visiting)?;
        }

        let contexts = raw
            .into_iter()
            .zip(flattened)
            .map(|(context, patterns)| Context {
                name: context.name,
                scope: context.scope,
                patterns: patterns.unwrap_or_default(),
            })
            .collect();

        let invalid = self
            .invalid_scope
            .unwrap_or_else(|| DEFAULT_INVALID_SCOPE.to_string());
        Ok(Grammar {
            contexts,
            main,
            invalid_scope: interner.intern(&invalid),
        })
    }
}

fn resolve(
    ids: &HashMap<String, ContextId>,
    context: &str,
    target: &str,
) -> Result<ContextId, GrammarError> {
    ids.get(target)
        .copied()
        .ok_or_else(|| GrammarError::UnknownContext {
            context: context.to_string(),
            reference: target.to_string(),
        })
}

fn resolve_ref(
    ids: &HashMap<String, ContextId>,
    pending: &mut Vec<(String, ContextDef)>,
    context: &str,
    target: ContextRef,
) -> Result<ContextId, GrammarError> {
    match target {
        ContextRef::Named(name) => resolve(ids, context, &name),
        ContextRef::Inline(def) => {
            let id = ContextId(pending.len());
            pending.push((format!("{}#{}", context, id.0), *def));
            Ok(id)
        }
    }
}

fn flatten(
    raw: &[RawContext],
    index: usize,
    flattened: &mut Vec<Option<Vec<Pattern>>>,
    visiting: &mut Vec<bool>,
) -> Result<(), GrammarError> {
    if flattened[index].is_some() {
        return Ok(());
    }
    if visiting[index] {
        return Err(GrammarError::IncludeCycle(raw[index].name.clone()));
    }
    visiting[index] = true;
    let mut patterns = Vec::new();
    for entry in &raw[index].entries {
        match entry {
            RawEntry::Pattern(pattern) => patterns.push(pattern.clone()),
            RawEntry::Include(id) => {
                flatten(raw, id.0, flattened, visiting)?;
                if let Some(included) = &flattened[id.0] {
                    patterns.extend(included.iter().cloned());
                }
            }
        }
    }
    visiting[index] = false;
    flattened[index] = Some(patterns);
    Ok(())
}

#[derive(Default)]
struct Interner {
    scopes: HashMap<String, Scope>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> Scope {
        if let Some(scope) = self.scopes.get(name) {
            return scope.clone();
        }
        let scope: Scope = Arc::from(name);
        self.scopes.insert(name.to_string(), scope.clone());
        scope
    }

    fn intern_opt(&mut self, name: &str) -> Option<Scope> {
        if name.is_empty() {
            None
        } else {
            Some(self.intern(name))
        }
    }
}
