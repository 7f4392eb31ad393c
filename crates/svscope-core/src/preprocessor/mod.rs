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

//! The macro preprocessor.
//!
//! Preprocessing turns one document into a flat stream of [`PostToken`]s:
//! macros expanded, `` `include``s spliced in, inactive conditional branches
//! dropped. Every post token keeps the byte span it came from, and
//! [`PreprocOutput::token_order`] records which file each run of tokens
//! belongs to, so the parser can map declarations back to their real
//! source ranges.

mod cache;
mod expand;
mod macros;
mod run;

pub use cache::{IncludeCache, PreprocIncInfo};
pub use macros::{
    Macro, MacroChange, MacroChangeLog, MacroParam, MacroTable, MacroToken, PreTokenKind,
};

pub(crate) use run::Run;

use crate::error::SvError;
use crate::position::LineIndex;
use crate::symbols::Symbol;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A token of preprocessed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostToken {
    pub text: String,
    /// Byte offset in the origin file where the token (or the expansion
    /// that produced it) starts.
    pub start: usize,
    /// Byte offset in the origin file where it ends.
    pub end: usize,
}

/// Marks that post tokens from `start` onwards (up to the next marker)
/// originate in `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOrigin {
    pub file: Arc<str>,
    pub start: usize,
}

/// Result of preprocessing one document.
#[derive(Debug, Clone)]
pub struct PreprocOutput {
    /// The document that was preprocessed.
    pub file: Arc<str>,
    /// Macros defined by the document itself.
    pub symbols: Vec<Symbol>,
    pub post_tokens: Vec<PostToken>,
    /// Origin runs over `post_tokens`, ordered by `start`.
    pub token_order: Vec<TokenOrigin>,
    /// Every file transitively included, in first-inclusion order.
    pub includes: Vec<String>,
    /// The macro table as it stands at the end of the document.
    pub macros: MacroTable,
    /// Line indexes of every file that contributed tokens.
    pub sources: BTreeMap<Arc<str>, LineIndex>,
    /// Problems found along the way. Preprocessing never fails outright.
    pub diagnostics: Vec<SvError>,
}

impl PreprocOutput {
    /// An output with no tokens for `file`.
    pub fn empty(file: Arc<str>) -> Self {
        Self {
            file,
            symbols: Vec::new(),
            post_tokens: Vec::new(),
            token_order: Vec::new(),
            includes: Vec::new(),
            macros: MacroTable::new(),
            sources: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The preprocessed text: all post tokens concatenated.
    pub fn text(&self) -> String {
        let len = self.post_tokens.iter().map(|t| t.text.len()).sum();
        let mut text = String::with_capacity(len);
        for token in &self.post_tokens {
            text.push_str(&token.text);
        }
        text
    }

    /// The file post token `index` originates in.
    pub fn origin_of(&self, index: usize) -> Option<&Arc<str>> {
        let run = self.token_order.partition_point(|o| o.start <= index);
        run.checked_sub(1).map(|i| &self.token_order[i].file)
    }
}

/// Builds the post token stream and its origin runs.
#[derive(Debug, Default)]
pub(crate) struct Emitter {
    tokens: Vec<PostToken>,
    order: Vec<TokenOrigin>,
    split_next: bool,
}

impl Emitter {
    /// Force the next token to open a new origin run.
    pub(crate) fn split(&mut self) {
        self.split_next = true;
    }

    pub(crate) fn push(&mut self, file: &Arc<str>, text: String, start: usize, end: usize) {
        let same_run = !self.split_next
            && self
                .order
                .last()
                .map_or(false, |run| Arc::ptr_eq(&run.file, file) || run.file == *file);
        if !same_run {
            self.begin_run(file.clone());
        }
        self.split_next = false;
        self.tokens.push(PostToken { text, start, end });
    }

    /// Append another stream, shifting its runs to follow ours. An empty
    /// stream leaves the current run open.
    pub(crate) fn append(&mut self, tokens: &[PostToken], order: &[TokenOrigin]) {
        if tokens.is_empty() {
            return;
        }
        let base = self.tokens.len();
        for run in order {
            let start = base + run.start;
            match self.order.last_mut() {
                Some(last) if last.start == start => last.file = run.file.clone(),
                _ => self.order.push(TokenOrigin {
                    file: run.file.clone(),
                    start,
                }),
            }
        }
        self.tokens.extend_from_slice(tokens);
        self.split_next = true;
    }

    fn begin_run(&mut self, file: Arc<str>) {
        let start = self.tokens.len();
        match self.order.last_mut() {
            // The previous run never received a token.
            Some(last) if last.start == start => last.file = file,
            _ => self.order.push(TokenOrigin { file, start }),
        }
    }

    pub(crate) fn finish(self) -> (Vec<PostToken>, Vec<TokenOrigin>) {
        (self.tokens, self.order)
    }
}
