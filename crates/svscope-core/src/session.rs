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

//! Indexing sessions.
//!
//! A [`Session`] owns the state that persists across the files of one
//! indexing run: options, the source provider and the include cache.
//! Every document preprocessed through a session reuses the headers the
//! session has already seen.

use crate::error::{SvError, SvResult};
use crate::options::ParseOptions;
use crate::parser::{parse_preprocessed, ParseOutput};
use crate::preprocessor::{IncludeCache, PreprocOutput, Run};
use crate::source::{FileSystemProvider, SourceProvider};
use crate::symbols::SymbolTable;
use std::path::Path;
use tracing::debug;

/// Shared state for indexing a set of files.
///
/// A session has a single writer; index files in parallel with one session
/// per worker.
///
/// # Examples
///
/// ```
/// use svscope_core::{InMemoryProvider, ParseOptions, Session};
///
/// let provider = InMemoryProvider::new().with_file("/rtl/defs.svh", "`define W 8\n");
/// let mut session = Session::with_provider(ParseOptions::default(), provider);
/// let out = session.parse("/rtl/top.sv", "`include \"defs.svh\"\nmodule top; endmodule\n");
/// assert!(out.symbols.find_container(&["top"]).is_some());
/// assert_eq!(session.include_cache().len(), 1);
/// ```
pub struct Session {
    options: ParseOptions,
    provider: Box<dyn SourceProvider + Send + Sync>,
    cache: IncludeCache,
}

impl Session {
    /// A session reading files from disk.
    pub fn new(options: ParseOptions) -> Self {
        Self::with_provider(options, FileSystemProvider)
    }

    pub fn with_provider(
        options: ParseOptions,
        provider: impl SourceProvider + Send + Sync + 'static,
    ) -> Self {
        Self {
            options,
            provider: Box::new(provider),
            cache: IncludeCache::new(),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn provider(&self) -> &dyn SourceProvider {
        self.provider.as_ref()
    }

    pub fn include_cache(&self) -> &IncludeCache {
        &self.cache
    }

    /// Mutable access to the include cache, e.g. to invalidate a header
    /// that changed on disk.
    pub fn include_cache_mut(&mut self) -> &mut IncludeCache {
        &mut self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Preprocess `text` as the document `file`.
    pub fn preprocess(&mut self, file: &str, text: &str) -> PreprocOutput {
        Run::new(&mut self.cache, self.provider.as_ref(), &self.options).preprocess(file, text)
    }

    /// Preprocess and parse `text` into a fresh symbol table.
    pub fn parse(&mut self, file: &str, text: &str) -> ParseOutput {
        let mut table = SymbolTable::new();
        self.parse_into(file, text, &mut table)
    }

    /// Preprocess and parse `text` into `table`, updating symbols left
    /// there by an earlier parse of the same document.
    pub fn parse_into(&mut self, file: &str, text: &str, table: &mut SymbolTable) -> ParseOutput {
        let output = self.preprocess(file, text);
        parse_preprocessed(&output, table, &self.options.limits)
    }

    /// Read `path` through the session's provider and parse it.
    pub fn parse_path(&mut self, path: impl AsRef<Path>) -> SvResult<ParseOutput> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let text = self
            .provider
            .read_source(path)
            .map_err(|e| SvError::io(e.to_string()).with_file(file.as_str()))?;
        debug!(file = %file, bytes = text.len(), "read source");
        Ok(self.parse(&file, &text))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("cached_includes", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SvErrorKind;
    use crate::source::InMemoryProvider;
    use crate::symbols::SymbolKind;

    fn session(provider: InMemoryProvider) -> Session {
        Session::with_provider(ParseOptions::default(), provider)
    }

    // ==================== Include cache tests ====================

    #[test]
    fn test_include_cache_shared_across_files() {
        let provider = InMemoryProvider::new().with_file("/rtl/defs.svh", "`define W 8\n");
        let mut session = session(provider);
        let a = session.parse("/rtl/a.sv", "`include \"defs.svh\"\nwire [`W-1:0] a;\n");
        let b = session.parse("/rtl/b.sv", "`include \"defs.svh\"\nwire [`W-1:0] b;\n");
        assert_eq!(session.include_cache().len(), 1);
        assert_eq!(a.symbols.includes, b.symbols.includes);
        assert_eq!(
            b.symbols.symbols.iter().find(|s| s.name == "b").unwrap().kind,
            SymbolKind::Net {
                net_type: "wire [8-1:0]".into()
            }
        );
    }

    #[test]
    fn test_clear_cache() {
        let provider = InMemoryProvider::new().with_file("/rtl/defs.svh", "`define W 8\n");
        let mut session = session(provider);
        session.preprocess("/rtl/a.sv", "`include \"defs.svh\"\n");
        assert!(!session.include_cache().is_empty());
        session.clear_cache();
        assert!(session.include_cache().is_empty());
    }

    // ==================== Option tests ====================

    #[test]
    fn test_user_defines_apply() {
        let options = ParseOptions::builder().define("FAST").build();
        let mut session = Session::with_provider(options, InMemoryProvider::new());
        let out = session.parse(
            "/rtl/top.sv",
            "`ifdef FAST\nmodule fast; endmodule\n`else\nmodule slow; endmodule\n`endif\n",
        );
        assert!(out.symbols.find_container(&["fast"]).is_some());
        assert!(out.symbols.find_container(&["slow"]).is_none());
    }

    // ==================== Path tests ====================

    #[test]
    fn test_parse_path_reads_provider() {
        let provider = InMemoryProvider::new().with_file("/rtl/top.sv", "module top; endmodule\n");
        let mut session = session(provider);
        let out = session.parse_path("/rtl/top.sv").unwrap();
        assert!(out.symbols.find_container(&["top"]).is_some());
    }

    #[test]
    fn test_parse_path_missing_file() {
        let mut session = session(InMemoryProvider::new());
        let err = session.parse_path("/rtl/missing.sv").unwrap_err();
        assert_eq!(err.kind, SvErrorKind::Io);
        assert_eq!(err.file.as_deref(), Some("/rtl/missing.sv"));
    }

    #[test]
    fn test_parse_into_reuses_table() {
        let mut session = session(InMemoryProvider::new());
        let mut table = SymbolTable::new();
        session.parse_into("/rtl/top.sv", "module m; wire a; endmodule\n", &mut table);
        let out = session.parse_into("/rtl/top.sv", "module m; wire a; endmodule\n", &mut table);
        assert_eq!(out.symbols.containers.len(), 1);
        assert_eq!(out.symbols.containers[0].info.symbols.len(), 1);
    }
}
