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

//! Cache of preprocessed include files.

use super::macros::MacroChangeLog;
use super::{PostToken, TokenOrigin};
use crate::position::LineIndex;
use crate::symbols::Symbol;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything needed to splice a preprocessed include file into a parent
/// without reading or scanning it again.
#[derive(Debug, Clone, Default)]
pub struct PreprocIncInfo {
    /// Macros the file defined.
    pub symbols: Vec<Symbol>,
    pub post_tokens: Vec<PostToken>,
    /// Origin runs, relative to `post_tokens`.
    pub token_order: Vec<TokenOrigin>,
    /// Files this file transitively included.
    pub includes: Vec<String>,
    /// Macro table edits, replayed onto the includer's table.
    pub macro_log: MacroChangeLog,
    pub sources: BTreeMap<Arc<str>, LineIndex>,
}

/// Include results shared by every parse of a session.
///
/// Lookups go through two maps: the literal include spec (`"defs.svh"`,
/// `"../common/defs.svh"`) to the file it resolved to, and the resolved
/// path to its preprocessed contents. Two specs naming the same file share
/// one entry.
#[derive(Debug, Clone, Default)]
pub struct IncludeCache {
    resolved: HashMap<String, PathBuf>,
    entries: HashMap<PathBuf, Arc<PreprocIncInfo>>,
}

impl IncludeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path a literal spec resolved to earlier.
    pub fn resolved(&self, spec: &str) -> Option<&Path> {
        self.resolved.get(spec).map(PathBuf::as_path)
    }

    pub fn remember(&mut self, spec: &str, path: PathBuf) {
        self.resolved.insert(spec.to_string(), path);
    }

    pub fn get(&self, path: &Path) -> Option<Arc<PreprocIncInfo>> {
        self.entries.get(path).cloned()
    }

    pub fn insert(&mut self, path: PathBuf, info: Arc<PreprocIncInfo>) {
        self.entries.insert(path, info);
    }

    /// Drop the entry for `path`, e.g. after the file changed on disk.
    /// Specs resolving to it stay mapped.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.resolved.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_share_resolved_entry() {
        let mut cache = IncludeCache::new();
        let path = PathBuf::from("/ip/defs.svh");
        cache.remember("defs.svh", path.clone());
        cache.remember("../ip/defs.svh", path.clone());
        cache.insert(path.clone(), Arc::new(PreprocIncInfo::default()));

        let a = cache.get(cache.resolved("defs.svh").unwrap()).unwrap();
        let b = cache.get(cache.resolved("../ip/defs.svh").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = IncludeCache::new();
        let path = PathBuf::from("/ip/defs.svh");
        cache.remember("defs.svh", path.clone());
        cache.insert(path.clone(), Arc::new(PreprocIncInfo::default()));
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        assert!(cache.resolved("defs.svh").is_some());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.resolved("defs.svh").is_none());
    }
}
