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

//! Options shared by every file parsed in a session.

use crate::limits::Limits;
use std::path::PathBuf;

/// A command-line style macro definition (`-D NAME` or `-D NAME=VALUE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefine {
    pub name: String,
    /// Replacement text; `-D NAME` defines `NAME` as empty.
    pub value: String,
}

impl UserDefine {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `NAME` or `NAME=VALUE`. Returns `None` for an empty name.
    pub fn parse(spec: &str) -> Option<Self> {
        let (name, value) = match spec.split_once('=') {
            Some((name, value)) => (name.trim(), value),
            None => (spec.trim(), ""),
        };
        if name.is_empty() {
            None
        } else {
            Some(Self::new(name, value))
        }
    }
}

/// Preprocessing and parsing options.
///
/// # Examples
///
/// ```
/// use svscope_core::ParseOptions;
///
/// let opts = ParseOptions::builder()
///     .include_path("rtl/include")
///     .define("SIMULATION")
///     .define("WIDTH=16")
///     .max_macro_depth(64)
///     .build();
/// assert_eq!(opts.defines.len(), 2);
/// assert_eq!(opts.defines[1].value, "16");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Directories (or header files) searched for `` `include`` targets,
    /// in order.
    pub include_paths: Vec<PathBuf>,
    /// Macros defined before the first line of every file.
    pub defines: Vec<UserDefine>,
    /// Resource limits.
    pub limits: Limits,
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for ergonomic construction of ParseOptions.
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an include search path.
    pub fn include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.include_paths.push(path.into());
        self
    }

    /// Append several include search paths.
    pub fn include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.options
            .include_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add a user define in `NAME` or `NAME=VALUE` form. Specs with an
    /// empty name are ignored.
    pub fn define(mut self, spec: &str) -> Self {
        if let Some(define) = UserDefine::parse(spec) {
            self.options.defines.push(define);
        }
        self
    }

    /// Replace all limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Set the maximum source file size in bytes.
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.options.limits.max_file_size = size;
        self
    }

    /// Set the maximum `` `include`` nesting depth.
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.options.limits.max_include_depth = depth;
        self
    }

    /// Set the maximum macro expansion nesting depth.
    pub fn max_macro_depth(mut self, depth: usize) -> Self {
        self.options.limits.max_macro_depth = depth;
        self
    }

    /// Set the expansion budget of a single invocation.
    pub fn max_macro_expansions(mut self, count: usize) -> Self {
        self.options.limits.max_macro_expansions = count;
        self
    }

    /// Set the structural token cap.
    pub fn max_tokens(mut self, count: usize) -> Self {
        self.options.limits.max_tokens = count;
        self
    }

    /// Build the ParseOptions.
    pub fn build(self) -> ParseOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== UserDefine tests ====================

    #[test]
    fn test_parse_define_forms() {
        assert_eq!(UserDefine::parse("SIM"), Some(UserDefine::new("SIM", "")));
        assert_eq!(UserDefine::parse("W=8"), Some(UserDefine::new("W", "8")));
        assert_eq!(UserDefine::parse("EQ=a=b"), Some(UserDefine::new("EQ", "a=b")));
        assert_eq!(UserDefine::parse("=1"), None);
        assert_eq!(UserDefine::parse(""), None);
    }

    // ==================== Builder tests ====================

    #[test]
    fn test_builder_defaults() {
        let opts = ParseOptions::builder().build();
        assert!(opts.include_paths.is_empty());
        assert!(opts.defines.is_empty());
        assert_eq!(opts.limits, Limits::default());
    }

    #[test]
    fn test_builder_chain() {
        let opts = ParseOptions::builder()
            .include_paths(["a", "b"])
            .include_path("c")
            .define("X=1")
            .define("")
            .max_include_depth(4)
            .max_tokens(1000)
            .build();
        assert_eq!(opts.include_paths.len(), 3);
        assert_eq!(opts.defines, vec![UserDefine::new("X", "1")]);
        assert_eq!(opts.limits.max_include_depth, 4);
        assert_eq!(opts.limits.max_tokens, 1000);
    }

    #[test]
    fn test_builder_limits_replace() {
        let opts = ParseOptions::builder().limits(Limits::unlimited()).build();
        assert_eq!(opts.limits, Limits::unlimited());
    }
}
