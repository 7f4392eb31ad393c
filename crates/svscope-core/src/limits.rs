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

//! Resource limits for preprocessing and parsing.

/// Configurable resource bounds.
///
/// Every call into the pipeline is synchronous and always terminates; these
/// limits keep the amount of work proportional to the input even for
/// pathological sources (self-recursive macros, include explosions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a single source file in bytes (default: 64MB).
    pub max_file_size: usize,
    /// Maximum `` `include`` nesting depth (default: 64).
    pub max_include_depth: usize,
    /// Maximum macro expansion nesting depth (default: 128).
    ///
    /// A macro whose replacement invokes itself hits this guard instead of
    /// expanding forever.
    pub max_macro_depth: usize,
    /// Maximum number of expansions triggered by one invocation in source
    /// text, counting nested expansions (default: 100k).
    pub max_macro_expansions: usize,
    /// Maximum number of structural tokens the parser walks (default: 50M).
    pub max_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: 64 * 1024 * 1024, // 64MB
            max_include_depth: 64,
            max_macro_depth: 128,
            max_macro_expansions: 100_000,
            max_tokens: 50_000_000,
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_file_size: usize::MAX,
            max_include_depth: usize::MAX,
            max_macro_depth: usize::MAX,
            max_macro_expansions: usize::MAX,
            max_tokens: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Default limits tests ====================

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_file_size, 64 * 1024 * 1024);
        assert_eq!(limits.max_include_depth, 64);
        assert_eq!(limits.max_macro_depth, 128);
        assert_eq!(limits.max_macro_expansions, 100_000);
        assert_eq!(limits.max_tokens, 50_000_000);
    }

    #[test]
    fn test_macro_depth_below_expansion_budget() {
        let limits = Limits::default();
        assert!(limits.max_macro_depth < limits.max_macro_expansions);
    }

    // ==================== Unlimited limits tests ====================

    #[test]
    fn test_unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_file_size, usize::MAX);
        assert_eq!(limits.max_include_depth, usize::MAX);
        assert_eq!(limits.max_macro_depth, usize::MAX);
        assert_eq!(limits.max_macro_expansions, usize::MAX);
        assert_eq!(limits.max_tokens, usize::MAX);
    }

    #[test]
    fn test_limits_clone_eq() {
        let original = Limits::default();
        assert_eq!(original.clone(), original);
        assert_ne!(original, Limits::unlimited());
    }
}
