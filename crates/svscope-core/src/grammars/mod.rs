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

//! The two grammars shipped with svscope.
//!
//! - [`preprocessor()`] is a minimal macro-syntax grammar: enough to find
//!   directives, macro invocations, argument lists and the two-character
//!   macro escapes, while keeping strings and comments opaque.
//! - [`structural()`] classifies the preprocessed text for the parser:
//!   keywords by category, identifiers, literals, and block structure.
//!
//! Both are compiled on first use and shared by the whole process.

mod preprocessor;
mod structural;

use crate::tokenizer::Grammar;
use once_cell::sync::Lazy;

pub use preprocessor::scopes as pre;
pub use structural::scopes as sv;

static PREPROCESSOR: Lazy<Grammar> = Lazy::new(|| {
    preprocessor::builder()
        .build()
        .expect("preprocessor grammar is valid")
});

static STRUCTURAL: Lazy<Grammar> = Lazy::new(|| {
    structural::builder()
        .build()
        .expect("structural grammar is valid")
});

/// The macro-syntax grammar used by the preprocessor.
pub fn preprocessor() -> &'static Grammar {
    &PREPROCESSOR
}

/// The structural grammar used by the parser.
pub fn structural() -> &'static Grammar {
    &STRUCTURAL
}

/// Simple identifier.
pub(crate) const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_$]*";

/// Integer, real and based literals, with an optional size prefix.
pub(crate) const NUMBER: &str = concat!(
    r"[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9][0-9_]*)?",
    r"(?:[ \t]*'[sS]?[bBoOdDhH][ \t]*[0-9a-fA-FxXzZ?][0-9a-fA-FxXzZ?_]*)?",
    r"|'[sS]?[bBoOdDhH][ \t]*[0-9a-fA-FxXzZ?][0-9a-fA-FxXzZ?_]*",
    r"|'[01xXzZ]\b",
);

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Shipped grammar tests ====================

    #[test]
    fn test_shipped_grammars_build() {
        assert!(preprocessor().check_patterns().is_ok());
        assert!(structural().check_patterns().is_ok());
    }

    #[test]
    fn test_grammars_are_shared() {
        assert!(std::ptr::eq(preprocessor(), preprocessor()));
        assert!(std::ptr::eq(structural(), structural()));
    }

    #[test]
    fn test_number_literals() {
        let re = regex::Regex::new(&format!("^(?:{})$", NUMBER)).unwrap();
        for literal in ["0", "1_000", "3.14", "1e-3", "8'hFF", "4 'b10_x1", "'d15", "'1", "'z"] {
            assert!(re.is_match(literal), "{literal}");
        }
    }
}
