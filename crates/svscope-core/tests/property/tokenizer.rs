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

//! Property-based tests for the tokenizer engine.

use proptest::prelude::*;
use svscope_core::grammars;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: structural tokens concatenate back to the input.
    #[test]
    fn prop_structural_tokenize_is_total(text in "\\PC{0,200}") {
        let tokens = grammars::structural().tokenize(&text, None);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    /// Property: preprocessor tokens concatenate back to the input.
    #[test]
    fn prop_preprocessor_tokenize_is_total(text in "\\PC{0,200}") {
        let tokens = grammars::preprocessor().tokenize(&text, None);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    /// Property: token offsets are contiguous and no token is empty.
    #[test]
    fn prop_offsets_contiguous(
        text in "[a-z_ ;:()\\[\\]{}\"\\\\`/*\n0-9']{0,200}"
    ) {
        let mut offset = 0;
        for token in grammars::structural().tokenize(&text, None) {
            prop_assert_eq!(token.offset, offset);
            prop_assert!(!token.text.is_empty());
            offset += token.text.len();
        }
        prop_assert_eq!(offset, text.len());
    }

    /// Property: SystemVerilog-looking text never trips the engine.
    #[test]
    fn prop_keyword_soup_is_total(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "module", "endmodule", "begin", "end", "case", "endcase", "`define", "`ifdef",
                "`endif", "(*", "*)", "/*", "*/", "//", "\"", "\\", "::", "#", "##", "\n",
                "a", "8'hFF", "'1", "(", ")", "[", "]", "{", "}", ";",
            ]),
            0..60,
        )
    ) {
        let text = words.join(" ");
        for grammar in [grammars::structural(), grammars::preprocessor()] {
            let tokens = grammar.tokenize(&text, None);
            let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
            prop_assert_eq!(&joined, &text);
        }
    }
}

#[test]
fn test_shipped_grammars_pass_capture_checks() {
    assert!(grammars::structural().check_patterns().is_ok());
    assert!(grammars::preprocessor().check_patterns().is_ok());
}
