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

//! Property-based tests for preprocessing and parsing arbitrary input.

use proptest::prelude::*;
use svscope_core::{InMemoryProvider, ParseOptions, Session};

fn session() -> Session {
    let options = ParseOptions::builder()
        .max_macro_depth(32)
        .max_macro_expansions(1_000)
        .build();
    Session::with_provider(options, InMemoryProvider::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Property: parsing never panics and never loops on arbitrary text.
    #[test]
    fn prop_parse_is_total(text in "\\PC{0,300}") {
        let out = session().parse("/rtl/fuzz.sv", &text);
        prop_assert!(out.symbols.includes.is_empty());
    }

    /// Property: parsing terminates on shuffled SystemVerilog fragments.
    #[test]
    fn prop_parse_fragments(
        parts in prop::collection::vec(
            prop::sample::select(vec![
                "module m", "endmodule", "(", ")", ";", "begin", "end", "begin : b",
                "function int f", "endfunction", "task t", "endtask", "typedef struct {",
                "} s_t", "enum {A, B}", "input logic a", "wire w", "if (x)", "else",
                "case (s)", "endcase", "default:", "generate", "endgenerate", "class c",
                "endclass", "package p", "endpackage", "import p::*", "assign y = z",
                "always @(posedge clk)", "fork", "join", "`define M(x) x", "`M(1)",
                "`ifdef M", "`endif", "#(", "parameter P = 1", ",", "::", "sub u (.*)",
            ]),
            0..80,
        )
    ) {
        let text = parts.join(" ");
        let mut session = session();
        let first = session.parse("/rtl/fuzz.sv", &text);
        let second = session.parse("/rtl/fuzz.sv", &text);
        prop_assert_eq!(first, second);
    }

    /// Property: preprocessing keeps text outside directives and macros.
    #[test]
    fn prop_plain_text_passes_through(text in "[a-z0-9 ;\n()=+]{0,200}") {
        let out = session().preprocess("/rtl/plain.sv", &text);
        prop_assert_eq!(out.text(), text);
        prop_assert!(out.diagnostics.is_empty());
    }
}
