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

//! Property-based tests for symbol table stability.

use proptest::prelude::*;
use svscope_core::{FileSymbolsInfo, InMemoryProvider, ParseOptions, Session, SymbolTable};

fn design(modules: &[(String, Vec<String>)]) -> String {
    let mut text = String::new();
    for (name, wires) in modules {
        text.push_str(&format!("module {} (input logic clk);\n", name));
        for wire in wires {
            text.push_str(&format!("  wire [3:0] {};\n", wire));
        }
        text.push_str("endmodule\n");
    }
    text
}

fn ident() -> impl Strategy<Value = String> {
    "w_[a-z0-9_]{0,10}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: re-parsing into the same table never duplicates symbols.
    #[test]
    fn prop_reparse_is_stable(
        modules in prop::collection::vec(
            ("m_[a-z0-9]{0,8}", prop::collection::vec(ident(), 0..8)),
            1..5,
        )
    ) {
        let text = design(&modules);
        let mut session = Session::with_provider(ParseOptions::default(), InMemoryProvider::new());
        let mut table = SymbolTable::new();
        let first = session.parse_into("/rtl/gen.sv", &text, &mut table);
        let nodes = table.node_count();
        let second = session.parse_into("/rtl/gen.sv", &text, &mut table);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(table.node_count(), nodes);

        for container in &second.symbols.containers {
            let mut names: Vec<&str> =
                container.info.symbols.iter().map(|s| s.name.as_str()).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), total);
        }
    }

    /// Property: the compact encoding round-trips parsed symbols.
    #[test]
    fn prop_encoding_round_trip(
        modules in prop::collection::vec(
            ("m_[a-z0-9]{0,8}", prop::collection::vec(ident(), 0..6)),
            1..4,
        )
    ) {
        let text = design(&modules);
        let mut session = Session::with_provider(ParseOptions::default(), InMemoryProvider::new());
        let out = session.parse("/rtl/gen.sv", &text);
        let decoded = FileSymbolsInfo::from_json(&out.symbols.to_json()).unwrap();
        prop_assert_eq!(decoded, out.symbols);
    }
}
