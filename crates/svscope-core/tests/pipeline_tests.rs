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

//! End-to-end scenarios through the public API: preprocess, parse,
//! encode.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use svscope_core::{
    Definition, FileSymbolsInfo, InMemoryProvider, Limits, ParseOptions, Session, SourceProvider,
    SvErrorKind, SymbolKind, SymbolTable,
};

/// Counts how often each file is read.
#[derive(Clone)]
struct CountingProvider {
    inner: InMemoryProvider,
    reads: Arc<AtomicUsize>,
}

impl CountingProvider {
    fn new(inner: InMemoryProvider) -> Self {
        Self {
            inner,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SourceProvider for CountingProvider {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_source(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn files_with_suffix(&self, suffix: &Path) -> Vec<PathBuf> {
        self.inner.files_with_suffix(suffix)
    }
}

fn session(provider: InMemoryProvider) -> Session {
    Session::with_provider(ParseOptions::default(), provider)
}

// =============================================================================
// Symbol Scenarios
// =============================================================================

#[test]
fn test_round_trip_scenario() {
    let mut session = session(InMemoryProvider::new());
    let out = session.parse(
        "/rtl/m.sv",
        "`define WIDTH 8\nmodule m #(parameter W=`WIDTH) (input [W-1:0] a); endmodule\n",
    );

    assert_eq!(out.symbols.containers.len(), 1);
    let m = &out.symbols.containers[0];
    assert_eq!(m.symbol.name, "m");
    assert_eq!(m.symbol.tag(), vec!["module"]);

    let names: Vec<&str> = m.info.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["W", "a"]);
    assert_eq!(m.info.symbols[0].tag(), vec!["parameter-port"]);
    assert_eq!(m.info.symbols[1].tag(), vec!["port"]);

    let width = &out.symbols.symbols[0];
    assert_eq!(width.name, "WIDTH");
    assert_eq!(width.tag(), vec!["macro"]);
    assert_eq!(width.kind.detail(), Some("8"));
}

#[test]
fn test_cross_file_definition_span() {
    let provider = InMemoryProvider::new().with_file(
        "/rtl/inc/regs.svh",
        "`define REG(name) logic [31:0] name\n",
    );
    let options = ParseOptions::builder().include_path("/rtl/inc").build();
    let mut session = Session::with_provider(options, provider);
    let out = session.parse(
        "/rtl/top.sv",
        "`include \"regs.svh\"\nmodule top;\n  `REG(status);\nendmodule\n",
    );

    let top = out.symbols.find_container(&["top"]).unwrap();
    let status = top.info.symbol("status").unwrap();
    let Definition::Multi(segments) = &status.definition else {
        panic!("expected a multi-file definition, got {:?}", status.definition);
    };
    assert!(segments.len() >= 2);
    let files = status.definition.files();
    assert!(files.contains(&"/rtl/inc/regs.svh"));
    assert!(files.contains(&"/rtl/top.sv"));
    assert!(segments.iter().all(|(_, range)| !range.is_empty()));
}

#[test]
fn test_hierarchy_paths() {
    let mut session = session(InMemoryProvider::new());
    let out = session.parse(
        "/rtl/pkg.sv",
        "package cfg_pkg;\n\
           typedef struct { int a; } cfg_t;\n\
           function automatic int twice(int x); return 2 * x; endfunction\n\
         endpackage\n",
    );
    let twice = out.symbols.find_container(&["cfg_pkg", "twice"]).unwrap();
    assert_eq!(twice.info.symbols[0].container_path, vec!["cfg_pkg", "twice"]);
    let field = out
        .symbols
        .find_container(&["cfg_pkg", "cfg_t"])
        .unwrap()
        .info
        .symbol("a")
        .unwrap();
    assert_eq!(
        field.kind,
        SymbolKind::Field {
            data_type: "int".into()
        }
    );
    let all: Vec<&str> = out.symbols.all_symbols().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(all, vec!["cfg_pkg", "cfg_t", "a", "twice", "x"]);
}

#[test]
fn test_pkgdeps() {
    let mut session = session(InMemoryProvider::new());
    let out = session.parse(
        "/rtl/top.sv",
        "module top import bus_pkg::*;\n\
           cfg_pkg::cfg_t cfg;\n\
           assign x = math_pkg::max(a, b);\n\
         endmodule\n",
    );
    let deps: Vec<&str> = out.pkgdeps.iter().map(String::as_str).collect();
    assert_eq!(deps, vec!["bus_pkg", "cfg_pkg", "math_pkg"]);
}

// =============================================================================
// Preprocessor Scenarios
// =============================================================================

#[test]
fn test_conditional_branch_selection() {
    let options = ParseOptions::builder().define("B").build();
    let mut session = Session::with_provider(options, InMemoryProvider::new());
    let out = session.preprocess(
        "/rtl/top.sv",
        "`ifdef A\nwire a;\n`elsif B\nwire b;\n`else\nwire c;\n`endif\n",
    );
    let text = out.text();
    assert!(text.contains("wire b;"));
    assert!(!text.contains("wire a;"));
    assert!(!text.contains("wire c;"));
}

#[test]
fn test_include_replay_equivalence() {
    let provider = CountingProvider::new(
        InMemoryProvider::new().with_file("/rtl/defs.svh", "`define A 1\n`define B(x) x+`A\n"),
    );
    let reads = provider.reads.clone();
    let mut session = Session::with_provider(ParseOptions::default(), provider);

    let once = session.preprocess("/rtl/a.sv", "`include \"defs.svh\"\n");
    let twice = session.preprocess(
        "/rtl/b.sv",
        "`include \"defs.svh\"\n`include \"defs.svh\"\n`B(2)\n",
    );
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(once.macros, twice.macros);
    assert!(twice.text().contains("2+1"));
    assert_eq!(twice.includes, vec!["/rtl/defs.svh"]);
}

#[test]
fn test_recursive_expansion_reaches_fixed_point() {
    let mut session = session(InMemoryProvider::new());
    let out = session.preprocess(
        "/rtl/top.sv",
        "`define INNER 4\n`define MID (`INNER + 1)\n`define OUTER `MID * 2\nx = `OUTER;\n",
    );
    assert!(out.text().contains("x = (4 + 1) * 2;"));
    assert!(!out.text().contains('`'));
}

#[test]
fn test_self_recursive_macro_is_bounded() {
    let options = ParseOptions::builder().max_macro_depth(16).build();
    let mut session = Session::with_provider(options, InMemoryProvider::new());
    let out = session.preprocess("/rtl/top.sv", "`define LOOP `LOOP\n`LOOP\nwire ok;\n");
    assert!(out.text().contains("wire ok;"));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.kind == SvErrorKind::Limit));
}

#[test]
fn test_empty_actual_uses_default() {
    let mut session = session(InMemoryProvider::new());
    let out = session.preprocess(
        "/rtl/top.sv",
        "`define ADD(a, b=1) a+b\nx = `ADD(2, );\ny = `ADD( 3 ,  4 );\n",
    );
    let text = out.text();
    assert!(text.contains("x = 2+1;"));
    assert!(text.contains("y = 3+4;"));
}

#[test]
fn test_missing_include_degrades() {
    let mut session = session(InMemoryProvider::new());
    let out = session.parse("/rtl/top.sv", "`include \"nope.svh\"\nmodule m; endmodule\n");
    assert!(out.symbols.find_container(&["m"]).is_some());
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, SvErrorKind::Include);
}

// =============================================================================
// Table and Encoding Scenarios
// =============================================================================

#[test]
fn test_symbol_dedup_across_parses() {
    let text = "module m;\n  typedef enum {A, B} e_t;\n  e_t state;\nendmodule\n";
    let mut session = session(InMemoryProvider::new());
    let mut table = SymbolTable::new();
    let first = session.parse_into("/rtl/m.sv", text, &mut table);
    let nodes = table.node_count();
    for _ in 0..3 {
        let again = session.parse_into("/rtl/m.sv", text, &mut table);
        assert_eq!(again.symbols, first.symbols);
    }
    assert_eq!(table.node_count(), nodes);
}

#[test]
fn test_cached_table_continues_parse() {
    let text = "module m;\n  wire w;\nendmodule\n";
    let mut session = session(InMemoryProvider::new());
    let first = session.parse("/rtl/m.sv", text);

    let json = first.symbols.to_json();
    let cached = FileSymbolsInfo::load_cached(&json).unwrap();
    assert_eq!(cached, first.symbols);

    let mut table = SymbolTable::from_file_info(&cached);
    let again = session.parse_into("/rtl/m.sv", text, &mut table);
    assert_eq!(again.symbols, first.symbols);
}

#[test]
fn test_load_cached_rejects_bad_shape() {
    assert!(FileSymbolsInfo::load_cached("{\"not\": \"an array\"}").is_none());
    assert!(FileSymbolsInfo::load_cached("not json").is_none());
}

#[test]
fn test_token_limit_reported() {
    let limits = Limits {
        max_tokens: 3,
        ..Limits::default()
    };
    let options = ParseOptions::builder().limits(limits).build();
    let mut session = Session::with_provider(options, InMemoryProvider::new());
    let out = session.parse("/rtl/m.sv", "module m; wire w; endmodule\n");
    assert!(out.diagnostics.iter().any(|d| d.kind == SvErrorKind::Limit));
}
