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

//! Symbol indexing front end for SystemVerilog.
//!
//! Source text goes through three stages:
//!
//! - the [`tokenizer`] engine, driven by the two shipped [`grammars`];
//! - the [`preprocessor`], which expands macros, splices `` `include``s and
//!   evaluates conditional compilation while keeping every token's origin;
//! - the structural [`parser`], which walks the preprocessed text and builds
//!   a hierarchy of [`Symbol`]s with their source ranges.
//!
//! A [`Session`] ties the stages together and carries the include cache
//! across the files of one indexing run.
//!
//! # Example
//!
//! ```
//! use svscope_core::{InMemoryProvider, ParseOptions, Session, SymbolKind};
//!
//! let mut session = Session::with_provider(ParseOptions::default(), InMemoryProvider::new());
//! let out = session.parse("top.sv", "module top(input logic clk); endmodule\n");
//! let top = out.symbols.find_container(&["top"]).unwrap();
//! assert_eq!(top.symbol.kind, SymbolKind::Module);
//! assert!(top.info.symbol("clk").is_some());
//! ```

mod error;
pub mod grammars;
mod limits;
mod options;
pub mod parser;
pub mod position;
pub mod preprocessor;
mod session;
pub mod source;
pub mod symbols;
pub mod tokenizer;

pub use error::{SvError, SvErrorKind, SvResult};
pub use limits::Limits;
pub use options::{ParseOptions, ParseOptionsBuilder, UserDefine};
pub use parser::{parse_preprocessed, ParseOutput};
pub use position::{LineIndex, Position, Range};
pub use preprocessor::{IncludeCache, PreprocOutput};
pub use session::Session;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use symbols::{
    Container, ContainerSymbolsInfo, Definition, FileSymbolsInfo, Location, Symbol, SymbolKind,
    SymbolTable,
};
