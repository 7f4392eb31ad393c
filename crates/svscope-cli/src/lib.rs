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

//! svscope command-line driver.
//!
//! A thin layer over `svscope-core` for looking at what the indexer sees.
//!
//! # Commands
//!
//! ## Inspection
//!
//! - **tokens**: token stream of a file under either shipped grammar
//! - **preprocess**: file text after macro expansion, includes and
//!   conditional compilation
//! - **symbols**: symbol tree of a file, or its compact JSON encoding
//!
//! ## Batch
//!
//! - **index**: index many files, optionally in parallel, into a JSON report
//!
//! ## Utilities
//!
//! - **completion**: shell completion scripts (bash, zsh, fish, powershell, elvish)
//!
//! Every command accepts `-I DIR` include paths, `-D NAME[=VALUE]` defines
//! and `-v` for debug logging.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::PathBuf;
//! use svscope_cli::commands::index_files;
//! use svscope_core::ParseOptions;
//!
//! let options = ParseOptions::builder().include_path("rtl/include").build();
//! let files = vec![PathBuf::from("rtl/top.sv"), PathBuf::from("rtl/core.sv")];
//! let report = index_files(&files, true, &options);
//! println!("{} indexed, {} failed", report.indexed, report.failed);
//! ```

pub mod cli;
pub mod commands;
pub mod error;

pub use error::CliError;
