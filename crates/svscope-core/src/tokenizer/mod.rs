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

//! Grammar-driven tokenizer.
//!
//! Both front-end passes (preprocessing and structural parsing) are driven
//! by the same engine: a stack machine over named contexts whose patterns
//! are anchored regular expressions. The engine never fails on input text;
//! every byte ends up in exactly one token.

mod engine;
mod grammar;

pub use engine::Token;
pub use grammar::{
    ContextDef, ContextRef, Grammar, GrammarBuilder, GrammarError, PatternDef, Scope,
    StateAction, DEFAULT_INVALID_SCOPE, MAIN_CONTEXT,
};
