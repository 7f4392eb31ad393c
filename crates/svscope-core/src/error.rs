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

//! Error types for the svscope front end.
//!
//! Almost nothing in the pipeline is fatal. Preprocessing and parsing always
//! produce a result; the problems they run into are recorded as [`SvError`]
//! diagnostics on the output and logged through `tracing`. Only grammar
//! construction and decoding of cached symbol data return `Err`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of problem that was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SvErrorKind {
    /// A grammar violated the tokenizer contract.
    Grammar,
    /// Reading a file failed.
    Io,
    /// An `` `include`` could not be resolved.
    Include,
    /// A file transitively included itself.
    IncludeCycle,
    /// A macro invocation could not be expanded as written.
    Macro,
    /// A configured resource limit was hit.
    Limit,
    /// Cached symbol data had an unexpected shape.
    Encoding,
}

impl fmt::Display for SvErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grammar => write!(f, "GrammarError"),
            Self::Io => write!(f, "IOError"),
            Self::Include => write!(f, "IncludeError"),
            Self::IncludeCycle => write!(f, "IncludeCycleError"),
            Self::Macro => write!(f, "MacroError"),
            Self::Limit => write!(f, "LimitError"),
            Self::Encoding => write!(f, "EncodingError"),
        }
    }
}

/// A diagnostic produced while preprocessing or parsing a file.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind}{}: {message}", location_suffix(.file, .offset))]
pub struct SvError {
    /// The kind of error.
    pub kind: SvErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// File the error was found in, if known.
    pub file: Option<String>,
    /// Byte offset within `file`, if known.
    pub offset: Option<usize>,
}

fn location_suffix(file: &Option<String>, offset: &Option<usize>) -> String {
    match (file, offset) {
        (Some(file), Some(offset)) => format!(" in {} at byte {}", file, offset),
        (Some(file), None) => format!(" in {}", file),
        (None, Some(offset)) => format!(" at byte {}", offset),
        (None, None) => String::new(),
    }
}

impl SvError {
    /// Create a new error.
    pub fn new(kind: SvErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            offset: None,
        }
    }

    /// Attach the file the error belongs to.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a byte offset within the file.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn grammar(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Grammar, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Io, message)
    }

    pub fn include(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Include, message)
    }

    pub fn include_cycle(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::IncludeCycle, message)
    }

    pub fn macro_error(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Macro, message)
    }

    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Limit, message)
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(SvErrorKind::Encoding, message)
    }
}

/// Result type for svscope operations.
pub type SvResult<T> = Result<T, SvError>;
