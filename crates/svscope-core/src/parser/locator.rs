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

//! Mapping preprocessed offsets back to source files.

use crate::position::{LineIndex, Range};
use crate::preprocessor::PreprocOutput;
use crate::symbols::{Definition, Location};
use std::sync::Arc;

/// A contiguous byte span of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) file: Arc<str>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    run: usize,
}

/// Resolves spans of the preprocessed text to `(file, range)` segments.
pub(crate) struct Locator<'a> {
    output: &'a PreprocOutput,
    /// Offset of each post token in the preprocessed text.
    starts: Vec<usize>,
}

impl<'a> Locator<'a> {
    pub(crate) fn new(output: &'a PreprocOutput) -> Self {
        let mut starts = Vec::with_capacity(output.post_tokens.len());
        let mut offset = 0;
        for token in &output.post_tokens {
            starts.push(offset);
            offset += token.text.len();
        }
        Self { output, starts }
    }

    /// Index of the post token covering preprocessed `offset`.
    fn post_index(&self, offset: usize) -> Option<usize> {
        self.starts
            .partition_point(|&start| start <= offset)
            .checked_sub(1)
    }

    /// Index of the origin run containing post token `index`.
    fn run_of(&self, index: usize) -> Option<usize> {
        self.output
            .token_order
            .partition_point(|o| o.start <= index)
            .checked_sub(1)
    }

    /// Source segments covering preprocessed bytes `start..end`.
    ///
    /// Tokens extend the current segment while they stay in the same file
    /// and either continue its run without going backwards or pick up
    /// exactly where it ended.
    pub(crate) fn segments(&self, start: usize, end: usize) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let (Some(first), Some(last)) = (
            self.post_index(start),
            self.post_index(end.saturating_sub(1).max(start)),
        ) else {
            return segments;
        };
        for index in first..=last {
            let (Some(token), Some(run)) = (self.output.post_tokens.get(index), self.run_of(index))
            else {
                continue;
            };
            let file = &self.output.token_order[run].file;
            match segments.last_mut() {
                Some(seg)
                    if seg.file == *file
                        && ((seg.run == run && token.start >= seg.start)
                            || token.start == seg.end) =>
                {
                    seg.end = seg.end.max(token.end);
                    seg.run = run;
                }
                _ => segments.push(Segment {
                    file: file.clone(),
                    start: token.start,
                    end: token.end,
                    run,
                }),
            }
        }
        segments
    }

    fn range(&self, file: &Arc<str>, start: usize, end: usize) -> Range {
        match self.output.sources.get(file) {
            Some(index) => index.range(start, end),
            None => Range::default(),
        }
    }

    fn is_document(&self, file: &Arc<str>) -> bool {
        *file == self.output.file
    }

    /// Definition of a declaration covering preprocessed `start..end`.
    pub(crate) fn definition(&self, start: usize, end: usize) -> Definition {
        let segments = self.segments(start, end);
        match segments.as_slice() {
            [] => Definition::default(),
            [only] if self.is_document(&only.file) => {
                Definition::Single(self.range(&only.file, only.start, only.end))
            }
            _ => Definition::Multi(
                segments
                    .iter()
                    .map(|s| (s.file.to_string(), self.range(&s.file, s.start, s.end)))
                    .collect(),
            ),
        }
    }

    /// Location of a name token.
    pub(crate) fn location(&self, start: usize, end: usize) -> Option<Location> {
        let segment = self.segments(start, end).into_iter().next()?;
        let range = self.range(&segment.file, segment.start, segment.end);
        Some(if self.is_document(&segment.file) {
            Location::local(range)
        } else {
            Location::in_file(segment.file.to_string(), range)
        })
    }

    /// `file:line:column` of a preprocessed offset, for log messages.
    pub(crate) fn describe(&self, offset: usize) -> String {
        match self.segments(offset, offset + 1).first() {
            Some(segment) => {
                let position = self
                    .output
                    .sources
                    .get(&segment.file)
                    .map(|index: &LineIndex| index.position(segment.start))
                    .unwrap_or_default();
                format!(
                    "{}:{}:{}",
                    segment.file,
                    position.line + 1,
                    position.character + 1
                )
            }
            None => format!("{}:?", self.output.file),
        }
    }
}
