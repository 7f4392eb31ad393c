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

//! Compact positional encoding of symbol data.
//!
//! Every record is a JSON array whose elements sit at fixed positions.
//! Optional elements at the end are left out entirely; an absent element
//! followed by a present one is written as `null`. Empty lists count as
//! absent.
//!
//! | Record                 | Layout                                              |
//! |------------------------|-----------------------------------------------------|
//! | range                  | `[startLine, startChar, endLine, endChar]`          |
//! | definition (one file)  | range                                               |
//! | definition (multi)     | `[file, range, file, range, ...]`                   |
//! | declaration            | range, or `[file, range]` for another file         |
//! | symbol                 | `[name, tag, definition, declaration?, detail?]`    |
//! | container              | `[symbol, scope?]`                                  |
//! | scope                  | `[symbols?, imports?, exports?, containers?]`       |
//! | file                   | `[symbols?, imports?, exports?, containers?, includes?]` |
//!
//! Container paths are not stored; they are rebuilt from the nesting on
//! decode.

use super::model::{
    Container, ContainerSymbolsInfo, Definition, FileSymbolsInfo, Location, Symbol, SymbolKind,
};
use crate::position::{Position, Range};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors decoding the compact encoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value had the wrong JSON type.
    #[error("expected {expected} for {what}")]
    Shape {
        what: &'static str,
        expected: &'static str,
    },

    /// A required element was missing.
    #[error("missing element {index} of {what}")]
    Missing { what: &'static str, index: usize },

    /// A symbol tag did not name a known kind.
    #[error("unknown symbol tag {0:?}")]
    UnknownTag(Vec<String>),
}

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Drop trailing `null`s left by absent optional elements.
fn compact(mut items: Vec<Value>) -> Value {
    while matches!(items.last(), Some(Value::Null)) {
        items.pop();
    }
    Value::Array(items)
}

fn optional_list(items: Vec<Value>) -> Value {
    if items.is_empty() {
        Value::Null
    } else {
        Value::Array(items)
    }
}

fn strings(items: &[String]) -> Vec<Value> {
    items.iter().map(|s| Value::String(s.clone())).collect()
}

pub fn encode_range(range: &Range) -> Value {
    Value::Array(vec![
        range.start.line.into(),
        range.start.character.into(),
        range.end.line.into(),
        range.end.character.into(),
    ])
}

pub fn encode_definition(definition: &Definition) -> Value {
    match definition {
        Definition::Single(range) => encode_range(range),
        Definition::Multi(segments) => Value::Array(
            segments
                .iter()
                .flat_map(|(file, range)| [Value::String(file.clone()), encode_range(range)])
                .collect(),
        ),
    }
}

fn encode_location(location: &Location) -> Value {
    match &location.file {
        None => encode_range(&location.range),
        Some(file) => Value::Array(vec![Value::String(file.clone()), encode_range(&location.range)]),
    }
}

pub fn encode_symbol(symbol: &Symbol) -> Value {
    compact(vec![
        Value::String(symbol.name.clone()),
        Value::Array(strings(&symbol.kind.tag())),
        encode_definition(&symbol.definition),
        symbol.declaration.as_ref().map_or(Value::Null, encode_location),
        symbol
            .kind
            .detail()
            .map_or(Value::Null, |d| Value::String(d.to_string())),
    ])
}

fn encode_scope_items(info: &ContainerSymbolsInfo) -> Vec<Value> {
    vec![
        optional_list(info.symbols.iter().map(encode_symbol).collect()),
        optional_list(strings(&info.imports)),
        optional_list(strings(&info.exports)),
        optional_list(info.containers.iter().map(encode_container).collect()),
    ]
}

pub fn encode_container(container: &Container) -> Value {
    let scope = if container.info.is_empty() {
        Value::Null
    } else {
        compact(encode_scope_items(&container.info))
    };
    compact(vec![encode_symbol(&container.symbol), scope])
}

pub fn encode_file(info: &FileSymbolsInfo) -> Value {
    compact(vec![
        optional_list(info.symbols.iter().map(encode_symbol).collect()),
        optional_list(strings(&info.imports)),
        optional_list(strings(&info.exports)),
        optional_list(info.containers.iter().map(encode_container).collect()),
        optional_list(strings(&info.includes)),
    ])
}

fn as_array<'a>(value: &'a Value, what: &'static str) -> DecodeResult<&'a Vec<Value>> {
    value.as_array().ok_or(DecodeError::Shape {
        what,
        expected: "an array",
    })
}

fn as_str<'a>(value: &'a Value, what: &'static str) -> DecodeResult<&'a str> {
    value.as_str().ok_or(DecodeError::Shape {
        what,
        expected: "a string",
    })
}

fn as_u32(value: &Value, what: &'static str) -> DecodeResult<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(DecodeError::Shape {
            what,
            expected: "a line or column number",
        })
}

/// Element `index`, treating `null` and out-of-range as absent.
fn element(items: &[Value], index: usize) -> Option<&Value> {
    items.get(index).filter(|v| !v.is_null())
}

fn required<'a>(items: &'a [Value], index: usize, what: &'static str) -> DecodeResult<&'a Value> {
    element(items, index).ok_or(DecodeError::Missing { what, index })
}

fn decode_strings(value: Option<&Value>, what: &'static str) -> DecodeResult<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(value) => as_array(value, what)?
            .iter()
            .map(|v| as_str(v, what).map(str::to_string))
            .collect(),
    }
}

pub fn decode_range(value: &Value) -> DecodeResult<Range> {
    let items = as_array(value, "range")?;
    if items.len() != 4 {
        return Err(DecodeError::Shape {
            what: "range",
            expected: "four numbers",
        });
    }
    Ok(Range::new(
        Position::new(as_u32(&items[0], "range")?, as_u32(&items[1], "range")?),
        Position::new(as_u32(&items[2], "range")?, as_u32(&items[3], "range")?),
    ))
}

pub fn decode_definition(value: &Value) -> DecodeResult<Definition> {
    let items = as_array(value, "definition")?;
    if !items.first().is_some_and(Value::is_string) {
        return decode_range(value).map(Definition::Single);
    }
    if items.len() % 2 != 0 {
        return Err(DecodeError::Shape {
            what: "definition",
            expected: "file and range pairs",
        });
    }
    items
        .chunks(2)
        .map(|pair| Ok((as_str(&pair[0], "definition")?.to_string(), decode_range(&pair[1])?)))
        .collect::<DecodeResult<Vec<_>>>()
        .map(Definition::Multi)
}

fn decode_location(value: &Value) -> DecodeResult<Location> {
    let items = as_array(value, "declaration")?;
    match items.first() {
        Some(Value::String(file)) => {
            let range = decode_range(required(items, 1, "declaration")?)?;
            Ok(Location::in_file(file.clone(), range))
        }
        _ => decode_range(value).map(Location::local),
    }
}

fn decode_symbol(value: &Value, path: &[String]) -> DecodeResult<Symbol> {
    let items = as_array(value, "symbol")?;
    let name = as_str(required(items, 0, "symbol")?, "symbol name")?;
    let tag = decode_strings(Some(required(items, 1, "symbol")?), "symbol tag")?;
    let definition = decode_definition(required(items, 2, "symbol")?)?;
    let declaration = element(items, 3).map(decode_location).transpose()?;
    let detail = element(items, 4)
        .map(|v| as_str(v, "symbol detail"))
        .transpose()?;
    let kind = SymbolKind::from_tag(&tag, detail).ok_or_else(|| DecodeError::UnknownTag(tag.clone()))?;
    Ok(Symbol {
        name: name.to_string(),
        kind,
        definition,
        declaration,
        container_path: path.to_vec(),
    })
}

fn decode_scope(items: &[Value], path: &[String]) -> DecodeResult<ContainerSymbolsInfo> {
    let symbols = match element(items, 0) {
        None => Vec::new(),
        Some(v) => as_array(v, "symbols")?
            .iter()
            .map(|s| decode_symbol(s, path))
            .collect::<DecodeResult<_>>()?,
    };
    let containers = match element(items, 3) {
        None => Vec::new(),
        Some(v) => as_array(v, "containers")?
            .iter()
            .map(|c| decode_container(c, path))
            .collect::<DecodeResult<_>>()?,
    };
    Ok(ContainerSymbolsInfo {
        symbols,
        imports: decode_strings(element(items, 1), "imports")?,
        exports: decode_strings(element(items, 2), "exports")?,
        containers,
    })
}

pub fn decode_container(value: &Value, path: &[String]) -> DecodeResult<Container> {
    let items = as_array(value, "container")?;
    let symbol = decode_symbol(required(items, 0, "container")?, path)?;
    let mut inner = path.to_vec();
    inner.push(symbol.name.clone());
    let info = match element(items, 1) {
        None => ContainerSymbolsInfo::default(),
        Some(scope) => decode_scope(as_array(scope, "container scope")?, &inner)?,
    };
    Ok(Container { symbol, info })
}

pub fn decode_file(value: &Value) -> DecodeResult<FileSymbolsInfo> {
    let items = as_array(value, "file")?;
    let scope = decode_scope(items, &[])?;
    Ok(FileSymbolsInfo {
        symbols: scope.symbols,
        imports: scope.imports,
        exports: scope.exports,
        containers: scope.containers,
        includes: decode_strings(element(items, 4), "includes")?,
    })
}

impl FileSymbolsInfo {
    /// Encode as a compact JSON value.
    pub fn to_value(&self) -> Value {
        encode_file(self)
    }

    /// Decode from a compact JSON value.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        decode_file(value)
    }

    /// Encode as a compact JSON string.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Decode from a compact JSON string.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        decode_file(&value)
    }

    /// Decode cached data, logging and discarding anything malformed.
    pub fn load_cached(json: &str) -> Option<Self> {
        match Self::from_json(json) {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(error = %err, "discarding malformed cached symbols");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    fn sample() -> FileSymbolsInfo {
        let module = Container {
            symbol: Symbol::new("m", SymbolKind::Module)
                .with_definition(Definition::Single(range(1, 0, 1, 62)))
                .with_declaration(Location::local(range(1, 7, 1, 8))),
            info: ContainerSymbolsInfo {
                symbols: vec![Symbol {
                    name: "a".into(),
                    kind: SymbolKind::Port {
                        data_type: Some("[W-1:0]".into()),
                    },
                    definition: Definition::Multi(vec![
                        ("top.sv".into(), range(1, 30, 1, 40)),
                        ("defs.svh".into(), range(0, 0, 0, 5)),
                    ]),
                    declaration: None,
                    container_path: vec!["m".into()],
                }],
                imports: vec!["pkg::*".into()],
                ..Default::default()
            },
        };
        FileSymbolsInfo {
            symbols: vec![Symbol::new("WIDTH", SymbolKind::Macro {
                replacement: "8".into(),
            })
            .with_definition(Definition::Single(range(0, 0, 0, 15)))],
            containers: vec![module],
            includes: vec!["defs.svh".into()],
            ..Default::default()
        }
    }

    // ==================== Encoding shape tests ====================

    #[test]
    fn test_range_encoding() {
        assert_eq!(encode_range(&range(1, 2, 3, 4)), json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_multi_file_definition_alternates() {
        let def = Definition::Multi(vec![
            ("a.sv".into(), range(0, 0, 0, 1)),
            ("b.sv".into(), range(2, 0, 2, 3)),
        ]);
        assert_eq!(
            encode_definition(&def),
            json!(["a.sv", [0, 0, 0, 1], "b.sv", [2, 0, 2, 3]])
        );
    }

    #[test]
    fn test_trailing_absent_fields_are_omitted() {
        let symbol = Symbol::new("W", SymbolKind::Parameter);
        assert_eq!(encode_symbol(&symbol), json!(["W", ["parameter"], [0, 0, 0, 0]]));
    }

    #[test]
    fn test_middle_absent_field_is_null() {
        let symbol = Symbol::new("M", SymbolKind::Macro {
            replacement: "1".into(),
        });
        assert_eq!(
            encode_symbol(&symbol),
            json!(["M", ["macro"], [0, 0, 0, 0], null, "1"])
        );
    }

    #[test]
    fn test_file_with_only_includes() {
        let info = FileSymbolsInfo {
            includes: vec!["x.svh".into()],
            ..Default::default()
        };
        assert_eq!(encode_file(&info), json!([null, null, null, null, ["x.svh"]]));
        assert_eq!(encode_file(&FileSymbolsInfo::default()), json!([]));
    }

    // ==================== Decoding tests ====================

    #[test]
    fn test_roundtrip_rebuilds_container_paths() {
        let info = sample();
        let decoded = FileSymbolsInfo::from_json(&info.to_json()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.containers[0].info.symbols[0].container_path, vec!["m"]);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(matches!(
            decode_range(&json!([1, 2, 3])),
            Err(DecodeError::Shape { .. })
        ));
        assert!(matches!(
            decode_file(&json!([[["x", ["bogus"], [0, 0, 0, 0]]]])),
            Err(DecodeError::UnknownTag(_))
        ));
        assert!(matches!(
            decode_file(&json!([[["x"]]])),
            Err(DecodeError::Missing { index: 1, .. })
        ));
    }

    #[test]
    fn test_load_cached_swallows_errors() {
        assert!(FileSymbolsInfo::load_cached("{not json").is_none());
        assert!(FileSymbolsInfo::load_cached("{}").is_none());
        assert_eq!(FileSymbolsInfo::load_cached("[]"), Some(FileSymbolsInfo::default()));
    }
}
