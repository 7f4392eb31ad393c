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

//! Symbol records produced by the preprocessor and the parser.

use crate::position::Range;

/// What a symbol is, with the data that goes with each kind.
///
/// [`SymbolKind::tag`] renders the kind as the string list consumers
/// match on, discriminator first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Interface,
    Program,
    Package,
    Function { return_type: Option<String> },
    Task,
    /// A header or body port; `data_type` is the declared type text.
    Port { data_type: Option<String> },
    /// A parameter in a `#( ... )` header list.
    ParameterPort,
    Parameter,
    Localparam,
    Variable { data_type: String },
    Net { net_type: String },
    Instance { module_type: String },
    Typedef { aliased_type: String },
    Struct,
    Union,
    Enum,
    EnumMember,
    /// A member of a struct or union body.
    Field { data_type: String },
    Modport,
    Genvar,
    GenerateBlock,
    Class,
    Covergroup,
    Property,
    Sequence,
    Checker,
    Clocking,
    Primitive,
    Config,
    Let,
    Nettype,
    Macro { replacement: String },
}

impl SymbolKind {
    /// The type tag list.
    pub fn tag(&self) -> Vec<String> {
        let mut tag = vec![self.discriminator().to_string()];
        match self {
            SymbolKind::Variable { data_type } | SymbolKind::Field { data_type } => {
                tag.push(data_type.clone())
            }
            SymbolKind::Net { net_type } => tag.push(net_type.clone()),
            SymbolKind::Instance { module_type } => tag.push(module_type.clone()),
            SymbolKind::Typedef { aliased_type } => tag.push(aliased_type.clone()),
            _ => {}
        }
        tag
    }

    /// First element of the tag.
    pub fn discriminator(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Interface => "interface",
            SymbolKind::Program => "program",
            SymbolKind::Package => "package",
            SymbolKind::Function { .. } => "function",
            SymbolKind::Task => "task",
            SymbolKind::Port { .. } => "port",
            SymbolKind::ParameterPort => "parameter-port",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Localparam => "localparam",
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Net { .. } => "net",
            SymbolKind::Instance { .. } => "instance",
            SymbolKind::Typedef { .. } => "typedef",
            SymbolKind::Struct => "struct",
            SymbolKind::Union => "union",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum-member",
            SymbolKind::Field { .. } => "field",
            SymbolKind::Modport => "modport",
            SymbolKind::Genvar => "genvar",
            SymbolKind::GenerateBlock => "generate-block",
            SymbolKind::Class => "class",
            SymbolKind::Covergroup => "covergroup",
            SymbolKind::Property => "property",
            SymbolKind::Sequence => "sequence",
            SymbolKind::Checker => "checker",
            SymbolKind::Clocking => "clocking",
            SymbolKind::Primitive => "primitive",
            SymbolKind::Config => "config",
            SymbolKind::Let => "let",
            SymbolKind::Nettype => "nettype",
            SymbolKind::Macro { .. } => "macro",
        }
    }

    /// Extra text that is not part of the tag (port type, return type,
    /// macro replacement).
    pub fn detail(&self) -> Option<&str> {
        match self {
            SymbolKind::Port { data_type } => data_type.as_deref(),
            SymbolKind::Function { return_type } => return_type.as_deref(),
            SymbolKind::Macro { replacement } => Some(replacement.as_str()),
            _ => None,
        }
    }

    /// Rebuild a kind from its tag and detail text.
    pub fn from_tag(tag: &[String], detail: Option<&str>) -> Option<SymbolKind> {
        let arg = || tag.get(1).cloned().unwrap_or_default();
        let detail = detail.map(str::to_string);
        let kind = match tag.first()?.as_str() {
            "module" => SymbolKind::Module,
            "interface" => SymbolKind::Interface,
            "program" => SymbolKind::Program,
            "package" => SymbolKind::Package,
            "function" => SymbolKind::Function {
                return_type: detail,
            },
            "task" => SymbolKind::Task,
            "port" => SymbolKind::Port { data_type: detail },
            "parameter-port" => SymbolKind::ParameterPort,
            "parameter" => SymbolKind::Parameter,
            "localparam" => SymbolKind::Localparam,
            "variable" => SymbolKind::Variable { data_type: arg() },
            "net" => SymbolKind::Net { net_type: arg() },
            "instance" => SymbolKind::Instance { module_type: arg() },
            "typedef" => SymbolKind::Typedef {
                aliased_type: arg(),
            },
            "struct" => SymbolKind::Struct,
            "union" => SymbolKind::Union,
            "enum" => SymbolKind::Enum,
            "enum-member" => SymbolKind::EnumMember,
            "field" => SymbolKind::Field { data_type: arg() },
            "modport" => SymbolKind::Modport,
            "genvar" => SymbolKind::Genvar,
            "generate-block" => SymbolKind::GenerateBlock,
            "class" => SymbolKind::Class,
            "covergroup" => SymbolKind::Covergroup,
            "property" => SymbolKind::Property,
            "sequence" => SymbolKind::Sequence,
            "checker" => SymbolKind::Checker,
            "clocking" => SymbolKind::Clocking,
            "primitive" => SymbolKind::Primitive,
            "config" => SymbolKind::Config,
            "let" => SymbolKind::Let,
            "nettype" => SymbolKind::Nettype,
            "macro" => SymbolKind::Macro {
                replacement: detail.unwrap_or_default(),
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for kinds that own a nested symbol scope.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            SymbolKind::Module
                | SymbolKind::Interface
                | SymbolKind::Program
                | SymbolKind::Package
                | SymbolKind::Function { .. }
                | SymbolKind::Task
                | SymbolKind::Typedef { .. }
                | SymbolKind::Struct
                | SymbolKind::Union
                | SymbolKind::Enum
        )
    }
}

/// A range in a specific file; `file` is `None` for the file being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Option<String>,
    pub range: Range,
}

impl Location {
    pub fn local(range: Range) -> Self {
        Self { file: None, range }
    }

    pub fn in_file(file: impl Into<String>, range: Range) -> Self {
        Self {
            file: Some(file.into()),
            range,
        }
    }
}

/// Where a symbol's declaration text lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Definition {
    /// One range in the file being parsed.
    Single(Range),
    /// Ordered `(file, range)` segments, each in its own file's coordinates.
    Multi(Vec<(String, Range)>),
}

impl Default for Definition {
    fn default() -> Self {
        Definition::Single(Range::default())
    }
}

impl Definition {
    /// Returns true if the definition spans more than one segment or lives
    /// in another file.
    pub fn is_multi(&self) -> bool {
        matches!(self, Definition::Multi(_))
    }

    /// Distinct files named by a multi-file definition, in order.
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        if let Definition::Multi(segments) = self {
            for (file, _) in segments {
                if !files.contains(&file.as_str()) {
                    files.push(file);
                }
            }
        }
        files
    }
}

/// A named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the whole declaration.
    pub definition: Definition,
    /// Range of the declared name.
    pub declaration: Option<Location>,
    /// Names of the enclosing containers, outermost first.
    pub container_path: Vec<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            definition: Definition::default(),
            declaration: None,
            container_path: Vec::new(),
        }
    }

    pub fn with_definition(mut self, definition: Definition) -> Self {
        self.definition = definition;
        self
    }

    pub fn with_declaration(mut self, declaration: Location) -> Self {
        self.declaration = Some(declaration);
        self
    }

    /// Shorthand for `self.kind.tag()`.
    pub fn tag(&self) -> Vec<String> {
        self.kind.tag()
    }

    /// Returns true if `other` names the same declaration.
    pub fn same_key(&self, other: &Symbol) -> bool {
        self.name == other.name
            && self.kind.tag() == other.kind.tag()
            && self.container_path == other.container_path
    }
}

/// A container symbol with its own nested scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub symbol: Symbol,
    pub info: ContainerSymbolsInfo,
}

/// The contents of one container scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSymbolsInfo {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub containers: Vec<Container>,
}

impl ContainerSymbolsInfo {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
            && self.containers.is_empty()
    }

    /// Look up a direct leaf symbol by name.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Look up a direct child container by name.
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.symbol.name == name)
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSymbolsInfo {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub containers: Vec<Container>,
    /// Resolved paths of every file pulled in through `` `include``.
    pub includes: Vec<String>,
}

impl FileSymbolsInfo {
    /// Find a container by path, e.g. `["top", "my_func"]`.
    pub fn find_container(&self, path: &[&str]) -> Option<&Container> {
        let (first, rest) = path.split_first()?;
        let mut current = self.containers.iter().find(|c| c.symbol.name == *first)?;
        for name in rest {
            current = current.info.container(name)?;
        }
        Some(current)
    }

    /// Every symbol in the file, depth first: top-level symbols, then each
    /// container followed by its contents.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        fn walk<'a>(containers: &'a [Container], out: &mut Vec<&'a Symbol>) {
            for container in containers {
                out.push(&container.symbol);
                out.extend(container.info.symbols.iter());
                walk(&container.info.containers, out);
            }
        }
        let mut out: Vec<&Symbol> = self.symbols.iter().collect();
        walk(&self.containers, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn tag(kind: &SymbolKind) -> Vec<String> {
        kind.tag()
    }

    // ==================== SymbolKind tests ====================

    #[test]
    fn test_tags() {
        assert_eq!(tag(&SymbolKind::Module), vec!["module"]);
        assert_eq!(tag(&SymbolKind::Port { data_type: Some("logic".into()) }), vec!["port"]);
        assert_eq!(tag(&SymbolKind::ParameterPort), vec!["parameter-port"]);
        assert_eq!(
            tag(&SymbolKind::Variable { data_type: "logic [3:0]".into() }),
            vec!["variable", "logic [3:0]"]
        );
        assert_eq!(
            tag(&SymbolKind::Instance { module_type: "fifo".into() }),
            vec!["instance", "fifo"]
        );
        assert_eq!(
            tag(&SymbolKind::Macro { replacement: "8".into() }),
            vec!["macro"]
        );
    }

    #[test]
    fn test_from_tag_roundtrip() {
        let kinds = [
            SymbolKind::Interface,
            SymbolKind::Function { return_type: Some("int".into()) },
            SymbolKind::Port { data_type: None },
            SymbolKind::Typedef { aliased_type: "struct".into() },
            SymbolKind::Field { data_type: "bit".into() },
            SymbolKind::Macro { replacement: "a + b".into() },
        ];
        for kind in kinds {
            let rebuilt = SymbolKind::from_tag(&kind.tag(), kind.detail()).unwrap();
            assert_eq!(rebuilt, kind);
        }
    }

    #[test]
    fn test_from_tag_unknown() {
        assert!(SymbolKind::from_tag(&["bogus".to_string()], None).is_none());
        assert!(SymbolKind::from_tag(&[], None).is_none());
    }

    #[test]
    fn test_container_kinds() {
        assert!(SymbolKind::Package.is_container());
        assert!(SymbolKind::Task.is_container());
        assert!(!SymbolKind::Class.is_container());
        assert!(!SymbolKind::Variable { data_type: "int".into() }.is_container());
    }

    // ==================== Symbol tests ====================

    #[test]
    fn test_same_key_ignores_location() {
        let range = Range::new(Position::new(1, 0), Position::new(1, 4));
        let a = Symbol::new("a", SymbolKind::Parameter);
        let b = Symbol::new("a", SymbolKind::Parameter).with_definition(Definition::Single(range));
        let c = Symbol::new("a", SymbolKind::Localparam);
        assert!(a.same_key(&b));
        assert!(!a.same_key(&c));
    }

    #[test]
    fn test_definition_files() {
        let r = Range::default();
        let def = Definition::Multi(vec![
            ("a.sv".into(), r),
            ("b.svh".into(), r),
            ("a.sv".into(), r),
        ]);
        assert_eq!(def.files(), vec!["a.sv", "b.svh"]);
        assert!(def.is_multi());
        assert!(Definition::Single(r).files().is_empty());
    }

    // ==================== FileSymbolsInfo tests ====================

    #[test]
    fn test_find_container_and_all_symbols() {
        let inner = Container {
            symbol: Symbol::new("f", SymbolKind::Task),
            info: ContainerSymbolsInfo {
                symbols: vec![Symbol::new("x", SymbolKind::Port { data_type: None })],
                ..Default::default()
            },
        };
        let top = Container {
            symbol: Symbol::new("top", SymbolKind::Module),
            info: ContainerSymbolsInfo {
                symbols: vec![Symbol::new("W", SymbolKind::Parameter)],
                containers: vec![inner],
                ..Default::default()
            },
        };
        let info = FileSymbolsInfo {
            containers: vec![top],
            ..Default::default()
        };
        assert!(info.find_container(&["top", "f"]).is_some());
        assert!(info.find_container(&["top", "g"]).is_none());
        let names: Vec<_> = info.all_symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["top", "W", "f", "x"]);
    }
}
