//! Format-agnostic binding model produced by the parser.

use serde::Serialize;

use crate::types::{escape_keyword, CType, ScriptType};

/// Everything one pass over a header produces, in emission order.
#[derive(Debug, Default, Serialize)]
pub struct Bindings {
    /// Macros, aliases, structs, enums and callbacks in declaration order.
    pub definitions: Vec<Definition>,
    pub palette: Vec<PaletteEntry>,
    pub functions: Vec<FunctionBinding>,
    /// Exported symbol names in insertion order. Duplicates are kept.
    pub exports: Vec<String>,
}

impl Bindings {
    pub fn export(&mut self, name: impl Into<String>) {
        self.exports.push(name.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    /// `#define NAME value`
    Constant { name: String, value: String },
    /// `typedef Type Name;` or `#define NAME Type // ...`
    TypeAlias { name: String, target: String },
    /// `#define A B` under a name-alias countdown.
    NameAlias { name: String, target: String },
    /// `typedef struct Tag Name;`
    OpaqueStruct { name: String },
    Struct(StructDefinition),
    Enum(EnumDefinition),
    Callback(CallbackDefinition),
    /// Blank line between blocks.
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDefinition {
    pub name: String,
    pub doc: Option<String>,
    /// Declaration order, which is the native memory layout.
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ctype: CType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    pub doc: Option<String>,
    pub prefix: String,
    /// Set when some member remainder starts with a digit.
    pub corrected: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    /// Member name with the prefix and first underscore removed.
    pub remainder: String,
    /// Literal value text: the explicit initializer, or the computed one.
    pub value: String,
}

impl EnumDefinition {
    /// Identifier of a member inside the enumerated type.
    pub fn member_ident(&self, member: &EnumMember) -> String {
        if self.corrected {
            let initial: String = self.prefix.chars().take(1).collect();
            format!("{}{}", initial, member.remainder)
        } else {
            escape_keyword(&member.remainder)
        }
    }

    /// Top-level alias mirroring the native constant name.
    pub fn alias_name(&self, member: &EnumMember) -> String {
        format!("{}_{}", self.prefix, member.remainder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackDefinition {
    pub name: String,
    #[serde(rename = "return")]
    pub ret: CType,
    pub params: Vec<CType>,
}

/// Four-channel color constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub name: String,
    pub type_name: String,
    pub channels: [u8; 4],
    pub comment: Option<String>,
}

/// A native function together with its generated wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionBinding {
    pub native_name: String,
    pub wrapper_name: String,
    /// Fixed native argument types; a variadic tail is not listed.
    pub argtypes: Vec<CType>,
    pub restype: CType,
    pub params: Vec<WrapperParam>,
    pub variadic: bool,
    pub returns: ScriptType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperParam {
    pub name: String,
    #[serde(rename = "type")]
    pub script_type: ScriptType,
}
