//! Type mapping from C declaration tokens to ctypes marshalling types.
//!
//! [`map`] is the canonical, ABI-facing mapping used for `argtypes`, `restype`,
//! struct fields and callback signatures. [`ScriptType`] is the coarser view
//! used only to annotate generated wrapper signatures.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::TypeError;

/// Base kind of a C type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseKind {
    Void,
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    LongLong,
    Float,
    Double,
    LongDouble,
    /// `va_list`, marshalled as an opaque pointer.
    VaList,
    /// A record, alias or callback type declared elsewhere in the header.
    Named(String),
}

impl BaseKind {
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "void" => BaseKind::Void,
            "bool" => BaseKind::Bool,
            "char" => BaseKind::Char,
            "byte" => BaseKind::Byte,
            "short" => BaseKind::Short,
            "int" => BaseKind::Int,
            "long" => BaseKind::Long,
            "longlong" => BaseKind::LongLong,
            "float" => BaseKind::Float,
            "double" => BaseKind::Double,
            "longdouble" => BaseKind::LongDouble,
            "va_list" => BaseKind::VaList,
            other => BaseKind::Named(other.to_string()),
        }
    }
}

/// Canonical description of a declared type, independent of source syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub base: BaseKind,
    pub unsigned: bool,
    pub pointer_depth: usize,
    pub array_len: Option<usize>,
}

impl TypeDescriptor {
    pub fn new(unsigned: bool, token: &str, pointer_depth: usize, array_len: Option<usize>) -> Self {
        Self {
            base: BaseKind::from_token(token),
            unsigned,
            pointer_depth,
            array_len,
        }
    }

    /// True for a plain `void`, which only a return type may use.
    pub fn is_void_value(&self) -> bool {
        self.base == BaseKind::Void && self.pointer_depth == 0 && self.array_len.is_none()
    }

    pub fn to_ctype(&self) -> Result<CType, TypeError> {
        map_descriptor(self)
    }
}

/// ctypes primitives the mapper can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Char,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    CharP,
    VoidP,
}

impl Primitive {
    pub fn ctypes_name(self) -> &'static str {
        match self {
            Primitive::Bool => "c_bool",
            Primitive::Char => "c_char",
            Primitive::Byte => "c_byte",
            Primitive::UByte => "c_ubyte",
            Primitive::Short => "c_short",
            Primitive::UShort => "c_ushort",
            Primitive::Int => "c_int",
            Primitive::UInt => "c_uint",
            Primitive::Long => "c_long",
            Primitive::ULong => "c_ulong",
            Primitive::LongLong => "c_longlong",
            Primitive::ULongLong => "c_ulonglong",
            Primitive::Float => "c_float",
            Primitive::Double => "c_double",
            Primitive::LongDouble => "c_longdouble",
            Primitive::CharP => "c_char_p",
            Primitive::VoidP => "c_void_p",
        }
    }
}

/// A marshalling type as the generated module declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    /// `None`: no value, only legal as a return type.
    NoValue,
    Primitive(Primitive),
    Named(String),
    Array(Box<CType>, usize),
    Pointer(Box<CType>),
}

impl CType {
    pub fn is_no_value(&self) -> bool {
        matches!(self, CType::NoValue)
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::NoValue => f.write_str("None"),
            CType::Primitive(p) => f.write_str(p.ctypes_name()),
            CType::Named(name) => f.write_str(&escape_keyword(name)),
            CType::Array(inner, len) => write!(f, "{} * {}", inner, len),
            CType::Pointer(inner) => write!(f, "POINTER({})", inner),
        }
    }
}

impl Serialize for CType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Map raw type tokens to a marshalling type.
///
/// `unsigned char` becomes `byte` before the unsigned prefix applies. `char`
/// and `void` consume one pointer level into `c_char_p`/`c_void_p`; the array
/// modifier wraps next and any remaining pointer levels wrap last, innermost
/// first. A bare `void` maps to [`CType::NoValue`].
pub fn map(
    unsigned: bool,
    token: &str,
    pointer_depth: usize,
    array_len: Option<usize>,
) -> Result<CType, TypeError> {
    map_descriptor(&TypeDescriptor::new(unsigned, token, pointer_depth, array_len))
}

fn map_descriptor(desc: &TypeDescriptor) -> Result<CType, TypeError> {
    let mut depth = desc.pointer_depth;
    let array_len = desc.array_len.filter(|len| *len > 0);

    let signed_only = |p: Primitive, token: &str| {
        if desc.unsigned {
            Err(TypeError::InvalidUnsigned(token.to_string()))
        } else {
            Ok(CType::Primitive(p))
        }
    };
    let either = |signed: Primitive, unsigned: Primitive| {
        CType::Primitive(if desc.unsigned { unsigned } else { signed })
    };

    let mut ty = match &desc.base {
        BaseKind::Named(name) => {
            if desc.unsigned {
                return Err(TypeError::InvalidUnsigned(name.clone()));
            }
            CType::Named(name.clone())
        }
        BaseKind::VaList => signed_only(Primitive::VoidP, "va_list")?,
        BaseKind::Void => {
            if desc.unsigned {
                return Err(TypeError::InvalidUnsigned("void".to_string()));
            }
            if depth > 0 {
                depth -= 1;
                CType::Primitive(Primitive::VoidP)
            } else if array_len.is_some() {
                return Err(TypeError::VoidArray);
            } else {
                return Ok(CType::NoValue);
            }
        }
        BaseKind::Char if desc.unsigned => CType::Primitive(Primitive::UByte),
        BaseKind::Char if depth > 0 => {
            depth -= 1;
            CType::Primitive(Primitive::CharP)
        }
        BaseKind::Char => CType::Primitive(Primitive::Char),
        BaseKind::Byte => either(Primitive::Byte, Primitive::UByte),
        BaseKind::Short => either(Primitive::Short, Primitive::UShort),
        BaseKind::Int => either(Primitive::Int, Primitive::UInt),
        BaseKind::Long => either(Primitive::Long, Primitive::ULong),
        BaseKind::LongLong => either(Primitive::LongLong, Primitive::ULongLong),
        BaseKind::Bool => signed_only(Primitive::Bool, "bool")?,
        BaseKind::Float => signed_only(Primitive::Float, "float")?,
        BaseKind::Double => signed_only(Primitive::Double, "double")?,
        BaseKind::LongDouble => signed_only(Primitive::LongDouble, "longdouble")?,
    };

    if let Some(len) = array_len {
        ty = CType::Array(Box::new(ty), len);
    }
    for _ in 0..depth {
        ty = CType::Pointer(Box::new(ty));
    }
    Ok(ty)
}

/// Scripting-facing category used in wrapper annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptType {
    NoValue,
    Integer,
    Boolean,
    Float,
    Bytes,
    /// Records, pointers and arrays keep their native expression.
    Native(String),
}

impl From<&CType> for ScriptType {
    fn from(ty: &CType) -> Self {
        match ty {
            CType::NoValue => ScriptType::NoValue,
            CType::Primitive(p) => match p {
                Primitive::Bool => ScriptType::Boolean,
                Primitive::Char | Primitive::CharP => ScriptType::Bytes,
                Primitive::Float | Primitive::Double | Primitive::LongDouble => ScriptType::Float,
                Primitive::Byte
                | Primitive::UByte
                | Primitive::Short
                | Primitive::UShort
                | Primitive::Int
                | Primitive::UInt
                | Primitive::Long
                | Primitive::ULong
                | Primitive::LongLong
                | Primitive::ULongLong
                | Primitive::VoidP => ScriptType::Integer,
            },
            other => ScriptType::Native(other.to_string()),
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptType::NoValue => f.write_str("None"),
            ScriptType::Integer => f.write_str("int"),
            ScriptType::Boolean => f.write_str("bool"),
            ScriptType::Float => f.write_str("float"),
            ScriptType::Bytes => f.write_str("bytes"),
            ScriptType::Native(expr) => f.write_str(expr),
        }
    }
}

impl Serialize for ScriptType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fold a CamelCase native name into snake_case.
///
/// A `_` goes before every uppercase character that is neither the first
/// character nor preceded by another uppercase character, so acronyms stay
/// in one piece: `GetFPS` becomes `get_fps`.
pub fn fold_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len() + 4);
    let mut prev_upper = true;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !prev_upper {
                folded.push('_');
            }
            prev_upper = true;
        } else {
            prev_upper = false;
        }
        folded.extend(ch.to_lowercase());
    }
    folded
}

/// Reserved words a generated identifier must not collide with.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// `name` with a trailing `_` when it is a Python keyword.
pub fn escape_keyword(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Folded name usable as a generated identifier.
pub fn script_ident(name: &str) -> String {
    escape_keyword(&fold_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(unsigned: bool, token: &str, depth: usize, array: Option<usize>) -> String {
        map(unsigned, token, depth, array).unwrap().to_string()
    }

    #[test]
    fn maps_primitives() {
        assert_eq!(mapped(false, "int", 0, None), "c_int");
        assert_eq!(mapped(true, "int", 0, None), "c_uint");
        assert_eq!(mapped(false, "float", 0, None), "c_float");
        assert_eq!(mapped(false, "bool", 0, None), "c_bool");
        assert_eq!(mapped(true, "short", 0, None), "c_ushort");
    }

    #[test]
    fn unsigned_char_becomes_ubyte() {
        assert_eq!(mapped(true, "char", 0, None), "c_ubyte");
        // the char pointer shortcut does not apply after the remap
        assert_eq!(mapped(true, "char", 1, None), "POINTER(c_ubyte)");
    }

    #[test]
    fn char_and_void_consume_one_pointer_level() {
        assert_eq!(mapped(false, "char", 1, None), "c_char_p");
        assert_eq!(mapped(false, "char", 2, None), "POINTER(c_char_p)");
        assert_eq!(mapped(false, "void", 1, None), "c_void_p");
        assert_eq!(mapped(false, "void", 3, None), "POINTER(POINTER(c_void_p))");
    }

    #[test]
    fn bare_void_is_no_value() {
        assert_eq!(map(false, "void", 0, None).unwrap(), CType::NoValue);
    }

    #[test]
    fn va_list_is_opaque_pointer() {
        assert_eq!(mapped(false, "va_list", 0, None), "c_void_p");
    }

    #[test]
    fn arrays_wrap_before_pointers() {
        assert_eq!(mapped(false, "float", 0, Some(4)), "c_float * 4");
        assert_eq!(mapped(false, "float", 1, Some(4)), "POINTER(c_float * 4)");
        assert_eq!(mapped(false, "char", 0, Some(32)), "c_char * 32");
        assert_eq!(mapped(false, "int", 0, Some(0)), "c_int");
    }

    #[test]
    fn named_types_pass_through() {
        assert_eq!(mapped(false, "Vector3", 0, None), "Vector3");
        assert_eq!(mapped(false, "Image", 1, None), "POINTER(Image)");
    }

    #[test]
    fn rejects_unsigned_on_non_integers() {
        assert_eq!(
            map(true, "float", 0, None),
            Err(TypeError::InvalidUnsigned("float".to_string()))
        );
        assert_eq!(
            map(true, "Color", 0, None),
            Err(TypeError::InvalidUnsigned("Color".to_string()))
        );
        assert_eq!(map(false, "void", 0, Some(3)), Err(TypeError::VoidArray));
    }

    #[test]
    fn script_categories() {
        let cat = |u, t, d| ScriptType::from(&map(u, t, d, None).unwrap()).to_string();
        assert_eq!(cat(false, "int", 0), "int");
        assert_eq!(cat(true, "char", 0), "int");
        assert_eq!(cat(false, "char", 1), "bytes");
        assert_eq!(cat(false, "double", 0), "float");
        assert_eq!(cat(false, "void", 1), "int");
        assert_eq!(cat(false, "void", 0), "None");
        assert_eq!(cat(false, "Texture2D", 0), "Texture2D");
        assert_eq!(cat(false, "Mesh", 1), "POINTER(Mesh)");
    }

    #[test]
    fn fold_names() {
        assert_eq!(fold_name("DrawRectangleRec"), "draw_rectangle_rec");
        assert_eq!(fold_name("IsKeyDown"), "is_key_down");
        assert_eq!(fold_name("RAYWHITE"), "raywhite");
        assert_eq!(fold_name("GetFPS"), "get_fps");
        assert_eq!(fold_name("logLevel"), "log_level");
        assert_eq!(fold_name("DrawText3D"), "draw_text3_d");
    }

    #[test]
    fn script_idents_avoid_keywords() {
        assert_eq!(script_ident("from"), "from_");
        assert_eq!(script_ident("Import"), "import_");
        assert_eq!(script_ident("fromX"), "from_x");
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(escape_keyword("None"), "None_");
        assert_eq!(escape_keyword("NONE"), "NONE");
        assert_eq!(escape_keyword("lambda"), "lambda_");
        assert_eq!(CType::Named("def".to_string()).to_string(), "def_");
    }
}
