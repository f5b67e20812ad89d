//! Line grammar: one recognizer per construct shape.
//!
//! Each context is an ordered alternation of rules: the first rule that
//! matches a line wins. Rules only see lines while their context is active.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ErrorKind;
use crate::parser::rules::ContextKind;

// -- Regex patterns -----------------------------------------------------------

/// Separator between a type and a declarator: whitespace and/or stars.
const PTR_SEP: &str = r"(\s+\**\s*|\s*\*+\s*)";

/// Optional trailing line comment.
const TAIL: &str = r"\s*(?://.*)?$";

static RE_CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^\s*#define\s+(\w+)\s+("[^"]*"|[\w./()+*-]+){TAIL}"#
    ))
    .unwrap()
});

static RE_REAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)[fFdD]\b").unwrap());

static RE_OPAQUE_STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*typedef\s+struct\s+(\w+)\s+(\w+)\s*;{TAIL}")).unwrap()
});

static RE_STRUCT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*typedef\s+struct(?:\s+(\w+))?\s*\{{{TAIL}")).unwrap()
});

static RE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*\}}\s*(\w*)\s*;{TAIL}")).unwrap());

static RE_TYPEDEF_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*typedef\s+(\w+)\s+(\w+)\s*;{TAIL}")).unwrap()
});

static RE_DEFINE_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#define\s+(\w+)\s+(\w+)\s+//.*$").unwrap());

static RE_STRUCT_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s+(?:const\s+)?((?:unsigned\s+)?\w+{PTR_SEP})(\w+(?:\s*\[\s*\d+\s*\])?(?:\s*,\s*\**\s*\w+(?:\s*\[\s*\d+\s*\])?)*)\s*;{TAIL}"
    ))
    .unwrap()
});

static RE_ENUM_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*typedef\s+enum(?:\s+\w+)?\s*\{{{TAIL}")).unwrap()
});

static RE_ENUM_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s+(\w+)\s*(?:=\s*(-?(?:0[xX][0-9A-Fa-f]+|\d+)))?\s*,?{TAIL}"
    ))
    .unwrap()
});

static RE_NAME_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*#define\s+(\w+)\s+(\w+){TAIL}")).unwrap());

static RE_CALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*typedef\s+(\w+)\s*(\**)\s*\(\s*\*\s*(\w+)\s*\)\s*\((.*)\)\s*;{TAIL}"
    ))
    .unwrap()
});

static RE_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*#define\s+(\w+)\s+CLITERAL(?:\((\w+)\))?\s*\{\s*",
        r"(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\}",
        r"\s*(?://\s*(.*?))?\s*$"
    ))
    .unwrap()
});

static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(const\s+)?(unsigned\s+)?(\w+){PTR_SEP}(\w+)\s*(\[\s*\d*\s*\])?$"
    ))
    .unwrap()
});

static RE_ARRAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*\[\s*(\d+)\s*\]$").unwrap());

// -- Constructs ---------------------------------------------------------------

/// A recognized line, with raw captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    Constant { name: String, value: String },
    TypedefAlias { name: String, target: String },
    DefineAlias { name: String, target: String },
    OpaqueStruct { tag: String, name: String },
    StructOpen { tag: Option<String> },
    StructMember { raw_type: String, names: String },
    EnumOpen,
    EnumMember { name: String, value: Option<String> },
    /// `} Name;` closes whichever definition the context owns.
    Close { name: String },
    NameAlias { name: String, target: String },
    Callback(CallbackDecl),
    Function(FunctionDecl),
    Color(ColorDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub unsigned: bool,
    pub ret: String,
    pub pointer_depth: usize,
    pub name: String,
    /// Text between the outer parentheses.
    pub params: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackDecl {
    pub ret: String,
    pub pointer_depth: usize,
    pub name: String,
    pub params: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDecl {
    pub name: String,
    pub type_name: String,
    pub channels: [String; 4],
    pub comment: Option<String>,
}

/// One declared parameter, before type mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamShape {
    pub unsigned: bool,
    pub base: String,
    pub pointer_depth: usize,
    pub name: String,
}

/// Compiled grammar. Only the function rule depends on configuration.
#[derive(Debug, Clone)]
pub struct Grammar {
    function: Regex,
}

impl Grammar {
    /// Build the grammar for headers whose exported functions start with
    /// `api_macro` (e.g. `RLAPI`).
    pub fn new(api_macro: &str) -> Result<Self, ErrorKind> {
        if api_macro.is_empty() || !api_macro.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ErrorKind::InvalidApiMacro(api_macro.to_string()));
        }
        let pattern = format!(
            r"^\s*{}\s+(const\s+)?(unsigned\s+)?(\w+){PTR_SEP}(\w+)\s*\((.*)\)\s*;{TAIL}",
            regex::escape(api_macro)
        );
        let function =
            Regex::new(&pattern).map_err(|_| ErrorKind::InvalidApiMacro(api_macro.to_string()))?;
        Ok(Self { function })
    }

    /// Try the rules of `context` against `line`, in order.
    pub fn match_line(&self, context: ContextKind, line: &str) -> Option<Construct> {
        match context {
            ContextKind::Macro => match_constant(line),
            ContextKind::Struct => match_opaque_struct(line)
                .or_else(|| match_struct_open(line))
                .or_else(|| match_close(line))
                .or_else(|| match_typedef_alias(line))
                .or_else(|| match_define_alias(line))
                .or_else(|| match_struct_member(line)),
            ContextKind::Enum => match_enum_open(line)
                .or_else(|| match_close(line))
                .or_else(|| match_enum_member(line)),
            ContextKind::Color => match_color(line),
            ContextKind::Callback => match_callback(line),
            ContextKind::Function => self.match_function(line),
            ContextKind::NameAlias => match_name_alias(line),
        }
    }

    fn match_function(&self, line: &str) -> Option<Construct> {
        let caps = self.function.captures(line)?;
        Some(Construct::Function(FunctionDecl {
            unsigned: caps.get(2).is_some(),
            ret: caps[3].to_string(),
            pointer_depth: count_stars(&caps[4]),
            name: caps[5].to_string(),
            params: caps[6].trim().to_string(),
        }))
    }
}

// -- Rules --------------------------------------------------------------------

fn match_constant(line: &str) -> Option<Construct> {
    let caps = RE_CONSTANT.captures(line)?;
    Some(Construct::Constant {
        name: caps[1].to_string(),
        value: strip_real_suffix(&caps[2]),
    })
}

fn match_opaque_struct(line: &str) -> Option<Construct> {
    let caps = RE_OPAQUE_STRUCT.captures(line)?;
    Some(Construct::OpaqueStruct {
        tag: caps[1].to_string(),
        name: caps[2].to_string(),
    })
}

fn match_struct_open(line: &str) -> Option<Construct> {
    let caps = RE_STRUCT_OPEN.captures(line)?;
    Some(Construct::StructOpen {
        tag: caps.get(1).map(|m| m.as_str().to_string()),
    })
}

fn match_close(line: &str) -> Option<Construct> {
    let caps = RE_CLOSE.captures(line)?;
    Some(Construct::Close {
        name: caps[1].to_string(),
    })
}

fn match_typedef_alias(line: &str) -> Option<Construct> {
    let caps = RE_TYPEDEF_ALIAS.captures(line)?;
    if matches!(&caps[1], "struct" | "enum" | "union") {
        return None;
    }
    Some(Construct::TypedefAlias {
        name: caps[2].to_string(),
        target: caps[1].to_string(),
    })
}

fn match_define_alias(line: &str) -> Option<Construct> {
    let caps = RE_DEFINE_ALIAS.captures(line)?;
    Some(Construct::DefineAlias {
        name: caps[1].to_string(),
        target: caps[2].to_string(),
    })
}

fn match_struct_member(line: &str) -> Option<Construct> {
    let caps = RE_STRUCT_MEMBER.captures(line)?;
    Some(Construct::StructMember {
        raw_type: caps[1].to_string(),
        names: caps[3].to_string(),
    })
}

fn match_enum_open(line: &str) -> Option<Construct> {
    RE_ENUM_OPEN.is_match(line).then_some(Construct::EnumOpen)
}

fn match_enum_member(line: &str) -> Option<Construct> {
    let caps = RE_ENUM_MEMBER.captures(line)?;
    Some(Construct::EnumMember {
        name: caps[1].to_string(),
        value: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

fn match_name_alias(line: &str) -> Option<Construct> {
    let caps = RE_NAME_ALIAS.captures(line)?;
    Some(Construct::NameAlias {
        name: caps[1].to_string(),
        target: caps[2].to_string(),
    })
}

fn match_callback(line: &str) -> Option<Construct> {
    let caps = RE_CALLBACK.captures(line)?;
    Some(Construct::Callback(CallbackDecl {
        ret: caps[1].to_string(),
        pointer_depth: caps[2].len(),
        name: caps[3].to_string(),
        params: caps[4].trim().to_string(),
    }))
}

fn match_color(line: &str) -> Option<Construct> {
    let caps = RE_COLOR.captures(line)?;
    Some(Construct::Color(ColorDecl {
        name: caps[1].to_string(),
        type_name: caps
            .get(2)
            .map_or_else(|| "Color".to_string(), |m| m.as_str().to_string()),
        channels: [
            caps[3].to_string(),
            caps[4].to_string(),
            caps[5].to_string(),
            caps[6].to_string(),
        ],
        comment: caps
            .get(7)
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty()),
    }))
}

// -- Shared helpers -----------------------------------------------------------

/// Split a parameter list on commas. `void` and an empty list mean no
/// parameters. Not parenthesis-aware: function-pointer parameters split
/// into fragments that then fail [`parse_param`].
pub fn split_params(inner: &str) -> Vec<&str> {
    let inner = inner.trim();
    if inner.is_empty() || inner == "void" {
        return Vec::new();
    }
    inner.split(',').map(str::trim).collect()
}

/// Match one parameter declaration. An array declarator decays to one more
/// pointer level.
pub fn parse_param(text: &str) -> Option<ParamShape> {
    let caps = RE_PARAM.captures(text.trim())?;
    let decays = usize::from(caps.get(6).is_some());
    Some(ParamShape {
        unsigned: caps.get(2).is_some(),
        base: caps[3].to_string(),
        pointer_depth: count_stars(&caps[4]) + decays,
        name: caps[5].to_string(),
    })
}

/// Split `name[N]` into its name and length.
pub fn split_array_suffix(declarator: &str) -> Option<(&str, &str)> {
    let caps = RE_ARRAY_SUFFIX.captures(declarator)?;
    let name = caps.get(1)?.as_str();
    let len = caps.get(2)?.as_str();
    Some((name, len))
}

/// `3.14f` -> `3.14`, `(PI/180.0f)` -> `(PI/180.0)`. Hex literals are kept.
pub fn strip_real_suffix(value: &str) -> String {
    RE_REAL_SUFFIX.replace_all(value, "$1").into_owned()
}

fn count_stars(text: &str) -> usize {
    text.chars().filter(|c| *c == '*').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        Grammar::new("RLAPI").unwrap()
    }

    #[test]
    fn macro_constants() {
        let g = grammar();
        assert_eq!(
            g.match_line(ContextKind::Macro, "#define PI 3.14159265358979323846f"),
            Some(Construct::Constant {
                name: "PI".to_string(),
                value: "3.14159265358979323846".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Macro, "#define DEG2RAD (PI/180.0f)"),
            Some(Construct::Constant {
                name: "DEG2RAD".to_string(),
                value: "(PI/180.0)".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Macro, "#define MAX_TOUCH_POINTS 10 // Maximum"),
            Some(Construct::Constant {
                name: "MAX_TOUCH_POINTS".to_string(),
                value: "10".to_string()
            })
        );
    }

    #[test]
    fn macro_rule_ignores_color_literals() {
        let line = "#define RAYWHITE CLITERAL(Color){ 245, 245, 245, 255 }  // My own White";
        assert_eq!(grammar().match_line(ContextKind::Macro, line), None);
    }

    #[test]
    fn real_suffix_keeps_hex() {
        assert_eq!(strip_real_suffix("0x1f"), "0x1f");
        assert_eq!(strip_real_suffix("2d"), "2");
        assert_eq!(strip_real_suffix("x2d"), "x2d");
    }

    #[test]
    fn struct_rules_in_order() {
        let g = grammar();
        assert_eq!(
            g.match_line(ContextKind::Struct, "typedef struct rAudioBuffer rAudioBuffer;"),
            Some(Construct::OpaqueStruct {
                tag: "rAudioBuffer".to_string(),
                name: "rAudioBuffer".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "typedef struct Vector2 {"),
            Some(Construct::StructOpen {
                tag: Some("Vector2".to_string())
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "} Vector2;"),
            Some(Construct::Close {
                name: "Vector2".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "typedef Vector4 Quaternion;"),
            Some(Construct::TypedefAlias {
                name: "Quaternion".to_string(),
                target: "Vector4".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "#define SpriteFont Font  // SpriteFont type fallback"),
            Some(Construct::DefineAlias {
                name: "SpriteFont".to_string(),
                target: "Font".to_string()
            })
        );
    }

    #[test]
    fn struct_members() {
        let g = grammar();
        assert_eq!(
            g.match_line(ContextKind::Struct, "    float x;                // Vector x component"),
            Some(Construct::StructMember {
                raw_type: "float ".to_string(),
                names: "x".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "    unsigned char *data;"),
            Some(Construct::StructMember {
                raw_type: "unsigned char *".to_string(),
                names: "data".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "    float m0, m4, m8, m12;"),
            Some(Construct::StructMember {
                raw_type: "float ".to_string(),
                names: "m0, m4, m8, m12".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "    char name[32];"),
            Some(Construct::StructMember {
                raw_type: "char ".to_string(),
                names: "name[32]".to_string()
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Struct, "    float *vertices, *texcoords;"),
            Some(Construct::StructMember {
                raw_type: "float *".to_string(),
                names: "vertices, *texcoords".to_string()
            })
        );
        assert_eq!(g.match_line(ContextKind::Struct, "    float m[4][4];"), None);
    }

    #[test]
    fn enum_rules() {
        let g = grammar();
        assert_eq!(g.match_line(ContextKind::Enum, "typedef enum {"), Some(Construct::EnumOpen));
        assert_eq!(
            g.match_line(ContextKind::Enum, "    FLAG_SHOW_LOGO = 1,     // Set to show raylib logo"),
            Some(Construct::EnumMember {
                name: "FLAG_SHOW_LOGO".to_string(),
                value: Some("1".to_string())
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Enum, "    LOG_ALL,"),
            Some(Construct::EnumMember {
                name: "LOG_ALL".to_string(),
                value: None
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Enum, "    LOG_NONE"),
            Some(Construct::EnumMember {
                name: "LOG_NONE".to_string(),
                value: None
            })
        );
        assert_eq!(
            g.match_line(ContextKind::Enum, "} TraceLogType;"),
            Some(Construct::Close {
                name: "TraceLogType".to_string()
            })
        );
        assert_eq!(g.match_line(ContextKind::Enum, ""), None);
        assert_eq!(g.match_line(ContextKind::Enum, "    K_B = 1 << 2,"), None);
    }

    #[test]
    fn function_declarations() {
        let g = grammar();
        assert_eq!(
            g.match_line(
                ContextKind::Function,
                "RLAPI void InitWindow(int width, int height, const char *title);  // Initialize window"
            ),
            Some(Construct::Function(FunctionDecl {
                unsigned: false,
                ret: "void".to_string(),
                pointer_depth: 0,
                name: "InitWindow".to_string(),
                params: "int width, int height, const char *title".to_string()
            }))
        );
        assert_eq!(
            g.match_line(ContextKind::Function, "RLAPI const char *GetWorkingDirectory(void);"),
            Some(Construct::Function(FunctionDecl {
                unsigned: false,
                ret: "char".to_string(),
                pointer_depth: 1,
                name: "GetWorkingDirectory".to_string(),
                params: "void".to_string()
            }))
        );
        assert_eq!(
            g.match_line(ContextKind::Function, "int main(void);"),
            None
        );
    }

    #[test]
    fn other_api_macro() {
        let g = Grammar::new("MYAPI").unwrap();
        assert!(g.match_line(ContextKind::Function, "MYAPI int Answer(void);").is_some());
        assert!(g.match_line(ContextKind::Function, "RLAPI int Answer(void);").is_none());
        assert!(Grammar::new("MY API").is_err());
    }

    #[test]
    fn callbacks() {
        assert_eq!(
            grammar().match_line(
                ContextKind::Callback,
                "typedef void (*TraceLogCallback)(int logType, const char *text, va_list args);"
            ),
            Some(Construct::Callback(CallbackDecl {
                ret: "void".to_string(),
                pointer_depth: 0,
                name: "TraceLogCallback".to_string(),
                params: "int logType, const char *text, va_list args".to_string()
            }))
        );
    }

    #[test]
    fn color_literals() {
        let line = "#define RAYWHITE   CLITERAL(Color){ 245, 245, 245, 255 }   // My own White (raylib logo)";
        assert_eq!(
            grammar().match_line(ContextKind::Color, line),
            Some(Construct::Color(ColorDecl {
                name: "RAYWHITE".to_string(),
                type_name: "Color".to_string(),
                channels: [
                    "245".to_string(),
                    "245".to_string(),
                    "245".to_string(),
                    "255".to_string()
                ],
                comment: Some("My own White (raylib logo)".to_string())
            }))
        );
    }

    #[test]
    fn parameters() {
        assert_eq!(split_params("void"), Vec::<&str>::new());
        assert_eq!(split_params(""), Vec::<&str>::new());
        assert_eq!(split_params("int a, const char *b"), vec!["int a", "const char *b"]);
        assert_eq!(
            parse_param("const unsigned char *data"),
            Some(ParamShape {
                unsigned: true,
                base: "char".to_string(),
                pointer_depth: 1,
                name: "data".to_string()
            })
        );
        assert_eq!(
            parse_param("float m[16]"),
            Some(ParamShape {
                unsigned: false,
                base: "float".to_string(),
                pointer_depth: 1,
                name: "m".to_string()
            })
        );
        assert_eq!(parse_param("..."), None);
        assert_eq!(parse_param("void (*cb)(int)"), None);
    }

    #[test]
    fn array_suffix() {
        assert_eq!(split_array_suffix("params[4]"), Some(("params", "4")));
        assert_eq!(split_array_suffix("params"), None);
    }
}
