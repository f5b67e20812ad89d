//! Python renderer: emits a ctypes module.
//!
//! Sections come out in a fixed order: loader preamble, the `__all__` export
//! table, definitions in declaration order, the color palette, then one
//! wrapper per function. Output depends only on the model, so rendering the
//! same header twice is byte-identical.

use crate::error::RenderError;
use crate::model::*;
use crate::render::Renderer;
use crate::types::ScriptType;

pub struct PythonRenderer {
    preamble: String,
    handle: String,
}

impl PythonRenderer {
    pub fn new(preamble: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            handle: handle.into(),
        }
    }
}

impl Renderer for PythonRenderer {
    fn render(&self, bindings: &Bindings) -> Result<String, RenderError> {
        let mut lines: Vec<String> = Vec::new();

        if !self.preamble.is_empty() {
            lines.extend(self.preamble.trim_end().lines().map(str::to_string));
            lines.push(String::new());
            lines.push(String::new());
        }

        lines.push("__all__ = [".to_string());
        for name in &bindings.exports {
            lines.push(format!("    '{}',", name));
        }
        lines.push("]".to_string());
        lines.push(String::new());

        for def in &bindings.definitions {
            render_definition(&mut lines, def);
        }

        if !bindings.palette.is_empty() {
            lines.push(String::new());
            for entry in &bindings.palette {
                lines.push(render_palette_entry(entry));
            }
        }

        for func in &bindings.functions {
            render_function(&mut lines, func, &self.handle);
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "py"
    }
}

fn render_definition(lines: &mut Vec<String>, def: &Definition) {
    match def {
        Definition::Constant { name, value } => lines.push(format!("{} = {}", name, value)),
        Definition::NameAlias { name, target } => lines.push(format!("{} = {}", name, target)),
        Definition::TypeAlias { name, target } => {
            lines.push(String::new());
            lines.push(format!("{} = {}", name, target));
            lines.push(String::new());
        }
        Definition::OpaqueStruct { name } => {
            lines.push(String::new());
            lines.push(format!("class {}(Structure):", name));
            lines.push("    pass".to_string());
            lines.push(String::new());
        }
        Definition::Struct(s) => render_struct(lines, s),
        Definition::Enum(e) => render_enum(lines, e),
        Definition::Callback(cb) => {
            let mut signature = vec![cb.ret.to_string()];
            signature.extend(cb.params.iter().map(ToString::to_string));
            lines.push(String::new());
            lines.push(format!("{} = CFUNCTYPE({})", cb.name, signature.join(", ")));
            lines.push(String::new());
        }
        Definition::Separator => lines.push(String::new()),
    }
}

fn render_struct(lines: &mut Vec<String>, def: &StructDefinition) {
    lines.push(String::new());
    lines.push(format!("class {}(Structure):", def.name));
    if let Some(ref doc) = def.doc {
        lines.push(format!("    \"\"\"{}\"\"\"", docstring_escape(doc)));
    }
    lines.push("    _fields_ = [".to_string());
    for field in &def.fields {
        lines.push(format!("        ('{}', {}),", field.name, field.ctype));
    }
    lines.push("    ]".to_string());
    lines.push(String::new());
}

fn render_enum(lines: &mut Vec<String>, def: &EnumDefinition) {
    lines.push(String::new());
    lines.push(format!("class {}(IntEnum):", def.name));
    if let Some(ref doc) = def.doc {
        lines.push(format!("    \"\"\"{}\"\"\"", docstring_escape(doc)));
    }
    for member in &def.members {
        lines.push(format!("    {} = {}", def.member_ident(member), member.value));
    }
    lines.push(String::new());
    lines.push(String::new());
    // module-level aliases keep the native spelling
    for member in &def.members {
        lines.push(format!(
            "{} = {}.{}",
            def.alias_name(member),
            def.name,
            def.member_ident(member)
        ));
    }
    lines.push(String::new());
}

fn render_palette_entry(entry: &PaletteEntry) -> String {
    let [r, g, b, a] = entry.channels;
    let mut line = format!("{} = {}({}, {}, {}, {})", entry.name, entry.type_name, r, g, b, a);
    if let Some(ref comment) = entry.comment {
        line.push_str("  # ");
        line.push_str(comment);
    }
    line
}

fn render_function(lines: &mut Vec<String>, func: &FunctionBinding, handle: &str) {
    let argtypes: Vec<String> = func.argtypes.iter().map(ToString::to_string).collect();

    let mut params: Vec<String> = func
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.script_type))
        .collect();
    let mut args: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();
    if func.variadic {
        let mut rest = "args".to_string();
        while func.params.iter().any(|p| p.name == rest) {
            rest.push('_');
        }
        params.push(format!("*{}", rest));
        args.push(format!("*{}", rest));
    }

    let call = format!("{}.{}({})", handle, func.native_name, args.join(", "));

    lines.push(String::new());
    lines.push(format!(
        "{}.{}.argtypes = [{}]",
        handle,
        func.native_name,
        argtypes.join(", ")
    ));
    lines.push(format!("{}.{}.restype = {}", handle, func.native_name, func.restype));
    lines.push(format!(
        "def {}({}) -> {}:",
        func.wrapper_name,
        params.join(", "),
        func.returns
    ));
    if func.returns == ScriptType::NoValue {
        lines.push(format!("    {}", call));
    } else {
        lines.push(format!("    return {}", call));
    }
    lines.push(String::new());
}

fn docstring_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    fn render(input: &str) -> String {
        let bindings = parse(input, &ParseOptions::default()).unwrap();
        PythonRenderer::new("", "_rl").render(&bindings).unwrap()
    }

    #[test]
    fn export_table_comes_first() {
        let out = render("// @define_begin\n#define MAX_TOUCH_POINTS 10\n// @define_end\n");
        assert!(out.starts_with("__all__ = [\n    'MAX_TOUCH_POINTS',\n]\n"));
        assert!(out.contains("\nMAX_TOUCH_POINTS = 10\n"));
    }

    #[test]
    fn preamble_is_emitted_verbatim() {
        let bindings = Bindings::default();
        let out = PythonRenderer::new("import ctypes\n", "_rl")
            .render(&bindings)
            .unwrap();
        assert!(out.starts_with("import ctypes\n\n\n__all__ = [\n]\n"));
    }

    #[test]
    fn struct_layout() {
        let out = render(
            "// @struct_begin\n// Vector2 type\ntypedef struct Vector2 {\n    float x;\n    float y;\n} Vector2;\n// @struct_end\n",
        );
        let expected = "\nclass Vector2(Structure):\n    \"\"\"Vector2 type\"\"\"\n    _fields_ = [\n        ('x', c_float),\n        ('y', c_float),\n    ]\n";
        assert!(out.contains(expected), "{}", out);
    }

    #[test]
    fn corrected_enum_with_aliases() {
        let out = render(
            "// @enum_begin\ntypedef enum {\n    KEY_APOSTROPHE = 39,\n    KEY_0 = 48,\n} KeyboardKey;\n// @enum_end\n",
        );
        assert!(out.contains("class KeyboardKey(IntEnum):\n    KAPOSTROPHE = 39\n    K0 = 48\n"));
        assert!(out.contains("KEY_APOSTROPHE = KeyboardKey.KAPOSTROPHE\nKEY_0 = KeyboardKey.K0\n"));
    }

    #[test]
    fn callback_signature_starts_with_return_type() {
        let out = render(
            "// @callback_notation 1\ntypedef void (*TraceLogCallback)(int logType, const char *text, va_list args);\n",
        );
        assert!(out.contains("TraceLogCallback = CFUNCTYPE(None, c_int, c_char_p, c_void_p)"));
    }

    #[test]
    fn wrappers_without_return_value() {
        let out = render(
            "// @functions_begin\nRLAPI void InitWindow(int width, int height, const char *title);\n// @functions_end\n",
        );
        let expected = "\n_rl.InitWindow.argtypes = [c_int, c_int, c_char_p]\n_rl.InitWindow.restype = None\ndef init_window(width: int, height: int, title: bytes) -> None:\n    _rl.InitWindow(width, height, title)\n";
        assert!(out.contains(expected), "{}", out);
    }

    #[test]
    fn wrappers_return_and_forward_varargs() {
        let out = render(
            "// @functions_begin\nRLAPI bool IsKeyDown(int key);\nRLAPI void TraceLog(int logLevel, const char *text, ...);\n// @functions_end\n",
        );
        assert!(out.contains("def is_key_down(key: int) -> bool:\n    return _rl.IsKeyDown(key)\n"));
        assert!(out.contains("_rl.TraceLog.argtypes = [c_int, c_char_p]\n"));
        assert!(out.contains(
            "def trace_log(log_level: int, text: bytes, *args) -> None:\n    _rl.TraceLog(log_level, text, *args)\n"
        ));
    }

    #[test]
    fn palette_keeps_comment_and_stays_private() {
        let out = render(
            "// @color_defines_begin\n#define RAYWHITE   CLITERAL(Color){ 245, 245, 245, 255 }   // My own White (raylib logo)\n// @color_defines_end\n",
        );
        assert!(out.contains("RAYWHITE = Color(245, 245, 245, 255)  # My own White (raylib logo)\n"));
        assert!(!out.contains("'RAYWHITE'"));
    }

    #[test]
    fn opaque_struct_and_aliases() {
        let out = render(
            "// @struct_begin\ntypedef struct rAudioBuffer rAudioBuffer;\ntypedef Vector4 Quaternion;\n// @struct_end\n",
        );
        assert!(out.contains("\nclass rAudioBuffer(Structure):\n    pass\n"));
        assert!(out.contains("\nQuaternion = Vector4\n"));
    }

    #[test]
    fn docstrings_are_escaped() {
        assert_eq!(docstring_escape(r#"a """ b"#), r#"a \"\"\" b"#);
        assert_eq!(docstring_escape(r"C:\path"), r"C:\\path");
    }

    #[test]
    fn doc_ending_in_quote_stays_closed() {
        let out = render(
            "// @struct_begin\n// Holds a \"name\"\ntypedef struct N {\n    int id;\n} N;\n// @struct_end\n",
        );
        assert!(out.contains("    \"\"\"Holds a \\\"name\\\"\"\"\"\n"), "{}", out);
    }

    #[test]
    fn variadic_tail_avoids_parameter_names() {
        let out = render(
            "// @functions_begin\nRLAPI void Log(const char *args, ...);\n// @functions_end\n",
        );
        assert!(
            out.contains("def log(args: bytes, *args_) -> None:\n    _rl.Log(args, *args_)\n"),
            "{}",
            out
        );
    }
}
