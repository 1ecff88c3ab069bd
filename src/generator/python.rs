//! Python module emission
//!
//! Writes the scripting-side module for a [`Resolution`]. The module runs
//! inside the VM next to the compiled library and expects a global `_mod`
//! exposing `_malloc`, `_free`, `_memcpy` and a little-endian `DataView`
//! over linear memory as `_mod.mem`.
//!
//! Output order: helpers, array classes, struct classes (each alias right
//! after its target), enums, defines, colors.

use super::Resolution;
use crate::api::{DefineDesc, EnumDesc};
use crate::ctype::CType;
use crate::layout::{FieldLayout, StructLayout};
use crate::memory::ScalarKind;
use std::fmt::{self, Write};

const HEADER: &str = "# Generated by raybind. Do not edit.\nimport enum\n";

const STRUCT_CLONE: &str = r#"
# copy a struct or array into `address` and return a view of the copy with
# the same shape. With no address the copy gets its own allocation.
#   color = struct_clone(RAYWHITE)
def struct_clone(source, address=0):
    size = source._size
    owned = not address
    if owned:
        address = _mod._malloc(size)
    _mod._memcpy(address, source._address, size)
    clone = object.__new__(source.__class__)
    clone.__dict__.update(source.__dict__)
    clone._address = address
    clone._to_alloc = owned
    clone._frozen = False
    return clone
"#;

const WASM_ARRAY: &str = r#"
class WasmArray:
    """Array-like collection backed by wasm memory"""

    def __init__(self, item_size: int, length: int, address: int = 0, to_alloc: bool = True):
        self._length = length
        self._item_size = item_size
        self._size = self._item_size * self._length
        self._to_alloc = to_alloc
        if not to_alloc:
            self._address: int = address
        else:
            self._address: int = _mod._malloc(self._size)

    def __del__(self):
        if self._to_alloc:
            _mod._free(self._address)

    def __len__(self):
        return self._length

    def _check(self, item):
        if not 0 <= item < self._length:
            raise IndexError(item)
        return self._address + (item * self._item_size)

    def __str__(self):
        out = "WasmArray["
        out += ', '.join([str(self[i]) for i in range(self._length)])
        out += "] " + hex(self._address)
        return out


class StructArray(WasmArray):
    """Array of structs"""

    def __init__(self, stype, length, address: int = 0, to_alloc: bool = True):
        super(StructArray, self).__init__(stype.size, length, address, to_alloc)
        self._stype = stype

    def __getitem__(self, item):
        return self._stype(address=self._check(item), to_alloc=False)

    def __setitem__(self, item, value):
        struct_clone(value, self._check(item))
"#;

/// Every array element kind, in emission order
const ARRAY_KINDS: [ScalarKind; 10] = [
    ScalarKind::I8,
    ScalarKind::U8,
    ScalarKind::I16,
    ScalarKind::U16,
    ScalarKind::I32,
    ScalarKind::U32,
    ScalarKind::I64,
    ScalarKind::U64,
    ScalarKind::F32,
    ScalarKind::F64,
];

const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Array class holding elements of `kind`
pub fn array_class(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::I8 => "CharArray",
        ScalarKind::U8 => "UCharArray",
        ScalarKind::I16 => "Int16Array",
        ScalarKind::U16 => "UInt16Array",
        ScalarKind::I32 => "Int32Array",
        ScalarKind::U32 => "UInt32Array",
        ScalarKind::I64 => "Int64Array",
        ScalarKind::U64 => "UInt64Array",
        ScalarKind::F32 => "FloatArray",
        ScalarKind::F64 => "DoubleArray",
    }
}

/// Python type of a field. `None` for void.
pub fn type_hint(ctype: &CType) -> Option<String> {
    match ctype {
        CType::Void => None,
        CType::Integer { .. } | CType::Pointer { .. } => Some("int".to_string()),
        CType::Float | CType::Double => Some("float".to_string()),
        CType::Array { of, .. } => match of.as_ref() {
            CType::StructRef { .. } => Some("StructArray".to_string()),
            element => ScalarKind::of(element).map(|kind| array_class(kind).to_string()),
        },
        CType::StructRef { name } => Some(name.clone()),
    }
}

fn default_value(ctype: &CType) -> &'static str {
    match ctype {
        CType::Float | CType::Double => "0.0",
        CType::Integer { .. } | CType::Pointer { .. } => "0",
        CType::Void | CType::Array { .. } | CType::StructRef { .. } => "None",
    }
}

/// Field name usable as a Python identifier
pub fn python_name(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn docstring(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ")
}

fn comment(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("  # {}", text.replace('\n', " "))
    }
}

/// Write the whole module
pub fn write_module<W: Write>(out: &mut W, resolution: &Resolution) -> fmt::Result {
    out.write_str(HEADER)?;
    out.write_str(STRUCT_CLONE)?;
    out.write_str(WASM_ARRAY)?;
    for kind in ARRAY_KINDS {
        writeln!(out)?;
        write_array_class(out, kind)?;
    }

    for layout in resolution.registry.iter() {
        writeln!(out)?;
        match resolution.alias_target(&layout.name) {
            Some(target) => writeln!(out, "{} = {}", layout.name, target)?,
            None => {
                let description = resolution
                    .description(&layout.name)
                    .map(|desc| desc.description.as_str())
                    .unwrap_or("");
                writeln!(out)?;
                write_struct_class(out, layout, description)?;
            }
        }
    }

    for desc in &resolution.enums {
        writeln!(out)?;
        writeln!(out)?;
        write_enum(out, desc)?;
    }

    writeln!(out)?;
    writeln!(out)?;
    for define in &resolution.defines {
        write_define(out, define)?;
    }

    if resolution.registry.contains("Color") {
        writeln!(out)?;
        for define in &resolution.defines {
            write_color(out, define)?;
        }
    }

    Ok(())
}

/// The module as a string
pub fn render_module(resolution: &Resolution) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_module(&mut out, resolution)?;
    Ok(out)
}

fn write_array_class<W: Write>(out: &mut W, kind: ScalarKind) -> fmt::Result {
    let name = array_class(kind);
    let accessor = kind.accessor();
    writeln!(out, "class {}(WasmArray):", name)?;
    writeln!(out, "    def __init__(self, length, address: int = 0, to_alloc: bool = True):")?;
    writeln!(
        out,
        "        super({}, self).__init__({}, length, address, to_alloc)",
        name,
        kind.size()
    )?;
    writeln!(out)?;
    writeln!(out, "    def __getitem__(self, item):")?;
    writeln!(out, "        return _mod.mem.get{}(self._check(item), True)", accessor)?;
    writeln!(out)?;
    writeln!(out, "    def __setitem__(self, item, value):")?;
    writeln!(out, "        _mod.mem.set{}(self._check(item), value, True)", accessor)
}

/// Write one struct accessor class
pub fn write_struct_class<W: Write>(
    out: &mut W,
    layout: &StructLayout,
    description: &str,
) -> fmt::Result {
    writeln!(out, "class {}:", layout.name)?;
    if !description.is_empty() {
        writeln!(out, "    \"\"\"{}\"\"\"", docstring(description))?;
    }
    writeln!(out)?;
    writeln!(out, "    size: int = {}", layout.size)?;
    writeln!(out, "    _size: int = {}", layout.size)?;
    writeln!(out)?;

    write!(out, "    def __init__(self, ")?;
    for field in &layout.fields {
        let name = python_name(&field.name);
        match type_hint(&field.ctype) {
            Some(hint) => write!(out, "{}: {} = {}, ", name, hint, default_value(&field.ctype))?,
            None => write!(out, "{}=None, ", name)?,
        }
    }
    writeln!(out, "address: int = 0, to_alloc: bool = True, frozen: bool = False):")?;
    writeln!(out, "        self._to_alloc = to_alloc")?;
    writeln!(out, "        self._frozen = frozen")?;
    writeln!(out, "        if not to_alloc:")?;
    writeln!(out, "            self._address = address")?;
    writeln!(out, "        else:")?;
    writeln!(out, "            self._address = _mod._malloc({})", layout.size)?;
    for field in &layout.fields {
        let name = python_name(&field.name);
        match ScalarKind::of(&field.ctype) {
            Some(kind) => writeln!(
                out,
                "            _mod.mem.set{}(self._address + {}, {}, True)",
                kind.accessor(),
                field.offset,
                name
            )?,
            None => {
                writeln!(out, "            if {} is not None:", name)?;
                writeln!(
                    out,
                    "                struct_clone({}, self._address + {})",
                    name, field.offset
                )?;
            }
        }
    }

    for field in &layout.fields {
        writeln!(out)?;
        write_property(out, field)?;
    }

    writeln!(out)?;
    writeln!(out, "    def __str__(self):")?;
    write!(out, "        return f\"{}(address={{self._address}}", layout.name)?;
    for field in &layout.fields {
        write!(out, ", {}={{self.{}}}", field.name, python_name(&field.name))?;
    }
    writeln!(out, ")\"")?;
    writeln!(out)?;
    writeln!(out, "    def __del__(self):")?;
    writeln!(out, "        if self._to_alloc:")?;
    writeln!(out, "            _mod._free(self._address)")
}

fn write_property<W: Write>(out: &mut W, field: &FieldLayout) -> fmt::Result {
    let name = python_name(&field.name);
    let offset = field.offset;

    writeln!(out, "    @property")?;
    writeln!(out, "    def {}(self):", name)?;
    match (&field.ctype, ScalarKind::of(&field.ctype)) {
        (_, Some(kind)) => writeln!(
            out,
            "        return _mod.mem.get{}(self._address + {}, True)",
            kind.accessor(),
            offset
        )?,
        (CType::Array { of, length }, None) => {
            let element = match of.as_ref() {
                CType::StructRef { name } => format!("StructArray({}, ", name),
                element => match ScalarKind::of(element) {
                    Some(kind) => format!("{}(", array_class(kind)),
                    None => format!("WasmArray({}, ", field.size / (*length).max(1)),
                },
            };
            writeln!(
                out,
                "        return {}{}, address=self._address + {}, to_alloc=False)",
                element, length, offset
            )?;
        }
        (CType::StructRef { name: struct_name }, None) => writeln!(
            out,
            "        return {}(address=self._address + {}, to_alloc=False)",
            struct_name, offset
        )?,
        (ctype, None) => writeln!(out, "        raise TypeError(\"{} has no value\")", ctype)?,
    }
    writeln!(out)?;

    writeln!(out, "    @{}.setter", name)?;
    writeln!(out, "    def {}(self, value):", name)?;
    writeln!(out, "        if not self._frozen:")?;
    match ScalarKind::of(&field.ctype) {
        Some(kind) => writeln!(
            out,
            "            _mod.mem.set{}(self._address + {}, value, True)",
            kind.accessor(),
            offset
        ),
        None => writeln!(out, "            struct_clone(value, self._address + {})", offset),
    }
}

/// Write an `enum.IntEnum` class
pub fn write_enum<W: Write>(out: &mut W, desc: &EnumDesc) -> fmt::Result {
    writeln!(out, "class {}(enum.IntEnum):", desc.name)?;
    if !desc.description.is_empty() {
        writeln!(out, "    \"\"\"{}\"\"\"", docstring(&desc.description))?;
    }
    if desc.values.is_empty() {
        return writeln!(out, "    pass");
    }
    for value in &desc.values {
        writeln!(
            out,
            "    {}: int = {}{}",
            value.name,
            value.value,
            comment(&value.description)
        )?;
    }
    Ok(())
}

/// Drop C float suffixes: `180.0f` → `180.0`
fn strip_float_suffix(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let after_number = i > 0 && (chars[i - 1].is_ascii_digit() || chars[i - 1] == '.');
        let ends_word = chars
            .get(i + 1)
            .map_or(true, |next| !(next.is_ascii_alphanumeric() || *next == '_'));
        if (c == 'f' || c == 'F') && after_number && ends_word {
            continue;
        }
        out.push(c);
    }
    out
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Write a define as a typed module constant. Kinds other than numbers and
/// strings are skipped, colors are written by [`write_color`].
pub fn write_define<W: Write>(out: &mut W, define: &DefineDesc) -> fmt::Result {
    let rendered = match define.kind.as_str() {
        "INT" => scalar_text(&define.value).map(|v| ("int", v)),
        "FLOAT" | "DOUBLE" | "FLOAT_MATH" => {
            scalar_text(&define.value).map(|v| ("float", strip_float_suffix(&v)))
        }
        "STRING" => match &define.value {
            serde_json::Value::String(s) => Some(("str", format!("\"{}\"", docstring(s)))),
            _ => None,
        },
        _ => None,
    };

    match rendered {
        Some((hint, value)) => writeln!(
            out,
            "{}: {} = {}{}",
            define.name,
            hint,
            value,
            comment(&define.description)
        ),
        None => Ok(()),
    }
}

/// RGBA components of a color literal such as
/// `CLITERAL(Color){ 200, 200, 200, 255 }`
pub fn color_components(literal: &str) -> Option<[u8; 4]> {
    let start = literal.find('{')?;
    let end = literal[start..].find('}')? + start;
    let parts: Vec<u8> = literal[start + 1..end]
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    parts.try_into().ok()
}

/// Write a `COLOR` define as a frozen `Color` instance
pub fn write_color<W: Write>(out: &mut W, define: &DefineDesc) -> fmt::Result {
    if define.kind != "COLOR" {
        return Ok(());
    }
    let Some([r, g, b, a]) = define.value.as_str().and_then(color_components) else {
        return Ok(());
    };
    writeln!(
        out,
        "{}: Color = Color({}, {}, {}, {}, frozen=True){}",
        define.name,
        r,
        g,
        b,
        a,
        comment(&define.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiDescription;
    use crate::ctype::parse_type;
    use crate::generator::tests::RAYLIB_SUBSET;
    use crate::generator::{resolve_all, GeneratorOptions};
    use crate::layout::tests::struct_desc;
    use crate::layout::{resolve_layout, StructRegistry};

    fn module() -> String {
        let api = ApiDescription::from_json(RAYLIB_SUBSET).unwrap();
        let resolution = resolve_all(&[api], GeneratorOptions::default());
        render_module(&resolution).unwrap()
    }

    #[test]
    fn test_type_hints() {
        let hint = |text: &str| type_hint(&parse_type(text).unwrap());

        assert_eq!(hint("unsigned char").as_deref(), Some("int"));
        assert_eq!(hint("const char *").as_deref(), Some("int"));
        assert_eq!(hint("double").as_deref(), Some("float"));
        assert_eq!(hint("char[32]").as_deref(), Some("CharArray"));
        assert_eq!(hint("unsigned short[4]").as_deref(), Some("UInt16Array"));
        assert_eq!(hint("Matrix[2]").as_deref(), Some("StructArray"));
        assert_eq!(hint("Texture2D").as_deref(), Some("Texture2D"));
        assert_eq!(hint("void"), None);
    }

    #[test]
    fn test_struct_class_uses_layout_offsets() {
        let desc = struct_desc(
            "BoneInfo",
            &[("name", "char[32]"), ("parent", "int"), ("next", "BoneInfo *")],
        );
        let layout = resolve_layout(&desc, &StructRegistry::new()).unwrap();
        let mut out = String::new();
        write_struct_class(&mut out, &layout, "Bone, skeletal animation bone").unwrap();

        assert!(out.starts_with("class BoneInfo:\n    \"\"\"Bone, skeletal animation bone\"\"\"\n"));
        assert!(out.contains("    size: int = 40\n"));
        assert!(out.contains(
            "def __init__(self, name: CharArray = None, parent: int = 0, next: int = 0, address: int = 0, to_alloc: bool = True, frozen: bool = False):"
        ));
        assert!(out.contains("            _mod.mem.setInt32(self._address + 32, parent, True)\n"));
        assert!(out.contains("        return CharArray(32, address=self._address + 0, to_alloc=False)\n"));
        assert!(out.contains("        return _mod.mem.getUint32(self._address + 36, True)\n"));
        assert!(out.contains(
            "return f\"BoneInfo(address={self._address}, name={self.name}, parent={self.parent}, next={self.next})\""
        ));
    }

    #[test]
    fn test_keyword_fields_are_renamed() {
        let desc = struct_desc("Odd", &[("from", "int"), ("values", "Vector2[3]")]);
        let mut registry = StructRegistry::new();
        registry
            .insert(resolve_layout(&struct_desc("Vector2", &[("x", "float"), ("y", "float")]), &registry).unwrap())
            .unwrap();
        let layout = resolve_layout(&desc, &registry).unwrap();
        let mut out = String::new();
        write_struct_class(&mut out, &layout, "").unwrap();

        assert!(out.contains("    def from_(self):"));
        assert!(out.contains("return StructArray(Vector2, 3, address=self._address + 4, to_alloc=False)"));
        assert!(out.contains("            struct_clone(value, self._address + 4)"));
    }

    #[test]
    fn test_array_fields_are_assigned_by_copy() {
        let mut registry = StructRegistry::new();
        registry
            .insert(resolve_layout(&struct_desc("Matrix", &[("m0", "float")]), &registry).unwrap())
            .unwrap();
        let desc = struct_desc(
            "Skin",
            &[("name", "char[32]"), ("params", "float[4]"), ("poses", "Matrix[2]")],
        );
        let layout = resolve_layout(&desc, &registry).unwrap();
        let mut out = String::new();
        write_struct_class(&mut out, &layout, "").unwrap();

        assert!(out.contains("            if name is not None:\n                struct_clone(name, self._address + 0)\n"));
        assert!(out.contains("    @params.setter\n    def params(self, value):\n        if not self._frozen:\n            struct_clone(value, self._address + 32)\n"));
        assert!(out.contains("            struct_clone(value, self._address + 48)\n"));

        // the copy keeps the array length and element type of its source
        let module = module();
        assert!(module.contains("    clone = object.__new__(source.__class__)\n    clone.__dict__.update(source.__dict__)\n    clone._address = address\n"));
        assert!(!module.contains("source.__class__(address=address"));
    }

    #[test]
    fn test_module_sections() {
        let module = module();

        assert!(module.starts_with("# Generated by raybind. Do not edit.\nimport enum\n"));
        assert!(module.contains("class Int64Array(WasmArray):"));
        assert!(module.contains("_mod.mem.getBigUint64(self._check(item), True)"));

        let vector3 = module.find("class Vector3:").unwrap();
        let ray = module.find("class Ray:").unwrap();
        let quaternion = module.find("\nQuaternion = Vector4\n").unwrap();
        let vector4 = module.find("class Vector4:").unwrap();
        assert!(vector3 < ray && vector4 < quaternion);

        assert!(module.contains(
            "class ConfigFlags(enum.IntEnum):\n    \"\"\"System/Window config flags\"\"\"\n    FLAG_VSYNC_HINT: int = 64  # Set to try enabling V-Sync on GPU\n    FLAG_FULLSCREEN_MODE: int = 2\n"
        ));
        assert!(module.contains("RAYLIB_VERSION: str = \"5.0\"\n"));
        assert!(module.contains("PI: float = 3.141592653589793\n"));
        assert!(module.contains("DEG2RAD: float = (PI/180.0)\n"));
        assert!(!module.contains("RL_MALLOC"));
        assert!(module.contains(
            "LIGHTGRAY: Color = Color(200, 200, 200, 255, frozen=True)  # Light Gray\n"
        ));
    }

    #[test]
    fn test_colors_need_the_color_struct() {
        let api = ApiDescription::from_json(
            r#"{ "defines": [ { "name": "RED", "type": "COLOR", "value": "CLITERAL(Color){ 230, 41, 55, 255 }" } ] }"#,
        )
        .unwrap();
        let module = render_module(&resolve_all(&[api], GeneratorOptions::default())).unwrap();

        assert!(!module.contains("RED: Color"));
    }

    #[test]
    fn test_color_components() {
        assert_eq!(
            color_components("CLITERAL(Color){ 0, 121, 241, 255 }"),
            Some([0, 121, 241, 255])
        );
        assert_eq!(color_components("CLITERAL(Color){ 0, 121, 241 }"), None);
        assert_eq!(color_components("CLITERAL(Color){ 0, 300, 241, 255 }"), None);
        assert_eq!(color_components("GetColor(0xff)"), None);
    }

    #[test]
    fn test_float_suffixes() {
        assert_eq!(strip_float_suffix("(PI/180.0f)"), "(PI/180.0)");
        assert_eq!(strip_float_suffix("1e-6f"), "1e-6");
        assert_eq!(strip_float_suffix("floorf(x)"), "floorf(x)");
    }

    #[test]
    fn test_empty_enum() {
        let desc = EnumDesc {
            name: "Empty".to_string(),
            description: String::new(),
            values: Vec::new(),
        };
        let mut out = String::new();
        write_enum(&mut out, &desc).unwrap();

        assert_eq!(out, "class Empty(enum.IntEnum):\n    pass\n");
    }
}
