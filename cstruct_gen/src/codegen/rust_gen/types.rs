use cstruct_types::{BitWidth, FieldDef, FieldKind, MessageDef};
use std::fmt::Write;

/* Schema field names are legal Rust identifiers except when they collide
   with a keyword; those get the raw-identifier prefix in generated code. */
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override",
    "priv", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where",
    "while", "yield",
];

pub fn escape_rust_keyword(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        return format!("r#{name}");
    }
    name.to_string()
}

/// Rust type of one element of the field, after narrowing. Floats keep their
/// floating type even when their storage width is narrowed.
pub fn base_rust_type(field: &FieldDef) -> String {
    match &field.kind {
        FieldKind::Bool => "bool".to_string(),
        FieldKind::I32 => match field.options.bits {
            Some(BitWidth::Eight) => "i8".to_string(),
            Some(BitWidth::Sixteen) => "i16".to_string(),
            None => "i32".to_string(),
        },
        FieldKind::U32 => match field.options.bits {
            Some(BitWidth::Eight) => "u8".to_string(),
            Some(BitWidth::Sixteen) => "u16".to_string(),
            None => "u32".to_string(),
        },
        FieldKind::I64 => "i64".to_string(),
        FieldKind::U64 => "u64".to_string(),
        FieldKind::F32 => "f32".to_string(),
        FieldKind::F64 => "f64".to_string(),
        FieldKind::Bytes => "u8".to_string(),
        FieldKind::Message(name) => name.clone(),
    }
}

/// Declared attribute type: fixed-size array form for repeated fields and
/// byte blobs, the element type otherwise.
pub fn field_rust_type(field: &FieldDef) -> String {
    let base = base_rust_type(field);
    if field.is_array() {
        format!("[{}; {}]", base, field.options.length.unwrap_or(0))
    } else {
        base
    }
}

pub fn emit_struct(msg: &MessageDef) -> String {
    let mut output = String::new();

    write!(output, "#[derive(Debug, Default, Clone, Copy, PartialEq)]\n").unwrap();
    write!(output, "pub struct {} {{\n", msg.name).unwrap();
    for field in &msg.fields {
        write!(
            output,
            "    pub {}: {},\n",
            escape_rust_keyword(&field.name),
            field_rust_type(field)
        )
        .unwrap();
    }
    write!(output, "}}\n").unwrap();

    output
}
