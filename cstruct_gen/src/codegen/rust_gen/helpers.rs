use cstruct_types::{BitWidth, FieldDef, FieldKind};

/// True for fields whose declared element type is `u8`, which lets the
/// generated code move whole ranges with `copy_from_slice`.
pub fn copies_as_bytes(field: &FieldDef) -> bool {
    match &field.kind {
        FieldKind::Bytes => true,
        FieldKind::U32 => matches!(field.options.bits, Some(BitWidth::Eight)),
        _ => false,
    }
}

pub fn is_float(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::F32 | FieldKind::F64)
}

/// Unsigned type of the same width used for float bit patterns.
pub fn float_bits_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::F64 => "u64",
        _ => "u32",
    }
}
