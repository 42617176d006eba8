/* Deserializer generation: from_bytes method bodies */

use crate::codegen::rust_gen::helpers::{copies_as_bytes, float_bits_type, is_float};
use crate::codegen::rust_gen::types::{base_rust_type, escape_rust_keyword};
use crate::layout::{FieldSlot, MessageLayout};
use cstruct_types::{FieldDef, FieldKind, MessageDef};
use std::fmt::Write;

pub fn emit_from_bytes_fn(msg: &MessageDef, layout: &MessageLayout) -> String {
  let mut output = String::new();

  if msg.fields.is_empty() {
    write!(output, "    pub fn from_bytes(&mut self, _input: &[u8]) -> bool {{\n").unwrap();
    write!(output, "        true\n").unwrap();
    write!(output, "    }}\n\n").unwrap();
    return output;
  }

  write!(output, "    pub fn from_bytes(&mut self, input: &[u8]) -> bool {{\n").unwrap();
  if layout.size > 0 {
    write!(output, "        if input.len() < {} {{\n", layout.size).unwrap();
    write!(output, "            return false;\n").unwrap();
    write!(output, "        }}\n").unwrap();
  }

  for (field, slot) in msg.fields.iter().zip(&layout.fields) {
    emit_field_read(&mut output, field, slot);
  }

  write!(output, "        true\n").unwrap();
  write!(output, "    }}\n\n").unwrap();
  output
}

fn emit_field_read(output: &mut String, field: &FieldDef, slot: &FieldSlot) {
  /* Nested messages deserialize themselves from their slice of the buffer */
  if let FieldKind::Message(_) = &field.kind {
    write!(
      output,
      "        self.{}.from_bytes(&input[{}..{}]);\n",
      escape_rust_keyword(&field.name),
      slot.offset,
      slot.offset + slot.field_size
    )
    .unwrap();
    return;
  }

  let accessor = format!("self.{}", escape_rust_keyword(&field.name));
  let length = field.options.length.unwrap_or(0);

  /* Floats rebuild their bit patterns in zeroed locals, then convert */
  if is_float(&field.kind) {
    let bits_name = format!("{}_bits", field.name);
    let bits_type = float_bits_type(&field.kind);
    let float_type = base_rust_type(field);

    if field.repeated {
      write!(
        output,
        "        let mut {} = [0{}; {}];\n",
        bits_name, bits_type, length
      )
      .unwrap();
      let mut offset = slot.offset;
      for i in 0..length {
        emit_bits_read(
          output,
          &format!("{}[{}]", bits_name, i),
          bits_type,
          offset,
          slot.base_size,
        );
        offset += slot.base_size;
      }
      for i in 0..length {
        write!(
          output,
          "        {}[{}] = {}::from_bits({}[{}]);\n",
          accessor, i, float_type, bits_name, i
        )
        .unwrap();
      }
    } else {
      write!(output, "        let mut {}: {} = 0;\n", bits_name, bits_type).unwrap();
      emit_bits_read(output, &bits_name, bits_type, slot.offset, slot.base_size);
      write!(
        output,
        "        {} = {}::from_bits({});\n",
        accessor, float_type, bits_name
      )
      .unwrap();
    }
    return;
  }

  let base_type = base_rust_type(field);

  if field.is_array() {
    if slot.base_size > 1 {
      let mut offset = slot.offset;
      for i in 0..length {
        emit_int_read(
          output,
          &format!("{}[{}]", accessor, i),
          &base_type,
          offset,
          slot.base_size,
        );
        offset += slot.base_size;
      }
    } else if copies_as_bytes(field) {
      write!(
        output,
        "        {}.copy_from_slice(&input[{}..{}]);\n",
        accessor,
        slot.offset,
        slot.offset + slot.field_size
      )
      .unwrap();
    } else {
      /* i8 and bool elements load one byte each */
      for i in 0..length {
        emit_single_byte_read(
          output,
          field,
          &format!("{}[{}]", accessor, i),
          slot.offset + i,
        );
      }
    }
  } else if slot.base_size > 1 {
    emit_int_read(output, &accessor, &base_type, slot.offset, slot.base_size);
  } else {
    emit_single_byte_read(output, field, &accessor, slot.offset);
  }
}

/* Big-endian reassembly: the first byte seeds the value, the rest OR in */
fn emit_int_read(output: &mut String, target: &str, ty: &str, offset: u64, base_size: u64) {
  let mut offset = offset;
  for b in (0..base_size).rev() {
    let op = if b + 1 == base_size { "=" } else { "|=" };
    if b > 0 {
      write!(
        output,
        "        {} {} (input[{}] as {}) << {};\n",
        target,
        op,
        offset,
        ty,
        8 * b
      )
      .unwrap();
    } else {
      write!(output, "        {} {} input[{}] as {};\n", target, op, offset, ty).unwrap();
    }
    offset += 1;
  }
}

/* Same reassembly for float bit locals, which start zeroed */
fn emit_bits_read(output: &mut String, target: &str, ty: &str, offset: u64, base_size: u64) {
  let mut offset = offset;
  for b in (0..base_size).rev() {
    if b > 0 {
      write!(
        output,
        "        {} |= (input[{}] as {}) << {};\n",
        target,
        offset,
        ty,
        8 * b
      )
      .unwrap();
    } else {
      write!(output, "        {} |= input[{}] as {};\n", target, offset, ty).unwrap();
    }
    offset += 1;
  }
}

fn emit_single_byte_read(output: &mut String, field: &FieldDef, target: &str, offset: u64) {
  match &field.kind {
    FieldKind::Bool => {
      write!(output, "        {} = input[{}] != 0;\n", target, offset).unwrap();
    }
    FieldKind::U32 => {
      /* Already a u8 after narrowing */
      write!(output, "        {} = input[{}];\n", target, offset).unwrap();
    }
    _ => {
      write!(output, "        {} = input[{}] as i8;\n", target, offset).unwrap();
    }
  }
}
