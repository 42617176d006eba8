/* Serializer generation: to_bytes and copy_to method bodies */

use crate::codegen::rust_gen::helpers::{copies_as_bytes, float_bits_type, is_float};
use crate::codegen::rust_gen::types::escape_rust_keyword;
use crate::layout::{FieldSlot, MessageLayout};
use cstruct_types::{FieldDef, FieldKind, MessageDef};
use std::fmt::Write;

pub fn emit_to_bytes_fn(msg: &MessageDef, layout: &MessageLayout) -> String {
  let mut output = String::new();

  if msg.fields.is_empty() {
    write!(output, "    pub fn to_bytes(&self) -> [u8; 0] {{\n").unwrap();
    write!(output, "        [0u8; 0]\n").unwrap();
    write!(output, "    }}\n\n").unwrap();
    return output;
  }

  write!(output, "    pub fn to_bytes(&self) -> [u8; {}] {{\n", layout.size).unwrap();
  write!(output, "        let mut output = [0u8; {}];\n", layout.size).unwrap();

  for (field, slot) in msg.fields.iter().zip(&layout.fields) {
    emit_field_write(&mut output, field, slot);
  }

  write!(output, "        output\n").unwrap();
  write!(output, "    }}\n\n").unwrap();
  output
}

pub fn emit_copy_to_fn(layout: &MessageLayout) -> String {
  let mut output = String::new();
  write!(output, "    pub fn copy_to(&self, dest: &mut [u8]) {{\n").unwrap();
  write!(output, "        let data = self.to_bytes();\n").unwrap();
  write!(output, "        dest[..{}].copy_from_slice(&data);\n", layout.size).unwrap();
  write!(output, "    }}\n\n").unwrap();
  output
}

fn emit_field_write(output: &mut String, field: &FieldDef, slot: &FieldSlot) {
  /* Nested messages serialize themselves into their slice of the buffer */
  if let FieldKind::Message(_) = &field.kind {
    write!(
      output,
      "        self.{}.copy_to(&mut output[{}..{}]);\n",
      escape_rust_keyword(&field.name),
      slot.offset,
      slot.offset + slot.field_size
    )
    .unwrap();
    return;
  }

  let accessor = format!("self.{}", escape_rust_keyword(&field.name));
  let length = field.options.length.unwrap_or(0);

  /* Floats are reinterpreted as same-width unsigned bit patterns first */
  let value = if is_float(&field.kind) {
    let bits_name = format!("{}_bits", field.name);
    let bits_type = float_bits_type(&field.kind);
    if field.repeated {
      write!(
        output,
        "        let {}: [{}; {}] = [\n",
        bits_name, bits_type, length
      )
      .unwrap();
      for i in 0..length {
        write!(output, "            {}[{}].to_bits(),\n", accessor, i).unwrap();
      }
      write!(output, "        ];\n").unwrap();
    } else {
      write!(output, "        let {} = {}.to_bits();\n", bits_name, accessor).unwrap();
    }
    bits_name
  } else {
    accessor
  };

  if field.is_array() {
    if slot.base_size > 1 {
      let mut offset = slot.offset;
      for i in 0..length {
        emit_value_bytes(output, &format!("{}[{}]", value, i), offset, slot.base_size);
        offset += slot.base_size;
      }
    } else if copies_as_bytes(field) {
      write!(
        output,
        "        output[{}..{}].copy_from_slice(&{});\n",
        slot.offset,
        slot.offset + slot.field_size,
        value
      )
      .unwrap();
    } else {
      /* i8, bool, and narrowed-float elements store one byte each */
      for i in 0..length {
        write!(
          output,
          "        output[{}] = {}[{}] as u8;\n",
          slot.offset + i,
          value,
          i
        )
        .unwrap();
      }
    }
  } else if slot.base_size > 1 {
    emit_value_bytes(output, &value, slot.offset, slot.base_size);
  } else if matches!(field.kind, FieldKind::U32) {
    /* Already a u8 after narrowing */
    write!(output, "        output[{}] = {};\n", slot.offset, value).unwrap();
  } else {
    write!(output, "        output[{}] = {} as u8;\n", slot.offset, value).unwrap();
  }
}

/* Big-endian extraction: byte b of an S-byte value is (v >> (8 * (S - b))) & 0xff */
fn emit_value_bytes(output: &mut String, value: &str, offset: u64, base_size: u64) {
  let mut offset = offset;
  for b in (0..base_size).rev() {
    if b > 0 {
      write!(
        output,
        "        output[{}] = ({} >> {}) as u8;\n",
        offset,
        value,
        8 * b
      )
      .unwrap();
    } else {
      write!(output, "        output[{}] = {} as u8;\n", offset, value).unwrap();
    }
    offset += 1;
  }
}
