pub mod decode;
pub mod encode;
pub mod helpers;
pub mod types;

use crate::layout::MessageLayout;
use cstruct_types::MessageDef;
use std::fmt::Write;

pub use types::emit_struct;

/// Emits the impl block carrying the four codec operations of one message.
pub fn emit_impl(msg: &MessageDef, layout: &MessageLayout) -> String {
    let mut output = String::new();

    write!(output, "impl {} {{\n", msg.name).unwrap();
    output.push_str(&encode::emit_to_bytes_fn(msg, layout));
    output.push_str(&decode::emit_from_bytes_fn(msg, layout));
    output.push_str(&encode::emit_copy_to_fn(layout));
    output.push_str(&emit_length_fn(layout));
    write!(output, "}}\n").unwrap();

    output
}

fn emit_length_fn(layout: &MessageLayout) -> String {
    let mut output = String::new();
    write!(output, "    pub fn length(&self) -> usize {{\n").unwrap();
    write!(output, "        {}\n", layout.size).unwrap();
    write!(output, "    }}\n").unwrap();
    output
}
