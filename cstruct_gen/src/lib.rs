//! C-Struct Codec Generation
//!
//! Turns message schema definitions into Rust source files containing
//! fixed-size record types plus serialize/deserialize routines whose byte
//! layout matches a C-style struct on a configurable word-size machine.

pub mod cmds;
pub mod codegen;
pub mod error;
pub mod layout;
