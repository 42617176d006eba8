use crate::error::LayoutError;
use crate::layout::graph::MessageGraph;
use cstruct_types::{FieldDef, FieldKind, MessageDef, WordSize};
use std::collections::BTreeMap;

/// Byte placement of a single field within its message buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: String,
    pub offset: u64,
    pub base_size: u64,
    pub field_size: u64,
}

/// Computed layout of one message: total size plus per-field placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLayout {
    pub name: String,
    pub size: u64,
    pub fields: Vec<FieldSlot>,
}

/// Computes message layouts for one schema file.
///
/// The word size is fixed for the resolver's lifetime, so a nested message
/// always sees the same alignment unit as its container. Layouts are
/// memoized; `resolve_all` fills the memo in nested-dependency order so a
/// message's size is available before any message that embeds it.
#[derive(Debug)]
pub struct LayoutResolver {
    word: u64,
    messages: BTreeMap<String, MessageDef>,
    layouts: BTreeMap<String, MessageLayout>,
}

impl LayoutResolver {
    pub fn new(word: WordSize) -> Self {
        Self {
            word: word.bytes(),
            messages: BTreeMap::new(),
            layouts: BTreeMap::new(),
        }
    }

    pub fn add_message(&mut self, msg: MessageDef) {
        self.messages.insert(msg.name.clone(), msg);
    }

    pub fn word_size(&self) -> u64 {
        self.word
    }

    pub fn layout(&self, name: &str) -> Option<&MessageLayout> {
        self.layouts.get(name)
    }

    /// Computes and memoizes the layout of every added message.
    pub fn resolve_all(&mut self) -> Result<(), LayoutError> {
        let defs: Vec<MessageDef> = self.messages.values().cloned().collect();
        let graph = MessageGraph::build(&defs);

        for name in graph.topo_order()? {
            if let Some(msg) = self.messages.get(&name).cloned() {
                let layout = self.layout_message(&msg)?;
                self.layouts.insert(name, layout);
            }
        }

        Ok(())
    }

    fn layout_message(&self, msg: &MessageDef) -> Result<MessageLayout, LayoutError> {
        let mut fields = Vec::with_capacity(msg.fields.len());
        let mut offset = 0u64;

        for field in &msg.fields {
            let path = format!("{}.{}", msg.name, field.name);
            let (base_size, field_size) = self.field_size(field, &path)?;
            let length = field.options.length.unwrap_or(0);

            // Address of the next word boundary strictly after the current offset.
            let boundary = ((offset / self.word) + 1) * self.word;

            let pad = if let FieldKind::Message(nested) = &field.kind {
                // A nested message aligns by its leading leaf field, not by
                // the aggregate itself.
                match self.leading_leaf_size(nested, &path)? {
                    Some(leaf_size) => offset + leaf_size > boundary,
                    None => false,
                }
            } else if length > 0 && base_size == 1 {
                // Byte-wide elements keep byte alignment.
                false
            } else {
                // The next boundary always lies strictly past the running
                // offset, so this branch never pads plain scalars.
                offset > boundary
            };

            if pad {
                offset += self.word - (offset % self.word);
            }

            fields.push(FieldSlot {
                name: field.name.clone(),
                offset,
                base_size,
                field_size,
            });
            offset += field_size;
        }

        // Tail padding keeps the total a whole number of words.
        if offset % self.word != 0 {
            offset += self.word - (offset % self.word);
        }

        let layout = MessageLayout {
            name: msg.name.clone(),
            size: offset,
            fields,
        };
        self.check_invariants(&layout)?;
        Ok(layout)
    }

    /// Size in bytes of one element of the field's kind, after narrowing.
    fn base_size(&self, field: &FieldDef, path: &str) -> Result<u64, LayoutError> {
        let size = match &field.kind {
            FieldKind::Bool | FieldKind::Bytes => 1,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => match field.options.bits {
                Some(bits) => bits.bytes(),
                None => 4,
            },
            FieldKind::I64 | FieldKind::U64 | FieldKind::F64 => 8,
            FieldKind::Message(name) => {
                self.layouts
                    .get(name)
                    .ok_or_else(|| LayoutError::UnknownMessage {
                        name: name.clone(),
                        path: path.to_string(),
                    })?
                    .size
            }
        };
        Ok(size)
    }

    /// `(base size, total size)` of a field; total multiplies in the length
    /// for repeated fields and byte blobs.
    fn field_size(&self, field: &FieldDef, path: &str) -> Result<(u64, u64), LayoutError> {
        if field.options.weak {
            return Err(LayoutError::UnsupportedField {
                path: path.to_string(),
            });
        }
        if field.repeated && matches!(field.kind, FieldKind::Message(_)) {
            // No layout rule exists for arrays of nested messages.
            return Err(LayoutError::UnsupportedField {
                path: path.to_string(),
            });
        }

        let base = self.base_size(field, path)?;
        let mut size = base;

        if field.is_array() {
            let length = field.options.length.unwrap_or(0);
            if length == 0 {
                return Err(LayoutError::UnsupportedField {
                    path: path.to_string(),
                });
            }
            size *= length;
        }

        Ok((base, size))
    }

    /// Field size of the first non-message field reached by descending
    /// through leading nested fields. `None` when the descent ends in a
    /// message with no fields, in which case no padding decision is made.
    fn leading_leaf_size(&self, name: &str, path: &str) -> Result<Option<u64>, LayoutError> {
        let mut current = self.message(name, path)?;
        while let Some(first) = current.fields.first() {
            match &first.kind {
                FieldKind::Message(inner) => {
                    let inner_path = format!("{}.{}", current.name, first.name);
                    current = self.message(inner, &inner_path)?;
                }
                _ => {
                    let leaf_path = format!("{}.{}", current.name, first.name);
                    let (_, size) = self.field_size(first, &leaf_path)?;
                    return Ok(Some(size));
                }
            }
        }
        Ok(None)
    }

    fn message(&self, name: &str, path: &str) -> Result<&MessageDef, LayoutError> {
        self.messages
            .get(name)
            .ok_or_else(|| LayoutError::UnknownMessage {
                name: name.to_string(),
                path: path.to_string(),
            })
    }

    fn check_invariants(&self, layout: &MessageLayout) -> Result<(), LayoutError> {
        if layout.size % self.word != 0 {
            return Err(LayoutError::MisalignedSize {
                message: layout.name.clone(),
                size: layout.size,
                word: self.word,
            });
        }
        for slot in &layout.fields {
            if slot.offset + slot.field_size > layout.size {
                return Err(LayoutError::FieldOutOfBounds {
                    path: format!("{}.{}", layout.name, slot.name),
                    offset: slot.offset,
                    size: slot.field_size,
                    message_size: layout.size,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstruct_types::{BitWidth, FieldOptions};

    fn scalar(name: &str, kind: FieldKind) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind,
            repeated: false,
            options: FieldOptions::default(),
        }
    }

    fn narrowed(name: &str, kind: FieldKind, bits: BitWidth) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind,
            repeated: false,
            options: FieldOptions {
                bits: Some(bits),
                ..FieldOptions::default()
            },
        }
    }

    fn array(name: &str, kind: FieldKind, length: u64, bits: Option<BitWidth>) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind,
            repeated: true,
            options: FieldOptions {
                length: Some(length),
                bits,
                weak: false,
            },
        }
    }

    fn blob(name: &str, length: u64) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind: FieldKind::Bytes,
            repeated: false,
            options: FieldOptions {
                length: Some(length),
                ..FieldOptions::default()
            },
        }
    }

    fn message(name: &str, fields: Vec<FieldDef>) -> MessageDef {
        MessageDef {
            name: name.to_string(),
            fields,
        }
    }

    fn resolve(word: WordSize, messages: Vec<MessageDef>) -> LayoutResolver {
        let mut resolver = LayoutResolver::new(word);
        for msg in messages {
            resolver.add_message(msg);
        }
        resolver.resolve_all().unwrap();
        resolver
    }

    fn offsets(layout: &MessageLayout) -> Vec<u64> {
        layout.fields.iter().map(|f| f.offset).collect()
    }

    #[test]
    fn single_bool_pads_to_one_word() {
        let resolver = resolve(
            WordSize::Four,
            vec![message("Flag", vec![scalar("on", FieldKind::Bool)])],
        );
        let layout = resolver.layout("Flag").unwrap();
        assert_eq!(layout.size, 4);
        assert_eq!(offsets(layout), vec![0]);

        let resolver = resolve(
            WordSize::Eight,
            vec![message("Flag", vec![scalar("on", FieldKind::Bool)])],
        );
        assert_eq!(resolver.layout("Flag").unwrap().size, 8);
    }

    #[test]
    fn byte_blob_rounds_up_to_whole_words() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message("Exact", vec![blob("payload", 4)]),
                message("Ragged", vec![blob("payload", 5)]),
            ],
        );
        assert_eq!(resolver.layout("Exact").unwrap().size, 4);
        assert_eq!(resolver.layout("Ragged").unwrap().size, 8);
    }

    #[test]
    fn plain_scalars_never_pad_between_fields() {
        // A one-byte scalar followed by a four-byte scalar stays contiguous;
        // only the tail is padded out to a word multiple.
        let resolver = resolve(
            WordSize::Four,
            vec![message(
                "Pair",
                vec![
                    narrowed("small", FieldKind::U32, BitWidth::Eight),
                    scalar("word", FieldKind::U32),
                ],
            )],
        );
        let layout = resolver.layout("Pair").unwrap();
        assert_eq!(offsets(layout), vec![0, 1]);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn byte_array_then_scalar_stays_contiguous() {
        let resolver = resolve(
            WordSize::Four,
            vec![message(
                "Packet",
                vec![
                    array("prefix", FieldKind::U32, 4, Some(BitWidth::Eight)),
                    scalar("value", FieldKind::U32),
                ],
            )],
        );
        let layout = resolver.layout("Packet").unwrap();
        assert_eq!(offsets(layout), vec![0, 4]);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn byte_blob_never_pads_even_off_boundary() {
        let resolver = resolve(
            WordSize::Four,
            vec![message(
                "Blob",
                vec![
                    narrowed("tag", FieldKind::U32, BitWidth::Eight),
                    blob("payload", 4),
                ],
            )],
        );
        let layout = resolver.layout("Blob").unwrap();
        assert_eq!(offsets(layout), vec![0, 1]);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn nested_message_pads_by_its_leading_leaf() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message("Inner", vec![scalar("value", FieldKind::U32)]),
                message(
                    "Outer",
                    vec![
                        narrowed("tag", FieldKind::U32, BitWidth::Eight),
                        scalar("inner", FieldKind::Message("Inner".to_string())),
                    ],
                ),
            ],
        );
        // Leading leaf is 4 bytes; offset 1 + 4 crosses the boundary at 4.
        let layout = resolver.layout("Outer").unwrap();
        assert_eq!(offsets(layout), vec![0, 4]);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn nested_message_with_byte_leaf_does_not_pad() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message(
                    "Inner",
                    vec![narrowed("small", FieldKind::U32, BitWidth::Eight)],
                ),
                message(
                    "Outer",
                    vec![
                        narrowed("tag", FieldKind::U32, BitWidth::Eight),
                        scalar("inner", FieldKind::Message("Inner".to_string())),
                    ],
                ),
            ],
        );
        // Leading leaf is 1 byte; offset 1 + 1 stays inside the word, so the
        // nested message (itself tail-padded to 4) starts at offset 1.
        let layout = resolver.layout("Outer").unwrap();
        assert_eq!(offsets(layout), vec![0, 1]);
        assert_eq!(layout.fields[1].field_size, 4);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn leading_leaf_descends_through_nested_chains() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message("Leaf", vec![scalar("wide", FieldKind::U64)]),
                message(
                    "Mid",
                    vec![scalar("leaf", FieldKind::Message("Leaf".to_string()))],
                ),
                message(
                    "Top",
                    vec![
                        narrowed("tag", FieldKind::U32, BitWidth::Eight),
                        scalar("mid", FieldKind::Message("Mid".to_string())),
                    ],
                ),
            ],
        );
        // Mid itself pads its leading nested field from offset 0 to the next
        // boundary (8-byte leaf crosses the word at 4), so Mid is 12 bytes.
        let mid = resolver.layout("Mid").unwrap();
        assert_eq!(offsets(mid), vec![4]);
        assert_eq!(mid.size, 12);

        // The leaf found two levels down is 8 bytes: 1 + 8 > 4, so pad.
        let layout = resolver.layout("Top").unwrap();
        assert_eq!(offsets(layout), vec![0, 4]);
        assert_eq!(layout.size, 16);
    }

    #[test]
    fn leading_leaf_uses_field_size_not_base_size() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message(
                    "Inner",
                    vec![array("data", FieldKind::U32, 2, None)],
                ),
                message(
                    "Outer",
                    vec![
                        narrowed("tag", FieldKind::U32, BitWidth::Eight),
                        scalar("inner", FieldKind::Message("Inner".to_string())),
                    ],
                ),
            ],
        );
        // Leaf field size is 8 (2 x u32); 1 + 8 > 4 forces padding.
        let layout = resolver.layout("Outer").unwrap();
        assert_eq!(offsets(layout), vec![0, 4]);
    }

    #[test]
    fn empty_nested_chain_makes_no_padding_decision() {
        let resolver = resolve(
            WordSize::Four,
            vec![
                message("Empty", vec![]),
                message(
                    "Outer",
                    vec![
                        narrowed("tag", FieldKind::U32, BitWidth::Eight),
                        scalar("hole", FieldKind::Message("Empty".to_string())),
                        scalar("value", FieldKind::U32),
                    ],
                ),
            ],
        );
        let layout = resolver.layout("Outer").unwrap();
        // The empty nested message occupies zero bytes at offset 1.
        assert_eq!(offsets(layout), vec![0, 1, 1]);
        assert_eq!(layout.fields[1].field_size, 0);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn zero_field_message_has_size_zero() {
        let resolver = resolve(WordSize::Four, vec![message("Empty", vec![])]);
        let layout = resolver.layout("Empty").unwrap();
        assert_eq!(layout.size, 0);
        assert!(layout.fields.is_empty());
    }

    #[test]
    fn narrowed_scalars_shrink_base_size() {
        let resolver = resolve(
            WordSize::Four,
            vec![message(
                "Narrow",
                vec![
                    narrowed("a", FieldKind::I32, BitWidth::Eight),
                    narrowed("b", FieldKind::U32, BitWidth::Sixteen),
                    narrowed("c", FieldKind::F32, BitWidth::Sixteen),
                ],
            )],
        );
        let layout = resolver.layout("Narrow").unwrap();
        assert_eq!(
            layout.fields.iter().map(|f| f.base_size).collect::<Vec<_>>(),
            vec![1, 2, 2]
        );
        assert_eq!(offsets(layout), vec![0, 1, 3]);
        assert_eq!(layout.size, 8);
    }

    #[test]
    fn word_size_one_never_tail_pads() {
        let resolver = resolve(
            WordSize::One,
            vec![message(
                "Tight",
                vec![
                    scalar("flag", FieldKind::Bool),
                    scalar("value", FieldKind::U32),
                ],
            )],
        );
        let layout = resolver.layout("Tight").unwrap();
        assert_eq!(offsets(layout), vec![0, 1]);
        assert_eq!(layout.size, 5);
    }

    #[test]
    fn repeated_field_without_length_is_rejected() {
        let mut resolver = LayoutResolver::new(WordSize::Four);
        resolver.add_message(message(
            "Bad",
            vec![FieldDef {
                name: "values".to_string(),
                kind: FieldKind::U32,
                repeated: true,
                options: FieldOptions::default(),
            }],
        ));
        let err = resolver.resolve_all().unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnsupportedField {
                path: "Bad.values".to_string()
            }
        );
    }

    #[test]
    fn repeated_message_field_is_rejected() {
        let mut resolver = LayoutResolver::new(WordSize::Four);
        resolver.add_message(message("Inner", vec![scalar("v", FieldKind::U32)]));
        resolver.add_message(message(
            "Bad",
            vec![array("inners", FieldKind::Message("Inner".to_string()), 2, None)],
        ));
        let err = resolver.resolve_all().unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnsupportedField {
                path: "Bad.inners".to_string()
            }
        );
    }

    #[test]
    fn weak_field_is_rejected() {
        let mut resolver = LayoutResolver::new(WordSize::Four);
        resolver.add_message(message(
            "Bad",
            vec![FieldDef {
                name: "legacy".to_string(),
                kind: FieldKind::U32,
                repeated: false,
                options: FieldOptions {
                    weak: true,
                    ..FieldOptions::default()
                },
            }],
        ));
        let err = resolver.resolve_all().unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnsupportedField {
                path: "Bad.legacy".to_string()
            }
        );
    }

    #[test]
    fn unknown_message_reference_is_reported() {
        let mut resolver = LayoutResolver::new(WordSize::Four);
        resolver.add_message(message(
            "Orphan",
            vec![scalar("ghost", FieldKind::Message("Missing".to_string()))],
        ));
        let err = resolver.resolve_all().unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownMessage {
                name: "Missing".to_string(),
                path: "Orphan.ghost".to_string()
            }
        );
    }

    #[test]
    fn layouts_are_deterministic() {
        let build = || {
            resolve(
                WordSize::Four,
                vec![
                    message("Inner", vec![scalar("value", FieldKind::U32)]),
                    message(
                        "Outer",
                        vec![
                            narrowed("tag", FieldKind::U32, BitWidth::Eight),
                            scalar("inner", FieldKind::Message("Inner".to_string())),
                            array("tail", FieldKind::U64, 3, None),
                        ],
                    ),
                ],
            )
        };
        let first = build();
        let second = build();
        assert_eq!(first.layout("Outer"), second.layout("Outer"));
        assert_eq!(first.layout("Inner"), second.layout("Inner"));
    }

    #[test]
    fn offsets_increase_and_stay_in_bounds() {
        let resolver = resolve(
            WordSize::Four,
            vec![message(
                "Mixed",
                vec![
                    scalar("flag", FieldKind::Bool),
                    array("data", FieldKind::U32, 3, None),
                    scalar("wide", FieldKind::F64),
                    blob("raw", 6),
                ],
            )],
        );
        let layout = resolver.layout("Mixed").unwrap();
        assert_eq!(layout.size % 4, 0);
        let mut last_offset = None;
        for slot in &layout.fields {
            if let Some(prev) = last_offset {
                assert!(slot.offset > prev);
            }
            assert!(slot.offset + slot.field_size <= layout.size);
            last_offset = Some(slot.offset);
        }
    }
}
