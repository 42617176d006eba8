use crate::error::LayoutError;
use cstruct_types::{FieldKind, MessageDef};
use std::collections::{BTreeMap, BTreeSet};

/// Tracks nested-message references for resolving layouts in dependency order.
#[derive(Debug)]
pub struct MessageGraph {
    nodes: BTreeMap<String, MessageNode>,
}

#[derive(Debug, Clone)]
pub struct MessageNode {
    pub name: String,
    pub deps: BTreeSet<String>,
}

impl MessageGraph {
    pub fn build(messages: &[MessageDef]) -> Self {
        let defined: BTreeSet<&str> = messages.iter().map(|m| m.name.as_str()).collect();
        let mut nodes = BTreeMap::new();
        for msg in messages {
            let mut deps = BTreeSet::new();
            for field in &msg.fields {
                if let FieldKind::Message(name) = &field.kind {
                    // Unknown references are reported with full field context by
                    // the resolver; only defined messages participate in the
                    // ordering. A self-reference stays in and surfaces as a cycle.
                    if defined.contains(name.as_str()) {
                        deps.insert(name.clone());
                    }
                }
            }
            nodes.insert(
                msg.name.clone(),
                MessageNode {
                    name: msg.name.clone(),
                    deps,
                },
            );
        }
        Self { nodes }
    }

    /// Orders messages so every nested message appears before its containers.
    /// Ties resolve alphabetically, which keeps the order stable across runs.
    pub fn topo_order(&self) -> Result<Vec<String>, LayoutError> {
        // Remaining unsatisfied references per message; a message is ready
        // once this set drains.
        let mut waiting: BTreeMap<&str, BTreeSet<&str>> = self
            .nodes
            .values()
            .map(|node| {
                let deps: BTreeSet<&str> = node.deps.iter().map(String::as_str).collect();
                (node.name.as_str(), deps)
            })
            .collect();

        let mut order = Vec::with_capacity(waiting.len());

        while !waiting.is_empty() {
            let ready: Vec<&str> = waiting
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| *name)
                .collect();

            if ready.is_empty() {
                // Everything left is waiting on something else that is left.
                let stuck = waiting.keys().map(|name| name.to_string()).collect();
                return Err(LayoutError::CircularNesting(stuck));
            }

            for name in ready {
                waiting.remove(name);
                for deps in waiting.values_mut() {
                    deps.remove(name);
                }
                order.push(name.to_string());
            }
        }

        Ok(order)
    }
}
