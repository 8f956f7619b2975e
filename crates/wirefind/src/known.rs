//! The known-serializer map: fixed-point state of one inference run.

use indexmap::IndexMap;
use wirefind_core::{Serializer, SerializerError, TypeTable, coerce};

use crate::expr::{ExprId, ExprPrinter, ExprTree};
use crate::{Error, Result};

/// Append-only association from expression nodes to serializers.
///
/// Insertion fits the serializer to the node's static type (see
/// [`wirefind_core::coerce`]) and rejects a second, different serializer
/// for the same node. Entries keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct KnownSerializers {
    map: IndexMap<ExprId, Serializer>,
}

impl KnownSerializers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `serializer` for `node`. Returns whether the map grew.
    ///
    /// Re-adding a serializer equal to the recorded one is a no-op.
    pub fn add(
        &mut self,
        tree: &ExprTree,
        types: &TypeTable,
        node: ExprId,
        serializer: Serializer,
    ) -> Result<bool> {
        let expected = tree.ty(node);
        let serializer = coerce(types, serializer, expected).map_err(|err| match err {
            SerializerError::ValueTypeMismatch { found, expected } => Error::ValueTypeMismatch {
                expression: render(tree, types, node),
                serializer_type: found,
                expression_type: expected,
            },
            source => Error::Serializer {
                expression: render(tree, types, node),
                source,
            },
        })?;

        if let Some(existing) = self.map.get(&node) {
            if *existing == serializer {
                return Ok(false);
            }
            return Err(Error::DuplicateSerializer {
                expression: render(tree, types, node),
                existing: existing.display(types).to_string(),
                new: serializer.display(types).to_string(),
            });
        }

        self.map.insert(node, serializer);
        Ok(true)
    }

    /// Absent nodes are never known.
    pub fn is_known(&self, node: Option<ExprId>) -> bool {
        node.is_some_and(|node| self.map.contains_key(&node))
    }

    pub fn get(&self, node: ExprId) -> Option<&Serializer> {
        self.map.get(&node)
    }

    /// Serializer of `node`, for consumers of a completed map.
    pub fn get_serializer(
        &self,
        tree: &ExprTree,
        types: &TypeTable,
        node: ExprId,
    ) -> Result<&Serializer> {
        self.map
            .get(&node)
            .ok_or_else(|| Error::UnableToDetermineSerializer {
                expression: render(tree, types, node),
            })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Serializer)> {
        self.map.iter().map(|(&node, serializer)| (node, serializer))
    }

    /// One `expression: serializer` line per entry, in insertion order.
    pub fn dump(&self, tree: &ExprTree, types: &TypeTable) -> String {
        self.map
            .iter()
            .map(|(&node, serializer)| {
                format!(
                    "{}: {}\n",
                    ExprPrinter::new(tree, types, node),
                    serializer.display(types)
                )
            })
            .collect()
    }
}

pub(crate) fn render(tree: &ExprTree, types: &TypeTable, node: ExprId) -> String {
    ExprPrinter::new(tree, types, node).to_string()
}
