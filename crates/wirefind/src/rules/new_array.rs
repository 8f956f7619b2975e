use wirefind_core::{Serializer, SerializerKind};

use crate::Result;
use crate::expr::ExprId;

use super::Deducer;

impl Deducer<'_> {
    /// `new[] { a, b, c }`.
    pub(crate) fn deduce_new_array(&mut self, node: ExprId, items: &[ExprId]) -> Result<()> {
        if let Some(array) = self.known(node) {
            if array.is_sentinel() {
                return Ok(());
            }
            for (index, &item) in items.iter().enumerate() {
                if self.is_known(item) {
                    continue;
                }
                let serializer = array
                    .item_serializer_at(index)
                    .map_err(|err| self.serializer_error(node, err))?;
                self.add(item, serializer)?;
            }
            return Ok(());
        }

        let types = self.types;
        let node_ty = self.ty(node);
        let item_ty = types.item_type(node_ty);

        if items.is_empty() {
            let Some(item_ty) = item_ty else {
                return Ok(());
            };
            let item = self.lookup(node, item_ty)?;
            let serializer = self.collection_of(node, item)?;
            return self.add(node, serializer);
        }

        let known: Vec<Serializer> = items.iter().filter_map(|&item| self.known(item)).collect();
        if known.len() == items.len()
            && let Some(first) = known.first()
            && known.iter().any(|serializer| serializer != first)
        {
            if known.iter().any(Serializer::is_unknowable) {
                return self.add_unknowable(node);
            }
            let serializer = Serializer::new(node_ty, SerializerKind::PolymorphicArray(known));
            return self.add(node, serializer);
        }

        let Some(first) = known.into_iter().next() else {
            return Ok(());
        };
        let serializer = self.collection_of(node, first)?;
        self.add(node, serializer)
    }
}
