use wirefind_core::TypeShape;

use crate::Result;
use crate::expr::{ConstValue, ExprId};

use super::Deducer;

impl Deducer<'_> {
    /// Configuration values never reach the wire. Other constants take
    /// their serializer from context, or from the registry once defaults
    /// apply.
    pub(crate) fn deduce_constant(&mut self, node: ExprId, value: &ConstValue) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }

        let metadata = matches!(
            value,
            ConstValue::Serializer(_)
                | ConstValue::Representation(_)
                | ConstValue::Stage(_)
                | ConstValue::Collection { .. }
        ) || matches!(self.types.get(self.ty(node)), Some(TypeShape::Meta(_)));
        if metadata {
            return self.add_ignore_subtree(node);
        }

        if self.defaults {
            let serializer = self.lookup(node, self.ty(node))?;
            return self.add(node, serializer);
        }
        Ok(())
    }
}
