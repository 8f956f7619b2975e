use crate::Result;
use crate::expr::ExprId;

use super::Deducer;
use super::binary::OperatorResult;

impl Deducer<'_> {
    /// Both branches and the result share a serializer.
    pub(crate) fn deduce_conditional(
        &mut self,
        node: ExprId,
        test: ExprId,
        if_true: ExprId,
        if_false: ExprId,
    ) -> Result<()> {
        self.deduce_same(if_true, if_false)?;
        self.deduce_same(node, if_true)?;
        self.deduce_same(node, if_false)?;
        self.deduce_same(if_true, if_false)?;
        self.deduce_operator_default(test, OperatorResult::Boolean)
    }

    pub(crate) fn deduce_type_is(&mut self, node: ExprId) -> Result<()> {
        self.returns_standard(node)
    }
}
