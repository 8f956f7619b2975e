use crate::Result;
use crate::expr::{ExprId, UnaryOp};

use super::Deducer;
use super::binary::OperatorResult;

impl Deducer<'_> {
    pub(crate) fn deduce_unary(&mut self, node: ExprId, op: UnaryOp, operand: ExprId) -> Result<()> {
        match op {
            UnaryOp::Negate | UnaryOp::NegateChecked | UnaryOp::UnaryPlus => {
                self.deduce_same(node, operand)
            }
            UnaryOp::ArrayLength => self.returns_standard(node),
            UnaryOp::Not => self.deduce_operator_default(node, OperatorResult::Logical),
            UnaryOp::Convert | UnaryOp::ConvertChecked | UnaryOp::TypeAs => {
                self.deduce_convert(node, operand)
            }
        }
    }
}
