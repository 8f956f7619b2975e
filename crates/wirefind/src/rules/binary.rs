use wirefind_core::{TYPE_BOOLEAN, TYPE_OBJECT, TYPE_STRING, standard_serializer};

use crate::Result;
use crate::expr::{BinaryOp, ConstValue, ExprId, ExprKind, UnaryOp};

use super::Deducer;

/// Result families of the operator default table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum OperatorResult {
    /// `bool` only (comparisons, `&&`, `||`).
    Boolean,
    /// `bool` or integral (`&`, `|`, `^`, `!`, `~`).
    Logical,
    /// Any numeric type (arithmetic and shifts).
    Numeric,
}

impl Deducer<'_> {
    pub(crate) fn deduce_binary(
        &mut self,
        node: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<()> {
        if op == BinaryOp::ArrayIndex {
            return self.deduce_array_index(node, left, right);
        }

        if matches!(op, BinaryOp::Add | BinaryOp::AddChecked) && self.ty(node) == TYPE_STRING {
            self.returns_standard(node)?;
        }

        if op == BinaryOp::Coalesce {
            self.deduce_coalesce(node, left)?;
        }

        if op.is_symmetric() {
            match (self.unboxed(left), self.unboxed(right)) {
                (Some(left), Some(right)) => self.deduce_same(left, right)?,
                _ => self.deduce_same(left, right)?,
            }
        }

        let family = match op {
            _ if op.is_comparison() => Some(OperatorResult::Boolean),
            BinaryOp::AndAlso | BinaryOp::OrElse => Some(OperatorResult::Boolean),
            BinaryOp::And | BinaryOp::Or | BinaryOp::ExclusiveOr => Some(OperatorResult::Logical),
            _ if op.is_arithmetic() => Some(OperatorResult::Numeric),
            _ => None,
        };
        match family {
            Some(family) => self.deduce_operator_default(node, family),
            None => Ok(()),
        }
    }

    /// `Convert(Convert(e, object), T)` yields `e`: comparisons of boxed
    /// values compare the underlying values.
    fn unboxed(&self, node: ExprId) -> Option<ExprId> {
        let ExprKind::Unary {
            op: UnaryOp::Convert,
            operand,
        } = self.kind(node)
        else {
            return None;
        };
        let ExprKind::Unary {
            op: UnaryOp::Convert,
            operand: inner,
        } = self.kind(*operand)
        else {
            return None;
        };
        (self.ty(*operand) == TYPE_OBJECT).then_some(*inner)
    }

    fn deduce_array_index(&mut self, node: ExprId, array: ExprId, index: ExprId) -> Result<()> {
        if !self.is_known(index) {
            self.returns_standard(index)?;
        }
        if self.is_known(node) {
            return Ok(());
        }
        let Some(container) = self.known(array) else {
            return Ok(());
        };
        if container.is_unknowable() {
            return self.add_unknowable(node);
        }

        let item = match self.kind(index) {
            ExprKind::Constant(ConstValue::Int(position)) => match usize::try_from(*position) {
                Ok(position) => container.item_serializer_at(position),
                Err(_) => {
                    return Err(self.unsupported(index, "array index must not be negative"));
                }
            },
            _ => container.item_serializer(),
        };
        let item = item.map_err(|err| self.serializer_error(node, err))?;
        self.add(node, item)
    }

    /// `left ?? right` takes the left operand's serializer, unwrapping one
    /// level of nullable when the result is the underlying type.
    fn deduce_coalesce(&mut self, node: ExprId, left: ExprId) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let Some(left_serializer) = self.known(left) else {
            return Ok(());
        };

        let node_ty = self.ty(node);
        if left_serializer.value_type() == node_ty {
            return self.add(node, left_serializer);
        }
        if let Ok(inner) = left_serializer.nullable_value_serializer()
            && inner.value_type() == node_ty
        {
            return self.add(node, inner);
        }
        self.add_unknowable(node)
    }

    /// Default serializer of an operator result that nothing else
    /// resolved. Only applies once defaults are enabled.
    pub(crate) fn deduce_operator_default(
        &mut self,
        node: ExprId,
        family: OperatorResult,
    ) -> Result<()> {
        if !self.defaults || self.is_known(node) {
            return Ok(());
        }

        let types = self.types;
        let ty = types.strip_nullable(self.ty(node));
        let allowed = match family {
            OperatorResult::Boolean => ty == TYPE_BOOLEAN,
            OperatorResult::Logical => ty == TYPE_BOOLEAN || types.is_integral(ty),
            OperatorResult::Numeric => types.is_numeric(ty),
        };
        if !allowed {
            return Ok(());
        }
        match standard_serializer(types, self.ty(node)) {
            Some(serializer) => self.add(node, serializer),
            None => Ok(()),
        }
    }
}
