//! Incremental construction of expression trees.
//!
//! The builder interns the types it derives (lambda signatures, array
//! literal types), so it borrows the type table mutably. Build the tree
//! before sharing the table with a registry.

use std::sync::Arc;

use wirefind_core::{
    Serializer, TYPE_BOOLEAN, TYPE_COLLECTION_HANDLE, TYPE_DOUBLE, TYPE_INT32, TYPE_INT64,
    TYPE_OBJECT, TYPE_PIPELINE_STAGE, TYPE_REPRESENTATION, TYPE_SERIALIZER, TYPE_STRING, TypeId,
    TypeTable, WireType,
};

use super::{BinaryOp, ConstValue, ExprId, ExprKind, ExprTree, MethodRef, PipelineStage, UnaryOp};

pub struct ExprBuilder<'t> {
    types: &'t mut TypeTable,
    tree: ExprTree,
}

impl<'t> ExprBuilder<'t> {
    pub fn new(types: &'t mut TypeTable) -> Self {
        Self {
            types,
            tree: ExprTree::default(),
        }
    }

    pub fn types(&mut self) -> &mut TypeTable {
        &mut *self.types
    }

    pub fn finish(self) -> ExprTree {
        self.tree
    }

    pub fn ty(&self, id: ExprId) -> TypeId {
        self.tree.ty(id)
    }

    pub fn constant(&mut self, ty: TypeId, value: ConstValue) -> ExprId {
        self.tree.push(ty, ExprKind::Constant(value))
    }

    pub fn null(&mut self, ty: TypeId) -> ExprId {
        self.constant(ty, ConstValue::Null)
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.constant(TYPE_BOOLEAN, ConstValue::Bool(value))
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.constant(TYPE_INT32, ConstValue::Int(value.into()))
    }

    pub fn long(&mut self, value: i64) -> ExprId {
        self.constant(TYPE_INT64, ConstValue::Int(value))
    }

    pub fn double(&mut self, value: f64) -> ExprId {
        self.constant(TYPE_DOUBLE, ConstValue::Float(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.constant(TYPE_STRING, ConstValue::String(value.to_owned()))
    }

    pub fn serializer(&mut self, serializer: Option<Serializer>) -> ExprId {
        self.constant(TYPE_SERIALIZER, ConstValue::Serializer(serializer))
    }

    pub fn representation(&mut self, representation: WireType) -> ExprId {
        self.constant(
            TYPE_REPRESENTATION,
            ConstValue::Representation(representation),
        )
    }

    pub fn stage(&mut self, stage: Arc<dyn PipelineStage>) -> ExprId {
        self.constant(TYPE_PIPELINE_STAGE, ConstValue::Stage(stage))
    }

    pub fn collection(&mut self, name: &str, document: Serializer) -> ExprId {
        self.constant(
            TYPE_COLLECTION_HANDLE,
            ConstValue::Collection {
                name: name.to_owned(),
                document,
            },
        )
    }

    pub fn parameter(&mut self, name: &str, ty: TypeId) -> ExprId {
        self.tree.push(
            ty,
            ExprKind::Parameter {
                name: name.to_owned(),
            },
        )
    }

    pub fn member(&mut self, object: ExprId, member: &str, ty: TypeId) -> ExprId {
        self.tree.push(
            ty,
            ExprKind::Member {
                object: Some(object),
                member: member.to_owned(),
            },
        )
    }

    /// Member access whose type is the declared type of a class member.
    /// Falls back to the `object` type for members the table does not know.
    pub fn field(&mut self, object: ExprId, member: &str) -> ExprId {
        let ty = self
            .types
            .member_type(self.tree.ty(object), member)
            .unwrap_or(TYPE_OBJECT);
        self.member(object, member, ty)
    }

    pub fn static_member(&mut self, member: &str, ty: TypeId) -> ExprId {
        self.tree.push(
            ty,
            ExprKind::Member {
                object: None,
                member: member.to_owned(),
            },
        )
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, ty: TypeId) -> ExprId {
        self.tree.push(ty, ExprKind::Unary { op, operand })
    }

    pub fn convert(&mut self, operand: ExprId, ty: TypeId) -> ExprId {
        self.unary(UnaryOp::Convert, operand, ty)
    }

    pub fn negate(&mut self, operand: ExprId) -> ExprId {
        let ty = self.tree.ty(operand);
        self.unary(UnaryOp::Negate, operand, ty)
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        let ty = self.tree.ty(operand);
        self.unary(UnaryOp::Not, operand, ty)
    }

    pub fn array_length(&mut self, array: ExprId) -> ExprId {
        self.unary(UnaryOp::ArrayLength, array, TYPE_INT32)
    }

    /// Binary node typed the way the operator implies: comparisons and
    /// short-circuit operators are `bool`, indexing yields the item type,
    /// coalescing yields the right operand's type, and everything else keeps
    /// the left operand's type.
    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let ty = match op {
            _ if op.is_comparison() => TYPE_BOOLEAN,
            BinaryOp::AndAlso | BinaryOp::OrElse => TYPE_BOOLEAN,
            BinaryOp::ArrayIndex => self
                .types
                .item_type(self.tree.ty(left))
                .unwrap_or(TYPE_OBJECT),
            BinaryOp::Coalesce => self.tree.ty(right),
            _ => self.tree.ty(left),
        };
        self.binary_typed(op, left, right, ty)
    }

    pub fn binary_typed(&mut self, op: BinaryOp, left: ExprId, right: ExprId, ty: TypeId) -> ExprId {
        self.tree.push(ty, ExprKind::Binary { op, left, right })
    }

    pub fn conditional(&mut self, test: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId {
        let ty = self.tree.ty(if_true);
        self.tree.push(
            ty,
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            },
        )
    }

    pub fn type_is(&mut self, operand: ExprId, tested: TypeId) -> ExprId {
        self.tree
            .push(TYPE_BOOLEAN, ExprKind::TypeIs { operand, tested })
    }

    pub fn call(
        &mut self,
        method: MethodRef,
        object: Option<ExprId>,
        args: &[ExprId],
        ty: TypeId,
    ) -> ExprId {
        self.tree.push(
            ty,
            ExprKind::Call {
                method,
                object,
                args: args.to_vec(),
            },
        )
    }

    /// Lambda typed `Func<params.., body>`.
    pub fn lambda(&mut self, params: &[ExprId], body: ExprId) -> ExprId {
        let param_types: Vec<TypeId> = params.iter().map(|&p| self.tree.ty(p)).collect();
        let ty = self.types.func(&param_types, self.tree.ty(body));
        self.tree.push(
            ty,
            ExprKind::Lambda {
                params: params.to_vec(),
                body,
            },
        )
    }

    pub fn quote(&mut self, lambda: ExprId) -> ExprId {
        let ty = self.types.quoted(self.tree.ty(lambda));
        self.tree.push(ty, ExprKind::Quote(lambda))
    }

    /// Quoted lambda, the argument form of queryable operators.
    pub fn quoted_lambda(&mut self, params: &[ExprId], body: ExprId) -> ExprId {
        let lambda = self.lambda(params, body);
        self.quote(lambda)
    }

    pub fn new_object(&mut self, ty: TypeId, params: &[&str], args: &[ExprId]) -> ExprId {
        debug_assert_eq!(params.len(), args.len());
        self.tree.push(
            ty,
            ExprKind::New {
                params: params.iter().map(|&p| p.to_owned()).collect(),
                args: args.to_vec(),
                members: None,
            },
        )
    }

    /// Construction of a projection type whose constructor assigns each
    /// argument to the member of the same name (`new { A = .., B = .. }`).
    pub fn anonymous(&mut self, ty: TypeId, members: &[&str], args: &[ExprId]) -> ExprId {
        debug_assert_eq!(members.len(), args.len());
        let names: Vec<String> = members.iter().map(|&m| m.to_owned()).collect();
        self.tree.push(
            ty,
            ExprKind::New {
                params: names.clone(),
                args: args.to_vec(),
                members: Some(names),
            },
        )
    }

    pub fn member_init(&mut self, new: ExprId, bindings: &[(&str, ExprId)]) -> ExprId {
        let ty = self.tree.ty(new);
        self.tree.push(
            ty,
            ExprKind::MemberInit {
                new,
                bindings: bindings
                    .iter()
                    .map(|&(name, value)| (name.to_owned(), value))
                    .collect(),
            },
        )
    }

    pub fn new_array(&mut self, item: TypeId, items: &[ExprId]) -> ExprId {
        let ty = self.types.array(item);
        self.tree.push(
            ty,
            ExprKind::NewArrayInit {
                items: items.to_vec(),
            },
        )
    }

    pub fn new_array_bounds(&mut self, item: TypeId, bounds: &[ExprId]) -> ExprId {
        let ty = self.types.array(item);
        self.tree.push(
            ty,
            ExprKind::NewArrayBounds {
                bounds: bounds.to_vec(),
            },
        )
    }
}
