//! Propagation rules.
//!
//! A [`Deducer`] walks the tree once per pass. At every node it runs the
//! node's rule, descends into the operands, then runs the rule again, so
//! facts flow both top-down and bottom-up within one visit. Rules only add
//! entries; nodes whose serializer is a sentinel are not descended into.

mod binary;
mod conditional;
mod constant;
mod convert;
mod member;
mod method;
mod new;
mod new_array;
mod unary;

#[cfg(test)]
mod unary_tests;

use tracing::trace;
use wirefind_core::{
    Serializer, SerializerError, SerializerRegistry, TYPE_OBJECT, TypeId, TypeTable,
    collection_serializer, standard_serializer,
};

use crate::expr::{ExprId, ExprKind, ExprTree};
use crate::known::{KnownSerializers, render};
use crate::{Error, Result};

pub(crate) use method::CallSite;

pub(crate) struct Deducer<'a> {
    pub(crate) tree: &'a ExprTree,
    pub(crate) types: &'a TypeTable,
    pub(crate) registry: &'a dyn SerializerRegistry,
    pub(crate) known: KnownSerializers,
    /// Set once the first fixed point is reached: unresolved constants and
    /// operator results may now take default serializers.
    pub(crate) defaults: bool,
}

impl<'a> Deducer<'a> {
    pub(crate) fn new(
        tree: &'a ExprTree,
        types: &'a TypeTable,
        registry: &'a dyn SerializerRegistry,
        known: KnownSerializers,
    ) -> Self {
        Self {
            tree,
            types,
            registry,
            known,
            defaults: false,
        }
    }

    pub(crate) fn into_known(self) -> KnownSerializers {
        self.known
    }

    pub(crate) fn visit(&mut self, node: ExprId) -> Result<()> {
        if self.is_pruned(node) {
            return Ok(());
        }

        let tree = self.tree;
        match tree.kind(node) {
            ExprKind::Constant(value) => self.deduce_constant(node, value),
            ExprKind::Parameter { .. } => Ok(()),
            ExprKind::Lambda { body, .. } => self.visit(*body),
            ExprKind::Quote(inner) => self.visit(*inner),
            ExprKind::Member { object, member } => {
                self.visit_around(node, |cx| cx.deduce_member(node, *object, member))
            }
            ExprKind::Unary { op, operand } => {
                self.visit_around(node, |cx| cx.deduce_unary(node, *op, *operand))
            }
            ExprKind::Binary { op, left, right } => {
                self.visit_around(node, |cx| cx.deduce_binary(node, *op, *left, *right))
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => self.visit_around(node, |cx| {
                cx.deduce_conditional(node, *test, *if_true, *if_false)
            }),
            ExprKind::TypeIs { .. } => self.visit_around(node, |cx| cx.deduce_type_is(node)),
            ExprKind::Call {
                method,
                object,
                args,
            } => {
                let call = CallSite {
                    node,
                    method,
                    object: *object,
                    args,
                };
                self.visit_around(node, |cx| cx.deduce_call(&call))
            }
            ExprKind::New { .. } => self.visit_new(node, true),
            ExprKind::MemberInit { new, bindings } => {
                self.deduce_member_init(node)?;
                if self.is_pruned(node) {
                    return Ok(());
                }
                self.visit_new(*new, false)?;
                for (_, value) in bindings {
                    self.visit(*value)?;
                }
                self.deduce_member_init(node)
            }
            ExprKind::NewArrayInit { items } => {
                self.visit_around(node, |cx| cx.deduce_new_array(node, items))
            }
            ExprKind::NewArrayBounds { .. } => Err(self.unsupported(
                node,
                "array creation without initializers is not supported",
            )),
        }
    }

    /// Rule, operands, rule again.
    fn visit_around(
        &mut self,
        node: ExprId,
        deduce: impl Fn(&mut Self) -> Result<()>,
    ) -> Result<()> {
        deduce(self)?;
        if self.is_pruned(node) {
            return Ok(());
        }
        for child in self.tree.children(node) {
            self.visit(child)?;
        }
        deduce(self)
    }

    pub(crate) fn ty(&self, node: ExprId) -> TypeId {
        self.tree.ty(node)
    }

    pub(crate) fn kind(&self, node: ExprId) -> &'a ExprKind {
        self.tree.kind(node)
    }

    pub(crate) fn known(&self, node: ExprId) -> Option<Serializer> {
        self.known.get(node).cloned()
    }

    pub(crate) fn is_known(&self, node: ExprId) -> bool {
        self.known.is_known(Some(node))
    }

    pub(crate) fn is_pruned(&self, node: ExprId) -> bool {
        self.known.get(node).is_some_and(Serializer::is_sentinel)
    }

    pub(crate) fn add(&mut self, node: ExprId, serializer: Serializer) -> Result<()> {
        if self.known.add(self.tree, self.types, node, serializer)?
            && let Some(added) = self.known.get(node)
        {
            trace!(
                node = node.index(),
                serializer = %added.display(self.types),
                "serializer deduced"
            );
        }
        Ok(())
    }

    pub(crate) fn add_if_unknown(&mut self, node: ExprId, serializer: Serializer) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        self.add(node, serializer)
    }

    pub(crate) fn add_unknowable(&mut self, node: ExprId) -> Result<()> {
        self.add_if_unknown(node, Serializer::unknowable(self.ty(node)))
    }

    pub(crate) fn add_ignore_subtree(&mut self, node: ExprId) -> Result<()> {
        self.add_if_unknown(node, Serializer::ignore_subtree(self.ty(node)))
    }

    /// Standard serializer for the node's static type.
    pub(crate) fn standard(&self, node: ExprId) -> Result<Serializer> {
        standard_serializer(self.types, self.ty(node)).ok_or_else(|| {
            self.unsupported(
                node,
                format!(
                    "no standard serializer exists for type {}",
                    self.types.display(self.ty(node))
                ),
            )
        })
    }

    pub(crate) fn returns_standard(&mut self, node: ExprId) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let serializer = self.standard(node)?;
        self.add(node, serializer)
    }

    pub(crate) fn lookup(&self, node: ExprId, ty: TypeId) -> Result<Serializer> {
        self.registry
            .lookup(ty)
            .map_err(|err| self.serializer_error(node, err))
    }

    /// Exact-type symmetric propagation between two nodes.
    pub(crate) fn deduce_same(&mut self, a: ExprId, b: ExprId) -> Result<()> {
        if self.ty(a) != self.ty(b) {
            return Ok(());
        }
        match (self.known(a), self.known(b)) {
            (Some(known), None) => self.add(b, known),
            (None, Some(known)) => self.add(a, known),
            _ => Ok(()),
        }
    }

    /// Item serializer of a node known to hold a sequence. Sentinels
    /// propagate to the items.
    pub(crate) fn item_of(&self, collection: ExprId) -> Result<Option<Serializer>> {
        let Some(serializer) = self.known(collection) else {
            return Ok(None);
        };
        let item_ty = || {
            self.types
                .item_type(serializer.value_type())
                .unwrap_or(TYPE_OBJECT)
        };
        if serializer.is_unknowable() {
            return Ok(Some(Serializer::unknowable(item_ty())));
        }
        if serializer.is_ignore_subtree() {
            return Ok(Some(Serializer::ignore_subtree(item_ty())));
        }
        serializer
            .item_serializer()
            .map(Some)
            .map_err(|err| self.serializer_error(collection, err))
    }

    /// Serializer for `collection`'s static type holding items encoded by
    /// `item`.
    pub(crate) fn collection_of(&self, collection: ExprId, item: Serializer) -> Result<Serializer> {
        collection_serializer(self.types, self.ty(collection), item)
            .map_err(|err| self.serializer_error(collection, err))
    }

    /// Items of `collection` and `item` share a serializer, in whichever
    /// direction is currently known.
    pub(crate) fn deduce_item_and_collection(
        &mut self,
        item: ExprId,
        collection: ExprId,
    ) -> Result<()> {
        if !self.is_known(item)
            && let Some(serializer) = self.item_of(collection)?
        {
            self.add(item, serializer)?;
        }
        if !self.is_known(collection)
            && let Some(serializer) = self.known(item)
        {
            let serializer = self.collection_of(collection, serializer)?;
            self.add(collection, serializer)?;
        }
        Ok(())
    }

    pub(crate) fn deduce_collection_and_item(
        &mut self,
        collection: ExprId,
        item: ExprId,
    ) -> Result<()> {
        self.deduce_item_and_collection(item, collection)
    }

    /// Two sequences whose items share a serializer.
    pub(crate) fn deduce_collection_and_collection(
        &mut self,
        a: ExprId,
        b: ExprId,
    ) -> Result<()> {
        if !self.is_known(a)
            && let Some(item) = self.item_of(b)?
        {
            let serializer = self.collection_of(a, item)?;
            self.add(a, serializer)?;
        }
        if !self.is_known(b)
            && let Some(item) = self.item_of(a)?
        {
            let serializer = self.collection_of(b, item)?;
            self.add(b, serializer)?;
        }
        Ok(())
    }

    pub(crate) fn render(&self, node: ExprId) -> String {
        render(self.tree, self.types, node)
    }

    pub(crate) fn unsupported(&self, node: ExprId, reason: impl Into<String>) -> Error {
        Error::UnsupportedExpression {
            expression: self.render(node),
            reason: reason.into(),
        }
    }

    pub(crate) fn serializer_error(&self, node: ExprId, source: SerializerError) -> Error {
        Error::Serializer {
            expression: self.render(node),
            source,
        }
    }
}
