use wirefind_core::{
    Capability, Serializer, SerializerKind, TYPE_DATETIME, TYPE_STRING, TypeShape,
};

use crate::Result;
use crate::expr::ExprId;

use super::Deducer;

const DATE_PARTS: &[&str] = &[
    "Year",
    "Month",
    "Day",
    "Hour",
    "Minute",
    "Second",
    "Millisecond",
    "DayOfWeek",
    "DayOfYear",
    "Ticks",
    "TimeOfDay",
];

impl Deducer<'_> {
    pub(crate) fn deduce_member(
        &mut self,
        node: ExprId,
        object: Option<ExprId>,
        member: &str,
    ) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let Some(object) = object else {
            return self.deduce_static_member(node, member);
        };
        let Some(container) = self.known(object) else {
            return Ok(());
        };
        if container.is_unknowable() {
            return self.add_unknowable(node);
        }

        match self.member_serializer(node, object, &container, member)? {
            Some(serializer) => self.add(node, serializer),
            None => self.add_unknowable(node),
        }
    }

    fn member_serializer(
        &self,
        node: ExprId,
        object: ExprId,
        container: &Serializer,
        member: &str,
    ) -> Result<Option<Serializer>> {
        let types = self.types;
        let object_ty = self.ty(object);
        let fail = |err| self.serializer_error(node, err);

        if types.is_nullable(object_ty) {
            return match member {
                "Value" => container.nullable_value_serializer().map(Some).map_err(fail),
                "HasValue" => self.standard(node).map(Some),
                _ => Ok(None),
            };
        }

        if container.has(Capability::Members) {
            return container
                .member_serializer(types, self.registry, member)
                .map(Some)
                .map_err(fail);
        }

        let shape = types.shape(object_ty);
        let serializer = match (shape, member) {
            (TypeShape::Tuple { .. }, "Rest") => match container.kind() {
                SerializerKind::Tuple(items) if items.len() == 8 => Some(items[7].clone()),
                _ => None,
            },
            (TypeShape::Tuple { .. }, _) => match tuple_position(member) {
                Some(position) => Some(container.tuple_item_serializer(position).map_err(fail)?),
                None => None,
            },
            (TypeShape::KeyValuePair { .. }, "Key") | (TypeShape::Grouping { .. }, "Key") => {
                Some(container.key_serializer().map_err(fail)?)
            }
            (TypeShape::KeyValuePair { .. }, "Value") => {
                Some(container.value_serializer().map_err(fail)?)
            }
            (TypeShape::Dictionary { .. }, "Keys") => {
                let keys = container.key_serializer().map_err(fail)?;
                Some(self.collection_of(node, keys)?)
            }
            (TypeShape::Dictionary { .. }, "Values") => {
                let values = container.value_serializer().map_err(fail)?;
                Some(self.collection_of(node, values)?)
            }
            (_, "Length") if object_ty == TYPE_STRING => Some(self.standard(node)?),
            (TypeShape::Array(_) | TypeShape::Collection { .. } | TypeShape::Dictionary { .. }, "Count" | "Length") => {
                Some(self.standard(node)?)
            }
            (_, "Date") if object_ty == TYPE_DATETIME => Some(container.clone()),
            (_, part) if object_ty == TYPE_DATETIME && DATE_PARTS.contains(&part) => {
                Some(self.lookup(node, self.ty(node))?)
            }
            _ => None,
        };
        Ok(serializer)
    }

    /// `DateTime.Now` and friends; other static members behave like
    /// captured constants.
    fn deduce_static_member(&mut self, node: ExprId, member: &str) -> Result<()> {
        if self.ty(node) == TYPE_DATETIME && matches!(member, "Now" | "UtcNow" | "Today") {
            return self.returns_standard(node);
        }
        if self.defaults {
            let serializer = self.lookup(node, self.ty(node))?;
            return self.add(node, serializer);
        }
        Ok(())
    }
}

fn tuple_position(member: &str) -> Option<usize> {
    let position: usize = member.strip_prefix("Item")?.parse().ok()?;
    (1..=7).contains(&position).then_some(position)
}
