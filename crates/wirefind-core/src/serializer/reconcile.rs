//! Fitting a serializer to a static type.

use crate::types::{TypeId, TypeShape, TypeTable};

use super::{Serializer, SerializerError, SerializerKind, WireType};

/// Make `serializer` encode values of `target`.
///
/// Tried in order: identical types; nullable-wrapper against enum
/// underlying type (rewrap); `target` is a base of the serializer's value
/// type (downcasting wrapper); `target` derives from it (upcasting
/// wrapper). Anything else is a mismatch.
pub fn coerce(
    types: &TypeTable,
    serializer: Serializer,
    target: TypeId,
) -> Result<Serializer, SerializerError> {
    let source = serializer.value_type();
    if source == target {
        return Ok(serializer);
    }
    if serializer.is_sentinel() {
        return Ok(serializer.retarget(target));
    }

    if let Some(rewrapped) = rewrap_enum(types, &serializer, target)? {
        return Ok(rewrapped);
    }
    if types.is_assignable_from(target, source) {
        return Ok(Serializer::downcast(target, serializer));
    }
    if types.is_assignable_from(source, target) {
        return Ok(Serializer::upcast(target, serializer));
    }

    Err(SerializerError::ValueTypeMismatch {
        found: types.display(source).to_string(),
        expected: types.display(target).to_string(),
    })
}

/// Handles `E` against `U` and `E?` against `U?`, where `U` is the
/// underlying type of enum `E`.
fn rewrap_enum(
    types: &TypeTable,
    serializer: &Serializer,
    target: TypeId,
) -> Result<Option<Serializer>, SerializerError> {
    let source = serializer.value_type();
    match (types.nullable_underlying(source), types.nullable_underlying(target)) {
        (Some(source_inner), Some(target_inner)) => {
            let inner = serializer.nullable_value_serializer()?;
            let Some(converted) = enum_bridge(types, &inner, source_inner, target_inner) else {
                return Ok(None);
            };
            Ok(Some(Serializer::nullable(target, converted)))
        }
        (None, None) => Ok(enum_bridge(types, serializer, source, target)),
        _ => Ok(None),
    }
}

fn enum_bridge(
    types: &TypeTable,
    serializer: &Serializer,
    source: TypeId,
    target: TypeId,
) -> Option<Serializer> {
    if types.enum_underlying(source) == Some(target) {
        return Some(Serializer::new(
            target,
            SerializerKind::EnumUnderlying(serializer.clone()),
        ));
    }
    if types.enum_underlying(target) == Some(source) {
        return Some(enum_over_underlying(target, serializer));
    }
    None
}

/// Enum codec for `enum_ty` that stores values the way `underlying` stores
/// numbers. Unwraps a previous enum-to-underlying adapter when it belongs to
/// the same enum.
pub fn enum_over_underlying(enum_ty: TypeId, underlying: &Serializer) -> Serializer {
    if let SerializerKind::EnumUnderlying(inner) = underlying.kind()
        && inner.value_type() == enum_ty
    {
        return inner.clone();
    }
    Serializer::new(
        enum_ty,
        SerializerKind::Enum {
            representation: underlying.representation().unwrap_or(WireType::Int32),
        },
    )
}

/// Serializer of `collection` (an array or generic collection type) whose
/// items use `item`.
pub fn collection_serializer(
    types: &TypeTable,
    collection: TypeId,
    item: Serializer,
) -> Result<Serializer, SerializerError> {
    if item.is_unknowable() {
        return Ok(Serializer::unknowable(collection));
    }
    match types.get(collection) {
        Some(TypeShape::Array(item_ty)) => {
            Ok(Serializer::array(collection, coerce(types, item, *item_ty)?))
        }
        Some(TypeShape::Collection { item: item_ty, .. }) => Ok(Serializer::collection(
            collection,
            coerce(types, item, *item_ty)?,
        )),
        _ => Err(SerializerError::NotACollection(
            types.display(collection).to_string(),
        )),
    }
}
