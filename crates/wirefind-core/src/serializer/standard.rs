//! Codecs every driver ships for builtin types.

use crate::types::{Primitive, TypeId, TypeShape, TypeTable};

use super::{DateTimeKind, Serializer, SerializerKind, TimeSpanUnits, WireType};

/// Representation a primitive is stored as unless configured otherwise.
pub fn default_representation(primitive: Primitive) -> WireType {
    match primitive {
        Primitive::Boolean => WireType::Boolean,
        Primitive::Char
        | Primitive::SByte
        | Primitive::Byte
        | Primitive::Int16
        | Primitive::UInt16
        | Primitive::Int32
        | Primitive::UInt32 => WireType::Int32,
        Primitive::Int64 | Primitive::UInt64 => WireType::Int64,
        Primitive::Single | Primitive::Double => WireType::Double,
        Primitive::Decimal | Primitive::Decimal128 => WireType::Decimal128,
        Primitive::String | Primitive::TimeSpan => WireType::String,
        Primitive::DateTime => WireType::DateTime,
        Primitive::Guid => WireType::Binary,
        Primitive::ObjectId => WireType::ObjectId,
    }
}

/// Standard serializer for builtin scalars, nullable scalars, arrays of
/// them, and the wire-value types. `None` for everything else.
pub fn standard_serializer(types: &TypeTable, ty: TypeId) -> Option<Serializer> {
    let kind = match types.get(ty)? {
        TypeShape::Primitive(Primitive::DateTime) => SerializerKind::DateTime {
            kind: DateTimeKind::Unspecified,
        },
        TypeShape::Primitive(Primitive::TimeSpan) => SerializerKind::TimeSpan {
            representation: WireType::String,
            units: TimeSpanUnits::Ticks,
        },
        TypeShape::Primitive(p) => SerializerKind::Primitive {
            representation: default_representation(*p),
        },
        TypeShape::WireValue => SerializerKind::WireValue,
        TypeShape::Document => SerializerKind::Document,
        TypeShape::Nullable(inner) => SerializerKind::Nullable(standard_serializer(types, *inner)?),
        TypeShape::Array(item) => SerializerKind::Array(standard_serializer(types, *item)?),
        _ => return None,
    };
    Some(Serializer::new(ty, kind))
}
