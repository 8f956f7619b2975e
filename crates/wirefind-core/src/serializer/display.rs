//! Codec-name rendering (`NullableSerializer<Int32Serializer>`).

use std::fmt;

use crate::types::{TypeShape, TypeTable};

use super::{DateTimeKind, Serializer, SerializerKind, WireType, default_representation};

/// Display adapter returned by [`Serializer::display`].
pub struct SerializerDisplay<'a> {
    serializer: &'a Serializer,
    types: &'a TypeTable,
}

impl<'a> SerializerDisplay<'a> {
    pub(super) fn new(serializer: &'a Serializer, types: &'a TypeTable) -> Self {
        Self { serializer, types }
    }

    fn child(&self, serializer: &'a Serializer) -> Self {
        Self::new(serializer, self.types)
    }

    fn list(&self, f: &mut fmt::Formatter<'_>, name: &str, items: &'a [Serializer]) -> fmt::Result {
        write!(f, "{name}<")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.child(item))?;
        }
        f.write_str(">")
    }

    fn value_type(&self) -> impl fmt::Display + '_ {
        self.types.display(self.serializer.value_type())
    }
}

impl fmt::Display for SerializerDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self.types;
        let value_type = self.serializer.value_type();
        match self.serializer.kind() {
            SerializerKind::Primitive { representation } => {
                let name = types
                    .primitive(value_type)
                    .map_or("Primitive", |p| p.runtime_name());
                write!(f, "{name}Serializer")?;
                let standard = types.primitive(value_type).map(default_representation);
                if standard != Some(*representation) {
                    write!(f, "({})", representation.name())?;
                }
                Ok(())
            }
            SerializerKind::DateTime { kind } => match kind {
                DateTimeKind::Unspecified => f.write_str("DateTimeSerializer"),
                DateTimeKind::Utc => f.write_str("DateTimeSerializer(Utc)"),
            },
            SerializerKind::TimeSpan {
                representation,
                units,
            } => write!(f, "TimeSpanSerializer({}, {units:?})", representation.name()),
            SerializerKind::Object => f.write_str("ObjectSerializer"),
            SerializerKind::WireValue => f.write_str("BsonValueSerializer"),
            SerializerKind::Document => f.write_str("BsonDocumentSerializer"),
            SerializerKind::ToWireValue(inner) => {
                write!(f, "ToBsonValueSerializer<{}>", self.child(inner))
            }
            SerializerKind::Nullable(inner) => write!(f, "NullableSerializer<{}>", self.child(inner)),
            SerializerKind::Enum { representation } => {
                write!(f, "EnumSerializer<{}>", self.value_type())?;
                if *representation != WireType::Int32 {
                    write!(f, "({})", representation.name())?;
                }
                Ok(())
            }
            SerializerKind::EnumUnderlying(inner) => {
                write!(f, "EnumUnderlyingTypeSerializer<{}>", self.child(inner))
            }
            SerializerKind::NumericConversion(inner) => write!(
                f,
                "NumericConversionSerializer<{}, {}>",
                types.display(inner.value_type()),
                self.value_type()
            ),
            SerializerKind::Array(item) => write!(f, "ArraySerializer<{}>", self.child(item)),
            SerializerKind::Collection(item) => {
                let family = match types.get(value_type) {
                    Some(TypeShape::Collection { kind, .. }) => kind.type_name(),
                    _ => "IEnumerable",
                };
                write!(f, "{family}Serializer<{}>", self.child(item))
            }
            SerializerKind::PolymorphicArray(items) => {
                self.list(f, "PolymorphicArraySerializer", items)
            }
            SerializerKind::Dictionary { key, value, .. } => write!(
                f,
                "DictionarySerializer<{}, {}>",
                self.child(key),
                self.child(value)
            ),
            SerializerKind::KeyValuePair { key, value } => write!(
                f,
                "KeyValuePairSerializer<{}, {}>",
                self.child(key),
                self.child(value)
            ),
            SerializerKind::Tuple(items) => self.list(f, "TupleSerializer", items),
            SerializerKind::Grouping { key, element } => write!(
                f,
                "IGroupingSerializer<{}, {}>",
                self.child(key),
                self.child(element)
            ),
            SerializerKind::LookupResult { local, foreign } => write!(
                f,
                "LookupResultSerializer<{}, {}>",
                self.child(local),
                self.child(foreign)
            ),
            SerializerKind::ClassMap => write!(f, "ClassMapSerializer<{}>", self.value_type()),
            SerializerKind::Composite(_) => write!(f, "CompositeSerializer<{}>", self.value_type()),
            SerializerKind::Downcast(derived) => write!(
                f,
                "DowncastingSerializer<{}, {}>",
                self.value_type(),
                types.display(derived.value_type())
            ),
            SerializerKind::Upcast(base) => write!(
                f,
                "UpcastingSerializer<{}, {}>",
                types.display(base.value_type()),
                self.value_type()
            ),
            SerializerKind::Unknowable => write!(f, "UnknowableSerializer<{}>", self.value_type()),
            SerializerKind::IgnoreSubtree => {
                write!(f, "IgnoreSubtreeSerializer<{}>", self.value_type())
            }
        }
    }
}
