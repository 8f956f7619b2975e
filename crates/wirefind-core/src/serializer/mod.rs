//! Serializer descriptors.
//!
//! A [`Serializer`] names the codec used to move one value between its
//! runtime type and the wire. Descriptors are immutable, shared, and compared
//! structurally. Optional abilities (item access, key/value access, member
//! lookup, ...) are explicit: every kind reports a [`CapabilitySet`], and the
//! typed accessors fail with [`SerializerError::MissingCapability`] when the
//! capability is absent.

mod display;
mod reconcile;
mod standard;

use std::fmt;
use std::sync::Arc;

use crate::registry::SerializerRegistry;
use crate::types::{TypeId, TypeShape, TypeTable};

pub use display::SerializerDisplay;
pub use reconcile::{coerce, collection_serializer, enum_over_underlying};
pub use standard::{default_representation, standard_serializer};

/// Wire-level value representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WireType {
    Boolean,
    Int32,
    Int64,
    Double,
    Decimal128,
    String,
    DateTime,
    ObjectId,
    Binary,
    Document,
    Array,
}

impl WireType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Double => "Double",
            Self::Decimal128 => "Decimal128",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::ObjectId => "ObjectId",
            Self::Binary => "Binary",
            Self::Document => "Document",
            Self::Array => "Array",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum DateTimeKind {
    #[default]
    Unspecified,
    Utc,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TimeSpanUnits {
    #[default]
    Ticks,
    Milliseconds,
    Seconds,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum DictionaryRepresentation {
    #[default]
    Document,
    ArrayOfArrays,
    ArrayOfDocuments,
}

/// Optional abilities a serializer may expose.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Capability {
    /// One item serializer for every element of a sequence.
    Items,
    /// A distinct item serializer per position.
    IndexedItems,
    Key,
    Value,
    /// Serializers for named members of a document-like value.
    Members,
    NullableValue,
    /// Positional (1-based) tuple item serializers.
    TupleItems,
    /// The wire representation can be reconfigured.
    Representation,
}

impl Capability {
    const ALL: [Capability; 8] = [
        Self::Items,
        Self::IndexedItems,
        Self::Key,
        Self::Value,
        Self::Members,
        Self::NullableValue,
        Self::TupleItems,
        Self::Representation,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Items => "an item serializer",
            Self::IndexedItems => "per-index item serializers",
            Self::Key => "a key serializer",
            Self::Value => "a value serializer",
            Self::Members => "member serializers",
            Self::NullableValue => "a nullable value serializer",
            Self::TupleItems => "tuple item serializers",
            Self::Representation => "a configurable representation",
        })
    }
}

/// Bitset of [`Capability`] values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);

    pub fn of(capabilities: &[Capability]) -> Self {
        capabilities
            .iter()
            .fold(Self::EMPTY, |set, &capability| set.with(capability))
    }

    pub fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |&capability| self.contains(capability))
    }
}

/// Errors raised by serializer accessors and the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializerError {
    #[error("{serializer} does not provide {capability}")]
    MissingCapability {
        serializer: String,
        capability: Capability,
    },

    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("serializer value type {found} does not match expected type {expected}")]
    ValueTypeMismatch { found: String, expected: String },

    #[error("no default serializer is available for type {0}")]
    NoDefaultSerializer(String),

    #[error("{serializer} has no member named `{member}`")]
    UnknownMember { serializer: String, member: String },

    #[error("item index {index} is out of range for {serializer}")]
    IndexOutOfRange { serializer: String, index: usize },

    #[error("{0} is not a collection type")]
    NotACollection(String),
}

/// The codec variants.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum SerializerKind {
    /// Scalar codec with a configurable wire representation.
    Primitive { representation: WireType },
    DateTime { kind: DateTimeKind },
    TimeSpan {
        representation: WireType,
        units: TimeSpanUnits,
    },
    /// Dynamic codec for `object`, driven by the runtime type.
    Object,
    WireValue,
    Document,
    /// Presents any value as a wire value.
    ToWireValue(Serializer),
    Nullable(Serializer),
    Enum { representation: WireType },
    /// Encodes an enum's underlying number the way the wrapped enum codec
    /// encodes the enum.
    EnumUnderlying(Serializer),
    /// Encodes a number of the value type using the wrapped numeric codec.
    NumericConversion(Serializer),
    Array(Serializer),
    /// Generic collection; the value type decides which one.
    Collection(Serializer),
    /// Array literal whose elements use different serializers.
    PolymorphicArray(Vec<Serializer>),
    Dictionary {
        key: Serializer,
        value: Serializer,
        representation: DictionaryRepresentation,
    },
    /// Key/value pair, represented as a `{ k, v }` document.
    KeyValuePair { key: Serializer, value: Serializer },
    Tuple(Vec<Serializer>),
    Grouping {
        key: Serializer,
        element: Serializer,
    },
    LookupResult {
        local: Serializer,
        foreign: Serializer,
    },
    /// Class map of the value type; member serializers come from the
    /// registry on demand.
    ClassMap,
    /// Member-binding serializer synthesized from construction sites.
    Composite(Vec<(String, Serializer)>),
    /// Value type is a base type; values are encoded by the wrapped codec
    /// of a derived type.
    Downcast(Serializer),
    /// Value type is a derived type; values are encoded by the wrapped codec
    /// of a base type.
    Upcast(Serializer),
    /// No serializer will ever be determined for the value.
    Unknowable,
    /// The value does not reach the wire.
    IgnoreSubtree,
}

#[derive(PartialEq, Eq, Hash, Debug)]
struct SerializerNode {
    value_type: TypeId,
    kind: SerializerKind,
}

/// Shared handle to a serializer descriptor.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Serializer(Arc<SerializerNode>);

impl Serializer {
    pub fn new(value_type: TypeId, kind: SerializerKind) -> Self {
        Self(Arc::new(SerializerNode { value_type, kind }))
    }

    pub fn unknowable(value_type: TypeId) -> Self {
        Self::new(value_type, SerializerKind::Unknowable)
    }

    pub fn ignore_subtree(value_type: TypeId) -> Self {
        Self::new(value_type, SerializerKind::IgnoreSubtree)
    }

    pub fn primitive(value_type: TypeId, representation: WireType) -> Self {
        Self::new(value_type, SerializerKind::Primitive { representation })
    }

    pub fn nullable(value_type: TypeId, inner: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Nullable(inner))
    }

    pub fn array(value_type: TypeId, item: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Array(item))
    }

    pub fn collection(value_type: TypeId, item: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Collection(item))
    }

    pub fn key_value_pair(value_type: TypeId, key: Serializer, value: Serializer) -> Self {
        Self::new(value_type, SerializerKind::KeyValuePair { key, value })
    }

    pub fn tuple(value_type: TypeId, items: Vec<Serializer>) -> Self {
        Self::new(value_type, SerializerKind::Tuple(items))
    }

    pub fn grouping(value_type: TypeId, key: Serializer, element: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Grouping { key, element })
    }

    pub fn downcast(value_type: TypeId, derived: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Downcast(derived))
    }

    pub fn upcast(value_type: TypeId, base: Serializer) -> Self {
        Self::new(value_type, SerializerKind::Upcast(base))
    }

    /// The exact runtime type this serializer encodes.
    pub fn value_type(&self) -> TypeId {
        self.0.value_type
    }

    pub fn kind(&self) -> &SerializerKind {
        &self.0.kind
    }

    pub fn is_unknowable(&self) -> bool {
        matches!(self.kind(), SerializerKind::Unknowable)
    }

    pub fn is_ignore_subtree(&self) -> bool {
        matches!(self.kind(), SerializerKind::IgnoreSubtree)
    }

    /// Sentinels stop traversal below the node they are attached to.
    pub fn is_sentinel(&self) -> bool {
        self.is_unknowable() || self.is_ignore_subtree()
    }

    /// Same codec, different value type. Used to re-home sentinels.
    pub(crate) fn retarget(&self, value_type: TypeId) -> Self {
        Self::new(value_type, self.kind().clone())
    }

    pub fn capabilities(&self) -> CapabilitySet {
        use Capability::*;
        match self.kind() {
            SerializerKind::Primitive { .. } | SerializerKind::Enum { .. } => {
                CapabilitySet::of(&[Representation])
            }
            SerializerKind::Nullable(_) => CapabilitySet::of(&[NullableValue, Representation]),
            SerializerKind::Array(_) | SerializerKind::Collection(_) => CapabilitySet::of(&[Items]),
            SerializerKind::PolymorphicArray(_) => CapabilitySet::of(&[IndexedItems]),
            SerializerKind::Dictionary { .. } | SerializerKind::KeyValuePair { .. } => {
                CapabilitySet::of(&[Key, Value])
            }
            SerializerKind::Grouping { .. } => CapabilitySet::of(&[Items, Key]),
            SerializerKind::Tuple(_) => CapabilitySet::of(&[TupleItems]),
            SerializerKind::ClassMap
            | SerializerKind::Composite(_)
            | SerializerKind::LookupResult { .. } => CapabilitySet::of(&[Members]),
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                let inherited = inner.capabilities();
                inherited
                    .iter()
                    .filter(|&c| c != Representation)
                    .fold(CapabilitySet::EMPTY, CapabilitySet::with)
            }
            _ => CapabilitySet::EMPTY,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Serializer of every item of a sequence.
    pub fn item_serializer(&self) -> Result<Serializer, SerializerError> {
        match self.kind() {
            SerializerKind::Array(item) | SerializerKind::Collection(item) => Ok(item.clone()),
            SerializerKind::Grouping { element, .. } => Ok(element.clone()),
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                inner.item_serializer()
            }
            _ => Err(self.missing(Capability::Items)),
        }
    }

    /// Serializer of the item at `index` (0-based). Falls back to the shared
    /// item serializer for homogeneous sequences.
    pub fn item_serializer_at(&self, index: usize) -> Result<Serializer, SerializerError> {
        match self.kind() {
            SerializerKind::PolymorphicArray(items) => {
                items
                    .get(index)
                    .cloned()
                    .ok_or_else(|| SerializerError::IndexOutOfRange {
                        serializer: self.kind_name().to_owned(),
                        index,
                    })
            }
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                inner.item_serializer_at(index)
            }
            _ => self.item_serializer(),
        }
    }

    pub fn key_serializer(&self) -> Result<Serializer, SerializerError> {
        match self.kind() {
            SerializerKind::Dictionary { key, .. }
            | SerializerKind::KeyValuePair { key, .. }
            | SerializerKind::Grouping { key, .. } => Ok(key.clone()),
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                inner.key_serializer()
            }
            _ => Err(self.missing(Capability::Key)),
        }
    }

    pub fn value_serializer(&self) -> Result<Serializer, SerializerError> {
        match self.kind() {
            SerializerKind::Dictionary { value, .. } | SerializerKind::KeyValuePair { value, .. } => {
                Ok(value.clone())
            }
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                inner.value_serializer()
            }
            _ => Err(self.missing(Capability::Value)),
        }
    }

    /// Unwrap one level of optionality.
    pub fn nullable_value_serializer(&self) -> Result<Serializer, SerializerError> {
        match self.kind() {
            SerializerKind::Nullable(inner) => Ok(inner.clone()),
            _ => Err(self.missing(Capability::NullableValue)),
        }
    }

    /// Tuple item by 1-based position. Positions past 7 continue into the
    /// nested remainder tuple held in slot 8.
    pub fn tuple_item_serializer(&self, position: usize) -> Result<Serializer, SerializerError> {
        let SerializerKind::Tuple(items) = self.kind() else {
            return Err(self.missing(Capability::TupleItems));
        };
        if position > 7 && items.len() == 8 {
            return items[7].tuple_item_serializer(position - 7);
        }
        position
            .checked_sub(1)
            .and_then(|index| items.get(index))
            .cloned()
            .ok_or_else(|| SerializerError::IndexOutOfRange {
                serializer: self.kind_name().to_owned(),
                index: position,
            })
    }

    /// Serializer of a named member of a document-like value.
    pub fn member_serializer(
        &self,
        types: &TypeTable,
        registry: &dyn SerializerRegistry,
        member: &str,
    ) -> Result<Serializer, SerializerError> {
        let unknown = || SerializerError::UnknownMember {
            serializer: self.display(types).to_string(),
            member: member.to_owned(),
        };
        match self.kind() {
            SerializerKind::ClassMap => {
                let ty = types.member_type(self.value_type(), member).ok_or_else(unknown)?;
                registry.lookup(ty)
            }
            SerializerKind::Composite(members) => members
                .iter()
                .find(|(name, _)| name == member)
                .map(|(_, serializer)| serializer.clone())
                .ok_or_else(unknown),
            SerializerKind::LookupResult { local, foreign } => match member {
                "Local" => Ok(local.clone()),
                "Results" => {
                    let results = types
                        .find(&TypeShape::Array(foreign.value_type()))
                        .ok_or_else(unknown)?;
                    Ok(Serializer::array(results, foreign.clone()))
                }
                _ => Err(unknown()),
            },
            SerializerKind::Downcast(inner) | SerializerKind::Upcast(inner) => {
                inner.member_serializer(types, registry, member)
            }
            _ => Err(self.missing(Capability::Members)),
        }
    }

    /// Current wire representation, looking through wrappers that keep it.
    pub fn representation(&self) -> Option<WireType> {
        match self.kind() {
            SerializerKind::Primitive { representation }
            | SerializerKind::Enum { representation }
            | SerializerKind::TimeSpan { representation, .. } => Some(*representation),
            SerializerKind::DateTime { .. } => Some(WireType::DateTime),
            SerializerKind::Nullable(inner)
            | SerializerKind::EnumUnderlying(inner)
            | SerializerKind::NumericConversion(inner) => inner.representation(),
            _ => None,
        }
    }

    /// Same codec with a different wire representation.
    pub fn with_representation(&self, representation: WireType) -> Result<Serializer, SerializerError> {
        let kind = match self.kind() {
            SerializerKind::Primitive { .. } => SerializerKind::Primitive { representation },
            SerializerKind::Enum { .. } => SerializerKind::Enum { representation },
            SerializerKind::Nullable(inner) => {
                SerializerKind::Nullable(inner.with_representation(representation)?)
            }
            _ => return Err(self.missing(Capability::Representation)),
        };
        Ok(Self::new(self.value_type(), kind))
    }

    /// Serializer for `derived`, a subtype of this serializer's value type.
    pub fn derived_type_serializer(
        &self,
        types: &TypeTable,
        registry: &dyn SerializerRegistry,
        derived: TypeId,
    ) -> Result<Serializer, SerializerError> {
        if derived == self.value_type() {
            return Ok(self.clone());
        }
        if !types.is_assignable_from(self.value_type(), derived) {
            return Err(self.unsupported_conversion(types, derived));
        }

        match self.kind() {
            SerializerKind::Downcast(inner) if inner.value_type() == derived => Ok(inner.clone()),
            SerializerKind::Downcast(inner) if types.is_assignable_from(inner.value_type(), derived) => {
                inner.derived_type_serializer(types, registry, derived)
            }
            SerializerKind::ClassMap => Ok(Self::new(derived, SerializerKind::ClassMap)),
            SerializerKind::Upcast(base) => Ok(Self::upcast(derived, base.clone())),
            SerializerKind::Unknowable | SerializerKind::IgnoreSubtree => Ok(self.retarget(derived)),
            SerializerKind::Composite(_) => Err(self.unsupported_conversion(types, derived)),
            _ => registry.lookup(derived),
        }
    }

    /// Serializer for `base`, a supertype of this serializer's value type.
    pub fn base_type_serializer(
        &self,
        types: &TypeTable,
        base: TypeId,
    ) -> Result<Serializer, SerializerError> {
        if base == self.value_type() {
            return Ok(self.clone());
        }
        if !types.is_assignable_from(base, self.value_type()) {
            return Err(self.unsupported_conversion(types, base));
        }

        match self.kind() {
            SerializerKind::Upcast(inner) if inner.value_type() == base => Ok(inner.clone()),
            SerializerKind::Unknowable | SerializerKind::IgnoreSubtree => Ok(self.retarget(base)),
            _ => Ok(Self::downcast(base, self.clone())),
        }
    }

    /// Render as a codec name, resolving type names through `types`.
    pub fn display<'a>(&'a self, types: &'a TypeTable) -> SerializerDisplay<'a> {
        SerializerDisplay::new(self, types)
    }

    /// Short codec family name, independent of the type table.
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            SerializerKind::Primitive { .. } => "PrimitiveSerializer",
            SerializerKind::DateTime { .. } => "DateTimeSerializer",
            SerializerKind::TimeSpan { .. } => "TimeSpanSerializer",
            SerializerKind::Object => "ObjectSerializer",
            SerializerKind::WireValue => "BsonValueSerializer",
            SerializerKind::Document => "BsonDocumentSerializer",
            SerializerKind::ToWireValue(_) => "ToBsonValueSerializer",
            SerializerKind::Nullable(_) => "NullableSerializer",
            SerializerKind::Enum { .. } => "EnumSerializer",
            SerializerKind::EnumUnderlying(_) => "EnumUnderlyingTypeSerializer",
            SerializerKind::NumericConversion(_) => "NumericConversionSerializer",
            SerializerKind::Array(_) => "ArraySerializer",
            SerializerKind::Collection(_) => "CollectionSerializer",
            SerializerKind::PolymorphicArray(_) => "PolymorphicArraySerializer",
            SerializerKind::Dictionary { .. } => "DictionarySerializer",
            SerializerKind::KeyValuePair { .. } => "KeyValuePairSerializer",
            SerializerKind::Tuple(_) => "TupleSerializer",
            SerializerKind::Grouping { .. } => "IGroupingSerializer",
            SerializerKind::LookupResult { .. } => "LookupResultSerializer",
            SerializerKind::ClassMap => "ClassMapSerializer",
            SerializerKind::Composite(_) => "CompositeSerializer",
            SerializerKind::Downcast(_) => "DowncastingSerializer",
            SerializerKind::Upcast(_) => "UpcastingSerializer",
            SerializerKind::Unknowable => "UnknowableSerializer",
            SerializerKind::IgnoreSubtree => "IgnoreSubtreeSerializer",
        }
    }

    fn missing(&self, capability: Capability) -> SerializerError {
        SerializerError::MissingCapability {
            serializer: self.kind_name().to_owned(),
            capability,
        }
    }

    fn unsupported_conversion(&self, types: &TypeTable, to: TypeId) -> SerializerError {
        SerializerError::UnsupportedConversion {
            from: types.display(self.value_type()).to_string(),
            to: types.display(to).to_string(),
        }
    }
}
