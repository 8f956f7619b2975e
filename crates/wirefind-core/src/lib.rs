#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for wirefind.
//!
//! Three layers:
//! - **Type model** (`TypeTable`): interned static types of query expressions,
//!   with the assignability relation the inference rules rely on.
//! - **Serializer model** (`Serializer`): codec descriptors with explicit
//!   capability sets and typed accessors.
//! - **Registry** (`SerializerRegistry`): the default-serializer-for-type
//!   lookup consumed by the inference engine.

mod interner;
mod invariants;
pub mod model;
pub mod registry;
pub mod serializer;
pub mod type_name;
pub mod types;

#[cfg(test)]
mod interner_tests;
#[cfg(test)]
mod model_tests;
#[cfg(test)]
mod serializer_tests;

pub use interner::{Interner, Symbol};
pub use registry::{DefaultRegistry, SerializerRegistry};
pub use serializer::{
    Capability, CapabilitySet, DateTimeKind, DictionaryRepresentation, Serializer,
    SerializerDisplay, SerializerError, SerializerKind, TimeSpanUnits, WireType, coerce,
    collection_serializer, default_representation, enum_over_underlying, standard_serializer,
};
pub use types::{
    ClassDef, ClassSpec, CollectionKind, MetaType, Primitive, TYPE_BOOLEAN, TYPE_BYTE, TYPE_CHAR,
    TYPE_COLLECTION_HANDLE, TYPE_DATETIME, TYPE_DECIMAL, TYPE_DECIMAL128, TYPE_DOCUMENT,
    TYPE_DOUBLE, TYPE_GUID, TYPE_INT16, TYPE_INT32, TYPE_INT64, TYPE_OBJECT, TYPE_OBJECT_ID,
    TYPE_PIPELINE_STAGE, TYPE_REPRESENTATION, TYPE_SBYTE, TYPE_SERIALIZER, TYPE_SINGLE,
    TYPE_STRING, TYPE_TIMESPAN, TYPE_UINT16, TYPE_UINT32, TYPE_UINT64, TYPE_WIRE_VALUE,
    TypeDisplay, TypeError, TypeId, TypeShape, TypeTable,
};
