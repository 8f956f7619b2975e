//! Default serializer lookup.
//!
//! The registry is shared by every translation and only read after
//! construction, so implementations must tolerate concurrent lookups.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::serializer::{
    DictionaryRepresentation, Serializer, SerializerError, SerializerKind, default_representation,
    standard_serializer,
};
use crate::types::{TypeId, TypeShape, TypeTable};

/// Type to default-serializer lookup.
pub trait SerializerRegistry: Send + Sync {
    fn lookup(&self, ty: TypeId) -> Result<Serializer, SerializerError>;
}

/// Registry that derives defaults from the type table.
///
/// User overrides registered with [`DefaultRegistry::with_serializer`] take
/// precedence, including when they appear nested inside other types
/// (`List<Person>` uses the registered `Person` serializer).
#[derive(Debug)]
pub struct DefaultRegistry {
    types: Arc<TypeTable>,
    overrides: HashMap<TypeId, Serializer>,
    cache: RwLock<HashMap<TypeId, Serializer>>,
}

impl DefaultRegistry {
    pub fn new(types: Arc<TypeTable>) -> Self {
        Self {
            types,
            overrides: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register the serializer to use for `ty`.
    pub fn with_serializer(mut self, ty: TypeId, serializer: Serializer) -> Self {
        debug_assert_eq!(serializer.value_type(), ty);
        self.overrides.insert(ty, serializer);
        self.cache.get_mut().clear();
        self
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    fn build(&self, ty: TypeId) -> Result<Serializer, SerializerError> {
        let types = &*self.types;
        let Some(shape) = types.get(ty) else {
            return Err(SerializerError::NoDefaultSerializer(format!("#{}", ty.0)));
        };

        let kind = match shape {
            TypeShape::Object => SerializerKind::Object,
            TypeShape::WireValue | TypeShape::Document | TypeShape::Primitive(_) => {
                return standard_serializer(types, ty).ok_or_else(|| self.no_default(ty));
            }
            TypeShape::Nullable(inner) => SerializerKind::Nullable(self.lookup(*inner)?),
            TypeShape::Enum { underlying, .. } => SerializerKind::Enum {
                representation: types
                    .primitive(*underlying)
                    .map(default_representation)
                    .ok_or_else(|| self.no_default(ty))?,
            },
            TypeShape::Array(item) => SerializerKind::Array(self.lookup(*item)?),
            TypeShape::Collection { item, .. } => SerializerKind::Collection(self.lookup(*item)?),
            TypeShape::Dictionary { key, value } => SerializerKind::Dictionary {
                key: self.lookup(*key)?,
                value: self.lookup(*value)?,
                representation: DictionaryRepresentation::Document,
            },
            TypeShape::KeyValuePair { key, value } => SerializerKind::KeyValuePair {
                key: self.lookup(*key)?,
                value: self.lookup(*value)?,
            },
            TypeShape::Tuple { items, .. } => SerializerKind::Tuple(
                items
                    .iter()
                    .map(|&item| self.lookup(item))
                    .collect::<Result<_, _>>()?,
            ),
            TypeShape::Grouping { key, element } => SerializerKind::Grouping {
                key: self.lookup(*key)?,
                element: self.lookup(*element)?,
            },
            TypeShape::LookupResult { local, foreign } => SerializerKind::LookupResult {
                local: self.lookup(*local)?,
                foreign: self.lookup(*foreign)?,
            },
            TypeShape::Class(_) | TypeShape::Interface(_) => SerializerKind::ClassMap,
            TypeShape::Meta(_) | TypeShape::Func { .. } | TypeShape::Quoted(_) => {
                return Err(self.no_default(ty));
            }
        };
        Ok(Serializer::new(ty, kind))
    }

    fn no_default(&self, ty: TypeId) -> SerializerError {
        SerializerError::NoDefaultSerializer(self.types.display(ty).to_string())
    }
}

impl SerializerRegistry for DefaultRegistry {
    fn lookup(&self, ty: TypeId) -> Result<Serializer, SerializerError> {
        if let Some(serializer) = self.overrides.get(&ty) {
            return Ok(serializer.clone());
        }

        let cached = self.cache.read().get(&ty).cloned();
        if let Some(serializer) = cached {
            return Ok(serializer);
        }

        let serializer = self.build(ty)?;
        self.cache.write().insert(ty, serializer.clone());
        Ok(serializer)
    }
}
