//! Static types of query expressions.
//!
//! Types are interned: structurally equal shapes share one `TypeId`, so type
//! equality is an integer comparison. Declared types (classes, interfaces,
//! enums) are nominal and carry their definitions alongside the shape table.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::interner::{Interner, Symbol};

/// Interned type identifier.
///
/// Index into the type table. Values 0-25 are reserved for builtins (see the
/// `TYPE_*` constants); declared and constructed types start after them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeId(pub u32);

pub const TYPE_OBJECT: TypeId = TypeId(0);
pub const TYPE_WIRE_VALUE: TypeId = TypeId(1);
pub const TYPE_DOCUMENT: TypeId = TypeId(2);
pub const TYPE_BOOLEAN: TypeId = TypeId(3);
pub const TYPE_CHAR: TypeId = TypeId(4);
pub const TYPE_SBYTE: TypeId = TypeId(5);
pub const TYPE_BYTE: TypeId = TypeId(6);
pub const TYPE_INT16: TypeId = TypeId(7);
pub const TYPE_UINT16: TypeId = TypeId(8);
pub const TYPE_INT32: TypeId = TypeId(9);
pub const TYPE_UINT32: TypeId = TypeId(10);
pub const TYPE_INT64: TypeId = TypeId(11);
pub const TYPE_UINT64: TypeId = TypeId(12);
pub const TYPE_SINGLE: TypeId = TypeId(13);
pub const TYPE_DOUBLE: TypeId = TypeId(14);
pub const TYPE_DECIMAL: TypeId = TypeId(15);
pub const TYPE_DECIMAL128: TypeId = TypeId(16);
pub const TYPE_STRING: TypeId = TypeId(17);
pub const TYPE_DATETIME: TypeId = TypeId(18);
pub const TYPE_TIMESPAN: TypeId = TypeId(19);
pub const TYPE_GUID: TypeId = TypeId(20);
pub const TYPE_OBJECT_ID: TypeId = TypeId(21);
pub const TYPE_SERIALIZER: TypeId = TypeId(22);
pub const TYPE_REPRESENTATION: TypeId = TypeId(23);
pub const TYPE_PIPELINE_STAGE: TypeId = TypeId(24);
pub const TYPE_COLLECTION_HANDLE: TypeId = TypeId(25);

impl TypeId {
    pub fn is_builtin(self) -> bool {
        self.0 <= TYPE_COLLECTION_HANDLE.0
    }
}

/// Scalar types with a standard wire codec.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Primitive {
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Decimal128,
    String,
    DateTime,
    TimeSpan,
    Guid,
    ObjectId,
}

impl Primitive {
    /// All primitives in builtin-id order.
    pub const ALL: [Primitive; 19] = [
        Self::Boolean,
        Self::Char,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Decimal128,
        Self::String,
        Self::DateTime,
        Self::TimeSpan,
        Self::Guid,
        Self::ObjectId,
    ];

    /// Source-language spelling (`int`, `string`, `DateTime`).
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Char => "char",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Decimal128 => "Decimal128",
            Self::String => "string",
            Self::DateTime => "DateTime",
            Self::TimeSpan => "TimeSpan",
            Self::Guid => "Guid",
            Self::ObjectId => "ObjectId",
        }
    }

    /// Runtime type name, used when naming codecs (`Int32Serializer`).
    pub fn runtime_name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Decimal128 => "Decimal128",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::TimeSpan => "TimeSpan",
            Self::Guid => "Guid",
            Self::ObjectId => "ObjectId",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral()
            || matches!(
                self,
                Self::Single | Self::Double | Self::Decimal | Self::Decimal128
            )
    }

    fn type_id(self) -> TypeId {
        TypeId(TYPE_BOOLEAN.0 + self as u32)
    }
}

/// Generic collection families.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CollectionKind {
    List,
    Enumerable,
    Queryable,
    HashSet,
    Collection,
}

impl CollectionKind {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Enumerable => "IEnumerable",
            Self::Queryable => "IQueryable",
            Self::HashSet => "HashSet",
            Self::Collection => "ICollection",
        }
    }
}

/// Types whose values configure translation rather than flow through it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MetaType {
    Serializer,
    Representation,
    PipelineStage,
    CollectionHandle,
}

impl MetaType {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Serializer => "IBsonSerializer",
            Self::Representation => "BsonType",
            Self::PipelineStage => "IPipelineStageDefinition",
            Self::CollectionHandle => "IMongoCollection",
        }
    }
}

/// The shape of a static type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeShape {
    /// Root of the type hierarchy.
    Object,
    /// The wire-value supertype (`BsonValue`).
    WireValue,
    /// Schemaless document (`BsonDocument`), a wire value.
    Document,
    Primitive(Primitive),
    Meta(MetaType),
    Nullable(TypeId),
    Enum {
        name: Symbol,
        underlying: TypeId,
    },
    Array(TypeId),
    Collection {
        kind: CollectionKind,
        item: TypeId,
    },
    Dictionary {
        key: TypeId,
        value: TypeId,
    },
    KeyValuePair {
        key: TypeId,
        value: TypeId,
    },
    /// Reference or value tuple. An 8-slot tuple holds its overflow in a
    /// nested tuple in slot 8.
    Tuple {
        value_tuple: bool,
        items: Vec<TypeId>,
    },
    Grouping {
        key: TypeId,
        element: TypeId,
    },
    /// Output row of a `$lookup`: the local document plus matched foreign
    /// documents.
    LookupResult {
        local: TypeId,
        foreign: TypeId,
    },
    Class(Symbol),
    Interface(Symbol),
    Func {
        params: Vec<TypeId>,
        ret: TypeId,
    },
    /// Quoted lambda (`Expression<TDelegate>`).
    Quoted(TypeId),
}

/// Definition of a declared class.
#[derive(Clone, Debug, Default)]
pub struct ClassDef {
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: IndexMap<Symbol, TypeId>,
    /// Compiler-generated projection type (`new { A = .. }`).
    pub anonymous: bool,
    defined: bool,
}

/// Builder-style description passed to [`TypeTable::define_class`].
#[derive(Clone, Debug, Default)]
pub struct ClassSpec {
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
    members: Vec<(String, TypeId)>,
    anonymous: bool,
}

impl ClassSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn member(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.members.push((name.into(), ty));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// Errors raised while building or parsing the type model.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("unknown type name `{0}`")]
    UnknownName(String),

    #[error("malformed type name `{name}`: {reason}")]
    Malformed { name: String, reason: &'static str },

    #[error("type name `{name}` nests deeper than {limit} levels")]
    NestingTooDeep { name: String, limit: u32 },

    #[error("`{name}` expects {expected} type arguments, found {found}")]
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("type `{0}` is already declared")]
    Duplicate(String),

    #[error("enum `{name}` needs an integral underlying type, found `{found}`")]
    NonIntegralEnum { name: String, found: String },

    #[error("invalid type model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Interned types plus declared-type definitions.
#[derive(Clone, Debug)]
pub struct TypeTable {
    types: Vec<TypeShape>,
    type_map: HashMap<TypeShape, TypeId>,
    classes: HashMap<TypeId, ClassDef>,
    /// Base interfaces of each declared interface.
    interface_bases: HashMap<TypeId, Vec<TypeId>>,
    declared: HashMap<Symbol, TypeId>,
    interner: Interner,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            type_map: HashMap::new(),
            classes: HashMap::new(),
            interface_bases: HashMap::new(),
            declared: HashMap::new(),
            interner: Interner::new(),
        };

        // Pre-register builtin types at their expected IDs
        let object = table.intern(TypeShape::Object);
        debug_assert_eq!(object, TYPE_OBJECT);
        let wire_value = table.intern(TypeShape::WireValue);
        debug_assert_eq!(wire_value, TYPE_WIRE_VALUE);
        let document = table.intern(TypeShape::Document);
        debug_assert_eq!(document, TYPE_DOCUMENT);

        for primitive in Primitive::ALL {
            let id = table.intern(TypeShape::Primitive(primitive));
            debug_assert_eq!(id, primitive.type_id());
        }

        for meta in [
            MetaType::Serializer,
            MetaType::Representation,
            MetaType::PipelineStage,
            MetaType::CollectionHandle,
        ] {
            table.intern(TypeShape::Meta(meta));
        }
        debug_assert_eq!(table.types.len() as u32, TYPE_COLLECTION_HANDLE.0 + 1);

        table
    }

    /// Intern a type, returning its ID. Deduplicates identical shapes.
    pub fn intern(&mut self, shape: TypeShape) -> TypeId {
        if let Some(&id) = self.type_map.get(&shape) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(shape.clone());
        self.type_map.insert(shape, id);
        id
    }

    /// Look up an already interned shape.
    pub fn find(&self, shape: &TypeShape) -> Option<TypeId> {
        self.type_map.get(shape).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeShape> {
        self.types.get(id.0 as usize)
    }

    /// Shape of a type created by this table.
    pub fn shape(&self, id: TypeId) -> &TypeShape {
        self.ensure_shape(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn intern_name(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn primitive_type(&self, primitive: Primitive) -> TypeId {
        primitive.type_id()
    }

    pub fn nullable(&mut self, underlying: TypeId) -> TypeId {
        self.intern(TypeShape::Nullable(underlying))
    }

    pub fn array(&mut self, item: TypeId) -> TypeId {
        self.intern(TypeShape::Array(item))
    }

    pub fn collection(&mut self, kind: CollectionKind, item: TypeId) -> TypeId {
        self.intern(TypeShape::Collection { kind, item })
    }

    pub fn list(&mut self, item: TypeId) -> TypeId {
        self.collection(CollectionKind::List, item)
    }

    pub fn enumerable(&mut self, item: TypeId) -> TypeId {
        self.collection(CollectionKind::Enumerable, item)
    }

    pub fn queryable(&mut self, item: TypeId) -> TypeId {
        self.collection(CollectionKind::Queryable, item)
    }

    pub fn dictionary(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeShape::Dictionary { key, value })
    }

    pub fn key_value_pair(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeShape::KeyValuePair { key, value })
    }

    /// Intern a tuple, nesting everything past the seventh item into the
    /// eighth slot.
    pub fn tuple(&mut self, value_tuple: bool, items: &[TypeId]) -> TypeId {
        if items.len() <= 7 {
            return self.intern(TypeShape::Tuple {
                value_tuple,
                items: items.to_vec(),
            });
        }

        let rest = self.tuple(value_tuple, &items[7..]);
        let mut head = items[..7].to_vec();
        head.push(rest);
        self.intern(TypeShape::Tuple {
            value_tuple,
            items: head,
        })
    }

    pub fn grouping(&mut self, key: TypeId, element: TypeId) -> TypeId {
        self.intern(TypeShape::Grouping { key, element })
    }

    pub fn lookup_result(&mut self, local: TypeId, foreign: TypeId) -> TypeId {
        self.intern(TypeShape::LookupResult { local, foreign })
    }

    pub fn func(&mut self, params: &[TypeId], ret: TypeId) -> TypeId {
        self.intern(TypeShape::Func {
            params: params.to_vec(),
            ret,
        })
    }

    pub fn quoted(&mut self, delegate: TypeId) -> TypeId {
        self.intern(TypeShape::Quoted(delegate))
    }

    /// Declare an enum over an integral underlying type.
    pub fn define_enum(&mut self, name: &str, underlying: TypeId) -> Result<TypeId, TypeError> {
        if !self.primitive(underlying).is_some_and(Primitive::is_integral) {
            return Err(TypeError::NonIntegralEnum {
                name: name.to_owned(),
                found: self.display(underlying).to_string(),
            });
        }
        let sym = self.claim_name(name)?;
        let id = self.intern(TypeShape::Enum {
            name: sym,
            underlying,
        });
        self.declared.insert(sym, id);
        Ok(id)
    }

    pub fn define_interface(&mut self, name: &str, bases: &[TypeId]) -> Result<TypeId, TypeError> {
        let sym = self.claim_name(name)?;
        let id = self.intern(TypeShape::Interface(sym));
        self.declared.insert(sym, id);
        self.interface_bases.insert(id, bases.to_vec());
        Ok(id)
    }

    pub(crate) fn set_interface_bases(&mut self, interface: TypeId, bases: Vec<TypeId>) {
        self.interface_bases.insert(interface, bases);
    }

    /// Reserve a class name so that members can refer to it before it is
    /// defined. Declaring an already declared class returns its id.
    pub fn declare_class(&mut self, name: &str) -> Result<TypeId, TypeError> {
        if let Some(id) = self.lookup_name(name) {
            return match self.shape(id) {
                TypeShape::Class(_) => Ok(id),
                _ => Err(TypeError::Duplicate(name.to_owned())),
            };
        }
        let sym = self.interner.intern(name);
        let id = self.intern(TypeShape::Class(sym));
        self.declared.insert(sym, id);
        self.classes.insert(id, ClassDef::default());
        Ok(id)
    }

    pub fn define_class(&mut self, name: &str, spec: ClassSpec) -> Result<TypeId, TypeError> {
        let id = self.declare_class(name)?;
        let members = spec
            .members
            .iter()
            .map(|(member, ty)| (self.interner.intern(member), *ty))
            .collect();

        let def = self.ensure_class_mut(id);
        if def.defined {
            return Err(TypeError::Duplicate(name.to_owned()));
        }
        *def = ClassDef {
            base: spec.base,
            interfaces: spec.interfaces,
            members,
            anonymous: spec.anonymous,
            defined: true,
        };
        Ok(id)
    }

    /// Resolve a declared class, interface or enum by name.
    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        let sym = self.interner.get(name)?;
        self.declared.get(&sym).copied()
    }

    pub fn class_def(&self, id: TypeId) -> Option<&ClassDef> {
        self.classes.get(&id)
    }

    pub fn is_anonymous(&self, id: TypeId) -> bool {
        self.class_def(id).is_some_and(|def| def.anonymous)
    }

    pub fn primitive(&self, id: TypeId) -> Option<Primitive> {
        match self.get(id)? {
            TypeShape::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn nullable_underlying(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeShape::Nullable(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn is_nullable(&self, id: TypeId) -> bool {
        self.nullable_underlying(id).is_some()
    }

    /// Strip one level of `Nullable`.
    pub fn strip_nullable(&self, id: TypeId) -> TypeId {
        self.nullable_underlying(id).unwrap_or(id)
    }

    pub fn enum_underlying(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeShape::Enum { underlying, .. } => Some(*underlying),
            _ => None,
        }
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        self.enum_underlying(id).is_some()
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.primitive(id).is_some_and(Primitive::is_numeric)
    }

    pub fn is_integral(&self, id: TypeId) -> bool {
        self.primitive(id).is_some_and(Primitive::is_integral)
    }

    pub fn is_numeric_or_nullable_numeric(&self, id: TypeId) -> bool {
        self.is_numeric(self.strip_nullable(id))
    }

    /// Whether values of the type are references (as opposed to inline values).
    pub fn is_reference_type(&self, id: TypeId) -> bool {
        match self.shape(id) {
            TypeShape::Primitive(p) => *p == Primitive::String,
            TypeShape::Nullable(_) | TypeShape::Enum { .. } | TypeShape::KeyValuePair { .. } => {
                false
            }
            TypeShape::Tuple { value_tuple, .. } => !value_tuple,
            _ => true,
        }
    }

    /// Item type of a sequence-like type (`T` of anything implementing
    /// `IEnumerable<T>`).
    pub fn item_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            TypeShape::Array(item) => Some(*item),
            TypeShape::Collection { item, .. } => Some(*item),
            TypeShape::Grouping { element, .. } => Some(*element),
            TypeShape::Dictionary { key, value } => self.find(&TypeShape::KeyValuePair {
                key: *key,
                value: *value,
            }),
            _ => None,
        }
    }

    /// 1-based tuple item type, following the nested remainder convention.
    pub fn tuple_item(&self, id: TypeId, position: usize) -> Option<TypeId> {
        let TypeShape::Tuple { items, .. } = self.get(id)? else {
            return None;
        };
        if position == 0 {
            return None;
        }
        if position > 7 && items.len() == 8 {
            return self.tuple_item(items[7], position - 7);
        }
        items.get(position - 1).copied()
    }

    /// Type of a class member, searching base classes.
    pub fn member_type(&self, class: TypeId, name: &str) -> Option<TypeId> {
        let sym = self.interner.get(name)?;
        let mut current = Some(class);
        while let Some(id) = current {
            let def = self.class_def(id)?;
            if let Some(&ty) = def.members.get(&sym) {
                return Some(ty);
            }
            current = def.base;
        }
        None
    }

    /// Member that a constructor parameter initializes: same name ignoring
    /// case, same type.
    pub fn matching_member(&self, class: TypeId, param: &str, param_ty: TypeId) -> Option<Symbol> {
        let mut current = Some(class);
        while let Some(id) = current {
            let def = self.class_def(id)?;
            let found = def.members.iter().find(|&(&sym, &ty)| {
                ty == param_ty && self.resolve(sym).eq_ignore_ascii_case(param)
            });
            if let Some((&sym, _)) = found {
                return Some(sym);
            }
            current = def.base;
        }
        None
    }

    /// Whether a value of `source` can be used where `target` is expected
    /// without conversion. `Nullable` is never implicitly assignable.
    pub fn is_assignable_from(&self, target: TypeId, source: TypeId) -> bool {
        if target == source {
            return true;
        }

        match self.shape(target) {
            TypeShape::Object => true,
            TypeShape::WireValue => source == TYPE_DOCUMENT,
            TypeShape::Class(_) => self.base_chain(source).any(|base| base == target),
            TypeShape::Interface(_) => self.implements(source, target),
            TypeShape::Collection {
                kind: CollectionKind::Enumerable,
                item,
            } => self
                .item_type(source)
                .is_some_and(|source_item| self.item_compatible(*item, source_item)),
            TypeShape::Collection {
                kind: CollectionKind::Collection,
                item,
            } => {
                let materialized = matches!(
                    self.shape(source),
                    TypeShape::Array(_)
                        | TypeShape::Dictionary { .. }
                        | TypeShape::Collection {
                            kind: CollectionKind::List
                                | CollectionKind::HashSet
                                | CollectionKind::Collection,
                            ..
                        }
                );
                materialized && self.item_type(source) == Some(*item)
            }
            _ => false,
        }
    }

    fn item_compatible(&self, target: TypeId, source: TypeId) -> bool {
        target == source
            || (self.is_reference_type(target)
                && self.is_reference_type(source)
                && self.is_assignable_from(target, source))
    }

    fn base_chain(&self, class: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.class_def(class).and_then(|def| def.base), |&id| {
            self.class_def(id).and_then(|def| def.base)
        })
    }

    fn implements(&self, source: TypeId, interface: TypeId) -> bool {
        let mut pending: Vec<TypeId> = Vec::new();
        if let Some(def) = self.class_def(source) {
            pending.extend(&def.interfaces);
            for base in self.base_chain(source) {
                if let Some(def) = self.class_def(base) {
                    pending.extend(&def.interfaces);
                }
            }
        } else if let Some(bases) = self.interface_bases.get(&source) {
            pending.extend(bases);
        }

        while let Some(current) = pending.pop() {
            if current == interface {
                return true;
            }
            if let Some(bases) = self.interface_bases.get(&current) {
                pending.extend(bases);
            }
        }
        false
    }

    /// Render a type in source notation (`List<int?>`).
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { table: self, id }
    }

    fn claim_name(&mut self, name: &str) -> Result<Symbol, TypeError> {
        if self.lookup_name(name).is_some() {
            return Err(TypeError::Duplicate(name.to_owned()));
        }
        Ok(self.interner.intern(name))
    }

    fn ensure_class_mut(&mut self, id: TypeId) -> &mut ClassDef {
        self.classes.entry(id).or_default()
    }
}

/// Display adapter returned by [`TypeTable::display`].
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    id: TypeId,
}

impl TypeDisplay<'_> {
    fn child(&self, id: TypeId) -> Self {
        Self {
            table: self.table,
            id,
        }
    }

    fn generic(&self, f: &mut fmt::Formatter<'_>, name: &str, args: &[TypeId]) -> fmt::Result {
        write!(f, "{name}<")?;
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.child(arg))?;
        }
        f.write_str(">")
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(shape) = self.table.get(self.id) else {
            return write!(f, "<type {}>", self.id.0);
        };
        match shape {
            TypeShape::Object => f.write_str("object"),
            TypeShape::WireValue => f.write_str("BsonValue"),
            TypeShape::Document => f.write_str("BsonDocument"),
            TypeShape::Primitive(p) => f.write_str(p.keyword()),
            TypeShape::Meta(meta) => f.write_str(meta.type_name()),
            TypeShape::Nullable(inner) => write!(f, "{}?", self.child(*inner)),
            TypeShape::Enum { name, .. }
            | TypeShape::Class(name)
            | TypeShape::Interface(name) => f.write_str(self.table.resolve(*name)),
            TypeShape::Array(item) => write!(f, "{}[]", self.child(*item)),
            TypeShape::Collection { kind, item } => self.generic(f, kind.type_name(), &[*item]),
            TypeShape::Dictionary { key, value } => self.generic(f, "Dictionary", &[*key, *value]),
            TypeShape::KeyValuePair { key, value } => {
                self.generic(f, "KeyValuePair", &[*key, *value])
            }
            TypeShape::Tuple { value_tuple, items } => {
                let name = if *value_tuple { "ValueTuple" } else { "Tuple" };
                self.generic(f, name, items)
            }
            TypeShape::Grouping { key, element } => {
                self.generic(f, "IGrouping", &[*key, *element])
            }
            TypeShape::LookupResult { local, foreign } => {
                self.generic(f, "LookupResult", &[*local, *foreign])
            }
            TypeShape::Func { params, ret } => {
                let mut args = params.clone();
                args.push(*ret);
                self.generic(f, "Func", &args)
            }
            TypeShape::Quoted(delegate) => self.generic(f, "Expression", &[*delegate]),
        }
    }
}
