//! Method descriptors attached to call nodes.

use std::fmt;

use wirefind_core::{TypeId, TypeTable};

/// Declaring class of a called method.
///
/// The well-known query and helper classes are listed explicitly; every
/// other method is owned by the type it is declared on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Owner {
    /// LINQ-to-objects operators.
    Enumerable,
    /// LINQ operators over queryable sources.
    Queryable,
    /// Database-specific operators over in-memory sequences (`Median`, `Pick`).
    MongoEnumerable,
    /// Database-specific queryable operators (`As`, `Lookup`, `AppendStage`).
    MongoQueryable,
    /// Window functions (`Shift`).
    Window,
    String,
    Math,
    /// Database-specific math helpers (`DegreesToRadians`).
    MongoMath,
    DateTime,
    /// Query-language helpers (`Mql.Field`, `Mql.Constant`).
    Mql,
    Regex,
    /// Filter helpers (`Inject`).
    LinqExtensions,
    KeyValuePair,
    Tuple,
    ValueTuple,
    Array,
    Type(TypeId),
}

impl Owner {
    pub fn is_queryable(self) -> bool {
        matches!(self, Self::Queryable | Self::MongoQueryable)
    }

    /// Static methods of these owners print as extension calls
    /// (`source.Where(..)`).
    pub fn is_extension_host(self) -> bool {
        matches!(
            self,
            Self::Enumerable
                | Self::Queryable
                | Self::MongoEnumerable
                | Self::MongoQueryable
                | Self::Window
                | Self::LinqExtensions
        )
    }

    pub fn display(self, types: &TypeTable) -> impl fmt::Display + '_ {
        OwnerDisplay { owner: self, types }
    }
}

struct OwnerDisplay<'a> {
    owner: Owner,
    types: &'a TypeTable,
}

impl fmt::Display for OwnerDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.owner {
            Owner::Enumerable => "Enumerable",
            Owner::Queryable => "Queryable",
            Owner::MongoEnumerable => "MongoEnumerable",
            Owner::MongoQueryable => "MongoQueryable",
            Owner::Window => "WindowFunctions",
            Owner::String => "string",
            Owner::Math => "Math",
            Owner::MongoMath => "MongoMath",
            Owner::DateTime => "DateTime",
            Owner::Mql => "Mql",
            Owner::Regex => "Regex",
            Owner::LinqExtensions => "LinqExtensions",
            Owner::KeyValuePair => "KeyValuePair",
            Owner::Tuple => "Tuple",
            Owner::ValueTuple => "ValueTuple",
            Owner::Array => "Array",
            Owner::Type(ty) => return write!(f, "{}", self.types.display(ty)),
        };
        f.write_str(name)
    }
}

/// A called method: declaring owner, name, and generic arguments.
///
/// Return and parameter types are carried by the call node and its
/// arguments.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodRef {
    pub owner: Owner,
    pub name: String,
    pub is_static: bool,
    pub generic_args: Vec<TypeId>,
}

impl MethodRef {
    /// Static method (extension methods included).
    pub fn static_method(owner: Owner, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            is_static: true,
            generic_args: Vec::new(),
        }
    }

    pub fn instance(owner: Owner, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            is_static: false,
            generic_args: Vec::new(),
        }
    }

    pub fn with_generic_args(mut self, args: impl IntoIterator<Item = TypeId>) -> Self {
        self.generic_args = args.into_iter().collect();
        self
    }

    pub fn generic_arg(&self, index: usize) -> Option<TypeId> {
        self.generic_args.get(index).copied()
    }
}
