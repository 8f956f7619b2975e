//! Shared fixtures: a small domain model and a harness around the finder.

use std::sync::Arc;

use indoc::indoc;
use wirefind_core::{DefaultRegistry, Serializer, SerializerRegistry, TypeId, TypeTable};

use crate::expr::{ExprBuilder, ExprId, ExprPrinter, ExprTree, MethodRef, Owner};
use crate::{FinderOptions, KnownSerializers, Result, SerializerFinder};

pub(crate) const MODEL: &str = indoc! {r#"
    {
      "enums": [
        { "name": "Color" },
        { "name": "Level", "underlying": "long" }
      ],
      "interfaces": [{ "name": "INamed" }],
      "classes": [
        {
          "name": "Address",
          "members": [
            { "name": "City", "type": "string" },
            { "name": "Zip", "type": "int" }
          ]
        },
        {
          "name": "Person",
          "interfaces": ["INamed"],
          "members": [
            { "name": "Name", "type": "string" },
            { "name": "Age", "type": "int" },
            { "name": "Favorite", "type": "Color" },
            { "name": "Home", "type": "Address" },
            { "name": "Tags", "type": "List<string>" },
            { "name": "Scores", "type": "int[]" },
            { "name": "Born", "type": "DateTime" },
            { "name": "Rank", "type": "int?" },
            { "name": "Extra", "type": "BsonDocument" }
          ]
        },
        {
          "name": "Employee",
          "base": "Person",
          "members": [{ "name": "Salary", "type": "decimal" }]
        },
        {
          "name": "Summary",
          "anonymous": true,
          "members": [
            { "name": "Name", "type": "string" },
            { "name": "Age", "type": "int" }
          ]
        },
        {
          "name": "Pair",
          "members": [
            { "name": "Left", "type": "int" },
            { "name": "Right", "type": "int" }
          ]
        }
      ]
    }
"#};

pub(crate) fn model() -> TypeTable {
    TypeTable::from_json(MODEL).expect("test model must load")
}

/// Parse a type name against the builder's table.
pub(crate) fn ty(b: &mut ExprBuilder<'_>, name: &str) -> TypeId {
    b.types()
        .parse(name)
        .unwrap_or_else(|err| panic!("bad type `{name}`: {err}"))
}

/// Parameter `p` of type `Person`.
pub(crate) fn person(b: &mut ExprBuilder<'_>) -> ExprId {
    let person = ty(b, "Person");
    b.parameter("p", person)
}

pub(crate) fn queryable(name: &str) -> MethodRef {
    MethodRef::static_method(Owner::Queryable, name)
}

pub(crate) fn enumerable(name: &str) -> MethodRef {
    MethodRef::static_method(Owner::Enumerable, name)
}

/// A finished tree over [`MODEL`], its default registry, and seeds.
///
/// The root is the last node built.
pub(crate) struct Case {
    pub types: Arc<TypeTable>,
    pub registry: DefaultRegistry,
    pub tree: ExprTree,
    pub root: ExprId,
    seeds: Vec<(ExprId, Serializer)>,
}

impl Case {
    pub fn new<T>(build: impl FnOnce(&mut ExprBuilder<'_>) -> T) -> (Self, T) {
        let mut types = model();
        let mut b = ExprBuilder::new(&mut types);
        let nodes = build(&mut b);
        let tree = b.finish();
        let root = tree.ids().last().expect("tree must not be empty");
        let types = Arc::new(types);
        let registry = DefaultRegistry::new(types.clone());
        let case = Self {
            types,
            registry,
            tree,
            root,
            seeds: Vec::new(),
        };
        (case, nodes)
    }

    /// Seed `node` with the registry default for its type.
    pub fn seed(&mut self, node: ExprId) -> &mut Self {
        let serializer = self.lookup(self.tree.ty(node));
        self.seed_with(node, serializer)
    }

    pub fn seed_with(&mut self, node: ExprId, serializer: Serializer) -> &mut Self {
        self.seeds.push((node, serializer));
        self
    }

    pub fn lookup(&self, ty: TypeId) -> Serializer {
        self.registry
            .lookup(ty)
            .unwrap_or_else(|err| panic!("no default serializer: {err}"))
    }

    pub fn find(&self) -> Result<KnownSerializers> {
        self.find_with(FinderOptions::default())
    }

    pub fn find_with(&self, options: FinderOptions) -> Result<KnownSerializers> {
        SerializerFinder::new(&self.types, &self.registry)
            .seeds(self.seeds.iter().cloned())
            .options(options)
            .find(&self.tree, self.root)
    }

    /// Run and expect success.
    pub fn known(&self) -> KnownSerializers {
        self.find()
            .unwrap_or_else(|err| panic!("inference failed: {err}"))
    }

    /// Run and expect failure; returns the error message.
    pub fn error(&self) -> String {
        match self.find() {
            Ok(known) => panic!("expected an error, got:\n{}", self.dump(&known)),
            Err(err) => err.to_string(),
        }
    }

    /// Serializer name for `node`, or `-` when unknown.
    pub fn show(&self, known: &KnownSerializers, node: ExprId) -> String {
        known
            .get(node)
            .map_or_else(|| "-".to_owned(), |s| self.name(s))
    }

    pub fn name(&self, serializer: &Serializer) -> String {
        serializer.display(&self.types).to_string()
    }

    pub fn dump(&self, known: &KnownSerializers) -> String {
        known.dump(&self.tree, &self.types)
    }

    pub fn expr(&self, node: ExprId) -> String {
        ExprPrinter::new(&self.tree, &self.types, node).to_string()
    }
}
