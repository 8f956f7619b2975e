//! Fixed-point driver.

use tracing::debug;
use wirefind_core::{Serializer, SerializerRegistry, TypeTable};

use crate::audit::audit;
use crate::expr::{ExprId, ExprTree};
use crate::known::KnownSerializers;
use crate::options::FinderOptions;
use crate::rules::Deducer;
use crate::{Error, Result};

/// Reusable inference entry point: type table, registry, seeds and options.
///
/// ```ignore
/// let finder = SerializerFinder::new(&types, &registry).seed(param, person);
/// let known = finder.find(&tree, root)?;
/// ```
pub struct SerializerFinder<'a> {
    types: &'a TypeTable,
    registry: &'a dyn SerializerRegistry,
    seeds: Vec<(ExprId, Serializer)>,
    options: FinderOptions,
}

impl<'a> SerializerFinder<'a> {
    pub fn new(types: &'a TypeTable, registry: &'a dyn SerializerRegistry) -> Self {
        Self {
            types,
            registry,
            seeds: Vec::new(),
            options: FinderOptions::default(),
        }
    }

    /// A serializer known before inference starts, typically for a lambda
    /// parameter ranging over documents of a known collection.
    pub fn seed(mut self, node: ExprId, serializer: Serializer) -> Self {
        self.seeds.push((node, serializer));
        self
    }

    pub fn seeds(mut self, seeds: impl IntoIterator<Item = (ExprId, Serializer)>) -> Self {
        self.seeds.extend(seeds);
        self
    }

    pub fn options(mut self, options: FinderOptions) -> Self {
        self.options = options;
        self
    }

    /// Run passes until nothing changes, then audit the tree.
    pub fn find(&self, tree: &ExprTree, root: ExprId) -> Result<KnownSerializers> {
        let mut known = KnownSerializers::new();
        for (node, serializer) in &self.seeds {
            known.add(tree, self.types, *node, serializer.clone())?;
        }

        let mut cx = Deducer::new(tree, self.types, self.registry, known);
        let mut pass: u32 = 0;
        loop {
            if let Some(limit) = self.options.fuel()
                && pass >= limit
            {
                return Err(Error::PassLimitExceeded { passes: limit });
            }

            let before = cx.known.len();
            pass += 1;
            cx.visit(root)?;
            let after = cx.known.len();
            debug!(pass, known = after, defaults = cx.defaults, "inference pass");

            if pass == 1 || after > before {
                continue;
            }
            if self.options.defaults_enabled() && !cx.defaults {
                debug!(pass, "fixed point reached, applying defaults");
                cx.defaults = true;
                continue;
            }
            break;
        }

        let known = cx.into_known();
        audit(tree, self.types, &known, root)?;
        Ok(known)
    }
}

/// One-shot form of [`SerializerFinder::find`].
pub fn find_serializers(
    tree: &ExprTree,
    root: ExprId,
    types: &TypeTable,
    registry: &dyn SerializerRegistry,
    seeds: impl IntoIterator<Item = (ExprId, Serializer)>,
    options: FinderOptions,
) -> Result<KnownSerializers> {
    SerializerFinder::new(types, registry)
        .seeds(seeds)
        .options(options)
        .find(tree, root)
}
