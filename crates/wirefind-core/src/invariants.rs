//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::types::{TypeId, TypeShape, TypeTable};

impl TypeTable {
    pub(crate) fn ensure_shape(&self, id: TypeId) -> &TypeShape {
        self.get(id).unwrap_or_else(|| {
            panic!(
                "TypeTable: type id {} not found \
                 (ids must come from the table that interned them)",
                id.0
            )
        })
    }
}
