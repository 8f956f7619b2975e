#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Serializer inference for query expression trees.
//!
//! Given an expression tree and the serializers already known at the call
//! site, [`find_serializers`] determines which serializer encodes the value
//! of every subexpression. Facts propagate along data-flow edges until a
//! fixed point; a final audit rejects trees that still have gaps.
//!
//! # Example
//!
//! ```ignore
//! let known = SerializerFinder::new(&types, &registry)
//!     .seed(param, person_serializer)
//!     .find(&tree, root)?;
//! let serializer = known.get_serializer(&tree, &types, root)?;
//! ```

mod audit;
pub mod expr;
mod finder;
mod known;
mod options;
mod rules;

#[cfg(test)]
mod audit_tests;
#[cfg(test)]
mod finder_tests;
#[cfg(test)]
mod test_utils;

pub use expr::{
    BinaryOp, ConstValue, ExprBuilder, ExprId, ExprKind, ExprNode, ExprPrinter, ExprTree,
    MethodRef, Owner, PipelineStage, UnaryOp,
};
pub use finder::{SerializerFinder, find_serializers};
pub use known::KnownSerializers;
pub use options::FinderOptions;

use wirefind_core::SerializerError;

/// Errors raised while inferring serializers. Every variant names the
/// offending subexpression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No rule handles the construct and it cannot be treated as opaque.
    #[error("Expression not supported: {expression} because {reason}.")]
    UnsupportedExpression { expression: String, reason: String },

    /// Two rules deduced different serializers for one node.
    #[error("Duplicate known serializers for expression {expression}: {existing} and {new}.")]
    DuplicateSerializer {
        expression: String,
        existing: String,
        new: String,
    },

    /// A serializer whose value type cannot be reconciled with the node.
    #[error(
        "Serializer value type {serializer_type} does not match expression value type {expression_type} for expression {expression}."
    )]
    ValueTypeMismatch {
        expression: String,
        serializer_type: String,
        expression_type: String,
    },

    /// The fixed point left a required node without a usable serializer.
    #[error("Unable to determine which serializer to use for the result of: {expression}.")]
    UnableToDetermineSerializer { expression: String },

    /// Pass fuel exhausted before the map stopped growing.
    #[error("Serializer inference did not reach a fixed point within {passes} passes.")]
    PassLimitExceeded { passes: u32 },

    /// A serializer capability query failed for the node.
    #[error("Expression not supported: {expression} because {source}.")]
    Serializer {
        expression: String,
        #[source]
        source: SerializerError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
