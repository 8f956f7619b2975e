//! Query expression trees.
//!
//! Nodes live in an arena owned by [`ExprTree`] and are addressed by
//! [`ExprId`]. Identity is positional: two structurally equal nodes at
//! different positions are different keys. Lambda parameters are single
//! nodes referenced from both the lambda header and every use in the body.

mod builder;
mod method;
mod printer;

#[cfg(test)]
mod printer_tests;

use std::fmt;
use std::sync::Arc;

use wirefind_core::{Serializer, SerializerError, TypeId, WireType};

pub use builder::ExprBuilder;
pub use method::{MethodRef, Owner};
pub use printer::ExprPrinter;

/// Index of a node in its [`ExprTree`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// External stage renderer, consulted for the output serializer of an
/// appended pipeline stage.
pub trait PipelineStage: fmt::Debug + Send + Sync {
    fn output_serializer(&self, input: &Serializer) -> Result<Serializer, SerializerError>;
}

/// Literal values.
#[derive(Clone, Debug)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    /// A serializer passed as configuration (`Mql.Field(.., serializer)`).
    /// `None` stands for a null argument.
    Serializer(Option<Serializer>),
    Representation(WireType),
    Stage(Arc<dyn PipelineStage>),
    /// Handle to a collection whose documents use `document`.
    Collection { name: String, document: Serializer },
    /// Captured value the engine never inspects.
    Opaque(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Negate,
    NegateChecked,
    UnaryPlus,
    Not,
    Convert,
    ConvertChecked,
    TypeAs,
    ArrayLength,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    AddChecked,
    Subtract,
    SubtractChecked,
    Multiply,
    MultiplyChecked,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    AndAlso,
    OrElse,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Coalesce,
    ArrayIndex,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Operators whose operands share a wire representation.
    pub fn is_symmetric(self) -> bool {
        !matches!(
            self,
            Self::ArrayIndex | Self::Power | Self::LeftShift | Self::RightShift
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::AddChecked
                | Self::Subtract
                | Self::SubtractChecked
                | Self::Multiply
                | Self::MultiplyChecked
                | Self::Divide
                | Self::Modulo
                | Self::Power
                | Self::LeftShift
                | Self::RightShift
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add | Self::AddChecked => "+",
            Self::Subtract | Self::SubtractChecked => "-",
            Self::Multiply | Self::MultiplyChecked => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::And => "&",
            Self::Or => "|",
            Self::ExclusiveOr => "^",
            Self::AndAlso => "&&",
            Self::OrElse => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Coalesce => "??",
            Self::ArrayIndex => "[]",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Constant(ConstValue),
    Parameter {
        name: String,
    },
    /// Field or property access; `object` is `None` for static members.
    Member {
        object: Option<ExprId>,
        member: String,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Conditional {
        test: ExprId,
        if_true: ExprId,
        if_false: ExprId,
    },
    TypeIs {
        operand: ExprId,
        tested: TypeId,
    },
    Call {
        method: MethodRef,
        object: Option<ExprId>,
        args: Vec<ExprId>,
    },
    Lambda {
        params: Vec<ExprId>,
        body: ExprId,
    },
    Quote(ExprId),
    /// Constructor call. `params` are the constructor's parameter names;
    /// `members` lists the members initialized by each argument when the
    /// constructor is known to map 1:1 onto members (projection types).
    New {
        params: Vec<String>,
        args: Vec<ExprId>,
        members: Option<Vec<String>>,
    },
    MemberInit {
        new: ExprId,
        bindings: Vec<(String, ExprId)>,
    },
    NewArrayInit {
        items: Vec<ExprId>,
    },
    NewArrayBounds {
        bounds: Vec<ExprId>,
    },
}

#[derive(Clone, Debug)]
pub struct ExprNode {
    pub ty: TypeId,
    pub kind: ExprKind,
}

/// Arena of expression nodes.
#[derive(Clone, Debug, Default)]
pub struct ExprTree {
    nodes: Vec<ExprNode>,
}

impl ExprTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ExprId) -> Option<&ExprNode> {
        self.nodes.get(id.index())
    }

    /// # Panics
    /// Panics if `id` was not created for this tree.
    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.index()]
    }

    pub fn ty(&self, id: ExprId) -> TypeId {
        self.node(id).ty
    }

    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.node(id).kind
    }

    pub fn ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.nodes.len() as u32).map(ExprId)
    }

    /// Operands in evaluation order. Lambda headers are not operands.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        match self.kind(id) {
            ExprKind::Constant(_) | ExprKind::Parameter { .. } => Vec::new(),
            ExprKind::Member { object, .. } => object.iter().copied().collect(),
            ExprKind::Unary { operand, .. } | ExprKind::TypeIs { operand, .. } => vec![*operand],
            ExprKind::Binary { left, right, .. } => vec![*left, *right],
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => vec![*test, *if_true, *if_false],
            ExprKind::Call { object, args, .. } => {
                object.iter().chain(args.iter()).copied().collect()
            }
            ExprKind::Lambda { body, .. } => vec![*body],
            ExprKind::Quote(inner) => vec![*inner],
            ExprKind::New { args, .. } => args.clone(),
            ExprKind::MemberInit { new, bindings } => std::iter::once(*new)
                .chain(bindings.iter().map(|(_, value)| *value))
                .collect(),
            ExprKind::NewArrayInit { items } => items.clone(),
            ExprKind::NewArrayBounds { bounds } => bounds.clone(),
        }
    }

    fn push(&mut self, ty: TypeId, kind: ExprKind) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(ExprNode { ty, kind });
        id
    }
}
