//! Source-like rendering of expressions, used in error messages and dumps.

use std::fmt::{self, Write};

use wirefind_core::TypeTable;

use super::{BinaryOp, ConstValue, ExprId, ExprKind, ExprTree, UnaryOp};

/// Renders a subtree as query source text (`x => (x.Age > 21)`).
pub struct ExprPrinter<'a> {
    tree: &'a ExprTree,
    types: &'a TypeTable,
    root: ExprId,
}

impl<'a> ExprPrinter<'a> {
    pub fn new(tree: &'a ExprTree, types: &'a TypeTable, root: ExprId) -> Self {
        Self { tree, types, root }
    }

    pub fn dump(&self) -> String {
        self.to_string()
    }

    fn format(&self, w: &mut impl Write, id: ExprId) -> fmt::Result {
        match self.tree.kind(id) {
            ExprKind::Constant(value) => self.format_constant(w, value),
            ExprKind::Parameter { name } => w.write_str(name),
            ExprKind::Member { object, member } => {
                match object {
                    Some(object) => self.format(w, *object)?,
                    None => write!(w, "{}", self.types.display(self.tree.ty(id)))?,
                }
                write!(w, ".{member}")
            }
            ExprKind::Unary { op, operand } => self.format_unary(w, id, *op, *operand),
            ExprKind::Binary { op, left, right } => {
                if *op == BinaryOp::ArrayIndex {
                    self.format(w, *left)?;
                    w.write_char('[')?;
                    self.format(w, *right)?;
                    return w.write_char(']');
                }
                w.write_char('(')?;
                self.format(w, *left)?;
                write!(w, " {} ", op.symbol())?;
                self.format(w, *right)?;
                w.write_char(')')
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                w.write_char('(')?;
                self.format(w, *test)?;
                w.write_str(" ? ")?;
                self.format(w, *if_true)?;
                w.write_str(" : ")?;
                self.format(w, *if_false)?;
                w.write_char(')')
            }
            ExprKind::TypeIs { operand, tested } => {
                w.write_char('(')?;
                self.format(w, *operand)?;
                write!(w, " is {})", self.types.display(*tested))
            }
            ExprKind::Call {
                method,
                object,
                args,
            } => {
                let mut args = args.as_slice();
                match object {
                    Some(object) => self.format(w, *object)?,
                    None if method.owner.is_extension_host() && !args.is_empty() => {
                        self.format(w, args[0])?;
                        args = &args[1..];
                    }
                    None => write!(w, "{}", method.owner.display(self.types))?,
                }
                write!(w, ".{}", method.name)?;
                self.format_list(w, "(", args, ")")
            }
            ExprKind::Lambda { params, body } => {
                match params.as_slice() {
                    [param] => self.format(w, *param)?,
                    params => self.format_list(w, "(", params, ")")?,
                }
                w.write_str(" => ")?;
                self.format(w, *body)
            }
            ExprKind::Quote(inner) => self.format(w, *inner),
            ExprKind::New { args, .. } => {
                write!(w, "new {}", self.types.display(self.tree.ty(id)))?;
                self.format_list(w, "(", args, ")")
            }
            ExprKind::MemberInit { new, bindings } => {
                self.format(w, *new)?;
                w.write_str(" { ")?;
                for (i, (name, value)) in bindings.iter().enumerate() {
                    if i > 0 {
                        w.write_str(", ")?;
                    }
                    write!(w, "{name} = ")?;
                    self.format(w, *value)?;
                }
                w.write_str(" }")
            }
            ExprKind::NewArrayInit { items } => {
                w.write_str("new[] ")?;
                self.format_list(w, "{ ", items, " }")
            }
            ExprKind::NewArrayBounds { bounds } => {
                let item = self.types.item_type(self.tree.ty(id));
                match item {
                    Some(item) => write!(w, "new {}", self.types.display(item))?,
                    None => w.write_str("new ?")?,
                }
                self.format_list(w, "[", bounds, "]")
            }
        }
    }

    fn format_unary(&self, w: &mut impl Write, id: ExprId, op: UnaryOp, operand: ExprId) -> fmt::Result {
        match op {
            UnaryOp::Negate | UnaryOp::NegateChecked => {
                w.write_char('-')?;
                self.format(w, operand)
            }
            UnaryOp::UnaryPlus => {
                w.write_char('+')?;
                self.format(w, operand)
            }
            UnaryOp::Not => {
                w.write_char('!')?;
                self.format(w, operand)
            }
            UnaryOp::Convert | UnaryOp::ConvertChecked => {
                write!(w, "({})", self.types.display(self.tree.ty(id)))?;
                self.format(w, operand)
            }
            UnaryOp::TypeAs => {
                w.write_char('(')?;
                self.format(w, operand)?;
                write!(w, " as {})", self.types.display(self.tree.ty(id)))
            }
            UnaryOp::ArrayLength => {
                self.format(w, operand)?;
                w.write_str(".Length")
            }
        }
    }

    fn format_constant(&self, w: &mut impl Write, value: &ConstValue) -> fmt::Result {
        match value {
            ConstValue::Null => w.write_str("null"),
            ConstValue::Bool(b) => write!(w, "{b}"),
            ConstValue::Int(n) => write!(w, "{n}"),
            ConstValue::Float(x) => write!(w, "{x:?}"),
            ConstValue::Char(c) => write!(w, "{c:?}"),
            ConstValue::String(s) => write!(w, "{s:?}"),
            ConstValue::Serializer(Some(serializer)) => {
                write!(w, "{}", serializer.display(self.types))
            }
            ConstValue::Serializer(None) => w.write_str("null"),
            ConstValue::Representation(representation) => {
                write!(w, "BsonType.{}", representation.name())
            }
            ConstValue::Stage(stage) => write!(w, "{stage:?}"),
            ConstValue::Collection { name, .. } => w.write_str(name),
            ConstValue::Opaque(text) => w.write_str(text),
        }
    }

    fn format_list(&self, w: &mut impl Write, open: &str, items: &[ExprId], close: &str) -> fmt::Result {
        w.write_str(open)?;
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            self.format(w, item)?;
        }
        w.write_str(close)
    }
}

impl fmt::Display for ExprPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format(f, self.root)
    }
}
