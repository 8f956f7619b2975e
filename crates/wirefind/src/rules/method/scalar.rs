//! Scalar methods: math, string and date functions.

use wirefind_core::{
    DateTimeKind, Primitive, Serializer, SerializerKind, TYPE_STRING, TimeSpanUnits, WireType,
};

use crate::Result;
use crate::expr::{ExprId, Owner};

use super::{CallSite, Deducer};

const MATH: &[Owner] = &[Owner::Math, Owner::MongoMath];

impl Deducer<'_> {
    /// Date arithmetic produces UTC dates.
    fn returns_utc_date(&mut self, node: ExprId) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let serializer = Serializer::new(
            self.ty(node),
            SerializerKind::DateTime {
                kind: DateTimeKind::Utc,
            },
        );
        self.add(node, serializer)
    }

    /// Standard serializer when the result is numeric; nothing otherwise.
    fn returns_numeric(&mut self, node: ExprId) -> Result<()> {
        if !self.types.is_numeric_or_nullable_numeric(self.ty(node)) {
            return Ok(());
        }
        self.returns_standard(node)
    }
}

fn unknown(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    cx.deduce_unknown_method(call)
}

/// String-owned method that returns a standard scalar.
fn string_result(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::String {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

pub(super) fn abs(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(MATH) || call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.deduce_same(call.node, call.args[0])
}

/// `DateTime.Add(span)` and the unit-taking extension forms.
pub(super) fn add(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    add_time(cx, call)
}

pub(super) fn add_time(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::DateTime {
        return unknown(cx, call);
    }
    cx.returns_utc_date(call.node)
}

/// `Ceiling`, `Floor`, `Round`.
pub(super) fn rounding(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(MATH) || !(1..=2).contains(&call.arity()) {
        return unknown(cx, call);
    }
    cx.returns_numeric(call.node)
}

/// `Compare(a, b)` and `a.CompareTo(b)`: both operands share a
/// representation.
pub(super) fn compare(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let (value, comparand) = match (call.object, call.args) {
        (Some(object), [comparand]) => (object, *comparand),
        (None, [value, comparand, ..]) if call.is_static() => (*value, *comparand),
        _ => return unknown(cx, call),
    };
    cx.deduce_same(value, comparand)?;
    cx.returns_standard(call.node)
}

/// Math functions with `double` results.
pub(super) fn math_double(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(MATH) {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// `EndsWith`, `StartsWith`.
pub(super) fn string_predicate(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

pub(super) fn equals(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if cx.types.primitive(cx.ty(call.node)) != Some(Primitive::Boolean) {
        return unknown(cx, call);
    }
    let (a, b) = match (call.object, call.args) {
        (Some(object), [other]) => (object, *other),
        (Some(object), [other, _]) if call.owner() == Owner::String => (object, *other),
        (None, [a, b]) => (*a, *b),
        (None, [a, b, _]) if call.owner() == Owner::String => (*a, *b),
        _ => return unknown(cx, call),
    };
    cx.deduce_same(a, b)?;
    cx.returns_standard(call.node)
}

/// `IndexOf`, `IndexOfBytes`.
pub(super) fn index_of(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

pub(super) fn is_match(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Regex || !call.is_static() {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

pub(super) fn is_null_or_empty(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::String || !call.is_static() || call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// `T.Parse(string)` for the types the server can parse.
pub(super) fn parse(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if cx.is_known(call.node) {
        return Ok(());
    }
    let node_ty = cx.ty(call.node);
    let declaring = match call.owner() {
        Owner::DateTime => cx.types.primitive(node_ty) == Some(Primitive::DateTime),
        Owner::Type(ty) => ty == node_ty,
        _ => false,
    };
    let parses_string = matches!(call.args, [arg] if cx.ty(*arg) == TYPE_STRING);
    if !call.is_static() || !declaring || !parses_string {
        return unknown(cx, call);
    }

    match cx.types.primitive(node_ty) {
        Some(
            Primitive::DateTime
            | Primitive::Decimal
            | Primitive::Double
            | Primitive::Int16
            | Primitive::Int32
            | Primitive::Int64,
        ) => cx.returns_standard(call.node),
        _ => cx.add_unknowable(call.node),
    }
}

pub(super) fn split(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

pub(super) fn string_in(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

pub(super) fn str_len_bytes(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

/// `Substring`, `ToLower`, `Trim` and friends.
pub(super) fn string_transform(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    string_result(cx, call)
}

/// Date subtraction; the result type picks the codec.
pub(super) fn subtract(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::DateTime {
        return unknown(cx, call);
    }
    match cx.types.primitive(cx.ty(call.node)) {
        Some(Primitive::DateTime) => cx.returns_utc_date(call.node),
        Some(Primitive::Int64) => cx.returns_standard(call.node),
        Some(Primitive::TimeSpan) => {
            if cx.is_known(call.node) {
                return Ok(());
            }
            let serializer = Serializer::new(
                cx.ty(call.node),
                SerializerKind::TimeSpan {
                    representation: WireType::Int64,
                    units: TimeSpanUnits::Milliseconds,
                },
            );
            cx.add(call.node, serializer)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn to_string(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    cx.returns_standard(call.node)
}

pub(super) fn truncate(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    match call.owner() {
        Owner::DateTime => cx.returns_utc_date(call.node),
        Owner::Math | Owner::MongoMath => cx.returns_numeric(call.node),
        _ => unknown(cx, call),
    }
}

pub(super) fn week(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::DateTime {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}
