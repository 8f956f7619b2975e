use wirefind_core::{Serializer, TYPE_BOOLEAN, TYPE_INT32, TYPE_STRING, WireType};

use crate::KnownSerializers;
use crate::audit::audit;
use crate::expr::{BinaryOp, ExprId, MethodRef, Owner};
use crate::test_utils::{Case, ty};

fn mark(case: &Case, known: &mut KnownSerializers, node: ExprId, serializer: Serializer) {
    known.add(&case.tree, &case.types, node, serializer).unwrap();
}

fn check(case: &Case, known: &KnownSerializers) -> Result<(), String> {
    audit(&case.tree, &case.types, known, case.root).map_err(|err| err.to_string())
}

#[test]
fn lambda_headers_and_quotes_need_no_serializer() {
    let (case, (x, age)) = Case::new(|b| {
        let person = ty(b, "Person");
        let x = b.parameter("x", person);
        let age = b.field(x, "Age");
        b.quoted_lambda(&[x], age);
        (x, age)
    });
    let mut known = KnownSerializers::new();
    mark(&case, &mut known, x, case.lookup(case.tree.ty(x)));
    mark(&case, &mut known, age, Serializer::primitive(TYPE_INT32, WireType::Int32));

    assert_eq!(check(&case, &known), Ok(()));
}

#[test]
fn first_gap_in_pre_order_is_reported() {
    let (case, (x, age)) = Case::new(|b| {
        let person = ty(b, "Person");
        let x = b.parameter("x", person);
        let age = b.field(x, "Age");
        let five = b.int(5);
        let name = b.field(x, "Name");
        let len = b.member(name, "Length", TYPE_INT32);
        let sum = b.binary(BinaryOp::Add, five, len);
        b.binary(BinaryOp::Equal, age, sum);
        (x, age)
    });
    let mut known = KnownSerializers::new();
    mark(&case, &mut known, case.root, case.lookup(TYPE_BOOLEAN));
    mark(&case, &mut known, x, case.lookup(case.tree.ty(x)));
    mark(&case, &mut known, age, case.lookup(TYPE_INT32));

    insta::assert_snapshot!(
        check(&case, &known).unwrap_err(),
        @"Unable to determine which serializer to use for the result of: (5 + x.Name.Length)."
    );
}

#[test]
fn sentinel_subtrees_are_skipped() {
    let (case, (call, eq, a)) = Case::new(|b| {
        let person = ty(b, "Person");
        let x = b.parameter("x", person);
        let name = b.field(x, "Name");
        let call = b.call(
            MethodRef::instance(Owner::String, "Frobnicate"),
            Some(name),
            &[],
            TYPE_STRING,
        );
        let a = b.string("a");
        let eq = b.binary(BinaryOp::Equal, call, a);
        (call, eq, a)
    });
    let mut known = KnownSerializers::new();
    mark(&case, &mut known, eq, case.lookup(case.tree.ty(eq)));
    mark(&case, &mut known, call, Serializer::unknowable(TYPE_STRING));
    mark(&case, &mut known, a, Serializer::ignore_subtree(TYPE_STRING));

    assert_eq!(check(&case, &known), Ok(()));
}

#[test]
fn unknowable_output_names_the_innermost_unknowable_node() {
    let (case, (age, inner, outer)) = Case::new(|b| {
        let person = ty(b, "Person");
        let x = b.parameter("x", person);
        let age = b.field(x, "Age");
        let inner = b.call(
            MethodRef::instance(Owner::Type(TYPE_INT32), "Frobnicate"),
            Some(age),
            &[],
            TYPE_INT32,
        );
        let outer = b.negate(inner);
        b.lambda(&[x], outer);
        (age, inner, outer)
    });
    let mut known = KnownSerializers::new();
    mark(&case, &mut known, outer, Serializer::unknowable(TYPE_INT32));
    mark(&case, &mut known, inner, Serializer::unknowable(TYPE_INT32));
    mark(&case, &mut known, age, case.lookup(TYPE_INT32));

    insta::assert_snapshot!(
        check(&case, &known).unwrap_err(),
        @"Unable to determine which serializer to use for the result of: x.Age.Frobnicate()."
    );
}
