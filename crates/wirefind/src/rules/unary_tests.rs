use wirefind_core::{Serializer, TYPE_INT32, WireType};

use crate::expr::{BinaryOp, UnaryOp};
use crate::test_utils::{Case, person, ty};

#[test]
fn negation_keeps_the_operand_encoding() {
    let (mut case, (p, age, negated)) = Case::new(|b| {
        let p = person(b);
        let age = b.field(p, "Age");
        let negated = b.negate(age);
        (p, age, negated)
    });
    case.seed(p)
        .seed_with(age, Serializer::primitive(TYPE_INT32, WireType::String));

    let known = case.known();

    assert_eq!(case.show(&known, negated), "Int32Serializer(String)");
}

#[test]
fn array_length_is_a_plain_int() {
    let (mut case, p) = Case::new(|b| {
        let p = person(b);
        let scores = b.field(p, "Scores");
        b.array_length(scores);
        p
    });
    case.seed(p);

    let known = case.known();

    insta::assert_snapshot!(case.dump(&known), @r"
    p: ClassMapSerializer<Person>
    p.Scores.Length: Int32Serializer
    p.Scores: ArraySerializer<Int32Serializer>
    ");
}

#[test]
fn logical_not_falls_back_to_boolean() {
    let (mut case, p) = Case::new(|b| {
        let p = person(b);
        let age = b.field(p, "Age");
        let five = b.int(5);
        let older = b.binary(BinaryOp::GreaterThan, age, five);
        b.not(older);
        p
    });
    case.seed(p);

    let known = case.known();

    insta::assert_snapshot!(case.dump(&known), @r"
    p: ClassMapSerializer<Person>
    p.Age: Int32Serializer
    5: Int32Serializer
    !(p.Age > 5): BooleanSerializer
    (p.Age > 5): BooleanSerializer
    ");
}

#[test]
fn type_as_narrows_a_class_map() {
    let (mut case, (p, cast, salary)) = Case::new(|b| {
        let employee = ty(b, "Employee");
        let p = person(b);
        let cast = b.unary(UnaryOp::TypeAs, p, employee);
        let salary = b.field(cast, "Salary");
        (p, cast, salary)
    });
    case.seed(p);

    let known = case.known();

    assert_eq!(case.show(&known, cast), "ClassMapSerializer<Employee>");
    assert_eq!(case.show(&known, salary), "DecimalSerializer");
    assert_eq!(case.expr(salary), "(p as Employee).Salary");
}
