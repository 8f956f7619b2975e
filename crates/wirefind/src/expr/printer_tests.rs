use wirefind_core::{TYPE_DATETIME, TYPE_DOUBLE, TYPE_INT32, WireType};

use crate::expr::{BinaryOp, ExprId, MethodRef, Owner, UnaryOp};
use crate::test_utils::{Case, queryable, ty};

fn render(build: impl FnOnce(&mut crate::ExprBuilder<'_>)) -> String {
    let (case, ()) = Case::new(build);
    case.expr(case.root)
}

fn adult(b: &mut crate::ExprBuilder<'_>) -> (ExprId, ExprId) {
    let person = ty(b, "Person");
    let x = b.parameter("x", person);
    let age = b.field(x, "Age");
    let five = b.int(5);
    let gt = b.binary(BinaryOp::GreaterThan, age, five);
    (x, gt)
}

#[test]
fn lambda() {
    let out = render(|b| {
        let (x, gt) = adult(b);
        b.lambda(&[x], gt);
    });

    insta::assert_snapshot!(out, @"x => (x.Age > 5)");
}

#[test]
fn extension_call_prints_on_its_source() {
    let out = render(|b| {
        let people = ty(b, "IQueryable<Person>");
        let src = b.parameter("src", people);
        let (x, gt) = adult(b);
        let predicate = b.quoted_lambda(&[x], gt);
        b.call(queryable("Where"), None, &[src, predicate], people);
    });

    insta::assert_snapshot!(out, @"src.Where(x => (x.Age > 5))");
}

#[test]
fn static_call_prints_its_owner() {
    let out = render(|b| {
        let (x, _) = adult(b);
        let age = b.field(x, "Age");
        b.call(
            MethodRef::static_method(Owner::Math, "Abs"),
            None,
            &[age],
            TYPE_INT32,
        );
    });

    insta::assert_snapshot!(out, @"Math.Abs(x.Age)");
}

#[test]
fn indexing_and_array_literals() {
    let out = render(|b| {
        let one = b.int(1);
        let two = b.int(2);
        let array = b.new_array(TYPE_INT32, &[one, two]);
        let zero = b.int(0);
        b.binary(BinaryOp::ArrayIndex, array, zero);
    });

    insta::assert_snapshot!(out, @"new[] { 1, 2 }[0]");
}

#[test]
fn construction_and_member_init() {
    let out = render(|b| {
        let pair = ty(b, "Pair");
        let one = b.int(1);
        let two = b.int(2);
        let new = b.new_object(pair, &["left"], &[one]);
        b.member_init(new, &[("Right", two)]);
    });

    insta::assert_snapshot!(out, @"new Pair(1) { Right = 2 }");
}

#[test]
fn conditional_and_type_tests() {
    let out = render(|b| {
        let employee = ty(b, "Employee");
        let (x, gt) = adult(b);
        let is_employee = b.type_is(x, employee);
        let both = b.binary(BinaryOp::AndAlso, is_employee, gt);
        let yes = b.string("yes");
        let no = b.string("no");
        b.conditional(both, yes, no);
    });

    insta::assert_snapshot!(out, @r#"(((x is Employee) && (x.Age > 5)) ? "yes" : "no")"#);
}

#[test]
fn conversions() {
    let out = render(|b| {
        let employee = ty(b, "Employee");
        let nullable = ty(b, "int?");
        let (x, _) = adult(b);
        let cast = b.unary(UnaryOp::TypeAs, x, employee);
        let salary = b.field(cast, "Salary");
        let age = b.field(x, "Age");
        let widened = b.convert(age, nullable);
        let negated = b.negate(widened);
        let list = b.new_array(TYPE_DOUBLE, &[]);
        let length = b.array_length(list);
        b.new_array(TYPE_INT32, &[salary, negated, length]);
    });

    insta::assert_snapshot!(
        out,
        @"new[] { (x as Employee).Salary, -(int?)x.Age, new[] {  }.Length }"
    );
}

#[test]
fn constants_and_static_members() {
    let out = render(|b| {
        let now = b.static_member("Now", TYPE_DATETIME);
        let half = b.double(0.5);
        let representation = b.representation(WireType::String);
        let nothing = b.null(TYPE_INT32);
        let three = b.int(3);
        let bounds = b.new_array_bounds(TYPE_INT32, &[three]);
        let flag = b.bool(true);
        b.new_array(TYPE_INT32, &[now, half, representation, nothing, bounds, flag]);
    });

    insta::assert_snapshot!(
        out,
        @"new[] { DateTime.Now, 0.5, BsonType.String, null, new int[3], true }"
    );
}
