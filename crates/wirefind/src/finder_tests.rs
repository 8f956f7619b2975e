use wirefind_core::{Serializer, TYPE_BOOLEAN, TYPE_INT32, TYPE_STRING, WireType};

use crate::expr::{BinaryOp, MethodRef, Owner};
use crate::test_utils::{Case, ty};
use crate::{Error, FinderOptions, find_serializers};

#[test]
fn string_concatenation_is_a_string_regardless_of_operands() {
    let (mut case, (p, name)) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let a = b.string("a");
        let name = b.field(p, "Name");
        b.binary(BinaryOp::Add, a, name);
        (p, name)
    });
    case.seed(p);

    let known = case.known();

    insta::assert_snapshot!(case.dump(&known), @r#"
    p: ClassMapSerializer<Person>
    ("a" + p.Name): StringSerializer
    p.Name: StringSerializer
    "a": StringSerializer
    "#);
    assert_eq!(case.show(&known, name), "StringSerializer");
}

#[test]
fn array_index_yields_the_item_serializer() {
    let (mut case, (p, index)) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let scores = b.field(p, "Scores");
        let index = b.int(1);
        b.binary(BinaryOp::ArrayIndex, scores, index);
        (p, index)
    });
    case.seed(p);

    let known = case.known();

    insta::assert_snapshot!(case.dump(&known), @r"
    p: ClassMapSerializer<Person>
    1: Int32Serializer
    p.Scores: ArraySerializer<Int32Serializer>
    p.Scores[1]: Int32Serializer
    ");
    assert_eq!(case.show(&known, index), "Int32Serializer");
}

#[test]
fn key_value_pair_is_built_from_known_arguments() {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let pair = ty(b, "KeyValuePair<string,int>");
        let p = b.parameter("p", person);
        let key = b.field(p, "Name");
        let value = b.field(p, "Age");
        b.new_object(pair, &["key", "value"], &[key, value]);
        p
    });
    case.seed(p);

    let known = case.known();

    assert_eq!(
        case.show(&known, case.root),
        "KeyValuePairSerializer<StringSerializer, Int32Serializer>"
    );
}

#[test]
fn array_literal_items_take_the_item_serializer_of_the_array() {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let scores = b.field(p, "Scores");
        let items = [b.int(1), b.int(2), b.int(3)];
        let array = b.new_array(TYPE_INT32, &items);
        b.binary(BinaryOp::Equal, scores, array);
        p
    });
    case.seed(p);

    let known = case.known();

    insta::assert_snapshot!(case.dump(&known), @r"
    p: ClassMapSerializer<Person>
    p.Scores: ArraySerializer<Int32Serializer>
    new[] { 1, 2, 3 }: ArraySerializer<Int32Serializer>
    1: Int32Serializer
    2: Int32Serializer
    3: Int32Serializer
    (p.Scores == new[] { 1, 2, 3 }): BooleanSerializer
    ");
}

#[test]
fn unknown_method_as_result_is_reported() {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let name = b.field(p, "Name");
        b.call(
            MethodRef::instance(Owner::String, "Frobnicate"),
            Some(name),
            &[],
            TYPE_STRING,
        );
        p
    });
    case.seed(p);

    insta::assert_snapshot!(
        case.error(),
        @"Unable to determine which serializer to use for the result of: p.Name.Frobnicate()."
    );
}

#[test]
fn unknowable_intermediate_is_tolerated_and_pruned() {
    let (mut case, (p, name, call, eq)) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let name = b.field(p, "Name");
        let call = b.call(
            MethodRef::instance(Owner::String, "Frobnicate"),
            Some(name),
            &[],
            TYPE_STRING,
        );
        let a = b.string("a");
        let eq = b.binary(BinaryOp::Equal, call, a);
        b.lambda(&[p], eq);
        (p, name, call, eq)
    });
    case.seed(p);

    let known = case.known();

    assert_eq!(case.show(&known, call), "UnknowableSerializer<string>");
    assert_eq!(case.show(&known, name), "-");
    assert_eq!(case.show(&known, eq), "BooleanSerializer");
}

#[test]
fn unknowable_projection_names_the_innermost_culprit() {
    let (mut case, source) = Case::new(|b| {
        let people = ty(b, "IQueryable<Person>");
        let person = ty(b, "Person");
        let result = ty(b, "IQueryable<string>");
        let source = b.parameter("people", people);
        let x = b.parameter("x", person);
        let name = b.field(x, "Name");
        let body = b.call(
            MethodRef::instance(Owner::String, "Frobnicate"),
            Some(name),
            &[],
            TYPE_STRING,
        );
        let selector = b.quoted_lambda(&[x], body);
        b.call(
            MethodRef::static_method(Owner::Queryable, "Select"),
            None,
            &[source, selector],
            result,
        );
        source
    });
    case.seed(source);

    insta::assert_snapshot!(
        case.error(),
        @"Unable to determine which serializer to use for the result of: x.Name.Frobnicate()."
    );
}

#[test]
fn unseeded_parameter_is_reported() {
    let (case, _) = Case::new(|b| {
        let person = ty(b, "Person");
        let x = b.parameter("x", person);
        let age = b.field(x, "Age");
        let five = b.int(5);
        let gt = b.binary(BinaryOp::GreaterThan, age, five);
        b.lambda(&[x], gt);
    });

    insta::assert_snapshot!(
        case.error(),
        @"Unable to determine which serializer to use for the result of: x."
    );
}

#[test]
fn disabled_defaults_leave_comparisons_unresolved() {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let age = b.field(p, "Age");
        let five = b.int(5);
        let gt = b.binary(BinaryOp::GreaterThan, age, five);
        b.lambda(&[p], gt);
        p
    });
    case.seed(p);

    let err = case
        .find_with(FinderOptions::new().apply_defaults(false))
        .unwrap_err();

    insta::assert_snapshot!(
        err,
        @"Unable to determine which serializer to use for the result of: (p.Age > 5)."
    );
    assert!(case.find().is_ok());
}

#[test]
fn rerunning_gives_the_same_map() {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let age = b.field(p, "Age");
        let five = b.int(5);
        let gt = b.binary(BinaryOp::GreaterThan, age, five);
        b.lambda(&[p], gt);
        p
    });
    case.seed(p);

    let first = case.known();
    let second = case.known();

    assert_eq!(case.dump(&first), case.dump(&second));
}

#[test]
fn seeds_agreeing_with_rules_do_not_conflict() {
    let (mut case, (p, age)) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let age = b.field(p, "Age");
        let five = b.int(5);
        b.binary(BinaryOp::GreaterThan, age, five);
        (p, age)
    });
    case.seed(p).seed(age);

    let known = case.known();

    assert_eq!(known.len(), case.tree.len());
}

#[test]
fn seed_of_the_wrong_type_is_rejected() {
    let (mut case, five) = Case::new(|b| b.int(5));
    case.seed_with(five, Serializer::primitive(TYPE_STRING, WireType::String));

    insta::assert_snapshot!(
        case.error(),
        @"Serializer value type string does not match expression value type int for expression 5."
    );
}

#[test]
fn symmetric_operators_share_the_known_operand_serializer() {
    let ops = [
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::LessThan,
        BinaryOp::GreaterThanOrEqual,
        BinaryOp::Add,
        BinaryOp::Multiply,
    ];
    for op in ops {
        for age_on_left in [true, false] {
            let (mut case, (p, age, seven)) = Case::new(|b| {
                let person = ty(b, "Person");
                let p = b.parameter("p", person);
                let age = b.field(p, "Age");
                let seven = b.int(7);
                if age_on_left {
                    b.binary(op, age, seven);
                } else {
                    b.binary(op, seven, age);
                }
                (p, age, seven)
            });
            let as_string = Serializer::primitive(TYPE_INT32, WireType::String);
            case.seed(p).seed_with(age, as_string.clone());

            let known = case.known();

            assert_eq!(known.get(seven), Some(&as_string), "{op:?}");
        }
    }
}

#[test]
fn nullable_round_trip_recovers_the_original_serializer() {
    let (mut case, (p, age, wrapped)) = Case::new(|b| {
        let person = ty(b, "Person");
        let nullable_int = ty(b, "int?");
        let p = b.parameter("p", person);
        let age = b.field(p, "Age");
        let wrapped = b.convert(age, nullable_int);
        b.convert(wrapped, TYPE_INT32);
        (p, age, wrapped)
    });
    case.seed(p);

    let known = case.known();

    assert_eq!(case.expr(case.root), "(int)(int?)p.Age");
    assert_eq!(
        case.show(&known, wrapped),
        "NullableSerializer<Int32Serializer>"
    );
    let recovered = known.get(case.root).unwrap();
    assert_eq!(recovered.value_type(), TYPE_INT32);
    assert_eq!(Some(recovered), known.get(age));
}

fn deep_negation(depth: usize) -> Case {
    let (mut case, p) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let mut node = b.field(p, "Age");
        for _ in 0..depth {
            node = b.negate(node);
        }
        p
    });
    case.seed(p);
    case
}

#[test]
fn deep_trees_settle_in_a_few_passes() {
    let case = deep_negation(200);

    let known = case
        .find_with(FinderOptions::new().pass_fuel(Some(3)))
        .unwrap();

    assert_eq!(known.len(), case.tree.len());
    assert!(case.find_with(FinderOptions::new().pass_fuel(None)).is_ok());
}

#[test]
fn running_out_of_passes_is_an_error() {
    let case = deep_negation(10);

    let err = case
        .find_with(FinderOptions::new().pass_fuel(Some(2)))
        .unwrap_err();

    assert_eq!(err, Error::PassLimitExceeded { passes: 2 });
    insta::assert_snapshot!(err, @"Serializer inference did not reach a fixed point within 2 passes.");
}

#[test]
fn one_shot_entry_point_matches_the_finder() {
    let (case, (p, gt)) = Case::new(|b| {
        let person = ty(b, "Person");
        let p = b.parameter("p", person);
        let age = b.field(p, "Age");
        let five = b.int(5);
        let gt = b.binary(BinaryOp::GreaterThan, age, five);
        (p, gt)
    });
    let seed = case.lookup(case.tree.ty(p));

    let known = find_serializers(
        &case.tree,
        case.root,
        &case.types,
        &case.registry,
        [(p, seed)],
        FinderOptions::default(),
    )
    .unwrap();

    assert_eq!(known.get(gt).map(Serializer::value_type), Some(TYPE_BOOLEAN));
}
