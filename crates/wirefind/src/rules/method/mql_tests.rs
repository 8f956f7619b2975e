use std::sync::Arc;

use wirefind_core::{
    Serializer, SerializerError, SerializerKind, TYPE_CHAR, TYPE_INT32, TYPE_OBJECT, TYPE_STRING,
    TYPE_TIMESPAN, TYPE_WIRE_VALUE, WireType,
};

use crate::expr::{ExprBuilder, ExprId, MethodRef, Owner, PipelineStage};
use crate::test_utils::{Case, person, ty};

fn mql(name: &str) -> MethodRef {
    MethodRef::static_method(Owner::Mql, name)
}

fn mongo_queryable(name: &str) -> MethodRef {
    MethodRef::static_method(Owner::MongoQueryable, name)
}

/// Parameter `src` of type `IQueryable<Person>`.
fn people(b: &mut ExprBuilder<'_>) -> ExprId {
    let people = ty(b, "IQueryable<Person>");
    b.parameter("src", people)
}

/// Serializer deduced for the root; `seed` names the parameter to seed.
fn deduce(build: impl FnOnce(&mut ExprBuilder<'_>) -> ExprId) -> String {
    let (mut case, seed) = Case::new(build);
    case.seed(seed);
    let known = case.known();
    case.show(&known, case.root)
}

#[derive(Debug)]
struct Names;

impl PipelineStage for Names {
    fn output_serializer(&self, _input: &Serializer) -> Result<Serializer, SerializerError> {
        Ok(Serializer::primitive(TYPE_STRING, WireType::String))
    }
}

#[derive(Debug)]
struct Rejects;

impl PipelineStage for Rejects {
    fn output_serializer(&self, _input: &Serializer) -> Result<Serializer, SerializerError> {
        Err(SerializerError::NotACollection("Person".to_owned()))
    }
}

#[test]
fn field_uses_the_given_serializer() {
    let out = deduce(|b| {
        let p = person(b);
        let name = b.string("Legacy");
        let serializer = b.serializer(Some(Serializer::primitive(TYPE_INT32, WireType::String)));
        b.call(mql("Field"), None, &[p, name, serializer], TYPE_INT32);
        p
    });

    assert_eq!(out, "Int32Serializer(String)");
}

#[test]
fn constant_with_a_representation() {
    let (case, seven) = Case::new(|b| {
        let seven = b.int(7);
        let representation = b.representation(WireType::String);
        b.call(mql("Constant"), None, &[seven, representation], TYPE_INT32);
        seven
    });

    let known = case.known();

    assert_eq!(case.show(&known, seven), "Int32Serializer(String)");
    assert_eq!(case.show(&known, case.root), "Int32Serializer(String)");
    assert_eq!(case.expr(case.root), "Mql.Constant(7, BsonType.String)");
}

#[test]
fn server_side_conversions() {
    let nullable = deduce(|b| {
        let target = ty(b, "int?");
        let p = person(b);
        let name = b.field(p, "Name");
        let options = b.null(TYPE_OBJECT);
        let method = mql("Convert").with_generic_args([TYPE_STRING, target]);
        b.call(method, None, &[name, options], target);
        p
    });
    let character = deduce(|b| {
        let p = person(b);
        let age = b.field(p, "Age");
        let options = b.null(TYPE_OBJECT);
        let method = mql("Convert").with_generic_args([TYPE_INT32, TYPE_CHAR]);
        b.call(method, None, &[age, options], TYPE_CHAR);
        p
    });

    assert_eq!(nullable, "NullableSerializer<Int32Serializer>");
    assert_eq!(character, "CharSerializer(String)");
}

#[test]
fn conversion_to_time_span_is_rejected() {
    let (mut case, p) = Case::new(|b| {
        let p = person(b);
        let name = b.field(p, "Name");
        let options = b.null(TYPE_OBJECT);
        let method = mql("Convert").with_generic_args([TYPE_STRING, TYPE_TIMESPAN]);
        b.call(method, None, &[name, options], TYPE_TIMESPAN);
        p
    });
    case.seed(p);

    insta::assert_snapshot!(
        case.error(),
        @"Expression not supported: Mql.Convert(p.Name, null) because TimeSpan is not a valid TTo for Convert."
    );
}

#[test]
fn factory_methods_build_pairs_and_tuples() {
    let pair = deduce(|b| {
        let pair = ty(b, "KeyValuePair<string, int>");
        let p = person(b);
        let name = b.field(p, "Name");
        let age = b.field(p, "Age");
        b.call(
            MethodRef::static_method(Owner::KeyValuePair, "Create"),
            None,
            &[name, age],
            pair,
        );
        p
    });
    let tuple = deduce(|b| {
        let tuple = ty(b, "Tuple<int, string>");
        let p = person(b);
        let age = b.field(p, "Age");
        let name = b.field(p, "Name");
        b.call(
            MethodRef::static_method(Owner::Tuple, "Create"),
            None,
            &[age, name],
            tuple,
        );
        p
    });

    assert_eq!(pair, "KeyValuePairSerializer<StringSerializer, Int32Serializer>");
    assert_eq!(tuple, "TupleSerializer<Int32Serializer, StringSerializer>");
}

#[test]
fn indexers() {
    let tag = deduce(|b| {
        let p = person(b);
        let tags = b.field(p, "Tags");
        let zero = b.int(0);
        let list = b.ty(tags);
        b.call(
            MethodRef::instance(Owner::Type(list), "get_Item"),
            Some(tags),
            &[zero],
            TYPE_STRING,
        );
        p
    });
    let extra = deduce(|b| {
        let p = person(b);
        let extra = b.field(p, "Extra");
        let key = b.string("x");
        let document = b.ty(extra);
        b.call(
            MethodRef::instance(Owner::Type(document), "get_Item"),
            Some(extra),
            &[key],
            TYPE_WIRE_VALUE,
        );
        p
    });

    assert_eq!(tag, "StringSerializer");
    assert_eq!(extra, "BsonValueSerializer");
}

#[test]
fn as_without_a_serializer_uses_the_registry() {
    let out = deduce(|b| {
        let employees = ty(b, "IQueryable<Employee>");
        let src = people(b);
        let none = b.serializer(None);
        b.call(mongo_queryable("As"), None, &[src, none], employees);
        src
    });

    assert_eq!(out, "IQueryableSerializer<ClassMapSerializer<Employee>>");
}

#[test]
fn documents_flow_into_the_source_array() {
    let (case, docs) = Case::new(|b| {
        let people = ty(b, "IQueryable<Person>");
        let array = ty(b, "Person[]");
        let database = b.null(TYPE_OBJECT);
        let docs = b.parameter("docs", array);
        b.call(mongo_queryable("Documents"), None, &[database, docs], people);
        docs
    });

    let known = case.known();

    assert_eq!(
        case.show(&known, docs),
        "ArraySerializer<ClassMapSerializer<Person>>"
    );
    assert_eq!(
        case.show(&known, case.root),
        "IQueryableSerializer<ClassMapSerializer<Person>>"
    );
}

#[test]
fn lookup_pairs_local_and_foreign_documents() {
    let out = deduce(|b| {
        let person = ty(b, "Person");
        let address = ty(b, "Address");
        let rows = ty(b, "IQueryable<LookupResult<Person, Address>>");
        let src = people(b);
        let addresses = b.collection("addresses", Serializer::new(address, SerializerKind::ClassMap));

        let x = b.parameter("x", person);
        let name = b.field(x, "Name");
        let local_field = b.quoted_lambda(&[x], name);
        let a = b.parameter("a", address);
        let city = b.field(a, "City");
        let foreign_field = b.quoted_lambda(&[a], city);

        b.call(
            mongo_queryable("Lookup"),
            None,
            &[src, addresses, local_field, foreign_field],
            rows,
        );
        src
    });

    assert_eq!(
        out,
        "IQueryableSerializer<LookupResultSerializer<ClassMapSerializer<Person>, ClassMapSerializer<Address>>>"
    );
}

#[test]
fn appended_stage_decides_the_output() {
    let out = deduce(|b| {
        let names = ty(b, "IQueryable<string>");
        let src = people(b);
        let stage = b.stage(Arc::new(Names));
        let none = b.serializer(None);
        b.call(mongo_queryable("AppendStage"), None, &[src, stage, none], names);
        src
    });

    assert_eq!(out, "IQueryableSerializer<StringSerializer>");
}

#[test]
fn stage_failure_is_reported_on_the_call() {
    let (mut case, src) = Case::new(|b| {
        let names = ty(b, "IQueryable<string>");
        let src = people(b);
        let stage = b.stage(Arc::new(Rejects));
        let none = b.serializer(None);
        b.call(mongo_queryable("AppendStage"), None, &[src, stage, none], names);
        src
    });
    case.seed(src);

    insta::assert_snapshot!(
        case.error(),
        @"Expression not supported: src.AppendStage(Rejects, null) because Person is not a collection type."
    );
}
