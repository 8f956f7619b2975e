use std::sync::Arc;

use crate::registry::DefaultRegistry;
use crate::serializer::*;
use crate::types::*;

fn int32() -> Serializer {
    Serializer::primitive(TYPE_INT32, WireType::Int32)
}

fn string() -> Serializer {
    Serializer::primitive(TYPE_STRING, WireType::String)
}

#[test]
fn capabilities_follow_the_kind() {
    let mut types = TypeTable::new();
    let ints = types.array(TYPE_INT32);
    let array = Serializer::array(ints, int32());

    assert!(array.has(Capability::Items));
    assert!(!array.has(Capability::Key));
    assert!(int32().has(Capability::Representation));
    assert!(Serializer::unknowable(TYPE_INT32).capabilities().is_empty());
}

#[test]
fn missing_capabilities_fail_loudly() {
    let err = int32().item_serializer().unwrap_err();

    assert_eq!(
        err,
        SerializerError::MissingCapability {
            serializer: "PrimitiveSerializer".to_owned(),
            capability: Capability::Items,
        }
    );
    assert_eq!(
        err.to_string(),
        "PrimitiveSerializer does not provide an item serializer"
    );
    assert!(int32().nullable_value_serializer().is_err());
    assert!(int32().tuple_item_serializer(1).is_err());
}

#[test]
fn wrappers_delegate_item_access() {
    let mut types = TypeTable::new();
    let list = types.list(TYPE_INT32);
    let enumerable = types.enumerable(TYPE_INT32);
    let inner = Serializer::collection(list, int32());

    let wrapped = inner.base_type_serializer(&types, enumerable).unwrap();

    assert!(matches!(wrapped.kind(), SerializerKind::Downcast(_)));
    assert_eq!(wrapped.value_type(), enumerable);
    assert_eq!(wrapped.item_serializer().unwrap(), int32());
    assert!(!wrapped.has(Capability::Representation));
}

#[test]
fn tuple_items_follow_the_remainder_convention() {
    let mut types = TypeTable::new();
    let mut items = vec![TYPE_INT32; 7];
    items.push(TYPE_STRING);
    let tuple_ty = types.tuple(false, &items);
    let rest_ty = types.tuple(false, &[TYPE_STRING]);

    let rest = Serializer::tuple(rest_ty, vec![string()]);
    let mut slots = vec![int32(); 7];
    slots.push(rest);
    let tuple = Serializer::tuple(tuple_ty, slots);

    assert_eq!(tuple.tuple_item_serializer(1).unwrap(), int32());
    assert_eq!(tuple.tuple_item_serializer(8).unwrap(), string());
    assert!(matches!(
        tuple.tuple_item_serializer(9),
        Err(SerializerError::IndexOutOfRange { .. })
    ));
    assert!(tuple.tuple_item_serializer(0).is_err());
}

#[test]
fn polymorphic_arrays_answer_per_index() {
    let mut types = TypeTable::new();
    let objects = types.array(TYPE_OBJECT);
    let items = vec![
        Serializer::downcast(TYPE_OBJECT, int32()),
        Serializer::downcast(TYPE_OBJECT, string()),
    ];
    let array = Serializer::new(objects, SerializerKind::PolymorphicArray(items.clone()));

    assert_eq!(array.item_serializer_at(1).unwrap(), items[1]);
    assert!(array.item_serializer_at(2).is_err());
    assert!(array.item_serializer().is_err());
}

#[test]
fn derived_and_base_navigation() {
    let mut types = TypeTable::new();
    let person = types
        .define_class("Person", ClassSpec::new().member("Name", TYPE_STRING))
        .unwrap();
    let employee = types
        .define_class("Employee", ClassSpec::new().base(person))
        .unwrap();
    let types = Arc::new(types);
    let registry = DefaultRegistry::new(types.clone());
    let person_map = Serializer::new(person, SerializerKind::ClassMap);

    let derived = person_map
        .derived_type_serializer(&types, &registry, employee)
        .unwrap();
    assert_eq!(derived, Serializer::new(employee, SerializerKind::ClassMap));

    let base = derived.base_type_serializer(&types, person).unwrap();
    assert_eq!(base, Serializer::downcast(person, derived.clone()));
    // navigating back down unwraps the adapter
    assert_eq!(
        base.derived_type_serializer(&types, &registry, employee).unwrap(),
        derived
    );

    let err = person_map
        .derived_type_serializer(&types, &registry, TYPE_STRING)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported conversion from Person to string"
    );
}

#[test]
fn class_map_members_come_from_the_registry() {
    let mut types = TypeTable::new();
    let person = types
        .define_class("Person", ClassSpec::new().member("Name", TYPE_STRING))
        .unwrap();
    let types = Arc::new(types);
    let registry = DefaultRegistry::new(types.clone());
    let person_map = Serializer::new(person, SerializerKind::ClassMap);

    assert_eq!(
        person_map.member_serializer(&types, &registry, "Name").unwrap(),
        string()
    );
    let err = person_map
        .member_serializer(&types, &registry, "Age")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ClassMapSerializer<Person> has no member named `Age`"
    );
}

#[test]
fn representation_is_reconfigurable() {
    let mut types = TypeTable::new();
    let nullable = types.nullable(TYPE_INT32);
    let serializer = Serializer::nullable(nullable, int32());

    let configured = serializer.with_representation(WireType::String).unwrap();

    assert_eq!(configured.representation(), Some(WireType::String));
    assert_eq!(
        configured.display(&types).to_string(),
        "NullableSerializer<Int32Serializer(String)>"
    );
    assert!(string().item_serializer().is_err());
}

#[test]
fn coerce_rewraps_nullable_enums() {
    let mut types = TypeTable::new();
    let color = types.define_enum("Color", TYPE_INT32).unwrap();
    let nullable_color = types.nullable(color);
    let nullable_int = types.nullable(TYPE_INT32);
    let color_codec = Serializer::new(
        color,
        SerializerKind::Enum {
            representation: WireType::String,
        },
    );

    let as_int = coerce(
        &types,
        Serializer::nullable(nullable_color, color_codec.clone()),
        nullable_int,
    )
    .unwrap();
    assert_eq!(
        as_int.display(&types).to_string(),
        "NullableSerializer<EnumUnderlyingTypeSerializer<EnumSerializer<Color>(String)>>"
    );

    // and back again, reusing the original enum codec
    let back = coerce(&types, as_int, nullable_color).unwrap();
    assert_eq!(back, Serializer::nullable(nullable_color, color_codec));
}

#[test]
fn coerce_wraps_along_the_hierarchy() {
    let mut types = TypeTable::new();
    let person = types.define_class("Person", ClassSpec::new()).unwrap();
    let employee = types
        .define_class("Employee", ClassSpec::new().base(person))
        .unwrap();
    let employee_map = Serializer::new(employee, SerializerKind::ClassMap);
    let person_map = Serializer::new(person, SerializerKind::ClassMap);

    let down = coerce(&types, employee_map.clone(), person).unwrap();
    assert_eq!(down, Serializer::downcast(person, employee_map));

    let up = coerce(&types, person_map.clone(), employee).unwrap();
    assert_eq!(up, Serializer::upcast(employee, person_map));

    let err = coerce(&types, int32(), TYPE_STRING).unwrap_err();
    assert_eq!(
        err.to_string(),
        "serializer value type int does not match expected type string"
    );
}

#[test]
fn coerce_rehomes_sentinels() {
    let types = TypeTable::new();

    let moved = coerce(&types, Serializer::unknowable(TYPE_INT32), TYPE_STRING).unwrap();

    assert!(moved.is_unknowable());
    assert_eq!(moved.value_type(), TYPE_STRING);
}

#[test]
fn collection_serializer_requires_a_collection_type() {
    let mut types = TypeTable::new();
    let list = types.list(TYPE_INT32);

    let built = collection_serializer(&types, list, int32()).unwrap();
    assert_eq!(built.display(&types).to_string(), "ListSerializer<Int32Serializer>");

    let err = collection_serializer(&types, TYPE_STRING, int32()).unwrap_err();
    assert_eq!(err, SerializerError::NotACollection("string".to_owned()));

    let unknowable = collection_serializer(&types, list, Serializer::unknowable(TYPE_INT32)).unwrap();
    assert!(unknowable.is_unknowable());
}

#[test]
fn standard_serializers_cover_builtins() {
    let mut types = TypeTable::new();
    let nullable = types.nullable(TYPE_DECIMAL);
    let array = types.array(TYPE_DOUBLE);
    let person = types.define_class("Person", ClassSpec::new()).unwrap();

    let render = |ty| {
        standard_serializer(&types, ty).map(|s| s.display(&types).to_string())
    };
    assert_eq!(render(TYPE_BOOLEAN).as_deref(), Some("BooleanSerializer"));
    assert_eq!(
        render(nullable).as_deref(),
        Some("NullableSerializer<DecimalSerializer>")
    );
    assert_eq!(render(array).as_deref(), Some("ArraySerializer<DoubleSerializer>"));
    assert_eq!(
        render(TYPE_TIMESPAN).as_deref(),
        Some("TimeSpanSerializer(String, Ticks)")
    );
    assert_eq!(render(person), None);
}
