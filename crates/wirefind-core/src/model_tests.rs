use indoc::indoc;

use crate::types::*;

const MODEL: &str = indoc! {r#"
    {
      "enums": [{ "name": "Color" }, { "name": "Size", "underlying": "byte" }],
      "interfaces": [
        { "name": "IShape", "bases": ["INamed"] },
        { "name": "INamed" }
      ],
      "classes": [
        {
          "name": "Circle",
          "base": "Figure",
          "interfaces": ["IShape"],
          "members": [{ "name": "Radius", "type": "double" }]
        },
        {
          "name": "Figure",
          "members": [
            { "name": "Color", "type": "Color" },
            { "name": "Children", "type": "List<Figure>" }
          ]
        }
      ]
    }
"#};

#[test]
fn loads_declarations_in_any_order() {
    let types = TypeTable::from_json(MODEL).unwrap();

    let circle = types.lookup_name("Circle").unwrap();
    let figure = types.lookup_name("Figure").unwrap();
    let named = types.lookup_name("INamed").unwrap();
    let size = types.lookup_name("Size").unwrap();

    assert!(types.is_assignable_from(figure, circle));
    assert!(types.is_assignable_from(named, circle));
    assert_eq!(types.enum_underlying(size), Some(TYPE_BYTE));
    assert_eq!(
        types.display(types.member_type(circle, "Children").unwrap()).to_string(),
        "List<Figure>"
    );
}

#[test]
fn default_enum_underlying_type_is_int() {
    let types = TypeTable::from_json(MODEL).unwrap();
    let color = types.lookup_name("Color").unwrap();

    assert_eq!(types.enum_underlying(color), Some(TYPE_INT32));
}

#[test]
fn unknown_member_types_are_reported() {
    let json = indoc! {r#"
        { "classes": [{ "name": "A", "members": [{ "name": "B", "type": "Missing" }] }] }
    "#};

    let err = TypeTable::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "unknown type name `Missing`");
}

#[test]
fn malformed_json_is_reported() {
    let err = TypeTable::from_json("{ \"classes\": 1 }").unwrap_err();

    assert!(matches!(err, TypeError::Json(_)));
}

#[test]
fn duplicate_class_names_are_reported() {
    let json = indoc! {r#"
        { "classes": [{ "name": "A" }, { "name": "A" }] }
    "#};

    let err = TypeTable::from_json(json).unwrap_err();
    assert!(matches!(err, TypeError::Duplicate(name) if name == "A"));
}
