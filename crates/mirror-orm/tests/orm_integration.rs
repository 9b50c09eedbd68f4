//! Integration tests for query compilation over derived descriptors
//!
//! Tests cover:
//! - SELECT compilation from tagged fields
//! - Placeholder substitution and its failure modes
//! - INSERT rendering and row population
//! - Configuration loaded from TOML

use mirror_orm::{compile, compile_insert, populate, Compiler, OrmError, QueryConfig};
use mirror_reflect::{describe, Kind, Reflect, ReflectError, Value};

#[derive(Reflect)]
struct ClassModel {
    #[reflect(name = "Name", tag = r#"json:"name" orm:"name""#)]
    name: String,
    #[reflect(name = "Teacher", tag = r#"json:"teacher""#)]
    teacher: String,
    #[reflect(name = "Id", tag = r#"orm:"id""#)]
    id: i64,
}

#[derive(Reflect)]
struct Student {
    #[reflect(tag = r#"orm:"name""#)]
    name: String,
    #[reflect(tag = r#"orm:"age""#)]
    age: u8,
    #[reflect(tag = r#"orm:"score""#)]
    score: f32,
    #[reflect(tag = r#"orm:"active""#)]
    active: bool,
}

fn class_model() -> ClassModel {
    ClassModel {
        name: "三年一班".to_string(),
        teacher: "Ms. Li".to_string(),
        id: 3,
    }
}

#[test]
fn test_select_from_derived_descriptor() {
    let model = class_model();
    let descriptor = describe(&Value::of(&model)).unwrap();
    assert_eq!(
        compile(&descriptor, "orm", None, &[]).unwrap(),
        "SELECT name,id FROM classmodels;"
    );
    assert_eq!(
        compile(&descriptor, "json", None, &[]).unwrap(),
        "SELECT name,teacher FROM classmodels;"
    );
}

#[test]
fn test_select_with_condition() {
    let model = class_model();
    let descriptor = describe(&Value::of(&model)).unwrap();
    let class = String::from("三年一班");
    assert_eq!(
        compile(&descriptor, "orm", Some("name = ?"), &[&class]).unwrap(),
        "SELECT name,id FROM classmodels WHERE name = '三年一班';"
    );
}

#[test]
fn test_argument_count_mismatch_yields_no_output() {
    let model = class_model();
    let descriptor = describe(&Value::of(&model)).unwrap();
    let class = String::from("三年一班");
    let result = compile(&descriptor, "orm", Some("name = ? AND id = ?"), &[&class]);
    assert!(matches!(
        result,
        Err(OrmError::ArgumentCountMismatch {
            placeholders: 2,
            arguments: 1
        })
    ));
}

#[test]
fn test_insert_from_value() {
    let model = class_model();
    assert_eq!(
        compile_insert(&Value::of(&model), "orm").unwrap(),
        "INSERT INTO classmodels (name,id) VALUES ('三年一班',3);"
    );

    let student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 1.5,
        active: true,
    };
    // Booleans have no literal form
    assert!(matches!(
        compile_insert(&Value::of(&student), "orm"),
        Err(OrmError::UnsupportedArgumentKind {
            index: 3,
            kind: Kind::Bool
        })
    ));
}

#[test]
fn test_populate_from_row() {
    let mut student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 0.0,
        active: false,
    };
    let name = String::from("Amy");
    let age = 10u64;
    let score = 2.5f64;
    let active = true;

    let mut handle = Value::of_mut(&mut student);
    populate(
        &mut handle,
        "orm",
        &[
            ("name", &name),
            ("age", &age),
            ("score", &score),
            ("active", &active),
        ],
    )
    .unwrap();
    drop(handle);

    assert_eq!(student.name, "Amy");
    assert_eq!(student.age, 10);
    assert_eq!(student.score, 2.5);
    assert!(student.active);
}

#[test]
fn test_populate_checks_before_writing() {
    let mut student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 0.0,
        active: false,
    };
    let name = String::from("Amy");
    let wrong_age = String::from("ten");

    let mut handle = Value::of_mut(&mut student);
    let err = populate(&mut handle, "orm", &[("name", &name), ("grade", &name)]).unwrap_err();
    assert!(matches!(err, OrmError::UnknownColumn { ref column, .. } if column == "grade"));

    let err = populate(&mut handle, "orm", &[("name", &name), ("age", &wrong_age)]).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Reflect(ReflectError::KindMismatch {
            expected: Kind::Uint,
            found: Kind::String
        })
    ));
    drop(handle);
    assert_eq!(student.name, "Mike");
}

#[test]
fn test_populate_refuses_overflow_before_writing() {
    let mut student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 0.0,
        active: false,
    };
    let name = String::from("Amy");
    let too_old = 300u64;
    let too_precise = 1e300f64;

    let mut handle = Value::of_mut(&mut student);
    let err = populate(&mut handle, "orm", &[("name", &name), ("age", &too_old)]).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Reflect(ReflectError::Overflow { type_name: "u8", .. })
    ));

    let err = populate(&mut handle, "orm", &[("name", &name), ("score", &too_precise)]).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Reflect(ReflectError::Overflow { type_name: "f32", .. })
    ));
    drop(handle);

    assert_eq!(student.name, "Mike");
    assert_eq!(student.age, 9);
    assert_eq!(student.score, 0.0);
}

#[test]
fn test_insert_renders_floats_at_storage_width() {
    let student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 0.1,
        active: true,
    };
    // Booleans still have no literal, so render the leading columns only
    let handle = Value::of(&student);
    let rendered: Vec<String> = mirror_reflect::fields(&handle)
        .unwrap()
        .iter()
        .take(3)
        .map(|(field, value)| mirror_orm::literal(field.index, value).unwrap())
        .collect();
    assert_eq!(rendered, vec!["'Mike'", "9", "0.1"]);

    let weird = f32::INFINITY;
    assert!(matches!(
        mirror_orm::literal(2, &Value::of(&weird)),
        Err(OrmError::UnsupportedArgumentKind {
            index: 2,
            kind: Kind::Float
        })
    ));
}

#[test]
fn test_populate_requires_addressable_value() {
    let student = Student {
        name: "Mike".to_string(),
        age: 9,
        score: 0.0,
        active: false,
    };
    let name = String::from("Amy");
    let mut copy = Value::of(&student);
    let err = populate(&mut copy, "orm", &[("name", &name)]).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Reflect(ReflectError::NotAddressable { .. })
    ));
}

#[test]
fn test_compiler_from_toml_config() {
    let config = QueryConfig::from_toml_str(
        r#"
        placeholder = ":arg"
        table_suffix = ""
        column_separator = ", "
        "#,
    )
    .unwrap();
    let compiler = Compiler::new(config);

    let model = class_model();
    let descriptor = describe(&Value::of(&model)).unwrap();
    let id = 3i64;
    assert_eq!(
        compiler
            .select(&descriptor, "orm", Some("id = :arg"), &[&id])
            .unwrap(),
        "SELECT name, id FROM classmodel WHERE id = 3;"
    );
}
