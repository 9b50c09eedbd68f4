//! Integration tests for derived reflection
//!
//! Tests cover:
//! - Field access and the addressability rules for mutation
//! - Descriptor order and tag lookup
//! - Method resolution by receiver form
//! - Invocation checks and return values

use mirror_reflect::{
    classify, describe, fields, method_set, reflect_methods, resolve, Kind, Methods, Receiver,
    Reflect, ReflectError, Value,
};

#[derive(Reflect)]
#[reflect(methods)]
struct Person {
    #[reflect(name = "Name", tag = r#"json:"name""#)]
    name: String,
    #[reflect(name = "Age", tag = r#"json:"age""#)]
    age: i64,
    #[reflect(name = "IsMan")]
    is_man: bool,
    #[reflect(skip)]
    farewells: Vec<String>,
}

#[reflect_methods]
impl Person {
    #[reflect(name = "SayHi")]
    pub fn say_hi(&self, msg: String) -> String {
        format!("{} says hi: {}", self.name, msg)
    }

    #[reflect(name = "SayBye")]
    pub fn say_bye(&mut self, msg: String) {
        self.farewells.push(msg);
    }

    #[reflect(name = "Birthday")]
    pub fn birthday(&mut self, years: u8) -> i64 {
        self.age += i64::from(years);
        self.age
    }

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            age: 18,
            is_man: true,
            farewells: Vec::new(),
        }
    }

    #[allow(dead_code)]
    fn private_helper(&self) {}
}

#[derive(Reflect)]
struct Team {
    #[reflect(tag = r#"json:"lead""#)]
    lead: Person,
    #[reflect(tag = r#"json:"deputy""#)]
    deputy: Box<Person>,
    size: u32,
}

#[derive(Reflect)]
#[reflect(name = "Robot", methods)]
struct Droid {
    serial: u32,
}

#[reflect_methods]
impl Droid {
    #[reflect(name = "Serial")]
    pub fn serial(&self) -> u32 {
        self.serial
    }
}

#[test]
fn test_classify_derived_struct() {
    let person = Person::new("Mike");
    assert_eq!(classify(&person), Kind::Struct);
    assert_eq!(person.type_name(), "Person");
}

#[test]
fn test_mutation_round_trip() {
    let mut person = Person::new("Mike");

    let mut handle = Value::of_mut(&mut person).dereference().unwrap();
    let mut name = handle.field_by_name_mut("Name").unwrap();
    assert!(name.is_addressable());
    name.set_string("Amy").unwrap();
    assert_eq!(name.as_str().unwrap(), "Amy");
    drop(handle);
    assert_eq!(person.name, "Amy");
}

#[test]
fn test_copy_handle_cannot_mutate() {
    let mut person = Person::new("Mike");
    {
        let copy = Value::of(&person);
        let mut name = copy.field_by_name("Name").unwrap();
        assert_eq!(
            name.set_string("Amy").unwrap_err(),
            ReflectError::NotAddressable {
                operation: "set_string"
            }
        );

        let mut copy = Value::of(&person);
        assert!(matches!(
            copy.field_mut(0),
            Err(ReflectError::NotAddressable { .. })
        ));
    }
    assert_eq!(person.name, "Mike");

    // Addressability carries through into_field
    let mut age = Value::addressable(&mut person).into_field(1).unwrap();
    age.set_int(30).unwrap();
    drop(age);
    assert_eq!(person.age, 30);
}

#[test]
fn test_field_access_errors() {
    let person = Person::new("Mike");
    let handle = Value::of(&person);
    assert_eq!(handle.num_field().unwrap(), 3);
    assert_eq!(
        handle.field(3).unwrap_err(),
        ReflectError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert_eq!(
        handle.field_by_name("farewells").unwrap_err(),
        ReflectError::FieldNotFound {
            type_name: "Person".to_string(),
            field: "farewells".to_string(),
        }
    );
    assert!(handle.field_by_name("IsMan").unwrap().as_bool().unwrap());
}

#[test]
fn test_field_order_is_stable() {
    let person = Person::new("Mike");
    for _ in 0..4 {
        let descriptor = describe(&Value::of(&person)).unwrap();
        let names: Vec<_> = descriptor.field_names().collect();
        assert_eq!(names, vec!["Name", "Age", "IsMan"]);
        let kinds: Vec<_> = descriptor.fields.iter().map(|field| field.kind).collect();
        assert_eq!(kinds, vec![Kind::String, Kind::Int, Kind::Bool]);
    }
}

#[test]
fn test_tag_presence_and_absence() {
    let person = Person::new("Mike");
    let descriptor = describe(&Value::of(&person)).unwrap();
    assert_eq!(descriptor.fields[0].tag("json"), Some("name"));
    assert_eq!(descriptor.fields[1].tag("json"), Some("age"));
    assert_eq!(descriptor.fields[2].tag("json"), None);
    assert!(descriptor.fields[2].tags.is_empty());
    assert_eq!(descriptor.fields[0].raw_tag, r#"json:"name""#);
}

#[test]
fn test_lock_step_field_walk() {
    let person = Person::new("Mike");
    let handle = Value::of(&person);
    let walked = fields(&handle).unwrap();
    assert_eq!(walked.len(), 3);
    for (index, (field, value)) in walked.iter().enumerate() {
        assert_eq!(field.index, index);
        assert_eq!(field.kind, value.kind());
    }
    assert_eq!(walked[0].1.as_str().unwrap(), "Mike");
}

#[test]
fn test_by_value_method_resolves_on_copy_and_reference() {
    let mut person = Person::new("Mike");
    let msg = String::from("hello");

    let mut copy = Value::of(&person);
    let greeting = resolve(&mut copy, "SayHi")
        .unwrap()
        .invoke(&[&msg])
        .unwrap()
        .unwrap();
    assert_eq!(Value::of(&*greeting).as_str().unwrap(), "Mike says hi: hello");

    let mut reference = Value::of_mut(&mut person);
    let mut callable = resolve(&mut reference, "SayHi").unwrap();
    assert_eq!(callable.descriptor().receiver, Receiver::ByValue);
    assert!(callable.invoke(&[&msg]).unwrap().is_some());
}

#[test]
fn test_by_reference_method_requires_addressable() {
    let mut person = Person::new("Mike");
    let msg = String::from("bye");

    let mut copy = Value::of(&person);
    let err = resolve(&mut copy, "SayBye").unwrap_err();
    assert!(err.is_not_found());

    let mut reference = Value::of_mut(&mut person);
    let result = resolve(&mut reference, "SayBye")
        .unwrap()
        .invoke(&[&msg])
        .unwrap();
    assert!(result.is_none());

    let mut addressable = Value::addressable(&mut person);
    resolve(&mut addressable, "SayBye")
        .unwrap()
        .invoke(&[&msg])
        .unwrap();
    assert_eq!(person.farewells, vec!["bye", "bye"]);
}

#[test]
fn test_negative_lookup_has_no_side_effects() {
    let mut person = Person::new("Mike");
    for name in ["Fly", "say_hi", "new", "private_helper", ""] {
        let mut reference = Value::of_mut(&mut person);
        let err = resolve(&mut reference, name).unwrap_err();
        assert_eq!(
            err,
            ReflectError::NotFound {
                type_name: "Person".to_string(),
                method: name.to_string(),
            }
        );
    }
    assert_eq!(person.name, "Mike");
    assert_eq!(person.age, 18);
    assert!(person.farewells.is_empty());
}

#[test]
fn test_invoke_checks_arity_and_kinds() {
    let mut person = Person::new("Mike");
    let mut reference = Value::of_mut(&mut person);
    let mut callable = resolve(&mut reference, "SayHi").unwrap();

    assert_eq!(
        callable.invoke(&[]).unwrap_err(),
        ReflectError::ArityMismatch {
            method: "SayHi".to_string(),
            expected: 1,
            found: 0,
        }
    );
    assert_eq!(
        callable.invoke(&[&42i64]).unwrap_err(),
        ReflectError::ArgumentKindMismatch {
            method: "SayHi".to_string(),
            index: 0,
            expected: Kind::String,
            found: Kind::Int,
        }
    );
}

#[test]
fn test_invoke_returns_value_and_narrows_arguments() {
    let mut person = Person::new("Mike");
    let mut reference = Value::of_mut(&mut person);
    let mut birthday = resolve(&mut reference, "Birthday").unwrap();
    assert_eq!(birthday.descriptor().params, vec![Kind::Uint]);

    let age = birthday.invoke(&[&2u64]).unwrap().unwrap();
    assert_eq!(Value::of(&*age).as_int().unwrap(), 20);
    assert!(matches!(
        birthday.invoke(&[&300u64]),
        Err(ReflectError::Overflow { type_name: "u8", .. })
    ));
    drop(birthday);
    assert_eq!(person.age, 20);
}

#[test]
fn test_method_set_by_handle() {
    let mut person = Person::new("Mike");
    let copy_names: Vec<_> = method_set(&Value::of(&person))
        .into_iter()
        .map(|descriptor| descriptor.name)
        .collect();
    assert_eq!(copy_names, vec!["SayHi"]);

    let all_names: Vec<_> = method_set(&Value::of_mut(&mut person))
        .into_iter()
        .map(|descriptor| descriptor.name)
        .collect();
    assert_eq!(all_names, vec!["SayHi", "SayBye", "Birthday"]);
}

#[test]
fn test_nested_struct_and_pointer_fields() {
    let mut team = Team {
        lead: Person::new("Mike"),
        deputy: Box::new(Person::new("Amy")),
        size: 2,
    };

    let descriptor = describe(&Value::of(&team)).unwrap();
    let kinds: Vec<_> = descriptor.fields.iter().map(|field| field.kind).collect();
    assert_eq!(kinds, vec![Kind::Struct, Kind::Pointer, Kind::Uint]);
    assert_eq!(descriptor.fields[1].tag("json"), Some("deputy"));

    // Describe normalizes through the boxed field
    let handle = Value::of(&team);
    let deputy = handle.field(1).unwrap();
    assert_eq!(describe(&deputy).unwrap().name, "Person");

    // A boxed field reached through an addressable handle dispatches by reference
    let mut handle = Value::addressable(&mut team);
    let mut deputy = handle.field_mut(1).unwrap();
    resolve(&mut deputy, "SayBye")
        .unwrap()
        .invoke(&[&String::from("later")])
        .unwrap();

    let mut lead_name = handle
        .field_mut(0)
        .unwrap()
        .into_field(0)
        .unwrap();
    lead_name.set_string("Zoe").unwrap();
    drop(handle);

    assert_eq!(team.deputy.farewells, vec!["later"]);
    assert_eq!(team.lead.name, "Zoe");
}

#[test]
fn test_renamed_type_names_its_method_table() {
    let mut droid = Droid { serial: 7 };
    assert_eq!(droid.type_name(), "Robot");
    assert_eq!(<Droid as Reflect>::reflect_name(), "Robot");
    assert_eq!(<Droid as Methods>::methods().type_name(), "Robot");

    let mut handle = Value::of_mut(&mut droid);
    let err = resolve(&mut handle, "Fly").unwrap_err();
    assert_eq!(
        err,
        ReflectError::NotFound {
            type_name: "Robot".to_string(),
            method: "Fly".to_string(),
        }
    );
    let serial = resolve(&mut handle, "Serial")
        .unwrap()
        .invoke(&[])
        .unwrap()
        .unwrap();
    assert_eq!(Value::of(&*serial).as_uint().unwrap(), 7);
}
