#![allow(unused_crate_dependencies, clippy::panic)]

mod fixtures;

use std::sync::Arc;

use graph_executor::{BindError, Object, ObjectShapeBuilder, Registry, RootValue, Schema};
use rstest::rstest;

struct Empty;

impl Object for Empty {
    fn describe(_: &mut ObjectShapeBuilder<Self>) {}
}

struct Host;

impl Object for Host {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .field("name", |_| Option::<String>::None)
            .field("count", |_| "three")
            .method("greet", |_| "hello")
            .method_with_args("echo", |_, arguments| arguments.get_as::<String>("text"))
            .field("pet", |_| Option::<Arc<Dog>>::None);
    }
}

struct Dog;

impl Object for Dog {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape.field("name", |_| "Rex");
    }
}

fn bind(sdl: &str, root: RootValue) -> Result<Schema, BindError> {
    Schema::build(Registry::from_sdl(sdl).unwrap(), root).finish()
}

#[rstest]
#[case::nullable_value_for_non_null_field(
    "type Query { name: String! }",
    RootValue::new(Host),
    BindError::NullableBinding { location: "Query.name".into(), found: "Option<string>".into() }
)]
#[case::missing_parameters(
    "type Query { greet(name: String): String }",
    RootValue::new(Host),
    BindError::TooFewParameters { location: "Query.greet".into() }
)]
#[case::unexpected_parameters(
    "type Query { echo: String }",
    RootValue::new(Host),
    BindError::TooManyParameters { location: "Query.echo".into() }
)]
#[case::wrong_scalar(
    "type Query { count: Int }",
    RootValue::new(Host),
    BindError::WrongShape { location: "Query.count".into(), expected: "`Int`".into(), found: "string".into() }
)]
#[case::missing_mutation_root(
    "type Query { name: String } type Mutation { name: String }",
    RootValue::new(Host),
    BindError::MissingRootValue { operation: "mutation", type_name: "Mutation".into() }
)]
#[case::unexpected_mutation_root(
    "type Query { name: String }",
    RootValue::new(Host).mutation(Host),
    BindError::UnexpectedRootValue { operation: "mutation" }
)]
#[case::subscription_without_stream(
    "type Query { name: String } type Subscription { greet: String }",
    RootValue::new(Host).subscription(Host),
    BindError::NotAStream { location: "Subscription.greet".into() }
)]
#[case::foreign_union_member(
    "type Query { pet: Pet } union Pet = Cat type Cat { name: String }",
    RootValue::new(Host),
    BindError::UnknownPossibleType { abstract_type: "Pet".into(), type_name: "Dog".into() }
)]
fn binding_errors(#[case] sdl: &str, #[case] root: RootValue, #[case] expected: BindError) {
    let error = bind(sdl, root).err().unwrap();
    assert_eq!(error, expected);
}

#[test]
fn missing_capability_names_the_field() {
    let error = bind("type Query { missing: String }", RootValue::new(Empty)).err().unwrap();

    assert!(matches!(&error, BindError::MissingCapability { location, .. } if location == "Query.missing"));
    assert!(error.to_string().ends_with("has no method or field matching `Query.missing`"));
}

#[test]
fn names_match_ignoring_case_and_underscores() {
    // `home_planet` backs `homePlanet`, `the_number` backs `theNumber`.
    fixtures::schema();
}

#[test]
fn json_roots_bind_any_object_type() {
    let schema = bind(
        "type Query { hero: Hero } type Hero { name: String friends: [Hero] }",
        RootValue::json(serde_json::json!({ "hero": { "name": "R2-D2", "friends": [] } })),
    );

    assert!(schema.is_ok());
}
