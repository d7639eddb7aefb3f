//! The type schema an operation is executed against.
//!
//! A [`Registry`] is a read-only description of the GraphQL types: objects with
//! their fields, interfaces and unions with their possible types, scalars, enums
//! and input objects. It is usually built from SDL with [`Registry::from_sdl`]
//! and never mutated once bound to resolvers.

mod sdl;
mod type_reference;

use std::collections::{HashMap, HashSet};

use async_graphql_parser::types::OperationType;
use async_graphql_value::ConstValue;
use indexmap::{IndexMap, IndexSet};

pub use sdl::SdlError;
pub use type_reference::TypeReference;

pub(crate) const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

#[derive(Clone, Debug)]
pub struct Registry {
    pub types: IndexMap<String, MetaType>,
    pub directives: IndexMap<String, MetaDirective>,
    /// Object or interface name to the interfaces it implements.
    pub implements: HashMap<String, HashSet<String>>,
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry {
            types: IndexMap::new(),
            directives: IndexMap::new(),
            implements: HashMap::new(),
            query_type: "Query".to_string(),
            mutation_type: None,
            subscription_type: None,
        };
        registry.add_builtins();
        registry
    }
}

impl Registry {
    pub fn lookup_type(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    pub fn root_type(&self, operation_type: OperationType) -> Option<&str> {
        match operation_type {
            OperationType::Query => Some(self.query_type.as_str()),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// Concrete object types a value of `name` may have at runtime. For an
    /// object type that's the type itself.
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        match self.types.get(name) {
            Some(MetaType::Object(object)) => vec![object.name.as_str()],
            Some(MetaType::Interface(interface)) => interface.possible_types.iter().map(String::as_str).collect(),
            Some(MetaType::Union(union)) => union.possible_types.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a fragment with type condition `condition` applies to objects
    /// of type `concrete`.
    pub fn type_condition_applies(&self, condition: &str, concrete: &str) -> bool {
        if condition == concrete {
            return true;
        }
        match self.types.get(condition) {
            Some(MetaType::Interface(interface)) => interface.possible_types.contains(concrete),
            Some(MetaType::Union(union)) => union.possible_types.contains(concrete),
            _ => false,
        }
    }

    pub(crate) fn add_builtins(&mut self) {
        for name in BUILTIN_SCALARS {
            self.types.entry(name.to_string()).or_insert_with(|| {
                MetaType::Scalar(ScalarType {
                    name: name.to_string(),
                    description: None,
                    specified_by_url: None,
                })
            });
        }

        for name in ["skip", "include"] {
            let description = if name == "skip" {
                "Directs the executor to skip this field or fragment when the `if` argument is true."
            } else {
                "Directs the executor to include this field or fragment only when the `if` argument is true."
            };
            self.directives.entry(name.to_string()).or_insert_with(|| MetaDirective {
                name: name.to_string(),
                description: Some(description.to_string()),
                locations: vec![
                    "FIELD".to_string(),
                    "FRAGMENT_SPREAD".to_string(),
                    "INLINE_FRAGMENT".to_string(),
                ],
                args: IndexMap::from([(
                    "if".to_string(),
                    MetaInputValue::new("if", TypeReference::named("Boolean").non_null())
                        .with_description(if name == "skip" { "Skipped when true." } else { "Included when true." }),
                )]),
                is_repeatable: false,
            });
        }
    }
}

#[derive(Clone, Debug)]
pub enum MetaType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(ty) => &ty.name,
            MetaType::Object(ty) => &ty.name,
            MetaType::Interface(ty) => &ty.name,
            MetaType::Union(ty) => &ty.name,
            MetaType::Enum(ty) => &ty.name,
            MetaType::InputObject(ty) => &ty.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MetaType::Scalar(ty) => ty.description.as_deref(),
            MetaType::Object(ty) => ty.description.as_deref(),
            MetaType::Interface(ty) => ty.description.as_deref(),
            MetaType::Union(ty) => ty.description.as_deref(),
            MetaType::Enum(ty) => ty.description.as_deref(),
            MetaType::InputObject(ty) => ty.description.as_deref(),
        }
    }

    /// The introspection `__TypeKind` of this type.
    pub fn kind(&self) -> &'static str {
        match self {
            MetaType::Scalar(_) => "SCALAR",
            MetaType::Object(_) => "OBJECT",
            MetaType::Interface(_) => "INTERFACE",
            MetaType::Union(_) => "UNION",
            MetaType::Enum(_) => "ENUM",
            MetaType::InputObject(_) => "INPUT_OBJECT",
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, MetaField>> {
        match self {
            MetaType::Object(ty) => Some(&ty.fields),
            MetaType::Interface(ty) => Some(&ty.fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&MetaField> {
        self.fields().and_then(|fields| fields.get(name))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }
}

#[derive(Clone, Debug)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub implements: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub possible_types: IndexSet<String>,
}

#[derive(Clone, Debug)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub possible_types: IndexSet<String>,
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: IndexMap<String, MetaEnumValue>,
}

#[derive(Clone, Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub input_fields: IndexMap<String, MetaInputValue>,
}

#[derive(Clone, Debug)]
pub struct MetaField {
    pub name: String,
    pub description: Option<String>,
    pub args: IndexMap<String, MetaInputValue>,
    pub ty: TypeReference,
    pub deprecation: Option<String>,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeReference>) -> MetaField {
        MetaField {
            name: name.into(),
            description: None,
            args: IndexMap::new(),
            ty: ty.into(),
            deprecation: None,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: MetaInputValue) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }
}

#[derive(Clone, Debug)]
pub struct MetaInputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeReference,
    pub default_value: Option<ConstValue>,
}

impl MetaInputValue {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeReference>) -> MetaInputValue {
        MetaInputValue {
            name: name.into(),
            description: None,
            ty: ty.into(),
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: ConstValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Clone, Debug)]
pub struct MetaEnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MetaDirective {
    pub name: String,
    pub description: Option<String>,
    pub locations: Vec<String>,
    pub args: IndexMap<String, MetaInputValue>,
    pub is_repeatable: bool,
}
