use async_graphql_parser::{
    types::{
        ConstDirective, DirectiveDefinition, FieldDefinition, InputValueDefinition, SchemaDefinition, TypeDefinition,
        TypeKind, TypeSystemDefinition,
    },
    Positioned,
};
use async_graphql_value::ConstValue;
use indexmap::{IndexMap, IndexSet};

use super::*;

#[derive(Debug, thiserror::Error)]
pub enum SdlError {
    #[error("could not parse the schema: {0}")]
    Parse(#[from] async_graphql_parser::Error),
    #[error("type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("cannot extend `{0}`, it is not defined or has a different kind")]
    InvalidExtension(String),
    #[error("type `{name}` referenced by `{referenced_by}` is not defined")]
    UnknownType { name: String, referenced_by: String },
    #[error("the schema has no query type `{0}`")]
    MissingQueryType(String),
}

impl Registry {
    /// Builds a registry from a schema document in the GraphQL SDL.
    ///
    /// Root operation types come from the `schema { ... }` definition when
    /// present, otherwise from the conventional `Query`, `Mutation` and
    /// `Subscription` names.
    pub fn from_sdl(sdl: &str) -> Result<Registry, SdlError> {
        let document = async_graphql_parser::parse_schema(sdl)?;
        let mut registry = Registry::default();
        let mut schema_definition: Option<SchemaDefinition> = None;
        let mut extensions = Vec::new();

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => schema_definition = Some(schema.node),
                TypeSystemDefinition::Type(ty) if ty.node.extend => extensions.push(ty.node),
                TypeSystemDefinition::Type(ty) => {
                    let ty = convert_type(ty.node);
                    let name = ty.name().to_string();
                    let is_builtin = BUILTIN_SCALARS.contains(&name.as_str());
                    if registry.types.insert(name.clone(), ty).is_some() && !is_builtin {
                        return Err(SdlError::DuplicateType(name));
                    }
                }
                TypeSystemDefinition::Directive(directive) => {
                    let directive = convert_directive(directive.node);
                    registry.directives.insert(directive.name.clone(), directive);
                }
            }
        }

        for extension in extensions {
            extend_type(&mut registry, extension)?;
        }

        match schema_definition {
            Some(schema) => {
                if let Some(query) = schema.query {
                    registry.query_type = query.node.to_string();
                }
                registry.mutation_type = schema.mutation.map(|name| name.node.to_string());
                registry.subscription_type = schema.subscription.map(|name| name.node.to_string());
            }
            None => {
                registry.mutation_type = registry.types.contains_key("Mutation").then(|| "Mutation".to_string());
                registry.subscription_type = registry
                    .types
                    .contains_key("Subscription")
                    .then(|| "Subscription".to_string());
            }
        }

        if !matches!(registry.types.get(&registry.query_type), Some(MetaType::Object(_))) {
            return Err(SdlError::MissingQueryType(registry.query_type.clone()));
        }

        link_implementations(&mut registry);
        check_references(&registry)?;

        tracing::debug!(types = registry.types.len(), "registry built from SDL");

        Ok(registry)
    }
}

fn convert_type(definition: TypeDefinition) -> MetaType {
    let name = definition.name.node.to_string();
    let description = definition.description.map(|description| description.node);

    match definition.kind {
        TypeKind::Scalar => MetaType::Scalar(ScalarType {
            name,
            description,
            specified_by_url: directive_argument(&definition.directives, "specifiedBy", "url"),
        }),
        TypeKind::Object(object) => MetaType::Object(ObjectType {
            name,
            description,
            fields: convert_fields(object.fields),
            implements: object.implements.into_iter().map(|name| name.node.to_string()).collect(),
        }),
        TypeKind::Interface(interface) => MetaType::Interface(InterfaceType {
            name,
            description,
            fields: convert_fields(interface.fields),
            possible_types: IndexSet::new(),
        }),
        TypeKind::Union(union) => MetaType::Union(UnionType {
            name,
            description,
            possible_types: union.members.into_iter().map(|name| name.node.to_string()).collect(),
        }),
        TypeKind::Enum(enum_type) => MetaType::Enum(EnumType {
            name,
            description,
            values: enum_type
                .values
                .into_iter()
                .map(|value| {
                    let value = value.node;
                    let name = value.value.node.to_string();
                    let enum_value = MetaEnumValue {
                        name: name.clone(),
                        description: value.description.map(|description| description.node),
                        deprecation: deprecation(&value.directives),
                    };
                    (name, enum_value)
                })
                .collect(),
        }),
        TypeKind::InputObject(input) => MetaType::InputObject(InputObjectType {
            name,
            description,
            input_fields: convert_input_values(input.fields),
        }),
    }
}

fn convert_fields(fields: Vec<Positioned<FieldDefinition>>) -> IndexMap<String, MetaField> {
    fields
        .into_iter()
        .map(|field| {
            let field = field.node;
            let meta = MetaField {
                name: field.name.node.to_string(),
                description: field.description.map(|description| description.node),
                args: convert_input_values(field.arguments),
                ty: (&field.ty.node).into(),
                deprecation: deprecation(&field.directives),
            };
            (meta.name.clone(), meta)
        })
        .collect()
}

fn convert_input_values(values: Vec<Positioned<InputValueDefinition>>) -> IndexMap<String, MetaInputValue> {
    values
        .into_iter()
        .map(|value| {
            let value = value.node;
            let meta = MetaInputValue {
                name: value.name.node.to_string(),
                description: value.description.map(|description| description.node),
                ty: (&value.ty.node).into(),
                default_value: value.default_value.map(|default| default.node),
            };
            (meta.name.clone(), meta)
        })
        .collect()
}

fn convert_directive(directive: DirectiveDefinition) -> MetaDirective {
    MetaDirective {
        name: directive.name.node.to_string(),
        description: directive.description.map(|description| description.node),
        locations: directive
            .locations
            .iter()
            .map(|location| screaming_snake_case(&format!("{:?}", location.node)))
            .collect(),
        args: convert_input_values(directive.arguments),
        is_repeatable: directive.is_repeatable,
    }
}

fn extend_type(registry: &mut Registry, extension: TypeDefinition) -> Result<(), SdlError> {
    let name = extension.name.node.to_string();
    let Some(existing) = registry.types.get_mut(&name) else {
        return Err(SdlError::InvalidExtension(name));
    };

    match (existing, extension.kind) {
        (MetaType::Object(object), TypeKind::Object(extension)) => {
            object.fields.extend(convert_fields(extension.fields));
            object
                .implements
                .extend(extension.implements.into_iter().map(|name| name.node.to_string()));
        }
        (MetaType::Interface(interface), TypeKind::Interface(extension)) => {
            interface.fields.extend(convert_fields(extension.fields));
        }
        (MetaType::Union(union), TypeKind::Union(extension)) => {
            union
                .possible_types
                .extend(extension.members.into_iter().map(|name| name.node.to_string()));
        }
        (MetaType::Enum(enum_type), TypeKind::Enum(extension)) => {
            for value in extension.values {
                let name = value.node.value.node.to_string();
                enum_type.values.insert(
                    name.clone(),
                    MetaEnumValue {
                        name,
                        description: value.node.description.map(|description| description.node),
                        deprecation: deprecation(&value.node.directives),
                    },
                );
            }
        }
        (MetaType::InputObject(input), TypeKind::InputObject(extension)) => {
            input.input_fields.extend(convert_input_values(extension.fields));
        }
        (MetaType::Scalar(_), TypeKind::Scalar) => {}
        _ => return Err(SdlError::InvalidExtension(name)),
    }

    Ok(())
}

fn link_implementations(registry: &mut Registry) {
    let implementations: Vec<(String, String)> = registry
        .types
        .values()
        .filter_map(|ty| match ty {
            MetaType::Object(object) => Some(
                object
                    .implements
                    .iter()
                    .map(|interface| (object.name.clone(), interface.clone())),
            ),
            _ => None,
        })
        .flatten()
        .collect();

    for (object, interface) in implementations {
        if let Some(MetaType::Interface(meta)) = registry.types.get_mut(&interface) {
            meta.possible_types.insert(object.clone());
        }
        registry.implements.entry(object).or_default().insert(interface);
    }
}

fn check_references(registry: &Registry) -> Result<(), SdlError> {
    let check = |name: &str, referenced_by: &str| {
        if registry.types.contains_key(name) {
            Ok(())
        } else {
            Err(SdlError::UnknownType {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
        }
    };

    for root in [registry.mutation_type.as_deref(), registry.subscription_type.as_deref()]
        .into_iter()
        .flatten()
    {
        check(root, "schema")?;
    }

    for ty in registry.types.values() {
        if let Some(fields) = ty.fields() {
            for field in fields.values() {
                let location = format!("{}.{}", ty.name(), field.name);
                check(field.ty.named_type(), &location)?;
                for argument in field.args.values() {
                    check(argument.ty.named_type(), &location)?;
                }
            }
        }
        match ty {
            MetaType::Union(union) => {
                for member in &union.possible_types {
                    check(member, &union.name)?;
                }
            }
            MetaType::Object(object) => {
                for interface in &object.implements {
                    check(interface, &object.name)?;
                }
            }
            MetaType::InputObject(input) => {
                for field in input.input_fields.values() {
                    check(field.ty.named_type(), &format!("{}.{}", input.name, field.name))?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn deprecation(directives: &[Positioned<ConstDirective>]) -> Option<String> {
    let directive = directives
        .iter()
        .find(|directive| directive.node.name.node.as_str() == "deprecated")?;

    match directive.node.get_argument("reason").map(|reason| &reason.node) {
        Some(ConstValue::String(reason)) => Some(reason.clone()),
        _ => Some("No longer supported".to_string()),
    }
}

fn directive_argument(directives: &[Positioned<ConstDirective>], directive: &str, argument: &str) -> Option<String> {
    directives
        .iter()
        .find(|candidate| candidate.node.name.node.as_str() == directive)
        .and_then(|directive| directive.node.get_argument(argument))
        .and_then(|value| match &value.node {
            ConstValue::String(value) => Some(value.clone()),
            _ => None,
        })
}

fn screaming_snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, c) in camel.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SDL: &str = r#"
        schema {
            query: Root
        }

        type Root {
            hero(episode: Episode = NEWHOPE): Character
            search(text: String!): [SearchResult!]!
        }

        interface Character {
            id: ID!
            name: String!
        }

        type Human implements Character {
            id: ID!
            name: String!
            height: Float @deprecated(reason: "use heightInMeters")
        }

        type Droid implements Character {
            id: ID!
            name: String!
        }

        union SearchResult = Human | Droid

        enum Episode {
            NEWHOPE
            EMPIRE
            JEDI
        }

        extend type Root {
            droid(id: ID!): Droid
        }
    "#;

    #[test]
    fn builds_registry_from_sdl() {
        let registry = Registry::from_sdl(SDL).unwrap();

        assert_eq!(registry.query_type, "Root");
        assert_eq!(registry.mutation_type, None);
        assert_eq!(
            registry.possible_types("Character"),
            vec!["Human", "Droid"],
            "interfaces collect their implementers"
        );
        assert!(registry.type_condition_applies("SearchResult", "Droid"));
        assert!(!registry.type_condition_applies("Human", "Droid"));

        let root = registry.lookup_type("Root").unwrap();
        let hero = root.field("hero").unwrap();
        assert_eq!(hero.ty.to_string(), "Character");
        assert_eq!(
            hero.args["episode"].default_value,
            Some(ConstValue::Enum(async_graphql_value::Name::new("NEWHOPE")))
        );
        assert!(root.field("droid").is_some(), "extensions are merged");

        let height = registry.lookup_type("Human").unwrap().field("height").unwrap();
        assert_eq!(height.deprecation.as_deref(), Some("use heightInMeters"));

        assert!(registry.directives.contains_key("skip"));
        assert!(registry.lookup_type("Boolean").is_some());
    }

    #[test]
    fn rejects_unknown_references() {
        let error = Registry::from_sdl("type Query { hero: Hero }").unwrap_err();
        assert_eq!(
            error.to_string(),
            "type `Hero` referenced by `Query.hero` is not defined"
        );
    }

    #[test]
    fn requires_a_query_type() {
        let error = Registry::from_sdl("type Mutation { a: Int }").unwrap_err();
        assert!(matches!(error, SdlError::MissingQueryType(name) if name == "Query"));
    }

    #[test]
    fn converts_directive_locations() {
        let registry = Registry::from_sdl(
            r#"
            directive @cached(ttl: Int = 60) on FIELD_DEFINITION | INLINE_FRAGMENT
            type Query { a: Int }
            "#,
        )
        .unwrap();

        assert_eq!(
            registry.directives["cached"].locations,
            vec!["FIELD_DEFINITION".to_string(), "INLINE_FRAGMENT".to_string()]
        );
    }
}
