use async_graphql_parser::types::{Field, SelectionSet as DocumentSelectionSet};
use async_graphql_value::ConstValue;
use serde_json::Value as Json;

use super::{PlanError, Planner};
use crate::registry::{MetaDirective, MetaEnumValue, MetaField, MetaInputValue, MetaType, TypeReference};

#[derive(Clone, Copy)]
enum Node<'r> {
    Schema,
    Type(TypeNode<'r>),
    Field(&'r MetaField),
    InputValue(&'r MetaInputValue),
    EnumValue(&'r MetaEnumValue),
    Directive(&'r MetaDirective),
}

#[derive(Clone, Copy)]
enum TypeNode<'r> {
    Named(&'r MetaType),
    Wrapped(&'r TypeReference),
}

impl Node<'_> {
    fn typename(&self) -> &'static str {
        match self {
            Node::Schema => "__Schema",
            Node::Type(_) => "__Type",
            Node::Field(_) => "__Field",
            Node::InputValue(_) => "__InputValue",
            Node::EnumValue(_) => "__EnumValue",
            Node::Directive(_) => "__Directive",
        }
    }
}

/// Introspection is answered from the registry while planning, the result is
/// written verbatim by the executor.
impl<'a> Planner<'a> {
    pub(super) fn introspect_schema(&self, sets: &[&'a DocumentSelectionSet]) -> Result<Json, PlanError> {
        self.project(Node::Schema, sets)
    }

    pub(super) fn introspect_type(&self, field: &Field, sets: &[&'a DocumentSelectionSet]) -> Result<Json, PlanError> {
        let name = match self.argument(field, "name") {
            Some(ConstValue::String(name)) => name,
            _ => return Ok(Json::Null),
        };
        match self.schema.registry.lookup_type(&name) {
            Some(ty) => self.project(Node::Type(TypeNode::Named(ty)), sets),
            None => Ok(Json::Null),
        }
    }

    fn project(&self, node: Node<'a>, sets: &[&'a DocumentSelectionSet]) -> Result<Json, PlanError> {
        let typename = node.typename();
        let grouped = self.collect_fields(typename, sets)?;

        let mut object = serde_json::Map::with_capacity(grouped.len());
        for (response_key, nodes) in grouped {
            let first = &nodes[0].node;
            let name = first.name.node.as_str();
            let sub_sets: Vec<_> = nodes.iter().map(|node| &node.node.selection_set.node).collect();
            let value = if name == "__typename" {
                Json::from(typename)
            } else {
                self.resolve(node, name, first, &sub_sets)?
            };
            object.insert(response_key.to_string(), value);
        }

        Ok(Json::Object(object))
    }

    fn resolve(
        &self,
        node: Node<'a>,
        name: &str,
        field: &Field,
        sets: &[&'a DocumentSelectionSet],
    ) -> Result<Json, PlanError> {
        let registry = &self.schema.registry;

        let value = match (node, name) {
            (Node::Schema, "types") => self.list(registry.types.values().map(|ty| Node::Type(TypeNode::Named(ty))), sets)?,
            (Node::Schema, "queryType") => self.named_type(Some(registry.query_type.as_str()), sets)?,
            (Node::Schema, "mutationType") => self.named_type(registry.mutation_type.as_deref(), sets)?,
            (Node::Schema, "subscriptionType") => self.named_type(registry.subscription_type.as_deref(), sets)?,
            (Node::Schema, "directives") => self.list(registry.directives.values().map(Node::Directive), sets)?,

            (Node::Type(TypeNode::Named(ty)), _) => self.resolve_named_type(ty, name, field, sets)?,
            (Node::Type(TypeNode::Wrapped(ty)), "kind") => match ty {
                TypeReference::NonNull(_) => Json::from("NON_NULL"),
                _ => Json::from("LIST"),
            },
            (Node::Type(TypeNode::Wrapped(ty)), "ofType") => match ty {
                TypeReference::NonNull(inner) | TypeReference::List(inner) => self.type_reference(inner, sets)?,
                TypeReference::Named(_) => Json::Null,
            },

            (Node::Field(meta), "name") => Json::from(meta.name.as_str()),
            (Node::Field(meta), "description") => Json::from(meta.description.as_deref()),
            (Node::Field(meta), "args") => self.list(meta.args.values().map(Node::InputValue), sets)?,
            (Node::Field(meta), "type") => self.type_reference(&meta.ty, sets)?,
            (Node::Field(meta), "isDeprecated") => Json::from(meta.deprecation.is_some()),
            (Node::Field(meta), "deprecationReason") => Json::from(meta.deprecation.as_deref()),

            (Node::InputValue(meta), "name") => Json::from(meta.name.as_str()),
            (Node::InputValue(meta), "description") => Json::from(meta.description.as_deref()),
            (Node::InputValue(meta), "type") => self.type_reference(&meta.ty, sets)?,
            (Node::InputValue(meta), "defaultValue") => {
                Json::from(meta.default_value.as_ref().map(|value| value.to_string()))
            }
            (Node::InputValue(_), "isDeprecated") => Json::from(false),

            (Node::EnumValue(meta), "name") => Json::from(meta.name.as_str()),
            (Node::EnumValue(meta), "description") => Json::from(meta.description.as_deref()),
            (Node::EnumValue(meta), "isDeprecated") => Json::from(meta.deprecation.is_some()),
            (Node::EnumValue(meta), "deprecationReason") => Json::from(meta.deprecation.as_deref()),

            (Node::Directive(meta), "name") => Json::from(meta.name.as_str()),
            (Node::Directive(meta), "description") => Json::from(meta.description.as_deref()),
            (Node::Directive(meta), "locations") => Json::from(meta.locations.clone()),
            (Node::Directive(meta), "args") => self.list(meta.args.values().map(Node::InputValue), sets)?,
            (Node::Directive(meta), "isRepeatable") => Json::from(meta.is_repeatable),

            _ => Json::Null,
        };

        Ok(value)
    }

    fn resolve_named_type(
        &self,
        ty: &'a MetaType,
        name: &str,
        field: &Field,
        sets: &[&'a DocumentSelectionSet],
    ) -> Result<Json, PlanError> {
        let registry = &self.schema.registry;
        let include_deprecated = matches!(self.argument(field, "includeDeprecated"), Some(ConstValue::Boolean(true)));

        let value = match name {
            "kind" => Json::from(ty.kind()),
            "name" => Json::from(ty.name()),
            "description" => Json::from(ty.description()),
            "specifiedByURL" => match ty {
                MetaType::Scalar(scalar) => Json::from(scalar.specified_by_url.as_deref()),
                _ => Json::Null,
            },
            "fields" => match ty.fields() {
                Some(fields) => self.list(
                    fields
                        .values()
                        .filter(|field| !field.name.starts_with("__"))
                        .filter(|field| include_deprecated || field.deprecation.is_none())
                        .map(Node::Field),
                    sets,
                )?,
                None => Json::Null,
            },
            "interfaces" => match ty {
                MetaType::Object(_) | MetaType::Interface(_) => {
                    let interfaces = registry.implements.get(ty.name());
                    let mut names: Vec<&str> = interfaces
                        .into_iter()
                        .flatten()
                        .map(String::as_str)
                        .collect();
                    names.sort_unstable();
                    self.list(
                        names
                            .into_iter()
                            .filter_map(|name| registry.lookup_type(name))
                            .map(|ty| Node::Type(TypeNode::Named(ty))),
                        sets,
                    )?
                }
                _ => Json::Null,
            },
            "possibleTypes" if ty.is_abstract() => self.list(
                registry
                    .possible_types(ty.name())
                    .into_iter()
                    .filter_map(|name| registry.lookup_type(name))
                    .map(|ty| Node::Type(TypeNode::Named(ty))),
                sets,
            )?,
            "enumValues" => match ty {
                MetaType::Enum(enum_type) => self.list(
                    enum_type
                        .values
                        .values()
                        .filter(|value| include_deprecated || value.deprecation.is_none())
                        .map(Node::EnumValue),
                    sets,
                )?,
                _ => Json::Null,
            },
            "inputFields" => match ty {
                MetaType::InputObject(input) => self.list(input.input_fields.values().map(Node::InputValue), sets)?,
                _ => Json::Null,
            },
            "isOneOf" => match ty {
                MetaType::InputObject(_) => Json::from(false),
                _ => Json::Null,
            },
            _ => Json::Null,
        };

        Ok(value)
    }

    fn list(
        &self,
        nodes: impl Iterator<Item = Node<'a>>,
        sets: &[&'a DocumentSelectionSet],
    ) -> Result<Json, PlanError> {
        nodes
            .map(|node| self.project(node, sets))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn named_type(&self, name: Option<&str>, sets: &[&'a DocumentSelectionSet]) -> Result<Json, PlanError> {
        match name.and_then(|name| self.schema.registry.lookup_type(name)) {
            Some(ty) => self.project(Node::Type(TypeNode::Named(ty)), sets),
            None => Ok(Json::Null),
        }
    }

    fn type_reference(&self, ty: &'a TypeReference, sets: &[&'a DocumentSelectionSet]) -> Result<Json, PlanError> {
        match ty {
            TypeReference::Named(name) => self.named_type(Some(name), sets),
            wrapped => self.project(Node::Type(TypeNode::Wrapped(wrapped)), sets),
        }
    }

    fn argument(&self, field: &Field, name: &str) -> Option<ConstValue> {
        field
            .arguments
            .iter()
            .find(|(argument, _)| argument.node.as_str() == name)
            .map(|(_, value)| self.evaluate(&value.node))
    }
}
