//! Turns a parsed operation into an execution plan.
//!
//! For every object position the planner collects the selected fields,
//! honoring `@skip`/`@include` and fragment type conditions, and merges
//! fields sharing a response key. Abstract positions get one selection set
//! per possible type, so the executor only has to pick one at runtime.
//! Nothing here invokes a resolver.

mod error;
mod introspection;

use std::{collections::HashSet, convert::Infallible, sync::Arc};

use ::error::Location;
use async_graphql_parser::{
    types::{
        Directive, DocumentOperations, ExecutableDocument, Field, OperationDefinition, OperationType, Selection,
        SelectionSet as DocumentSelectionSet,
    },
    Pos, Positioned,
};
use async_graphql_value::{ConstValue, Name, Value, Variables};
use indexmap::IndexMap;

pub use self::error::PlanError;

use crate::{
    bind::{BoundField, BoundObjectId, BoundType, ScalarKind},
    registry::TypeReference,
    schema::SchemaInner,
    Arguments, HostValue,
};

pub(crate) struct Plan {
    pub operation_type: OperationType,
    pub operation_name: Option<String>,
    pub root_value: HostValue,
    pub selection_set: Arc<SelectionSet>,
}

pub(crate) struct SelectionSet {
    pub fields: Vec<SelectionField>,
    /// Whether any field below may suspend, in which case siblings are
    /// resolved concurrently.
    pub is_async: bool,
}

pub(crate) struct SelectionField {
    pub response_key: Arc<str>,
    pub field: Arc<BoundField>,
    pub arguments: Arguments,
    pub selection: SubSelection,
    pub is_async: bool,
    pub location: Location,
}

#[derive(Clone)]
pub(crate) enum SubSelection {
    Leaf,
    Object(Arc<SelectionSet>),
    /// One selection set per option of the abstract binding, in the same order.
    Abstract(Arc<[Arc<SelectionSet>]>),
}

impl SubSelection {
    pub fn is_async(&self) -> bool {
        match self {
            SubSelection::Leaf => false,
            SubSelection::Object(set) => set.is_async,
            SubSelection::Abstract(sets) => sets.iter().any(|set| set.is_async),
        }
    }
}

pub(crate) fn plan(
    schema: &SchemaInner,
    document: &ExecutableDocument,
    operation_name: Option<&str>,
    variables: &Variables,
) -> Result<Plan, PlanError> {
    let (name, operation) = select_operation(document, operation_name)?;
    let operation = &operation.node;

    let root = match operation.ty {
        OperationType::Query => Some(&schema.bound.query),
        OperationType::Mutation => schema.bound.mutation.as_ref(),
        OperationType::Subscription => schema.bound.subscription.as_ref(),
    }
    .ok_or(PlanError::UnsupportedOperation(operation_type_name(operation.ty)))?;

    let planner = Planner {
        schema,
        document,
        variables: coerce_variables(operation, variables)?,
    };

    let selection_set = planner.plan_selection_set(root.object, &[&operation.selection_set.node])?;

    if operation.ty == OperationType::Subscription && selection_set.fields.len() != 1 {
        return Err(PlanError::SubscriptionFieldCount {
            count: selection_set.fields.len(),
            location: location(operation.selection_set.pos),
        });
    }

    Ok(Plan {
        operation_type: operation.ty,
        operation_name: name.map(|name| name.to_string()),
        root_value: root.value.clone(),
        selection_set,
    })
}

pub(crate) fn operation_type_name(ty: OperationType) -> &'static str {
    match ty {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

fn select_operation<'d>(
    document: &'d ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<(Option<&'d Name>, &'d Positioned<OperationDefinition>), PlanError> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Ok((None, operation)),
        (DocumentOperations::Single(_), Some(name)) => Err(PlanError::UnknownOperation(name.to_string())),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .get_key_value(name)
            .map(|(name, operation)| (Some(name), operation))
            .ok_or_else(|| PlanError::UnknownOperation(name.to_string())),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations
            .iter()
            .next()
            .map(|(name, operation)| (Some(name), operation))
            .ok_or(PlanError::OperationNameRequired),
        (DocumentOperations::Multiple(_), None) => Err(PlanError::OperationNameRequired),
    }
}

/// Provided values win over defaults. Missing nullable variables without a
/// default stay undefined.
fn coerce_variables(
    operation: &OperationDefinition,
    provided: &Variables,
) -> Result<IndexMap<Name, ConstValue>, PlanError> {
    let mut variables = IndexMap::with_capacity(operation.variable_definitions.len());

    for definition in &operation.variable_definitions {
        let definition = &definition.node;
        let name = &definition.name.node;
        let value = match (provided.get(name), &definition.default_value) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => default.node.clone(),
            (None, None) if !definition.var_type.node.nullable => {
                return Err(PlanError::MissingVariable {
                    name: name.to_string(),
                    ty: definition.var_type.node.to_string(),
                    location: location(definition.name.pos),
                })
            }
            (None, None) => continue,
        };
        variables.insert(name.clone(), value);
    }

    Ok(variables)
}

fn location(pos: Pos) -> Location {
    Location::new(pos.line, pos.column)
}

type GroupedFields<'a> = IndexMap<&'a str, Vec<&'a Positioned<Field>>>;

struct Planner<'a> {
    schema: &'a SchemaInner,
    document: &'a ExecutableDocument,
    variables: IndexMap<Name, ConstValue>,
}

impl<'a> Planner<'a> {
    fn plan_selection_set(
        &self,
        object_id: BoundObjectId,
        sets: &[&'a DocumentSelectionSet],
    ) -> Result<Arc<SelectionSet>, PlanError> {
        let object = &self.schema.bound[object_id];
        let grouped = self.collect_fields(&object.type_name, sets)?;

        let mut fields = Vec::with_capacity(grouped.len());
        for (response_key, nodes) in grouped {
            let first = nodes[0];
            let location = location(first.pos);
            let name = first.node.name.node.as_str();

            let field = match name {
                "__typename" => Arc::new(BoundField::fixed(
                    &object.type_name,
                    name,
                    TypeReference::named("String").non_null(),
                    BoundType::NonNull(Arc::new(BoundType::Scalar(ScalarKind::String))),
                    Ok(HostValue::String(object.type_name.clone())),
                )),
                "__schema" | "__type" if object_id == self.schema.bound.query.object => {
                    if !self.schema.config.introspection {
                        return Err(PlanError::IntrospectionDisabled { location });
                    }
                    let sub_sets: Vec<_> = nodes.iter().map(|node| &node.node.selection_set.node).collect();
                    let (value, ty) = if name == "__schema" {
                        (self.introspect_schema(&sub_sets)?, "__Schema!")
                    } else {
                        (self.introspect_type(&first.node, &sub_sets)?, "__Type")
                    };
                    Arc::new(BoundField::fixed(
                        &object.type_name,
                        name,
                        TypeReference::from(ty),
                        BoundType::Verbatim,
                        Ok(HostValue::Json(Arc::new(value))),
                    ))
                }
                _ => {
                    let Some(bound) = object.fields.get(name) else {
                        return Err(PlanError::UnknownField {
                            field: name.to_string(),
                            type_name: object.type_name.clone(),
                            location,
                        });
                    };

                    let sub_sets: Vec<_> = nodes.iter().map(|node| &node.node.selection_set.node).collect();
                    let selection = self.plan_sub_selection(&bound.bound_type, &sub_sets)?;
                    let is_async = bound.is_async || self.schema.chain.forces_async(bound) || selection.is_async();

                    fields.push(SelectionField {
                        response_key: response_key.into(),
                        field: bound.clone(),
                        arguments: self.coerce_arguments(bound, &first.node),
                        selection,
                        is_async,
                        location,
                    });
                    continue;
                }
            };

            fields.push(SelectionField {
                response_key: response_key.into(),
                field,
                arguments: Arguments::default(),
                selection: SubSelection::Leaf,
                is_async: false,
                location,
            });
        }

        let is_async = fields.iter().any(|field| field.is_async);
        Ok(Arc::new(SelectionSet {
            fields,
            is_async,
        }))
    }

    fn plan_sub_selection(
        &self,
        bound_type: &BoundType,
        sets: &[&'a DocumentSelectionSet],
    ) -> Result<SubSelection, PlanError> {
        match bound_type {
            BoundType::NonNull(inner) | BoundType::List(inner) => self.plan_sub_selection(inner, sets),
            BoundType::Object(id) => Ok(SubSelection::Object(self.plan_selection_set(*id, sets)?)),
            BoundType::Abstract(binding) => {
                let sets = binding
                    .options
                    .iter()
                    .map(|option| self.plan_selection_set(option.object, sets))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SubSelection::Abstract(sets.into()))
            }
            BoundType::Scalar(_) | BoundType::Enum(_) | BoundType::Verbatim => Ok(SubSelection::Leaf),
        }
    }

    /// Groups the fields of `sets` applying to objects of type `type_name` by
    /// response key, in document order.
    fn collect_fields(&self, type_name: &str, sets: &[&'a DocumentSelectionSet]) -> Result<GroupedFields<'a>, PlanError> {
        let mut grouped = IndexMap::new();
        let mut visited_fragments = HashSet::new();
        for set in sets {
            self.collect_fields_into(type_name, set, &mut grouped, &mut visited_fragments)?;
        }
        Ok(grouped)
    }

    fn collect_fields_into(
        &self,
        type_name: &str,
        set: &'a DocumentSelectionSet,
        grouped: &mut GroupedFields<'a>,
        visited_fragments: &mut HashSet<&'a str>,
    ) -> Result<(), PlanError> {
        for selection in &set.items {
            match &selection.node {
                Selection::Field(field) => {
                    if !self.should_include(&field.node.directives)? {
                        continue;
                    }
                    grouped
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.node.directives)? {
                        continue;
                    }
                    let name = spread.node.fragment_name.node.as_str();
                    let Some(fragment) = self.document.fragments.get(name) else {
                        return Err(PlanError::UnknownFragment {
                            name: name.to_string(),
                            location: location(spread.pos),
                        });
                    };
                    if !visited_fragments.insert(name) {
                        continue;
                    }
                    let condition = fragment.node.type_condition.node.on.node.as_str();
                    if self.schema.registry.type_condition_applies(condition, type_name) {
                        self.collect_fields_into(type_name, &fragment.node.selection_set.node, grouped, visited_fragments)?;
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.node.directives)? {
                        continue;
                    }
                    let applies = match &inline.node.type_condition {
                        Some(condition) => self
                            .schema
                            .registry
                            .type_condition_applies(condition.node.on.node.as_str(), type_name),
                        None => true,
                    };
                    if applies {
                        self.collect_fields_into(type_name, &inline.node.selection_set.node, grouped, visited_fragments)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn should_include(&self, directives: &[Positioned<Directive>]) -> Result<bool, PlanError> {
        for directive in directives {
            let name = directive.node.name.node.as_str();
            if name != "skip" && name != "include" {
                continue;
            }

            let condition = match directive.node.get_argument("if").map(|value| &value.node) {
                Some(Value::Boolean(condition)) => Some(*condition),
                Some(Value::Variable(variable)) => match self.variables.get(variable) {
                    Some(ConstValue::Boolean(condition)) => Some(*condition),
                    _ => None,
                },
                _ => None,
            };
            let Some(condition) = condition else {
                return Err(PlanError::InvalidDirectiveArgument {
                    directive: name.to_string(),
                    location: location(directive.pos),
                });
            };

            if (name == "skip" && condition) || (name == "include" && !condition) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Arguments in schema order, provided values first, then defaults.
    /// Arguments bound to undefined variables count as not provided.
    fn coerce_arguments(&self, bound: &BoundField, field: &Field) -> Arguments {
        let mut arguments = IndexMap::with_capacity(bound.args.len());

        for (name, definition) in &bound.args {
            let provided = field
                .arguments
                .iter()
                .find(|(argument, _)| argument.node.as_str() == name)
                .map(|(_, value)| &value.node)
                .filter(|value| match value {
                    Value::Variable(variable) => self.variables.contains_key(variable),
                    _ => true,
                });

            match provided {
                Some(value) => {
                    arguments.insert(name.clone(), self.evaluate(value));
                }
                None => {
                    if let Some(default) = &definition.default_value {
                        arguments.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        Arguments::new(arguments)
    }

    fn evaluate(&self, value: &Value) -> ConstValue {
        value
            .clone()
            .into_const_with(|variable| Ok::<_, Infallible>(self.variables.get(&variable).cloned().unwrap_or(ConstValue::Null)))
            .unwrap_or_else(|never| match never {})
    }
}
