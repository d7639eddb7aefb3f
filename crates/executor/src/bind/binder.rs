use std::{any::TypeId, collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use super::*;
use crate::{
    host::{Capability, CapabilityKind, ObjectShape, ShapeKey, ShapeRef},
    registry::{MetaField, MetaType, ObjectType, Registry},
};

pub(crate) fn bind(registry: &Registry, root: RootValue) -> Result<BoundSchema, BindError> {
    let mut binder = Binder {
        registry,
        objects: Vec::new(),
        memo: HashMap::new(),
        shapes: HashMap::new(),
    };

    let RootValue {
        query,
        mutation,
        subscription,
    } = root;

    let query = binder
        .bind_root("query", Some(registry.query_type.as_str()), Some(query), false)?
        .ok_or_else(|| BindError::UnknownType(registry.query_type.clone()))?;
    let mutation = binder.bind_root("mutation", registry.mutation_type.as_deref(), mutation, false)?;
    let subscription = binder.bind_root("subscription", registry.subscription_type.as_deref(), subscription, true)?;

    let objects = binder
        .objects
        .into_iter()
        .map(|object| object.ok_or_else(|| BindError::UnknownType("<unfinished binding>".to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(bound_objects = objects.len(), "schema bound");

    Ok(BoundSchema {
        objects,
        query,
        mutation,
        subscription,
    })
}

struct Binder<'a> {
    registry: &'a Registry,
    objects: Vec<Option<BoundObject>>,
    memo: HashMap<(String, ShapeKey, bool), BoundObjectId>,
    shapes: HashMap<TypeId, Arc<ObjectShape>>,
}

impl<'a> Binder<'a> {
    fn bind_root(
        &mut self,
        operation: &'static str,
        type_name: Option<&str>,
        root: Option<(HostValue, Shape)>,
        streaming: bool,
    ) -> Result<Option<BoundRoot>, BindError> {
        match (type_name, root) {
            (Some(type_name), Some((value, shape))) => {
                let object = self.bind_object(type_name, &shape, streaming)?;
                Ok(Some(BoundRoot { object, value }))
            }
            (None, None) => Ok(None),
            (Some(type_name), None) => Err(BindError::MissingRootValue {
                operation,
                type_name: type_name.to_string(),
            }),
            (None, Some(_)) => Err(BindError::UnexpectedRootValue { operation }),
        }
    }

    fn bind_object(&mut self, type_name: &str, shape: &Shape, streaming: bool) -> Result<BoundObjectId, BindError> {
        let key = (type_name.to_string(), shape.key(), streaming);
        if let Some(id) = self.memo.get(&key) {
            return Ok(*id);
        }

        let registry = self.registry;
        let object = match registry.lookup_type(type_name) {
            Some(MetaType::Object(object)) => object,
            Some(_) => {
                return Err(BindError::NotAnObject {
                    type_name: type_name.to_string(),
                    host: shape.describe(),
                })
            }
            None => return Err(BindError::UnknownType(type_name.to_string())),
        };

        // Registered before the fields are bound so recursive types terminate.
        let id = BoundObjectId(self.objects.len());
        self.objects.push(None);
        self.memo.insert(key, id);

        let mut fields = IndexMap::with_capacity(object.fields.len());
        for meta in object.fields.values() {
            let field = self.bind_field(object, meta, shape, streaming)?;
            fields.insert(meta.name.clone(), Arc::new(field));
        }

        tracing::trace!(type_name, host = %shape.describe(), "bound object");

        self.objects[id.0] = Some(BoundObject {
            type_name: type_name.to_string(),
            host: shape.describe(),
            fields,
        });

        Ok(id)
    }

    fn bind_field(
        &mut self,
        object: &ObjectType,
        meta: &MetaField,
        shape: &Shape,
        streaming: bool,
    ) -> Result<BoundField, BindError> {
        let location = format!("{}.{}", object.name, meta.name);

        let (resolver, value_shape, is_async) = match shape {
            Shape::Object(shape_ref) => {
                let object_shape = self.object_shape(shape_ref);
                let Some(capability) = find_capability(&object_shape, &meta.name) else {
                    return Err(BindError::MissingCapability {
                        location,
                        host: format!("`{}`", shape_ref.type_name()),
                    });
                };
                if !meta.args.is_empty() && !capability.signature.arguments {
                    return Err(BindError::TooFewParameters { location });
                }
                if meta.args.is_empty() && capability.signature.arguments {
                    return Err(BindError::TooManyParameters { location });
                }

                let host = shape_ref.type_id();
                let resolver = match capability.kind {
                    CapabilityKind::Method => FieldResolver::Method {
                        capability: capability.clone(),
                        host,
                    },
                    CapabilityKind::Field => FieldResolver::Field {
                        capability: capability.clone(),
                        host,
                    },
                };
                (resolver, capability.shape.clone(), capability.signature.is_async())
            }
            Shape::Map(inner) => (
                FieldResolver::Map {
                    key: meta.name.clone(),
                },
                inner.as_ref().clone(),
                false,
            ),
            Shape::Json => (
                FieldResolver::Map {
                    key: meta.name.clone(),
                },
                Shape::Json,
                false,
            ),
            other => {
                return Err(BindError::WrongShape {
                    location: object.name.clone(),
                    expected: "an object".to_string(),
                    found: other.describe(),
                })
            }
        };

        let item_shape = if streaming {
            match value_shape {
                Shape::Stream(item) => *item,
                _ => return Err(BindError::NotAStream { location }),
            }
        } else {
            value_shape
        };

        let bound_type = self.bind_type(&meta.ty, &item_shape, &location)?;

        Ok(BoundField {
            name: meta.name.clone(),
            parent_type: object.name.clone(),
            ty: meta.ty.clone(),
            args: meta.args.clone(),
            resolver,
            bound_type,
            trace_label: location,
            is_async,
        })
    }

    fn bind_type(&mut self, ty: &TypeReference, shape: &Shape, location: &str) -> Result<BoundType, BindError> {
        match ty {
            TypeReference::NonNull(inner) => {
                if shape.is_optional() {
                    return Err(BindError::NullableBinding {
                        location: location.to_string(),
                        found: shape.describe(),
                    });
                }
                Ok(BoundType::NonNull(Arc::new(self.bind_type(inner, shape, location)?)))
            }
            TypeReference::List(item) => match shape.required() {
                Shape::List(item_shape) => Ok(BoundType::List(Arc::new(self.bind_type(item, item_shape, location)?))),
                Shape::Json => Ok(BoundType::List(Arc::new(self.bind_type(item, &Shape::Json, location)?))),
                Shape::Stream(_) => Err(BindError::UnexpectedStream {
                    location: location.to_string(),
                }),
                other => Err(BindError::WrongShape {
                    location: location.to_string(),
                    expected: format!("a list for `{ty}`"),
                    found: other.describe(),
                }),
            },
            TypeReference::Named(name) => self.bind_named(name, shape.required(), location),
        }
    }

    fn bind_named(&mut self, name: &str, shape: &Shape, location: &str) -> Result<BoundType, BindError> {
        if let Shape::Stream(_) = shape {
            return Err(BindError::UnexpectedStream {
                location: location.to_string(),
            });
        }

        let registry = self.registry;
        let Some(meta) = registry.lookup_type(name) else {
            return Err(BindError::UnknownType(name.to_string()));
        };
        let mismatch = || BindError::WrongShape {
            location: location.to_string(),
            expected: format!("`{name}`"),
            found: shape.describe(),
        };

        match meta {
            MetaType::Scalar(_) => {
                let kind = ScalarKind::from_name(name);
                if kind.accepts(shape) {
                    Ok(BoundType::Scalar(kind))
                } else {
                    Err(mismatch())
                }
            }
            MetaType::Enum(enum_type) => match shape {
                Shape::String | Shape::Json => Ok(BoundType::Enum(Arc::new(EnumBinding {
                    name: enum_type.name.clone(),
                    values: enum_type.values.keys().cloned().collect(),
                }))),
                _ => Err(mismatch()),
            },
            MetaType::Object(_) => match shape {
                Shape::Object(_) | Shape::Map(_) | Shape::Json => Ok(BoundType::Object(self.bind_object(name, shape, false)?)),
                _ => Err(mismatch()),
            },
            MetaType::Interface(_) | MetaType::Union(_) => self.bind_abstract(name, shape).and_then(|binding| {
                binding.map(|binding| BoundType::Abstract(Arc::new(binding))).ok_or_else(mismatch)
            }),
            MetaType::InputObject(_) => Err(mismatch()),
        }
    }

    /// `None` when the shape can't back an abstract type at all.
    fn bind_abstract(&mut self, name: &str, shape: &Shape) -> Result<Option<AbstractBinding>, BindError> {
        let registry = self.registry;
        let possible_types = registry.possible_types(name);

        let variants: &[ShapeRef] = match shape {
            Shape::OneOf(variants) => variants,
            Shape::Object(variant) => std::slice::from_ref(variant),
            Shape::Json | Shape::Map(_) => {
                let options = possible_types
                    .iter()
                    .map(|type_name| {
                        Ok(AbstractOption {
                            type_name: type_name.to_string(),
                            object: self.bind_object(type_name, shape, false)?,
                            host: None,
                        })
                    })
                    .collect::<Result<Vec<_>, BindError>>()?;
                return Ok(Some(AbstractBinding {
                    name: name.to_string(),
                    options,
                }));
            }
            _ => return Ok(None),
        };

        let mut options = Vec::with_capacity(variants.len());
        for variant in variants {
            let type_name = self.object_shape(variant).graphql_name();
            if !possible_types.contains(&type_name) {
                return Err(BindError::UnknownPossibleType {
                    abstract_type: name.to_string(),
                    type_name: type_name.to_string(),
                });
            }
            options.push(AbstractOption {
                type_name: type_name.to_string(),
                object: self.bind_object(type_name, &Shape::Object(*variant), false)?,
                host: Some(variant.type_id()),
            });
        }

        Ok(Some(AbstractBinding {
            name: name.to_string(),
            options,
        }))
    }

    fn object_shape(&mut self, shape: &ShapeRef) -> Arc<ObjectShape> {
        self.shapes
            .entry(shape.type_id())
            .or_insert_with(|| Arc::new(shape.describe()))
            .clone()
    }
}

/// Methods win over plain fields. Names are compared ignoring case and
/// underscores, so `the_number` backs `theNumber`.
fn find_capability<'s>(shape: &'s ObjectShape, field_name: &str) -> Option<&'s Arc<Capability>> {
    let wanted = fold(field_name);
    let matching = |kind: CapabilityKind| {
        shape
            .capabilities
            .iter()
            .find(|capability| capability.kind == kind && fold(capability.name) == wanted)
    };
    matching(CapabilityKind::Method).or_else(|| matching(CapabilityKind::Field))
}

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_names() {
        assert_eq!(fold("the_number"), fold("theNumber"));
        assert_eq!(fold("appearsIn"), "appearsin");
        assert_ne!(fold("name"), fold("names"));
    }
}
