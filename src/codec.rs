// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The value codec: native slot values to wire [`Value`]s and back.
//!
//! Encoding is driven by the feature being read: many-valued features become proxy-list
//! handles, everything else is transferred eagerly. Decoding is driven by the feature being
//! written: scalars are checked against the declared attribute type, references are resolved
//! to live elements of the current project and enumeration literals are matched by literal
//! text against the feature's enumeration.

use crate::catalog::TypeCatalog;
use crate::error::ModelError;
use crate::model::{ElementId, Feature, FeatureType, Project, RawValue, Scalar};
use crate::protocol::{ModelElement, ProxyListHandle, Value};

/// Wire case for a single scalar.
pub fn encode_scalar(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Boolean(v) => Value::BooleanValue(*v),
        Scalar::Byte(v) => Value::ByteValue(*v),
        Scalar::Short(v) => Value::ShortValue(*v),
        Scalar::Int(v) => Value::IntegerValue(*v),
        Scalar::Long(v) => Value::LongValue(*v),
        Scalar::Float(v) => Value::FloatValue(*v),
        Scalar::Double(v) => Value::DoubleValue(*v),
        Scalar::String(v) => Value::StringValue(v.clone()),
        Scalar::Enum(v) => Value::EnumerationValue(v.clone()),
    }
}

/// The scalar carried by a single-scalar wire case, `None` for every other case.
pub fn decode_scalar(value: &Value) -> Option<Scalar> {
    Some(match value {
        Value::BooleanValue(v) => Scalar::Boolean(*v),
        Value::ByteValue(v) => Scalar::Byte(*v),
        Value::ShortValue(v) => Scalar::Short(*v),
        Value::IntegerValue(v) => Scalar::Int(*v),
        Value::LongValue(v) => Scalar::Long(*v),
        Value::FloatValue(v) => Scalar::Float(*v),
        Value::DoubleValue(v) => Scalar::Double(*v),
        Value::StringValue(v) => Scalar::String(v.clone()),
        Value::EnumerationValue(v) => Scalar::Enum(v.clone()),
        _ => return None,
    })
}

/// Scalars of a homogeneous scalar collection, `None` when `value` is not one.
pub fn decode_scalar_collection(value: &Value) -> Option<Vec<Scalar>> {
    Some(match value {
        Value::BooleanValues(items) => items.iter().copied().map(Scalar::Boolean).collect(),
        Value::ByteValues(items) => items.iter().copied().map(Scalar::Byte).collect(),
        Value::ShortValues(items) => items.iter().copied().map(Scalar::Short).collect(),
        Value::IntegerValues(items) => items.iter().copied().map(Scalar::Int).collect(),
        Value::LongValues(items) => items.iter().copied().map(Scalar::Long).collect(),
        Value::FloatValues(items) => items.iter().copied().map(Scalar::Float).collect(),
        Value::DoubleValues(items) => items.iter().copied().map(Scalar::Double).collect(),
        Value::StringValues(items) => items.iter().cloned().map(Scalar::String).collect(),
        Value::EnumerationValues(items) => items.iter().cloned().map(Scalar::Enum).collect(),
        _ => return None,
    })
}

fn mixed(first: &Scalar, other: &Scalar) -> ModelError {
    ModelError::invalid(format!(
        "collection mixes {} and {} elements",
        first.label(),
        other.label()
    ))
}

/// Homogeneous collection case chosen from the first element; an empty slice uses the
/// designated default case.
pub fn encode_scalar_collection(items: &[Scalar]) -> Result<Value, ModelError> {
    let Some(first) = items.first() else {
        return Ok(Value::empty_collection());
    };

    macro_rules! homogeneous {
        ($variant:ident => $case:ident) => {
            items
                .iter()
                .map(|item| match item {
                    Scalar::$variant(v) => Ok(v.clone()),
                    other => Err(mixed(first, other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::$case)
        };
    }

    match first {
        Scalar::Boolean(_) => homogeneous!(Boolean => BooleanValues),
        Scalar::Byte(_) => homogeneous!(Byte => ByteValues),
        Scalar::Short(_) => homogeneous!(Short => ShortValues),
        Scalar::Int(_) => homogeneous!(Int => IntegerValues),
        Scalar::Long(_) => homogeneous!(Long => LongValues),
        Scalar::Float(_) => homogeneous!(Float => FloatValues),
        Scalar::Double(_) => homogeneous!(Double => DoubleValues),
        Scalar::String(_) => homogeneous!(String => StringValues),
        Scalar::Enum(_) => homogeneous!(Enum => EnumerationValues),
    }
}

/// A decoded write payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Unset,
    Single(RawValue),
    Many(Vec<RawValue>),
}

/// Encodes and decodes values in the context of one project.
pub struct Codec<'a> {
    project: &'a Project,
}

impl<'a> Codec<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn element(&self, id: &ElementId) -> Result<ModelElement, ModelError> {
        let object = self.project.object(id).ok_or_else(|| ModelError::element_not_found(id.as_str()))?;
        let metamodel = self.project.metamodel();
        Ok(ModelElement {
            element_id: id.as_str().to_owned(),
            metamodel_uri: metamodel.namespace_uri(object.class()).to_owned(),
            type_name: metamodel.qualified_name(object.class()),
        })
    }

    pub fn elements<'i>(&self, ids: impl IntoIterator<Item = &'i ElementId>) -> Result<Vec<ModelElement>, ModelError> {
        ids.into_iter().map(|id| self.element(id)).collect()
    }

    /// Encodes the value of `feature` read from `owner`. Many-valued features are never
    /// materialised; they become a handle for subsequent list operations.
    pub fn encode_feature(
        &self,
        owner: &ElementId,
        feature: &Feature,
        value: Option<&RawValue>,
    ) -> Result<Value, ModelError> {
        if feature.is_many() {
            return Ok(Value::ProxyList(ProxyListHandle {
                element_id: owner.as_str().to_owned(),
                feature_name: feature.name().to_owned(),
            }));
        }
        match value {
            None => Ok(Value::NotSet),
            Some(value) => self.encode(value),
        }
    }

    /// Eager encoding: scalars, references and whole collections.
    pub fn encode(&self, value: &RawValue) -> Result<Value, ModelError> {
        match value {
            RawValue::Scalar(scalar) => Ok(encode_scalar(scalar)),
            RawValue::Object(id) => self.element(id).map(Value::ReferenceValue),
            RawValue::List(items) => self.encode_collection(items),
        }
    }

    pub fn encode_collection(&self, items: &[RawValue]) -> Result<Value, ModelError> {
        match items.first() {
            None => Ok(Value::empty_collection()),
            Some(RawValue::Object(_)) => items
                .iter()
                .map(|item| match item {
                    RawValue::Object(id) => self.element(id),
                    _ => Err(ModelError::invalid("collection mixes references and scalars")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::ReferenceValues),
            Some(RawValue::Scalar(_)) => {
                let scalars = items
                    .iter()
                    .map(|item| match item {
                        RawValue::Scalar(scalar) => Ok(scalar.clone()),
                        _ => Err(ModelError::invalid("collection mixes scalars and references")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                encode_scalar_collection(&scalars)
            }
            Some(RawValue::List(_)) => Err(ModelError::invalid("nested collections cannot be encoded")),
        }
    }

    /// Decodes a write of `value` into `feature`.
    pub fn decode_for_feature(&self, feature: &Feature, value: Value) -> Result<Decoded, ModelError> {
        match value {
            Value::NotSet | Value::NotDefined => Ok(Decoded::Unset),
            Value::ProxyList(handle) => self.materialize(&handle).map(Decoded::Many),
            Value::ReferenceValues(elements) => elements
                .into_iter()
                .map(|element| self.decode_item(feature, Value::ReferenceValue(element)))
                .collect::<Result<Vec<_>, _>>()
                .map(Decoded::Many),
            other => match decode_scalar_collection(&other) {
                Some(scalars) => scalars
                    .into_iter()
                    .map(|scalar| self.decode_scalar_for(feature, scalar))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Decoded::Many),
                None => self.decode_item(feature, other).map(Decoded::Single),
            },
        }
    }

    /// Decodes one element of a feature's value: a scalar or a reference, never a collection.
    pub fn decode_item(&self, feature: &Feature, value: Value) -> Result<RawValue, ModelError> {
        match value {
            Value::ReferenceValue(element) => {
                if !feature.is_reference() {
                    return Err(ModelError::invalid(format!(
                        "feature `{}` does not hold references",
                        feature.name()
                    )));
                }
                let id = ElementId::new(element.element_id.clone())
                    .map_err(|err| ModelError::invalid(format!("invalid element id: {err}")))?;
                if self.project.object(&id).is_none() {
                    return Err(ModelError::element_not_found(element.element_id));
                }
                Ok(RawValue::Object(id))
            }
            other => match decode_scalar(&other) {
                Some(scalar) => self.decode_scalar_for(feature, scalar),
                None => Err(ModelError::UnknownValueKind(format!(
                    "{:?} cannot be used as a single value of `{}`",
                    other.kind(),
                    feature.name()
                ))),
            },
        }
    }

    fn decode_scalar_for(&self, feature: &Feature, scalar: Scalar) -> Result<RawValue, ModelError> {
        match feature.ty() {
            FeatureType::Scalar(kind) => {
                let label = scalar.label();
                scalar.coerce_to(kind).map(RawValue::Scalar).ok_or_else(|| {
                    ModelError::invalid(format!(
                        "feature `{}` expects {}, got {label}",
                        feature.name(),
                        kind.label()
                    ))
                })
            }
            FeatureType::Enumeration(enumeration) => {
                let literal_text = match &scalar {
                    Scalar::Enum(literal) => literal.literal.clone(),
                    Scalar::String(text) => text.clone(),
                    other => {
                        return Err(ModelError::invalid(format!(
                            "feature `{}` expects an enumeration literal, got {}",
                            feature.name(),
                            other.label()
                        )))
                    }
                };
                let metamodel = self.project.metamodel();
                let def = metamodel
                    .classifier(enumeration)
                    .and_then(|c| c.as_enumeration())
                    .ok_or_else(|| ModelError::Internal(format!("`{}` is not an enumeration", feature.name())))?;
                def.by_literal(&literal_text)
                    .cloned()
                    .map(|literal| RawValue::Scalar(Scalar::Enum(literal)))
                    .ok_or_else(|| {
                        ModelError::invalid(format!(
                            "`{literal_text}` is not a literal of `{}`",
                            metamodel.qualified_name(enumeration)
                        ))
                    })
            }
            FeatureType::Reference { .. } => Err(ModelError::invalid(format!(
                "feature `{}` expects a reference, got {}",
                feature.name(),
                scalar.label()
            ))),
        }
    }

    /// Current contents of the list a handle points at.
    pub fn materialize(&self, handle: &ProxyListHandle) -> Result<Vec<RawValue>, ModelError> {
        let id = ElementId::new(handle.element_id.clone())
            .map_err(|_| ModelError::element_not_found(handle.element_id.clone()))?;
        let feature = self.project.feature_of(&id, &handle.feature_name)?;
        Ok(self.project.list_items(&id, feature)?)
    }
}

/// Rejects wire payloads whose tag this build does not know.
pub fn parse_value(json: serde_json::Value) -> Result<Value, ModelError> {
    serde_json::from_value(json).map_err(|err| ModelError::UnknownValueKind(err.to_string()))
}
