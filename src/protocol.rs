// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire types of the remote model access protocol.
//!
//! These structs are the request and response payloads of every RPC operation. They are
//! transport-neutral; the MCP binding uses them directly as tool parameters and results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use crate::model::EnumerationLiteral;
use crate::model::float::{self, FloatRepr};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ModelElement {
    pub element_id: String,
    pub metamodel_uri: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ProxyListHandle {
    pub element_id: String,
    pub feature_name: String,
}

/// The tagged value envelope.
///
/// Collections are homogeneous; an empty collection is sent as `integer_values`. Non-finite
/// floats travel as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    BooleanValue(bool),
    ByteValue(i8),
    ShortValue(i16),
    IntegerValue(i32),
    LongValue(i64),
    FloatValue(
        #[serde(serialize_with = "float::serialize", deserialize_with = "float::deserialize")]
        #[schemars(with = "FloatRepr")]
        f32,
    ),
    DoubleValue(
        #[serde(serialize_with = "float::serialize", deserialize_with = "float::deserialize")]
        #[schemars(with = "FloatRepr")]
        f64,
    ),
    StringValue(String),
    EnumerationValue(EnumerationLiteral),
    ReferenceValue(ModelElement),
    BooleanValues(Vec<bool>),
    ByteValues(Vec<i8>),
    ShortValues(Vec<i16>),
    IntegerValues(Vec<i32>),
    LongValues(Vec<i64>),
    FloatValues(
        #[serde(serialize_with = "float::vec::serialize", deserialize_with = "float::vec::deserialize")]
        #[schemars(with = "Vec<FloatRepr>")]
        Vec<f32>,
    ),
    DoubleValues(
        #[serde(serialize_with = "float::vec::serialize", deserialize_with = "float::vec::deserialize")]
        #[schemars(with = "Vec<FloatRepr>")]
        Vec<f64>,
    ),
    StringValues(Vec<String>),
    EnumerationValues(Vec<EnumerationLiteral>),
    ReferenceValues(Vec<ModelElement>),
    ProxyList(ProxyListHandle),
    /// The feature does not exist on the element's type.
    NotDefined,
    /// The feature exists but holds no value.
    NotSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Enumeration,
    Reference,
    Booleans,
    Bytes,
    Shorts,
    Integers,
    Longs,
    Floats,
    Doubles,
    Strings,
    Enumerations,
    References,
    ProxyList,
    NotDefined,
    NotSet,
}

impl ValueKind {
    pub const ALL: [ValueKind; 23] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Enumeration,
        Self::Reference,
        Self::Booleans,
        Self::Bytes,
        Self::Shorts,
        Self::Integers,
        Self::Longs,
        Self::Floats,
        Self::Doubles,
        Self::Strings,
        Self::Enumerations,
        Self::References,
        Self::ProxyList,
        Self::NotDefined,
        Self::NotSet,
    ];
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::BooleanValue(_) => ValueKind::Boolean,
            Self::ByteValue(_) => ValueKind::Byte,
            Self::ShortValue(_) => ValueKind::Short,
            Self::IntegerValue(_) => ValueKind::Integer,
            Self::LongValue(_) => ValueKind::Long,
            Self::FloatValue(_) => ValueKind::Float,
            Self::DoubleValue(_) => ValueKind::Double,
            Self::StringValue(_) => ValueKind::String,
            Self::EnumerationValue(_) => ValueKind::Enumeration,
            Self::ReferenceValue(_) => ValueKind::Reference,
            Self::BooleanValues(_) => ValueKind::Booleans,
            Self::ByteValues(_) => ValueKind::Bytes,
            Self::ShortValues(_) => ValueKind::Shorts,
            Self::IntegerValues(_) => ValueKind::Integers,
            Self::LongValues(_) => ValueKind::Longs,
            Self::FloatValues(_) => ValueKind::Floats,
            Self::DoubleValues(_) => ValueKind::Doubles,
            Self::StringValues(_) => ValueKind::Strings,
            Self::EnumerationValues(_) => ValueKind::Enumerations,
            Self::ReferenceValues(_) => ValueKind::References,
            Self::ProxyList(_) => ValueKind::ProxyList,
            Self::NotDefined => ValueKind::NotDefined,
            Self::NotSet => ValueKind::NotSet,
        }
    }

    pub fn empty_collection() -> Self {
        Self::IntegerValues(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Enumeration,
    DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeReference {
    pub metamodel_uri: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDescriptor {
    pub metamodel_uri: String,
    pub type_name: String,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub all_supertypes: Vec<TypeReference>,
}

impl TypeDescriptor {
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Class && !self.is_abstract
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Empty {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AllOfParams {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub root_element_hyperlink: Option<String>,
    #[serde(default)]
    pub only_exact_type: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementsResponse {
    pub elements: Vec<ModelElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetFeatureValueParams {
    pub element_id: String,
    pub feature_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetFeatureValueParams {
    pub element_id: String,
    pub feature_name: String,
    pub new_value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValueResponse {
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetTypeParams {
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TypeResponse {
    pub descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetEnumerationValueParams {
    pub enumeration: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnumerationValueResponse {
    pub literal: EnumerationLiteral,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementIdParams {
    pub element_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementResponse {
    pub element: ModelElement,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateInstanceParams {
    pub type_name: String,
    #[serde(default)]
    pub root_element_hyperlink: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OpenSessionParams {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListParams {
    pub list: ProxyListHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListPositionParams {
    pub list: ProxyListHandle,
    pub position: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListValueParams {
    pub list: ProxyListHandle,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListPositionValueParams {
    pub list: ProxyListHandle,
    pub position: u32,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListSizeResponse {
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectLocationParams {
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectResponse {
    pub name: String,
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_use_snake_case_tags() {
        let json = serde_json::to_value(Value::ByteValue(3)).expect("serialize");
        assert_eq!(json, serde_json::json!({ "byte_value": 3 }));
        let json = serde_json::to_value(Value::NotDefined).expect("serialize");
        assert_eq!(json, serde_json::json!("not_defined"));
    }

    #[test]
    fn integral_widths_stay_distinct_on_the_wire() {
        let byte: Value = serde_json::from_value(serde_json::json!({ "byte_value": 1 })).expect("byte");
        let long: Value = serde_json::from_value(serde_json::json!({ "long_value": 1 })).expect("long");
        assert_ne!(byte, long);
        assert_eq!(byte.kind(), ValueKind::Byte);
        assert_eq!(long.kind(), ValueKind::Long);
    }

    #[test]
    fn all_of_params_default_optional_fields() {
        let params: AllOfParams = serde_json::from_value(serde_json::json!({})).expect("params");
        assert!(params.type_name.is_none());
        assert!(!params.only_exact_type);
    }

    #[test]
    fn only_concrete_classes_are_instantiable() {
        let descriptor = TypeDescriptor {
            metamodel_uri: "urn:x".into(),
            type_name: "x::Kind".into(),
            kind: TypeKind::Enumeration,
            is_abstract: false,
            all_supertypes: Vec::new(),
        };
        assert!(!descriptor.is_instantiable());
        assert!(TypeDescriptor { kind: TypeKind::Class, ..descriptor.clone() }.is_instantiable());
        assert!(!TypeDescriptor { kind: TypeKind::Class, is_abstract: true, ..descriptor }.is_instantiable());
    }
}
