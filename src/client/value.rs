// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::hash::{Hash, Hasher};

use super::proxy::ProxyList;
use crate::model::{EnumerationLiteral, Scalar};
use crate::protocol::ModelElement;

/// Handle on an element of one particular [`RemoteModel`](super::RemoteModel).
///
/// Two handles are equal when they name the same element id *and* come from the same model
/// instance; ids from two connections to different hosts may collide.
#[derive(Debug, Clone)]
pub struct RemoteElement {
    element: ModelElement,
    owner: u64,
}

impl RemoteElement {
    pub(super) fn new(element: ModelElement, owner: u64) -> Self {
        Self { element, owner }
    }

    pub fn id(&self) -> &str {
        &self.element.element_id
    }

    pub fn type_name(&self) -> &str {
        &self.element.type_name
    }

    pub fn metamodel_uri(&self) -> &str {
        &self.element.metamodel_uri
    }

    /// Instance token of the owning model.
    pub fn owner(&self) -> u64 {
        self.owner
    }

    pub fn as_model_element(&self) -> &ModelElement {
        &self.element
    }
}

impl PartialEq for RemoteElement {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.element.element_id == other.element.element_id
    }
}

impl Eq for RemoteElement {}

impl Hash for RemoteElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.element.element_id.hash(state);
    }
}

/// A feature value as the client driver hands it out.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientValue {
    Null,
    Scalar(Scalar),
    Element(RemoteElement),
    List(Vec<ClientValue>),
    /// Live view of a many-valued feature.
    Proxy(ProxyList),
}

impl ClientValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&RemoteElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyList> {
        match self {
            Self::Proxy(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ClientValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Scalar> for ClientValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<RemoteElement> for ClientValue {
    fn from(value: RemoteElement) -> Self {
        Self::Element(value)
    }
}

impl From<&RemoteElement> for ClientValue {
    fn from(value: &RemoteElement) -> Self {
        Self::Element(value.clone())
    }
}

impl From<ProxyList> for ClientValue {
    fn from(value: ProxyList) -> Self {
        Self::Proxy(value)
    }
}

impl From<EnumerationLiteral> for ClientValue {
    fn from(value: EnumerationLiteral) -> Self {
        Self::Scalar(Scalar::Enum(value))
    }
}

impl From<&str> for ClientValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_owned()))
    }
}

impl From<String> for ClientValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<bool> for ClientValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Boolean(value))
    }
}

impl From<i32> for ClientValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<i64> for ClientValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Long(value))
    }
}

impl From<f64> for ClientValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Double(value))
    }
}

impl<T: Into<ClientValue>> From<Vec<T>> for ClientValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
