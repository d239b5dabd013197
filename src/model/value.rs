// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Native values stored in project slots.
//!
//! These are the host-side counterparts of the wire [`crate::protocol::Value`]: scalars keep
//! their exact width, enumeration slots hold a full [`EnumerationLiteral`], and references are
//! plain [`ElementId`]s resolved against the owning project.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::float;
use super::ElementId;

/// An enumeration literal as seen by clients: ordinal value, literal text and display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EnumerationLiteral {
    pub value: i32,
    pub literal: String,
    pub name: String,
}

impl EnumerationLiteral {
    pub fn new(value: i32, literal: impl Into<String>, name: impl Into<String>) -> Self {
        Self { value, literal: literal.into(), name: name.into() }
    }
}

impl fmt::Display for EnumerationLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Primitive attribute types understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ScalarKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(#[serde(serialize_with = "float::serialize", deserialize_with = "float::deserialize")] f32),
    Double(#[serde(serialize_with = "float::serialize", deserialize_with = "float::deserialize")] f64),
    String(String),
    Enum(EnumerationLiteral),
}

impl Scalar {
    /// The primitive kind, or `None` for enumeration literals.
    pub fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Byte(_) => ScalarKind::Byte,
            Self::Short(_) => ScalarKind::Short,
            Self::Int(_) => ScalarKind::Int,
            Self::Long(_) => ScalarKind::Long,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
            Self::String(_) => ScalarKind::String,
            Self::Enum(_) => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.label(),
            None => "enumeration literal",
        }
    }

    /// Converts this scalar into `target` without losing information.
    ///
    /// Integers may change width when the value fits, integers convert to floating point when
    /// exactly representable, and `float` widens to `double`. Everything else must already match.
    pub fn coerce_to(self, target: ScalarKind) -> Option<Scalar> {
        if self.kind() == Some(target) {
            return Some(self);
        }

        let integral = match &self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::Short(v) => Some(i64::from(*v)),
            Self::Int(v) => Some(i64::from(*v)),
            Self::Long(v) => Some(*v),
            _ => None,
        };

        match (target, integral, &self) {
            (ScalarKind::Byte, Some(v), _) => i8::try_from(v).ok().map(Self::Byte),
            (ScalarKind::Short, Some(v), _) => i16::try_from(v).ok().map(Self::Short),
            (ScalarKind::Int, Some(v), _) => i32::try_from(v).ok().map(Self::Int),
            (ScalarKind::Long, Some(v), _) => Some(Self::Long(v)),
            (ScalarKind::Float, Some(v), _) => {
                let f = v as f32;
                (f as i64 == v).then_some(Self::Float(f))
            }
            (ScalarKind::Double, Some(v), _) => {
                let d = v as f64;
                (d as i64 == v).then_some(Self::Double(d))
            }
            (ScalarKind::Double, None, Self::Float(f)) => Some(Self::Double(f64::from(*f))),
            _ => None,
        }
    }
}

/// A value held in an object slot.
///
/// Many-valued features always hold a `List`; single-valued features hold a `Scalar` or an
/// `Object`. An unset feature has no slot at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    Scalar(Scalar),
    Object(ElementId),
    List(Vec<RawValue>),
}

impl RawValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    pub fn as_object(&self) -> Option<&ElementId> {
        match self {
            Self::Object(id) => Some(id),
            _ => None,
        }
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

    /// Every element id mentioned by this value, in order.
    pub fn referenced_ids(&self) -> Vec<&ElementId> {
        match self {
            Self::Object(id) => vec![id],
            Self::List(items) => items.iter().flat_map(RawValue::referenced_ids).collect(),
            Self::Scalar(_) => Vec::new(),
        }
    }
}

impl From<Scalar> for RawValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<ElementId> for RawValue {
    fn from(value: ElementId) -> Self {
        Self::Object(value)
    }
}
