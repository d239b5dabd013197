// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Error taxonomy shared by the service, the transport binding and the client driver.
//!
//! Every failure falls into one of three categories. Invalid-argument failures that callers
//! commonly branch on carry a [`Reason`] code so no one has to match on message text.

use std::fmt;

use crate::model::HostError;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    PreconditionFailed,
    InvalidArgument,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreconditionFailed => "precondition-failed",
            Self::InvalidArgument => "invalid-argument",
            Self::Internal => "internal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "precondition-failed" => Some(Self::PreconditionFailed),
            "invalid-argument" => Some(Self::InvalidArgument),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }
}

/// Structured reason codes carried next to the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    TypeNotFound,
    TypeNotInstantiable,
    ElementNotFound,
    UnknownValueKind,
    UndefinedFeature,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeNotFound => "type-not-found",
            Self::TypeNotInstantiable => "type-not-instantiable",
            Self::ElementNotFound => "element-not-found",
            Self::UnknownValueKind => "unknown-value-kind",
            Self::UndefinedFeature => "undefined-feature",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "type-not-found" => Some(Self::TypeNotFound),
            "type-not-instantiable" => Some(Self::TypeNotInstantiable),
            "element-not-found" => Some(Self::ElementNotFound),
            "unknown-value-kind" => Some(Self::UnknownValueKind),
            "undefined-feature" => Some(Self::UndefinedFeature),
            _ => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("element `{element_id}` not found")]
    ElementNotFound { element_id: String },
    #[error("type `{type_name}` not found{}", .suggestion.as_deref().map(|s| format!("; did you mean `{s}`?")).unwrap_or_default())]
    TypeNotFound { type_name: String, suggestion: Option<String> },
    #[error("type `{type_name}` is not instantiable: {detail}")]
    TypeNotInstantiable { type_name: String, detail: String },
    #[error("unknown value kind: {0}")]
    UnknownValueKind(String),
    #[error("feature `{feature}` is not defined on `{type_name}`")]
    UndefinedFeature { feature: String, type_name: String },
    #[error("internal error: {0}")]
    Internal(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ModelError {
    pub fn project_not_open() -> Self {
        Self::PreconditionFailed("project not open".to_owned())
    }

    pub fn session_not_open() -> Self {
        Self::PreconditionFailed("session not open".to_owned())
    }

    pub fn session_already_open() -> Self {
        Self::PreconditionFailed("session already open".to_owned())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        Self::TypeNotFound { type_name: type_name.into(), suggestion: None }
    }

    pub fn element_not_found(element_id: impl Into<String>) -> Self {
        Self::ElementNotFound { element_id: element_id.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PreconditionFailed(_) => ErrorCategory::PreconditionFailed,
            Self::InvalidArgument(_)
            | Self::ElementNotFound { .. }
            | Self::TypeNotFound { .. }
            | Self::TypeNotInstantiable { .. }
            | Self::UnknownValueKind(_)
            | Self::UndefinedFeature { .. } => ErrorCategory::InvalidArgument,
            Self::Internal(_) | Self::Transport(_) => ErrorCategory::Internal,
        }
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Self::ElementNotFound { .. } => Some(Reason::ElementNotFound),
            Self::TypeNotFound { .. } => Some(Reason::TypeNotFound),
            Self::TypeNotInstantiable { .. } => Some(Reason::TypeNotInstantiable),
            Self::UnknownValueKind(_) => Some(Reason::UnknownValueKind),
            Self::UndefinedFeature { .. } => Some(Reason::UndefinedFeature),
            _ => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::TypeNotFound { type_name, .. }
            | Self::TypeNotInstantiable { type_name, .. }
            | Self::UndefinedFeature { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    pub fn is_precondition_failed(&self) -> bool {
        self.category() == ErrorCategory::PreconditionFailed
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.category() == ErrorCategory::InvalidArgument
    }
}

impl From<HostError> for ModelError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::NoSuchElement(id) => Self::element_not_found(id.into_string()),
            HostError::NoSuchFeature { feature, type_name } => {
                Self::UndefinedFeature { feature, type_name }
            }
            HostError::Unsupported { feature, type_name } => Self::InvalidArgument(format!(
                "feature `{feature}` of `{type_name}` is derived or not modifiable"
            )),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidLocation(_) => Self::InvalidArgument(err.to_string()),
            StoreError::Host(host) => host.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
