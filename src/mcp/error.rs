// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Error metadata on the wire.
//!
//! A [`ModelError`] travels as an MCP [`ErrorData`]: precondition failures use the
//! invalid-request code, the invalid-argument family uses invalid-params, everything else is
//! an internal error. The structured `data` object carries enough to rebuild the exact variant
//! on the client without looking at the message text.

use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{ErrorCategory, ModelError, Reason};

impl From<ModelError> for ErrorData {
    fn from(err: ModelError) -> Self {
        let message = err.to_string();
        let data = Some(error_data(&err));
        match err.category() {
            ErrorCategory::PreconditionFailed => ErrorData::invalid_request(message, data),
            ErrorCategory::InvalidArgument => ErrorData::invalid_params(message, data),
            ErrorCategory::Internal => ErrorData::internal_error(message, data),
        }
    }
}

fn error_data(err: &ModelError) -> JsonValue {
    let mut data = Map::new();
    data.insert("category".into(), json!(err.category().as_str()));
    if let Some(reason) = err.reason() {
        data.insert("reason".into(), json!(reason.as_str()));
    }
    if let Some(type_name) = err.type_name() {
        data.insert("type_name".into(), json!(type_name));
    }
    match err {
        ModelError::PreconditionFailed(detail)
        | ModelError::InvalidArgument(detail)
        | ModelError::UnknownValueKind(detail)
        | ModelError::Internal(detail)
        | ModelError::Transport(detail) => {
            data.insert("detail".into(), json!(detail));
        }
        ModelError::ElementNotFound { element_id } => {
            data.insert("element_id".into(), json!(element_id));
        }
        ModelError::TypeNotFound { suggestion, .. } => {
            if let Some(suggestion) = suggestion {
                data.insert("suggestion".into(), json!(suggestion));
            }
        }
        ModelError::TypeNotInstantiable { detail, .. } => {
            data.insert("detail".into(), json!(detail));
        }
        ModelError::UndefinedFeature { feature, .. } => {
            data.insert("feature".into(), json!(feature));
        }
    }
    JsonValue::Object(data)
}

fn field(data: Option<&JsonValue>, key: &str) -> Option<String> {
    data?.get(key)?.as_str().map(str::to_owned)
}

impl ModelError {
    /// Rebuilds the error a server reported. Errors without structured data (for example
    /// from a foreign server) fall back to the category implied by the code.
    pub fn from_error_data(err: &ErrorData) -> Self {
        let data = err.data.as_ref();
        let detail = || field(data, "detail").unwrap_or_else(|| err.message.to_string());
        let type_name = || field(data, "type_name").unwrap_or_default();

        if let Some(reason) = field(data, "reason").as_deref().and_then(Reason::parse) {
            return match reason {
                Reason::TypeNotFound => {
                    ModelError::TypeNotFound { type_name: type_name(), suggestion: field(data, "suggestion") }
                }
                Reason::TypeNotInstantiable => {
                    ModelError::TypeNotInstantiable { type_name: type_name(), detail: detail() }
                }
                Reason::ElementNotFound => {
                    ModelError::ElementNotFound { element_id: field(data, "element_id").unwrap_or_default() }
                }
                Reason::UnknownValueKind => ModelError::UnknownValueKind(detail()),
                Reason::UndefinedFeature => ModelError::UndefinedFeature {
                    feature: field(data, "feature").unwrap_or_default(),
                    type_name: type_name(),
                },
            };
        }

        let category = field(data, "category").as_deref().and_then(ErrorCategory::parse).unwrap_or_else(|| {
            if err.code == ErrorCode::INVALID_REQUEST {
                ErrorCategory::PreconditionFailed
            } else if err.code == ErrorCode::INVALID_PARAMS {
                ErrorCategory::InvalidArgument
            } else {
                ErrorCategory::Internal
            }
        });
        match category {
            ErrorCategory::PreconditionFailed => ModelError::PreconditionFailed(detail()),
            ErrorCategory::InvalidArgument => ModelError::InvalidArgument(detail()),
            ErrorCategory::Internal => ModelError::Internal(detail()),
        }
    }
}
