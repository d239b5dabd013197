// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rmcp::service::{RoleClient, RunningService, ServiceError};
use rmcp::ServiceExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

use super::api::ModelApi;
use crate::codec;
use crate::error::ModelError;
use crate::protocol::*;

fn transport(err: impl std::fmt::Display) -> ModelError {
    ModelError::Transport(err.to_string())
}

/// MCP client over one TCP connection.
///
/// Calls block the caller on a private current-thread runtime, so a connection must not be
/// used from inside another tokio runtime.
pub struct McpConnection {
    endpoint: String,
    runtime: Runtime,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
}

impl std::fmt::Debug for McpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpConnection").field("endpoint", &self.endpoint).finish_non_exhaustive()
    }
}

impl McpConnection {
    pub fn connect(host: &str, port: u16) -> Result<Self, ModelError> {
        let endpoint = format!("{host}:{port}");
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(transport)?;
        let service = runtime.block_on(async {
            let stream = TcpStream::connect((host, port))
                .await
                .map_err(|err| ModelError::Transport(format!("connect {endpoint}: {err}")))?;
            let _ = stream.set_nodelay(true);
            ().serve(stream.into_split()).await.map_err(transport)
        })?;
        tracing::debug!(%endpoint, "connected");
        Ok(Self { endpoint, runtime, service: Mutex::new(Some(service)) })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call_raw(&self, tool: &'static str, arguments: JsonValue) -> Result<JsonValue, ModelError> {
        let guard = self.service.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(service) = guard.as_ref() else {
            return Err(ModelError::Transport(format!("connection to {} is closed", self.endpoint)));
        };
        let request = serde_json::from_value(json!({ "name": tool, "arguments": arguments })).map_err(transport)?;
        let result = self.runtime.block_on(service.call_tool(request)).map_err(|err| match err {
            ServiceError::McpError(data) => ModelError::from_error_data(&data),
            other => transport(other),
        })?;
        let result = serde_json::to_value(&result).map_err(transport)?;

        if result.get("isError").and_then(JsonValue::as_bool) == Some(true) {
            let text = result
                .pointer("/content/0/text")
                .and_then(JsonValue::as_str)
                .unwrap_or("tool reported an error");
            return Err(ModelError::Internal(format!("{tool}: {text}")));
        }
        result
            .get("structuredContent")
            .cloned()
            .ok_or_else(|| ModelError::Transport(format!("{tool}: response carries no structured content")))
    }

    fn call<P: Serialize, R: DeserializeOwned>(&self, tool: &'static str, params: P) -> Result<R, ModelError> {
        let arguments = serde_json::to_value(params).map_err(transport)?;
        let response = self.call_raw(tool, arguments)?;
        serde_json::from_value(response).map_err(|err| ModelError::Transport(format!("{tool}: {err}")))
    }

    /// Like [`McpConnection::call`] for tools answering with a single `value`. Unknown value
    /// tags become `UnknownValueKind` rather than a transport error.
    fn call_value<P: Serialize>(&self, tool: &'static str, params: P) -> Result<Value, ModelError> {
        let arguments = serde_json::to_value(params).map_err(transport)?;
        let mut response = self.call_raw(tool, arguments)?;
        let value = response
            .get_mut("value")
            .map(JsonValue::take)
            .ok_or_else(|| ModelError::Transport(format!("{tool}: response carries no value")))?;
        codec::parse_value(value)
    }
}

impl ModelApi for McpConnection {
    fn ping(&self) -> Result<(), ModelError> {
        self.call::<_, Empty>("model.ping", Empty {}).map(drop)
    }

    fn all_of(&self, params: AllOfParams) -> Result<Vec<ModelElement>, ModelError> {
        self.call::<_, ElementsResponse>("model.all_of", params).map(|r| r.elements)
    }

    fn get_feature_value(&self, element_id: &str, feature_name: &str) -> Result<Value, ModelError> {
        self.call_value(
            "element.get_feature",
            GetFeatureValueParams { element_id: element_id.to_owned(), feature_name: feature_name.to_owned() },
        )
    }

    fn set_feature_value(&self, element_id: &str, feature_name: &str, value: Value) -> Result<(), ModelError> {
        let params = SetFeatureValueParams {
            element_id: element_id.to_owned(),
            feature_name: feature_name.to_owned(),
            new_value: value,
        };
        self.call::<_, Empty>("element.set_feature", params).map(drop)
    }

    fn get_type(&self, type_name: &str) -> Result<TypeDescriptor, ModelError> {
        self.call::<_, TypeResponse>("type.get", GetTypeParams { type_name: type_name.to_owned() })
            .map(|r| r.descriptor)
    }

    fn get_enumeration_value(&self, enumeration: &str, label: &str) -> Result<EnumerationLiteral, ModelError> {
        let params = GetEnumerationValueParams { enumeration: enumeration.to_owned(), label: label.to_owned() };
        self.call::<_, EnumerationValueResponse>("enum.get_value", params).map(|r| r.literal)
    }

    fn get_element_by_id(&self, element_id: &str) -> Result<ModelElement, ModelError> {
        self.call::<_, ElementResponse>("element.by_id", ElementIdParams { element_id: element_id.to_owned() })
            .map(|r| r.element)
    }

    fn create_instance(&self, type_name: &str, root: Option<&str>) -> Result<ModelElement, ModelError> {
        let params =
            CreateInstanceParams { type_name: type_name.to_owned(), root_element_hyperlink: root.map(str::to_owned) };
        self.call::<_, ElementResponse>("element.create", params).map(|r| r.element)
    }

    fn delete_instance(&self, element_id: &str) -> Result<(), ModelError> {
        self.call::<_, Empty>("element.delete", ElementIdParams { element_id: element_id.to_owned() }).map(drop)
    }

    fn open_session(&self, description: &str) -> Result<(), ModelError> {
        self.call::<_, Empty>("session.open", OpenSessionParams { description: description.to_owned() }).map(drop)
    }

    fn close_session(&self) -> Result<(), ModelError> {
        self.call::<_, Empty>("session.close", Empty {}).map(drop)
    }

    fn cancel_session(&self) -> Result<(), ModelError> {
        self.call::<_, Empty>("session.cancel", Empty {}).map(drop)
    }

    fn list_size(&self, list: &ProxyListHandle) -> Result<u32, ModelError> {
        self.call::<_, ListSizeResponse>("list.size", ListParams { list: list.clone() }).map(|r| r.size)
    }

    fn list_get(&self, list: &ProxyListHandle, position: u32) -> Result<Value, ModelError> {
        self.call_value("list.get", ListPositionParams { list: list.clone(), position })
    }

    fn list_set(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<Value, ModelError> {
        self.call_value("list.set", ListPositionValueParams { list: list.clone(), position, value })
    }

    fn list_add(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError> {
        self.call::<_, Empty>("list.add", ListPositionValueParams { list: list.clone(), position, value }).map(drop)
    }

    fn list_append(&self, list: &ProxyListHandle, value: Value) -> Result<(), ModelError> {
        self.call::<_, Empty>("list.append", ListValueParams { list: list.clone(), value }).map(drop)
    }

    fn list_remove(&self, list: &ProxyListHandle, position: u32) -> Result<Value, ModelError> {
        self.call_value("list.remove", ListPositionParams { list: list.clone(), position })
    }

    fn list_move(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError> {
        self.call::<_, Empty>("list.move", ListPositionValueParams { list: list.clone(), position, value }).map(drop)
    }

    fn list_clear(&self, list: &ProxyListHandle) -> Result<(), ModelError> {
        self.call::<_, Empty>("list.clear", ListParams { list: list.clone() }).map(drop)
    }

    fn open_project(&self, file_url: &str) -> Result<ProjectResponse, ModelError> {
        self.call("project.open", ProjectLocationParams { file_url: file_url.to_owned() })
    }

    fn close_project(&self) -> Result<(), ModelError> {
        self.call::<_, Empty>("project.close", Empty {}).map(drop)
    }

    fn save_project(&self) -> Result<ProjectResponse, ModelError> {
        self.call("project.save", Empty {})
    }

    fn shutdown(&self, timeout: Duration) -> Result<(), ModelError> {
        let service = self.service.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(service) = service else {
            return Ok(());
        };
        // The timer must be created inside the runtime.
        match self.runtime.block_on(async { tokio::time::timeout(timeout, service.cancel()).await }) {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(transport(err)),
            Err(_) => {
                tracing::warn!(endpoint = %self.endpoint, ?timeout, "graceful disconnect timed out; dropping transport");
                Ok(())
            }
        }
    }
}
