// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::ModelError;
use crate::protocol::*;
use crate::service::ModelAccessService;

/// Upper bound on how long shutdown waits for open connections to wind down.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

fn reply<T>(result: Result<T, ModelError>) -> Result<Json<T>, ErrorData> {
    result.map(Json).map_err(ErrorData::from)
}

/// MCP front end of a [`ModelAccessService`]. Clones share the service.
#[derive(Clone)]
pub struct ModelwireMcp {
    service: ModelAccessService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ModelwireMcp {
    pub fn new(service: ModelAccessService) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    pub fn service(&self) -> &ModelAccessService {
        &self.service
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Serves one MCP session over a bidirectional byte stream until the peer goes away.
    pub async fn serve_stream<S>(self, stream: S) -> Result<(), rmcp::RmcpError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let service = self.serve(tokio::io::split(stream)).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Accepts TCP connections, one MCP session each, until `shutdown` flips or its sender is
    /// dropped. Open connections are then closed, bounded by [`SHUTDOWN_GRACE`].
    pub async fn serve_tcp(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> std::io::Result<()> {
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                            continue;
                        }
                    };
                    let _ = stream.set_nodelay(true);
                    let server = self.clone();
                    let mut stop = shutdown.clone();
                    connections.spawn(async move {
                        tracing::debug!(%peer, "connection opened");
                        tokio::select! {
                            result = server.serve_stream(stream) => {
                                if let Err(err) = result {
                                    tracing::warn!(%peer, error = %err, "connection failed");
                                }
                            }
                            _ = stop.changed() => {}
                        }
                        tracing::debug!(%peer, "connection closed");
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(remaining = connections.len(), "shutdown grace elapsed; aborting connections");
            connections.shutdown().await;
        }
        Ok(())
    }

    /// Liveness check.
    #[tool(name = "model.ping")]
    async fn model_ping(&self) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.ping(Empty {}))
    }

    /// All elements below a root (default: the primary model), optionally filtered by type
    /// name. `only_exact_type` excludes instances of subtypes.
    #[tool(name = "model.all_of")]
    async fn model_all_of(&self, params: Parameters<AllOfParams>) -> Result<Json<ElementsResponse>, ErrorData> {
        reply(self.service.all_of(params.0))
    }

    /// Read one feature of an element. Many-valued features come back as a `proxy_list`
    /// handle for the `list.*` tools.
    #[tool(name = "element.get_feature")]
    async fn element_get_feature(
        &self,
        params: Parameters<GetFeatureValueParams>,
    ) -> Result<Json<ValueResponse>, ErrorData> {
        reply(self.service.get_feature_value(params.0))
    }

    /// Write one feature of an element; many-valued features are replaced wholesale.
    /// Requires an open session.
    #[tool(name = "element.set_feature")]
    async fn element_set_feature(&self, params: Parameters<SetFeatureValueParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.set_feature_value(params.0))
    }

    /// Look up an element by id.
    #[tool(name = "element.by_id")]
    async fn element_by_id(&self, params: Parameters<ElementIdParams>) -> Result<Json<ElementResponse>, ErrorData> {
        reply(self.service.get_element_by_id(params.0))
    }

    /// Create an instance of a concrete type, attached under the root locator or the primary
    /// model. Requires an open session.
    #[tool(name = "element.create")]
    async fn element_create(
        &self,
        params: Parameters<CreateInstanceParams>,
    ) -> Result<Json<ElementResponse>, ErrorData> {
        reply(self.service.create_instance(params.0))
    }

    /// Delete an element with everything it contains. Requires an open session.
    #[tool(name = "element.delete")]
    async fn element_delete(&self, params: Parameters<ElementIdParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.delete_instance(params.0))
    }

    /// Describe a type: qualified name, kind, abstractness and all supertypes.
    #[tool(name = "type.get")]
    async fn type_get(&self, params: Parameters<GetTypeParams>) -> Result<Json<TypeResponse>, ErrorData> {
        reply(self.service.get_type(params.0))
    }

    /// Find an enumeration literal by its label.
    #[tool(name = "enum.get_value")]
    async fn enum_get_value(
        &self,
        params: Parameters<GetEnumerationValueParams>,
    ) -> Result<Json<EnumerationValueResponse>, ErrorData> {
        reply(self.service.get_enumeration_value(params.0))
    }

    /// Open the editing session that all mutating tools require.
    #[tool(name = "session.open")]
    async fn session_open(&self, params: Parameters<OpenSessionParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.open_session(params.0))
    }

    /// Close the editing session, keeping its changes.
    #[tool(name = "session.close")]
    async fn session_close(&self) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.close_session())
    }

    /// Cancel the editing session, rolling back its changes.
    #[tool(name = "session.cancel")]
    async fn session_cancel(&self) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.cancel_session())
    }

    /// Number of items behind a list handle.
    #[tool(name = "list.size")]
    async fn list_size(&self, params: Parameters<ListParams>) -> Result<Json<ListSizeResponse>, ErrorData> {
        reply(self.service.list_size(params.0))
    }

    /// Item at a position of a list handle.
    #[tool(name = "list.get")]
    async fn list_get(&self, params: Parameters<ListPositionParams>) -> Result<Json<ValueResponse>, ErrorData> {
        reply(self.service.list_get(params.0))
    }

    /// Replace the item at a position; returns the replaced item.
    #[tool(name = "list.set")]
    async fn list_set(&self, params: Parameters<ListPositionValueParams>) -> Result<Json<ValueResponse>, ErrorData> {
        reply(self.service.list_set(params.0))
    }

    /// Insert an item at a position.
    #[tool(name = "list.add")]
    async fn list_add(&self, params: Parameters<ListPositionValueParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.list_add(params.0))
    }

    /// Append an item at the end.
    #[tool(name = "list.append")]
    async fn list_append(&self, params: Parameters<ListValueParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.list_append(params.0))
    }

    /// Remove the item at a position; returns the removed item.
    #[tool(name = "list.remove")]
    async fn list_remove(&self, params: Parameters<ListPositionParams>) -> Result<Json<ValueResponse>, ErrorData> {
        reply(self.service.list_remove(params.0))
    }

    /// Move the item equal to `value` to `position`.
    #[tool(name = "list.move")]
    async fn list_move(&self, params: Parameters<ListPositionValueParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.list_move(params.0))
    }

    /// Remove every item.
    #[tool(name = "list.clear")]
    async fn list_clear(&self, params: Parameters<ListParams>) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.list_clear(params.0))
    }

    /// Open a project file (`file://` URI or path) and make it active. Re-opening an already
    /// loaded project only activates it.
    #[tool(name = "project.open")]
    async fn project_open(&self, params: Parameters<ProjectLocationParams>) -> Result<Json<ProjectResponse>, ErrorData> {
        reply(self.service.open_project(params.0))
    }

    /// Close the active project, cancelling its editing session.
    #[tool(name = "project.close")]
    async fn project_close(&self) -> Result<Json<Empty>, ErrorData> {
        reply(self.service.close_project())
    }

    /// Save the active project to its file.
    #[tool(name = "project.save")]
    async fn project_save(&self) -> Result<Json<ProjectResponse>, ErrorData> {
        reply(self.service.save_project())
    }
}

#[tool_handler]
impl ServerHandler for ModelwireMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Modelwire remote model access server (tools: model.ping, model.all_of, element.get_feature, element.set_feature, element.by_id, element.create, element.delete, type.get, enum.get_value, session.open, session.close, session.cancel, list.size, list.get, list.set, list.add, list.append, list.remove, list.move, list.clear, project.open, project.close, project.save). Mutating tools require session.open first."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod e2e;
