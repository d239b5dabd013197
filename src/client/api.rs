// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use crate::error::ModelError;
use crate::protocol::*;
use crate::service::ModelAccessService;

/// One blocking call per protocol operation.
///
/// This is the seam between the client driver and whatever carries the calls: the MCP
/// connection for remote hosts, or a [`ModelAccessService`] hosted in the same process.
pub trait ModelApi: Send + Sync {
    fn ping(&self) -> Result<(), ModelError>;
    fn all_of(&self, params: AllOfParams) -> Result<Vec<ModelElement>, ModelError>;
    fn get_feature_value(&self, element_id: &str, feature_name: &str) -> Result<Value, ModelError>;
    fn set_feature_value(&self, element_id: &str, feature_name: &str, value: Value) -> Result<(), ModelError>;
    fn get_type(&self, type_name: &str) -> Result<TypeDescriptor, ModelError>;
    fn get_enumeration_value(&self, enumeration: &str, label: &str) -> Result<EnumerationLiteral, ModelError>;
    fn get_element_by_id(&self, element_id: &str) -> Result<ModelElement, ModelError>;
    fn create_instance(&self, type_name: &str, root: Option<&str>) -> Result<ModelElement, ModelError>;
    fn delete_instance(&self, element_id: &str) -> Result<(), ModelError>;
    fn open_session(&self, description: &str) -> Result<(), ModelError>;
    fn close_session(&self) -> Result<(), ModelError>;
    fn cancel_session(&self) -> Result<(), ModelError>;
    fn list_size(&self, list: &ProxyListHandle) -> Result<u32, ModelError>;
    fn list_get(&self, list: &ProxyListHandle, position: u32) -> Result<Value, ModelError>;
    fn list_set(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<Value, ModelError>;
    fn list_add(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError>;
    fn list_append(&self, list: &ProxyListHandle, value: Value) -> Result<(), ModelError>;
    fn list_remove(&self, list: &ProxyListHandle, position: u32) -> Result<Value, ModelError>;
    fn list_move(&self, list: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError>;
    fn list_clear(&self, list: &ProxyListHandle) -> Result<(), ModelError>;
    fn open_project(&self, file_url: &str) -> Result<ProjectResponse, ModelError>;
    fn close_project(&self) -> Result<(), ModelError>;
    fn save_project(&self) -> Result<ProjectResponse, ModelError>;

    /// Releases the transport, waiting at most `timeout` for a graceful goodbye.
    fn shutdown(&self, _timeout: Duration) -> Result<(), ModelError> {
        Ok(())
    }
}

fn list(list: &ProxyListHandle) -> ListParams {
    ListParams { list: list.clone() }
}

fn at(list: &ProxyListHandle, position: u32) -> ListPositionParams {
    ListPositionParams { list: list.clone(), position }
}

fn at_with(list: &ProxyListHandle, position: u32, value: Value) -> ListPositionValueParams {
    ListPositionValueParams { list: list.clone(), position, value }
}

impl ModelApi for ModelAccessService {
    fn ping(&self) -> Result<(), ModelError> {
        ModelAccessService::ping(self, Empty {}).map(drop)
    }

    fn all_of(&self, params: AllOfParams) -> Result<Vec<ModelElement>, ModelError> {
        ModelAccessService::all_of(self, params).map(|r| r.elements)
    }

    fn get_feature_value(&self, element_id: &str, feature_name: &str) -> Result<Value, ModelError> {
        ModelAccessService::get_feature_value(
            self,
            GetFeatureValueParams { element_id: element_id.to_owned(), feature_name: feature_name.to_owned() },
        )
        .map(|r| r.value)
    }

    fn set_feature_value(&self, element_id: &str, feature_name: &str, value: Value) -> Result<(), ModelError> {
        ModelAccessService::set_feature_value(
            self,
            SetFeatureValueParams {
                element_id: element_id.to_owned(),
                feature_name: feature_name.to_owned(),
                new_value: value,
            },
        )
        .map(drop)
    }

    fn get_type(&self, type_name: &str) -> Result<TypeDescriptor, ModelError> {
        ModelAccessService::get_type(self, GetTypeParams { type_name: type_name.to_owned() }).map(|r| r.descriptor)
    }

    fn get_enumeration_value(&self, enumeration: &str, label: &str) -> Result<EnumerationLiteral, ModelError> {
        ModelAccessService::get_enumeration_value(
            self,
            GetEnumerationValueParams { enumeration: enumeration.to_owned(), label: label.to_owned() },
        )
        .map(|r| r.literal)
    }

    fn get_element_by_id(&self, element_id: &str) -> Result<ModelElement, ModelError> {
        ModelAccessService::get_element_by_id(self, ElementIdParams { element_id: element_id.to_owned() })
            .map(|r| r.element)
    }

    fn create_instance(&self, type_name: &str, root: Option<&str>) -> Result<ModelElement, ModelError> {
        ModelAccessService::create_instance(
            self,
            CreateInstanceParams { type_name: type_name.to_owned(), root_element_hyperlink: root.map(str::to_owned) },
        )
        .map(|r| r.element)
    }

    fn delete_instance(&self, element_id: &str) -> Result<(), ModelError> {
        ModelAccessService::delete_instance(self, ElementIdParams { element_id: element_id.to_owned() }).map(drop)
    }

    fn open_session(&self, description: &str) -> Result<(), ModelError> {
        ModelAccessService::open_session(self, OpenSessionParams { description: description.to_owned() }).map(drop)
    }

    fn close_session(&self) -> Result<(), ModelError> {
        ModelAccessService::close_session(self).map(drop)
    }

    fn cancel_session(&self) -> Result<(), ModelError> {
        ModelAccessService::cancel_session(self).map(drop)
    }

    fn list_size(&self, handle: &ProxyListHandle) -> Result<u32, ModelError> {
        ModelAccessService::list_size(self, list(handle)).map(|r| r.size)
    }

    fn list_get(&self, handle: &ProxyListHandle, position: u32) -> Result<Value, ModelError> {
        ModelAccessService::list_get(self, at(handle, position)).map(|r| r.value)
    }

    fn list_set(&self, handle: &ProxyListHandle, position: u32, value: Value) -> Result<Value, ModelError> {
        ModelAccessService::list_set(self, at_with(handle, position, value)).map(|r| r.value)
    }

    fn list_add(&self, handle: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError> {
        ModelAccessService::list_add(self, at_with(handle, position, value)).map(drop)
    }

    fn list_append(&self, handle: &ProxyListHandle, value: Value) -> Result<(), ModelError> {
        ModelAccessService::list_append(self, ListValueParams { list: handle.clone(), value }).map(drop)
    }

    fn list_remove(&self, handle: &ProxyListHandle, position: u32) -> Result<Value, ModelError> {
        ModelAccessService::list_remove(self, at(handle, position)).map(|r| r.value)
    }

    fn list_move(&self, handle: &ProxyListHandle, position: u32, value: Value) -> Result<(), ModelError> {
        ModelAccessService::list_move(self, at_with(handle, position, value)).map(drop)
    }

    fn list_clear(&self, handle: &ProxyListHandle) -> Result<(), ModelError> {
        ModelAccessService::list_clear(self, list(handle)).map(drop)
    }

    fn open_project(&self, file_url: &str) -> Result<ProjectResponse, ModelError> {
        ModelAccessService::open_project(self, ProjectLocationParams { file_url: file_url.to_owned() })
    }

    fn close_project(&self) -> Result<(), ModelError> {
        ModelAccessService::close_project(self).map(drop)
    }

    fn save_project(&self) -> Result<ProjectResponse, ModelError> {
        ModelAccessService::save_project(self)
    }
}
