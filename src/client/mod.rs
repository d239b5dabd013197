// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Remote Model Client.
//!
//! [`RemoteModel`] drives a host through any [`ModelApi`] and presents the remote object
//! graph as a typed model: type lookups go through a bounded [`TypeCache`], elements come back
//! as [`RemoteElement`] handles and many-valued features as live [`ProxyList`]s.
//!
//! Edits need an editing session on the host. The driver opens one lazily on the first
//! mutation; [`RemoteModel::store`] confirms it and saves, dropping the model without storing
//! rolls it back.

mod api;
mod cache;
mod config;
mod connection;
mod proxy;
mod value;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use api::ModelApi;
pub use cache::{TypeCache, DEFAULT_TYPE_CACHE_CAPACITY};
pub use config::{ConfigError, ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use connection::McpConnection;
pub use proxy::{Iter, ProxyList};
pub use value::{ClientValue, RemoteElement};

use crate::codec;
use crate::error::{ModelError, Reason};
use crate::model::EnumerationLiteral;
use crate::protocol::{AllOfParams, ModelElement, TypeDescriptor, Value};
use crate::session::SessionState;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// The generic typed-model contract, as script engines and model transformations see it.
pub trait TypedModel {
    fn has_type(&self, type_name: &str) -> Result<bool, ModelError>;
    fn is_instantiable(&self, type_name: &str) -> Result<bool, ModelError>;
    /// Elements whose type is exactly `type_name`.
    fn all_of_type(&self, type_name: &str) -> Result<Vec<RemoteElement>, ModelError>;
    /// Elements of `type_name` or any of its subtypes.
    fn all_of_kind(&self, type_name: &str) -> Result<Vec<RemoteElement>, ModelError>;
    fn all_contents(&self) -> Result<Vec<RemoteElement>, ModelError>;
    fn element_by_id(&self, element_id: &str) -> Result<Option<RemoteElement>, ModelError>;
    fn create_instance(&self, type_name: &str) -> Result<RemoteElement, ModelError>;
    fn delete_element(&self, element: &RemoteElement) -> Result<(), ModelError>;
    fn enumeration_value(&self, enumeration: &str, label: &str) -> Result<EnumerationLiteral, ModelError>;
    fn cache_key_for_type(&self, type_name: &str) -> Result<Option<String>, ModelError>;
    /// The element's own type name followed by all of its supertypes.
    fn all_type_names_of(&self, element: &RemoteElement) -> Result<Vec<String>, ModelError>;
    fn type_name_of(&self, element: &RemoteElement) -> String;
    fn owns(&self, value: &ClientValue) -> bool;
}

/// Reflective property access for script engines.
pub trait PropertyAccess {
    fn get_property(&self, element: &RemoteElement, property: &str) -> Result<ClientValue, ModelError>;
    fn set_property(&self, element: &RemoteElement, property: &str, value: ClientValue) -> Result<(), ModelError>;
}

/// State shared by a model and the proxy lists it hands out.
struct Link {
    instance: u64,
    name: String,
    api: Box<dyn ModelApi>,
    session: SessionState,
    types: Mutex<TypeCache>,
    config: ConnectionConfig,
}

impl Link {
    fn types(&self) -> MutexGuard<'_, TypeCache> {
        self.types.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_session(&self) -> Result<(), ModelError> {
        let opened = self.session.ensure_open(|| self.api.open_session(&format!("modelwire: {}", self.name)))?;
        if opened {
            tracing::debug!(model = %self.name, "editing session opened");
        }
        Ok(())
    }

    fn element(&self, element: ModelElement) -> RemoteElement {
        RemoteElement::new(element, self.instance)
    }

    fn elements(&self, elements: Vec<ModelElement>) -> Vec<RemoteElement> {
        elements.into_iter().map(|e| self.element(e)).collect()
    }

    fn reference(&self, element: &RemoteElement) -> Result<ModelElement, ModelError> {
        if element.owner() != self.instance {
            return Err(ModelError::invalid(format!(
                "element `{}` belongs to another model than `{}`",
                element.id(),
                self.name
            )));
        }
        Ok(element.as_model_element().clone())
    }

    fn to_wire(&self, value: &ClientValue) -> Result<Value, ModelError> {
        match value {
            ClientValue::Null => Ok(Value::NotSet),
            ClientValue::Scalar(scalar) => Ok(codec::encode_scalar(scalar)),
            ClientValue::Element(element) => self.reference(element).map(Value::ReferenceValue),
            ClientValue::List(items) => self.collection(items),
            ClientValue::Proxy(list) => self.collection(&list.to_vec()?),
        }
    }

    fn collection(&self, items: &[ClientValue]) -> Result<Value, ModelError> {
        let mixed = |other: &ClientValue| ModelError::invalid(format!("collection mixes item kinds: {other:?}"));
        match items.first() {
            None => Ok(Value::empty_collection()),
            Some(ClientValue::Element(_)) => items
                .iter()
                .map(|item| match item {
                    ClientValue::Element(element) => self.reference(element),
                    other => Err(mixed(other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::ReferenceValues),
            Some(_) => {
                let scalars = items
                    .iter()
                    .map(|item| match item {
                        ClientValue::Scalar(scalar) => Ok(scalar.clone()),
                        other => Err(mixed(other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                codec::encode_scalar_collection(&scalars)
            }
        }
    }

    fn from_wire(self: &Arc<Self>, value: Value) -> Result<ClientValue, ModelError> {
        if let Some(scalar) = codec::decode_scalar(&value) {
            return Ok(ClientValue::Scalar(scalar));
        }
        if let Some(items) = codec::decode_scalar_collection(&value) {
            return Ok(ClientValue::List(items.into_iter().map(ClientValue::Scalar).collect()));
        }
        match value {
            Value::ReferenceValue(element) => Ok(ClientValue::Element(self.element(element))),
            Value::ReferenceValues(elements) => {
                Ok(ClientValue::List(elements.into_iter().map(|e| ClientValue::Element(self.element(e))).collect()))
            }
            Value::ProxyList(handle) => Ok(ClientValue::Proxy(ProxyList::new(Arc::clone(self), handle))),
            Value::NotSet => Ok(ClientValue::Null),
            other => Err(ModelError::UnknownValueKind(format!("unexpected {:?} in a value position", other.kind()))),
        }
    }

    fn descriptor(&self, type_name: &str) -> Result<Option<TypeDescriptor>, ModelError> {
        if let Some(hit) = self.types().get(type_name) {
            return Ok(hit);
        }
        let looked_up = match self.api.get_type(type_name) {
            Ok(descriptor) => Some(descriptor),
            Err(err) if err.reason() == Some(Reason::TypeNotFound) => None,
            Err(err) => return Err(err),
        };
        self.types().insert(type_name, looked_up.clone());
        Ok(looked_up)
    }

    fn all_of(&self, type_name: Option<&str>, only_exact_type: bool) -> Result<Vec<RemoteElement>, ModelError> {
        let elements = self.api.all_of(AllOfParams {
            type_name: type_name.map(str::to_owned),
            root_element_hyperlink: self.config.root_element_hyperlink.clone(),
            only_exact_type,
        })?;
        Ok(self.elements(elements))
    }
}

/// A remote model, loaded through one [`ModelApi`].
pub struct RemoteModel {
    link: Arc<Link>,
    disposed: bool,
}

impl std::fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteModel")
            .field("name", &self.link.name)
            .field("instance", &self.link.instance)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl RemoteModel {
    /// Connects to the MCP server named by `config` over TCP and loads the model.
    pub fn connect(name: impl Into<String>, config: ConnectionConfig) -> Result<Self, ModelError> {
        config.validate().map_err(|err| ModelError::invalid(err.to_string()))?;
        let connection = McpConnection::connect(&config.host, config.port)?;
        Self::with_api(name, Box::new(connection), config)
    }

    /// Loads the model through an already established `api`: pings the host, ensures the
    /// configured project is open and starts from an empty type cache.
    pub fn with_api(
        name: impl Into<String>,
        api: Box<dyn ModelApi>,
        config: ConnectionConfig,
    ) -> Result<Self, ModelError> {
        let link = Link {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            types: Mutex::new(TypeCache::new(config.type_cache_capacity)),
            session: SessionState::new(),
            api,
            config,
        };
        let mut model = Self { link: Arc::new(link), disposed: false };
        if let Err(err) = model.load() {
            model.disposed = true;
            if let Err(shutdown) = model.link.api.shutdown(model.link.config.shutdown_timeout()) {
                tracing::warn!(model = %model.link.name, error = %shutdown, "transport shutdown failed");
            }
            return Err(err);
        }
        Ok(model)
    }

    fn load(&self) -> Result<(), ModelError> {
        self.link.api.ping()?;
        if let Some(url) = &self.link.config.project_url {
            let project = self.link.api.open_project(url)?;
            tracing::info!(model = %self.link.name, project = %project.name, "project open");
        }
        self.invalidate_type_cache();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.link.name
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.link.config
    }

    /// Token distinguishing this model from every other one in the process.
    pub fn instance(&self) -> u64 {
        self.link.instance
    }

    pub fn api(&self) -> &dyn ModelApi {
        self.link.api.as_ref()
    }

    pub fn is_session_open(&self) -> bool {
        self.link.session.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn cached_type_count(&self) -> usize {
        self.link.types().len()
    }

    pub fn invalidate_type_cache(&self) {
        self.link.types().invalidate();
    }

    /// Cached type lookup; `None` when the host does not know the type.
    pub fn type_descriptor(&self, type_name: &str) -> Result<Option<TypeDescriptor>, ModelError> {
        self.link.descriptor(type_name)
    }

    /// Confirms the open editing session, if any, and saves the project.
    pub fn store(&self) -> Result<(), ModelError> {
        let closed = self.link.session.ensure_closed(|| self.link.api.close_session())?;
        if closed {
            tracing::debug!(model = %self.link.name, "editing session closed");
        }
        let project = self.link.api.save_project()?;
        tracing::info!(model = %self.link.name, location = %project.file_url, "project stored");
        Ok(())
    }

    /// Rolls back the open editing session, if any.
    pub fn discard_changes(&self) -> Result<(), ModelError> {
        let cancelled = self.link.session.ensure_closed(|| self.link.api.cancel_session())?;
        if cancelled {
            tracing::debug!(model = %self.link.name, "editing session cancelled");
        }
        Ok(())
    }

    /// Ends the model: stores or discards pending edits, optionally closes the project, then
    /// releases the transport. Every step runs even if an earlier one failed; the first
    /// failure is returned. Idempotent.
    pub fn dispose(&mut self) -> Result<(), ModelError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        let config = &self.link.config;
        let mut first_error = None;
        let mut record = |step: &str, result: Result<(), ModelError>| {
            if let Err(err) = result {
                tracing::warn!(model = %self.link.name, step, error = %err, "dispose step failed");
                first_error.get_or_insert(err);
            }
        };

        if config.store_on_disposal {
            record("store", self.store());
        } else {
            record("discard", self.discard_changes());
        }
        if config.close_on_disposal {
            record("close project", self.link.api.close_project());
        }
        record("shutdown", self.link.api.shutdown(config.shutdown_timeout()));
        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(())
    }

    fn owned<'a>(&self, element: &'a RemoteElement) -> Result<&'a RemoteElement, ModelError> {
        self.link.reference(element).map(|_| element)
    }
}

impl Drop for RemoteModel {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            tracing::warn!(model = %self.link.name, error = %err, "dispose on drop failed");
        }
    }
}

impl TypedModel for RemoteModel {
    fn has_type(&self, type_name: &str) -> Result<bool, ModelError> {
        Ok(self.link.descriptor(type_name)?.is_some())
    }

    fn is_instantiable(&self, type_name: &str) -> Result<bool, ModelError> {
        Ok(self.link.descriptor(type_name)?.is_some_and(|d| d.is_instantiable()))
    }

    fn all_of_type(&self, type_name: &str) -> Result<Vec<RemoteElement>, ModelError> {
        self.link.all_of(Some(type_name), true)
    }

    fn all_of_kind(&self, type_name: &str) -> Result<Vec<RemoteElement>, ModelError> {
        self.link.all_of(Some(type_name), false)
    }

    fn all_contents(&self) -> Result<Vec<RemoteElement>, ModelError> {
        self.link.all_of(None, false)
    }

    fn element_by_id(&self, element_id: &str) -> Result<Option<RemoteElement>, ModelError> {
        match self.link.api.get_element_by_id(element_id) {
            Ok(element) => Ok(Some(self.link.element(element))),
            Err(err) if err.reason() == Some(Reason::ElementNotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn create_instance(&self, type_name: &str) -> Result<RemoteElement, ModelError> {
        self.link.ensure_session()?;
        let root = self.link.config.root_element_hyperlink.as_deref();
        let created = self.link.api.create_instance(type_name, root)?;
        Ok(self.link.element(created))
    }

    fn delete_element(&self, element: &RemoteElement) -> Result<(), ModelError> {
        let element = self.owned(element)?;
        self.link.ensure_session()?;
        self.link.api.delete_instance(element.id())
    }

    fn enumeration_value(&self, enumeration: &str, label: &str) -> Result<EnumerationLiteral, ModelError> {
        self.link.api.get_enumeration_value(enumeration, label)
    }

    fn cache_key_for_type(&self, type_name: &str) -> Result<Option<String>, ModelError> {
        Ok(self.link.descriptor(type_name)?.map(|d| d.type_name))
    }

    fn all_type_names_of(&self, element: &RemoteElement) -> Result<Vec<String>, ModelError> {
        let Some(descriptor) = self.link.descriptor(element.type_name())? else {
            return Ok(vec![element.type_name().to_owned()]);
        };
        let mut names = Vec::with_capacity(descriptor.all_supertypes.len() + 1);
        names.push(descriptor.type_name);
        names.extend(descriptor.all_supertypes.into_iter().map(|t| t.type_name));
        Ok(names)
    }

    fn type_name_of(&self, element: &RemoteElement) -> String {
        element.type_name().to_owned()
    }

    fn owns(&self, value: &ClientValue) -> bool {
        match value {
            ClientValue::Element(element) => element.owner() == self.link.instance,
            ClientValue::Proxy(list) => list.owner() == self.link.instance,
            _ => false,
        }
    }
}

impl PropertyAccess for RemoteModel {
    fn get_property(&self, element: &RemoteElement, property: &str) -> Result<ClientValue, ModelError> {
        let element = self.owned(element)?;
        match self.link.api.get_feature_value(element.id(), property)? {
            Value::NotDefined => Err(ModelError::UndefinedFeature {
                feature: property.to_owned(),
                type_name: element.type_name().to_owned(),
            }),
            value => self.link.from_wire(value),
        }
    }

    fn set_property(&self, element: &RemoteElement, property: &str, value: ClientValue) -> Result<(), ModelError> {
        let element = self.owned(element)?;
        let value = self.link.to_wire(&value)?;
        self.link.ensure_session()?;
        self.link.api.set_feature_value(element.id(), property, value)
    }
}
