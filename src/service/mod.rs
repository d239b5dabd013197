// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The model access service.
//!
//! Every handler establishes its context through the same ordered checks and stops at the
//! first failure:
//!
//! 1. a project must be active (`precondition-failed`),
//! 2. mutating handlers additionally require an open editing session (`precondition-failed`),
//! 3. a requested type name must resolve (`type-not-found`).
//!
//! The service is cheap to clone; clones share the workspace and the session gate, so one
//! service can back any number of transport connections.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::{self, TypeCatalog};
use crate::codec::{Codec, Decoded};
use crate::error::ModelError;
use crate::model::fixtures::{self, FixtureError};
use crate::model::{
    ClassifierDef, ClassifierId, ElementId, EnumerationLiteral, HostError, Metamodel, Project, RawValue,
    RootLocator,
};
use crate::protocol::{
    AllOfParams, CreateInstanceParams, ElementIdParams, ElementResponse, ElementsResponse, Empty,
    EnumerationValueResponse, GetEnumerationValueParams, GetFeatureValueParams, GetTypeParams, ListParams,
    ListPositionParams, ListPositionValueParams, ListSizeResponse, ListValueParams, OpenSessionParams,
    ProjectLocationParams, ProjectResponse, ProxyListHandle, SetFeatureValueParams, TypeResponse, Value, ValueResponse,
};
use crate::session::SessionState;
use crate::store::{ProjectFile, WriteDurability};

pub mod factory;

pub use factory::{default_constructor, Constructor, ElementFactory};

const MEMORY_SCHEME: &str = "memory:";

/// Names of the structural pseudo-features answered when a type declares no such feature.
pub const PSEUDO_CONTAINER: &str = "container";
pub const PSEUDO_CONTAINING_FEATURE: &str = "containingFeature";
pub const PSEUDO_CONTENTS: &str = "contents";

#[derive(Debug)]
struct LoadedProject {
    project: Project,
    file: Option<ProjectFile>,
}

#[derive(Debug)]
struct Snapshot {
    location: String,
    project: Project,
}

#[derive(Debug, Default)]
struct Workspace {
    projects: BTreeMap<String, LoadedProject>,
    active: Option<String>,
    snapshot: Option<Snapshot>,
}

impl Workspace {
    fn active(&self) -> Result<(&str, &LoadedProject), ModelError> {
        let location = self.active.as_deref().ok_or_else(ModelError::project_not_open)?;
        let loaded = self.projects.get(location).ok_or_else(ModelError::project_not_open)?;
        Ok((location, loaded))
    }

    fn active_mut(&mut self) -> Result<&mut LoadedProject, ModelError> {
        let location = self.active.as_deref().ok_or_else(ModelError::project_not_open)?;
        self.projects.get_mut(location).ok_or_else(ModelError::project_not_open)
    }

    fn session_owner(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|snapshot| snapshot.location.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ModelAccessService {
    workspace: Arc<Mutex<Workspace>>,
    session: Arc<SessionState>,
    factory: Arc<ElementFactory>,
    metamodel: Arc<Metamodel>,
    durability: WriteDurability,
}

impl ModelAccessService {
    /// A service with no project open, serving projects typed by `metamodel`.
    pub fn new(metamodel: Arc<Metamodel>) -> Self {
        let factory = ElementFactory::for_metamodel(&metamodel);
        Self {
            workspace: Arc::new(Mutex::new(Workspace::default())),
            session: Arc::new(SessionState::new()),
            factory: Arc::new(factory),
            metamodel,
            durability: WriteDurability::default(),
        }
    }

    /// A service hosting the built-in zoo project as its active, in-memory project.
    pub fn demo() -> Result<Self, FixtureError> {
        let project = fixtures::zoo_project()?;
        let service = Self::new(Arc::clone(project.metamodel()));
        service.host_project(project, None);
        Ok(service)
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_factory(mut self, factory: ElementFactory) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn metamodel(&self) -> &Arc<Metamodel> {
        &self.metamodel
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn is_session_open(&self) -> bool {
        self.session.is_active()
    }

    fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an already built project to the workspace and makes it active.
    ///
    /// With a `file`, the project is keyed by the file's location and can be saved; without
    /// one it lives in memory only.
    pub fn host_project(&self, project: Project, file: Option<ProjectFile>) -> ProjectResponse {
        let file = file.map(|file| file.with_durability(self.durability));
        let location = match &file {
            Some(file) => file.location(),
            None => format!("{MEMORY_SCHEME}{}", project.name()),
        };
        let response = ProjectResponse { name: project.name().to_owned(), file_url: location.clone() };
        let mut workspace = self.lock();
        workspace.projects.insert(location.clone(), LoadedProject { project, file });
        workspace.active = Some(location);
        tracing::info!(project = %response.name, location = %response.file_url, "project hosted");
        response
    }

    /// Runs `f` against the active project.
    pub fn with_active_project<T>(&self, f: impl FnOnce(&Project) -> T) -> Result<T, ModelError> {
        let workspace = self.lock();
        let (_, loaded) = workspace.active()?;
        Ok(f(&loaded.project))
    }

    fn read<T>(&self, f: impl FnOnce(&Project) -> Result<T, ModelError>) -> Result<T, ModelError> {
        let workspace = self.lock();
        let (_, loaded) = workspace.active()?;
        f(&loaded.project)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Project) -> Result<T, ModelError>) -> Result<T, ModelError> {
        // The session gate is never consulted while the workspace is locked.
        let owner = {
            let workspace = self.lock();
            let (location, _) = workspace.active()?;
            (workspace.session_owner() == Some(location)).then(|| location.to_owned())
        };
        if !self.session.is_active() {
            return Err(ModelError::session_not_open());
        }
        let Some(owner) = owner else {
            return Err(ModelError::session_not_open());
        };

        let mut workspace = self.lock();
        if workspace.active.as_deref() != Some(owner.as_str()) {
            return Err(ModelError::session_not_open());
        }
        f(&mut workspace.active_mut()?.project)
    }

    fn require_project(&self) -> Result<(), ModelError> {
        self.lock().active().map(|_| ())
    }

    pub fn ping(&self, _params: Empty) -> Result<Empty, ModelError> {
        tracing::debug!("ping");
        Ok(Empty {})
    }

    pub fn all_of(&self, params: AllOfParams) -> Result<ElementsResponse, ModelError> {
        tracing::debug!(type_name = ?params.type_name, root = ?params.root_element_hyperlink, exact = params.only_exact_type, "all_of");
        self.read(|project| {
            let metamodel = project.metamodel();
            let filter = match params.type_name.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
                Some(name) => Some(catalog::resolve_one(metamodel.as_ref(), name)?),
                None => None,
            };
            let root = resolve_root(project, params.root_element_hyperlink.as_deref())?;

            let codec = Codec::new(project);
            let elements = project
                .all_contents(&root)
                .iter()
                .filter(|id| {
                    let Some(object) = project.object(id) else {
                        return false;
                    };
                    match filter {
                        None => true,
                        Some(class) if params.only_exact_type => object.class() == class,
                        Some(class) => metamodel.is_kind_of(object.class(), class),
                    }
                })
                .map(|id| codec.element(id))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ElementsResponse { elements })
        })
    }

    pub fn get_feature_value(&self, params: GetFeatureValueParams) -> Result<ValueResponse, ModelError> {
        tracing::debug!(element = %params.element_id, feature = %params.feature_name, "get_feature_value");
        self.read(|project| {
            let id = existing_id(project, &params.element_id)?;
            let codec = Codec::new(project);
            let value = match project.feature_of(&id, &params.feature_name) {
                Ok(feature) => {
                    let raw = project.read(&id, feature)?;
                    codec.encode_feature(&id, feature, raw.as_ref())?
                }
                Err(HostError::NoSuchFeature { feature, type_name }) => match pseudo_feature(project, &id, &feature)? {
                    Some(value) => value,
                    None => {
                        tracing::warn!(feature = %feature, type_name = %type_name, "feature is not defined");
                        Value::NotDefined
                    }
                },
                Err(other) => return Err(other.into()),
            };
            Ok(ValueResponse { value })
        })
    }

    pub fn set_feature_value(&self, params: SetFeatureValueParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.element_id, feature = %params.feature_name, "set_feature_value");
        self.mutate(|project| {
            let id = existing_id(project, &params.element_id)?;
            let feature = project.feature_of(&id, &params.feature_name)?.clone();
            let decoded = Codec::new(project).decode_for_feature(&feature, params.new_value)?;
            match (feature.is_many(), decoded) {
                (true, Decoded::Many(items)) => project.replace_list(&id, &feature, items)?,
                (true, Decoded::Unset) => project.replace_list(&id, &feature, Vec::new())?,
                (true, Decoded::Single(_)) => {
                    return Err(ModelError::invalid(format!(
                        "feature `{}` is many-valued and needs a collection value",
                        feature.name()
                    )))
                }
                (false, Decoded::Single(value)) => {
                    project.set(&id, &feature, Some(value))?;
                }
                (false, Decoded::Unset) => {
                    project.set(&id, &feature, None)?;
                }
                (false, Decoded::Many(_)) => {
                    return Err(ModelError::invalid(format!(
                        "feature `{}` is single-valued and cannot take a collection",
                        feature.name()
                    )))
                }
            }
            Ok(Empty {})
        })
    }

    /// Type metadata needs no open project: it is answered from the metamodel alone.
    pub fn get_type(&self, params: GetTypeParams) -> Result<TypeResponse, ModelError> {
        tracing::debug!(type_name = %params.type_name, "get_type");
        let metamodel = self.metamodel.as_ref();
        let id = catalog::resolve_one(metamodel, &params.type_name)?;
        Ok(TypeResponse { descriptor: catalog::describe(metamodel, id) })
    }

    pub fn get_enumeration_value(
        &self,
        params: GetEnumerationValueParams,
    ) -> Result<EnumerationValueResponse, ModelError> {
        tracing::debug!(enumeration = %params.enumeration, label = %params.label, "get_enumeration_value");
        let metamodel = self.metamodel.as_ref();
        let candidates: Vec<ClassifierId> = catalog::resolve(metamodel, &params.enumeration)
            .candidates()
            .iter()
            .copied()
            .filter(|id| metamodel.classifier(*id).is_some_and(|c| c.as_enumeration().is_some()))
            .collect();
        if candidates.is_empty() {
            return Err(ModelError::TypeNotFound {
                type_name: params.enumeration.clone(),
                suggestion: catalog::suggest(metamodel, &params.enumeration),
            });
        }
        if candidates.len() > 1 {
            let names: Vec<String> = candidates.iter().map(|id| metamodel.qualified_name(*id)).collect();
            tracing::warn!(enumeration = %params.enumeration, candidates = ?names, "ambiguous enumeration name");
        }

        let literal: Option<EnumerationLiteral> = candidates.iter().find_map(|id| {
            let def = metamodel.classifier(*id)?.as_enumeration()?;
            def.by_name(&params.label).or_else(|| def.by_literal(&params.label)).cloned()
        });
        literal.map(|literal| EnumerationValueResponse { literal }).ok_or_else(|| {
            ModelError::invalid(format!(
                "could not find enumeration value `{}` in `{}`",
                params.label, params.enumeration
            ))
        })
    }

    pub fn get_element_by_id(&self, params: ElementIdParams) -> Result<ElementResponse, ModelError> {
        tracing::debug!(element = %params.element_id, "get_element_by_id");
        self.read(|project| {
            let id = existing_id(project, &params.element_id)?;
            Ok(ElementResponse { element: Codec::new(project).element(&id)? })
        })
    }

    pub fn create_instance(&self, params: CreateInstanceParams) -> Result<ElementResponse, ModelError> {
        tracing::debug!(type_name = %params.type_name, root = ?params.root_element_hyperlink, "create_instance");
        let factory = Arc::clone(&self.factory);
        self.mutate(|project| {
            let metamodel = Arc::clone(project.metamodel());
            let class = catalog::resolve_one(metamodel.as_ref(), &params.type_name)?;
            let not_instantiable = |detail: String| ModelError::TypeNotInstantiable {
                type_name: params.type_name.clone(),
                detail,
            };
            match metamodel.classifier(class).map(|c| c.def()) {
                Some(ClassifierDef::Class(def)) if def.is_abstract() => {
                    return Err(not_instantiable(format!("{} is abstract", metamodel.qualified_name(class))));
                }
                Some(ClassifierDef::Class(_)) => {}
                _ => return Err(not_instantiable(format!("{} is not a class", metamodel.qualified_name(class)))),
            }

            // Resolve the container before creating anything so a bad locator leaves no trace.
            let parent = match params.root_element_hyperlink.as_deref() {
                Some(locator) if !locator.trim().is_empty() => Some(resolve_root(project, Some(locator))?),
                _ => project.primary_model().cloned(),
            };

            let id = factory
                .create(project, class)
                .ok_or_else(|| not_instantiable("no constructor is registered for this type".to_owned()))??;

            if let Some(parent) = parent {
                match project.attach(&parent, &id) {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::debug!(element = %id, parent = %parent, "no containment feature fits; instance left detached");
                    }
                    Err(err) => {
                        if let Err(rollback) = project.delete(&id) {
                            tracing::warn!(element = %id, parent = %parent, error = %rollback, "rollback of failed create left the instance detached");
                            return Err(ModelError::Internal(format!(
                                "attaching `{id}` under `{parent}` failed ({err}) and removing it again failed ({rollback})"
                            )));
                        }
                        return Err(err.into());
                    }
                }
            }
            Ok(ElementResponse { element: Codec::new(project).element(&id)? })
        })
    }

    pub fn delete_instance(&self, params: ElementIdParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.element_id, "delete_instance");
        self.mutate(|project| {
            let id = existing_id(project, &params.element_id)?;
            project.delete(&id)?;
            Ok(Empty {})
        })
    }

    pub fn open_session(&self, params: OpenSessionParams) -> Result<Empty, ModelError> {
        self.require_project()?;
        self.session.transition(true, || {
            let mut workspace = self.lock();
            let (location, loaded) = workspace.active()?;
            let snapshot = Snapshot { location: location.to_owned(), project: loaded.project.clone() };
            workspace.snapshot = Some(snapshot);
            Ok::<_, ModelError>(())
        })?;
        tracing::debug!(description = %params.description, "session opened");
        Ok(Empty {})
    }

    /// Confirms the open session; its changes are kept.
    pub fn close_session(&self) -> Result<Empty, ModelError> {
        self.require_project()?;
        self.session.transition(false, || {
            self.lock().snapshot = None;
            Ok::<_, ModelError>(())
        })?;
        tracing::debug!("session closed");
        Ok(Empty {})
    }

    /// Rolls the project back to its state when the session was opened.
    pub fn cancel_session(&self) -> Result<Empty, ModelError> {
        self.require_project()?;
        self.session.transition(false, || {
            let mut workspace = self.lock();
            if let Some(snapshot) = workspace.snapshot.take() {
                if let Some(loaded) = workspace.projects.get_mut(&snapshot.location) {
                    loaded.project = snapshot.project;
                }
            }
            Ok::<_, ModelError>(())
        })?;
        tracing::debug!("session cancelled");
        Ok(Empty {})
    }

    pub fn list_size(&self, params: ListParams) -> Result<ListSizeResponse, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, "list_size");
        self.read(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let len = project.list_items(&id, &feature)?.len();
            let size = u32::try_from(len).map_err(|_| ModelError::Internal(format!("list of {len} items")))?;
            Ok(ListSizeResponse { size })
        })
    }

    pub fn list_get(&self, params: ListPositionParams) -> Result<ValueResponse, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, position = params.position, "list_get");
        self.read(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let items = project.list_items(&id, &feature)?;
            let item = items.get(params.position as usize).ok_or_else(|| out_of_bounds(params.position, items.len()))?;
            Ok(ValueResponse { value: Codec::new(project).encode(item)? })
        })
    }

    /// Replaces the item at a position and returns the item it replaced.
    pub fn list_set(&self, params: ListPositionValueParams) -> Result<ValueResponse, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, position = params.position, "list_set");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let item = Codec::new(project).decode_item(&feature, params.value)?;
            let previous = project.list_set(&id, &feature, params.position as usize, item)?;
            Ok(ValueResponse { value: Codec::new(project).encode(&previous)? })
        })
    }

    pub fn list_add(&self, params: ListPositionValueParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, position = params.position, "list_add");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let item = Codec::new(project).decode_item(&feature, params.value)?;
            project.list_insert(&id, &feature, Some(params.position as usize), item)?;
            Ok(Empty {})
        })
    }

    /// Adds at the end without the caller having to know the size.
    pub fn list_append(&self, params: ListValueParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, "list_append");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let item = Codec::new(project).decode_item(&feature, params.value)?;
            project.list_insert(&id, &feature, None, item)?;
            Ok(Empty {})
        })
    }

    pub fn list_remove(&self, params: ListPositionParams) -> Result<ValueResponse, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, position = params.position, "list_remove");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let removed = project.list_remove(&id, &feature, params.position as usize)?;
            Ok(ValueResponse { value: Codec::new(project).encode(&removed)? })
        })
    }

    /// Moves the item equal to `value` to `position`.
    pub fn list_move(&self, params: ListPositionValueParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, position = params.position, "list_move");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            let item = Codec::new(project).decode_item(&feature, params.value)?;
            project.list_move(&id, &feature, params.position as usize, &item)?;
            Ok(Empty {})
        })
    }

    pub fn list_clear(&self, params: ListParams) -> Result<Empty, ModelError> {
        tracing::debug!(element = %params.list.element_id, feature = %params.list.feature_name, "list_clear");
        self.mutate(|project| {
            let (id, feature) = list_target(project, &params.list)?;
            project.list_clear(&id, &feature)?;
            Ok(Empty {})
        })
    }

    /// Opens the project at `file_url`, or merely activates it when it is already loaded.
    pub fn open_project(&self, params: ProjectLocationParams) -> Result<ProjectResponse, ModelError> {
        tracing::debug!(location = %params.file_url, "open_project");
        let file = ProjectFile::from_location(&params.file_url)?.with_durability(self.durability);
        let location = file.location();
        {
            let mut workspace = self.lock();
            if let Some(loaded) = workspace.projects.get(&location) {
                let response = ProjectResponse { name: loaded.project.name().to_owned(), file_url: location.clone() };
                workspace.active = Some(location);
                return Ok(response);
            }
        }
        if !file.exists() {
            return Err(ModelError::invalid(format!("no project file at `{}`", file.path().display())));
        }
        let project = file.load(Arc::clone(&self.metamodel))?;

        let mut workspace = self.lock();
        // A concurrent open may have won; keep the first copy.
        let loaded = workspace
            .projects
            .entry(location.clone())
            .or_insert(LoadedProject { project, file: Some(file) });
        let response = ProjectResponse { name: loaded.project.name().to_owned(), file_url: location.clone() };
        workspace.active = Some(location);
        tracing::info!(project = %response.name, location = %response.file_url, "project opened");
        Ok(response)
    }

    /// Closes the active project. An editing session on it is cancelled.
    pub fn close_project(&self) -> Result<Empty, ModelError> {
        let location = {
            let workspace = self.lock();
            let (location, _) = workspace.active()?;
            location.to_owned()
        };
        let owns_session = self.lock().session_owner() == Some(location.as_str());
        if owns_session {
            self.session.ensure_closed(|| {
                self.lock().snapshot = None;
                Ok::<_, ModelError>(())
            })?;
        }
        let mut workspace = self.lock();
        workspace.projects.remove(&location);
        if workspace.active.as_deref() == Some(location.as_str()) {
            workspace.active = None;
        }
        tracing::info!(location = %location, "project closed");
        Ok(Empty {})
    }

    pub fn save_project(&self) -> Result<ProjectResponse, ModelError> {
        let workspace = self.lock();
        let (location, loaded) = workspace.active()?;
        let Some(file) = &loaded.file else {
            return Err(ModelError::PreconditionFailed(format!(
                "project `{}` has no file location",
                loaded.project.name()
            )));
        };
        file.save(&loaded.project)?;
        tracing::info!(location = %location, "project saved");
        Ok(ProjectResponse { name: loaded.project.name().to_owned(), file_url: location.to_owned() })
    }
}

fn parse_id(raw: &str) -> Result<ElementId, ModelError> {
    ElementId::new(raw).map_err(|_| ModelError::element_not_found(raw))
}

fn existing_id(project: &Project, raw: &str) -> Result<ElementId, ModelError> {
    let id = parse_id(raw)?;
    if project.object(&id).is_none() {
        return Err(ModelError::element_not_found(raw));
    }
    Ok(id)
}

fn out_of_bounds(position: u32, len: usize) -> ModelError {
    ModelError::from(HostError::IndexOutOfBounds { index: position as usize, len })
}

fn list_target(project: &Project, handle: &ProxyListHandle) -> Result<(ElementId, crate::model::Feature), ModelError> {
    let id = existing_id(project, &handle.element_id)?;
    let feature = project.feature_of(&id, &handle.feature_name)?.clone();
    if !feature.is_many() {
        return Err(ModelError::invalid(format!(
            "feature `{}` of `{}` is not many-valued",
            feature.name(),
            project.object(&id).map(|o| project.metamodel().name_of(o.class())).unwrap_or_default()
        )));
    }
    Ok((id, feature))
}

/// Resolves a root locator; `None` or an empty locator means the primary model.
fn resolve_root(project: &Project, locator: Option<&str>) -> Result<ElementId, ModelError> {
    let raw = locator.unwrap_or_default();
    let parsed = RootLocator::parse(raw)
        .map_err(|err| ModelError::invalid(format!("invalid root locator `{raw}`: {err}")))?;
    match parsed {
        RootLocator::PrimaryModel => project
            .primary_model()
            .cloned()
            .ok_or_else(|| ModelError::invalid("project has no primary model")),
        RootLocator::Element(id) if project.object(&id).is_some() => Ok(id),
        RootLocator::Element(_) => Err(ModelError::invalid(format!("could not find element with locator `{raw}`"))),
    }
}

fn pseudo_feature(project: &Project, id: &ElementId, name: &str) -> Result<Option<Value>, ModelError> {
    let codec = Codec::new(project);
    let container = project.object(id).and_then(|object| object.container());
    Ok(Some(match name {
        PSEUDO_CONTAINER => match container {
            Some((parent, _)) => Value::ReferenceValue(codec.element(parent)?),
            None => Value::NotSet,
        },
        PSEUDO_CONTAINING_FEATURE => match container {
            Some((_, feature)) => Value::StringValue(feature.to_owned()),
            None => Value::NotSet,
        },
        PSEUDO_CONTENTS => {
            let children: Vec<RawValue> = project.contents(id).into_iter().map(RawValue::Object).collect();
            codec.encode_collection(&children)?
        }
        _ => return Ok(None),
    }))
}

#[cfg(test)]
mod tests;
