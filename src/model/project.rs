// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The host object store.
//!
//! A [`Project`] is a named set of [`ModelObject`]s typed by classifiers of a shared
//! [`Metamodel`]. Objects form a containment tree rooted at the primary model; the store keeps
//! every object's container link consistent with the containment features of its parent.

use std::collections::BTreeMap;
use std::sync::Arc;

use smol_str::SmolStr;

use super::metamodel::{ClassifierId, Derivation, Feature, FeatureType, Metamodel};
use super::value::RawValue;
use super::ElementId;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    id: ElementId,
    class: ClassifierId,
    slots: BTreeMap<SmolStr, RawValue>,
    container: Option<(ElementId, SmolStr)>,
    read_only: bool,
}

impl ModelObject {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn class(&self) -> ClassifierId {
        self.class
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The containing object and the name of the containment feature holding this object.
    pub fn container(&self) -> Option<(&ElementId, &str)> {
        self.container.as_ref().map(|(id, feature)| (id, feature.as_str()))
    }

    pub fn slots(&self) -> &BTreeMap<SmolStr, RawValue> {
        &self.slots
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("element `{0}` does not exist")]
    NoSuchElement(ElementId),
    #[error("element `{0}` is read-only")]
    ReadOnly(ElementId),
    #[error("feature `{feature}` is not defined on `{type_name}`")]
    NoSuchFeature { feature: String, type_name: String },
    #[error("feature `{feature}` of `{type_name}` cannot be modified")]
    Unsupported { feature: String, type_name: String },
    #[error("feature `{feature}` of `{type_name}` is not many-valued")]
    NotMany { feature: String, type_name: String },
    #[error("feature `{feature}` of `{type_name}` is many-valued")]
    NotSingle { feature: String, type_name: String },
    #[error("index {index} is out of bounds for a list of size {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("value is not an element of `{feature}`")]
    NotInList { feature: String },
    #[error("{0}")]
    TypeMismatch(String),
    #[error("`{child}` cannot be contained by its own descendant `{parent}`")]
    ContainmentCycle { parent: ElementId, child: ElementId },
}

#[derive(Debug, Clone)]
pub struct Project {
    metamodel: Arc<Metamodel>,
    name: String,
    primary_model: Option<ElementId>,
    objects: BTreeMap<ElementId, ModelObject>,
    next_id: u64,
}

impl Project {
    pub fn new(metamodel: Arc<Metamodel>, name: impl Into<String>) -> Self {
        Self { metamodel, name: name.into(), primary_model: None, objects: BTreeMap::new(), next_id: 1 }
    }

    pub fn metamodel(&self) -> &Arc<Metamodel> {
        &self.metamodel
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_model(&self) -> Option<&ElementId> {
        self.primary_model.as_ref()
    }

    pub fn set_primary_model(&mut self, id: ElementId) -> Result<(), HostError> {
        if !self.objects.contains_key(&id) {
            return Err(HostError::NoSuchElement(id));
        }
        self.primary_model = Some(id);
        Ok(())
    }

    pub fn object(&self, id: &ElementId) -> Option<&ModelObject> {
        self.objects.get(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ModelObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn existing(&self, id: &ElementId) -> Result<&ModelObject, HostError> {
        self.objects.get(id).ok_or_else(|| HostError::NoSuchElement(id.clone()))
    }

    fn type_name(&self, id: &ElementId) -> String {
        self.objects
            .get(id)
            .map(|object| self.metamodel.name_of(object.class).to_owned())
            .unwrap_or_default()
    }

    /// Inserts a detached object with a fresh id.
    pub fn create_object(&mut self, class: ClassifierId) -> ElementId {
        let id = loop {
            let candidate = format!("_mw_{:06x}", self.next_id);
            self.next_id += 1;
            if let Ok(id) = ElementId::new(candidate) {
                if !self.objects.contains_key(&id) {
                    break id;
                }
            }
        };
        self.insert_object(id.clone(), class, false);
        id
    }

    /// Inserts a detached object under a caller-chosen id, replacing nothing.
    pub fn insert_object(&mut self, id: ElementId, class: ClassifierId, read_only: bool) -> bool {
        if self.objects.contains_key(&id) {
            return false;
        }
        self.objects.insert(
            id.clone(),
            ModelObject { id, class, slots: BTreeMap::new(), container: None, read_only },
        );
        true
    }

    /// Writes a slot directly, bypassing changeability checks. Used while constructing and
    /// loading projects; containment links are rebuilt by [`Project::relink_containment`].
    pub fn init_slot(&mut self, id: &ElementId, feature: &str, value: RawValue) -> Result<(), HostError> {
        let object = self.objects.get_mut(id).ok_or_else(|| HostError::NoSuchElement(id.clone()))?;
        object.slots.insert(SmolStr::new(feature), value);
        Ok(())
    }

    /// Recomputes every container link from the containment slots.
    pub fn relink_containment(&mut self) {
        let mut links = Vec::new();
        for object in self.objects.values() {
            for feature in self.metamodel.all_features(object.class) {
                if !feature.is_containment() || feature.derivation().is_some() {
                    continue;
                }
                if let Some(value) = object.slots.get(feature.name()) {
                    for child in value.referenced_ids() {
                        links.push((child.clone(), object.id.clone(), SmolStr::new(feature.name())));
                    }
                }
            }
        }
        for object in self.objects.values_mut() {
            object.container = None;
        }
        for (child, parent, feature) in links {
            if let Some(object) = self.objects.get_mut(&child) {
                object.container = Some((parent, feature));
            }
        }
    }

    pub fn feature_of(&self, id: &ElementId, name: &str) -> Result<&Feature, HostError> {
        let object = self.existing(id)?;
        self.metamodel.find_feature(object.class, name).ok_or_else(|| HostError::NoSuchFeature {
            feature: name.to_owned(),
            type_name: self.metamodel.name_of(object.class).to_owned(),
        })
    }

    /// Direct children in containment-feature order.
    pub fn contents(&self, id: &ElementId) -> Vec<ElementId> {
        let Some(object) = self.objects.get(id) else {
            return Vec::new();
        };
        self.metamodel
            .all_features(object.class)
            .into_iter()
            .filter(|feature| feature.is_containment() && feature.derivation().is_none())
            .filter_map(|feature| object.slots.get(feature.name()))
            .flat_map(|value| value.referenced_ids().into_iter().cloned())
            .collect()
    }

    /// Every object transitively contained by `root`, depth-first pre-order, `root` excluded.
    pub fn all_contents(&self, root: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.contents(root).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            stack.extend(self.contents(&next).into_iter().rev());
            out.push(next);
        }
        out
    }

    fn is_ancestor_or_self(&self, candidate: &ElementId, of: &ElementId) -> bool {
        let mut cursor = Some(of.clone());
        while let Some(current) = cursor {
            if &current == candidate {
                return true;
            }
            cursor = self.objects.get(&current).and_then(|o| o.container.as_ref().map(|(p, _)| p.clone()));
        }
        false
    }

    /// Reads a feature. Many-valued features always yield a list; an unset single-valued
    /// feature yields `None`.
    pub fn read(&self, id: &ElementId, feature: &Feature) -> Result<Option<RawValue>, HostError> {
        let object = self.existing(id)?;
        if let Some(derivation) = feature.derivation() {
            return Ok(Some(self.derive(id, derivation)));
        }
        match object.slots.get(feature.name()) {
            Some(value) => Ok(Some(value.clone())),
            None if feature.is_many() => Ok(Some(RawValue::List(Vec::new()))),
            None => Ok(None),
        }
    }

    fn derive(&self, id: &ElementId, derivation: &Derivation) -> RawValue {
        let ids = match derivation {
            Derivation::Contents => self.contents(id),
            Derivation::Collect { via, then } => self
                .hop(id, via)
                .iter()
                .flat_map(|next| self.hop(next, then))
                .collect(),
        };
        RawValue::List(ids.into_iter().map(RawValue::Object).collect())
    }

    fn hop(&self, id: &ElementId, feature: &str) -> Vec<ElementId> {
        let Ok(feature) = self.feature_of(id, feature) else {
            return Vec::new();
        };
        match self.read(id, feature) {
            Ok(Some(value)) => value.referenced_ids().into_iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn list_items(&self, id: &ElementId, feature: &Feature) -> Result<Vec<RawValue>, HostError> {
        self.require_many(id, feature)?;
        match self.read(id, feature)? {
            Some(RawValue::List(items)) => Ok(items),
            Some(other) => Ok(vec![other]),
            None => Ok(Vec::new()),
        }
    }

    fn require_many(&self, id: &ElementId, feature: &Feature) -> Result<(), HostError> {
        if feature.is_many() {
            Ok(())
        } else {
            Err(HostError::NotMany { feature: feature.name().to_owned(), type_name: self.type_name(id) })
        }
    }

    fn require_changeable(&self, id: &ElementId, feature: &Feature) -> Result<(), HostError> {
        let object = self.existing(id)?;
        if object.read_only {
            return Err(HostError::ReadOnly(id.clone()));
        }
        if !feature.is_changeable() {
            return Err(HostError::Unsupported {
                feature: feature.name().to_owned(),
                type_name: self.type_name(id),
            });
        }
        Ok(())
    }

    fn check_item(&self, owner: &ElementId, feature: &Feature, value: &RawValue) -> Result<(), HostError> {
        match (feature.ty(), value) {
            (FeatureType::Reference { target, containment }, RawValue::Object(child)) => {
                let child_object = self.existing(child)?;
                if !self.metamodel.is_kind_of(child_object.class, target) {
                    return Err(HostError::TypeMismatch(format!(
                        "`{}` expects `{}`, got `{}`",
                        feature.name(),
                        self.metamodel.name_of(target),
                        self.metamodel.name_of(child_object.class)
                    )));
                }
                if containment {
                    if child_object.read_only {
                        return Err(HostError::ReadOnly(child.clone()));
                    }
                    if self.is_ancestor_or_self(child, owner) {
                        return Err(HostError::ContainmentCycle { parent: owner.clone(), child: child.clone() });
                    }
                }
                Ok(())
            }
            (FeatureType::Reference { .. }, other) => Err(HostError::TypeMismatch(format!(
                "`{}` expects an element reference, got {other:?}",
                feature.name()
            ))),
            (_, RawValue::Scalar(_)) => Ok(()),
            (_, other) => Err(HostError::TypeMismatch(format!(
                "`{}` expects a scalar value, got {other:?}",
                feature.name()
            ))),
        }
    }

    /// Removes `child` from wherever it is currently contained.
    fn detach(&mut self, child: &ElementId) {
        let Some((parent, feature)) = self.objects.get_mut(child).and_then(|o| o.container.take()) else {
            return;
        };
        let Some(parent_object) = self.objects.get_mut(&parent) else {
            return;
        };
        let emptied = match parent_object.slots.get_mut(&feature) {
            Some(RawValue::List(items)) => {
                items.retain(|item| item.as_object() != Some(child));
                false
            }
            Some(RawValue::Object(current)) => current == child,
            _ => false,
        };
        if emptied {
            parent_object.slots.remove(&feature);
        }
    }

    fn adopt(&mut self, parent: &ElementId, feature: &Feature, value: &RawValue) {
        if !feature.is_containment() {
            return;
        }
        for child in value.referenced_ids() {
            if let Some(object) = self.objects.get_mut(child) {
                object.container = Some((parent.clone(), SmolStr::new(feature.name())));
            }
        }
    }

    fn release(&mut self, feature: &Feature, value: &RawValue) {
        if !feature.is_containment() {
            return;
        }
        for child in value.referenced_ids() {
            if let Some(object) = self.objects.get_mut(child) {
                object.container = None;
            }
        }
    }

    fn detach_all(&mut self, feature: &Feature, value: &RawValue) {
        if !feature.is_containment() {
            return;
        }
        let children: Vec<ElementId> = value.referenced_ids().into_iter().cloned().collect();
        for child in &children {
            self.detach(child);
        }
    }

    /// Writes a single-valued feature, `None` unsets it. Returns the previous value.
    pub fn set(
        &mut self,
        id: &ElementId,
        feature: &Feature,
        value: Option<RawValue>,
    ) -> Result<Option<RawValue>, HostError> {
        self.require_changeable(id, feature)?;
        if feature.is_many() {
            return Err(HostError::NotSingle { feature: feature.name().to_owned(), type_name: self.type_name(id) });
        }
        if let Some(value) = &value {
            self.check_item(id, feature, value)?;
            self.detach_all(feature, value);
        }

        let key = SmolStr::new(feature.name());
        let previous = match self.objects.get_mut(id) {
            Some(object) => match value.clone() {
                Some(value) => object.slots.insert(key, value),
                None => object.slots.remove(&key),
            },
            None => return Err(HostError::NoSuchElement(id.clone())),
        };
        if let Some(previous) = &previous {
            self.release(feature, previous);
        }
        if let Some(value) = &value {
            self.adopt(id, feature, value);
        }
        Ok(previous)
    }

    /// Replaces the whole contents of a many-valued feature: clear, then bulk insert.
    pub fn replace_list(&mut self, id: &ElementId, feature: &Feature, items: Vec<RawValue>) -> Result<(), HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        for item in &items {
            self.check_item(id, feature, item)?;
        }
        self.list_clear(id, feature)?;
        for item in items {
            self.list_insert(id, feature, None, item)?;
        }
        Ok(())
    }

    fn list_mut(&mut self, id: &ElementId, feature: &Feature) -> Result<&mut Vec<RawValue>, HostError> {
        let object = self.objects.get_mut(id).ok_or_else(|| HostError::NoSuchElement(id.clone()))?;
        let slot = object
            .slots
            .entry(SmolStr::new(feature.name()))
            .or_insert_with(|| RawValue::List(Vec::new()));
        if !matches!(slot, RawValue::List(_)) {
            let single = std::mem::replace(slot, RawValue::List(Vec::new()));
            *slot = RawValue::List(vec![single]);
        }
        match slot {
            RawValue::List(items) => Ok(items),
            other => Err(HostError::TypeMismatch(format!(
                "`{}` holds {other:?} instead of a list",
                feature.name()
            ))),
        }
    }

    /// Replaces the item at `index`, returning the previous item.
    pub fn list_set(
        &mut self,
        id: &ElementId,
        feature: &Feature,
        index: usize,
        value: RawValue,
    ) -> Result<RawValue, HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        self.check_item(id, feature, &value)?;
        let len = self.list_items(id, feature)?.len();
        if index >= len {
            return Err(HostError::IndexOutOfBounds { index, len });
        }
        let removed = self.list_remove(id, feature, index)?;
        let index = index.min(self.list_items(id, feature)?.len());
        self.list_insert(id, feature, Some(index), value)?;
        Ok(removed)
    }

    /// Inserts at `index`, or appends when `index` is `None`.
    pub fn list_insert(
        &mut self,
        id: &ElementId,
        feature: &Feature,
        index: Option<usize>,
        value: RawValue,
    ) -> Result<(), HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        self.check_item(id, feature, &value)?;

        let len = self.list_items(id, feature)?.len();
        if let Some(index) = index {
            if index > len {
                return Err(HostError::IndexOutOfBounds { index, len });
            }
        }

        // Re-adding a contained child moves it; account for the slot it vacates.
        let mut index = index;
        if feature.is_containment() {
            if let (Some(child), Some(at)) = (value.as_object(), index) {
                let same_list = self
                    .objects
                    .get(child)
                    .and_then(|o| o.container.as_ref())
                    .is_some_and(|(p, f)| p == id && f == feature.name());
                if same_list {
                    let old = self.list_items(id, feature)?.iter().position(|item| item.as_object() == Some(child));
                    if old.is_some_and(|old| old < at) {
                        index = Some(at - 1);
                    }
                }
            }
            self.detach_all(feature, &value);
        }

        let items = self.list_mut(id, feature)?;
        match index {
            Some(at) => items.insert(at.min(items.len()), value.clone()),
            None => items.push(value.clone()),
        }
        self.adopt(id, feature, &value);
        Ok(())
    }

    pub fn list_remove(&mut self, id: &ElementId, feature: &Feature, index: usize) -> Result<RawValue, HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        let items = self.list_mut(id, feature)?;
        if index >= items.len() {
            return Err(HostError::IndexOutOfBounds { index, len: items.len() });
        }
        let removed = items.remove(index);
        self.release(feature, &removed);
        Ok(removed)
    }

    /// Moves an existing item, found by value, to `new_index`.
    pub fn list_move(
        &mut self,
        id: &ElementId,
        feature: &Feature,
        new_index: usize,
        value: &RawValue,
    ) -> Result<(), HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        let items = self.list_mut(id, feature)?;
        let len = items.len();
        let Some(old_index) = items.iter().position(|item| item == value) else {
            return Err(HostError::NotInList { feature: feature.name().to_owned() });
        };
        if new_index >= len {
            return Err(HostError::IndexOutOfBounds { index: new_index, len });
        }
        let item = items.remove(old_index);
        items.insert(new_index, item);
        Ok(())
    }

    pub fn list_clear(&mut self, id: &ElementId, feature: &Feature) -> Result<(), HostError> {
        self.require_changeable(id, feature)?;
        self.require_many(id, feature)?;
        let items = std::mem::take(self.list_mut(id, feature)?);
        for item in &items {
            self.release(feature, item);
        }
        Ok(())
    }

    /// Finds the first containment feature of `parent` able to hold an instance of `class`.
    pub fn containment_feature_for(&self, parent: &ElementId, class: ClassifierId) -> Option<&Feature> {
        let object = self.objects.get(parent)?;
        self.metamodel.all_features(object.class).into_iter().find(|feature| {
            feature.is_changeable()
                && matches!(feature.ty(), FeatureType::Reference { target, containment: true }
                    if self.metamodel.is_kind_of(class, target))
        })
    }

    /// Adds `child` to the first compatible containment feature of `parent`. Returns `false`
    /// when `parent` has no feature able to hold it.
    pub fn attach(&mut self, parent: &ElementId, child: &ElementId) -> Result<bool, HostError> {
        let class = self.existing(child)?.class;
        let parent_object = self.existing(parent)?;
        if parent_object.read_only {
            return Err(HostError::ReadOnly(parent.clone()));
        }
        let Some(feature) = self.containment_feature_for(parent, class).cloned() else {
            return Ok(false);
        };
        if feature.is_many() {
            self.list_insert(parent, &feature, None, RawValue::Object(child.clone()))?;
        } else {
            self.set(parent, &feature, Some(RawValue::Object(child.clone())))?;
        }
        Ok(true)
    }

    /// Deletes an object with its containment subtree and scrubs references to any of them.
    pub fn delete(&mut self, id: &ElementId) -> Result<(), HostError> {
        let object = self.existing(id)?;
        if object.read_only || self.primary_model.as_ref() == Some(id) {
            return Err(HostError::ReadOnly(id.clone()));
        }
        if let Some((parent, _)) = object.container() {
            if self.objects.get(parent).is_some_and(ModelObject::is_read_only) {
                return Err(HostError::ReadOnly(parent.clone()));
            }
        }
        let mut doomed = self.all_contents(id);
        if let Some(locked) = doomed.iter().find(|d| self.objects.get(*d).is_some_and(ModelObject::is_read_only)) {
            return Err(HostError::ReadOnly(locked.clone()));
        }
        doomed.push(id.clone());

        self.detach(id);
        for gone in &doomed {
            self.objects.remove(gone);
        }
        for object in self.objects.values_mut() {
            object.slots.retain(|_, value| scrub(value, &doomed));
        }
        Ok(())
    }
}

/// Drops references to `doomed` ids. Returns `false` when the whole slot should go.
fn scrub(value: &mut RawValue, doomed: &[ElementId]) -> bool {
    match value {
        RawValue::Object(id) => !doomed.contains(id),
        RawValue::List(items) => {
            items.retain_mut(|item| scrub(item, doomed));
            true
        }
        RawValue::Scalar(_) => true,
    }
}
