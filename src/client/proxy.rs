// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::Arc;

use super::value::ClientValue;
use super::Link;
use crate::error::ModelError;
use crate::protocol::ProxyListHandle;

fn position(index: usize) -> Result<u32, ModelError> {
    u32::try_from(index).map_err(|_| ModelError::invalid(format!("index {index} is out of range")))
}

/// Live list over one many-valued feature of a remote element.
///
/// Nothing is materialised: every method is one remote call (`move_index` is two). Mutations
/// open the editing session first if this model has none.
#[derive(Clone)]
pub struct ProxyList {
    link: Arc<Link>,
    handle: ProxyListHandle,
}

impl ProxyList {
    pub(super) fn new(link: Arc<Link>, handle: ProxyListHandle) -> Self {
        Self { link, handle }
    }

    pub fn handle(&self) -> &ProxyListHandle {
        &self.handle
    }

    pub fn owner(&self) -> u64 {
        self.link.instance
    }

    pub fn len(&self) -> Result<usize, ModelError> {
        Ok(self.link.api.list_size(&self.handle)? as usize)
    }

    pub fn is_empty(&self) -> Result<bool, ModelError> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: usize) -> Result<ClientValue, ModelError> {
        let value = self.link.api.list_get(&self.handle, position(index)?)?;
        self.link.from_wire(value)
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: impl Into<ClientValue>) -> Result<ClientValue, ModelError> {
        let value = self.link.to_wire(&value.into())?;
        self.link.ensure_session()?;
        let previous = self.link.api.list_set(&self.handle, position(index)?, value)?;
        self.link.from_wire(previous)
    }

    pub fn insert(&self, index: usize, value: impl Into<ClientValue>) -> Result<(), ModelError> {
        let value = self.link.to_wire(&value.into())?;
        self.link.ensure_session()?;
        self.link.api.list_add(&self.handle, position(index)?, value)
    }

    /// Appends without asking for the size first.
    pub fn push(&self, value: impl Into<ClientValue>) -> Result<(), ModelError> {
        let value = self.link.to_wire(&value.into())?;
        self.link.ensure_session()?;
        self.link.api.list_append(&self.handle, value)
    }

    pub fn remove(&self, index: usize) -> Result<ClientValue, ModelError> {
        self.link.ensure_session()?;
        let removed = self.link.api.list_remove(&self.handle, position(index)?)?;
        self.link.from_wire(removed)
    }

    /// Moves the item equal to `value` to `new_index`.
    pub fn move_value(&self, new_index: usize, value: impl Into<ClientValue>) -> Result<(), ModelError> {
        let value = self.link.to_wire(&value.into())?;
        self.link.ensure_session()?;
        self.link.api.list_move(&self.handle, position(new_index)?, value)
    }

    /// Moves the item at `old_index` to `new_index`. The item is read first and then moved by
    /// value, so lists holding equal items move the first of them.
    pub fn move_index(&self, new_index: usize, old_index: usize) -> Result<(), ModelError> {
        let item = self.get(old_index)?;
        self.move_value(new_index, item)
    }

    pub fn clear(&self) -> Result<(), ModelError> {
        self.link.ensure_session()?;
        self.link.api.list_clear(&self.handle)
    }

    pub fn to_vec(&self) -> Result<Vec<ClientValue>, ModelError> {
        self.iter().collect()
    }

    /// Reads the size once, then fetches item by item.
    pub fn iter(&self) -> Iter<'_> {
        Iter { list: self, next: 0, len: None }
    }
}

impl PartialEq for ProxyList {
    fn eq(&self, other: &Self) -> bool {
        self.link.instance == other.link.instance && self.handle == other.handle
    }
}

impl fmt::Debug for ProxyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyList")
            .field("owner", &self.link.instance)
            .field("element_id", &self.handle.element_id)
            .field("feature_name", &self.handle.feature_name)
            .finish()
    }
}

pub struct Iter<'a> {
    list: &'a ProxyList,
    next: usize,
    len: Option<usize>,
}

impl Iterator for Iter<'_> {
    type Item = Result<ClientValue, ModelError>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = match self.len {
            Some(len) => len,
            None => match self.list.len() {
                Ok(len) => *self.len.insert(len),
                Err(err) => {
                    self.len = Some(0);
                    return Some(Err(err));
                }
            },
        };
        if self.next >= len {
            return None;
        }
        let item = self.list.get(self.next);
        self.next += 1;
        Some(item)
    }
}

impl<'a> IntoIterator for &'a ProxyList {
    type Item = Result<ClientValue, ModelError>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
