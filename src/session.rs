// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing-session gate.
//!
//! `Closed --open--> Open --close|cancel--> Closed`. Illegal transitions are reported, never
//! queued or ignored. Transitions are serialised by a mutex so that two callers racing to open
//! a session see exactly one winner.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session already open")]
    AlreadyOpen,
    #[error("session not open")]
    NotOpen,
}

impl From<SessionError> for crate::error::ModelError {
    fn from(err: SessionError) -> Self {
        Self::PreconditionFailed(err.to_string())
    }
}

#[derive(Debug)]
pub struct SessionState {
    active: Mutex<bool>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self { active: Mutex::new(false) }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> SessionPhase {
        if *self.lock() {
            SessionPhase::Open
        } else {
            SessionPhase::Closed
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Open
    }

    /// Runs `action` while holding the gate and flips to `open` only if `action` succeeds.
    /// Fails with the matching [`SessionError`] when the gate is already in the target phase.
    pub fn transition<E>(&self, open: bool, action: impl FnOnce() -> Result<(), E>) -> Result<(), E>
    where
        E: From<SessionError>,
    {
        let mut active = self.lock();
        match (*active, open) {
            (true, true) => return Err(SessionError::AlreadyOpen.into()),
            (false, false) => return Err(SessionError::NotOpen.into()),
            _ => {}
        }
        action()?;
        *active = open;
        Ok(())
    }

    /// Opens the session unless it is already open. `action` runs only on a real transition.
    pub fn ensure_open<E>(&self, action: impl FnOnce() -> Result<(), E>) -> Result<bool, E> {
        let mut active = self.lock();
        if *active {
            return Ok(false);
        }
        action()?;
        *active = true;
        Ok(true)
    }

    /// Closes the session if it is open. `action` runs only on a real transition.
    pub fn ensure_closed<E>(&self, action: impl FnOnce() -> Result<(), E>) -> Result<bool, E> {
        let mut active = self.lock();
        if !*active {
            return Ok(false);
        }
        action()?;
        *active = false;
        Ok(true)
    }
}
