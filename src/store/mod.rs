// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for projects on disk.
//!
//! A project is stored as one JSON file; writes go through a temp file and an atomic rename.

pub mod project_file;

pub use project_file::{path_from_location, ProjectFile, StoreError, WriteDurability};
