// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::catalog::{self, TypeCatalog};
use crate::model::{ElementId, HostError, Metamodel, Project, RawValue};

const PROJECT_FORMAT: u32 = 1;
const FILE_SCHEME: &str = "file://";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid project json at {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("unsupported project format {found} at {}", .path.display())]
    UnsupportedFormat { path: PathBuf, found: u32 },
    #[error("unknown type `{type_name}` in {}", .path.display())]
    UnknownType { path: PathBuf, type_name: String },
    #[error("element `{element_id}` is referenced but not defined in {}", .path.display())]
    DanglingReference { path: PathBuf, element_id: String },
    #[error("duplicate element `{element_id}` in {}", .path.display())]
    DuplicateElement { path: PathBuf, element_id: String },
    #[error("invalid project location `{0}`")]
    InvalidLocation(String),
    #[error("refusing to write through symlink {}", .path.display())]
    SymlinkRefused { path: PathBuf },
    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedProject {
    format: u32,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_model: Option<ElementId>,
    objects: Vec<PersistedObject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedObject {
    id: ElementId,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    read_only: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    slots: BTreeMap<String, RawValue>,
}

/// A project persisted as a single JSON file.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl ProjectFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), durability: WriteDurability::default() }
    }

    /// Accepts `file://` URIs as well as plain paths.
    pub fn from_location(location: &str) -> Result<Self, StoreError> {
        path_from_location(location).map(Self::new)
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical `file://` form of this file's location.
    pub fn location(&self) -> String {
        let absolute = if self.path.is_absolute() {
            self.path.clone()
        } else {
            std::env::current_dir().map(|cwd| cwd.join(&self.path)).unwrap_or_else(|_| self.path.clone())
        };
        format!("{FILE_SCHEME}{}", absolute.to_string_lossy().replace('\\', "/"))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self, metamodel: Arc<Metamodel>) -> Result<Project, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        let persisted: PersistedProject = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        if persisted.format != PROJECT_FORMAT {
            return Err(StoreError::UnsupportedFormat { path: self.path.clone(), found: persisted.format });
        }

        let mut project = Project::new(Arc::clone(&metamodel), persisted.name);
        for object in &persisted.objects {
            let class = catalog::resolve(metamodel.as_ref(), &object.type_name).first().ok_or_else(|| {
                StoreError::UnknownType { path: self.path.clone(), type_name: object.type_name.clone() }
            })?;
            if !project.insert_object(object.id.clone(), class, object.read_only) {
                return Err(StoreError::DuplicateElement {
                    path: self.path.clone(),
                    element_id: object.id.to_string(),
                });
            }
        }
        for object in persisted.objects {
            for (feature, value) in object.slots {
                if let Some(missing) = value.referenced_ids().into_iter().find(|id| project.object(id).is_none()) {
                    return Err(StoreError::DanglingReference {
                        path: self.path.clone(),
                        element_id: missing.to_string(),
                    });
                }
                project.init_slot(&object.id, &feature, value)?;
            }
        }
        if let Some(primary) = persisted.primary_model {
            project.set_primary_model(primary)?;
        }
        project.relink_containment();
        Ok(project)
    }

    pub fn save(&self, project: &Project) -> Result<(), StoreError> {
        let metamodel = project.metamodel();
        let persisted = PersistedProject {
            format: PROJECT_FORMAT,
            name: project.name().to_owned(),
            primary_model: project.primary_model().cloned(),
            objects: project
                .objects()
                .map(|object| PersistedObject {
                    id: object.id().clone(),
                    type_name: metamodel.qualified_name(object.class()),
                    read_only: object.is_read_only(),
                    slots: object.slots().iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
                })
                .collect(),
        };
        let mut json = serde_json::to_vec_pretty(&persisted)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        json.push(b'\n');
        write_atomic(&self.path, &json, self.durability)
    }
}

/// Resolves a project location (`file://` URI or plain path) to a filesystem path.
pub fn path_from_location(location: &str) -> Result<PathBuf, StoreError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(StoreError::InvalidLocation(location.to_owned()));
    }
    let Some(rest) = location.strip_prefix(FILE_SCHEME) else {
        if location.contains("://") {
            return Err(StoreError::InvalidLocation(location.to_owned()));
        }
        return Ok(PathBuf::from(location));
    };
    // `file://localhost/x` and `file:///x` both name `/x`.
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    let decoded = percent_decode(rest).ok_or_else(|| StoreError::InvalidLocation(location.to_owned()))?;
    let bytes = decoded.as_bytes();
    // `/C:/x` on Windows.
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
        return Ok(PathBuf::from(&decoded[1..]));
    }
    if decoded.is_empty() {
        return Err(StoreError::InvalidLocation(location.to_owned()));
    }
    Ok(PathBuf::from(decoded))
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| StoreError::Io { path: parent.clone(), source })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    }

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io { path: path.to_path_buf(), source: io::Error::other("path has no file name") });
    };

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(".modelwire.tmp.{}.{}", file_name.to_string_lossy(), nanos));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    file.write_all(contents).map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(&parent).map_err(|source| StoreError::Io { path: parent.clone(), source })?;
            dir.sync_all().map_err(|source| StoreError::Io { path: parent.clone(), source })?;
        }
    }

    Ok(())
}
