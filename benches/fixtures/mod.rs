// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use modelwire::model::Project;
use modelwire::protocol::{
    CreateInstanceParams, OpenSessionParams, SetFeatureValueParams, Value,
};
use modelwire::service::ModelAccessService;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("modelwire-bench-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// The zoo as shipped.
    Zoo,
    /// The zoo plus 1 000 named classes under the primary model.
    ZooWide,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Zoo => "zoo",
            Self::ZooWide => "zoo_wide",
        }
    }

    const fn extra_classes(self) -> usize {
        match self {
            Self::Zoo => 0,
            Self::ZooWide => 1_000,
        }
    }
}

/// Demo service holding the project for `case`, with no session open.
pub fn service(case: Case) -> ModelAccessService {
    let service = ModelAccessService::demo().expect("demo service");
    let extra = case.extra_classes();
    if extra == 0 {
        return service;
    }

    service.open_session(OpenSessionParams { description: "bench fixture".into() }).expect("open session");
    for index in 0..extra {
        let created = service
            .create_instance(CreateInstanceParams { type_name: "Class".into(), root_element_hyperlink: None })
            .expect("create class")
            .element;
        service
            .set_feature_value(SetFeatureValueParams {
                element_id: created.element_id,
                feature_name: "name".into(),
                new_value: Value::StringValue(format!("Generated{index:04}")),
            })
            .expect("name class");
    }
    service.close_session().expect("close session");
    service
}

pub fn project(case: Case) -> Project {
    service(case).with_active_project(Project::clone).expect("active project")
}
