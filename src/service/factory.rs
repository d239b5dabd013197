// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Element factory: an explicit registration table from classifier to constructor.

use std::collections::BTreeMap;

use crate::model::{ClassifierId, ElementId, FeatureType, HostError, Metamodel, Project, RawValue, Scalar};

/// Builds a new, detached instance of `class` inside `project`.
pub type Constructor = fn(&mut Project, ClassifierId) -> Result<ElementId, HostError>;

#[derive(Debug, Clone, Default)]
pub struct ElementFactory {
    constructors: BTreeMap<ClassifierId, Constructor>,
}

impl ElementFactory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers [`default_constructor`] for every concrete class of `metamodel`.
    pub fn for_metamodel(metamodel: &Metamodel) -> Self {
        let mut factory = Self::empty();
        for id in metamodel.classifier_ids() {
            let concrete = metamodel.class_def(id).is_some_and(|def| !def.is_abstract());
            if concrete {
                factory.register(id, default_constructor);
            }
        }
        factory
    }

    /// Replaces any constructor already registered for `class`.
    pub fn register(&mut self, class: ClassifierId, constructor: Constructor) -> &mut Self {
        self.constructors.insert(class, constructor);
        self
    }

    pub fn unregister(&mut self, class: ClassifierId) -> bool {
        self.constructors.remove(&class).is_some()
    }

    pub fn is_registered(&self, class: ClassifierId) -> bool {
        self.constructors.contains_key(&class)
    }

    /// `None` when no constructor is registered for `class`.
    pub fn create(&self, project: &mut Project, class: ClassifierId) -> Option<Result<ElementId, HostError>> {
        let constructor = self.constructors.get(&class)?;
        Some(constructor(project, class))
    }
}

/// Creates an object with its single-valued enumeration attributes set to their first literal.
pub fn default_constructor(project: &mut Project, class: ClassifierId) -> Result<ElementId, HostError> {
    let metamodel = std::sync::Arc::clone(project.metamodel());
    let id = project.create_object(class);
    for feature in metamodel.all_features(class) {
        if feature.is_many() || feature.derivation().is_some() {
            continue;
        }
        let FeatureType::Enumeration(enumeration) = feature.ty() else {
            continue;
        };
        let literal = metamodel
            .classifier(enumeration)
            .and_then(|c| c.as_enumeration())
            .and_then(|def| def.default_literal())
            .cloned();
        if let Some(literal) = literal {
            project.init_slot(&id, feature.name(), RawValue::Scalar(Scalar::Enum(literal)))?;
        }
    }
    Ok(id)
}
