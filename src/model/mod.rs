// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Host-side data model.
//!
//! A metamodel describes namespaces, classifiers and features; projects hold the typed object
//! graph that the service exposes to remote clients.

pub mod fixtures;
pub mod float;
pub mod ids;
pub mod locator;
pub mod metamodel;
pub mod project;
pub mod value;

pub use ids::{ElementId, Id, IdError};
pub use locator::{ParseLocatorError, RootLocator};
pub use metamodel::{
    ClassDef, Classifier, ClassifierDef, ClassifierId, Derivation, EnumerationDef, Feature,
    FeatureType, Metamodel, MetamodelBuilder, MetamodelError, Namespace, NamespaceId,
};
pub use project::{HostError, ModelObject, Project};
pub use value::{EnumerationLiteral, RawValue, Scalar, ScalarKind};
