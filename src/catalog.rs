// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Type resolution against a namespace registry.
//!
//! Names are either a bare local name (`Class`), matched against every registered namespace,
//! or an absolute path (`uml::Class`, `uml::primitiveTypes::Integer`). A bare name that
//! matches several classifiers is ambiguous: resolution logs a warning and continues with the
//! first match in registry order.

use crate::error::ModelError;
use crate::model::{Classifier, ClassifierDef, ClassifierId, Metamodel, Namespace, NamespaceId};
use crate::protocol::{TypeDescriptor, TypeKind, TypeReference};

pub const PATH_SEPARATOR: &str = "::";

const SUGGESTION_MIN_RATIO: f64 = 0.75;

/// A registry of namespaces and the classifiers they declare.
///
/// The provided methods implement the resolution policy; implementors only expose the
/// registry structure.
pub trait TypeCatalog {
    fn root_namespaces(&self) -> &[NamespaceId];

    fn namespace(&self, id: NamespaceId) -> Option<&Namespace>;

    fn classifier(&self, id: ClassifierId) -> Option<&Classifier>;

    /// Every classifier named `local`, in depth-first registry order.
    fn resolve_by_name(&self, local: &str) -> Vec<ClassifierId> {
        let mut out = Vec::new();
        let mut stack: Vec<NamespaceId> = self.root_namespaces().iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            let Some(namespace) = self.namespace(next) else {
                continue;
            };
            out.extend(
                namespace
                    .classifiers()
                    .iter()
                    .copied()
                    .filter(|id| self.classifier(*id).is_some_and(|c| c.name() == local)),
            );
            stack.extend(namespace.children().iter().rev().copied());
        }
        out
    }

    /// Follows `segments` from the root namespaces; the last segment names the classifier.
    /// Same-named namespaces at any level are all explored, first match in registry order.
    fn resolve_by_qualified_path(&self, segments: &[&str]) -> Option<ClassifierId> {
        let (local, path) = segments.split_last()?;
        let (first, rest) = path.split_first()?;

        let named = |id: &NamespaceId, name: &str| self.namespace(*id).is_some_and(|ns| ns.name() == name);
        let mut frontier: Vec<NamespaceId> =
            self.root_namespaces().iter().copied().filter(|id| named(id, first)).collect();
        for segment in rest {
            frontier = frontier
                .iter()
                .filter_map(|id| self.namespace(*id))
                .flat_map(|ns| ns.children().iter().copied())
                .filter(|id| named(id, segment))
                .collect();
            if frontier.is_empty() {
                return None;
            }
        }
        frontier.iter().filter_map(|id| self.namespace(*id)).find_map(|ns| {
            ns.classifiers().iter().copied().find(|id| self.classifier(*id).is_some_and(|c| c.name() == *local))
        })
    }

    /// `outer::inner::Name`, outermost namespace first.
    fn qualified_name(&self, id: ClassifierId) -> String {
        let Some(classifier) = self.classifier(id) else {
            return String::new();
        };
        let mut parts = vec![classifier.name()];
        let mut cursor = Some(classifier.namespace());
        while let Some(ns_id) = cursor {
            let Some(namespace) = self.namespace(ns_id) else {
                break;
            };
            parts.push(namespace.name());
            cursor = namespace.parent();
        }
        parts.reverse();
        parts.join(PATH_SEPARATOR)
    }

    fn all_qualified_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<NamespaceId> = self.root_namespaces().to_vec();
        while let Some(next) = stack.pop() {
            if let Some(namespace) = self.namespace(next) {
                out.extend(namespace.classifiers().iter().map(|id| self.qualified_name(*id)));
                stack.extend(namespace.children().iter().copied());
            }
        }
        out
    }
}

impl TypeCatalog for Metamodel {
    fn root_namespaces(&self) -> &[NamespaceId] {
        Metamodel::root_namespaces(self)
    }

    fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        Metamodel::namespace(self, id)
    }

    fn classifier(&self, id: ClassifierId) -> Option<&Classifier> {
        Metamodel::classifier(self, id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Missing,
    Unique(ClassifierId),
    Ambiguous(Vec<ClassifierId>),
}

impl Resolution {
    fn from_candidates(mut candidates: Vec<ClassifierId>) -> Self {
        match candidates.len() {
            0 => Self::Missing,
            1 => Self::Unique(candidates.remove(0)),
            _ => Self::Ambiguous(candidates),
        }
    }

    /// The classifier processing continues with: the unique match or the first candidate.
    pub fn first(&self) -> Option<ClassifierId> {
        match self {
            Self::Missing => None,
            Self::Unique(id) => Some(*id),
            Self::Ambiguous(candidates) => candidates.first().copied(),
        }
    }

    pub fn candidates(&self) -> &[ClassifierId] {
        match self {
            Self::Missing => &[],
            Self::Unique(id) => std::slice::from_ref(id),
            Self::Ambiguous(candidates) => candidates,
        }
    }
}

pub fn resolve<C: TypeCatalog + ?Sized>(catalog: &C, name: &str) -> Resolution {
    let name = name.trim();
    if name.is_empty() {
        return Resolution::Missing;
    }
    if name.contains(PATH_SEPARATOR) {
        let segments: Vec<&str> = name.split(PATH_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Resolution::Missing;
        }
        return match catalog.resolve_by_qualified_path(&segments) {
            Some(id) => Resolution::Unique(id),
            None => Resolution::Missing,
        };
    }
    Resolution::from_candidates(catalog.resolve_by_name(name))
}

/// Resolves `name` to a single classifier, warning on ambiguity.
pub fn resolve_one<C: TypeCatalog + ?Sized>(catalog: &C, name: &str) -> Result<ClassifierId, ModelError> {
    let resolution = resolve(catalog, name);
    if let Resolution::Ambiguous(candidates) = &resolution {
        let names: Vec<String> = candidates.iter().map(|id| catalog.qualified_name(*id)).collect();
        tracing::warn!(
            type_name = name,
            candidates = ?names,
            "ambiguous type name; using `{}`",
            names.first().map(String::as_str).unwrap_or_default()
        );
    }
    resolution.first().ok_or_else(|| ModelError::TypeNotFound {
        type_name: name.to_owned(),
        suggestion: suggest(catalog, name),
    })
}

/// The closest known qualified name, when one is similar enough to be a likely typo.
pub fn suggest<C: TypeCatalog + ?Sized>(catalog: &C, name: &str) -> Option<String> {
    let needle = name.rsplit(PATH_SEPARATOR).next().unwrap_or(name).to_ascii_lowercase();
    catalog
        .all_qualified_names()
        .into_iter()
        .map(|candidate| {
            let local = candidate.rsplit(PATH_SEPARATOR).next().unwrap_or(&candidate).to_ascii_lowercase();
            let ratio = rapidfuzz::fuzz::ratio(needle.chars(), local.chars());
            (candidate, ratio)
        })
        .filter(|(_, ratio)| *ratio >= SUGGESTION_MIN_RATIO)
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(candidate, _)| candidate)
}

/// Describes a classifier by its qualified name, kind and transitive supertypes (nearest
/// first), each supertype as a reference rather than a nested descriptor.
pub fn describe(metamodel: &Metamodel, id: ClassifierId) -> TypeDescriptor {
    let (kind, is_abstract) = match metamodel.classifier(id).map(|c| c.def()) {
        Some(ClassifierDef::Class(def)) => (TypeKind::Class, def.is_abstract()),
        Some(ClassifierDef::Enumeration(_)) => (TypeKind::Enumeration, false),
        _ => (TypeKind::DataType, false),
    };
    TypeDescriptor {
        metamodel_uri: metamodel.namespace_uri(id).to_owned(),
        type_name: metamodel.qualified_name(id),
        kind,
        is_abstract,
        all_supertypes: metamodel
            .all_supertypes(id)
            .into_iter()
            .map(|sup| TypeReference {
                metamodel_uri: metamodel.namespace_uri(sup).to_owned(),
                type_name: metamodel.qualified_name(sup),
            })
            .collect(),
    }
}
