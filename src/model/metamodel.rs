// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The host metamodel: namespaces, classifiers and their features.
//!
//! A [`Metamodel`] is immutable once built. Classifiers and namespaces are addressed by small
//! copyable ids that index into arenas, so descriptors can be shared freely between the type
//! resolver, the codec and the project store.

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::value::{EnumerationLiteral, ScalarKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassifierId(u32);

impl NamespaceId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl ClassifierId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    name: SmolStr,
    uri: String,
    parent: Option<NamespaceId>,
    children: Vec<NamespaceId>,
    classifiers: Vec<ClassifierId>,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn children(&self) -> &[NamespaceId] {
        &self.children
    }

    pub fn classifiers(&self) -> &[ClassifierId] {
        &self.classifiers
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    name: SmolStr,
    namespace: NamespaceId,
    def: ClassifierDef,
}

impl Classifier {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    pub fn def(&self) -> &ClassifierDef {
        &self.def
    }

    pub fn as_class(&self) -> Option<&ClassDef> {
        match &self.def {
            ClassifierDef::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&EnumerationDef> {
        match &self.def {
            ClassifierDef::Enumeration(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    /// Only classes can be abstract; enumerations and data types never are.
    pub fn is_abstract(&self) -> bool {
        self.as_class().is_some_and(|class| class.is_abstract)
    }
}

#[derive(Debug, Clone)]
pub enum ClassifierDef {
    Class(ClassDef),
    Enumeration(EnumerationDef),
    DataType(ScalarKind),
}

#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    is_abstract: bool,
    supertypes: SmallVec<[ClassifierId; 2]>,
    features: Vec<Feature>,
}

impl ClassDef {
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Direct supertypes in declaration order.
    pub fn supertypes(&self) -> &[ClassifierId] {
        &self.supertypes
    }

    /// Features declared on this class only.
    pub fn own_features(&self) -> &[Feature] {
        &self.features
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumerationDef {
    literals: Vec<EnumerationLiteral>,
}

impl EnumerationDef {
    pub fn literals(&self) -> &[EnumerationLiteral] {
        &self.literals
    }

    /// Looks a literal up by display name.
    pub fn by_name(&self, name: &str) -> Option<&EnumerationLiteral> {
        self.literals.iter().find(|literal| literal.name == name)
    }

    /// Looks a literal up by its literal text.
    pub fn by_literal(&self, literal: &str) -> Option<&EnumerationLiteral> {
        self.literals.iter().find(|candidate| candidate.literal == literal)
    }

    pub fn default_literal(&self) -> Option<&EnumerationLiteral> {
        self.literals.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    Scalar(ScalarKind),
    Enumeration(ClassifierId),
    Reference { target: ClassifierId, containment: bool },
}

/// How a derived feature computes its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Every object directly contained by the owner.
    Contents,
    /// Follow reference `via`, then collect reference `then` from each hop.
    Collect { via: SmolStr, then: SmolStr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    name: SmolStr,
    ty: FeatureType,
    many: bool,
    changeable: bool,
    derivation: Option<Derivation>,
}

impl Feature {
    pub fn attribute(name: &str, kind: ScalarKind) -> Self {
        Self::new(name, FeatureType::Scalar(kind))
    }

    pub fn enumeration(name: &str, enumeration: ClassifierId) -> Self {
        Self::new(name, FeatureType::Enumeration(enumeration))
    }

    pub fn reference(name: &str, target: ClassifierId) -> Self {
        Self::new(name, FeatureType::Reference { target, containment: false })
    }

    pub fn containment(name: &str, target: ClassifierId) -> Self {
        Self::new(name, FeatureType::Reference { target, containment: true })
    }

    fn new(name: &str, ty: FeatureType) -> Self {
        Self { name: SmolStr::new(name), ty, many: false, changeable: true, derivation: None }
    }

    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    /// Derived features are computed on read and never changeable.
    pub fn derived(mut self, derivation: Derivation) -> Self {
        self.derivation = Some(derivation);
        self.changeable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> FeatureType {
        self.ty
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    pub fn is_changeable(&self) -> bool {
        self.changeable
    }

    pub fn derivation(&self) -> Option<&Derivation> {
        self.derivation.as_ref()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.ty, FeatureType::Reference { .. })
    }

    pub fn is_containment(&self) -> bool {
        matches!(self.ty, FeatureType::Reference { containment: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetamodelError {
    #[error("features can only be declared on classes, `{0}` is not a class")]
    NotAClass(String),
    #[error("duplicate feature `{feature}` on `{class}`")]
    DuplicateFeature { class: String, feature: String },
    #[error("duplicate classifier `{0}`")]
    DuplicateClassifier(String),
}

#[derive(Debug, Clone, Default)]
pub struct Metamodel {
    namespaces: Vec<Namespace>,
    roots: Vec<NamespaceId>,
    classifiers: Vec<Classifier>,
}

impl Metamodel {
    pub fn builder() -> MetamodelBuilder {
        MetamodelBuilder::default()
    }

    pub fn root_namespaces(&self) -> &[NamespaceId] {
        &self.roots
    }

    pub fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.get(id.index())
    }

    pub fn classifier(&self, id: ClassifierId) -> Option<&Classifier> {
        self.classifiers.get(id.index())
    }

    pub fn classifier_ids(&self) -> impl Iterator<Item = ClassifierId> + '_ {
        (0..self.classifiers.len()).map(|index| ClassifierId(index as u32))
    }

    pub fn class_def(&self, id: ClassifierId) -> Option<&ClassDef> {
        self.classifier(id).and_then(Classifier::as_class)
    }

    pub fn name_of(&self, id: ClassifierId) -> &str {
        self.classifier(id).map(Classifier::name).unwrap_or("<unknown>")
    }

    /// URI of the namespace declaring `id`.
    pub fn namespace_uri(&self, id: ClassifierId) -> &str {
        self.classifier(id)
            .and_then(|classifier| self.namespace(classifier.namespace))
            .map(Namespace::uri)
            .unwrap_or_default()
    }

    /// All transitive supertypes of `id`, nearest first, each listed once. `id` itself is not
    /// included.
    pub fn all_supertypes(&self, id: ClassifierId) -> Vec<ClassifierId> {
        let mut out: Vec<ClassifierId> = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        if let Some(class) = self.class_def(id) {
            queue.extend(class.supertypes.iter().copied());
        }
        while let Some(next) = queue.pop_front() {
            if next == id || out.contains(&next) {
                continue;
            }
            out.push(next);
            if let Some(class) = self.class_def(next) {
                queue.extend(class.supertypes.iter().copied());
            }
        }
        out
    }

    pub fn is_kind_of(&self, id: ClassifierId, ancestor: ClassifierId) -> bool {
        id == ancestor || self.all_supertypes(id).contains(&ancestor)
    }

    /// Finds a feature declared on `class` or inherited from one of its supertypes.
    pub fn find_feature(&self, class: ClassifierId, name: &str) -> Option<&Feature> {
        std::iter::once(class)
            .chain(self.all_supertypes(class))
            .filter_map(|id| self.class_def(id))
            .find_map(|def| def.features.iter().find(|feature| feature.name == name))
    }

    /// Every feature available on `class`: inherited ones first (most general type first),
    /// then the class's own. A redeclared name shadows the inherited one.
    pub fn all_features(&self, class: ClassifierId) -> Vec<&Feature> {
        let mut chain = self.all_supertypes(class);
        chain.reverse();
        chain.push(class);

        let mut out: Vec<&Feature> = Vec::new();
        for def in chain.into_iter().filter_map(|id| self.class_def(id)) {
            for feature in &def.features {
                if let Some(slot) = out.iter_mut().find(|existing| existing.name == feature.name) {
                    *slot = feature;
                } else {
                    out.push(feature);
                }
            }
        }
        out
    }
}

/// Incrementally assembles a [`Metamodel`]. Classifiers are declared before features so that
/// features can reference any classifier regardless of declaration order.
#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    model: Metamodel,
    errors: Vec<MetamodelError>,
}

impl MetamodelBuilder {
    pub fn namespace(&mut self, name: &str, uri: &str) -> NamespaceId {
        let id = self.push_namespace(name, uri, None);
        self.model.roots.push(id);
        id
    }

    pub fn nested_namespace(&mut self, parent: NamespaceId, name: &str, uri: &str) -> NamespaceId {
        let id = self.push_namespace(name, uri, Some(parent));
        if let Some(parent) = self.model.namespaces.get_mut(parent.index()) {
            parent.children.push(id);
        }
        id
    }

    fn push_namespace(&mut self, name: &str, uri: &str, parent: Option<NamespaceId>) -> NamespaceId {
        let id = NamespaceId(self.model.namespaces.len() as u32);
        self.model.namespaces.push(Namespace {
            name: SmolStr::new(name),
            uri: uri.to_owned(),
            parent,
            children: Vec::new(),
            classifiers: Vec::new(),
        });
        id
    }

    pub fn class(&mut self, namespace: NamespaceId, name: &str, supertypes: &[ClassifierId]) -> ClassifierId {
        self.push_classifier(
            namespace,
            name,
            ClassifierDef::Class(ClassDef {
                is_abstract: false,
                supertypes: supertypes.iter().copied().collect(),
                features: Vec::new(),
            }),
        )
    }

    pub fn abstract_class(
        &mut self,
        namespace: NamespaceId,
        name: &str,
        supertypes: &[ClassifierId],
    ) -> ClassifierId {
        let id = self.class(namespace, name, supertypes);
        if let Some(ClassifierDef::Class(def)) =
            self.model.classifiers.get_mut(id.index()).map(|c| &mut c.def)
        {
            def.is_abstract = true;
        }
        id
    }

    /// Declares an enumeration whose literals get ordinals in declaration order. Each entry is
    /// `(literal, display name)`.
    pub fn enumeration(
        &mut self,
        namespace: NamespaceId,
        name: &str,
        literals: &[(&str, &str)],
    ) -> ClassifierId {
        let literals = literals
            .iter()
            .enumerate()
            .map(|(index, (literal, display))| {
                EnumerationLiteral::new(index as i32, *literal, *display)
            })
            .collect();
        self.push_classifier(namespace, name, ClassifierDef::Enumeration(EnumerationDef { literals }))
    }

    pub fn data_type(&mut self, namespace: NamespaceId, name: &str, kind: ScalarKind) -> ClassifierId {
        self.push_classifier(namespace, name, ClassifierDef::DataType(kind))
    }

    fn push_classifier(&mut self, namespace: NamespaceId, name: &str, def: ClassifierDef) -> ClassifierId {
        let id = ClassifierId(self.model.classifiers.len() as u32);
        if let Some(ns) = self.model.namespaces.get_mut(namespace.index()) {
            let clash = ns
                .classifiers
                .iter()
                .any(|existing| self.model.classifiers[existing.index()].name == name);
            if clash {
                self.errors.push(MetamodelError::DuplicateClassifier(format!("{}::{name}", ns.name)));
            }
            ns.classifiers.push(id);
        }
        self.model.classifiers.push(Classifier { name: SmolStr::new(name), namespace, def });
        id
    }

    pub fn feature(&mut self, class: ClassifierId, feature: Feature) -> &mut Self {
        let Some(classifier) = self.model.classifiers.get_mut(class.index()) else {
            return self;
        };
        let class_name = classifier.name.to_string();
        match &mut classifier.def {
            ClassifierDef::Class(def) => {
                if def.features.iter().any(|existing| existing.name == feature.name) {
                    self.errors.push(MetamodelError::DuplicateFeature {
                        class: class_name,
                        feature: feature.name.to_string(),
                    });
                } else {
                    def.features.push(feature);
                }
            }
            _ => self.errors.push(MetamodelError::NotAClass(class_name)),
        }
        self
    }

    pub fn build(mut self) -> Result<Metamodel, MetamodelError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        Ok(self.model)
    }
}
