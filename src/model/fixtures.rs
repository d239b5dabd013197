// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in metamodel and demo project.
//!
//! `uml_metamodel` is a compact UML-flavoured metamodel rooted in a `foundation` namespace;
//! `zoo_project` is a small model over it used by the `--demo` server mode, tests and
//! benchmarks.

use std::sync::Arc;

use super::ids::{ElementId, IdError};
use super::metamodel::{ClassifierId, Derivation, Feature, Metamodel, MetamodelError};
use super::project::{HostError, Project};
use super::value::{EnumerationLiteral, RawValue, Scalar, ScalarKind};

pub const FOUNDATION_URI: &str = "http://www.modelwire.dev/foundation/1.0";
pub const UML_URI: &str = "http://www.omg.org/spec/UML/20161101";
pub const UML_PRIMITIVES_URI: &str = "http://www.omg.org/spec/UML/20161101/PrimitiveTypes";

pub const ZOO_MODEL: &str = "_zoo_model";
pub const ZOO_TEST_PACKAGE: &str = "_zoo_test_package";
pub const ZOO_ANIMAL: &str = "_zoo_animal";
pub const ZOO_LION: &str = "_zoo_lion";
pub const ZOO_ELEPHANT: &str = "_zoo_elephant";
pub const ZOO_KEEPER: &str = "_zoo_keeper";
pub const ZOO_FEEDING_PROTOCOL: &str = "_zoo_feeding_protocol";
pub const ZOO_ANIMAL_AGE: &str = "_zoo_animal_age";
pub const ZOO_ANIMAL_WEIGHT: &str = "_zoo_animal_weight";
pub const ZOO_DIET: &str = "_zoo_diet";
pub const ZOO_PROFILES: &str = "_zoo_profiles";
pub const ZOO_PROFILES_NOTE: &str = "_zoo_profiles_note";

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Metamodel(#[from] MetamodelError),
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Host(#[from] HostError),
}

struct UmlTypes {
    class: ClassifierId,
    comment: ClassifierId,
    enumeration: ClassifierId,
    enumeration_literal: ClassifierId,
    generalization: ClassifierId,
    literal_integer: ClassifierId,
    literal_real: ClassifierId,
    model: ClassifierId,
    package: ClassifierId,
    property: ClassifierId,
    protocol_state_machine: ClassifierId,
    visibility: ClassifierId,
}

fn build_uml() -> Result<(Metamodel, UmlTypes), MetamodelError> {
    let mut b = Metamodel::builder();

    let foundation = b.namespace("foundation", FOUNDATION_URI);
    let md_object = b.abstract_class(foundation, "MDObject", &[]);

    let uml = b.namespace("uml", UML_URI);
    let primitives = b.nested_namespace(uml, "primitiveTypes", UML_PRIMITIVES_URI);
    b.data_type(primitives, "Boolean", ScalarKind::Boolean);
    b.data_type(primitives, "Integer", ScalarKind::Int);
    b.data_type(primitives, "Real", ScalarKind::Double);
    b.data_type(primitives, "String", ScalarKind::String);

    let visibility = b.enumeration(
        uml,
        "VisibilityKind",
        &[("public", "public"), ("private", "private"), ("protected", "protected"), ("package", "package")],
    );

    let element = b.abstract_class(uml, "Element", &[md_object]);
    let comment = b.class(uml, "Comment", &[element]);
    let named = b.abstract_class(uml, "NamedElement", &[element]);
    let packageable = b.abstract_class(uml, "PackageableElement", &[named]);
    let package = b.class(uml, "Package", &[packageable]);
    let model = b.class(uml, "Model", &[package]);
    let classifier = b.abstract_class(uml, "Classifier", &[packageable]);
    let generalization = b.class(uml, "Generalization", &[element]);
    let class = b.class(uml, "Class", &[classifier]);
    let behavior = b.abstract_class(uml, "Behavior", &[class]);
    let state_machine = b.class(uml, "StateMachine", &[behavior]);
    let protocol_state_machine = b.class(uml, "ProtocolStateMachine", &[state_machine]);
    let property = b.class(uml, "Property", &[named]);
    let value_spec = b.abstract_class(uml, "ValueSpecification", &[packageable]);
    let literal_integer = b.class(uml, "LiteralInteger", &[value_spec]);
    let literal_real = b.class(uml, "LiteralReal", &[value_spec]);
    let literal_string = b.class(uml, "LiteralString", &[value_spec]);
    let literal_boolean = b.class(uml, "LiteralBoolean", &[value_spec]);
    let enumeration = b.class(uml, "Enumeration", &[classifier]);
    let enumeration_literal = b.class(uml, "EnumerationLiteral", &[named]);
    b.abstract_class(uml, "ActivityNode", &[named]);

    b.feature(element, Feature::containment("ownedComment", comment).many())
        .feature(element, Feature::reference("ownedElement", element).many().derived(Derivation::Contents));
    b.feature(comment, Feature::attribute("body", ScalarKind::String))
        .feature(comment, Feature::reference("annotatedElement", element).many());
    b.feature(named, Feature::attribute("name", ScalarKind::String))
        .feature(named, Feature::enumeration("visibility", visibility))
        .feature(named, Feature::attribute("keyword", ScalarKind::String).many());
    b.feature(package, Feature::containment("packagedElement", packageable).many());
    b.feature(classifier, Feature::attribute("isAbstract", ScalarKind::Boolean))
        .feature(classifier, Feature::containment("generalization", generalization).many())
        .feature(
            classifier,
            Feature::reference("general", classifier)
                .many()
                .derived(Derivation::Collect { via: "generalization".into(), then: "general".into() }),
        );
    b.feature(generalization, Feature::reference("general", classifier));
    b.feature(class, Feature::attribute("isActive", ScalarKind::Boolean))
        .feature(class, Feature::containment("ownedAttribute", property).many())
        .feature(
            class,
            Feature::reference("superClass", class)
                .many()
                .derived(Derivation::Collect { via: "generalization".into(), then: "general".into() }),
        );
    b.feature(property, Feature::containment("defaultValue", value_spec))
        .feature(property, Feature::attribute("isReadOnly", ScalarKind::Boolean))
        .feature(property, Feature::attribute("lower", ScalarKind::Int))
        .feature(property, Feature::attribute("upper", ScalarKind::Long));
    b.feature(literal_integer, Feature::attribute("value", ScalarKind::Int));
    b.feature(literal_real, Feature::attribute("value", ScalarKind::Double));
    b.feature(literal_string, Feature::attribute("value", ScalarKind::String));
    b.feature(literal_boolean, Feature::attribute("value", ScalarKind::Boolean));
    b.feature(enumeration, Feature::containment("ownedLiteral", enumeration_literal).many());

    let types = UmlTypes {
        class,
        comment,
        enumeration,
        enumeration_literal,
        generalization,
        literal_integer,
        literal_real,
        model,
        package,
        property,
        protocol_state_machine,
        visibility,
    };
    Ok((b.build()?, types))
}

/// The built-in `foundation` + `uml` metamodel.
pub fn uml_metamodel() -> Result<Metamodel, MetamodelError> {
    build_uml().map(|(metamodel, _)| metamodel)
}

struct ZooBuilder {
    project: Project,
}

impl ZooBuilder {
    fn object(
        &mut self,
        id: &str,
        class: ClassifierId,
        slots: Vec<(&str, RawValue)>,
    ) -> Result<ElementId, FixtureError> {
        self.object_with_access(id, class, false, slots)
    }

    fn object_with_access(
        &mut self,
        id: &str,
        class: ClassifierId,
        read_only: bool,
        slots: Vec<(&str, RawValue)>,
    ) -> Result<ElementId, FixtureError> {
        let id = ElementId::new(id)?;
        self.project.insert_object(id.clone(), class, read_only);
        for (feature, value) in slots {
            self.project.init_slot(&id, feature, value)?;
        }
        Ok(id)
    }
}

fn named(name: &str, visibility: &EnumerationLiteral) -> Vec<(&'static str, RawValue)> {
    vec![
        ("name", RawValue::string(name)),
        ("visibility", RawValue::Scalar(Scalar::Enum(visibility.clone()))),
    ]
}

fn refs(ids: &[&ElementId]) -> RawValue {
    RawValue::List(ids.iter().map(|id| RawValue::Object((*id).clone())).collect())
}

/// The zoo demo project: four classes, one protocol state machine, an empty test package, an
/// enumeration and a read-only profile package.
pub fn zoo_project() -> Result<Project, FixtureError> {
    let (metamodel, uml) = build_uml()?;
    let literal = |index: usize| {
        metamodel
            .classifier(uml.visibility)
            .and_then(|c| c.as_enumeration())
            .and_then(|e| e.literals().get(index).cloned())
            .unwrap_or_else(|| EnumerationLiteral::new(index as i32, "", ""))
    };
    let (public, private) = (literal(0), literal(1));

    let mut zoo = ZooBuilder { project: Project::new(Arc::new(metamodel), "zoo") };

    let test_package = zoo.object(ZOO_TEST_PACKAGE, uml.package, named("TestPackage", &public))?;

    let age_default = zoo.object("_zoo_animal_age_default", uml.literal_integer, vec![("value", RawValue::Scalar(Scalar::Int(0)))])?;
    let mut age_slots = named("age", &public);
    age_slots.push(("defaultValue", RawValue::Object(age_default)));
    age_slots.push(("lower", RawValue::Scalar(Scalar::Int(1))));
    age_slots.push(("upper", RawValue::Scalar(Scalar::Long(1))));
    let age = zoo.object(ZOO_ANIMAL_AGE, uml.property, age_slots)?;

    let weight_default = zoo.object("_zoo_animal_weight_default", uml.literal_real, vec![("value", RawValue::Scalar(Scalar::Double(0.0)))])?;
    let mut weight_slots = named("weight", &public);
    weight_slots.push(("defaultValue", RawValue::Object(weight_default)));
    let weight = zoo.object(ZOO_ANIMAL_WEIGHT, uml.property, weight_slots)?;

    let mut animal_slots = named("Animal", &public);
    animal_slots.push(("isAbstract", RawValue::Scalar(Scalar::Boolean(true))));
    animal_slots.push(("ownedAttribute", refs(&[&age, &weight])));
    let animal = zoo.object(ZOO_ANIMAL, uml.class, animal_slots)?;

    let lion_general = zoo.object("_zoo_lion_generalization", uml.generalization, vec![("general", RawValue::Object(animal.clone()))])?;
    let mut lion_slots = named("Lion", &public);
    lion_slots.push(("generalization", refs(&[&lion_general])));
    lion_slots.push(("keyword", RawValue::List(vec![RawValue::string("big cat")])));
    let lion = zoo.object(ZOO_LION, uml.class, lion_slots)?;

    let elephant = zoo.object(ZOO_ELEPHANT, uml.class, named("Elephant", &public))?;
    let keeper = zoo.object(ZOO_KEEPER, uml.class, named("Keeper", &private))?;
    let feeding = zoo.object(ZOO_FEEDING_PROTOCOL, uml.protocol_state_machine, named("FeedingProtocol", &public))?;

    let herbivore = zoo.object("_zoo_diet_herbivore", uml.enumeration_literal, named("herbivore", &public))?;
    let carnivore = zoo.object("_zoo_diet_carnivore", uml.enumeration_literal, named("carnivore", &public))?;
    let mut diet_slots = named("Diet", &public);
    diet_slots.push(("ownedLiteral", refs(&[&herbivore, &carnivore])));
    let diet = zoo.object(ZOO_DIET, uml.enumeration, diet_slots)?;

    let note = zoo.object_with_access(
        ZOO_PROFILES_NOTE,
        uml.comment,
        true,
        vec![("body", RawValue::string("Imported from the standard profile."))],
    )?;
    let mut profile_slots = named("Profiles", &public);
    profile_slots.push(("ownedComment", refs(&[&note])));
    let profiles = zoo.object_with_access(ZOO_PROFILES, uml.package, true, profile_slots)?;

    let mut model_slots = named("Zoo", &public);
    model_slots.push((
        "packagedElement",
        refs(&[&test_package, &animal, &lion, &elephant, &keeper, &feeding, &diet, &profiles]),
    ));
    let model = zoo.object(ZOO_MODEL, uml.model, model_slots)?;

    let mut project = zoo.project;
    project.set_primary_model(model)?;
    project.relink_containment();
    Ok(project)
}
