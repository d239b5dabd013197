// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::*;
use crate::error::{ErrorCategory, Reason};
use crate::model::fixtures::{
    ZOO_ANIMAL, ZOO_ANIMAL_AGE, ZOO_DIET, ZOO_ELEPHANT, ZOO_KEEPER, ZOO_LION, ZOO_MODEL, ZOO_PROFILES,
    ZOO_PROFILES_NOTE, ZOO_TEST_PACKAGE,
};
use crate::protocol::{ModelElement, TypeKind};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("modelwire-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn zoo() -> ModelAccessService {
    ModelAccessService::demo().unwrap()
}

fn editing(service: &ModelAccessService) {
    service.open_session(OpenSessionParams { description: "test".into() }).unwrap();
}

fn all_of(service: &ModelAccessService, type_name: &str, exact: bool) -> Vec<ModelElement> {
    service
        .all_of(AllOfParams {
            type_name: Some(type_name.to_owned()),
            root_element_hyperlink: None,
            only_exact_type: exact,
        })
        .unwrap()
        .elements
}

fn get(service: &ModelAccessService, element: &str, feature: &str) -> Value {
    service
        .get_feature_value(GetFeatureValueParams { element_id: element.into(), feature_name: feature.into() })
        .unwrap()
        .value
}

fn set(service: &ModelAccessService, element: &str, feature: &str, value: Value) -> Result<Empty, ModelError> {
    service.set_feature_value(SetFeatureValueParams {
        element_id: element.into(),
        feature_name: feature.into(),
        new_value: value,
    })
}

fn handle(element: &str, feature: &str) -> ProxyListHandle {
    ProxyListHandle { element_id: element.into(), feature_name: feature.into() }
}

fn size(service: &ModelAccessService, element: &str, feature: &str) -> u32 {
    service.list_size(ListParams { list: handle(element, feature) }).unwrap().size
}

fn reference(service: &ModelAccessService, element: &str) -> Value {
    let element = service.get_element_by_id(ElementIdParams { element_id: element.into() }).unwrap().element;
    Value::ReferenceValue(element)
}

#[rstest]
fn all_of_kind_includes_subtypes_and_exact_type_does_not(zoo: ModelAccessService) {
    assert_eq!(all_of(&zoo, "Class", false).len(), 5);
    assert_eq!(all_of(&zoo, "Class", true).len(), 4);
    assert_eq!(all_of(&zoo, "ProtocolStateMachine", false).len(), 1);
    assert_eq!(all_of(&zoo, "ProtocolStateMachine", true).len(), 1);
}

#[rstest]
#[case("Class")]
#[case("Package")]
#[case("NamedElement")]
#[case("uml::Property")]
fn exact_results_are_a_subset_of_kind_results(zoo: ModelAccessService, #[case] type_name: &str) {
    let kind = all_of(&zoo, type_name, false);
    let exact = all_of(&zoo, type_name, true);
    assert!(exact.iter().all(|e| kind.contains(e)), "{type_name}");
    assert!(exact.len() <= kind.len());
}

#[rstest]
fn all_of_without_type_returns_every_element_below_the_root(zoo: ModelAccessService) {
    let everything = zoo.all_of(AllOfParams::default()).unwrap().elements;
    let total = zoo.with_active_project(|p| p.len()).unwrap();
    assert_eq!(everything.len(), total - 1);
    assert!(everything.iter().all(|e| e.element_id != ZOO_MODEL));
}

#[rstest]
fn all_of_can_be_scoped_to_a_root_element(zoo: ModelAccessService) {
    let scoped = zoo
        .all_of(AllOfParams {
            type_name: Some("Property".into()),
            root_element_hyperlink: Some(format!("mdel://{ZOO_ANIMAL}")),
            only_exact_type: false,
        })
        .unwrap()
        .elements;
    assert_eq!(scoped.len(), 2);
    assert!(scoped.iter().any(|e| e.element_id == ZOO_ANIMAL_AGE));

    let err = zoo
        .all_of(AllOfParams { root_element_hyperlink: Some("mdel://ghost".into()), ..AllOfParams::default() })
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidArgument);

    let err = zoo
        .all_of(AllOfParams { root_element_hyperlink: Some("http://nope".into()), ..AllOfParams::default() })
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn unknown_types_are_reported_as_type_not_found(zoo: ModelAccessService) {
    let all_of_err = zoo
        .all_of(AllOfParams { type_name: Some("Clas".into()), ..AllOfParams::default() })
        .unwrap_err();
    assert_eq!(all_of_err.reason(), Some(Reason::TypeNotFound));
    assert_eq!(all_of_err.type_name(), Some("Clas"));

    let get_type_err = zoo.get_type(GetTypeParams { type_name: "Clas".into() }).unwrap_err();
    assert_eq!(get_type_err.reason(), Some(Reason::TypeNotFound));

    editing(&zoo);
    let create_err = zoo
        .create_instance(CreateInstanceParams { type_name: "Clas".into(), root_element_hyperlink: None })
        .unwrap_err();
    assert_eq!(create_err.reason(), Some(Reason::TypeNotFound));
    assert!(matches!(create_err, ModelError::TypeNotFound { suggestion: Some(ref s), .. } if s == "uml::Class"));
}

#[rstest]
fn get_type_describes_the_classifier(zoo: ModelAccessService) {
    let descriptor = zoo.get_type(GetTypeParams { type_name: "Class".into() }).unwrap().descriptor;
    assert_eq!(descriptor.type_name, "uml::Class");
    assert_eq!(descriptor.kind, TypeKind::Class);
    assert!(!descriptor.is_abstract);
    let names: Vec<&str> = descriptor.all_supertypes.iter().map(|t| t.type_name.as_str()).collect();
    assert_eq!(
        names,
        ["uml::Classifier", "uml::PackageableElement", "uml::NamedElement", "uml::Element", "foundation::MDObject"]
    );

    let element = zoo.get_type(GetTypeParams { type_name: "uml::Element".into() }).unwrap().descriptor;
    assert!(element.is_abstract);
    assert!(!element.is_instantiable());

    let visibility = zoo.get_type(GetTypeParams { type_name: "VisibilityKind".into() }).unwrap().descriptor;
    assert_eq!(visibility.kind, TypeKind::Enumeration);
}

#[rstest]
fn type_metadata_does_not_need_an_open_project(zoo: ModelAccessService) {
    zoo.close_project().unwrap();
    assert!(zoo.get_type(GetTypeParams { type_name: "Class".into() }).is_ok());
    let err = zoo.all_of(AllOfParams::default()).unwrap_err();
    assert!(err.is_precondition_failed());
}

#[rstest]
#[case("VisibilityKind", "private", 1)]
#[case("uml::VisibilityKind", "public", 0)]
fn enumeration_values_resolve_by_label(
    zoo: ModelAccessService,
    #[case] enumeration: &str,
    #[case] label: &str,
    #[case] ordinal: i32,
) {
    let literal = zoo
        .get_enumeration_value(GetEnumerationValueParams { enumeration: enumeration.into(), label: label.into() })
        .unwrap()
        .literal;
    assert_eq!(literal.name, label);
    assert_eq!(literal.value, ordinal);
}

#[rstest]
fn enumeration_lookups_fail_cleanly(zoo: ModelAccessService) {
    let err = zoo
        .get_enumeration_value(GetEnumerationValueParams { enumeration: "VisibilityKind".into(), label: "secret".into() })
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));

    let err = zoo
        .get_enumeration_value(GetEnumerationValueParams { enumeration: "Class".into(), label: "public".into() })
        .unwrap_err();
    assert_eq!(err.reason(), Some(Reason::TypeNotFound));
}

#[rstest]
fn reads_encode_by_feature_shape(zoo: ModelAccessService) {
    assert_eq!(get(&zoo, ZOO_LION, "name"), Value::StringValue("Lion".into()));
    assert_eq!(get(&zoo, ZOO_ANIMAL_AGE, "lower"), Value::IntegerValue(1));
    assert_eq!(get(&zoo, ZOO_ANIMAL_AGE, "upper"), Value::LongValue(1));
    assert_eq!(get(&zoo, ZOO_ANIMAL, "isAbstract"), Value::BooleanValue(true));
    assert_eq!(get(&zoo, ZOO_LION, "isActive"), Value::NotSet);
    assert_eq!(get(&zoo, ZOO_LION, "ownedAttribute"), Value::ProxyList(handle(ZOO_LION, "ownedAttribute")));
    assert_eq!(get(&zoo, ZOO_LION, "noSuchFeature"), Value::NotDefined);

    let Value::EnumerationValue(literal) = get(&zoo, ZOO_KEEPER, "visibility") else {
        panic!("expected an enumeration literal");
    };
    assert_eq!((literal.value, literal.literal.as_str()), (1, "private"));

    let Value::ReferenceValue(default) = get(&zoo, ZOO_ANIMAL_AGE, "defaultValue") else {
        panic!("expected a reference");
    };
    assert_eq!(default.type_name, "uml::LiteralInteger");
}

#[rstest]
fn pseudo_features_expose_the_containment_tree(zoo: ModelAccessService) {
    let Value::ReferenceValue(container) = get(&zoo, ZOO_ANIMAL_AGE, "container") else {
        panic!("expected a container reference");
    };
    assert_eq!(container.element_id, ZOO_ANIMAL);
    assert_eq!(get(&zoo, ZOO_ANIMAL_AGE, "containingFeature"), Value::StringValue("ownedAttribute".into()));
    assert_eq!(get(&zoo, ZOO_MODEL, "container"), Value::NotSet);

    let Value::ReferenceValues(children) = get(&zoo, ZOO_ANIMAL, "contents") else {
        panic!("expected eager contents");
    };
    assert_eq!(children.len(), 2);
    assert_eq!(get(&zoo, ZOO_TEST_PACKAGE, "contents"), Value::IntegerValues(Vec::new()));
}

#[rstest]
fn reading_unknown_elements_is_element_not_found(zoo: ModelAccessService) {
    let err = zoo
        .get_feature_value(GetFeatureValueParams { element_id: "ghost".into(), feature_name: "name".into() })
        .unwrap_err();
    assert_eq!(err.reason(), Some(Reason::ElementNotFound));
    assert!(err.is_invalid_argument());

    let err = zoo.get_element_by_id(ElementIdParams { element_id: "a/b".into() }).unwrap_err();
    assert_eq!(err.reason(), Some(Reason::ElementNotFound));
}

#[rstest]
fn set_then_get_returns_the_written_value(zoo: ModelAccessService) {
    editing(&zoo);
    set(&zoo, ZOO_LION, "name", Value::StringValue("Panthera".into())).unwrap();
    assert_eq!(get(&zoo, ZOO_LION, "name"), Value::StringValue("Panthera".into()));

    set(&zoo, ZOO_LION, "name", Value::NotSet).unwrap();
    assert_eq!(get(&zoo, ZOO_LION, "name"), Value::NotSet);
}

#[rstest]
fn writes_coerce_only_losslessly(zoo: ModelAccessService) {
    editing(&zoo);
    set(&zoo, ZOO_ANIMAL_AGE, "upper", Value::IntegerValue(7)).unwrap();
    assert_eq!(get(&zoo, ZOO_ANIMAL_AGE, "upper"), Value::LongValue(7));

    let err = set(&zoo, ZOO_ANIMAL_AGE, "lower", Value::LongValue(i64::MAX)).unwrap_err();
    assert!(err.is_invalid_argument());
    let err = set(&zoo, ZOO_ANIMAL_AGE, "lower", Value::StringValue("one".into())).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn writes_to_enumeration_features_match_by_literal(zoo: ModelAccessService) {
    editing(&zoo);
    set(&zoo, ZOO_LION, "visibility", Value::StringValue("protected".into())).unwrap();
    let Value::EnumerationValue(literal) = get(&zoo, ZOO_LION, "visibility") else {
        panic!("expected an enumeration literal");
    };
    assert_eq!(literal.literal, "protected");

    let err = set(&zoo, ZOO_LION, "visibility", Value::StringValue("hidden".into())).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn many_valued_writes_replace_the_whole_collection(zoo: ModelAccessService) {
    editing(&zoo);
    set(&zoo, ZOO_LION, "keyword", Value::StringValues(vec!["a".into(), "b".into()])).unwrap();
    assert_eq!(size(&zoo, ZOO_LION, "keyword"), 2);

    let err = set(&zoo, ZOO_LION, "keyword", Value::StringValue("single".into())).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(size(&zoo, ZOO_LION, "keyword"), 2);

    set(&zoo, ZOO_LION, "keyword", Value::IntegerValues(Vec::new())).unwrap();
    assert_eq!(size(&zoo, ZOO_LION, "keyword"), 0);

    let err = set(&zoo, ZOO_LION, "name", Value::StringValues(vec!["x".into()])).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn unrecognised_wire_values_are_unknown_value_kinds(zoo: ModelAccessService) {
    editing(&zoo);
    let err = zoo
        .list_append(ListValueParams {
            list: handle(ZOO_LION, "keyword"),
            value: Value::ProxyList(handle(ZOO_LION, "keyword")),
        })
        .unwrap_err();
    assert_eq!(err.reason(), Some(Reason::UnknownValueKind));
}

#[rstest]
fn mutations_need_an_open_session(zoo: ModelAccessService) {
    let failures = [
        set(&zoo, ZOO_LION, "name", Value::StringValue("x".into())).map(|_| ()),
        zoo.create_instance(CreateInstanceParams { type_name: "Class".into(), root_element_hyperlink: None })
            .map(|_| ()),
        zoo.delete_instance(ElementIdParams { element_id: ZOO_KEEPER.into() }).map(|_| ()),
        zoo.list_clear(ListParams { list: handle(ZOO_LION, "keyword") }).map(|_| ()),
        zoo.list_append(ListValueParams { list: handle(ZOO_LION, "keyword"), value: Value::StringValue("x".into()) })
            .map(|_| ()),
    ];
    for failure in failures {
        let err = failure.unwrap_err();
        assert_eq!(err, ModelError::session_not_open());
    }
    assert_eq!(all_of(&zoo, "Class", true).len(), 4);
}

#[rstest]
fn the_project_check_comes_before_the_session_check(zoo: ModelAccessService) {
    zoo.close_project().unwrap();
    let err = set(&zoo, ZOO_LION, "name", Value::StringValue("x".into())).unwrap_err();
    assert_eq!(err, ModelError::project_not_open());
    let err = zoo.open_session(OpenSessionParams::default()).unwrap_err();
    assert_eq!(err, ModelError::project_not_open());
}

#[rstest]
fn session_transitions_are_strict(zoo: ModelAccessService) {
    assert_eq!(zoo.close_session().unwrap_err(), ModelError::session_not_open());
    assert_eq!(zoo.cancel_session().unwrap_err(), ModelError::session_not_open());
    editing(&zoo);
    assert!(zoo.is_session_open());
    assert_eq!(
        zoo.open_session(OpenSessionParams::default()).unwrap_err(),
        ModelError::session_already_open()
    );
    zoo.close_session().unwrap();
    assert!(zoo.close_session().unwrap_err().is_precondition_failed());
}

#[rstest]
fn cancel_rolls_back_and_close_keeps_changes(zoo: ModelAccessService) {
    editing(&zoo);
    set(&zoo, ZOO_LION, "name", Value::StringValue("Tiger".into())).unwrap();
    zoo.cancel_session().unwrap();
    assert_eq!(get(&zoo, ZOO_LION, "name"), Value::StringValue("Lion".into()));

    editing(&zoo);
    set(&zoo, ZOO_LION, "name", Value::StringValue("Tiger".into())).unwrap();
    zoo.close_session().unwrap();
    assert_eq!(get(&zoo, ZOO_LION, "name"), Value::StringValue("Tiger".into()));
}

#[rstest]
fn clones_share_the_session_gate(zoo: ModelAccessService) {
    let other = zoo.clone();
    editing(&zoo);
    assert!(other.open_session(OpenSessionParams::default()).unwrap_err().is_precondition_failed());
    other.close_session().unwrap();
    assert!(!zoo.is_session_open());
}

#[rstest]
fn create_instance_attaches_under_the_primary_model(zoo: ModelAccessService) {
    editing(&zoo);
    let created = zoo
        .create_instance(CreateInstanceParams { type_name: "Class".into(), root_element_hyperlink: None })
        .unwrap()
        .element;
    assert_eq!(created.type_name, "uml::Class");
    assert_eq!(all_of(&zoo, "Class", true).len(), 5);
    let Value::ReferenceValue(container) = get(&zoo, &created.element_id, "container") else {
        panic!("expected a container");
    };
    assert_eq!(container.element_id, ZOO_MODEL);
}

#[rstest]
fn create_instance_honours_the_root_locator(zoo: ModelAccessService) {
    editing(&zoo);
    let created = zoo
        .create_instance(CreateInstanceParams {
            type_name: "Property".into(),
            root_element_hyperlink: Some(format!("mdel://{ZOO_ELEPHANT}")),
        })
        .unwrap()
        .element;
    assert_eq!(get(&zoo, &created.element_id, "containingFeature"), Value::StringValue("ownedAttribute".into()));
    assert_eq!(size(&zoo, ZOO_ELEPHANT, "ownedAttribute"), 1);
}

#[rstest]
fn create_instance_under_a_read_only_container_is_reported(zoo: ModelAccessService) {
    editing(&zoo);
    let before = zoo.with_active_project(|p| p.len()).unwrap();
    let err = zoo
        .create_instance(CreateInstanceParams {
            type_name: "Class".into(),
            root_element_hyperlink: Some(format!("mdel://{ZOO_PROFILES}")),
        })
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(zoo.with_active_project(|p| p.len()).unwrap(), before);
}

fn locked_constructor(project: &mut Project, class: ClassifierId) -> Result<ElementId, HostError> {
    let id = ElementId::new("_locked_class").unwrap();
    project.insert_object(id.clone(), class, true);
    Ok(id)
}

#[rstest]
fn failed_rollback_of_a_create_is_an_internal_error() {
    let project = crate::model::fixtures::zoo_project().unwrap();
    let metamodel = Arc::clone(project.metamodel());
    let mut factory = ElementFactory::for_metamodel(&metamodel);
    let class = catalog::resolve_one(metamodel.as_ref(), "Class").unwrap();
    factory.register(class, locked_constructor);
    let service = ModelAccessService::new(metamodel).with_factory(factory);
    service.host_project(project, None);
    editing(&service);

    let err = service
        .create_instance(CreateInstanceParams {
            type_name: "Class".into(),
            root_element_hyperlink: Some(format!("mdel://{ZOO_PROFILES}")),
        })
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Internal, "{err}");
    assert!(err.to_string().contains("_locked_class"), "{err}");
}

#[rstest]
#[case("NamedElement")]
#[case("uml::Element")]
#[case("VisibilityKind")]
#[case("Integer")]
fn abstract_and_non_class_types_are_not_instantiable(zoo: ModelAccessService, #[case] type_name: &str) {
    editing(&zoo);
    let err = zoo
        .create_instance(CreateInstanceParams { type_name: type_name.into(), root_element_hyperlink: None })
        .unwrap_err();
    assert_eq!(err.reason(), Some(Reason::TypeNotInstantiable), "{type_name}");
    assert_eq!(err.type_name(), Some(type_name));
}

#[rstest]
fn unregistered_types_are_not_instantiable() {
    let project = crate::model::fixtures::zoo_project().unwrap();
    let metamodel = Arc::clone(project.metamodel());
    let mut factory = ElementFactory::for_metamodel(&metamodel);
    let comment = catalog::resolve_one(metamodel.as_ref(), "Comment").unwrap();
    factory.unregister(comment);
    let service = ModelAccessService::new(metamodel).with_factory(factory);
    service.host_project(project, None);
    editing(&service);

    let err = service
        .create_instance(CreateInstanceParams { type_name: "Comment".into(), root_element_hyperlink: None })
        .unwrap_err();
    assert_eq!(err.reason(), Some(Reason::TypeNotInstantiable));
}

#[rstest]
fn delete_reduces_the_count_by_exactly_one(zoo: ModelAccessService) {
    editing(&zoo);
    zoo.delete_instance(ElementIdParams { element_id: ZOO_KEEPER.into() }).unwrap();
    assert_eq!(all_of(&zoo, "Class", true).len(), 3);

    let err = zoo.delete_instance(ElementIdParams { element_id: "ghost".into() }).unwrap_err();
    assert_eq!(err.reason(), Some(Reason::ElementNotFound));
    assert_eq!(all_of(&zoo, "Class", true).len(), 3);
}

#[rstest]
#[case(ZOO_PROFILES)]
#[case(ZOO_PROFILES_NOTE)]
#[case(ZOO_MODEL)]
fn deleting_read_only_elements_is_invalid(zoo: ModelAccessService, #[case] element: &str) {
    editing(&zoo);
    let err = zoo.delete_instance(ElementIdParams { element_id: element.into() }).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)), "{err:?}");
}

#[rstest]
fn list_append_then_size_and_get(zoo: ModelAccessService) {
    editing(&zoo);
    assert_eq!(size(&zoo, ZOO_ELEPHANT, "keyword"), 0);
    zoo.list_append(ListValueParams {
        list: handle(ZOO_ELEPHANT, "keyword"),
        value: Value::StringValue("pachyderm".into()),
    })
    .unwrap();
    assert_eq!(size(&zoo, ZOO_ELEPHANT, "keyword"), 1);
    let value = zoo.list_get(ListPositionParams { list: handle(ZOO_ELEPHANT, "keyword"), position: 0 }).unwrap().value;
    assert_eq!(value, Value::StringValue("pachyderm".into()));
}

#[rstest]
fn positional_list_operations(zoo: ModelAccessService) {
    editing(&zoo);
    let list = handle(ZOO_LION, "keyword");
    let add = |position, text: &str| {
        zoo.list_add(ListPositionValueParams { list: list.clone(), position, value: Value::StringValue(text.into()) })
    };
    add(0, "first").unwrap();
    add(2, "last").unwrap();
    assert!(add(9, "far").unwrap_err().is_invalid_argument());

    let previous = zoo
        .list_set(ListPositionValueParams { list: list.clone(), position: 1, value: Value::StringValue("cat".into()) })
        .unwrap()
        .value;
    assert_eq!(previous, Value::StringValue("big cat".into()));

    zoo.list_move(ListPositionValueParams { list: list.clone(), position: 0, value: Value::StringValue("last".into()) })
        .unwrap();
    let removed = zoo.list_remove(ListPositionParams { list: list.clone(), position: 0 }).unwrap().value;
    assert_eq!(removed, Value::StringValue("last".into()));

    let err = zoo
        .list_move(ListPositionValueParams { list: list.clone(), position: 0, value: Value::StringValue("gone".into()) })
        .unwrap_err();
    assert!(err.is_invalid_argument());

    zoo.list_clear(ListParams { list: list.clone() }).unwrap();
    assert_eq!(size(&zoo, ZOO_LION, "keyword"), 0);
    assert!(zoo.list_get(ListPositionParams { list, position: 0 }).unwrap_err().is_invalid_argument());
}

#[rstest]
fn reference_lists_move_contained_elements(zoo: ModelAccessService) {
    editing(&zoo);
    let age = reference(&zoo, ZOO_ANIMAL_AGE);
    zoo.list_append(ListValueParams { list: handle(ZOO_ELEPHANT, "ownedAttribute"), value: age }).unwrap();
    assert_eq!(size(&zoo, ZOO_ANIMAL, "ownedAttribute"), 1);
    assert_eq!(size(&zoo, ZOO_ELEPHANT, "ownedAttribute"), 1);

    let diet = reference(&zoo, ZOO_DIET);
    let err = zoo
        .list_append(ListValueParams { list: handle(ZOO_ELEPHANT, "ownedAttribute"), value: diet })
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn list_operations_need_many_valued_features(zoo: ModelAccessService) {
    let err = zoo.list_size(ListParams { list: handle(ZOO_LION, "name") }).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    let err = zoo.list_size(ListParams { list: handle(ZOO_LION, "nope") }).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn derived_lists_are_readable_but_not_modifiable(zoo: ModelAccessService) {
    assert_eq!(size(&zoo, ZOO_LION, "superClass"), 1);
    editing(&zoo);
    let animal = reference(&zoo, ZOO_ANIMAL);
    let attempts = [
        zoo.list_append(ListValueParams { list: handle(ZOO_LION, "superClass"), value: animal.clone() }).map(|_| ()),
        zoo.list_remove(ListPositionParams { list: handle(ZOO_LION, "superClass"), position: 0 }).map(|_| ()),
        zoo.list_clear(ListParams { list: handle(ZOO_LION, "superClass") }).map(|_| ()),
        zoo.list_move(ListPositionValueParams { list: handle(ZOO_LION, "superClass"), position: 0, value: animal })
            .map(|_| ()),
    ];
    for attempt in attempts {
        let err = attempt.unwrap_err();
        let ModelError::InvalidArgument(message) = err else {
            panic!("expected invalid-argument, got {err:?}");
        };
        assert!(message.contains("superClass") && message.contains("Class"), "{message}");
    }
    assert_eq!(size(&zoo, ZOO_LION, "superClass"), 1);
}

#[rstest]
fn projects_round_trip_through_files(zoo: ModelAccessService) {
    let tmp = TempDir::new("service");
    let path = tmp.path.join("zoo.json");
    let project = zoo.with_active_project(Project::clone).unwrap();
    ProjectFile::new(&path).save(&project).unwrap();

    let service = ModelAccessService::new(Arc::clone(project.metamodel()));
    let location = format!("file://{}", path.display());
    let opened = service.open_project(ProjectLocationParams { file_url: location.clone() }).unwrap();
    assert_eq!(opened.name, "zoo");
    assert_eq!(all_of(&service, "Class", false).len(), 5);

    editing(&service);
    set(&service, ZOO_LION, "name", Value::StringValue("Saved".into())).unwrap();
    service.close_session().unwrap();
    service.save_project().unwrap();

    // Opening again only re-activates; the in-memory state is kept.
    service.open_project(ProjectLocationParams { file_url: path.display().to_string() }).unwrap();
    assert_eq!(get(&service, ZOO_LION, "name"), Value::StringValue("Saved".into()));

    service.close_project().unwrap();
    service.open_project(ProjectLocationParams { file_url: location }).unwrap();
    assert_eq!(get(&service, ZOO_LION, "name"), Value::StringValue("Saved".into()));
}

#[rstest]
fn opening_a_missing_project_is_invalid(zoo: ModelAccessService) {
    let err = zoo
        .open_project(ProjectLocationParams { file_url: "file:///definitely/not/here.json".into() })
        .unwrap_err();
    assert!(err.is_invalid_argument());
    let err = zoo.open_project(ProjectLocationParams { file_url: "ftp://x".into() }).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[rstest]
fn in_memory_projects_cannot_be_saved(zoo: ModelAccessService) {
    assert!(zoo.save_project().unwrap_err().is_precondition_failed());
}

#[rstest]
fn closing_a_project_cancels_its_session(zoo: ModelAccessService) {
    editing(&zoo);
    zoo.close_project().unwrap();
    assert!(!zoo.is_session_open());
    assert_eq!(zoo.close_project().unwrap_err(), ModelError::project_not_open());
}

#[rstest]
fn enumeration_defaults_are_applied_on_create(zoo: ModelAccessService) {
    editing(&zoo);
    let created = zoo
        .create_instance(CreateInstanceParams { type_name: "Package".into(), root_element_hyperlink: None })
        .unwrap()
        .element;
    let Value::EnumerationValue(literal) = get(&zoo, &created.element_id, "visibility") else {
        panic!("expected the default literal");
    };
    assert_eq!(literal.literal, "public");
    assert!(matches!(
        zoo.with_active_project(|p| p.object(&ElementId::new(created.element_id.clone()).unwrap()).is_some()),
        Ok(true)
    ));
}
