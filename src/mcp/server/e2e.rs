// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{SystemTime, UNIX_EPOCH};

use super::*;
use crate::client::{ClientValue, ConnectionConfig, McpConnection, ModelApi, PropertyAccess, RemoteModel, TypedModel};
use crate::error::Reason;
use crate::model::fixtures::{self, ZOO_ELEPHANT, ZOO_LION, ZOO_TEST_PACKAGE};
use crate::store::ProjectFile;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn new_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("tokio runtime")
}

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("modelwire-e2e-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A TCP server on an ephemeral port, running on its own thread until dropped.
struct ServerHarness {
    port: u16,
    service: ModelAccessService,
    stop: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHarness {
    fn start(service: ModelAccessService) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        listener.set_nonblocking(true).expect("nonblocking");

        let (stop, shutdown) = watch::channel(false);
        let server = ModelwireMcp::new(service.clone());
        let thread = std::thread::spawn(move || {
            new_runtime().block_on(async move {
                let listener = TcpListener::from_std(listener).expect("tokio listener");
                server.serve_tcp(listener, shutdown).await.expect("serve");
            });
        });
        Self { port, service, stop, thread: Some(thread) }
    }

    fn demo() -> Self {
        Self::start(ModelAccessService::demo().expect("demo service"))
    }

    fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.port)
    }

    fn connect(&self) -> RemoteModel {
        RemoteModel::connect("e2e", self.config()).expect("connect")
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[test]
fn e2e_queries_and_edits_over_tcp() {
    let server = ServerHarness::demo();
    let model = server.connect();

    assert_eq!(model.all_of_kind("Class").expect("kind").len(), 5);
    assert_eq!(model.all_of_type("Class").expect("exact").len(), 4);

    let lion = model.element_by_id(ZOO_LION).expect("lookup").expect("lion");
    model.set_property(&lion, "name", "Tiger".into()).expect("set name");
    assert_eq!(model.get_property(&lion, "name").expect("get name").as_str(), Some("Tiger"));
    assert!(server.service.is_session_open());

    let package = model.element_by_id(ZOO_TEST_PACKAGE).expect("lookup").expect("package");
    let members = model.get_property(&package, "packagedElement").expect("members");
    let members = members.as_proxy().expect("proxy list").clone();
    assert_eq!(members.len().expect("size"), 0);

    let created = model.create_instance("Class").expect("create");
    members.push(created.clone()).expect("append");
    assert_eq!(members.len().expect("size"), 1);
    assert_eq!(members.get(0).expect("get"), ClientValue::Element(created));
}

#[test]
fn e2e_delete_changes_counts_only_for_real_elements() {
    let server = ServerHarness::demo();
    let model = server.connect();
    let before = model.all_of_kind("Class").expect("count").len();

    let elephant = model.element_by_id(ZOO_ELEPHANT).expect("lookup").expect("elephant");
    model.delete_element(&elephant).expect("delete");
    assert_eq!(model.all_of_kind("Class").expect("count").len(), before - 1);

    let err = model.api().delete_instance("_ghost").expect_err("bogus id");
    assert_eq!(err.reason(), Some(Reason::ElementNotFound));
    assert_eq!(model.all_of_kind("Class").expect("count").len(), before - 1);
    assert_eq!(model.element_by_id(ZOO_ELEPHANT).expect("lookup"), None);
}

#[test]
fn e2e_error_metadata_survives_the_wire() {
    let server = ServerHarness::demo();
    let model = server.connect();

    let err = model.api().close_session().expect_err("no session yet");
    assert!(err.is_precondition_failed(), "{err}");

    let err = model.all_of_kind("Clas").expect_err("unknown type");
    assert_eq!(err.reason(), Some(Reason::TypeNotFound));
    assert_eq!(err.type_name(), Some("Clas"));

    let err = model.create_instance("NamedElement").expect_err("abstract type");
    assert_eq!(err.reason(), Some(Reason::TypeNotInstantiable));
    assert_eq!(err.type_name(), Some("NamedElement"));

    assert!(!model.has_type("Clas").expect("negative lookup"));
    assert!(model.is_instantiable("uml::Class").expect("lookup"));
}

#[test]
fn e2e_connection_shuts_down_after_calls() {
    let server = ServerHarness::demo();
    let connection = McpConnection::connect("127.0.0.1", server.port).expect("connect");
    connection.ping().expect("ping");
    let classes = connection
        .all_of(AllOfParams { type_name: Some("Class".into()), ..AllOfParams::default() })
        .expect("all_of");
    assert_eq!(classes.len(), 5);

    connection.shutdown(std::time::Duration::from_secs(5)).expect("shutdown");
    connection.shutdown(std::time::Duration::from_secs(5)).expect("second shutdown is a no-op");
}

#[test]
fn e2e_dispose_releases_the_transport() {
    let server = ServerHarness::demo();
    let mut model = server.connect();
    assert_eq!(model.all_of_kind("Class").expect("kind").len(), 5);

    let lion = model.element_by_id(ZOO_LION).expect("lookup").expect("lion");
    model.set_property(&lion, "name", "Tiger".into()).expect("set name");
    assert!(server.service.is_session_open());

    model.dispose().expect("dispose");
    assert!(model.is_disposed());
    assert!(!server.service.is_session_open());
    let err = model.api().ping().expect_err("transport released");
    assert!(matches!(err, ModelError::Transport(_)), "{err}");
    drop(model);

    let name = server
        .service
        .get_feature_value(GetFeatureValueParams { element_id: ZOO_LION.into(), feature_name: "name".into() })
        .expect("read name");
    assert_ne!(name.value, Value::StringValue("Tiger".into()));
}

#[test]
fn e2e_second_connection_cannot_open_a_competing_session() {
    let server = ServerHarness::demo();
    let first = McpConnection::connect("127.0.0.1", server.port).expect("first");
    let second = McpConnection::connect("127.0.0.1", server.port).expect("second");

    first.open_session("first").expect("open");
    let err = second.open_session("second").expect_err("already open");
    assert!(err.is_precondition_failed(), "{err}");

    first.cancel_session().expect("cancel");
    second.open_session("second").expect("open after cancel");
    second.close_session().expect("close");

    first.shutdown(std::time::Duration::from_secs(1)).expect("shutdown");
    let err = first.ping().expect_err("closed connection");
    assert!(matches!(err, ModelError::Transport(_)), "{err}");
}

#[test]
fn e2e_store_persists_edits_to_the_project_file() {
    let tmp = TempDir::new("store");
    let file = ProjectFile::new(tmp.path.join("zoo.json"));
    let zoo = fixtures::zoo_project().expect("zoo");
    file.save(&zoo).expect("seed project file");

    let service = ModelAccessService::new(Arc::clone(zoo.metamodel()));
    let server = ServerHarness::start(service);
    let config = ConnectionConfig {
        project_url: Some(file.location()),
        close_on_disposal: true,
        ..server.config()
    };

    {
        let model = RemoteModel::connect("store", config).expect("connect");
        let lion = model.element_by_id(ZOO_LION).expect("lookup").expect("lion");
        model.set_property(&lion, "name", "Tiger".into()).expect("set");
        model.store().expect("store");
        assert!(!model.is_session_open());
    }

    let reloaded = file.load(Arc::clone(zoo.metamodel())).expect("reload");
    let lion = crate::model::ElementId::new(ZOO_LION).expect("id");
    let name = reloaded.feature_of(&lion, "name").and_then(|f| reloaded.read(&lion, f)).expect("read");
    assert_eq!(name.as_ref().and_then(|v| v.as_str()), Some("Tiger"));

    let err = server.service.all_of(AllOfParams::default()).expect_err("project closed on disposal");
    assert!(err.is_precondition_failed());
}
