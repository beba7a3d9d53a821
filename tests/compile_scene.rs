//! End-to-end compile, create and edit tests against a recording mock of
//! the vendor boundary.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tuyascene::{
    DatapointMetadata, Result, SceneDefinition, SceneElement, SceneError, SceneManager,
    SceneService, VendorScene, compile_scene, parse_definition,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct MockVendor {
    datapoints: HashMap<String, Vec<DatapointMetadata>>,
    failing: HashSet<String>,
    fetches: AtomicUsize,
    save_error: Option<SceneError>,
    saved: Mutex<Option<(i64, VendorScene)>>,
    modified: Mutex<Option<(String, VendorScene)>>,
}

impl MockVendor {
    fn new() -> Self {
        MockVendor {
            datapoints: HashMap::new(),
            failing: HashSet::new(),
            fetches: AtomicUsize::new(0),
            save_error: None,
            saved: Mutex::new(None),
            modified: Mutex::new(None),
        }
    }

    fn with_datapoints(mut self, device_id: &str, dp_ids: &[i64]) -> Self {
        let datapoints = dp_ids
            .iter()
            .map(|dp_id| DatapointMetadata {
                dp_id: *dp_id,
                name: format!("dp-{dp_id}"),
                value_type: "bool".to_string(),
                schema: json!({ "type": "bool" }),
            })
            .collect();
        self.datapoints.insert(device_id.to_string(), datapoints);
        self
    }

    fn with_failing_device(mut self, device_id: &str) -> Self {
        self.failing.insert(device_id.to_string());
        self
    }

    fn with_save_error(mut self, code: &str, message: &str) -> Self {
        self.save_error = Some(SceneError::Vendor {
            code: code.to_string(),
            message: message.to_string(),
        });
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn saved_scene(&self) -> Option<(i64, VendorScene)> {
        self.saved.lock().unwrap().clone()
    }

    fn modified_scene(&self) -> Option<(String, VendorScene)> {
        self.modified.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneService for MockVendor {
    async fn simple_scene_list(&self, _home_id: i64) -> Result<Vec<VendorScene>> {
        Ok(Vec::new())
    }

    async fn scene_detail(
        &self,
        _home_id: i64,
        scene_id: &str,
        _rule_genre: i32,
        _support_home: bool,
    ) -> Result<VendorScene> {
        Ok(VendorScene {
            id: Some(scene_id.to_string()),
            ..Default::default()
        })
    }

    async fn save_scene(&self, home_id: i64, scene: VendorScene) -> Result<VendorScene> {
        if let Some(err) = &self.save_error {
            return Err(err.clone());
        }
        *self.saved.lock().unwrap() = Some((home_id, scene.clone()));
        let mut stored = scene;
        stored.id = Some("s-100".to_string());
        Ok(stored)
    }

    async fn modify_scene(&self, scene_id: &str, scene: VendorScene) -> Result<VendorScene> {
        *self.modified.lock().unwrap() = Some((scene_id.to_string(), scene.clone()));
        Ok(scene)
    }

    async fn delete_scene(&self, _home_id: i64, _scene_id: &str) -> Result<bool> {
        Ok(true)
    }

    async fn execute_scene(&self, _scene_id: &str) -> Result<()> {
        Ok(())
    }

    async fn enable_automation(&self, _scene_id: &str) -> Result<bool> {
        Ok(true)
    }

    async fn disable_automation(&self, _scene_id: &str) -> Result<bool> {
        Ok(true)
    }

    async fn condition_datapoints(&self, device_id: &str) -> Result<Vec<DatapointMetadata>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(device_id) {
            return Err(SceneError::Vendor {
                code: "11001".to_string(),
                message: format!("device {device_id} offline"),
            });
        }
        self.datapoints
            .get(device_id)
            .cloned()
            .ok_or_else(|| SceneError::Vendor {
                code: "11002".to_string(),
                message: format!("unknown device {device_id}"),
            })
    }
}

fn setup(mock: MockVendor) -> (Arc<MockVendor>, Arc<dyn SceneService>) {
    let mock = Arc::new(mock);
    let service: Arc<dyn SceneService> = mock.clone();
    (mock, service)
}

fn definition(args: Value) -> SceneDefinition {
    parse_definition(args).unwrap()
}

fn bool_condition(device_id: &str, dp_id: i64) -> Value {
    json!({
        "kind": "device",
        "deviceId": device_id,
        "dpModelId": dp_id,
        "expr": { "kind": "boolValue", "type": "switch", "isTrue": true, "exprType": 1 }
    })
}

#[tokio::test]
async fn each_referenced_device_is_fetched_once() {
    init_logging();
    let (mock, service) = setup(
        MockVendor::new()
            .with_datapoints("dev-1", &[1, 2])
            .with_datapoints("dev-2", &[1]),
    );
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [
            bool_condition("dev-1", 1),
            bool_condition("dev-1", 2),
            bool_condition("dev-2", 1),
        ]
    }));

    let scene = compile_scene(&service, &definition).await.unwrap();

    assert_eq!(mock.fetch_count(), 2);
    assert_eq!(scene.conditions.as_ref().unwrap().len(), 3);
    assert_eq!(
        scene.conditions.as_ref().unwrap()[2].entity_id.as_deref(),
        Some("dev-2")
    );
}

#[tokio::test]
async fn schema_free_scenes_fetch_nothing() {
    init_logging();
    let (mock, service) = setup(MockVendor::new());
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [{ "kind": "manual" }]
    }));

    let scene = compile_scene(&service, &definition).await.unwrap();

    assert_eq!(mock.fetch_count(), 0);
    assert_eq!(scene.conditions.as_ref().unwrap()[0].entity_type, 99);
}

#[tokio::test]
async fn one_offline_device_fails_only_its_own_condition() {
    init_logging();
    let (mock, service) = setup(
        MockVendor::new()
            .with_datapoints("dev-ok", &[1])
            .with_failing_device("dev-down"),
    );
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [
            bool_condition("dev-ok", 1),
            bool_condition("dev-down", 1),
        ]
    }));

    let err = compile_scene(&service, &definition).await.unwrap_err();

    assert_eq!(mock.fetch_count(), 2);
    match err {
        SceneError::CompileFailed(elements) => {
            assert_eq!(elements.len(), 1);
            assert_eq!(elements[0].element, SceneElement::Condition);
            assert_eq!(elements[0].index, 1);
            assert!(elements[0].reason.contains("dev-down"));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn an_unknown_datapoint_is_reported_with_its_id() {
    init_logging();
    let (_, service) = setup(MockVendor::new().with_datapoints("dev-1", &[1]));
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [bool_condition("dev-1", 99)]
    }));

    let err = compile_scene(&service, &definition).await.unwrap_err();

    match err {
        SceneError::CompileFailed(elements) => {
            assert_eq!(elements.len(), 1);
            assert!(elements[0].reason.contains("99"));
            assert!(elements[0].reason.contains("not resolved"));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_diagnostics_report_every_failed_element() {
    init_logging();
    let (_, service) = setup(MockVendor::new().with_datapoints("dev-1", &[1]));
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [
            { "kind": "device", "deviceId": "dev-1", "dpModelId": 1 },
            bool_condition("dev-1", 42),
            { "kind": "manual" },
        ],
        "actions": [
            { "kind": "triggerScene", "sceneName": "No id" },
        ]
    }));

    let err = compile_scene(&service, &definition).await.unwrap_err();

    match err {
        SceneError::CompileFailed(elements) => {
            assert_eq!(elements.len(), 3);
            assert_eq!(elements[0].element, SceneElement::Condition);
            assert_eq!(elements[0].index, 0);
            assert!(elements[0].reason.contains("expr"));
            assert_eq!(elements[1].index, 1);
            assert!(elements[1].reason.contains("42"));
            assert_eq!(elements[2].element, SceneElement::Action);
            assert_eq!(elements[2].index, 0);
            assert!(elements[2].reason.contains("sceneId"));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn member_back_home_conditions_are_rejected_as_unsupported() {
    init_logging();
    let (_, service) = setup(MockVendor::new());
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [{ "kind": "memberBackHome", "memberIds": "8,9" }]
    }));

    let err = compile_scene(&service, &definition).await.unwrap_err();

    match err {
        SceneError::CompileFailed(elements) => {
            assert_eq!(elements.len(), 1);
            assert!(elements[0].reason.contains("memberBackHome"));
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn compiling_alone_persists_nothing() {
    init_logging();
    let (mock, service) = setup(MockVendor::new().with_datapoints("dev-1", &[1]));
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [bool_condition("dev-1", 1)]
    }));

    compile_scene(&service, &definition).await.unwrap();

    assert!(mock.saved_scene().is_none());
    assert!(mock.modified_scene().is_none());
}

#[tokio::test]
async fn creating_fills_the_vendor_defaults() {
    init_logging();
    let (mock, service) = setup(MockVendor::new());
    let manager = SceneManager::new(service);
    let definition = definition(json!({ "homeId": 9, "name": "Morning" }));

    let reply = manager.create(&definition).await.unwrap();

    let (home_id, saved) = mock.saved_scene().unwrap();
    assert_eq!(home_id, 9);
    assert_eq!(saved.match_type, Some(1));
    assert_eq!(saved.sticky_on_top, Some(false));
    assert!(saved.conditions.as_ref().unwrap().is_empty());
    assert!(saved.actions.as_ref().unwrap().is_empty());
    assert!(saved.pre_conditions.as_ref().unwrap().is_empty());
    // The reply echoes the stored scene, vendor id included.
    assert_eq!(reply["id"], json!("s-100"));
    assert_eq!(reply["name"], json!("Morning"));
}

#[tokio::test]
async fn editing_sends_only_the_fields_the_definition_carries() {
    init_logging();
    let (mock, service) = setup(MockVendor::new());
    let manager = SceneManager::new(service);
    let definition = definition(json!({
        "id": "s-5",
        "homeId": 9,
        "name": "Renamed"
    }));

    manager.edit(&definition).await.unwrap();

    let (scene_id, sent) = mock.modified_scene().unwrap();
    assert_eq!(scene_id, "s-5");
    assert_eq!(sent.name.as_deref(), Some("Renamed"));
    assert!(sent.match_type.is_none());
    assert!(sent.sticky_on_top.is_none());
    assert!(sent.conditions.is_none());
    assert!(sent.actions.is_none());
    assert!(sent.pre_conditions.is_none());
}

#[tokio::test]
async fn editing_without_an_id_never_reaches_the_vendor() {
    init_logging();
    let (mock, service) = setup(MockVendor::new());
    let manager = SceneManager::new(service);
    let definition = definition(json!({ "homeId": 9, "name": "Orphan" }));

    let err = manager.edit(&definition).await.unwrap_err();

    assert!(matches!(
        err,
        SceneError::MissingField { kind: "definition", field: "id" }
    ));
    assert!(mock.modified_scene().is_none());
}

#[tokio::test]
async fn delay_defaults_survive_the_whole_write_path() {
    init_logging();
    let (mock, service) = setup(MockVendor::new());
    let manager = SceneManager::new(service);
    let definition = definition(json!({
        "homeId": 1,
        "actions": [{ "kind": "delay", "delayMinutes": "5" }]
    }));

    manager.create(&definition).await.unwrap();

    let (_, saved) = mock.saved_scene().unwrap();
    let action = &saved.actions.as_ref().unwrap()[0];
    assert_eq!(action.action_executor.as_deref(), Some("delay"));
    assert_eq!(
        action.executor_property.as_ref().unwrap(),
        &json!({ "hours": "0", "minutes": "5", "seconds": "0" })
    );
}

#[tokio::test]
async fn vendor_save_errors_pass_through_verbatim() {
    init_logging();
    let (_, service) = setup(MockVendor::new().with_save_error("30002", "scene limit reached"));
    let manager = SceneManager::new(service);
    let definition = definition(json!({ "homeId": 1, "name": "Too many" }));

    let err = manager.create(&definition).await.unwrap_err();

    match err {
        SceneError::Vendor { code, message } => {
            assert_eq!(code, "30002");
            assert_eq!(message, "scene limit reached");
        }
        other => panic!("expected a vendor error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_compile_failure_never_reaches_the_vendor() {
    init_logging();
    let (mock, service) = setup(MockVendor::new().with_datapoints("dev-1", &[1]));
    let manager = SceneManager::new(service);
    let definition = definition(json!({
        "homeId": 1,
        "conditions": [bool_condition("dev-1", 404)]
    }));

    let err = manager.create(&definition).await.unwrap_err();

    assert!(matches!(err, SceneError::CompileFailed(_)));
    assert!(mock.saved_scene().is_none());
}
