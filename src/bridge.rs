//! Method-call dispatch for the scene surface.
//! Requests arrive as a method name plus a loosely-typed argument value;
//! replies are a JSON value or a (code, message, details) error triple.

use crate::dto::parse_definition;
use crate::error::SceneError;
use crate::service::{SceneManager, SceneService};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

// ---- Method names ----

pub const METHOD_GET_SCENE_LIST: &str = "getSceneList";
pub const METHOD_FETCH_SCENE_DETAIL: &str = "fetchSceneDetail";
pub const METHOD_ADD_SCENE: &str = "addScene";
pub const METHOD_EDIT_SCENE: &str = "editScene";
pub const METHOD_REMOVE_SCENE: &str = "removeScene";
pub const METHOD_RUN_SCENE: &str = "runScene";
pub const METHOD_CHANGE_AUTOMATION: &str = "changeAutomation";

/// Code reported for a method name outside the scene surface.
pub const CODE_NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";

/// One transport request.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        MethodCall {
            method: method.into(),
            args,
        }
    }

    fn i64_arg(&self, name: &str) -> Result<i64, SceneError> {
        self.args
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| SceneError::MissingArgument(name.to_string()))
    }

    fn str_arg(&self, name: &str) -> Result<&str, SceneError> {
        self.args
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| SceneError::MissingArgument(name.to_string()))
    }

    fn bool_arg(&self, name: &str) -> Result<bool, SceneError> {
        self.args
            .get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| SceneError::MissingArgument(name.to_string()))
    }
}

/// The (code, message, details) triple every failed call reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    fn not_implemented(method: &str) -> Self {
        ErrorResponse {
            code: CODE_NOT_IMPLEMENTED.to_string(),
            message: format!("Method '{}' is not implemented", method),
            details: None,
        }
    }
}

impl From<SceneError> for ErrorResponse {
    fn from(err: SceneError) -> Self {
        let details = match &err {
            SceneError::CompileFailed(elements) => Some(
                elements
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        };
        ErrorResponse {
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Scene method dispatcher over a [`SceneManager`].
pub struct SceneBridge {
    manager: SceneManager,
}

impl SceneBridge {
    pub fn new(service: Arc<dyn SceneService>) -> Self {
        SceneBridge {
            manager: SceneManager::new(service),
        }
    }

    /// The manager backing this bridge.
    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    /// Dispatch one method call to its handler.
    pub async fn handle(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        debug!("Handling method call '{}'", call.method);
        match call.method.as_str() {
            METHOD_GET_SCENE_LIST => self.scene_list(call).await,
            METHOD_FETCH_SCENE_DETAIL => self.scene_detail(call).await,
            METHOD_ADD_SCENE => self.add_scene(call).await,
            METHOD_EDIT_SCENE => self.edit_scene(call).await,
            METHOD_REMOVE_SCENE => self.remove_scene(call).await,
            METHOD_RUN_SCENE => self.run_scene(call).await,
            METHOD_CHANGE_AUTOMATION => self.change_automation(call).await,
            _ => Err(ErrorResponse::not_implemented(&call.method)),
        }
    }

    async fn scene_list(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let home_id = call.i64_arg("homeId")?;
        let scenes = self.manager.list(home_id).await?;
        Ok(Value::Array(scenes.into_iter().map(Value::Object).collect()))
    }

    async fn scene_detail(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let home_id = call.i64_arg("homeId")?;
        let scene_id = call.str_arg("sceneId")?;
        let rule_genre = call.i64_arg("ruleGenre")? as i32;
        let support_home = call.bool_arg("supportHome")?;
        let scene = self
            .manager
            .detail(home_id, scene_id, rule_genre, support_home)
            .await?;
        Ok(Value::Object(scene))
    }

    async fn add_scene(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let definition = parse_definition(call.args.clone())?;
        let scene = self.manager.create(&definition).await?;
        Ok(Value::Object(scene))
    }

    async fn edit_scene(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let definition = parse_definition(call.args.clone())?;
        let scene = self.manager.edit(&definition).await?;
        Ok(Value::Object(scene))
    }

    async fn remove_scene(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let home_id = call.i64_arg("homeId")?;
        let scene_id = call.str_arg("sceneId")?;
        let removed = self.manager.remove(home_id, scene_id).await?;
        Ok(Value::Bool(removed))
    }

    async fn run_scene(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let scene_id = call.str_arg("sceneId")?;
        let executed = self.manager.run(scene_id).await?;
        Ok(Value::Bool(executed))
    }

    async fn change_automation(&self, call: &MethodCall) -> Result<Value, ErrorResponse> {
        let scene_id = call.str_arg("sceneId")?;
        let enable = call.bool_arg("status")?;
        let changed = self.manager.set_automation(scene_id, enable).await?;
        Ok(Value::Bool(changed))
    }
}
