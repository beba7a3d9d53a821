//! Vendor boundary and the high-level scene manager.
//! The vendor SDK is injected behind a service trait rather than reached
//! as global state; vendor (code, message) failures pass through verbatim.

use crate::compiler::compile_scene;
use crate::dto::SceneDefinition;
use crate::error::{Result, SceneError};
use crate::model::VendorScene;
use crate::resolver::DatapointMetadata;
use crate::serialize::scene_to_map;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Asynchronous boundary over the vendor scene SDK.
///
/// One implementation per platform binding; tests substitute a recording
/// mock. Every method resolves to its value or to a
/// [`SceneError::Vendor`] carrying the vendor's own code and message.
#[async_trait]
pub trait SceneService: Send + Sync {
    /// Lightweight scene models for one home.
    async fn simple_scene_list(&self, home_id: i64) -> Result<Vec<VendorScene>>;

    /// One scene with its full element lists.
    async fn scene_detail(
        &self,
        home_id: i64,
        scene_id: &str,
        rule_genre: i32,
        support_home: bool,
    ) -> Result<VendorScene>;

    /// Persist a new scene; resolves to the stored model with vendor ids.
    async fn save_scene(&self, home_id: i64, scene: VendorScene) -> Result<VendorScene>;

    /// Merge a partial model into an existing scene; resolves to the
    /// updated model.
    async fn modify_scene(&self, scene_id: &str, scene: VendorScene) -> Result<VendorScene>;

    /// Remove a scene from its home.
    async fn delete_scene(&self, home_id: i64, scene_id: &str) -> Result<bool>;

    /// Fire a tap-to-run scene immediately.
    async fn execute_scene(&self, scene_id: &str) -> Result<()>;

    /// Enable an automation rule.
    async fn enable_automation(&self, scene_id: &str) -> Result<bool>;

    /// Disable an automation rule.
    async fn disable_automation(&self, scene_id: &str) -> Result<bool>;

    /// Condition-capable datapoint metadata of one device.
    async fn condition_datapoints(&self, device_id: &str) -> Result<Vec<DatapointMetadata>>;
}

/// High-level scene API over an injected vendor boundary.
///
/// Write operations compile first and persist second; a compile failure
/// never reaches the vendor. Replies are already in transport map shape.
#[derive(Clone)]
pub struct SceneManager {
    service: Arc<dyn SceneService>,
}

impl SceneManager {
    pub fn new(service: Arc<dyn SceneService>) -> Self {
        SceneManager { service }
    }

    /// The injected vendor boundary.
    pub fn service(&self) -> &Arc<dyn SceneService> {
        &self.service
    }

    /// Scene summaries for one home.
    pub async fn list(&self, home_id: i64) -> Result<Vec<Map<String, Value>>> {
        let scenes = self.service.simple_scene_list(home_id).await?;
        debug!("Listed {} scenes for home {}", scenes.len(), home_id);
        Ok(scenes.iter().map(scene_to_map).collect())
    }

    /// One scene in full detail.
    pub async fn detail(
        &self,
        home_id: i64,
        scene_id: &str,
        rule_genre: i32,
        support_home: bool,
    ) -> Result<Map<String, Value>> {
        let scene = self
            .service
            .scene_detail(home_id, scene_id, rule_genre, support_home)
            .await?;
        Ok(scene_to_map(&scene))
    }

    /// Compile a definition and persist it as a new scene.
    pub async fn create(&self, definition: &SceneDefinition) -> Result<Map<String, Value>> {
        let scene = compile_scene(&self.service, definition).await?;
        let saved = self.service.save_scene(definition.home_id, scene).await?;
        info!(
            "Created scene '{}' in home {}",
            saved.name.as_deref().unwrap_or(""),
            definition.home_id
        );
        Ok(scene_to_map(&saved))
    }

    /// Compile a partial definition and merge it into an existing scene.
    ///
    /// Only the fields the definition carries reach the modify payload;
    /// everything absent keeps its stored value.
    pub async fn edit(&self, definition: &SceneDefinition) -> Result<Map<String, Value>> {
        let scene_id = definition.id.as_deref().ok_or(SceneError::MissingField {
            kind: "definition",
            field: "id",
        })?;
        let scene = compile_scene(&self.service, definition).await?;
        let updated = self.service.modify_scene(scene_id, scene).await?;
        info!("Modified scene {}", scene_id);
        Ok(scene_to_map(&updated))
    }

    /// Remove a scene from a home.
    pub async fn remove(&self, home_id: i64, scene_id: &str) -> Result<bool> {
        let removed = self.service.delete_scene(home_id, scene_id).await?;
        info!("Removed scene {} from home {}", scene_id, home_id);
        Ok(removed)
    }

    /// Fire a tap-to-run scene; resolves to `true` once the vendor accepts
    /// the trigger.
    pub async fn run(&self, scene_id: &str) -> Result<bool> {
        self.service.execute_scene(scene_id).await?;
        info!("Executed scene {}", scene_id);
        Ok(true)
    }

    /// Enable or disable an automation rule.
    pub async fn set_automation(&self, scene_id: &str, enabled: bool) -> Result<bool> {
        if enabled {
            self.service.enable_automation(scene_id).await
        } else {
            self.service.disable_automation(scene_id).await
        }
    }
}
