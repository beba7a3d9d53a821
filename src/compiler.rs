//! Scene compile orchestration.
//! Collects referenced devices, resolves their datapoints concurrently,
//! compiles every element with batch diagnostics and assembles the vendor
//! scene model. Compilation never persists anything.

use crate::action::{compile_action, compile_pre_condition};
use crate::condition::compile_condition;
use crate::dto::{SceneCondition, SceneDefinition};
use crate::error::{ElementError, Result, SceneElement, SceneError};
use crate::model::{MatchType, VendorScene};
use crate::resolver::DatapointTable;
use crate::service::SceneService;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Device ids referenced by conditions that need datapoint resolution.
///
/// Deduplicated and sorted; weather, timer and the other schema-free
/// kinds contribute nothing.
pub fn referenced_devices(definition: &SceneDefinition) -> BTreeSet<String> {
    let mut devices = BTreeSet::new();
    for condition in definition.conditions.as_deref().unwrap_or_default() {
        match condition {
            SceneCondition::Device { device_id, .. }
            | SceneCondition::Pir { device_id, .. }
            | SceneCondition::CalculateDuration { device_id, .. } => {
                if let Some(device_id) = device_id {
                    devices.insert(device_id.clone());
                }
            }
            _ => {}
        }
    }
    devices
}

/// Compile a scene definition into a vendor scene model.
///
/// Datapoint metadata is fetched once per distinct referenced device and
/// every fetch is joined before any element compiles. Elements compile
/// independently afterwards; all failures are collected into one
/// [`SceneError::CompileFailed`] so a bad element never masks the rest.
///
/// On create (no definition id) the model gets the vendor defaults:
/// match-any, not sticky, empty element lists. On edit only the fields the
/// definition carries are populated, so absent fields keep their stored
/// values.
pub async fn compile_scene(
    service: &Arc<dyn SceneService>,
    definition: &SceneDefinition,
) -> Result<VendorScene> {
    let devices = referenced_devices(definition);
    debug!(
        "Compiling scene '{}' referencing {} devices",
        definition.name.as_deref().unwrap_or(""),
        devices.len()
    );
    let table = DatapointTable::resolve(service, &devices).await;

    let mut errors = Vec::new();
    let conditions = definition.conditions.as_deref().map(|list| {
        compile_list(list, SceneElement::Condition, &mut errors, |condition| {
            compile_condition(condition, &table)
        })
    });
    let actions = definition
        .actions
        .as_deref()
        .map(|list| compile_list(list, SceneElement::Action, &mut errors, compile_action));
    let pre_conditions = definition.pre_conditions.as_deref().map(|list| {
        compile_list(
            list,
            SceneElement::PreCondition,
            &mut errors,
            compile_pre_condition,
        )
    });

    if !errors.is_empty() {
        return Err(SceneError::CompileFailed(errors));
    }

    let mut scene = VendorScene {
        id: definition.id.clone(),
        name: definition.name.clone(),
        sticky_on_top: definition.show_first_page,
        match_type: definition.match_type,
        conditions,
        actions,
        pre_conditions,
        ..Default::default()
    };

    if definition.id.is_none() {
        scene.match_type.get_or_insert(MatchType::Any.code());
        scene.sticky_on_top.get_or_insert(false);
        scene.conditions.get_or_insert_with(Vec::new);
        scene.actions.get_or_insert_with(Vec::new);
        scene.pre_conditions.get_or_insert_with(Vec::new);
    }

    Ok(scene)
}

/// Compile every element of one list, recording failures instead of
/// stopping at the first. The partial output is only used when no element
/// failed.
fn compile_list<T, R>(
    list: &[T],
    element: SceneElement,
    errors: &mut Vec<ElementError>,
    mut compile: impl FnMut(&T) -> Result<R>,
) -> Vec<R> {
    let mut compiled = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        match compile(item) {
            Ok(model) => compiled.push(model),
            Err(err) => errors.push(ElementError {
                element,
                index,
                reason: err.to_string(),
            }),
        }
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::SceneExpr;

    fn device_condition(device_id: &str) -> SceneCondition {
        SceneCondition::Device {
            device_id: Some(device_id.to_string()),
            dp_model_id: Some(1),
            expr: Some(SceneExpr::BoolValue {
                type_tag: Some("switch".to_string()),
                is_true: Some(true),
                expr_type: Some(1),
            }),
        }
    }

    fn definition_with(conditions: Vec<SceneCondition>) -> SceneDefinition {
        SceneDefinition {
            id: None,
            home_id: 1,
            name: None,
            show_first_page: None,
            match_type: None,
            actions: None,
            pre_conditions: None,
            conditions: Some(conditions),
        }
    }

    #[test]
    fn referenced_devices_deduplicates_across_kinds() {
        let definition = definition_with(vec![
            device_condition("dev-b"),
            device_condition("dev-a"),
            device_condition("dev-b"),
            SceneCondition::Pir {
                device_id: Some("dev-a".to_string()),
                dp_model_id: Some(2),
                expr: None,
            },
            SceneCondition::CalculateDuration {
                device_id: Some("dev-c".to_string()),
                dp_model_id: Some(3),
                expr: None,
                duration_seconds: Some(60),
            },
            SceneCondition::Manual,
            SceneCondition::Timer { expr: None },
        ]);

        let devices = referenced_devices(&definition);
        let ordered: Vec<_> = devices.iter().map(String::as_str).collect();
        assert_eq!(ordered, vec!["dev-a", "dev-b", "dev-c"]);
    }

    #[test]
    fn schema_free_scenes_reference_no_devices() {
        let definition = definition_with(vec![
            SceneCondition::Manual,
            SceneCondition::GeoFence {
                geo_type: Some(0),
                latitude: Some(1.0),
                longitude: Some(2.0),
                radius: Some(50.0),
                geo_title: Some("Home".to_string()),
            },
        ]);
        assert!(referenced_devices(&definition).is_empty());
    }

    #[test]
    fn conditions_without_a_device_id_are_skipped_by_collection() {
        let definition = definition_with(vec![SceneCondition::Device {
            device_id: None,
            dp_model_id: Some(1),
            expr: None,
        }]);
        // The missing id is a compile error later, not a resolver concern.
        assert!(referenced_devices(&definition).is_empty());
    }
}
