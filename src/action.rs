//! Action and pre-condition compilers.
//! Pure field validation plus vendor model construction; no I/O, no
//! datapoint resolution.

use crate::dto::{SceneAction, ScenePreCondition};
use crate::error::{Result, SceneError};
use crate::model::{
    ActionExecutor, COND_TYPE_TIME_CHECK, TimeInterval, VendorAction, VendorPreCondition,
    VendorPreConditionExpr,
};
use serde_json::json;

/// Absent delay components default to zero, the one sanctioned silent
/// default of the action compilers.
const DELAY_DEFAULT: &str = "0";

/// Compile one action DTO into its vendor model.
pub fn compile_action(action: &SceneAction) -> Result<VendorAction> {
    match action {
        SceneAction::DeviceDp {
            dev_id,
            dev_name,
            executor_property,
            extra_property,
        } => {
            let dev_id = dev_id.as_deref().ok_or(missing("deviceDp", "devId"))?;
            let dev_name = dev_name.as_deref().ok_or(missing("deviceDp", "devName"))?;
            let property = executor_property
                .clone()
                .ok_or(missing("deviceDp", "executerProperty"))?;
            Ok(VendorAction {
                action_executor: Some(ActionExecutor::DpIssue.as_str().to_string()),
                entity_id: Some(dev_id.to_string()),
                entity_name: Some(dev_name.to_string()),
                executor_property: Some(property),
                extra_property: extra_property.clone(),
                ..Default::default()
            })
        }
        SceneAction::GroupDp {
            group_id,
            group_name,
            executor_property,
            extra_property,
        } => {
            let group_id = group_id.as_deref().ok_or(missing("groupDp", "groupId"))?;
            let group_name = group_name
                .as_deref()
                .ok_or(missing("groupDp", "groupName"))?;
            let property = executor_property
                .clone()
                .ok_or(missing("groupDp", "executerProperty"))?;
            Ok(VendorAction {
                action_executor: Some(ActionExecutor::DeviceGroupDpIssue.as_str().to_string()),
                entity_id: Some(group_id.to_string()),
                entity_name: Some(group_name.to_string()),
                executor_property: Some(property),
                extra_property: extra_property.clone(),
                ..Default::default()
            })
        }
        SceneAction::TriggerScene {
            scene_id,
            scene_name,
        } => {
            let scene_id = scene_id
                .as_deref()
                .ok_or(missing("triggerScene", "sceneId"))?;
            let scene_name = scene_name
                .as_deref()
                .ok_or(missing("triggerScene", "sceneName"))?;
            Ok(VendorAction {
                action_executor: Some(ActionExecutor::RuleTrigger.as_str().to_string()),
                entity_id: Some(scene_id.to_string()),
                entity_name: Some(scene_name.to_string()),
                ..Default::default()
            })
        }
        SceneAction::SwitchAutomation {
            scene_id,
            scene_name,
            auto_switch_type,
        } => {
            let scene_id = scene_id
                .as_deref()
                .ok_or(missing("switchAutomation", "sceneId"))?;
            let scene_name = scene_name
                .as_deref()
                .ok_or(missing("switchAutomation", "sceneName"))?;
            let switch = auto_switch_type.ok_or(missing("switchAutomation", "autoSwitchType"))?;
            Ok(VendorAction {
                action_executor: Some(ActionExecutor::Toggle.as_str().to_string()),
                entity_id: Some(scene_id.to_string()),
                entity_name: Some(scene_name.to_string()),
                executor_property: Some(json!({ "switch": switch })),
                ..Default::default()
            })
        }
        SceneAction::Delay {
            delay_hours,
            delay_minutes,
            delay_seconds,
        } => Ok(VendorAction {
            action_executor: Some(ActionExecutor::Delay.as_str().to_string()),
            executor_property: Some(json!({
                "hours": delay_hours.as_deref().unwrap_or(DELAY_DEFAULT),
                "minutes": delay_minutes.as_deref().unwrap_or(DELAY_DEFAULT),
                "seconds": delay_seconds.as_deref().unwrap_or(DELAY_DEFAULT),
            })),
            ..Default::default()
        }),
        SceneAction::SendNotification => Ok(bare_action(ActionExecutor::AppPushTrigger)),
        SceneAction::Call => Ok(bare_action(ActionExecutor::MobileVoiceSend)),
        SceneAction::Sms => Ok(bare_action(ActionExecutor::SmsSend)),
    }
}

/// Compile one pre-condition DTO into the vendor `timeCheck` record.
///
/// Every kind requires `loops` and `timeZoneId`; daytime and night also
/// need the city that anchors the sun calculation, customTime needs its
/// window bounds.
pub fn compile_pre_condition(pre_condition: &ScenePreCondition) -> Result<VendorPreCondition> {
    match pre_condition {
        ScenePreCondition::AllDay {
            condition_id,
            loops,
            time_zone_id,
            ..
        } => {
            let expr = time_check_expr("allDay", TimeInterval::AllDay, loops, time_zone_id)?;
            Ok(time_check(condition_id, expr))
        }
        ScenePreCondition::Daytime {
            condition_id,
            loops,
            time_zone_id,
            city_id,
            city_name,
            ..
        } => {
            let city_id = city_id.as_deref().ok_or(missing("daytime", "cityId"))?;
            let city_name = city_name.as_deref().ok_or(missing("daytime", "cityName"))?;
            let mut expr = time_check_expr("daytime", TimeInterval::Daytime, loops, time_zone_id)?;
            expr.city_id = Some(city_id.to_string());
            expr.city_name = Some(city_name.to_string());
            Ok(time_check(condition_id, expr))
        }
        ScenePreCondition::Night {
            condition_id,
            loops,
            time_zone_id,
            city_id,
            city_name,
            ..
        } => {
            let city_id = city_id.as_deref().ok_or(missing("night", "cityId"))?;
            let city_name = city_name.as_deref().ok_or(missing("night", "cityName"))?;
            let mut expr = time_check_expr("night", TimeInterval::Night, loops, time_zone_id)?;
            expr.city_id = Some(city_id.to_string());
            expr.city_name = Some(city_name.to_string());
            Ok(time_check(condition_id, expr))
        }
        ScenePreCondition::CustomTime {
            condition_id,
            loops,
            time_zone_id,
            begin_time,
            end_time,
            ..
        } => {
            let begin = begin_time
                .as_deref()
                .ok_or(missing("customTime", "beginTime"))?;
            let end = end_time.as_deref().ok_or(missing("customTime", "endTime"))?;
            let mut expr = time_check_expr("customTime", TimeInterval::Custom, loops, time_zone_id)?;
            expr.start = Some(begin.to_string());
            expr.end = Some(end.to_string());
            Ok(time_check(condition_id, expr))
        }
    }
}

fn bare_action(executor: ActionExecutor) -> VendorAction {
    VendorAction {
        action_executor: Some(executor.as_str().to_string()),
        ..Default::default()
    }
}

fn time_check_expr(
    kind: &'static str,
    interval: TimeInterval,
    loops: &Option<String>,
    time_zone_id: &Option<String>,
) -> Result<VendorPreConditionExpr> {
    let loops = loops.as_deref().ok_or(missing(kind, "loops"))?;
    let time_zone_id = time_zone_id
        .as_deref()
        .ok_or(missing(kind, "timeZoneId"))?;
    Ok(VendorPreConditionExpr {
        time_zone_id: Some(time_zone_id.to_string()),
        loops: Some(loops.to_string()),
        time_interval: Some(interval.as_str().to_string()),
        ..Default::default()
    })
}

fn time_check(condition_id: &Option<String>, expr: VendorPreConditionExpr) -> VendorPreCondition {
    VendorPreCondition {
        id: condition_id.clone(),
        cond_type: Some(COND_TYPE_TIME_CHECK.to_string()),
        expr,
    }
}

fn missing(kind: &'static str, field: &'static str) -> SceneError {
    SceneError::MissingField { kind, field }
}
