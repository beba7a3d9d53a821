//! Transport-neutral scene DTOs.
//! Tagged unions for actions, trigger conditions, pre-conditions and their
//! nested expressions, decoded from loosely-typed method-call payloads.
//! Parsing checks shape only; cross-field requirements belong to the
//! compilers.

use crate::error::{Result, SceneError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level aggregate describing a scene to create or edit.
///
/// Every field besides `home_id` is optional: an absent field on an edit
/// payload means "leave the stored value untouched", which is distinct
/// from an explicit empty list or `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDefinition {
    /// Present on edit, absent on create.
    pub id: Option<String>,
    pub home_id: i64,
    pub name: Option<String>,
    /// Pin-to-top flag, `stickyOnTop` on the vendor model.
    pub show_first_page: Option<bool>,
    /// 1 = any condition may match, 2 = all conditions must match.
    pub match_type: Option<i32>,
    pub actions: Option<Vec<SceneAction>>,
    pub pre_conditions: Option<Vec<ScenePreCondition>>,
    pub conditions: Option<Vec<SceneCondition>>,
}

/// A resolved city record, used by weather and sun-timer elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: i64,
    pub city: String,
    pub area: Option<String>,
    pub pinyin: Option<String>,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One scene action, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneAction {
    /// Issue datapoint values to a single device.
    DeviceDp {
        dev_id: Option<String>,
        dev_name: Option<String>,
        /// Wire spelling is `executerProperty` (sic).
        #[serde(rename = "executerProperty")]
        executor_property: Option<Value>,
        extra_property: Option<Value>,
    },
    /// Issue datapoint values to a device group.
    GroupDp {
        group_id: Option<String>,
        group_name: Option<String>,
        #[serde(rename = "executerProperty")]
        executor_property: Option<Value>,
        extra_property: Option<Value>,
    },
    /// Trigger another tap-to-run scene.
    TriggerScene {
        scene_id: Option<String>,
        scene_name: Option<String>,
    },
    /// Enable or disable another automation rule.
    SwitchAutomation {
        scene_id: Option<String>,
        scene_name: Option<String>,
        auto_switch_type: Option<i64>,
    },
    /// Pause between the surrounding actions. Components default to zero.
    Delay {
        delay_hours: Option<String>,
        delay_minutes: Option<String>,
        delay_seconds: Option<String>,
    },
    /// Push a notification through the vendor message center.
    SendNotification,
    /// Place an automated voice call.
    Call,
    /// Send a text message.
    Sms,
}

impl SceneAction {
    pub const KINDS: &'static [&'static str] = &[
        "deviceDp",
        "groupDp",
        "triggerScene",
        "switchAutomation",
        "delay",
        "sendNotification",
        "call",
        "sms",
    ];
}

/// A pre-condition restricting when an automation may fire.
/// All four kinds compile to the vendor's `timeCheck` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScenePreCondition {
    AllDay {
        scene_id: Option<String>,
        condition_id: Option<String>,
        loops: Option<String>,
        time_zone_id: Option<String>,
    },
    Daytime {
        scene_id: Option<String>,
        condition_id: Option<String>,
        loops: Option<String>,
        time_zone_id: Option<String>,
        city_id: Option<String>,
        city_name: Option<String>,
    },
    Night {
        scene_id: Option<String>,
        condition_id: Option<String>,
        loops: Option<String>,
        time_zone_id: Option<String>,
        city_id: Option<String>,
        city_name: Option<String>,
    },
    CustomTime {
        scene_id: Option<String>,
        condition_id: Option<String>,
        loops: Option<String>,
        time_zone_id: Option<String>,
        begin_time: Option<String>,
        end_time: Option<String>,
    },
}

impl ScenePreCondition {
    pub const KINDS: &'static [&'static str] = &["allDay", "daytime", "night", "customTime"];
}

/// A trigger condition, discriminated by `kind`.
///
/// The wire uses `geoFence` for the condition and `geofence` for its
/// nested expression; the variant names keep that cased distinction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneCondition {
    /// A device datapoint reaching a value.
    Device {
        device_id: Option<String>,
        dp_model_id: Option<i64>,
        expr: Option<SceneExpr>,
    },
    /// A motion sensor report, same shape as `device`.
    Pir {
        device_id: Option<String>,
        dp_model_id: Option<i64>,
        expr: Option<SceneExpr>,
    },
    /// A weather report for a city. Needs no datapoint resolution.
    Weather {
        city: Option<City>,
        expr: Option<SceneExpr>,
    },
    /// A schedule firing.
    Timer { expr: Option<SceneExpr> },
    /// Sunrise or sunset at a city, with an offset.
    SunTimer {
        city: Option<City>,
        expr: Option<SceneExpr>,
    },
    /// Crossing a circular geofence.
    GeoFence {
        geo_type: Option<i64>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius: Option<f64>,
        geo_title: Option<String>,
    },
    /// Tap-to-run; the scene fires only by hand.
    Manual,
    /// A datapoint holding a value for a duration.
    CalculateDuration {
        device_id: Option<String>,
        dp_model_id: Option<i64>,
        expr: Option<SceneExpr>,
        duration_seconds: Option<i64>,
    },
    /// Family-member arrival. Accepted on the wire, not compilable.
    MemberBackHome {
        device_id: Option<String>,
        entity_sub_ids: Option<String>,
        member_ids: Option<String>,
        member_names: Option<String>,
    },
}

impl SceneCondition {
    pub const KINDS: &'static [&'static str] = &[
        "device",
        "pir",
        "weather",
        "timer",
        "sunTimer",
        "geoFence",
        "manual",
        "calculateDuration",
        "memberBackHome",
    ];
}

/// The nested expression of a trigger condition, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneExpr {
    /// A boolean datapoint equalling `isTrue`.
    BoolValue {
        #[serde(rename = "type")]
        type_tag: Option<String>,
        is_true: Option<bool>,
        expr_type: Option<i64>,
    },
    /// An enum datapoint equalling a string choice.
    EnumValue {
        #[serde(rename = "type")]
        type_tag: Option<String>,
        choose_value: Option<Value>,
        expr_type: Option<i64>,
    },
    /// A numeric datapoint compared against an integer.
    CompareValue {
        #[serde(rename = "type")]
        type_tag: Option<String>,
        compare_operator: Option<String>,
        choose_value: Option<Value>,
        expr_type: Option<i64>,
    },
    /// A raw datapoint report, no value clause.
    Raw {
        #[serde(rename = "type")]
        type_tag: Option<String>,
        expr_type: Option<i64>,
    },
    /// A schedule: date, time of day and weekday loops.
    Timer {
        time_zone_id: Option<String>,
        loops: Option<String>,
        date: Option<String>,
        time: Option<String>,
    },
    /// Sunrise/sunset at a city offset by whole minutes.
    SunTimer {
        city: Option<City>,
        sun_type: Option<i64>,
        delta_minutes: Option<i64>,
    },
    /// Geofence transition selector.
    Geofence { geo_fence_type: Option<i64> },
    /// Duration clause over a datapoint.
    Calculate {
        dp_id: Option<String>,
        dp_type: Option<String>,
        selected_value: Option<Value>,
    },
    /// Member arrival selector.
    MemberBackHome { member_ids: Option<String> },
}

impl SceneExpr {
    pub const KINDS: &'static [&'static str] = &[
        "boolValue",
        "enumValue",
        "compareValue",
        "raw",
        "timer",
        "sunTimer",
        "geofence",
        "calculate",
        "memberBackHome",
    ];
}

/// Parse a loosely-typed method-call payload into a [`SceneDefinition`].
///
/// Unknown `kind` discriminators anywhere in the payload are reported as
/// [`SceneError::UnknownKind`] with the offending string; any other shape
/// problem carries the decoder's message as [`SceneError::Decode`].
pub fn parse_definition(args: Value) -> Result<SceneDefinition> {
    check_kinds(&args)?;
    serde_json::from_value(args).map_err(|err| SceneError::Decode(err.to_string()))
}

/// Pre-scan every discriminator so an unknown kind names itself instead of
/// surfacing as a generic decoder message. A missing or non-string `kind`
/// falls through to the decoder.
fn check_kinds(args: &Value) -> Result<()> {
    if let Some(actions) = args.get("actions").and_then(Value::as_array) {
        for action in actions {
            check_kind("action", SceneAction::KINDS, action)?;
        }
    }
    if let Some(pre_conditions) = args.get("preConditions").and_then(Value::as_array) {
        for pre_condition in pre_conditions {
            check_kind("preCondition", ScenePreCondition::KINDS, pre_condition)?;
        }
    }
    if let Some(conditions) = args.get("conditions").and_then(Value::as_array) {
        for condition in conditions {
            check_kind("condition", SceneCondition::KINDS, condition)?;
            if let Some(expr) = condition.get("expr") {
                if !expr.is_null() {
                    check_kind("expr", SceneExpr::KINDS, expr)?;
                }
            }
        }
    }
    Ok(())
}

fn check_kind(entity: &'static str, kinds: &[&str], element: &Value) -> Result<()> {
    match element.get("kind").and_then(Value::as_str) {
        Some(kind) if !kinds.contains(&kind) => Err(SceneError::UnknownKind {
            entity,
            kind: kind.to_string(),
        }),
        _ => Ok(()),
    }
}
