//! Trigger-condition compiler.
//! Dispatches on condition kind, compiles the nested expression and
//! enforces datapoint relational integrity through the resolver table.

use crate::dto::{SceneCondition, SceneExpr};
use crate::error::{Result, SceneError};
use crate::expr::compile_expr;
use crate::model::{ConditionEntityType, GeofenceType, VendorCondition};
use crate::resolver::{DatapointMetadata, DatapointTable};
use serde_json::{Value, json};

/// Entity id the vendor assigns to schedule conditions.
const TIMER_ENTITY_ID: &str = "timer";

/// Compile one trigger condition into its vendor model.
///
/// Device-backed kinds are checked against the resolver table: the
/// referenced datapoint must exist on the device schema or compilation
/// fails, there is no placeholder fallback. Weather and schedule kinds
/// never touch the table.
pub fn compile_condition(
    condition: &SceneCondition,
    table: &DatapointTable,
) -> Result<VendorCondition> {
    match condition {
        SceneCondition::Device {
            device_id,
            dp_model_id,
            expr,
        } => datapoint_condition(
            ConditionEntityType::Device,
            "device",
            device_id,
            dp_model_id,
            expr,
            table,
        ),
        SceneCondition::Pir {
            device_id,
            dp_model_id,
            expr,
        } => datapoint_condition(
            ConditionEntityType::Pir,
            "pir",
            device_id,
            dp_model_id,
            expr,
            table,
        ),
        SceneCondition::Weather { city, expr } => {
            let city = city.as_ref().ok_or(missing("weather", "city"))?;
            let expr = expr.as_ref().ok_or(missing("weather", "expr"))?;
            let compiled = compile_expr(expr)?;
            Ok(VendorCondition {
                entity_type: ConditionEntityType::Weather.code(),
                entity_id: Some(city.city_id.to_string()),
                entity_name: Some(city.city.clone()),
                expr: compiled.expr,
                ..Default::default()
            })
        }
        SceneCondition::Timer { expr } => {
            let expr = expr.as_ref().ok_or(missing("timer", "expr"))?;
            let compiled = compile_expr(expr)?;
            Ok(VendorCondition {
                entity_type: ConditionEntityType::Timer.code(),
                entity_id: Some(TIMER_ENTITY_ID.to_string()),
                expr: compiled.expr,
                ..Default::default()
            })
        }
        SceneCondition::SunTimer { city, expr } => {
            let city = city.as_ref().ok_or(missing("sunTimer", "city"))?;
            let expr = expr.as_ref().ok_or(missing("sunTimer", "expr"))?;
            let compiled = compile_expr(expr)?;
            Ok(VendorCondition {
                entity_type: ConditionEntityType::SunTimer.code(),
                entity_id: Some(city.city_id.to_string()),
                entity_name: Some(city.city.clone()),
                expr: compiled.expr,
                ..Default::default()
            })
        }
        SceneCondition::GeoFence {
            geo_type,
            latitude,
            longitude,
            radius,
            geo_title,
        } => {
            let code = geo_type.ok_or(missing("geoFence", "geoType"))?;
            let latitude = latitude.ok_or(missing("geoFence", "latitude"))?;
            let longitude = longitude.ok_or(missing("geoFence", "longitude"))?;
            let radius = radius.ok_or(missing("geoFence", "radius"))?;
            let title = geo_title.as_deref().ok_or(missing("geoFence", "geoTitle"))?;
            Ok(VendorCondition {
                entity_type: ConditionEntityType::Geofence.code(),
                entity_name: Some(title.to_string()),
                expr: json!([["$geofence", "==", GeofenceType::from_code(code).as_str()]]),
                extra_info: Some(json!({
                    "radius": radius,
                    "latitude": latitude,
                    "longitude": longitude,
                })),
                ..Default::default()
            })
        }
        SceneCondition::Manual => Ok(VendorCondition {
            entity_type: ConditionEntityType::Manual.code(),
            expr: json!([]),
            ..Default::default()
        }),
        SceneCondition::CalculateDuration {
            device_id,
            dp_model_id,
            expr,
            duration_seconds,
        } => {
            let device_id = device_id
                .as_deref()
                .ok_or(missing("calculateDuration", "deviceId"))?;
            let dp_id = dp_model_id.ok_or(missing("calculateDuration", "dpModelId"))?;
            let expr = expr
                .as_ref()
                .ok_or(missing("calculateDuration", "expr"))?;
            let duration = duration_seconds.ok_or(missing("calculateDuration", "durationSeconds"))?;
            let compiled = compile_expr(expr)?;
            let metadata = table.find(device_id, dp_id)?;
            Ok(VendorCondition {
                entity_type: ConditionEntityType::Calculate.code(),
                entity_id: Some(device_id.to_string()),
                entity_sub_ids: Some(dp_id.to_string()),
                duration: Some(duration.to_string()),
                expr: compiled.expr,
                extra_info: Some(extra_info(metadata)),
                ..Default::default()
            })
        }
        SceneCondition::MemberBackHome { .. } => Err(SceneError::Unsupported(
            "memberBackHome conditions have no vendor compilation".to_string(),
        )),
    }
}

fn datapoint_condition(
    entity_type: ConditionEntityType,
    kind: &'static str,
    device_id: &Option<String>,
    dp_model_id: &Option<i64>,
    expr: &Option<SceneExpr>,
    table: &DatapointTable,
) -> Result<VendorCondition> {
    let device_id = device_id
        .as_deref()
        .ok_or(missing(kind, "deviceId"))?;
    let dp_id = dp_model_id.ok_or(missing(kind, "dpModelId"))?;
    let expr = expr.as_ref().ok_or(missing(kind, "expr"))?;
    let compiled = compile_expr(expr)?;
    let metadata = table.find(device_id, dp_id)?;
    Ok(VendorCondition {
        entity_type: entity_type.code(),
        entity_id: Some(device_id.to_string()),
        entity_sub_ids: Some(dp_id.to_string()),
        expr: compiled.expr,
        extra_info: Some(extra_info(metadata)),
        ..Default::default()
    })
}

/// Datapoint metadata carried alongside device-backed conditions.
fn extra_info(metadata: &DatapointMetadata) -> Value {
    json!({
        "dpId": metadata.dp_id,
        "dpName": metadata.name,
        "valueType": metadata.value_type,
        "schema": metadata.schema,
    })
}

fn missing(kind: &'static str, field: &'static str) -> SceneError {
    SceneError::MissingField { kind, field }
}
