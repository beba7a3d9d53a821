//! Expression compiler.
//! Turns expression DTOs into the vendor clause payloads, validating every
//! kind-specific field before touching it. Nothing here is async and
//! nothing mutates its input.

use crate::dto::SceneExpr;
use crate::error::{Result, SceneError};
use crate::model::{ExprType, GeofenceType, SunType, VendorExpr};
use serde_json::json;

/// Compile one expression DTO into its vendor payload.
///
/// Valued kinds require an explicit `exprType` family tag; unknown codes
/// fall back to the device family. `chooseValue` must carry the exact
/// primitive its kind expects, a string for enum expressions and an
/// integer for compare expressions.
pub fn compile_expr(expr: &SceneExpr) -> Result<VendorExpr> {
    match expr {
        SceneExpr::BoolValue {
            type_tag,
            is_true,
            expr_type,
        } => {
            let tag = type_tag
                .as_deref()
                .ok_or(missing("boolValue", "type"))?;
            let truth = is_true.ok_or(missing("boolValue", "isTrue"))?;
            Ok(VendorExpr {
                expr_type: family("boolValue", expr_type)?,
                expr: json!([[format!("${tag}"), "==", truth]]),
            })
        }
        SceneExpr::EnumValue {
            type_tag,
            choose_value,
            expr_type,
        } => {
            let tag = type_tag
                .as_deref()
                .ok_or(missing("enumValue", "type"))?;
            let value = choose_value
                .as_ref()
                .ok_or(missing("enumValue", "chooseValue"))?;
            let chosen = value.as_str().ok_or(SceneError::TypeMismatch {
                kind: "enumValue",
                field: "chooseValue",
                expected: "a string",
            })?;
            Ok(VendorExpr {
                expr_type: family("enumValue", expr_type)?,
                expr: json!([[format!("${tag}"), "==", chosen]]),
            })
        }
        SceneExpr::CompareValue {
            type_tag,
            compare_operator,
            choose_value,
            expr_type,
        } => {
            let tag = type_tag
                .as_deref()
                .ok_or(missing("compareValue", "type"))?;
            let operator = compare_operator
                .as_deref()
                .ok_or(missing("compareValue", "compareOperator"))?;
            let value = choose_value
                .as_ref()
                .ok_or(missing("compareValue", "chooseValue"))?;
            let chosen = value.as_i64().ok_or(SceneError::TypeMismatch {
                kind: "compareValue",
                field: "chooseValue",
                expected: "an integer",
            })?;
            Ok(VendorExpr {
                expr_type: family("compareValue", expr_type)?,
                expr: json!([[format!("${tag}"), operator, chosen]]),
            })
        }
        SceneExpr::Raw { type_tag, expr_type } => {
            let tag = type_tag.as_deref().ok_or(missing("raw", "type"))?;
            Ok(VendorExpr {
                expr_type: family("raw", expr_type)?,
                expr: json!([[format!("${tag}")]]),
            })
        }
        SceneExpr::Timer {
            time_zone_id,
            loops,
            date,
            time,
        } => {
            let time_zone_id = time_zone_id
                .as_deref()
                .ok_or(missing("timer", "timeZoneId"))?;
            let loops = loops.as_deref().ok_or(missing("timer", "loops"))?;
            let date = date.as_deref().ok_or(missing("timer", "date"))?;
            let time = time.as_deref().ok_or(missing("timer", "time"))?;
            Ok(VendorExpr {
                expr_type: ExprType::Device,
                expr: json!({
                    "timeZoneId": time_zone_id,
                    "loops": loops,
                    "date": date,
                    "time": time,
                }),
            })
        }
        SceneExpr::SunTimer {
            city,
            sun_type,
            delta_minutes,
        } => {
            let city = city.as_ref().ok_or(missing("sunTimer", "city"))?;
            let sun_type = sun_type.ok_or(missing("sunTimer", "sunType"))?;
            let delta = delta_minutes.ok_or(missing("sunTimer", "deltaMinutes"))?;
            Ok(VendorExpr {
                expr_type: ExprType::Device,
                expr: json!({
                    "cityId": city.city_id,
                    "city": city.city,
                    "type": SunType::from_code(sun_type).as_str(),
                    "delta": delta,
                }),
            })
        }
        SceneExpr::Geofence { geo_fence_type } => {
            let code = geo_fence_type.ok_or(missing("geofence", "geoFenceType"))?;
            Ok(VendorExpr {
                expr_type: ExprType::Device,
                expr: json!([["$geofence", "==", GeofenceType::from_code(code).as_str()]]),
            })
        }
        SceneExpr::Calculate {
            dp_id,
            dp_type,
            selected_value,
        } => {
            let dp_id = dp_id.as_deref().ok_or(missing("calculate", "dpId"))?;
            if dp_type.is_none() {
                return Err(missing("calculate", "dpType"));
            }
            let selected = selected_value
                .as_ref()
                .ok_or(missing("calculate", "selectedValue"))?;
            Ok(VendorExpr {
                expr_type: ExprType::Device,
                expr: json!([[format!("$dp{dp_id}"), "==", selected]]),
            })
        }
        SceneExpr::MemberBackHome { member_ids } => {
            let members = member_ids
                .as_deref()
                .ok_or(missing("memberBackHome", "memberIds"))?;
            Ok(VendorExpr {
                expr_type: ExprType::Device,
                expr: json!({ "members": members }),
            })
        }
    }
}

fn missing(kind: &'static str, field: &'static str) -> SceneError {
    SceneError::MissingField { kind, field }
}

fn family(kind: &'static str, expr_type: &Option<i64>) -> Result<ExprType> {
    let code = expr_type.ok_or(SceneError::MissingField {
        kind,
        field: "exprType",
    })?;
    Ok(ExprType::from_code(code))
}
