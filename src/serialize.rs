//! Vendor scene serialization to the transport map shape.
//! Pure and total over any vendor model: absent scalars become explicit
//! nulls, absent lists empty lists, absent property maps empty maps. A key
//! is never omitted, so replies always have the same shape.

use crate::model::{VendorAction, VendorCondition, VendorPreCondition, VendorScene};
use serde_json::{Map, Value};

/// Serialize one vendor scene for the read path and the create/edit echo.
pub fn scene_to_map(scene: &VendorScene) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("id".to_string(), null_or(&scene.id));
    map.insert("name".to_string(), null_or(&scene.name));
    map.insert("gwId".to_string(), null_or(&scene.gw_id));
    map.insert("coverIcon".to_string(), null_or(&scene.cover_icon));
    map.insert("displayColor".to_string(), null_or(&scene.display_color));
    map.insert("background".to_string(), null_or(&scene.background));
    map.insert("isEnabled".to_string(), null_or(&scene.enabled));
    map.insert("isStickyOnTop".to_string(), null_or(&scene.sticky_on_top));
    map.insert(
        "isNewLocalScene".to_string(),
        null_or(&scene.new_local_scene),
    );
    map.insert("isLocalLinkage".to_string(), null_or(&scene.local_linkage));
    map.insert("linkageType".to_string(), null_or(&scene.linkage_type));
    map.insert("ruleGenre".to_string(), null_or(&scene.rule_genre));
    map.insert("arrowIconUrl".to_string(), null_or(&scene.arrow_icon_url));
    map.insert("outOfWork".to_string(), null_or(&scene.out_of_work));
    map.insert("panelType".to_string(), null_or(&scene.panel_type));
    map.insert("matchType".to_string(), null_or(&scene.match_type));
    map.insert("categorys".to_string(), category_list(&scene.categorys));
    map.insert("conditions".to_string(), condition_list(&scene.conditions));
    map.insert(
        "statusConditions".to_string(),
        condition_list(&scene.status_conditions),
    );
    map.insert("actions".to_string(), action_list(&scene.actions));
    map.insert(
        "preConditions".to_string(),
        pre_condition_list(&scene.pre_conditions),
    );
    map
}

fn null_or<T>(value: &Option<T>) -> Value
where
    T: Clone,
    Value: From<T>,
{
    value.clone().map_or(Value::Null, Value::from)
}

fn category_list(categorys: &Option<Vec<String>>) -> Value {
    Value::Array(
        categorys
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|category| Value::from(category.clone()))
            .collect(),
    )
}

fn condition_list(conditions: &Option<Vec<VendorCondition>>) -> Value {
    Value::Array(
        conditions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(condition_to_value)
            .collect(),
    )
}

fn condition_to_value(condition: &VendorCondition) -> Value {
    let mut map = Map::new();
    map.insert("entityType".to_string(), condition.entity_type.into());
    map.insert("entityId".to_string(), null_or(&condition.entity_id));
    map.insert("expr".to_string(), condition.expr.clone());
    map.insert("id".to_string(), null_or(&condition.id));
    map.insert("entityName".to_string(), null_or(&condition.entity_name));
    map.insert("exprDisplay".to_string(), null_or(&condition.expr_display));
    map.insert("condType".to_string(), null_or(&condition.cond_type));
    map.insert(
        "extraInfo".to_string(),
        condition.extra_info.clone().unwrap_or(Value::Null),
    );
    Value::Object(map)
}

fn action_list(actions: &Option<Vec<VendorAction>>) -> Value {
    Value::Array(
        actions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(action_to_value)
            .collect(),
    )
}

fn action_to_value(action: &VendorAction) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), null_or(&action.id));
    map.insert("entityName".to_string(), null_or(&action.entity_name));
    map.insert("pid".to_string(), null_or(&action.pid));
    map.insert("productId".to_string(), null_or(&action.product_id));
    map.insert("actionDisplay".to_string(), null_or(&action.action_display));
    map.insert("entityId".to_string(), null_or(&action.entity_id));
    map.insert("productPic".to_string(), null_or(&action.product_pic));
    map.insert("uiid".to_string(), null_or(&action.uiid));
    map.insert(
        "executorProperty".to_string(),
        action
            .executor_property
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())),
    );
    map.insert(
        "extraProperty".to_string(),
        action
            .extra_property
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())),
    );
    Value::Object(map)
}

fn pre_condition_list(pre_conditions: &Option<Vec<VendorPreCondition>>) -> Value {
    Value::Array(
        pre_conditions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(pre_condition_to_value)
            .collect(),
    )
}

fn pre_condition_to_value(pre_condition: &VendorPreCondition) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), null_or(&pre_condition.id));
    map.insert("condType".to_string(), null_or(&pre_condition.cond_type));
    map.insert(
        "expr".to_string(),
        serde_json::to_value(&pre_condition.expr).unwrap_or(Value::Null),
    );
    map.insert("conditionId".to_string(), null_or(&pre_condition.id));
    Value::Object(map)
}
