//! Typed rendition of the vendor scene object graph.
//! Every model field is optional so a modify payload can stay partial;
//! code tables mirror the vendor's numeric and string constants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `condType` value of every compiled pre-condition.
pub const COND_TYPE_TIME_CHECK: &str = "timeCheck";

// ---- Code tables ----

/// Vendor entity types for trigger conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionEntityType {
    Device = 1,
    Weather = 3,
    Timer = 6,
    Pir = 9,
    Geofence = 10,
    Calculate = 13,
    SunTimer = 16,
    Manual = 99,
}

impl ConditionEntityType {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Executor names understood by the vendor action model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionExecutor {
    DpIssue,
    DeviceGroupDpIssue,
    RuleTrigger,
    Toggle,
    Delay,
    AppPushTrigger,
    MobileVoiceSend,
    SmsSend,
}

impl ActionExecutor {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionExecutor::DpIssue => "dpIssue",
            ActionExecutor::DeviceGroupDpIssue => "deviceGroupDpIssue",
            ActionExecutor::RuleTrigger => "ruleTrigger",
            ActionExecutor::Toggle => "toggle",
            ActionExecutor::Delay => "delay",
            ActionExecutor::AppPushTrigger => "appPushTrigger",
            ActionExecutor::MobileVoiceSend => "mobileVoiceSend",
            ActionExecutor::SmsSend => "smsSend",
        }
    }
}

/// Any-vs-all semantics over a scene's condition list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Any = 1,
    All = 2,
}

impl MatchType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            2 => MatchType::All,
            _ => MatchType::Any,
        }
    }
}

/// Geofence transition selectors with their raw payload codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceType {
    Enter,
    Exit,
    Inside,
    Outside,
}

impl GeofenceType {
    /// Code table {0 enter, 1 exit, 3 inside, 4 outside}. Any other code,
    /// 2 included, falls back to exit; deployed definitions rely on that
    /// mapping.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => GeofenceType::Enter,
            1 => GeofenceType::Exit,
            3 => GeofenceType::Inside,
            4 => GeofenceType::Outside,
            _ => GeofenceType::Exit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeofenceType::Enter => "enter",
            GeofenceType::Exit => "exit",
            GeofenceType::Inside => "inside",
            GeofenceType::Outside => "outside",
        }
    }
}

/// Sunrise/sunset selector for sun timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunType {
    Sunrise,
    Sunset,
}

impl SunType {
    /// 1 is sunrise, 2 is sunset; any other code falls back to sunset,
    /// matching the deployed mapping.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => SunType::Sunrise,
            _ => SunType::Sunset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SunType::Sunrise => "sunrise",
            SunType::Sunset => "sunset",
        }
    }
}

/// Expression family tag carried by valued expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Whether = 0,
    Device = 1,
}

impl ExprType {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Unknown codes fall back to the device family.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ExprType::Whether,
            _ => ExprType::Device,
        }
    }
}

/// Day-window tag of a `timeCheck` pre-condition expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    AllDay,
    Daytime,
    Night,
    Custom,
}

impl TimeInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInterval::AllDay => "allDay",
            TimeInterval::Daytime => "daytime",
            TimeInterval::Night => "night",
            TimeInterval::Custom => "custom",
        }
    }
}

// ---- Vendor models ----

/// A compiled expression: the vendor clause payload plus its family tag.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorExpr {
    pub expr_type: ExprType,
    pub expr: Value,
}

/// Vendor trigger-condition model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCondition {
    pub id: Option<i64>,
    pub entity_type: i32,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub entity_sub_ids: Option<String>,
    pub cond_type: Option<i32>,
    pub expr: Value,
    pub expr_display: Option<String>,
    pub duration: Option<String>,
    pub extra_info: Option<Value>,
}

/// Vendor action model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorAction {
    pub id: Option<i64>,
    pub action_executor: Option<String>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub executor_property: Option<Value>,
    pub extra_property: Option<Value>,
    pub pid: Option<String>,
    pub product_id: Option<String>,
    pub product_pic: Option<String>,
    pub action_display: Option<String>,
    pub uiid: Option<String>,
}

/// The expression record of a `timeCheck` pre-condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPreConditionExpr {
    pub time_zone_id: Option<String>,
    pub loops: Option<String>,
    pub city_id: Option<String>,
    pub city_name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub time_interval: Option<String>,
}

/// Vendor pre-condition model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPreCondition {
    pub id: Option<String>,
    pub cond_type: Option<String>,
    pub expr: VendorPreConditionExpr,
}

/// Vendor scene model. Only the fields a compile or a vendor read sets are
/// ever populated; everything else stays `None` and is never sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorScene {
    pub id: Option<String>,
    pub name: Option<String>,
    pub gw_id: Option<String>,
    pub cover_icon: Option<String>,
    pub display_color: Option<String>,
    pub background: Option<String>,
    pub enabled: Option<bool>,
    pub sticky_on_top: Option<bool>,
    pub new_local_scene: Option<bool>,
    pub local_linkage: Option<bool>,
    pub linkage_type: Option<i32>,
    pub rule_genre: Option<i32>,
    pub arrow_icon_url: Option<String>,
    pub out_of_work: Option<i32>,
    pub panel_type: Option<i32>,
    pub match_type: Option<i32>,
    /// Vendor spelling.
    pub categorys: Option<Vec<String>>,
    pub conditions: Option<Vec<VendorCondition>>,
    pub status_conditions: Option<Vec<VendorCondition>>,
    pub actions: Option<Vec<VendorAction>>,
    pub pre_conditions: Option<Vec<VendorPreCondition>>,
}
