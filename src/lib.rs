//! # Tuyascene
//!
//! A scene definition compiler for Tuya-style smart-home SDKs.
//!
//! The crate parses transport-neutral scene descriptions (actions, trigger
//! conditions, pre-conditions and their nested expressions), resolves
//! device datapoint metadata concurrently through an injected vendor
//! boundary and compiles the vendor scene object graph. The same surface
//! serializes vendor scenes back into transport maps for the read path.
//!
//! ## Features
//!
//! - Tagged-union DTOs with the original wire discriminators
//! - One concurrent datapoint fetch per referenced device
//! - Batch diagnostics: every failed element is reported, with its index
//! - Partial-update edit semantics: absent fields stay untouched
//! - A method-call bridge speaking the (code, message, details) triple
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use std::sync::Arc;
//! use tuyascene::{MethodCall, SceneBridge, SceneService};
//!
//! async fn list_scenes(vendor: Arc<dyn SceneService>) {
//!     let bridge = SceneBridge::new(vendor);
//!     let reply = bridge
//!         .handle(&MethodCall::new("getSceneList", json!({ "homeId": 42 })))
//!         .await;
//!     match reply {
//!         Ok(scenes) => println!("scenes: {scenes}"),
//!         Err(err) => eprintln!("{}: {}", err.code, err.message),
//!     }
//! }
//! ```

pub mod action;
pub mod bridge;
pub mod compiler;
pub mod condition;
pub mod dto;
pub mod error;
pub mod expr;
pub mod model;
pub mod resolver;
pub mod serialize;
pub mod service;

pub use bridge::{ErrorResponse, MethodCall, SceneBridge};
pub use compiler::{compile_scene, referenced_devices};
pub use dto::{
    City, SceneAction, SceneCondition, SceneDefinition, SceneExpr, ScenePreCondition,
    parse_definition,
};
pub use error::{ElementError, Result, SceneElement, SceneError};
pub use model::{VendorAction, VendorCondition, VendorPreCondition, VendorScene};
pub use resolver::{DatapointMetadata, DatapointTable};
pub use serialize::scene_to_map;
pub use service::{SceneManager, SceneService};

/// The version of the tuyascene crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version of the tuyascene crate.
pub fn version() -> &'static str {
    VERSION
}
