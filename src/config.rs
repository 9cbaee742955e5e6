//! Loading service configuration (authoring limits + optional task bank) from TOML.
//!
//! See `ServiceConfig` and `Limits` for expected schema. Example:
//!
//! ```toml
//! [limits]
//! max_options = 10
//!
//! [[tasks]]
//! section = "week-1"
//! title = "Capital of France"
//! description = "{\"type\":\"doc\"}"
//! type = "TEXT"
//! data = { answer = "Paris" }
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServiceConfig {
  #[serde(default)]
  pub limits: Limits,
  #[serde(default)]
  pub tasks: Vec<TaskCfg>,
}

/// Bounds enforced by the editors and the task form.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
  pub max_options: usize,
  pub max_children: usize,
  pub default_points: u32,
}

impl Default for Limits {
  fn default() -> Self {
    Self { max_options: 26, max_children: 20, default_points: 1 }
  }
}

/// Task entry accepted in TOML configuration. `data` is the structured payload for `type`.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskCfg {
  #[serde(default)] pub id: Option<String>,
  pub section: String,
  pub title: String,
  pub description: String,
  #[serde(default)] pub hint: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub data: serde_json::Value,
  #[serde(default)] pub points: Option<u32>,
  #[serde(default)] pub order: i32,
  #[serde(default, rename = "multiEntry")] pub multi_entry: bool,
}

/// Attempt to load `ServiceConfig` from TASKS_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_service_config_from_env() -> Option<ServiceConfig> {
  let path = std::env::var("TASKS_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_service_config(&s) {
      Ok(cfg) => {
        info!(target: "challenge_tasks", %path, tasks = cfg.tasks.len(), "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "challenge_tasks", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "challenge_tasks", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_service_config(s: &str) -> Result<ServiceConfig, toml::de::Error> {
  toml::from_str::<ServiceConfig>(s)
}
