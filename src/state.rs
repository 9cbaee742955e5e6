//! Application state: the in-memory task store, authoring limits, and the grading client.
//!
//! This module owns:
//!   - task stores (by id, by section)
//!   - the limits editors and forms enforce (from TOML or defaults)
//!   - optional grading webhook client
//!
//! The store stands in for the external persistence engine. Upserts are last-write-wins;
//! there is no versioning between concurrent editors of the same task.

use std::{
  collections::HashMap,
  sync::Arc,
  time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::codec;
use crate::config::{load_service_config_from_env, Limits, ServiceConfig};
use crate::domain::{Task, TaskContent};
use crate::grading::Grading;
use crate::seeds::seed_tasks;

/// Everything the persistence layer stores for one task, minus the id.
#[derive(Clone, Debug)]
pub struct TaskInput {
  pub section_id: String,
  pub title: String,
  pub description: String,
  pub hint: String,
  pub content: TaskContent,
  pub points: Option<u32>,
  pub order: i32,
  pub multi_entry: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("no task with id {0:?}")]
  NotFound(String),
}

#[derive(Clone)]
pub struct AppState {
  pub by_id: Arc<RwLock<HashMap<String, Task>>>,
  pub by_section: Arc<RwLock<HashMap<String, Vec<String>>>>,
  pub limits: Limits,
  pub grading: Option<Grading>,
}

fn now_secs() -> u64 {
  SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn build_task(id: String, input: TaskInput, limits: &Limits) -> Task {
  Task {
    id,
    section_id: input.section_id,
    title: input.title,
    description: input.description,
    hint: input.hint,
    content: input.content,
    points: input.points.unwrap_or(limits.default_points),
    order: input.order,
    multi_entry: input.multi_entry,
    updated_at: now_secs(),
  }
}

impl AppState {
  /// Build state from env: load config, seed tasks, init grading client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let grading = Grading::from_env();
    if let Some(g) = &grading {
      info!(target: "challenge_tasks", url = %g.url, "Grading webhook enabled.");
    } else {
      info!(target: "challenge_tasks", "Grading webhook disabled (no GRADING_WEBHOOK_URL). Answers are logged only.");
    }
    Self::with_config(load_service_config_from_env(), grading)
  }

  /// Build state from an already-loaded config. Bank entries that fail to decode are skipped.
  pub fn with_config(cfg: Option<ServiceConfig>, grading: Option<Grading>) -> Self {
    let limits = cfg.as_ref().map(|c| c.limits).unwrap_or_default();

    let mut id_map = HashMap::<String, Task>::new();
    let mut section_map = HashMap::<String, Vec<String>>::new();

    if let Some(cfg) = &cfg {
      for tc in &cfg.tasks {
        let id = tc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let content = match codec::decode_raw(&tc.kind, tc.data.clone()) {
          Ok(c) => c,
          Err(e) => {
            error!(target: "task", %id, kind = %tc.kind, error = %e, "Skipping bank task: payload does not decode.");
            continue;
          }
        };
        let input = TaskInput {
          section_id: tc.section.clone(),
          title: tc.title.clone(),
          description: tc.description.clone(),
          hint: tc.hint.clone(),
          content,
          points: tc.points,
          order: tc.order,
          multi_entry: tc.multi_entry,
        };
        section_map.entry(tc.section.clone()).or_default().push(id.clone());
        id_map.insert(id.clone(), build_task(id, input, &limits));
      }
    }

    // Always insert built-in seeds, but don't overwrite existing ids.
    for (id, input) in seed_tasks() {
      if id_map.contains_key(&id) {
        continue;
      }
      section_map.entry(input.section_id.clone()).or_default().push(id.clone());
      id_map.insert(id.clone(), build_task(id, input, &limits));
    }

    let mut count_by_kind: HashMap<String, usize> = HashMap::new();
    for t in id_map.values() {
      *count_by_kind.entry(t.content.kind().to_string()).or_default() += 1;
    }
    for (kind, n) in count_by_kind {
      info!(target: "task", %kind, count = n, "Startup task inventory");
    }

    Self {
      by_id: Arc::new(RwLock::new(id_map)),
      by_section: Arc::new(RwLock::new(section_map)),
      limits,
      grading,
    }
  }

  /// Create when `id` is `None`, replace when it names a stored task.
  #[instrument(level = "debug", skip(self, input), fields(section = %input.section_id, kind = %input.content.kind()))]
  pub async fn upsert(&self, id: Option<&str>, input: TaskInput) -> Result<Task, StoreError> {
    let mut by_id = self.by_id.write().await;
    let mut by_section = self.by_section.write().await;

    let id = match id {
      Some(id) => {
        let old = by_id.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if old.section_id != input.section_id {
          if let Some(ids) = by_section.get_mut(&old.section_id) {
            ids.retain(|x| x != id);
          }
          by_section.entry(input.section_id.clone()).or_default().push(id.to_string());
        }
        id.to_string()
      }
      None => {
        let id = Uuid::new_v4().to_string();
        by_section.entry(input.section_id.clone()).or_default().push(id.clone());
        id
      }
    };

    let task = build_task(id.clone(), input, &self.limits);
    by_id.insert(id, task.clone());
    Ok(task)
  }

  /// Read-only access to a task by id.
  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn get_task(&self, id: &str) -> Option<Task> {
    self.by_id.read().await.get(id).cloned()
  }

  /// Tasks of a section in display order.
  #[instrument(level = "debug", skip(self), fields(%section))]
  pub async fn list_section(&self, section: &str) -> Vec<Task> {
    let ids = { self.by_section.read().await.get(section).cloned().unwrap_or_default() };
    let by_id = self.by_id.read().await;
    let mut tasks: Vec<Task> = ids.iter().filter_map(|id| by_id.get(id).cloned()).collect();
    tasks.sort_by_key(|t| t.order);
    tasks
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn delete_task(&self, id: &str) -> bool {
    let mut by_id = self.by_id.write().await;
    let Some(task) = by_id.remove(id) else { return false };
    if let Some(ids) = self.by_section.write().await.get_mut(&task.section_id) {
      ids.retain(|x| x != id);
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_service_config;
  use crate::domain::*;

  fn input(section: &str, order: i32, content: TaskContent) -> TaskInput {
    TaskInput {
      section_id: section.into(),
      title: format!("task {order}"),
      description: "{}".into(),
      hint: String::new(),
      content,
      points: None,
      order,
      multi_entry: false,
    }
  }

  fn empty_state() -> AppState {
    AppState::with_config(None, None)
  }

  #[tokio::test]
  async fn upsert_creates_then_replaces() {
    let state = empty_state();
    let created = state.upsert(None, input("s1", 0, TaskContent::Text(AnswerPayload { answer: "a".into() }))).await.unwrap();
    assert_eq!(created.points, 1);

    let updated = state
      .upsert(Some(&created.id), input("s1", 0, TaskContent::TrueFalse(TrueFalsePayload { answer: false })))
      .await
      .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(state.get_task(&created.id).await.unwrap().content.kind(), VariantKind::TrueFalse);
    assert_eq!(state.list_section("s1").await.len(), 1);
  }

  #[tokio::test]
  async fn upsert_with_unknown_id_fails() {
    let state = empty_state();
    let err = state.upsert(Some("missing"), input("s1", 0, TaskContent::Text(AnswerPayload::default()))).await;
    assert!(matches!(err, Err(StoreError::NotFound(_))));
  }

  #[tokio::test]
  async fn sections_list_in_order_and_follow_moves() {
    let state = empty_state();
    let b = state.upsert(None, input("s1", 2, TaskContent::Text(AnswerPayload::default()))).await.unwrap();
    let a = state.upsert(None, input("s1", 1, TaskContent::Text(AnswerPayload::default()))).await.unwrap();
    let order: Vec<String> = state.list_section("s1").await.into_iter().map(|t| t.id).collect();
    assert_eq!(order, vec![a.id.clone(), b.id.clone()]);

    state.upsert(Some(&b.id), input("s2", 0, TaskContent::Text(AnswerPayload::default()))).await.unwrap();
    assert_eq!(state.list_section("s1").await.len(), 1);
    assert_eq!(state.list_section("s2").await[0].id, b.id);

    assert!(state.delete_task(&a.id).await);
    assert!(!state.delete_task(&a.id).await);
    assert!(state.list_section("s1").await.is_empty());
  }

  #[tokio::test]
  async fn bank_tasks_are_decoded_and_bad_ones_skipped() {
    let cfg = parse_service_config(
      r#"
      [limits]
      default_points = 5

      [[tasks]]
      id = "bank-1"
      section = "bank"
      title = "ok"
      description = "{}"
      type = "TRUEFALSE"
      data = { answer = false }

      [[tasks]]
      id = "bank-2"
      section = "bank"
      title = "broken"
      description = "{}"
      type = "TRUEFALSE"
      data = { answer = "nope" }
      "#,
    )
    .unwrap();
    let state = AppState::with_config(Some(cfg), None);
    let ok = state.get_task("bank-1").await.unwrap();
    assert_eq!(ok.points, 5);
    assert!(state.get_task("bank-2").await.is_none());
  }
}
