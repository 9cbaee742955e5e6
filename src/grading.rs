//! Minimal client for the external grading service.
//!
//! Answers are forwarded as `{ "taskId": ..., "answer": ... }` to a single webhook. Scoring
//! happens on the other side; we only guarantee the answer shape matches the task's kind.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

#[derive(Clone, Debug, Serialize)]
pub struct AnswerSubmission {
  #[serde(rename = "taskId")]
  pub task_id: String,
  pub answer: Value,
}

#[derive(Clone)]
pub struct Grading {
  pub client: reqwest::Client,
  pub url: String,
}

impl Grading {
  /// Construct the client if we find GRADING_WEBHOOK_URL; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let url = std::env::var("GRADING_WEBHOOK_URL").ok().filter(|u| !u.trim().is_empty())?;
    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build().ok()?;
    Some(Self { client, url })
  }

  #[instrument(level = "info", skip(self, submission), fields(task_id = %submission.task_id))]
  pub async fn forward(&self, submission: &AnswerSubmission) -> Result<(), String> {
    let res = self
      .client
      .post(&self.url)
      .header(USER_AGENT, "challenge-tasks/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(submission)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("grading HTTP {}: {}", status, crate::util::trunc_for_log(&body, 200)));
    }
    info!(target: "challenge_tasks", status = %res.status(), "Answer forwarded to grading");
    Ok(())
  }
}
