use crate::error::{PulseError, Result};
use crate::types::{HealthStatus, MessageInsight, MessageRecord, ProjectRef};
use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Table constants
// ---------------------------------------------------------------------------

pub const MESSAGES_TABLE: &str = "delivery_intelligence";
pub const HEALTH_TABLE: &str = "project_health_metrics";

/// PostgREST disjunction matching rows never touched by the pipeline.
const UNPROCESSED_FILTER: &str = "(ai_processed.is.null,ai_processed.eq.false)";

const MESSAGE_COLUMNS: &str = "id,title,content_raw,created_at,event_type";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Read/update operations the pipeline needs from the hosted record store.
/// Implementations own value encoding; callers never splice values into a
/// command string.
pub trait RecordStore {
    /// Unprocessed messages for a project, newest first, at most `limit`.
    fn fetch_unprocessed(&self, project_id: &str, limit: usize) -> Result<Vec<MessageRecord>>;

    /// Distinct projects holding at least one unprocessed message, sorted by name.
    fn projects_with_unprocessed(&self) -> Result<Vec<ProjectRef>>;

    /// Attach an insight to one message and mark it processed.
    fn update_message_insight(
        &self,
        message_id: &str,
        insight: &MessageInsight,
        sentiment_score: f64,
    ) -> Result<()>;

    /// Overwrite a project's current health row.
    fn update_project_health(
        &self,
        project_id: &str,
        status: HealthStatus,
        summary: &str,
        blocker_count: usize,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SupabaseStore
// ---------------------------------------------------------------------------

/// `RecordStore` over the Supabase PostgREST interface. Filters travel as
/// query parameters and payloads as JSON bodies; the HTTP client does all
/// value encoding.
pub struct SupabaseStore {
    base_url: String,
    service_role: String,
    http: Client,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, service_role: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            base_url,
            service_role: service_role.into(),
            http,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_role)
            .bearer_auth(&self.service_role)
    }

    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .text()
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(PulseError::StoreApi {
            status: status.as_u16(),
            body,
        })
    }
}

impl RecordStore for SupabaseStore {
    fn fetch_unprocessed(&self, project_id: &str, limit: usize) -> Result<Vec<MessageRecord>> {
        let project_filter = format!("eq.{project_id}");
        let limit = limit.to_string();
        let resp = self
            .auth(self.http.get(self.rest_url(MESSAGES_TABLE)))
            .query(&[
                ("select", MESSAGE_COLUMNS),
                ("project_id", project_filter.as_str()),
                ("or", UNPROCESSED_FILTER),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    fn projects_with_unprocessed(&self) -> Result<Vec<ProjectRef>> {
        #[derive(Deserialize)]
        struct Row {
            project_id: Option<String>,
            projects: Option<ProjectName>,
        }
        #[derive(Deserialize)]
        struct ProjectName {
            name: String,
        }

        let resp = self
            .auth(self.http.get(self.rest_url(MESSAGES_TABLE)))
            .query(&[
                ("select", "project_id,projects(name)"),
                ("or", UNPROCESSED_FILTER),
                ("project_id", "not.is.null"),
            ])
            .send()?;
        let rows: Vec<Row> = Self::check(resp)?.json()?;

        let mut seen = HashSet::new();
        let mut projects: Vec<ProjectRef> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.project_id?;
                if !seen.insert(id.clone()) {
                    return None;
                }
                let name = row.projects.map(|p| p.name).unwrap_or_else(|| id.clone());
                Some(ProjectRef { id, name })
            })
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    fn update_message_insight(
        &self,
        message_id: &str,
        insight: &MessageInsight,
        sentiment_score: f64,
    ) -> Result<()> {
        let body = json!({
            "ai_processed": true,
            "ai_insights": insight,
            "sentiment_score": sentiment_score,
            "ai_processed_at": Utc::now(),
        });
        let resp = self
            .auth(self.http.patch(self.rest_url(MESSAGES_TABLE)))
            .query(&[("id", &format!("eq.{message_id}"))])
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    fn update_project_health(
        &self,
        project_id: &str,
        status: HealthStatus,
        summary: &str,
        blocker_count: usize,
    ) -> Result<()> {
        let body = json!({
            "overall_health": status,
            "ai_summary": summary,
            "blocker_count": blocker_count,
            "metric_date": Utc::now(),
        });
        let resp = self
            .auth(self.http.patch(self.rest_url(HEALTH_TABLE)))
            .query(&[("project_id", &format!("eq.{project_id}"))])
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()?;
        Self::check(resp)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
