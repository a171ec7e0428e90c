use crate::classifier::{default_rules, Classifier, HealthSignals};
use crate::error::Result;
use crate::insight::{AnalysisInsight, InsightExtractor, ModelClient, MAX_BATCH_MESSAGES};
use crate::store::RecordStore;
use crate::types::{HealthStatus, ProjectRef};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Most-recent unprocessed messages fetched per project per run.
pub const FETCH_LIMIT: usize = 20;

/// Synchronous stall between model calls, to respect rate limits. A
/// throttle, not a correctness requirement.
pub const BATCH_PACING: Duration = Duration::from_secs(1);

/// At most this many distinct blockers count as warning signs.
const WARNING_SIGN_CAP: usize = 5;

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Outcome summary for one project's processing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unprocessed messages fetched.
    pub messages: usize,
    /// Batches the fetch was partitioned into.
    pub batches: usize,
    /// Batches that produced a usable insight.
    pub batches_analyzed: usize,
    /// Per-message insight updates successfully written.
    pub updates_written: usize,
    /// Health label written this run, if any batch succeeded.
    pub health: Option<HealthStatus>,
}

impl RunReport {
    fn empty() -> Self {
        Self {
            messages: 0,
            batches: 0,
            batches_analyzed: 0,
            updates_written: 0,
            health: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Drives the per-project batch pipeline: fetch unprocessed messages, chunk,
/// extract insights, persist per-message updates, then derive and persist
/// project health from the aggregate. Strictly sequential throughout.
pub struct Analyzer<'a> {
    model: &'a dyn ModelClient,
    store: &'a dyn RecordStore,
    classifier: Classifier,
    pacing: Duration,
}

impl<'a> Analyzer<'a> {
    pub fn new(model: &'a dyn ModelClient, store: &'a dyn RecordStore) -> Self {
        Self {
            model,
            store,
            classifier: Classifier::new(default_rules()),
            pacing: BATCH_PACING,
        }
    }

    /// Override the inter-batch delay. Tests run with `Duration::ZERO`.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Process one project. Failure to fetch the unprocessed set is fatal
    /// for this run; every later failure is logged and skipped, leaving the
    /// affected rows to be retried on a future run.
    pub fn run(&self, project: &ProjectRef) -> Result<RunReport> {
        let messages = self.store.fetch_unprocessed(&project.id, FETCH_LIMIT)?;
        if messages.is_empty() {
            tracing::debug!(project = %project.name, "no unprocessed messages");
            return Ok(RunReport::empty());
        }
        tracing::info!(
            project = %project.name,
            count = messages.len(),
            "analyzing unprocessed messages"
        );

        let extractor = InsightExtractor::new(self.model);
        let mut aggregate = ProjectAggregate::default();
        let mut updates_written = 0;

        let batches: Vec<_> = messages.chunks(MAX_BATCH_MESSAGES).collect();
        let total = batches.len();
        for (i, batch) in batches.iter().enumerate() {
            tracing::info!(batch = i + 1, total, "analyzing batch");
            match extractor.extract(batch) {
                Some(insight) => {
                    let reduced = insight.reduced();
                    for msg in batch.iter() {
                        match self.store.update_message_insight(
                            &msg.id,
                            &reduced,
                            insight.sentiment_score,
                        ) {
                            Ok(()) => updates_written += 1,
                            Err(e) => {
                                tracing::warn!(message = %msg.id, "insight update failed: {e}");
                            }
                        }
                    }
                    tracing::info!(
                        sentiment = %insight.overall_sentiment,
                        score = insight.sentiment_score,
                        blockers = insight.blockers.len(),
                        "batch analyzed"
                    );
                    aggregate.record(insight);
                }
                // Batch stays unprocessed and gets retried on the next run.
                None => tracing::warn!(batch = i + 1, "batch produced no insight, skipping"),
            }
            if i + 1 < total && !self.pacing.is_zero() {
                std::thread::sleep(self.pacing);
            }
        }

        let mut report = RunReport {
            messages: messages.len(),
            batches: total,
            batches_analyzed: aggregate.batches(),
            updates_written,
            health: None,
        };

        if let Some(signals) = aggregate.signals() {
            let status = self.classifier.classify(&signals);
            let summary = format!(
                "Analyzed {} recent messages. Average sentiment: {:.2}",
                messages.len(),
                signals.sentiment
            );
            match self
                .store
                .update_project_health(&project.id, status, &summary, signals.blocker_count)
            {
                Ok(()) => {
                    tracing::info!(project = %project.name, health = %status, "updated project health");
                }
                // Stale health row is simply overwritten next time.
                Err(e) => tracing::warn!(project = %project.id, "health update failed: {e}"),
            }
            report.health = Some(status);
        }

        Ok(report)
    }

    /// Process every project with unprocessed messages, independently.
    /// A project whose run aborts does not stop the others.
    pub fn run_all(&self) -> Result<Vec<(ProjectRef, RunReport)>> {
        let projects = self.store.projects_with_unprocessed()?;
        let mut results = Vec::with_capacity(projects.len());
        for project in projects {
            match self.run(&project) {
                Ok(report) => results.push((project, report)),
                Err(e) => tracing::error!(project = %project.id, "project run aborted: {e}"),
            }
        }
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// ProjectAggregate
// ---------------------------------------------------------------------------

/// Accumulates batch results for one run. Local to a single `run` call;
/// never escapes it.
#[derive(Default)]
struct ProjectAggregate {
    sentiment_scores: Vec<f64>,
    blockers: Vec<String>,
}

impl ProjectAggregate {
    fn record(&mut self, insight: AnalysisInsight) {
        self.sentiment_scores.push(insight.sentiment_score);
        self.blockers.extend(insight.blockers);
    }

    fn batches(&self) -> usize {
        self.sentiment_scores.len()
    }

    /// Classification inputs, or `None` when no batch produced an insight.
    /// Blockers are deduplicated with set semantics; the warning-sign count
    /// is the deduplicated count capped at [`WARNING_SIGN_CAP`].
    fn signals(&self) -> Option<HealthSignals> {
        if self.sentiment_scores.is_empty() {
            return None;
        }
        let mean = self.sentiment_scores.iter().sum::<f64>() / self.sentiment_scores.len() as f64;
        let unique: HashSet<&str> = self.blockers.iter().map(String::as_str).collect();
        Some(HealthSignals {
            blocker_count: unique.len(),
            sentiment: mean,
            warning_sign_count: unique.len().min(WARNING_SIGN_CAP),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
