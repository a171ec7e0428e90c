use crate::output::print_json;
use anyhow::Context;
use claude_client::ClaudeClient;
use pulse_core::{
    config::AnalyzerConfig,
    pipeline::{Analyzer, RunReport},
    store::{RecordStore, SupabaseStore},
    types::ProjectRef,
};
use std::path::Path;

#[derive(serde::Serialize)]
struct ProjectOutcome {
    project: ProjectRef,
    #[serde(flatten)]
    report: RunReport,
}

pub fn run(env_file: &Path, project: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = AnalyzerConfig::load(Some(env_file)).context("failed to load configuration")?;
    let model = ClaudeClient::new(config.anthropic_api_key.clone(), config.model.clone())
        .context("failed to build Claude client")?;
    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_service_role)
        .context("failed to build record store client")?;
    let analyzer = Analyzer::new(&model, &store);

    let results: Vec<ProjectOutcome> = match project {
        Some(id) => {
            // Resolve the display name when the project is in the pending
            // list; an unknown id still runs and no-ops cleanly.
            let project = store
                .projects_with_unprocessed()
                .context("failed to list projects")?
                .into_iter()
                .find(|p| p.id == id)
                .unwrap_or_else(|| ProjectRef {
                    id: id.to_string(),
                    name: id.to_string(),
                });
            let report = analyzer
                .run(&project)
                .with_context(|| format!("analysis failed for project '{id}'"))?;
            vec![ProjectOutcome { project, report }]
        }
        None => analyzer
            .run_all()
            .context("failed to list projects")?
            .into_iter()
            .map(|(project, report)| ProjectOutcome { project, report })
            .collect(),
    };

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No projects with unprocessed messages.");
        return Ok(());
    }
    for outcome in &results {
        let r = &outcome.report;
        if r.messages == 0 {
            println!("{}: no unprocessed messages", outcome.project.name);
            continue;
        }
        let health = r
            .health
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unchanged".to_string());
        println!(
            "{}: {} messages in {} batches ({} analyzed), {} updates, health {}",
            outcome.project.name, r.messages, r.batches, r.batches_analyzed, r.updates_written, health
        );
    }
    Ok(())
}
