use crate::output::{print_json, print_table};
use anyhow::Context;
use pulse_core::{
    config::AnalyzerConfig,
    store::{RecordStore, SupabaseStore},
};
use std::path::Path;

pub fn run(env_file: &Path, json: bool) -> anyhow::Result<()> {
    let config = AnalyzerConfig::load(Some(env_file)).context("failed to load configuration")?;
    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_service_role)
        .context("failed to build record store client")?;

    let projects = store
        .projects_with_unprocessed()
        .context("failed to list projects")?;

    if json {
        return print_json(&projects);
    }

    if projects.is_empty() {
        println!("No projects with unprocessed messages.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| vec![p.id.clone(), p.name.clone()])
        .collect();
    print_table(&["ID", "NAME"], &rows);
    Ok(())
}
