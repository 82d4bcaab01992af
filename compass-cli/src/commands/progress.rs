//! Print a user's assessment progress

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use compass_core::{AdaptiveEngine, ProgressSummary, SessionManager};

use super::StoreArgs;
use crate::config::CompassConfig;

#[derive(Debug, Args)]
pub struct ProgressArgs {
    /// Username to report on
    #[arg(long)]
    pub user: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn run(args: ProgressArgs, config: &CompassConfig) -> Result<()> {
    let store = args.store.open(config)?;
    let user = SessionManager::new(store.clone())
        .find_user(&args.user)?
        .with_context(|| format!("No user named '{}'", args.user))?;
    let engine = AdaptiveEngine::with_config(store, config.engine.to_engine_config());
    let progress = engine.progress(user.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        println!("{}", progress_table(&progress));
    }
    Ok(())
}

fn progress_table(progress: &ProgressSummary) -> Table {
    let path = progress
        .path_type
        .map(|persona| persona.to_string())
        .unwrap_or_else(|| "-".to_string());
    let status = serde_json::to_value(progress.status)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    let rows = [
        ("Status", status),
        ("Path", path),
        (
            "Completion",
            format!("{:.1}%", progress.completion_percentage),
        ),
        (
            "Answered",
            format!("{} of {}", progress.questions_completed, progress.total_questions),
        ),
        ("Skipped", progress.questions_skipped.to_string()),
        (
            "Time",
            format!(
                "{} min spent, {} min remaining of {}",
                progress.actual_time_spent,
                progress.remaining_time,
                progress.estimated_completion_time
            ),
        ),
        (
            "Current question",
            progress.current_question_id.clone().unwrap_or_else(|| "-".into()),
        ),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_started_table() {
        let rendered = progress_table(&ProgressSummary::not_started()).to_string();
        assert!(rendered.contains("not_started"));
        assert!(rendered.contains("0.0%"));
    }
}
