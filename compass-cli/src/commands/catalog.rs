//! Seed, import and list the question catalog

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use compass_core::{AdaptiveEngine, CatalogDocument, Question, SeedReport};

use super::StoreArgs;
use crate::config::CompassConfig;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Load the built-in questions and rules
    Seed,
    /// Load questions and rules from a JSON catalog file
    Import {
        /// Catalog file with `questions` and `rules` arrays
        file: PathBuf,
    },
    /// List stored questions in catalog order
    List,
}

pub fn run(args: CatalogArgs, config: &CompassConfig) -> Result<()> {
    let engine = AdaptiveEngine::new(args.store.open(config)?);
    match args.command {
        CatalogCommands::Seed => {
            let report = engine.load_catalog(&CatalogDocument::builtin()?)?;
            print_report(&report);
        }
        CatalogCommands::Import { file } => {
            let catalog = read_catalog(&file)?;
            let report = engine.load_catalog(&catalog)?;
            print_report(&report);
        }
        CatalogCommands::List => {
            let questions = engine.questions()?;
            if questions.is_empty() {
                println!("No questions stored. Run `compass catalog seed` first.");
            } else {
                println!("{}", question_table(&questions));
            }
        }
    }
    Ok(())
}

fn read_catalog(file: &Path) -> Result<CatalogDocument> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    CatalogDocument::from_json_str(&contents)
        .with_context(|| format!("Invalid catalog {}", file.display()))
}

fn print_report(report: &SeedReport) {
    println!(
        "Questions: {} added, {} already present",
        report.questions_inserted, report.questions_existing
    );
    println!(
        "Rules:     {} added, {} already present",
        report.rules_inserted, report.rules_existing
    );
}

fn question_table(questions: &[Question]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Question").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("Skip conditions").fg(Color::Cyan),
    ]);
    for question in questions {
        table.add_row(vec![
            Cell::new(&question.question_id),
            Cell::new(format!("{}/{}", question.category, question.subcategory)),
            Cell::new(question.question_type.as_str()),
            Cell::new(question.priority.as_u8()),
            Cell::new(question.skip_conditions.len()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_catalog_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"questions": [{{"question_id": "pitch", "category": "idea", "subcategory": "summary",
                "text": "Describe your idea", "question_type": "text", "priority": 1}}]}}"#
        )
        .unwrap();

        let catalog = read_catalog(&path).unwrap();
        assert_eq!(catalog.questions.len(), 1);
        assert!(catalog.rules.is_empty());
    }

    #[test]
    fn test_read_catalog_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let question = r#"{"question_id": "pitch", "category": "idea", "subcategory": "summary",
            "text": "Describe your idea", "question_type": "text", "priority": 1}"#;
        std::fs::write(&path, format!(r#"{{"questions": [{question}, {question}]}}"#)).unwrap();

        assert!(read_catalog(&path).is_err());
    }

    #[test]
    fn test_question_table_lists_every_question() {
        let catalog = CatalogDocument::builtin().unwrap();
        let rendered = question_table(&catalog.questions).to_string();
        assert!(rendered.contains("core_motivation"));
        assert!(rendered.contains("creative_background"));
    }
}
