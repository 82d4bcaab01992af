//! End-to-end assessment flows against a file-backed store
//!
//! These tests walk a user through the engine the way the HTTP layer does:
//! - start, answer, skip and re-classify
//! - reopen the database and resume where the user left off

use std::sync::Arc;

use compass_core::expr::Responses;
use compass_core::{
    AdaptiveEngine, CatalogDocument, IdentityStore, PathStatus, Persona, Priority,
    ResponseSubmission, SqliteStore,
};
use serde_json::json;

fn open_engine(path: &std::path::Path) -> AdaptiveEngine<SqliteStore> {
    let store = Arc::new(SqliteStore::open(path).unwrap());
    let engine = AdaptiveEngine::new(store);
    engine
        .load_catalog(&CatalogDocument::builtin().unwrap())
        .unwrap();
    engine
}

fn create_user(path: &std::path::Path, name: &str) -> i64 {
    let store = SqliteStore::open(path).unwrap();
    store
        .create_user(name, &format!("{name}@example.com"))
        .unwrap()
        .id
}

#[test]
fn progress_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("compass.db");
    let user = create_user(&db, "ada");

    {
        let engine = open_engine(&db);
        engine.start(user, &Responses::new()).unwrap();
        engine
            .record_response(
                user,
                ResponseSubmission::new("core_motivation", json!("independence"))
                    .with_time_spent(120),
            )
            .unwrap();
        engine.skip_question(user, "risk_tolerance").unwrap();
    }

    let engine = open_engine(&db);
    let progress = engine.progress(user).unwrap();
    assert_eq!(progress.path_type, Some(Persona::BeginnerEntrepreneur));
    assert_eq!(progress.questions_completed, 1);
    assert_eq!(progress.questions_skipped, 1);
    assert_eq!(progress.actual_time_spent, 2);
    assert_eq!(progress.current_question_id.as_deref(), Some("core_motivation"));

    let batch = engine.next_questions(user, &Responses::new()).unwrap();
    assert_eq!(batch.questions[0].question_id, "business_idea_status");
}

#[test]
fn experienced_professional_only_sees_critical_and_important() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("compass.db");
    let user = create_user(&db, "grace");
    let engine = open_engine(&db);

    let mut initial = Responses::new();
    initial.insert("work_experience".into(), json!(6));
    initial.insert("leadership_roles".into(), json!(1));
    let started = engine.start(user, &initial).unwrap();
    assert_eq!(started.path_type, Persona::ExperiencedProfessional);
    assert_eq!(
        started.path_config.question_priorities,
        vec![Priority::Critical, Priority::Important]
    );

    let mut seen = Vec::new();
    loop {
        let batch = engine.next_questions(user, &Responses::new()).unwrap();
        if !batch.has_more_questions {
            break;
        }
        for prompt in batch.questions {
            assert_ne!(prompt.priority, Priority::Optional);
            engine
                .record_response(user, ResponseSubmission::new(&prompt.question_id, json!(3)))
                .unwrap();
            seen.push(prompt.question_id);
        }
    }

    assert_eq!(seen.len(), 10);
    let progress = engine.progress(user).unwrap();
    assert_eq!(progress.status, PathStatus::Completed);
    assert_eq!(progress.completion_percentage, 100.0);
}

#[test]
fn users_do_not_share_paths() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("compass.db");
    let first = create_user(&db, "ada");
    let second = create_user(&db, "grace");
    let engine = open_engine(&db);

    engine
        .record_response(first, ResponseSubmission::new("risk_tolerance", json!(8)))
        .unwrap();

    assert_eq!(engine.progress(first).unwrap().questions_completed, 1);
    assert_eq!(engine.progress(second).unwrap().status, PathStatus::NotStarted);
    assert!(engine.known_responses(second).unwrap().is_empty());
}

#[test]
fn concurrent_recording_for_one_user_keeps_every_answer() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("compass.db");
    let user = create_user(&db, "ada");
    let engine = Arc::new(open_engine(&db));
    engine.start(user, &Responses::new()).unwrap();

    let ids: Vec<String> = engine
        .questions()
        .unwrap()
        .into_iter()
        .map(|q| q.question_id)
        .take(4)
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine
                    .record_response(user, ResponseSubmission::new(id, json!(1)))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.known_responses(user).unwrap().len(), 4);

    let progress = engine.progress(user).unwrap();
    assert_eq!(progress.questions_completed, 4);
    assert!((progress.completion_percentage - 400.0 / 15.0).abs() < 1e-9);

    let batch = engine.next_questions(user, &Responses::new()).unwrap();
    assert!(batch.questions.iter().all(|q| !ids.contains(&q.question_id)));
}

#[test]
fn concurrent_skips_and_answers_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("compass.db");
    let user = create_user(&db, "ada");
    let engine = Arc::new(open_engine(&db));

    let answered = ["core_motivation", "risk_tolerance", "business_idea_status"];
    let skipped = ["work_experience", "leadership_roles", "current_savings"];

    let mut handles = Vec::new();
    for id in answered {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            engine
                .record_response(user, ResponseSubmission::new(id, json!("yes")))
                .unwrap();
        }));
    }
    for id in skipped {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            engine.skip_question(user, id).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let progress = engine.progress(user).unwrap();
    assert_eq!(progress.questions_completed, 3);
    assert_eq!(progress.questions_skipped, 3);

    let batch = engine.next_questions(user, &Responses::new()).unwrap();
    for prompt in &batch.questions {
        assert!(!answered.contains(&prompt.question_id.as_str()));
        assert!(!skipped.contains(&prompt.question_id.as_str()));
    }
}
