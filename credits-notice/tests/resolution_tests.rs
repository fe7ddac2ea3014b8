//! Resolution workflow tests
//!
//! Tests:
//! - Learned names resolve without confirmation
//! - Confirmed identities are learned and reused
//! - Dismissal skips one relationship and re-prompts for the next type
//! - Automatic mode takes the first search result without learning
//! - ℗ statements also link the selected recordings
//! - Failing statements are skipped, later ones still processed
//! - Confirmations never overlap

mod helpers;

use credits_notice::resolve::{AutomaticResolution, ManualResolution};
use credits_notice::{parse_copyright_notice, CopyrightStatement, Entity, StatementType};
use helpers::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn manual(surface: &Arc<ScriptedSurface>) -> ManualResolution {
    ManualResolution::new(surface.clone())
}

#[tokio::test]
async fn test_learned_name_needs_no_confirmation() {
    let h = harness(
        FakeProvider::default().with_entity(label("label-foo", "Foo Records")),
        CollectingEditor::default(),
        Vec::new(),
    );
    learn(&h.names, "Foo Records", "label-foo");
    let surface = Arc::new(ScriptedSurface::default());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© 2021 Foo Records"), &manual(&surface))
        .await;

    assert!(added);
    assert!(surface.drafts().is_empty());

    let relationships = h.editor.relationships();
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].link_type_id, 708);
    assert_eq!(relationships[0].entity0, label("label-foo", "Foo Records"));
    assert_eq!(relationships[0].entity1, release());
    assert_eq!(relationships[0].begin_year.as_deref(), Some("2021"));
    assert_eq!(relationships[0].id, i64::MIN);
}

#[tokio::test]
async fn test_confirmation_is_learned() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    let chosen = label("label-42", "Foo Records Ltd");
    let surface = Arc::new(ScriptedSurface::answering(vec![Some(chosen.clone())]));

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© 2020 Foo"), &manual(&surface))
        .await;

    assert!(added);
    let drafts = surface.drafts();
    assert_eq!(drafts.len(), 1);
    assert!(!drafts[0].target.is_resolved());
    assert_eq!(drafts[0].name, "Foo");
    assert_eq!(drafts[0].link_type_id, 708);

    // Learned under the written name, not the entity's name
    assert_eq!(
        h.names.get(("label".to_string(), "Foo".to_string())).await.unwrap().as_deref(),
        Some("label-42")
    );

    // Next time the name resolves without asking or fetching
    let silent = Arc::new(ScriptedSurface::default());
    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("℗ 2021 Foo"), &manual(&silent))
        .await;

    assert!(added);
    assert!(silent.drafts().is_empty());
    assert_eq!(h.provider.fetch_count.load(Ordering::SeqCst), 0);
    assert_eq!(h.editor.link_types(), vec![708, 711]);
    assert!(h.editor.relationships().iter().all(|r| r.entity0 == chosen));
}

#[tokio::test]
async fn test_confirmed_identity_reused_for_remaining_types() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    let surface = Arc::new(ScriptedSurface::answering(vec![Some(label("label-ab", "AB"))]));

    h.orchestrator
        .resolve_and_create(&parse_copyright_notice("℗&© 2020 AB"), &manual(&surface))
        .await;

    assert_eq!(surface.drafts().len(), 1);
    assert_eq!(h.editor.link_types(), vec![711, 708]);
}

#[tokio::test]
async fn test_dismissal_prompts_again_for_next_type() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    let surface = Arc::new(ScriptedSurface::answering(vec![None, Some(label("label-ab", "AB"))]));

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("℗&© 2020 AB"), &manual(&surface))
        .await;

    assert!(added);
    let drafts = surface.drafts();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].statement_type, StatementType::Phonographic);
    assert_eq!(drafts[1].statement_type, StatementType::Copyright);
    assert_eq!(h.editor.link_types(), vec![708]);
}

#[tokio::test]
async fn test_all_dismissed_adds_nothing() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), vec![recording("rec-1")]);
    let surface = Arc::new(ScriptedSurface::default());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("℗ 2020 Foo\ndistributed by Bar"), &manual(&surface))
        .await;

    assert!(!added);
    // No recording batch for an unresolved owner
    assert_eq!(surface.drafts().len(), 2);
    assert!(h.editor.relationships().is_empty());
    assert!(h.names.is_empty());
}

#[tokio::test]
async fn test_automatic_mode_takes_first_result() {
    let provider = FakeProvider::default().with_search(
        "Foo Records",
        vec![label("label-first", "Foo Records"), label("label-second", "Foo Records (UK)")],
    );
    let h = harness(provider, CollectingEditor::default(), Vec::new());
    let strategy = AutomaticResolution::new(h.provider.clone());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© 2019 Foo Records"), &strategy)
        .await;

    assert!(added);
    let relationships = h.editor.relationships();
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].entity0.id.as_deref(), Some("label-first"));
    // Automatic choices are not learned
    assert!(h.names.is_empty());
}

#[tokio::test]
async fn test_automatic_mode_skips_unknown_names() {
    let provider = FakeProvider::default().with_search("Bar", vec![label("label-bar", "Bar")]);
    let h = harness(provider, CollectingEditor::default(), Vec::new());
    let strategy = AutomaticResolution::new(h.provider.clone());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© 2019 Nobody\nmarketed by Bar"), &strategy)
        .await;

    assert!(added);
    assert_eq!(h.provider.search_count.load(Ordering::SeqCst), 2);
    assert_eq!(h.editor.link_types(), vec![848]);
}

#[tokio::test]
async fn test_phonographic_copyright_links_recordings() {
    let h = harness(
        FakeProvider::default().with_entity(label("label-foo", "Foo")),
        CollectingEditor::default(),
        vec![recording("rec-1"), recording("rec-2")],
    );
    learn(&h.names, "Foo", "label-foo");
    let surface = Arc::new(ScriptedSurface::default());

    h.orchestrator
        .resolve_and_create(&parse_copyright_notice("℗&© 2020 Foo"), &manual(&surface))
        .await;

    assert_eq!(h.editor.link_types(), vec![711, 867, 867, 708]);
    let relationships = h.editor.relationships();
    assert_eq!(relationships[1].entity1, recording("rec-1"));
    assert_eq!(relationships[2].entity1, recording("rec-2"));
    assert_eq!(relationships[2].begin_year.as_deref(), Some("2020"));

    // Ids keep counting up across single and batch creations
    let ids: Vec<i64> = relationships.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![i64::MIN, i64::MIN + 1, i64::MIN + 2, i64::MIN + 3]);
}

#[tokio::test]
async fn test_editor_failure_skips_statement() {
    let h = harness(
        FakeProvider::default()
            .with_entity(label("label-foo", "Foo"))
            .with_entity(label("label-bar", "Bar")),
        CollectingEditor::rejecting(708),
        Vec::new(),
    );
    learn(&h.names, "Foo", "label-foo");
    learn(&h.names, "Bar", "label-bar");
    let surface = Arc::new(ScriptedSurface::default());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© 2020 Foo\ndistributed by Bar"), &manual(&surface))
        .await;

    assert!(added);
    assert_eq!(h.editor.link_types(), vec![361]);
}

#[tokio::test]
async fn test_stale_mapping_skips_statement() {
    // Learned MBID no longer exists remotely
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    learn(&h.names, "Foo", "label-gone");
    let surface = Arc::new(ScriptedSurface::default());

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© Foo\n© Bar"), &manual(&surface))
        .await;

    assert!(!added);
    // The fetch error skips "Foo", "Bar" is still offered
    let drafts = surface.drafts();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].name, "Bar");
}

#[tokio::test]
async fn test_statement_without_link_type_is_skipped() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    let surface = Arc::new(ScriptedSurface::default());
    let statements = vec![CopyrightStatement::new(
        "Foo Pressing",
        vec![StatementType::Other("pressed by".to_string())],
        None,
    )];

    let added = h.orchestrator.resolve_and_create(&statements, &manual(&surface)).await;

    assert!(!added);
    assert!(surface.drafts().is_empty());
}

#[tokio::test]
async fn test_confirmations_are_sequential() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    let surface = Arc::new(ScriptedSurface::answering(vec![
        Some(label("label-a", "A")),
        Some(label("label-b", "B")),
        Some(label("label-c", "C")),
    ]));

    h.orchestrator
        .resolve_and_create(
            &parse_copyright_notice("© 2020 A\n℗ 2020 B\nlicensed to C"),
            &manual(&surface),
        )
        .await;

    assert_eq!(surface.max_in_flight.load(Ordering::SeqCst), 1);
    let names: Vec<String> = surface.drafts().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(h.editor.link_types(), vec![708, 711, 833]);
}

#[tokio::test]
async fn test_unresolved_confirmation_is_not_learned() {
    let h = harness(FakeProvider::default(), CollectingEditor::default(), Vec::new());
    // Surface hands back another placeholder
    let surface = Arc::new(ScriptedSurface::answering(vec![Some(Entity::placeholder("Foo", "label"))]));

    let added = h
        .orchestrator
        .resolve_and_create(&parse_copyright_notice("© Foo"), &manual(&surface))
        .await;

    assert!(!added);
    assert!(h.names.is_empty());
}
