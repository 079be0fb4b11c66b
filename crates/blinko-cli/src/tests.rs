use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use blinko_core::config::EmptyDraftPolicy;
use blinko_core::{Note, NoteId, SessionConfig};
use pretty_assertions::assert_eq;

use crate::cli::CompletionShell;
use crate::commands::add::create_note;
use crate::commands::common::{
    default_editor, format_note_lines, format_relative_time, normalize_content, note_preview,
    preview_text, CliContext,
};
use crate::commands::completions::run_completions;
use crate::commands::config::apply_profile_update;
use crate::commands::draft::{commit_draft, draft_content_from_args, draft_items, set_draft};
use crate::commands::list::list_notes;
use crate::commands::move_note::{move_note, MoveOutcome};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn note_preview_truncates_with_ellipsis() {
    let note = Note::new(NoteId::new(1), "This is a very long sentence that should be shortened", 0);
    let preview = note_preview(&note, 20);
    assert_eq!(preview, "This is a very lo...");
}

#[test]
fn preview_text_uses_first_line_only() {
    assert_eq!(preview_text("  first   line \nsecond", 40), "first line");
    assert_eq!(preview_text("", 40), "");
}

#[test]
fn format_note_lines_marks_drafted_notes() {
    let notes = vec![Note::new(NoteId::new(1), "one", 1), Note::new(NoteId::new(12), "twelve", 2)];
    let drafted: HashSet<NoteId> = [NoteId::new(12)].into_iter().collect();

    let lines = format_note_lines(&notes, &drafted);
    assert_eq!(lines.len(), 2);
    assert!(!lines[0].contains('*'));
    assert!(lines[1].contains('*'));
    assert!(lines[1].contains("twelve"));
}

#[test]
fn draft_content_from_args_keeps_explicit_empty_text() {
    assert_eq!(draft_content_from_args(&[]), None);
    assert_eq!(draft_content_from_args(&[String::new()]), Some(String::new()));
    assert_eq!(
        draft_content_from_args(&["new".to_string(), "text ".to_string()]),
        Some("new text".to_string())
    );
}

#[test]
fn apply_profile_update_rejects_non_http_endpoint() {
    let mut config = CliProfilesConfig::default();
    let result = apply_profile_update(
        &mut config,
        "work",
        Some("blinko.example.com".to_string()),
        false,
    );

    assert!(matches!(result, Err(CliError::Config(_))));
    assert!(config.profile("work").is_none());
}

#[test]
fn apply_profile_update_trims_endpoint_and_activates() {
    let mut config = CliProfilesConfig::default();
    apply_profile_update(
        &mut config,
        "work",
        Some("https://blinko.example.com/".to_string()),
        false,
    )
    .unwrap();

    assert_eq!(config.active_profile.as_deref(), Some("work"));
    assert_eq!(
        config.profile("work").and_then(|profile| profile.endpoint()),
        Some("https://blinko.example.com".to_string())
    );
}

#[test]
fn apply_profile_update_keeps_endpoint_and_active_profile() {
    let mut config = CliProfilesConfig::default();
    apply_profile_update(
        &mut config,
        "work",
        Some("https://blinko.example.com".to_string()),
        false,
    )
    .unwrap();
    apply_profile_update(&mut config, "work", None, false).unwrap();
    apply_profile_update(&mut config, "personal", None, true).unwrap();

    assert_eq!(config.active_profile.as_deref(), Some("work"));
    assert_eq!(
        config.profile("work").and_then(|profile| profile.endpoint()),
        Some("https://blinko.example.com".to_string())
    );
    assert!(config.profile("personal").is_some());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn list_notes_returns_creation_order_and_tag_filter() {
    let context = local_test_context();
    {
        let session = context.open_session().await.unwrap();
        create_note(&session, "First #work".to_string()).await.unwrap();
        create_note(&session, "Second #personal".to_string())
            .await
            .unwrap();
        create_note(&session, "Third #work".to_string()).await.unwrap();
    }

    let listed = list_notes(&context, Some(10), None, None).await.unwrap();
    assert_eq!(
        contents(&listed.notes),
        vec!["First #work", "Second #personal", "Third #work"]
    );
    assert!(listed.drafted.is_empty());

    let work_only = list_notes(&context, Some(10), Some("work".to_string()), None)
        .await
        .unwrap();
    assert_eq!(work_only.notes.len(), 2);
    assert!(work_only
        .notes
        .iter()
        .all(|note| note.content.contains("#work")));

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn create_note_rejects_blank_content_and_keeps_compose_clear() {
    let context = local_test_context();
    let session = context.open_session().await.unwrap();

    let result = create_note(&session, "   ".to_string()).await;
    assert!(result.is_err());

    let note = create_note(&session, "kept".to_string()).await.unwrap();
    assert_eq!(note.content, "kept");
    assert_eq!(session.compose_draft(), "");

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn move_note_persists_new_order() {
    let context = local_test_context();
    let ids = seed_notes(&context, &["one", "two", "three"]).await;

    let mut session = context.load_session().await.unwrap();
    let outcome = move_note(&mut session, ids[0], ids[2]).await.unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            from_index: 0,
            to_index: 2
        }
    );
    assert_eq!(
        contents(session.current_order()),
        vec!["two", "three", "one"]
    );

    let reloaded = context.load_session().await.unwrap();
    assert_eq!(
        contents(reloaded.current_order()),
        vec!["two", "three", "one"]
    );

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn move_note_onto_itself_is_unchanged() {
    let context = local_test_context();
    let ids = seed_notes(&context, &["one", "two"]).await;

    let mut session = context.load_session().await.unwrap();
    let outcome = move_note(&mut session, ids[1], ids[1]).await.unwrap();
    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert_eq!(contents(session.current_order()), vec!["one", "two"]);
    assert!(!session.is_dragging());

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn move_note_reports_missing_notes() {
    let context = local_test_context();
    let ids = seed_notes(&context, &["one", "two"]).await;
    let missing = NoteId::new(999);

    let mut session = context.load_session().await.unwrap();
    let result = move_note(&mut session, missing, ids[0]).await;
    assert!(matches!(result, Err(CliError::NoteNotFound(id)) if id == missing));

    let result = move_note(&mut session, ids[0], missing).await;
    assert!(matches!(result, Err(CliError::NoteNotFound(id)) if id == missing));
    assert_eq!(contents(session.current_order()), vec!["one", "two"]);

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn drafts_survive_sessions_until_committed() {
    let context = local_test_context();
    let ids = seed_notes(&context, &["saved text"]).await;

    {
        let mut session = context.load_session().await.unwrap();
        set_draft(&mut session, ids[0], "edited text".to_string()).unwrap();
    }

    let mut session = context.load_session().await.unwrap();
    assert_eq!(session.get_draft_or_fallback(ids[0]), "edited text");
    let items = draft_items(&session);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].note_id, Some(ids[0].get()));
    assert_eq!(items[0].content, "edited text");

    let saved = commit_draft(&mut session, ids[0]).await.unwrap();
    assert_eq!(saved.content, "edited text");
    assert!(!session.has_draft(ids[0]));

    let reloaded = context.load_session().await.unwrap();
    assert!(draft_items(&reloaded).is_empty());
    assert_eq!(contents(reloaded.current_order()), vec!["edited text"]);

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn empty_draft_is_kept_when_policy_allows() {
    let mut context = local_test_context();
    context.session_config.empty_draft_policy = EmptyDraftPolicy::KeepEmpty;
    let ids = seed_notes(&context, &["saved text"]).await;

    {
        let mut session = context.load_session().await.unwrap();
        let content = draft_content_from_args(&[String::new()]).unwrap();
        set_draft(&mut session, ids[0], content).unwrap();
    }

    let session = context.load_session().await.unwrap();
    assert!(session.has_draft(ids[0]));
    assert_eq!(session.get_draft_or_fallback(ids[0]), "");

    cleanup_context(&context);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn commit_draft_without_draft_is_rejected() {
    let context = local_test_context();
    let ids = seed_notes(&context, &["saved text"]).await;

    let mut session = context.load_session().await.unwrap();
    let result = commit_draft(&mut session, ids[0]).await;
    assert!(matches!(result, Err(CliError::NoDraft(id)) if id == ids[0]));

    let result = set_draft(&mut session, NoteId::new(999), "orphan".to_string());
    assert!(matches!(result, Err(CliError::NoteNotFound(_))));

    cleanup_context(&context);
}

#[test]
fn run_completions_writes_bash_script_file() {
    let output_path = std::env::temp_dir().join(format!(
        "blinko-completions-test-{}.bash",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_blinko()"));
    assert!(script.contains("complete -F _blinko"));

    let _ = std::fs::remove_file(output_path);
}

async fn seed_notes(context: &CliContext, contents: &[&str]) -> Vec<NoteId> {
    let session = context.open_session().await.unwrap();
    let mut ids = Vec::with_capacity(contents.len());
    for content in contents {
        let note = create_note(&session, (*content).to_string())
            .await
            .unwrap();
        ids.push(note.id);
    }
    ids
}

fn contents(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.content.as_str()).collect()
}

fn local_test_context() -> CliContext {
    let base = unique_test_path();
    CliContext {
        profile: "test".to_string(),
        db_path: base.with_extension("db"),
        drafts_path: base.with_extension("drafts.json"),
        endpoint: None,
        token: None,
        session_config: SessionConfig::default(),
    }
}

fn unique_test_path() -> PathBuf {
    static NEXT_TEST_ID: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let sequence = NEXT_TEST_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("blinko-cli-test-{timestamp}-{sequence}"))
}

fn cleanup_context(context: &CliContext) {
    let _ = std::fs::remove_file(&context.drafts_path);

    // On Windows, libsql can keep file handles alive briefly after drop.
    if cfg!(windows) {
        return;
    }

    let path = &context.db_path;
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
}
