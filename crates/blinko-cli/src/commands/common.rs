use std::collections::HashSet;
use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use blinko_core::db::LibSqlNoteStore;
use blinko_core::remote::HttpRemoteStore;
use blinko_core::storage::{FileStorage, ScopedStorage};
use blinko_core::{Note, NoteId, NoteListSession, RemoteStore, SessionConfig};
use chrono::Utc;
use serde::Serialize;

use crate::config_profiles::{
    config_dir, normalize_text_option, CliProfile, CliProfilesConfig,
};
use crate::credentials::TokenStore;
use crate::error::CliError;

const LOCAL_SCOPE: &str = "local";

/// Everything a command needs to open a session for the selected profile.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub profile: String,
    pub db_path: PathBuf,
    pub drafts_path: PathBuf,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub session_config: SessionConfig,
}

impl CliContext {
    pub fn resolve(
        cli_db_path: Option<PathBuf>,
        cli_profile: Option<&str>,
        session_config_path: Option<&Path>,
    ) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load()?;
        let profile = profiles.resolve_profile_name(cli_profile);

        let endpoint = normalize_text_option(env::var("BLINKO_ENDPOINT").ok())
            .or_else(|| profiles.profile(&profile).and_then(CliProfile::endpoint));
        let token = match normalize_text_option(env::var("BLINKO_TOKEN").ok()) {
            Some(token) => Some(token),
            None if endpoint.is_some() => TokenStore::for_profile(&profile).load()?,
            None => None,
        };

        let session_config_path = session_config_path
            .map_or_else(|| config_dir().join("session.json"), Path::to_path_buf);
        let mut session_config = SessionConfig::load_from_path(&session_config_path)?;
        if endpoint.is_some() {
            session_config.endpoint.clone_from(&endpoint);
        }

        Ok(Self {
            db_path: resolve_db_path(cli_db_path),
            drafts_path: default_data_dir().join(format!("drafts-{profile}.json")),
            profile,
            endpoint,
            token,
            session_config,
        })
    }

    /// Drafts are kept apart per note store so switching servers never mixes them.
    pub fn store_scope(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| LOCAL_SCOPE.to_string())
    }

    pub async fn open_session(&self) -> Result<NoteListSession, CliError> {
        let remote: Arc<dyn RemoteStore> = if let Some(endpoint) = &self.endpoint {
            tracing::debug!("Using Blinko server at {} (profile '{}')", endpoint, self.profile);
            Arc::new(HttpRemoteStore::new(
                Some(endpoint.clone()),
                self.token.clone(),
            )?)
        } else {
            Arc::new(LibSqlNoteStore::open_path(&self.db_path).await?)
        };

        let storage = ScopedStorage::new(
            FileStorage::open(self.drafts_path.clone())?,
            self.store_scope(),
        );
        Ok(NoteListSession::new(
            self.session_config.clone(),
            remote,
            Arc::new(storage),
        ))
    }

    /// Open a session and load the first page of notes.
    pub async fn load_session(&self) -> Result<NoteListSession, CliError> {
        let mut session = self.open_session().await?;
        let filter = session.default_filter();
        session.refresh(&filter).await?;
        Ok(session)
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub sort_order: i64,
    pub preview: String,
    pub content: String,
    pub updated_at: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
    pub has_draft: bool,
}

pub fn drafted_ids(session: &NoteListSession) -> HashSet<NoteId> {
    session
        .drafts()
        .into_iter()
        .filter_map(|draft| draft.key.note_id())
        .collect()
}

pub fn require_note(session: &NoteListSession, id: NoteId) -> Result<&Note, CliError> {
    session
        .current_order()
        .iter()
        .find(|note| note.id == id)
        .ok_or(CliError::NoteNotFound(id))
}

pub fn format_note_lines(notes: &[Note], drafted: &HashSet<NoteId>) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let marker = if drafted.contains(&note.id) { '*' } else { ' ' };
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_at, now_ms);
            let tags = render_tags(note);

            if tags.is_empty() {
                format!(
                    "{:>4}  {:<8}{marker} {preview:<40}  {relative_time}",
                    note.sort_order,
                    note.id.get()
                )
            } else {
                format!(
                    "{:>4}  {:<8}{marker} {preview:<40}  {relative_time:<10}  {tags}",
                    note.sort_order,
                    note.id.get()
                )
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note, drafted: &HashSet<NoteId>) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    let mut tags = note.tags();
    tags.sort();

    NoteListItem {
        id: note.id.get(),
        sort_order: note.sort_order,
        preview: note_preview(note, 80),
        content: note.content.clone(),
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.updated_at, now_ms),
        tags,
        has_draft: drafted.contains(&note.id),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    preview_text(&note.content, max_chars)
}

/// First line of `content`, whitespace-collapsed and cut to `max_chars`.
pub fn preview_text(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(note: &Note) -> String {
    let mut tags = note.tags();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Content from arguments, then piped stdin, then `$EDITOR` seeded with `initial`.
pub fn resolve_note_content(content_parts: &[String], initial: &str) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input_with_initial(initial)? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("blinko-note-{}-{now}.md", std::process::id()))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("BLINKO_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(|| default_data_dir().join("blinko.db"))
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("blinko")
}
