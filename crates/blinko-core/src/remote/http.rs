//! Blinko server client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{NoteFilter, RemoteStore};
use crate::config::resolve_endpoint;
use crate::error::{Error, Result};
use crate::models::{AttachmentOrderUpdate, Note, NoteId, NoteMetadata, OrderUpdate};
use crate::util::{excerpt, non_blank};

const LIST_PATH: &str = "api/v1/note/list";
const UPSERT_PATH: &str = "api/v1/note/upsert";
const UPDATE_ORDER_PATH: &str = "api/v1/note/update-order";
const UPDATE_ATTACHMENTS_ORDER_PATH: &str = "api/v1/note/update-attachments-order";

/// [`RemoteStore`] backed by a Blinko server's JSON API.
#[derive(Clone)]
pub struct HttpRemoteStore {
    endpoint: Option<String>,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteStore")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    pub fn new(endpoint: Option<String>, token: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.as_deref().and_then(non_blank).map(str::to_string),
            token: token.as_deref().and_then(non_blank).map(str::to_string),
            client: reqwest::Client::builder().build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        resolve_endpoint(self.endpoint.as_deref(), path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(parse_api_error(status, &body)));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_ordered_list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let request = ListRequest {
            page: filter.page(),
            filter,
        };
        let payload: Vec<NotePayload> = self.post(LIST_PATH, &request).await?;
        Ok(payload.into_iter().map(Note::from).collect())
    }

    async fn update_order(&self, updates: &[OrderUpdate]) -> Result<()> {
        let _: serde_json::Value = self
            .post(UPDATE_ORDER_PATH, &UpdateOrderRequest { updates })
            .await?;
        Ok(())
    }

    async fn update_content(
        &self,
        id: NoteId,
        content: &str,
        metadata: &NoteMetadata,
    ) -> Result<Note> {
        let request = UpsertRequest {
            id: Some(id),
            content,
            metadata,
        };
        let payload: NotePayload = self.post(UPSERT_PATH, &request).await?;
        Ok(payload.into())
    }

    async fn create_note(&self, content: &str, metadata: &NoteMetadata) -> Result<Note> {
        let request = UpsertRequest {
            id: None,
            content,
            metadata,
        };
        let payload: NotePayload = self.post(UPSERT_PATH, &request).await?;
        Ok(payload.into())
    }

    async fn update_attachments_order(
        &self,
        note_id: NoteId,
        updates: &[AttachmentOrderUpdate],
    ) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                UPDATE_ATTACHMENTS_ORDER_PATH,
                &UpdateAttachmentsOrderRequest {
                    note_id,
                    attachments: updates,
                },
            )
            .await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    page: usize,
    #[serde(flatten)]
    filter: &'a NoteFilter,
}

#[derive(Debug, Serialize)]
struct UpdateOrderRequest<'a> {
    updates: &'a [OrderUpdate],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAttachmentsOrderRequest<'a> {
    note_id: NoteId,
    attachments: &'a [AttachmentOrderUpdate],
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<NoteId>,
    content: &'a str,
    #[serde(flatten)]
    metadata: &'a NoteMetadata,
}

/// Note as returned by the server; timestamps may be ISO strings or Unix ms.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotePayload {
    id: NoteId,
    #[serde(default)]
    content: String,
    #[serde(default)]
    sort_order: i64,
    updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Millis(i64),
    Iso(DateTime<Utc>),
}

impl Timestamp {
    fn as_millis(&self) -> i64 {
        match self {
            Self::Millis(millis) => *millis,
            Self::Iso(date_time) => date_time.timestamp_millis(),
        }
    }
}

impl From<NotePayload> for Note {
    fn from(payload: NotePayload) -> Self {
        Self {
            id: payload.id,
            content: payload.content,
            sort_order: payload.sort_order,
            updated_at: payload.updated_at.as_millis(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = excerpt(body, 180);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
