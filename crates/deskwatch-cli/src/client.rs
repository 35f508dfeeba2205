//! REST client for the TOPdesk operator API.
//!
//! Implements the core [`Source`] trait over blocking HTTP. Endpoint layout
//! follows the operator API: incidents under `/tas/api/incidents`, changes
//! under `/tas/api/operatorchanges`, comment threads nested per item. List
//! endpoints answer `204 No Content` with an empty body when nothing
//! matches, which decodes here as an empty list rather than an error.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use deskwatch_core::config::Auth;
use deskwatch_core::model::{Comment, ItemKind, TrackedItem};
use deskwatch_core::source::{Source, SourceError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::cell::Cell;

/// Blocking client for one configured TOPdesk instance.
pub struct TopdeskClient {
    base_url: String,
    authorization: String,
    page_size: u32,
    requests: Cell<usize>,
}

impl TopdeskClient {
    #[must_use]
    pub fn new(base_url: &str, auth: &Auth, page_size: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: authorization_header(auth),
            page_size,
            requests: Cell::new(0),
        }
    }

    /// Number of HTTP requests issued so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    const fn endpoint(kind: ItemKind) -> &'static str {
        match kind {
            ItemKind::Incident => "incidents",
            ItemKind::Change => "operatorchanges",
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Response, SourceError> {
        self.requests.set(self.requests.get() + 1);
        tracing::debug!(%url, "GET");

        ureq::get(url)
            .set("Accept", "application/json")
            .set("User-Agent", "deskwatch-cli")
            .set("Authorization", &self.authorization)
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => SourceError::Status {
                    url: url.to_string(),
                    status,
                },
                other => SourceError::Transport {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        self.get(url)?
            .into_json::<T>()
            .map_err(|err| SourceError::Payload {
                url: url.to_string(),
                message: err.to_string(),
            })
    }

    fn get_json_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, SourceError> {
        let response = self.get(url)?;
        if response.status() == 204 {
            return Ok(Vec::new());
        }
        response
            .into_json::<Vec<T>>()
            .map_err(|err| SourceError::Payload {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

impl Source for TopdeskClient {
    fn list_my_incidents(&self) -> Result<Vec<TrackedItem>, SourceError> {
        let url = format!(
            "{}/tas/api/incidents?operator=me&status=open&page_size={}&sort=-creation_date",
            self.base_url, self.page_size
        );
        let batch: Vec<ApiIncident> = self.get_json_list(&url)?;
        Ok(batch.into_iter().map(ApiIncident::into_item).collect())
    }

    fn list_my_changes(&self) -> Result<Vec<TrackedItem>, SourceError> {
        let url = format!(
            "{}/tas/api/operatorchanges?operator=me&page_size={}&sort=-creation_date",
            self.base_url, self.page_size
        );
        let batch: Vec<ApiChange> = self.get_json_list(&url)?;
        Ok(batch.into_iter().map(ApiChange::into_item).collect())
    }

    fn fetch_details(&self, id: &str, kind: ItemKind) -> Result<TrackedItem, SourceError> {
        let url = format!("{}/tas/api/{}/{id}", self.base_url, Self::endpoint(kind));
        match kind {
            ItemKind::Incident => Ok(self.get_json::<ApiIncident>(&url)?.into_item()),
            ItemKind::Change => Ok(self.get_json::<ApiChange>(&url)?.into_item()),
        }
    }

    fn fetch_comments(&self, id: &str, kind: ItemKind) -> Result<Vec<Comment>, SourceError> {
        let url = format!(
            "{}/tas/api/{}/{id}/comments",
            self.base_url,
            Self::endpoint(kind)
        );
        let batch: Vec<ApiComment> = self.get_json_list(&url)?;
        Ok(batch.into_iter().map(ApiComment::into_comment).collect())
    }
}

fn authorization_header(auth: &Auth) -> String {
    match auth {
        Auth::ApiKey(key) => format!("Bearer {key}"),
        Auth::Basic { username, password } => {
            let credentials = BASE64.encode(format!("{username}:{password}"));
            format!("Basic {credentials}")
        }
    }
}

// Wire formats, as the operator API actually serves them. Every field is
// optional on the wire; missing nested names collapse to "Unknown" so the
// diff engine always sees a status label.

#[derive(Debug, Clone, Deserialize)]
struct ApiName {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiIncident {
    #[serde(default)]
    id: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    status: Option<ApiName>,
    #[serde(default)]
    creation_date: Option<String>,
    #[serde(default)]
    modification_date: Option<String>,
    #[serde(default)]
    category: Option<ApiName>,
    #[serde(default)]
    caller: Option<ApiName>,
    #[serde(default)]
    priority: Option<ApiName>,
    #[serde(default)]
    request: Option<String>,
}

impl ApiIncident {
    fn into_item(self) -> TrackedItem {
        TrackedItem {
            id: self.id,
            number: self.number,
            subject: self.subject,
            status: status_name(self.status),
            created_at: self.creation_date,
            modified_at: self.modification_date,
            category: self.category.map(|c| c.name),
            caller: self.caller.map(|c| c.name),
            priority: self.priority.map(|p| p.name),
            template: None,
            description: self.request,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChange {
    #[serde(default)]
    id: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    status: Option<ApiName>,
    #[serde(default)]
    creation_date: Option<String>,
    #[serde(default)]
    modification_date: Option<String>,
    #[serde(default)]
    template: Option<ApiName>,
    #[serde(default)]
    brief_description: Option<String>,
}

impl ApiChange {
    fn into_item(self) -> TrackedItem {
        TrackedItem {
            id: self.id,
            number: self.number,
            subject: self.subject,
            status: status_name(self.status),
            created_at: self.creation_date,
            modified_at: self.modification_date,
            category: None,
            caller: None,
            priority: None,
            template: self.template.map(|t| t.name),
            description: self.brief_description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ApiComment {
    #[serde(default)]
    creator: Option<ApiName>,
    #[serde(default)]
    creation_date: String,
    #[serde(default)]
    text: String,
}

impl ApiComment {
    fn into_comment(self) -> Comment {
        Comment {
            author: self
                .creator
                .map_or_else(|| "Unknown".to_string(), |creator| creator.name),
            created_at: self.creation_date,
            text: self.text,
        }
    }
}

fn status_name(status: Option<ApiName>) -> String {
    match status {
        Some(status) if !status.name.is_empty() => status.name,
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_and_basic_headers_are_well_formed() {
        assert_eq!(
            authorization_header(&Auth::ApiKey("secret".to_string())),
            "Bearer secret"
        );
        // base64("user:pass")
        assert_eq!(
            authorization_header(&Auth::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            }),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let client = TopdeskClient::new(
            "https://support.example.com/",
            &Auth::ApiKey("k".to_string()),
            10,
        );
        assert_eq!(client.base_url, "https://support.example.com");
    }

    #[test]
    fn incident_payload_maps_onto_tracked_item() {
        let raw = r#"{
            "id": "inc-1",
            "number": "I-2401-001",
            "subject": "printer is on fire",
            "status": {"name": "open"},
            "creation_date": "2024-01-05T09:30:00.000+0100",
            "modification_date": "2024-01-06T10:00:00.000+0100",
            "category": {"name": "Hardware"},
            "caller": {"name": "Bob"},
            "priority": {"name": "P1"},
            "request": "It is actually on fire."
        }"#;
        let incident: ApiIncident = serde_json::from_str(raw).expect("decode");
        let item = incident.into_item();

        assert_eq!(item.id, "inc-1");
        assert_eq!(item.number, "I-2401-001");
        assert_eq!(item.status, "open");
        assert_eq!(item.category.as_deref(), Some("Hardware"));
        assert_eq!(item.priority.as_deref(), Some("P1"));
        assert_eq!(item.template, None);
        assert_eq!(item.description.as_deref(), Some("It is actually on fire."));
    }

    #[test]
    fn change_payload_maps_onto_tracked_item() {
        let raw = r#"{
            "id": "chg-1",
            "number": "C-2401-001",
            "subject": "replace the printer",
            "status": {"name": "planned"},
            "template": {"name": "Hardware swap"},
            "brief_description": "Out with the old."
        }"#;
        let change: ApiChange = serde_json::from_str(raw).expect("decode");
        let item = change.into_item();

        assert_eq!(item.status, "planned");
        assert_eq!(item.template.as_deref(), Some("Hardware swap"));
        assert_eq!(item.priority, None);
        assert_eq!(item.description.as_deref(), Some("Out with the old."));
    }

    #[test]
    fn missing_status_becomes_unknown() {
        let incident: ApiIncident = serde_json::from_str(r#"{"id": "inc-1"}"#).expect("decode");
        assert_eq!(incident.into_item().status, "Unknown");

        let incident: ApiIncident =
            serde_json::from_str(r#"{"id": "inc-1", "status": {}}"#).expect("decode");
        assert_eq!(incident.into_item().status, "Unknown");
    }

    #[test]
    fn comment_without_creator_gets_unknown_author() {
        let raw = r#"{"creation_date": "2024-01-05T09:30:00.000+0100", "text": "hello"}"#;
        let comment: ApiComment = serde_json::from_str(raw).expect("decode");
        let comment = comment.into_comment();

        assert_eq!(comment.author, "Unknown");
        assert_eq!(comment.text, "hello");
    }

    #[test]
    fn unreachable_host_surfaces_a_transport_error() {
        // Nothing listens on the discard port; the connect fails immediately.
        let client = TopdeskClient::new("http://127.0.0.1:9", &Auth::ApiKey("k".to_string()), 10);

        match client.list_my_incidents() {
            Err(SourceError::Transport { url, .. }) => {
                assert!(url.starts_with("http://127.0.0.1:9/tas/api/incidents"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(client.request_count(), 1);
    }
}
