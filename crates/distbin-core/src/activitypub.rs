//! ActivityStreams vocabulary used by the composition front-end.
//!
//! Only the handful of object types the front-end creates are modelled here:
//! a `Note`, the `Link` objects it carries as attachments, and the
//! `Application` that generated it.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::jsonld::ACTIVITYSTREAMS_CONTEXT_URL;

/// The collection id meaning "visible to everyone".
pub const PUBLIC_COLLECTION_ID: &str = "https://www.w3.org/ns/activitystreams#Public";

/// Media type used when posting ActivityStreams objects to an outbox.
pub const ACTIVITYSTREAMS_MEDIA_TYPE: &str =
    "application/ld+json; profile=\"https://www.w3.org/ns/activitystreams#\"";

/// Extension property recording what an attachment URL served when probed.
pub const LINK_PREFETCH_PROPERTY: &str = "https://distbin.com/ns/linkPrefetch";

/// Name reported in the `generator` of every Note this front-end creates.
pub const GENERATOR_NAME: &str = "distbin-html";

/// Scheme-qualified (`https://`) or scheme-relative (`//`) URL prefix.
static ABSOLUTE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z]+:)?//").expect("absolute URL regex should compile")
});

/// Cheap syntactic check for absolute URLs.
///
/// Accepts anything starting with `scheme://` or `//`. Whether the scheme can
/// actually be fetched is decided later by the transport.
pub fn is_probably_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL_REGEX.is_match(url)
}

/// Fields of the composition form.
///
/// Browsers submit blank inputs as empty strings, so empty `inReplyTo` and
/// `attachment` values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteSubmission {
    /// Body of the note.
    #[serde(default)]
    pub content: Option<String>,

    /// URL of the object this note replies to.
    #[serde(default, rename = "inReplyTo")]
    pub in_reply_to: Option<String>,

    /// URL of an attachment to link.
    #[serde(default)]
    pub attachment: Option<String>,
}

impl NoteSubmission {
    /// The reply target, if one was given.
    pub fn in_reply_to(&self) -> Option<&str> {
        non_empty(self.in_reply_to.as_deref())
    }

    /// The attachment URL, if one was given.
    ///
    /// Fails when the attachment is present but not an absolute URL.
    pub fn attachment_url(&self) -> Result<Option<&str>, ValidationError> {
        match non_empty(self.attachment.as_deref()) {
            Some(url) if !is_probably_absolute_url(url) => {
                Err(ValidationError::Attachment(url.to_string()))
            }
            other => Ok(other),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Media type hint stored on an attachment link after probing its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPrefetch {
    /// When the URL was probed.
    pub published: DateTime<Utc>,
    /// Media types the URL was observed to serve.
    pub supported_media_types: Vec<String>,
}

impl LinkPrefetch {
    /// Record a media type observed just now.
    pub fn observed(media_type: impl Into<String>) -> Self {
        Self {
            published: Utc::now(),
            supported_media_types: vec![media_type.into()],
        }
    }
}

/// An ActivityStreams `Link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: String,
    pub href: String,
    #[serde(
        rename = "https://distbin.com/ns/linkPrefetch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub link_prefetch: Option<LinkPrefetch>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            kind: "Link".to_string(),
            href: href.into(),
            link_prefetch: None,
        }
    }

    /// Attach a prefetch hint.
    pub fn with_prefetch(mut self, prefetch: LinkPrefetch) -> Self {
        self.link_prefetch = Some(prefetch);
        self
    }
}

/// The `generator` of a Note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub url: String,
}

impl Application {
    /// This front-end, reachable at `external_url`.
    pub fn distbin_html(external_url: impl Into<String>) -> Self {
        Self {
            kind: "Application".to_string(),
            name: GENERATOR_NAME.to_string(),
            url: external_url.into(),
        }
    }
}

/// An ActivityStreams `Note` ready to be posted to an outbox.
///
/// Absent `inReplyTo` and `attachment` are omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub cc: Vec<String>,
    pub generator: Application,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Vec<Link>>,
    #[serde(
        rename = "inReplyTo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub in_reply_to: Option<String>,
}

impl Note {
    /// Build a Note from a form submission.
    ///
    /// `cc` always starts with the public collection and then names the reply
    /// target, if any and not already listed.
    pub fn new(
        submission: &NoteSubmission,
        attachment: Option<Link>,
        generator: Application,
    ) -> Self {
        let in_reply_to = submission.in_reply_to().map(str::to_string);

        let mut cc = vec![PUBLIC_COLLECTION_ID.to_string()];
        if let Some(target) = &in_reply_to
            && !cc.contains(target)
        {
            cc.push(target.clone());
        }

        Self {
            context: ACTIVITYSTREAMS_CONTEXT_URL.to_string(),
            kind: "Note".to_string(),
            content: submission.content.clone(),
            cc,
            generator,
            attachment: attachment.map(|link| vec![link]),
            in_reply_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(content: &str, in_reply_to: Option<&str>, attachment: Option<&str>) -> NoteSubmission {
        NoteSubmission {
            content: Some(content.to_string()),
            in_reply_to: in_reply_to.map(str::to_string),
            attachment: attachment.map(str::to_string),
        }
    }

    fn generator() -> Application {
        Application::distbin_html("https://distbin.example")
    }

    #[test]
    fn absolute_url_heuristic() {
        assert!(is_probably_absolute_url("http://example.com/img.png"));
        assert!(is_probably_absolute_url("https://example.com/x"));
        assert!(is_probably_absolute_url("HTTPS://EXAMPLE.COM"));
        assert!(is_probably_absolute_url("//cdn.example.com/a.png"));
        assert!(is_probably_absolute_url("ftp://example.com/file"));
        assert!(!is_probably_absolute_url("not-a-url"));
        assert!(!is_probably_absolute_url("/relative/path"));
        assert!(!is_probably_absolute_url("example.com/x"));
        assert!(!is_probably_absolute_url("mailto:someone@example.com"));
    }

    #[test]
    fn attachment_validation_rejects_relative() {
        for bad in ["not-a-url", "/relative/path"] {
            let sub = submission("hi", None, Some(bad));
            assert_eq!(
                sub.attachment_url(),
                Err(ValidationError::Attachment(bad.to_string()))
            );
        }
    }

    #[test]
    fn attachment_empty_is_absent() {
        let sub = submission("hi", Some(""), Some(""));
        assert_eq!(sub.attachment_url(), Ok(None));
        assert_eq!(sub.in_reply_to(), None);
    }

    #[test]
    fn plain_note_omits_optional_keys() {
        let note = Note::new(&submission("hello", None, None), None, generator());
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["type"], "Note");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["@context"], ACTIVITYSTREAMS_CONTEXT_URL);
        assert_eq!(json["cc"], serde_json::json!([PUBLIC_COLLECTION_ID]));
        assert!(json.get("inReplyTo").is_none());
        assert!(json.get("attachment").is_none());
        assert_eq!(json["generator"]["type"], "Application");
        assert_eq!(json["generator"]["name"], GENERATOR_NAME);
        assert_eq!(json["generator"]["url"], "https://distbin.example");
    }

    #[test]
    fn reply_note_lists_target_in_cc() {
        let note = Note::new(&submission("hi", Some("https://x/1"), None), None, generator());
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(
            json["cc"],
            serde_json::json!([PUBLIC_COLLECTION_ID, "https://x/1"])
        );
        assert_eq!(json["inReplyTo"], "https://x/1");
    }

    #[test]
    fn reply_to_public_collection_is_not_duplicated() {
        let note = Note::new(
            &submission("hi", Some(PUBLIC_COLLECTION_ID), None),
            None,
            generator(),
        );
        assert_eq!(note.cc, vec![PUBLIC_COLLECTION_ID.to_string()]);
    }

    #[test]
    fn attachment_link_carries_prefetch_hint() {
        let link = Link::new("http://example.com/img.png")
            .with_prefetch(LinkPrefetch::observed("image/png"));
        let note = Note::new(
            &submission("look", None, Some("http://example.com/img.png")),
            Some(link),
            generator(),
        );
        let json = serde_json::to_value(&note).unwrap();

        let attachment = &json["attachment"][0];
        assert_eq!(attachment["type"], "Link");
        assert_eq!(attachment["href"], "http://example.com/img.png");
        let hint = &attachment[LINK_PREFETCH_PROPERTY];
        assert_eq!(hint["supportedMediaTypes"], serde_json::json!(["image/png"]));
        assert!(hint["published"].is_string());
    }

    #[test]
    fn link_without_hint_has_no_extension_key() {
        let json = serde_json::to_value(Link::new("https://example.com/x")).unwrap();
        assert!(json.get(LINK_PREFETCH_PROPERTY).is_none());
    }

    #[test]
    fn submission_parses_from_form_field_names() {
        let sub: NoteSubmission = serde_json::from_value(serde_json::json!({
            "content": "hi",
            "inReplyTo": "https://x/1",
        }))
        .unwrap();
        assert_eq!(sub.content.as_deref(), Some("hi"));
        assert_eq!(sub.in_reply_to(), Some("https://x/1"));
        assert_eq!(sub.attachment, None);
    }
}
