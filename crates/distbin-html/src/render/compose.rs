//! Post composition page.

use distbin_core::PUBLIC_COLLECTION_ID;
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;

use super::components::{above_fold, page_shell};

/// Form defaults taken from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComposeDefaults {
    #[serde(default, rename = "inReplyTo")]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl ComposeDefaults {
    /// Parse defaults from a raw query string. Undecodable input yields none.
    pub fn from_query(query: Option<&str>) -> Self {
        query
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default()
    }
}

/// Render the composition form.
///
/// `outbox_url` is shown in the API example for clients that skip the form.
pub fn render(defaults: &ComposeDefaults, outbox_url: &str) -> Markup {
    let in_reply_to = defaults.in_reply_to.as_deref().unwrap_or_default();
    let title = defaults.title.as_deref().unwrap_or_default();
    let attachment = defaults.attachment.as_deref().unwrap_or_default();

    let curl_example = format!(
        r#"curl -XPOST "{outbox_url}" -d @- <<EOF
{{
"@context": "https://www.w3.org/ns/activitystreams",
"type": "Note",
"content": "This is a note",
"published": "2015-02-10T15:04:55Z",
"cc": ["{PUBLIC_COLLECTION_ID}"]
}}
EOF"#
    );

    let body = html! {
        style { (PreEscaped(COMPOSE_CSS)) }
        (above_fold(html! {
            form class="post-form" method="post" {
                input name="name" type="text" placeholder="Title (optional)"
                    value=(title) class="post-form-stretch";
                textarea name="content" placeholder="Write anonymously, get feedback"
                    class="post-form-stretch" {}
                input name="inReplyTo" type="text"
                    placeholder="replying to another URL? (optional)"
                    value=(in_reply_to) class="post-form-stretch";
                details class="post-form-show-more" {
                    summary class="post-form-stretch" { "More" }
                    input name="attachment" type="text"
                        placeholder="Attachment URL (optional)"
                        value=(attachment) class="post-form-stretch";
                }
                input type="submit" value="post" class="post-form-stretch";
            }
            script { (PreEscaped(FOCUS_SCRIPT)) }
        }))
        details {
            summary { "or POST via API" }
            pre { (curl_example) }
        }
    };

    page_shell(
        "distbin",
        "Write anonymously, get feedback.",
        body,
    )
}

const FOCUS_SCRIPT: &str = r#"
(function () {
  var contentInput = document.querySelector('.post-form *[name=content]');
  if (contentInput.scrollIntoViewIfNeeded) contentInput.scrollIntoViewIfNeeded();
  contentInput.focus();
}())
"#;

/// Additional CSS for the composition form only.
const COMPOSE_CSS: &str = r#"
.post-form textarea{height:calc(100% - 14em - 8px);min-height:4em;resize:vertical}
.post-form textarea,.post-form input,.post-form-show-more>summary{border:0;font:inherit;padding:1em;margin-bottom:2px;background:var(--field);color:var(--fg);display:block}
.post-form-stretch{width:calc(100% + 2em);margin-left:-1em;margin-right:-1em}
.post-form input[type=submit]:hover,.post-form summary{cursor:pointer}
"#;
