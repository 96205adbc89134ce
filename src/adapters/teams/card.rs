//! Office 365 connector card payloads for Teams incoming webhooks.

use serde::Serialize;
use serde_json::Value;

use crate::domain::models::{ChangeEvent, ChangeKind};

const THEME_COLOR: &str = "0076D7";

/// A legacy `MessageCard` as accepted by Teams incoming webhooks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    theme_color: &'static str,
    summary: String,
    title: String,
    sections: Vec<CardSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    potential_action: Vec<CardAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardSection {
    activity_title: String,
    facts: Vec<CardFact>,
    markdown: bool,
}

#[derive(Debug, Clone, Serialize)]
struct CardFact {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Serialize)]
struct CardAction {
    #[serde(rename = "@type")]
    action_type: &'static str,
    name: &'static str,
    targets: Vec<CardTarget>,
}

#[derive(Debug, Clone, Serialize)]
struct CardTarget {
    os: &'static str,
    uri: String,
}

impl MessageCard {
    /// Render a change event.
    pub fn from_event(event: &ChangeEvent) -> Self {
        let title = format!("{}: {}", event.source_name, event.kind.title());
        let potential_action = event
            .url
            .iter()
            .map(|url| CardAction {
                action_type: "OpenUri",
                name: "View on GitHub",
                targets: vec![CardTarget {
                    os: "default",
                    uri: url.clone(),
                }],
            })
            .collect();

        Self {
            card_type: "MessageCard",
            context: "https://schema.org/extensions",
            theme_color: THEME_COLOR,
            summary: title.clone(),
            title,
            sections: vec![CardSection {
                activity_title: describe(event),
                facts: facts(event),
                markdown: true,
            }],
            potential_action,
        }
    }
}

fn describe(event: &ChangeEvent) -> String {
    match event.kind {
        ChangeKind::IssueStateChanged => format!(
            "Issue is now **{}**",
            text(&event.new_value).unwrap_or_default()
        ),
        ChangeKind::IssueLockChanged => {
            if event.new_value["locked"].as_bool().unwrap_or(false) {
                "Issue was **locked**".to_string()
            } else {
                "Issue was **unlocked**".to_string()
            }
        }
        ChangeKind::NewComments => {
            let count = event.new_value.as_u64().unwrap_or(0);
            if count == 1 {
                "1 new comment".to_string()
            } else {
                format!("{count} new comments")
            }
        }
        ChangeKind::NewRelease => format!(
            "**{}** has been released",
            text(&event.new_value["name"]).unwrap_or_default()
        ),
    }
}

fn facts(event: &ChangeEvent) -> Vec<CardFact> {
    let mut facts = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            facts.push(CardFact {
                name: name.to_string(),
                value,
            });
        }
    };

    match event.kind {
        ChangeKind::IssueStateChanged => {
            push("Previous state", text(&event.old_value));
        }
        ChangeKind::IssueLockChanged => {
            push("Reason", text(&event.new_value["reason"]));
        }
        ChangeKind::NewComments => {
            let before = event.old_value.as_u64().unwrap_or(0);
            let delta = event.new_value.as_u64().unwrap_or(0);
            push("Total comments", Some((before + delta).to_string()));
        }
        ChangeKind::NewRelease => {
            push("Tag", text(&event.new_value["tag"]));
            push("Published", text(&event.new_value["published_at"]));
            push("Previous release", text(&event.old_value["tag"]));
        }
    }
    push("Detected", Some(event.detected_at.to_rfc3339()));
    facts
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
