use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use serde_json::{Value, json};

use keybot_chat::client::SCOPE_SEND_NOTIFICATION;

use crate::state::AppState;
use crate::triage::Trigger;

const ADDON_KEY: &str = "keybot";
const ADDON_NAME: &str = "KeyBot";

pub async fn healthcheck() -> Json<Value> {
    Json(json!(["OK"]))
}

/// GET / and GET /keybot-connect.json: the add-on descriptor.
pub async fn descriptor(State(state): State<AppState>) -> Json<Value> {
    Json(build_descriptor(&state.base_url, state.triage.trigger()))
}

pub fn build_descriptor(base_url: &str, trigger: Trigger) -> Value {
    let base = base_url.trim_end_matches('/');
    json!({
        "key": ADDON_KEY,
        "name": ADDON_NAME,
        "description": "Stores SSH and PEM keys posted in chat",
        "links": {
            "self": format!("{}/keybot-connect.json", base),
            "homepage": base,
        },
        "capabilities": {
            "hipchatApiConsumer": {
                "fromName": ADDON_NAME,
                "scopes": [SCOPE_SEND_NOTIFICATION],
            },
            "installable": {
                "callbackUrl": format!("{}/installable", base),
                "allowRoom": true,
                "allowGlobal": false,
            },
            "configurable": {
                "url": format!("{}/config", base),
            },
            "webhook": [{
                "url": format!("{}/keybot", base),
                "pattern": trigger.webhook_pattern(),
                "event": "room_message",
                "name": "set_key",
                "authentication": "none",
            }],
        },
    })
}

#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    pub signed_request: Option<String>,
}

/// GET /config: the room configuration page.
pub async fn config(State(state): State<AppState>, Query(query): Query<ConfigQuery>) -> Html<String> {
    Html(render_config(
        &state.base_url,
        query.signed_request.as_deref().unwrap_or_default(),
        state.triage.trigger(),
    ))
}

fn render_config(base_url: &str, signed_request: &str, trigger: Trigger) -> String {
    let usage = match trigger {
        Trigger::Command => "/set_key type=rsa ssh-rsa AAAA...",
        Trigger::Phrase => "keybot set type=rsa ssh-rsa AAAA...",
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="token" content="{signed_request}">
  <title>{name}</title>
  <script src="https://www.hipchat.com/atlassian-connect/all.js" data-options="base:true"></script>
  <link rel="stylesheet" href="{base_url}/css/addon.css">
</head>
<body>
  <h1>{name}</h1>
  <p>Post a public key in this room to store it against your user:</p>
  <pre>{usage}</pre>
  <p>Keys must end the message. PEM blocks and ssh-rsa keys are recognised.</p>
</body>
</html>
"#,
        signed_request = escape_html(signed_request),
        base_url = escape_html(base_url.trim_end_matches('/')),
        name = ADDON_NAME,
        usage = escape_html(usage),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
