//! Test helpers for integration tests.
//!
//! Provides a local HTTP server that serves feeds and imitates the Telegram
//! Bot API, plus configuration builders pointing at it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use newsrelay::config::Config;
use newsrelay::Source;

/// Chat ID the mock Bot API always rejects.
pub const BROKEN_CHAT: &str = "@broken";

/// Bot token accepted by the mock Bot API.
pub const TEST_TOKEN: &str = "123:test-token";

#[derive(Clone, Default)]
struct MockState {
    feeds: Arc<Mutex<HashMap<String, (u16, String)>>>,
    user_agents: Arc<Mutex<Vec<String>>>,
    messages: Arc<Mutex<Vec<Value>>>,
}

/// Local server standing in for news sites and the Bot API.
pub struct MockServer {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockServer {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/", get(|| async { "home" }))
            .route("/feeds/:name", get(serve_feed))
            .route("/:bot/sendMessage", post(send_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Serve `body` at `/feeds/{name}`.
    pub fn set_feed(&self, name: &str, body: impl Into<String>) {
        self.set_feed_response(name, 200, body);
    }

    /// Serve `body` with `status` at `/feeds/{name}`.
    pub fn set_feed_response(&self, name: &str, status: u16, body: impl Into<String>) {
        self.state
            .feeds
            .lock()
            .unwrap()
            .insert(name.to_string(), (status, body.into()));
    }

    /// A source whose site is this server and whose feed is `/feeds/{name}`.
    pub fn source(&self, display_name: &str, feed: &str) -> Source {
        Source::new(display_name, self.url("/"), self.url(&format!("/feeds/{feed}")))
    }

    /// User-Agent headers seen on feed requests.
    pub fn user_agents(&self) -> Vec<String> {
        self.state.user_agents.lock().unwrap().clone()
    }

    /// Bodies of accepted `sendMessage` calls.
    pub fn messages(&self) -> Vec<Value> {
        self.state.messages.lock().unwrap().clone()
    }

    /// Texts of accepted messages sent to `chat_id`.
    pub fn texts_for(&self, chat_id: &str) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m["chat_id"] == chat_id)
            .filter_map(|m| m["text"].as_str().map(String::from))
            .collect()
    }
}

async fn serve_feed(
    State(state): State<MockState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        state.user_agents.lock().unwrap().push(agent.to_string());
    }

    let entry = state.feeds.lock().unwrap().get(&name).cloned();
    match entry {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, "application/rss+xml")],
            body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn send_message(
    State(state): State<MockState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if bot != format!("bot{TEST_TOKEN}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }
    if body["chat_id"] == BROKEN_CHAT {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })),
        );
    }

    state.messages.lock().unwrap().push(body);
    (StatusCode::OK, Json(json!({"ok": true, "result": {"message_id": 1}})))
}

/// A feed item for [`rss`].
pub struct Item<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: Option<&'a str>,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, link: &'a str) -> Self {
        Self {
            title,
            link,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Render an RSS 2.0 document.
pub fn rss(items: &[Item<'_>]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Mock</title><link>http://mock.test</link><description>Mock feed</description>"#,
    );
    for item in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{}</title>", escape(item.title)));
        body.push_str(&format!("<link>{}</link>", escape(item.link)));
        if let Some(description) = item.description {
            body.push_str(&format!("<description>{}</description>", escape(description)));
        }
        body.push_str("<pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>");
        body.push_str("</item>");
    }
    body.push_str("</channel></rss>");
    body
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Configuration wired to the mock server.
pub fn test_config(server: &MockServer, sources: Vec<Source>, channels: &[&str]) -> Config {
    let mut config = Config::default();
    config.sources = sources;
    config.poller.send_delay_ms = 0;
    config.poller.probe_sources = false;
    config.http.timeout_secs = 5;
    config.http.user_agents = vec!["agent-one/1.0".to_string(), "agent-two/2.0".to_string()];
    config.telegram.api_base = server.url("");
    config.telegram.bot_token = TEST_TOKEN.to_string();
    config.telegram.channel_ids = channels.iter().map(|c| c.to_string()).collect();
    config
}
