//! End-to-end tests: the real router on an ephemeral port, driven over
//! HTTP with `reqwest` and over WebSocket with `tokio-tungstenite`.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use ladder_gateway::api;
use ladder_gateway::app_state::AppState;
use ladder_gateway::domain::EventBus;
use ladder_gateway::service::LadderService;

async fn spawn_app() -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = api::build_app(AppState::new(LadderService::new(EventBus::new(64))));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn new(addr: SocketAddr) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("http://{addr}"),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> (u16, Value) {
        let Ok(response) = request.send().await else {
            panic!("request failed");
        };
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        self.send(self.http.get(format!("{}{path}", self.base))).await
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(self.http.post(format!("{}{path}", self.base)).json(&body))
            .await
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        self.send(self.http.delete(format!("{}{path}", self.base)))
            .await
    }

    async fn join(&self, ids: &[&str]) {
        for id in ids {
            let (status, _) = self
                .post("/api/v1/players", json!({ "id": id, "name": id }))
                .await;
            assert_eq!(status, 201, "join {id}");
        }
    }

    async fn order(&self) -> Vec<String> {
        let (_, body) = self.get("/api/v1/players?per_page=100").await;
        body.get("data")
            .and_then(Value::as_array)
            .map(|players| {
                players
                    .iter()
                    .filter_map(|p| p.get("id").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn str_at<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer).and_then(Value::as_str)
}

#[tokio::test]
async fn health_reports_healthy() {
    let client = Client::new(spawn_app().await);
    let (status, body) = client.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "/status"), Some("healthy"));
}

#[tokio::test]
async fn upset_reorders_roster() {
    let client = Client::new(spawn_app().await);
    client.join(&["A", "B", "C", "D"]).await;

    let (status, body) = client
        .post("/api/v1/matches", json!({ "winner_id": "D", "loser_id": "B" }))
        .await;
    assert_eq!(status, 201);
    assert_eq!(body.get("changed"), Some(&json!(true)));
    assert_eq!(body.pointer("/updated_ranks/D"), Some(&json!(2)));
    assert_eq!(client.order().await, ["A", "D", "B", "C"]);

    let (_, report) = client.get("/api/v1/roster/validate").await;
    assert_eq!(report.get("valid"), Some(&json!(true)));
}

#[tokio::test]
async fn errors_use_the_json_envelope() {
    let client = Client::new(spawn_app().await);
    client.join(&["A"]).await;

    // A lone player has nobody to play.
    let (status, _) = client
        .post("/api/v1/matches", json!({ "winner_id": "A", "loser_id": "A" }))
        .await;
    assert_eq!(status, 404);
    client.join(&["B"]).await;

    let (status, body) = client
        .post("/api/v1/matches", json!({ "winner_id": "A", "loser_id": "ghost" }))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body.pointer("/error/code"), Some(&json!(2001)));

    let (status, _) = client
        .post("/api/v1/matches", json!({ "winner_id": "A", "loser_id": "A" }))
        .await;
    assert_eq!(status, 400);

    let (status, body) = client
        .get("/api/v1/matches/00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(status, 404);
    assert_eq!(body.pointer("/error/code"), Some(&json!(2002)));
}

#[tokio::test]
async fn reverse_and_delete_restore_ranks() {
    let client = Client::new(spawn_app().await);
    client.join(&["A", "B", "C"]).await;

    let (_, body) = client
        .post("/api/v1/matches", json!({ "winner_id": "C", "loser_id": "A" }))
        .await;
    let Some(match_id) = str_at(&body, "/match/match_id").map(str::to_string) else {
        panic!("no match id in {body}");
    };
    assert_eq!(client.order().await, ["C", "A", "B"]);

    let (status, body) = client
        .post(&format!("/api/v1/matches/{match_id}/reverse"), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.get("complete"), Some(&json!(true)));
    assert_eq!(str_at(&body, "/match/winner_id"), Some("A"));
    assert_eq!(client.order().await, ["A", "B", "C"]);

    let (status, body) = client.delete(&format!("/api/v1/matches/{match_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body.get("complete"), Some(&json!(true)));
    assert_eq!(client.order().await, ["A", "B", "C"]);

    let (_, list) = client.get("/api/v1/matches").await;
    assert_eq!(list.pointer("/pagination/total"), Some(&json!(0)));
}

#[tokio::test]
async fn delete_after_departure_warns_and_renumber_repairs() {
    let client = Client::new(spawn_app().await);
    client.join(&["A", "B", "C"]).await;

    let (_, body) = client
        .post("/api/v1/matches", json!({ "winner_id": "C", "loser_id": "B" }))
        .await;
    let Some(match_id) = str_at(&body, "/match/match_id").map(str::to_string) else {
        panic!("no match id in {body}");
    };
    let (status, _) = client.delete("/api/v1/players/A").await;
    assert_eq!(status, 200);

    let (status, body) = client.delete(&format!("/api/v1/matches/{match_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body.get("complete"), Some(&json!(false)));
    assert_eq!(str_at(&body, "/warnings/0/kind"), Some("players_missing"));

    let (_, report) = client.get("/api/v1/roster/validate").await;
    assert_eq!(report.get("valid"), Some(&json!(false)));

    let (status, _) = client.post("/api/v1/roster/renumber", json!({})).await;
    assert_eq!(status, 200);
    let (_, report) = client.get("/api/v1/roster/validate").await;
    assert_eq!(report.get("valid"), Some(&json!(true)));
}

#[tokio::test]
async fn match_list_filters_by_player() {
    let client = Client::new(spawn_app().await);
    client.join(&["A", "B", "C"]).await;
    for (winner, loser) in [("B", "A"), ("C", "A"), ("C", "B")] {
        let (status, _) = client
            .post(
                "/api/v1/matches",
                json!({ "winner_id": winner, "loser_id": loser }),
            )
            .await;
        assert_eq!(status, 201);
    }

    let (_, body) = client.get("/api/v1/matches?player_id=A").await;
    assert_eq!(body.pointer("/pagination/total"), Some(&json!(2)));
    let (_, body) = client.get("/api/v1/matches?per_page=1&page=3").await;
    assert_eq!(body.pointer("/pagination/total_pages"), Some(&json!(3)));
    assert_eq!(str_at(&body, "/data/0/winner_id"), Some("B"));
}

#[tokio::test]
async fn websocket_streams_events_for_followed_players() {
    let addr = spawn_app().await;
    let client = Client::new(addr);
    client.join(&["A", "B", "C", "D"]).await;

    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": "2024-01-01T00:00:00Z",
        "payload": { "command": "subscribe", "player_ids": ["C"] },
    });
    if ws.send(Message::text(subscribe.to_string())).await.is_err() {
        panic!("ws send failed");
    }
    let reply = next_json(&mut ws).await;
    assert_eq!(str_at(&reply, "/type"), Some("response"));
    assert_eq!(reply.pointer("/payload/count"), Some(&json!(1)));

    // C is a bystander whose rank drops from 3 to 4.
    client
        .post("/api/v1/matches", json!({ "winner_id": "D", "loser_id": "B" }))
        .await;
    let event = next_json(&mut ws).await;
    assert_eq!(str_at(&event, "/type"), Some("event"));
    assert_eq!(str_at(&event, "/payload/event_type"), Some("match_resolved"));
    assert_eq!(event.pointer("/payload/updated_ranks/C"), Some(&json!(4)));
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let next = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
    let Ok(Some(Ok(message))) = next else {
        panic!("no ws message");
    };
    let Ok(text) = message.to_text() else {
        panic!("non-text ws message");
    };
    serde_json::from_str(text).unwrap_or(Value::Null)
}
