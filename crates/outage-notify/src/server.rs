//! Inbound HTTP endpoint for the monitoring engine.
//!
//! The engine posts one JSON document per event:
//!
//! ```json
//! { "event": "new-outage", "service": { "id": 1, "name": "API", "url": "https://api" }, "data": { "timestamp": 1700000000000 } }
//! ```
//!
//! Events are queued onto the relay session and acknowledged with
//! `202 Accepted`; delivery to Slack happens later and is never reported
//! back to the engine.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::MonitorEvent;

#[derive(Clone)]
struct AppState {
    events: mpsc::Sender<MonitorEvent>,
}

/// Build the router that feeds `events`.
pub fn router(events: mpsc::Sender<MonitorEvent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(receive_event))
        .with_state(AppState { events })
}

async fn health() -> &'static str {
    "ok"
}

async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<MonitorEvent>,
) -> impl IntoResponse {
    debug!(event = %event.event, service = %event.service.id, "Received monitoring event");

    match state.events.send(event).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            warn!("Relay session has stopped, rejecting event");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn post_event(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (sender, _receiver) = mpsc::channel(1);
        let response = router(sender)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_event_is_queued() {
        let (sender, mut receiver) = mpsc::channel(4);
        let response = router(sender)
            .oneshot(post_event(&serde_json::json!({
                "event": "service-back",
                "service": { "id": 42, "name": "API", "url": "https://api.example.com" },
                "data": { "timestamp": 1_700_000_000_000_i64 }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event, EventKind::ServiceBack);
        assert_eq!(event.service.id, "42");
        assert!(event.data.timestamp().is_some());
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let (sender, mut receiver) = mpsc::channel(4);
        let response = router(sender)
            .oneshot(post_event(&serde_json::json!({
                "event": "service-exploded",
                "service": { "id": 1, "name": "API" }
            })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stopped_session_returns_unavailable() {
        let (sender, receiver) = mpsc::channel(4);
        drop(receiver);

        let response = router(sender)
            .oneshot(post_event(&serde_json::json!({
                "event": "new-outage",
                "service": { "id": 1, "name": "API" }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
