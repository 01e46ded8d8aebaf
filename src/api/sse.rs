//! The subscriber endpoint: the GET/OPTIONS handler pair that validates a
//! connection, commits SSE headers, and streams events until disconnect.
//!
//! axum's built-in `Sse`/`Event`/`KeepAlive` types are not used here: `Event`
//! splits a payload containing embedded newlines into multiple `data:`
//! lines, which would corrupt multi-line payloads on the wire. The response
//! body is instead built by hand over `async_stream::stream!`, giving
//! byte-for-byte control over the preamble, heartbeat, and event lines.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::admission::AdmissionDecision;
use crate::api::cors::apply_cors;
use crate::api::server::SharedState;
use crate::channel::{ChannelName, ListenerFn};

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub channel: Option<String>,
}

const PREAMBLE: &str = ": connected\n\n";
const HEARTBEAT: &str = ": heartbeat\n\n";

fn sse_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", "text/event-stream;charset=UTF-8".parse().unwrap());
    headers.insert("Cache-Control", "no-cache,no-store".parse().unwrap());
    headers.insert("X-Accel-Buffering", "no".parse().unwrap());
    headers
}

/// GET `<mount>?channel=<name>` — subscribe.
pub async fn subscribe_handler(
    State(state): State<SharedState>,
    Query(query): Query<SubscribeQuery>,
    headers: HeaderMap,
) -> Response {
    // Validate the query before anything else is committed.
    let raw_name = match query.channel.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return (StatusCode::BAD_REQUEST, "Missing required query parameter 'channel'\n").into_response(),
    };

    let mut response_headers = HeaderMap::new();
    apply_cors(state.cors.as_ref(), &headers, &mut response_headers);

    // Name validation happens after CORS so a bad-name rejection still
    // carries the CORS headers a cross-origin client expects.
    let channel_name = match ChannelName::parse(raw_name) {
        Ok(name) => name,
        Err(err) => {
            let mut response = (StatusCode::BAD_REQUEST, format!("{err}\n")).into_response();
            response.headers_mut().extend(response_headers);
            return response;
        }
    };

    let _identity = match state.admission.authorize(&headers).await {
        AdmissionDecision::Allow(scope) => scope,
        AdmissionDecision::Deny(reason) => {
            warn!(channel = %channel_name, reason, "admission denied");
            let mut response = (
                StatusCode::UNAUTHORIZED,
                format!("event: error\ndata: Authentication required: {reason}\n\n"),
            )
                .into_response();
            response.headers_mut().extend(response_headers);
            return response;
        }
    };

    let (tx, mut listener_rx) = mpsc::channel::<String>(8);
    let channel = state.broadcast.subscribe(channel_name.clone(), make_listener(tx)).await;

    if let Some(hint) = state.config.sse.channel_capacity_hint {
        let count = channel.listener_count().await;
        if count > hint {
            info!(channel = %channel_name, count, hint, "channel listener count exceeds capacity hint");
        }
    }

    info!(channel = %channel_name, "subscriber connected");

    // Commit headers and the preamble, then stream heartbeats and events
    // until the listener is evicted, the channel closes, or the client
    // disconnects.
    let heartbeat_interval = Duration::from_secs(state.config.sse.heartbeat_interval_secs);
    let channel_name_for_stream = channel_name.clone();
    let body_stream = stream! {
        yield Ok::<Bytes, Infallible>(Bytes::from_static(PREAMBLE.as_bytes()));

        let mut ticker = tokio::time::interval(heartbeat_interval);
        ticker.tick().await; // first tick fires immediately; discard it

        loop {
            tokio::select! {
                biased;

                _ = channel.await_close() => {
                    info!(channel = %channel_name_for_stream, "channel closed; tearing down subscriber");
                    break;
                }

                maybe_payload = listener_rx.recv() => {
                    match maybe_payload {
                        Some(payload) => {
                            yield Ok(Bytes::from(format!("data: {payload}\n\n")));
                        }
                        None => {
                            info!(channel = %channel_name_for_stream, "listener evicted; tearing down subscriber");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    yield Ok(Bytes::from_static(HEARTBEAT.as_bytes()));
                }
            }
        }
    };

    let mut response = Response::new(Body::from_stream(body_stream));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().extend(sse_headers());
    response.headers_mut().extend(response_headers);
    response
}

/// OPTIONS `<mount>` — CORS preflight.
pub async fn options_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut response_headers = HeaderMap::new();
    apply_cors(state.cors.as_ref(), &headers, &mut response_headers);
    let mut response = StatusCode::OK.into_response();
    response.headers_mut().extend(response_headers);
    response
}

/// Build the listener closure registered on the channel: each invocation
/// clones the connection's sender and forwards the payload; the return
/// value is `false` exactly when the client has gone away, which is what
/// drives eviction.
fn make_listener(tx: mpsc::Sender<String>) -> ListenerFn {
    Arc::new(move |event| {
        let tx = tx.clone();
        Box::pin(async move { tx.send(event.payload).await.is_ok() })
    })
}
