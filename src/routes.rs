//! HTTP routes for reading the chain and submitting heart-rate readings.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fmt;

use crate::error::ApiError;
use crate::model::Block;
use crate::AppState;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Build the router with all ledger endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_chain).post(write_block))
        .route("/validate", get(validate_chain))
        .route("/health", get(health))
        .route("/version", get(version))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Body of `POST /`. The `BPM` key matches case-insensitively and the last
/// matching key wins. A missing or null `BPM` reads as 0.
#[derive(Debug, PartialEq, Eq)]
pub struct Message {
    pub bpm: i64,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MessageVisitor;

        impl<'de> Visitor<'de> for MessageVisitor {
            type Value = Message;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with an integer BPM field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Message, A::Error> {
                let mut bpm = 0;
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("BPM") {
                        if let Some(v) = map.next_value::<Option<i64>>()? {
                            bpm = v;
                        }
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(Message { bpm })
            }
        }

        deserializer.deserialize_map(MessageVisitor)
    }
}

/// Serialize with a single-space indent.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn respond_with_json<T: Serialize + ?Sized>(
    status: StatusCode,
    payload: &T,
) -> Result<Response, ApiError> {
    let body = to_pretty_json(payload)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// GET /
pub async fn get_chain(State(state): State<AppState>) -> Result<Response, ApiError> {
    let blocks = state.snapshot()?;
    respond_with_json(StatusCode::OK, &blocks)
}

/// POST /
pub async fn write_block(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let msg: Message = match serde_json::from_slice(&body) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request body");
            return Err(ApiError::MalformedBody(body));
        }
    };

    let blocks: Vec<Block> = {
        let mut ledger = state.lock()?;
        match ledger.submit(msg.bpm) {
            Ok(block) => {
                tracing::info!(index = block.index, bpm = block.bpm, hash = %block.hash, "block appended");
            }
            Err(e) => {
                tracing::warn!(error = %e, bpm = msg.bpm, "submission rejected");
                return Err(e.into());
            }
        }
        ledger.blocks().to_vec()
    };

    respond_with_json(StatusCode::CREATED, &blocks)
}

/// GET /validate — walk every link from genesis; returns { ok, errors[] }
#[derive(Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub errors: Vec<String>,
}
pub async fn validate_chain(State(state): State<AppState>) -> Result<Json<ValidateResp>, ApiError> {
    let errors = match state.lock()?.validate() {
        Ok(()) => vec![],
        Err(e) => vec![e.to_string()],
    };
    Ok(Json(ValidateResp {
        ok: errors.is_empty(),
        errors,
    }))
}

/// GET /health
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /version
#[derive(Serialize)]
pub struct Version {
    pub version: &'static str,
}
pub async fn version() -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
    })
}
