// libs/payment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use notification_cell::NotificationOutbox;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{PaymentEvent, ReconcileError, ReconcileOutcome, CHARGE_SUCCESS, SIGNATURE_HEADER};
use crate::services::reconcile::ReconciliationService;
use crate::signature::verify_signature;

/// Payment provider webhook. Authenticated by the HMAC signature over the
/// raw body, not by a bearer token, so the handler consumes `Bytes` and
/// parses only after verification.
///
/// A 2xx acknowledges the delivery; the provider retries on anything else,
/// so only store failures return 5xx.
#[axum::debug_handler]
pub async fn payment_webhook(
    State(state): State<Arc<AppConfig>>,
    Extension(outbox): Extension<NotificationOutbox>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if signature.is_empty() {
        warn!("Payment webhook rejected: missing signature header");
        return Err(AppError::BadRequest("Missing signature".to_string()));
    }

    if !verify_signature(&state.payment_webhook_secret, &body, signature) {
        // Security event: reject outright, trust nothing in the payload.
        warn!("Payment webhook rejected: bad signature");
        return Err(AppError::BadRequest("Bad signature".to_string()));
    }

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {}", e)))?;

    if event.event != CHARGE_SUCCESS {
        return Ok(Json(json!({ "received": true, "outcome": "ignored_event" })));
    }

    let service = ReconciliationService::new(&state);
    let outcome = service
        .reconcile(&event, &outbox)
        .await
        .map_err(|e| match e {
            ReconcileError::MalformedPayload(msg) => AppError::BadRequest(msg),
            ReconcileError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    let mut response = json!({
        "received": true,
        "outcome": outcome.as_str(),
    });

    if let ReconcileOutcome::Reconciled {
        unresolved_pending_siblings,
        amount_mismatch,
        ..
    } = &outcome
    {
        if !unresolved_pending_siblings.is_empty() {
            response["unresolved_pending_siblings"] = json!(unresolved_pending_siblings);
        }
        if *amount_mismatch {
            response["amount_mismatch"] = json!(true);
        }
    }

    Ok(Json(response))
}
