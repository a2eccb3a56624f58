use crate::state::WebhookState;

use dtw_mutator::admission::AdmissionReview;

use axum::extract::State;
use axum::response::Json;
use serde_json::Value;
use tracing::error;

/// Mutate a Pod or Deployment so it carries the configured toleration.
///
/// The object stays undecoded here; the reviewer picks its type from the request resource.
pub async fn apply_dedicated_toleration(
    State(state): State<WebhookState>,
    Json(review): Json<AdmissionReview<Value>>,
) -> Json<AdmissionReview<()>> {
    let response = match review.request.as_ref() {
        Some(request) => state.reviewer.review(request),
        None => {
            error!("Missing request in admission review");
            state.reviewer.failed(
                "unknown".to_string(),
                "Invalid admission review: missing request".to_string(),
            )
        }
    };
    Json(review.response(response))
}
