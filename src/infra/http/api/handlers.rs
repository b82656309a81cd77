use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;

use crate::application::subscriptions::SubscriptionError;
use crate::domain::subscriptions::SubscriptionDraft;

use super::error::{ApiError, codes};
use super::models::{PublicKeyResponse, SuccessResponse, UnsubscribeRequest};
use super::state::ApiState;

pub async fn subscribe(
    State(state): State<ApiState>,
    payload: Result<Json<SubscriptionDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = payload.map_err(json_rejection)?;

    state
        .subscriptions
        .subscribe(draft)
        .await
        .map_err(subscription_error)?;

    Ok(Json(SuccessResponse::ok()))
}

pub async fn unsubscribe(
    State(state): State<ApiState>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let endpoint = request.endpoint.unwrap_or_default();

    state
        .subscriptions
        .unsubscribe(&endpoint)
        .await
        .map_err(subscription_error)?;

    Ok(Json(SuccessResponse::ok()))
}

pub async fn public_key(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let key = state
        .vapid_public_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured("Push notifications not configured"))?;

    Ok(Json(PublicKeyResponse {
        public_key: key.to_string(),
    }))
}

pub(crate) fn json_rejection(err: JsonRejection) -> ApiError {
    ApiError::bad_request("Invalid JSON body", Some(err.body_text()))
}

fn subscription_error(err: SubscriptionError) -> ApiError {
    match err {
        SubscriptionError::Invalid(err) => {
            ApiError::bad_request("Invalid subscription", Some(err.to_string()))
        }
        SubscriptionError::AlreadySubscribed => ApiError::conflict("Subscription already exists"),
        SubscriptionError::NotFound => ApiError::not_found("Subscription not found"),
        SubscriptionError::Repo(err) => {
            ApiError::internal(codes::REPO, "Failed to save subscription", err.to_string())
        }
    }
}
