//! Contact form route handlers

use crate::error::{not_found_error, validation_error, ApiResult, AppError};
use crate::models::{
    ClientInfo, ContactMessage, ContactSubmissionRequest, MessageStatus, NewContactMessage,
    SubmissionCreated, SuccessResponse, UpdateStatusRequest,
};
use crate::state::SharedState;
use crate::store::{UpdateOutcome, LIST_LIMIT};
use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    Json,
};
use std::convert::Infallible;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

/// Client IP headers, in order of preference
const CLIENT_IP_HEADERS: [&str; 2] = ["cf-connecting-ip", "x-forwarded-for"];

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = CLIENT_IP_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|value| value.to_str().ok())
            // X-Forwarded-For carries a proxy chain; the client is first
            .filter_map(|value| value.split(',').next())
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or("unknown")
            .to_string();

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            ip_address,
            user_agent,
        }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo::from_headers(&parts.headers))
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| validation_error(format!("Invalid JSON body: {}", rejection.body_text())))
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// POST /api/contact
///
/// Validates and stores a contact form submission.
pub async fn submit_contact(
    State(state): State<SharedState>,
    client: ClientInfo,
    payload: Result<Json<ContactSubmissionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<SubmissionCreated>>)> {
    let request = json_body(payload)?;

    let missing = request.missing_fields();
    if !missing.is_empty() {
        debug!("Rejected submission, missing fields: {:?}", missing);
        return Err(validation_error("Missing required fields"));
    }

    let message = NewContactMessage::from_request(request, client);
    message
        .validate()
        .map_err(|e| validation_error(first_message(&e)))?;

    let id = state.store.insert(message).await?;
    info!("Stored contact message {}", id);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Contact form submitted successfully",
            SubmissionCreated { id },
        )),
    ))
}

/// GET /api/contact/messages
///
/// Most recent messages, newest first. No authentication is enforced here;
/// an upstream gateway is expected to guard this route.
pub async fn list_messages(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<Vec<ContactMessage>>>> {
    let messages = state.store.list_recent(LIST_LIMIT).await?;
    debug!("Listing {} contact messages", messages.len());

    Ok(Json(SuccessResponse::data_only(messages)))
}

/// PUT /api/contact/{id}
///
/// Changes the status of one message.
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse<()>>> {
    let request = json_body(payload)?;

    let raw = request
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| validation_error("Status is required"))?;
    let status: MessageStatus = raw.parse().map_err(|e| validation_error(format!("{}", e)))?;

    match state.store.update_status(&id, status).await? {
        UpdateOutcome::Updated => {
            info!("Message {} status set to {}", id, status);
            Ok(Json(SuccessResponse::message_only("Status updated successfully")))
        }
        UpdateOutcome::NotFound => Err(not_found_error("Message not found")),
        UpdateOutcome::Rejected { current } => Err(AppError::Conflict(format!(
            "Cannot change status from '{}' to '{}'",
            current, status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn client_info_prefers_cloudflare_header() {
        let info = ClientInfo::from_headers(&headers(&[
            ("x-forwarded-for", "198.51.100.1"),
            ("cf-connecting-ip", "203.0.113.9"),
            ("user-agent", "Mozilla/5.0"),
        ]));
        assert_eq!(info.ip_address, "203.0.113.9");
        assert_eq!(info.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn client_info_takes_first_forwarded_hop() {
        let info = ClientInfo::from_headers(&headers(&[(
            "x-forwarded-for",
            "198.51.100.1, 10.0.0.2, 10.0.0.3",
        )]));
        assert_eq!(info.ip_address, "198.51.100.1");
    }

    #[test]
    fn client_info_defaults() {
        let info = ClientInfo::from_headers(&HeaderMap::new());
        assert_eq!(info.ip_address, "unknown");
        assert_eq!(info.user_agent, "");
    }
}
