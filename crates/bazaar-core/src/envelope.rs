//! Uniform JSON response wrapper.
//!
//! Every body the API returns has the shape
//! `{ "success": bool, "message"?: string, "data"?: any, "error"?: string }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Response body shared by success and failure paths.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Success without a payload, e.g. a status change acknowledgement.
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }
}

/// A status code paired with an enveloped body. Returned by handlers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with data.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::success(data, message),
        }
    }

    /// 201 with the created resource.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope::success(data, message),
        }
    }
}

impl ApiResponse<()> {
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::acknowledged(message),
        }
    }

    pub fn failure(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope::failure(error),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
