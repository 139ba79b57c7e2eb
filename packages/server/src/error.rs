use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::HackathonStatus;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `INVALID_SCHEDULE`, `TOKEN_MISSING`, `TOKEN_INVALID`,
    /// `INVALID_CREDENTIALS`, `FORBIDDEN`, `NOT_FOUND`, `CONFLICT`,
    /// `USERNAME_TAKEN`, `INVALID_TRANSITION`, `REGISTRATION_CLOSED`,
    /// `SUBMISSION_WINDOW_NOT_OPEN`, `SUBMISSION_LOCKED`, `NOT_REGISTERED`,
    /// `ALREADY_FINAL`, `DUPLICATE_FINAL_SUBMISSION`, `INTERNAL_ERROR`.
    #[schema(example = "INVALID_SCHEDULE")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Registration end must be after registration start")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The five-timestamp ordering of a hackathon schedule is violated.
    InvalidSchedule(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    /// Actor lacks ownership or role. Carries no detail so it cannot leak
    /// existence information.
    Forbidden,
    NotFound(String),
    Conflict(String),
    UsernameTaken,
    /// Status change is not in the allow-list for the current status.
    InvalidTransition {
        from: HackathonStatus,
        to: HackathonStatus,
    },
    RegistrationClosed,
    SubmissionWindowNotOpen,
    SubmissionLocked,
    NotRegistered,
    /// The target submission was already handed in as final.
    AlreadyFinal,
    /// Second final submission for the same submitter or team, caught by the
    /// data-layer uniqueness backstop.
    DuplicateFinalSubmission,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidSchedule(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_SCHEDULE",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "FORBIDDEN",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    message: "Username is already taken".into(),
                },
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_TRANSITION",
                    message: format!("Invalid status transition from {from} to {to}"),
                },
            ),
            AppError::RegistrationClosed => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "REGISTRATION_CLOSED",
                    message: "Registration is not open for this hackathon".into(),
                },
            ),
            AppError::SubmissionWindowNotOpen => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SUBMISSION_WINDOW_NOT_OPEN",
                    message: "The submission window has not opened yet".into(),
                },
            ),
            AppError::SubmissionLocked => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SUBMISSION_LOCKED",
                    message: "The submission deadline has passed".into(),
                },
            ),
            AppError::NotRegistered => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "NOT_REGISTERED",
                    message: "You are not registered for this hackathon".into(),
                },
            ),
            AppError::AlreadyFinal => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "ALREADY_FINAL",
                    message: "This submission was already handed in as final".into(),
                },
            ),
            AppError::DuplicateFinalSubmission => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_FINAL_SUBMISSION",
                    message: "A final submission already exists for this hackathon".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
