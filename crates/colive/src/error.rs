use crate::config::ConfigError;
use crate::pricing::RateSheetError;
use crate::storage::RepositoryError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ApplicationServiceError;
use crate::workflows::onboarding::OnboardingError;
use crate::workflows::payments::PaymentError;
use crate::workflows::requests::RequestError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    RateSheet(RateSheetError),
    Repository(RepositoryError),
    Application(ApplicationServiceError),
    Onboarding(OnboardingError),
    Payment(PaymentError),
    Request(RequestError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::RateSheet(err) => write!(f, "rate sheet error: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
            AppError::Application(err) => write!(f, "application error: {}", err),
            AppError::Onboarding(err) => write!(f, "onboarding error: {}", err),
            AppError::Payment(err) => write!(f, "payment error: {}", err),
            AppError::Request(err) => write!(f, "request error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::RateSheet(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::Onboarding(err) => Some(err),
            AppError::Payment(err) => Some(err),
            AppError::Request(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::RateSheet(_) => StatusCode::BAD_REQUEST,
            AppError::Application(_)
            | AppError::Onboarding(_)
            | AppError::Payment(_)
            | AppError::Request(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RateSheetError> for AppError {
    fn from(value: RateSheetError) -> Self {
        Self::RateSheet(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}

impl From<OnboardingError> for AppError {
    fn from(value: OnboardingError) -> Self {
        Self::Onboarding(value)
    }
}

impl From<PaymentError> for AppError {
    fn from(value: PaymentError) -> Self {
        Self::Payment(value)
    }
}

impl From<RequestError> for AppError {
    fn from(value: RequestError) -> Self {
        Self::Request(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_sheet_errors_are_client_errors() {
        let error = AppError::from(RateSheetError::UnknownChapter("Jeju".to_string()));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_errors_are_server_errors() {
        let error = AppError::from(ConfigError::InvalidPort);
        assert!(error.to_string().starts_with("configuration error"));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn workflow_errors_keep_their_message() {
        let error = AppError::from(PaymentError::MissingTransactionId);
        assert_eq!(error.to_string(), "payment error: a transaction id is required");
        assert_eq!(error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
