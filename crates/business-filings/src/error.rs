use crate::config::ConfigError;
use crate::filings::{ConfigurationError, FilingServiceError, RegistryApiError};
use crate::telemetry::TelemetryError;
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
    Resources(ConfigurationError),
    Registry(RegistryApiError),
    Filing(FilingServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Resources(err) => write!(f, "filing resource error: {}", err),
            AppError::Registry(err) => write!(f, "registry error: {}", err),
            AppError::Filing(err) => write!(f, "filing error: {}", err),
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
            AppError::Resources(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Filing(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Resources(_) | AppError::Filing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Registry(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Resources(value)
    }
}

impl From<RegistryApiError> for AppError {
    fn from(value: RegistryApiError) -> Self {
        Self::Registry(value)
    }
}

impl From<FilingServiceError> for AppError {
    fn from(value: FilingServiceError) -> Self {
        Self::Filing(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filings::{EntityType, FilingType};

    #[test]
    fn resource_errors_map_to_unprocessable() {
        let error = AppError::from(ConfigurationError::MissingResource {
            filing_type: FilingType::Restoration,
            entity_type: EntityType::BenefitCompany,
        });
        assert!(error.to_string().starts_with("filing resource error"));
        assert_eq!(error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unconfigured_registry_maps_to_bad_gateway() {
        let error = AppError::from(RegistryApiError::NotConfigured);
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn io_errors_map_to_internal() {
        let error = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
