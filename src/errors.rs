use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum FinituraError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    Serialization(String),
    AnalyticsQuery(String),
    MediaStorage(String),
    Notification(String),
    PasswordHash(String),
}

impl FinituraError {
    pub fn code(&self) -> &'static str {
        match self {
            FinituraError::DatabaseConfig(_) => "E001",
            FinituraError::DatabaseConnection(_) => "E002",
            FinituraError::DatabaseOperation(_) => "E003",
            FinituraError::Validation(_) => "E004",
            FinituraError::NotFound(_) => "E005",
            FinituraError::Unauthorized(_) => "E006",
            FinituraError::Conflict(_) => "E007",
            FinituraError::Serialization(_) => "E008",
            FinituraError::AnalyticsQuery(_) => "E009",
            FinituraError::MediaStorage(_) => "E010",
            FinituraError::Notification(_) => "E011",
            FinituraError::PasswordHash(_) => "E012",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            FinituraError::DatabaseConfig(_) => "Database Configuration Error",
            FinituraError::DatabaseConnection(_) => "Database Connection Error",
            FinituraError::DatabaseOperation(_) => "Database Operation Error",
            FinituraError::Validation(_) => "Validation Error",
            FinituraError::NotFound(_) => "Resource Not Found",
            FinituraError::Unauthorized(_) => "Unauthorized",
            FinituraError::Conflict(_) => "Conflict",
            FinituraError::Serialization(_) => "Serialization Error",
            FinituraError::AnalyticsQuery(_) => "Analytics Query Error",
            FinituraError::MediaStorage(_) => "Media Storage Error",
            FinituraError::Notification(_) => "Notification Error",
            FinituraError::PasswordHash(_) => "Password Hash Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FinituraError::DatabaseConfig(msg)
            | FinituraError::DatabaseConnection(msg)
            | FinituraError::DatabaseOperation(msg)
            | FinituraError::Validation(msg)
            | FinituraError::NotFound(msg)
            | FinituraError::Unauthorized(msg)
            | FinituraError::Conflict(msg)
            | FinituraError::Serialization(msg)
            | FinituraError::AnalyticsQuery(msg)
            | FinituraError::MediaStorage(msg)
            | FinituraError::Notification(msg)
            | FinituraError::PasswordHash(msg) => msg,
        }
    }

    /// HTTP status the API layer maps this error to
    pub fn http_status(&self) -> StatusCode {
        match self {
            FinituraError::Validation(_) => StatusCode::BAD_REQUEST,
            FinituraError::NotFound(_) => StatusCode::NOT_FOUND,
            FinituraError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FinituraError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for FinituraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for FinituraError {}

impl FinituraError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        FinituraError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        FinituraError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        FinituraError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        FinituraError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        FinituraError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        FinituraError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        FinituraError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        FinituraError::Serialization(msg.into())
    }

    pub fn analytics_query<T: Into<String>>(msg: T) -> Self {
        FinituraError::AnalyticsQuery(msg.into())
    }

    pub fn media_storage<T: Into<String>>(msg: T) -> Self {
        FinituraError::MediaStorage(msg.into())
    }

    pub fn notification<T: Into<String>>(msg: T) -> Self {
        FinituraError::Notification(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        FinituraError::PasswordHash(msg.into())
    }
}

impl From<sea_orm::DbErr> for FinituraError {
    fn from(err: sea_orm::DbErr) -> Self {
        FinituraError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for FinituraError {
    fn from(err: std::io::Error) -> Self {
        FinituraError::DatabaseConfig(err.to_string())
    }
}

impl From<serde_json::Error> for FinituraError {
    fn from(err: serde_json::Error) -> Self {
        FinituraError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FinituraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(FinituraError::validation("x").code(), "E004");
        assert_eq!(FinituraError::not_found("x").code(), "E005");
        assert_eq!(FinituraError::analytics_query("x").code(), "E009");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            FinituraError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FinituraError::unauthorized("no").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            FinituraError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FinituraError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_format() {
        let err = FinituraError::validation("price must be positive");
        assert_eq!(err.to_string(), "Validation Error: price must be positive");
    }

    #[test]
    fn test_from_db_err() {
        let err: FinituraError = sea_orm::DbErr::Custom("broken".to_string()).into();
        assert!(matches!(err, FinituraError::DatabaseOperation(_)));
    }
}
