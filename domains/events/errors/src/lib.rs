use common_errors::AppError;
use events_filters::FilterError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Database error: {0}")]
    Database(#[from] sql_connection::PgError),
    #[error("Connection error: {0}")]
    Connection(#[from] sql_connection::PoolError),
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("Cache error: {0}")]
    Cache(#[from] redis_connection::CacheError),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type EventResult<T> = Result<T, EventError>;

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Filter(FilterError::RequiredFields(fields)) => {
                AppError::required_fields(&fields)
            }
            EventError::Filter(FilterError::InvalidValue { field, value }) => {
                AppError::invalid_query_params(&format!("{field}: {value}"))
            }
            EventError::InvalidParameter(details) => {
                AppError::invalid_query_params(&details)
            }
            other => {
                error!("Event query failed: {}", other);
                AppError::internal_server_error(&other.to_string())
            }
        }
    }
}
