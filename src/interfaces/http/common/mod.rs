//! Types shared by all HTTP modules

pub mod error;
pub mod response;
pub mod validated_json;

pub use error::{api_error, status_for, ApiError, ApiResult};
pub use response::{ApiResponse, EmailQuery, EmptyData};
pub use validated_json::ValidatedJson;
