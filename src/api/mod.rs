//! Public HTTP surface of the gateway. Requests are forwarded to the
//! credential backend through [`AuthClient`](crate::rpc::AuthClient) and the
//! outcome is rendered as `{success, message?, data?}`.

mod error;
mod handler;
mod router;

pub use error::{ApiErrorCode, recover_error};
pub use handler::ApiResponse;
pub use router::routes;
