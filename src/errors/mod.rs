mod lfs_error;
mod request_error;
mod server_error;

pub use lfs_error::{ErrorClass, LfsError};
pub use request_error::RequestError;
pub use server_error::{classify_status, default_status_message, ServerError};
