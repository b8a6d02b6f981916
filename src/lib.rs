//! Per-host HTTP transport manager for a Git LFS client.
//!
//! [`Client`] builds one `reqwest` client per destination host the first time
//! that host is requested, configured from two layered environments (process
//! and git config): timeouts, idle pool size, proxy selection and TLS
//! verification policy. Every response then goes through the same decoding
//! contract; see [`decode_response`].

pub mod constants;
pub mod errors;
pub mod managers;
pub mod services;
pub mod utils;

pub use errors::{ErrorClass, LfsError, RequestError, ServerError};
pub use managers::client::{host_key, Client};
pub use managers::response::{decode_response, is_json_media_type, Response};
pub use services::env::{Env, MapEnv};
