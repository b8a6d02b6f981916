pub mod credentials;
pub mod endpoint;
pub mod env;
pub mod logger;
pub mod netrc;
pub mod proxy;
pub mod settings;
pub mod tls;
