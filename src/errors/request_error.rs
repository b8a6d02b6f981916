use super::LfsError;
use crate::managers::response::Response;
use std::error::Error;
use std::fmt;

/// When the transport call succeeded but post-processing failed, the received
/// response is kept so callers can still inspect status and headers.
#[derive(Debug)]
pub struct RequestError {
    error: LfsError,
    response: Option<Response>,
}

impl RequestError {
    pub fn new(error: LfsError) -> Self {
        Self {
            error,
            response: None,
        }
    }

    pub fn with_response(error: LfsError, response: Response) -> Self {
        Self {
            error,
            response: Some(response),
        }
    }

    pub fn error(&self) -> &LfsError {
        &self.error
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn into_parts(self) -> (LfsError, Option<Response>) {
        (self.error, self.response)
    }
}

impl From<LfsError> for RequestError {
    fn from(error: LfsError) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
