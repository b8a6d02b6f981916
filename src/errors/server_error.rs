use super::{ErrorClass, LfsError};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerError {
    pub message: String,
    pub documentation_url: String,
    pub request_id: String,
}

impl ServerError {
    pub fn render(&self) -> String {
        let mut out = self.message.clone();
        if !self.documentation_url.is_empty() {
            out.push_str("\nDocs: ");
            out.push_str(&self.documentation_url);
        }
        if !self.request_id.is_empty() {
            out.push_str("\nRequest ID: ");
            out.push_str(&self.request_id);
        }
        out
    }

    pub fn into_error(self, status: u16, url: &Url) -> LfsError {
        let message = if self.message.is_empty() {
            default_status_message(status, url)
        } else {
            self.render()
        };
        LfsError::Http {
            status,
            class: classify_status(status),
            message,
        }
    }
}

pub fn classify_status(status: u16) -> ErrorClass {
    match status {
        401 => ErrorClass::Auth,
        501 | 507 | 509 => ErrorClass::Other,
        s if s > 499 => ErrorClass::Fatal,
        _ => ErrorClass::Other,
    }
}

pub fn default_status_message(status: u16, url: &Url) -> String {
    match status {
        400 => format!("Client error: {}", url),
        401 | 403 => format!(
            "Authorization error: {}\nCheck that you have proper access to the repository",
            url
        ),
        404 => format!(
            "Repository or object not found: {}\n\
             Check that it exists and that you have proper access to it",
            url
        ),
        429 => format!("Rate limit exceeded: {}", url),
        500 => format!("Server error: {}", url),
        501 => format!("Not Implemented: {}", url),
        507 => format!("Insufficient server storage: {}", url),
        509 => format!("Bandwidth limit exceeded: {}", url),
        s if s < 500 => format!("Client error {} from HTTP {}", url, s),
        s => format!("Server error {} from HTTP {}", url, s),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_status, default_status_message, ServerError};
    use crate::errors::ErrorClass;
    use url::Url;

    fn url() -> Url {
        Url::parse("https://lfs.example/objects/batch").unwrap()
    }

    #[test]
    fn classify_status_splits_auth_and_fatal() {
        assert_eq!(classify_status(401), ErrorClass::Auth);
        assert_eq!(classify_status(403), ErrorClass::Other);
        assert_eq!(classify_status(500), ErrorClass::Fatal);
        assert_eq!(classify_status(503), ErrorClass::Fatal);
        assert_eq!(classify_status(501), ErrorClass::Other);
        assert_eq!(classify_status(507), ErrorClass::Other);
        assert_eq!(classify_status(509), ErrorClass::Other);
    }

    #[test]
    fn default_messages_cover_unlisted_codes() {
        assert_eq!(
            default_status_message(418, &url()),
            "Client error https://lfs.example/objects/batch from HTTP 418"
        );
        assert_eq!(
            default_status_message(502, &url()),
            "Server error https://lfs.example/objects/batch from HTTP 502"
        );
        assert!(default_status_message(404, &url()).starts_with("Repository or object not found"));
    }

    #[test]
    fn server_message_wins_over_default() {
        let payload = ServerError {
            message: "quota exceeded".to_string(),
            documentation_url: "https://docs.example".to_string(),
            request_id: "abc".to_string(),
        };
        let err = payload.into_error(422, &url());
        assert_eq!(
            err.to_string(),
            "quota exceeded\nDocs: https://docs.example\nRequest ID: abc"
        );
    }

    #[test]
    fn empty_payload_uses_default_message() {
        let err = ServerError::default().into_error(500, &url());
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Server error: https://lfs.example/objects/batch");
    }
}
