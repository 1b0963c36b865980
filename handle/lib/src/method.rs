//! HTTP methods used against the Handle API.

use strum::Display;

/// HTTP methods the client issues.
///
/// `Post` and `Put` are used by the session handshake; `Get`, `Put` and
/// `Delete` by resource operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - Read a resource.
    Get,
    /// HTTP POST - Open a session.
    Post,
    /// HTTP PUT - Create or replace a resource, or complete a handshake.
    Put,
    /// HTTP DELETE - Remove a resource or close a session.
    Delete,
}

impl RestMethod {
    /// Returns `true` if requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Put)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_has_body() {
        assert!(RestMethod::Put.has_body());
        assert!(!RestMethod::Get.has_body());
        assert!(!RestMethod::Post.has_body());
        assert!(!RestMethod::Delete.has_body());
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Post.to_reqwest(), reqwest::Method::POST);
        assert_eq!(RestMethod::Delete.to_reqwest(), reqwest::Method::DELETE);
    }
}
