//! Classified errors for remote search fetches.

/// Error taxonomy for a single page fetch.
///
/// All fetch errors are terminal for that attempt: the controller never
/// retries on its own, it surfaces one user-visible message and leaves the
/// accumulated list untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Connectivity or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Server-side throttling; the message comes from the server verbatim
    #[error("{0}")]
    RateLimited(String),

    /// Non-2xx status without a decodable error body
    #[error("the server returned an invalid response")]
    InvalidResponse,

    /// 2xx status with a payload that failed to decode
    #[error("could not decode the server response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Message suitable for direct display to the user.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Network(_) => {
                "Connection failed. Check your network and try again.".to_string()
            }
            SearchError::RateLimited(message) => message.clone(),
            SearchError::InvalidResponse => "The server returned an invalid response.".to_string(),
            SearchError::Decode(_) => "Could not process the server response.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_is_verbatim() {
        let error = SearchError::RateLimited("API rate limit exceeded".to_string());
        assert_eq!(error.user_message(), "API rate limit exceeded");
        assert_eq!(error.to_string(), "API rate limit exceeded");
    }

    #[test]
    fn test_generic_messages_hide_details() {
        let error = SearchError::Decode("missing field `items`".to_string());
        assert!(!error.user_message().contains("items"));

        let error = SearchError::Network("dns failure".to_string());
        assert!(error.user_message().contains("network"));
    }
}
