//! The bearer credential attached to outbound requests.
//!
//! The token is read from local storage once and then passed around as a
//! value; the transport never looks it up by itself.

use unisync_store::Database;

use crate::error::ClientError;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Blank tokens are treated as no token at all.
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            Self::anonymous()
        } else {
            Self {
                token: Some(token.trim().to_string()),
            }
        }
    }

    pub fn from_storage(db: &Database) -> Result<Self, ClientError> {
        Ok(match db.token()? {
            Some(token) => Self::bearer(token),
            None => Self::anonymous(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_anonymous() {
        assert!(!Credentials::bearer("  ").is_authenticated());
        assert_eq!(Credentials::bearer(" abc\n").token(), Some("abc"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let dbg = format!("{:?}", Credentials::bearer("secret"));
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn test_from_storage() {
        let db = Database::open_in_memory().unwrap();
        assert!(!Credentials::from_storage(&db).unwrap().is_authenticated());
        db.set_token("t").unwrap();
        assert_eq!(Credentials::from_storage(&db).unwrap().token(), Some("t"));
    }
}
