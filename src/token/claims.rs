use serde::{Deserialize, Serialize};

/// Declared intended use of a token.
///
/// Purposes are checked by consumers, so a leaked password-reset link can
/// never be replayed as an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    /// Bearer token presented on authenticated requests.
    Access,
    /// Single-purpose token mailed for email confirmation.
    EmailConfirm,
    /// Single-purpose token mailed for password recovery.
    PasswordReset,
}

/// Claims embedded in a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the principal's canonical email.
    pub sub: String,
    /// Declared purpose.
    #[serde(rename = "pur")]
    pub purpose: Purpose,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Returns the token subject.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns true if this token may be presented as a bearer credential.
    pub fn is_access(&self) -> bool {
        self.purpose == Purpose::Access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_wire_names() {
        assert_eq!(
            serde_json::to_string(&Purpose::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&Purpose::EmailConfirm).unwrap(),
            "\"email-confirm\""
        );
        assert_eq!(
            serde_json::to_string(&Purpose::PasswordReset).unwrap(),
            "\"password-reset\""
        );
    }
}
