//! Core domain types for the authentication bridge.
//!
//! These are the values exchanged with the request queue: pending credential
//! requests flowing in, authentication results flowing back out. All of them
//! live for a single request/response cycle.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A pending credential-verification request fetched from the gateway.
///
/// The password is held as a [`SecretString`]: it is used once for the bind
/// attempt, never serialized, and its `Debug` output is redacted.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRequest {
    /// Identifier of the request, unique within a fetched batch.
    pub request_id: String,
    /// Login name to verify.
    pub username: String,
    /// Password to verify; transient, never logged.
    pub password: SecretString,
}

/// The subset of directory attributes exposed to the requester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name (the directory's `sAMAccountName`).
    pub username: String,
    /// Primary email address (the directory's `mail`), empty when absent.
    pub email: String,
    /// Group names, populated only when membership was explicitly resolved.
    pub groups: Vec<String>,
}

/// The outcome reported back to the gateway for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Identifier of the request being answered.
    pub request_id: String,
    /// Whether the credentials were accepted by the directory.
    pub success: bool,
    /// Profile of the authenticated user; zero-valued when `success` is false.
    pub user_data: UserProfile,
}

impl AuthResult {
    /// Builds a successful result carrying the user's profile.
    #[must_use]
    pub fn accepted(request_id: impl Into<String>, user_data: UserProfile) -> Self {
        Self {
            request_id: request_id.into(),
            success: true,
            user_data,
        }
    }

    /// Builds a failed result with a zero-valued profile.
    #[must_use]
    pub fn rejected(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            success: false,
            user_data: UserProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn credential_request_deserializes_from_gateway_json() {
        let json = r#"{"request_id":"r1","username":"alice","password":"good"}"#;
        let request: CredentialRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.request_id, "r1");
        assert_eq!(request.username, "alice");
        assert_eq!(request.password.expose_secret(), "good");
    }

    #[test]
    fn credential_request_debug_redacts_password() {
        let request: CredentialRequest = serde_json::from_str(
            r#"{"request_id":"r1","username":"alice","password":"hunter2"}"#,
        )
        .unwrap();
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn auth_result_serializes_with_wire_field_names() {
        let result = AuthResult::accepted(
            "r1",
            UserProfile {
                username: "alice".to_string(),
                email: "alice@co".to_string(),
                groups: Vec::new(),
            },
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "request_id": "r1",
                "success": true,
                "user_data": {
                    "username": "alice",
                    "email": "alice@co",
                    "groups": []
                }
            })
        );
    }

    #[test]
    fn auth_result_round_trips() {
        let result = AuthResult::accepted(
            "r42",
            UserProfile {
                username: "jdoe".to_string(),
                email: "jdoe@example.com".to_string(),
                groups: vec!["Operators".to_string(), "Staff".to_string()],
            },
        );

        let json = serde_json::to_string(&result).unwrap();
        let decoded: AuthResult = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn rejected_result_has_zero_valued_profile() {
        let result = AuthResult::rejected("r9");
        assert!(!result.success);
        assert_eq!(result.user_data, UserProfile::default());
        assert_eq!(result.user_data.username, "");
        assert!(result.user_data.groups.is_empty());
    }
}
