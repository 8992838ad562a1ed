use serde::{Deserialize, Serialize};

/// JWT claims identifying one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    pub user_id: String,
    pub username: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// An authenticated user, as seen by handlers and connections
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Response structure for the identity endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_claims_serialization() {
        let claims = IdentityClaims {
            user_id: "user-1".to_string(),
            username: "happy-cat".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"user_id\":\"user-1\""));

        let deserialized: IdentityClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);

        let identity = Identity::from(deserialized);
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.username, "happy-cat");
    }
}
