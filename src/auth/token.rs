use crate::db::models::{App, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Claims carried by an issued session token.
///
/// The token is stateless and self-describing: whoever verifies it needs
/// only the issuing app's secret, never a server-side lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued for.
    pub uid: i64,
    pub email: String,
    /// Id of the application the session is scoped to.
    pub app_id: i64,
    /// Issuance time, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds: issuance + the configured TTL.
    pub exp: i64,
}

/// Signs a session token binding `user` to `app`, HS256 with the app's own
/// secret. An unresolved or malformed secret must fail here; a token is
/// never issued unsigned.
pub fn issue(user: &User, app: &App, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        uid: user.id,
        email: user.email.clone(),
        app_id: app.id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn test_user() -> User {
        User {
            id: 7,
            email: "someone@example.com".to_string(),
            pass_hash: "$2b$12$fakehash".to_string(),
            is_admin: false,
        }
    }

    fn test_app(secret: &str) -> App {
        App {
            id: 3,
            name: "test-app".to_string(),
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_claims_round_trip() {
        let user = test_user();
        let app = test_app("test-secret");
        let issued_at = Utc::now();

        let token = issue(&user, &app, Duration::seconds(3600)).unwrap();
        assert!(!token.is_empty());

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap()
        .claims;

        assert_eq!(decoded.uid, 7);
        assert_eq!(decoded.email, "someone@example.com");
        assert_eq!(decoded.app_id, 3);
        assert!((decoded.iat - issued_at.timestamp()).abs() <= 1);
        assert!((decoded.exp - (issued_at.timestamp() + 3600)).abs() <= 1);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue(&test_user(), &test_app("right-secret"), Duration::seconds(3600)).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"wrong-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}
