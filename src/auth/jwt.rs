use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Token expired")]
    Expired,
    #[error("Token verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    /// Identifiant unique: deux tokens émis dans la même seconde restent distincts
    pub jti: Uuid,
}

/// Signe et vérifie un type de token (access ou refresh) avec son propre
/// secret et sa propre durée de vie.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    time_to_live: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, time_to_live: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            time_to_live,
        }
    }

    /// Génère un token avec la durée configurée
    pub fn generate_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.generate_token_with_ttl(user_id, self.time_to_live)
    }

    pub fn generate_token_with_ttl(
        &self,
        user_id: Uuid,
        time_to_live: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id,
            exp: (now + time_to_live).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::GenerationFailed)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::VerificationFailed(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Duration, JwtError, JwtManager, Uuid};

    fn make_jwt_manager() -> JwtManager {
        JwtManager::new("my_secret_key_for_tests", Duration::hours(1))
    }

    #[test]
    fn generate_and_verify_succeeds_with_valid_token() {
        let jwt = make_jwt_manager();
        let user_id = Uuid::new_v4();

        let token = jwt.generate_token(user_id).expect("Token generation failed");
        let claims = jwt.verify_token(&token).expect("Token verification failed");

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat, "Expiry should be after issued time");
    }

    #[test]
    fn generate_token_returns_jwt_with_correct_format() {
        let jwt = make_jwt_manager();

        let token = jwt
            .generate_token(Uuid::new_v4())
            .expect("Token generation should succeed");

        assert_eq!(token.split('.').count(), 3, "header.payload.signature");
    }

    #[test]
    fn tokens_issued_back_to_back_differ() {
        let jwt = make_jwt_manager();
        let user_id = Uuid::new_v4();

        let first = jwt.generate_token(user_id).unwrap();
        let second = jwt.generate_token(user_id).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn verify_token_fails_with_invalid_input() {
        let jwt = make_jwt_manager();

        let result = jwt.verify_token("invalid.token.here");

        assert!(matches!(result, Err(JwtError::VerificationFailed(_))));
    }

    #[test]
    fn verify_token_rejects_token_signed_with_other_secret() {
        let issuer = JwtManager::new("some_other_secret", Duration::hours(1));
        let token = issuer.generate_token(Uuid::new_v4()).unwrap();

        let result = make_jwt_manager().verify_token(&token);

        assert!(matches!(result, Err(JwtError::VerificationFailed(_))));
    }

    #[test]
    fn verify_token_reports_expired_tokens() {
        let jwt = make_jwt_manager();
        let token = jwt
            .generate_token_with_ttl(Uuid::new_v4(), Duration::minutes(-5))
            .unwrap();

        assert!(matches!(jwt.verify_token(&token), Err(JwtError::Expired)));
    }
}
