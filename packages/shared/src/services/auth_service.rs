use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::models::matchmaking::responses::TokenClaims;
use crate::services::errors::auth_service_errors::AuthServiceError;

/// Verifies bearer tokens issued by the external auth provider and extracts
/// the caller identity. Login and token issuance live outside this codebase.
pub struct TokenVerifier {
    jwt_secret: String,
}

impl TokenVerifier {
    pub fn new() -> Self {
        let jwt_secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET environment variable must be set");
        TokenVerifier { jwt_secret }
    }

    pub fn with_secret(jwt_secret: String) -> Self {
        TokenVerifier { jwt_secret }
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    pub fn extract_user_id(&self, token: &str) -> Result<String, AuthServiceError> {
        let claims = self.verify_token(token)?;
        Ok(claims.sub)
    }
}
