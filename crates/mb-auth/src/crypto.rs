use super::*;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;

/// HS256 token codec bound to one shared secret.
pub struct Crypto {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Crypto {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
    pub fn encode(&self, token: &Token) -> Result<String, TokenError> {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &Claims::from(token),
            &self.encoding,
        )
        .map_err(TokenError::Signing)
    }
    /// Verifies algorithm, signature and validity window, then rebuilds the token.
    pub fn decode(&self, signed: &str) -> Result<Token, TokenError> {
        jsonwebtoken::decode::<Claims>(signed, &self.decoding, &self.validation)
            .map(|data| Token::from(data.claims))
            .map_err(Self::classify)
    }
    /// Fresh CSRF correlation value shared by both tokens of a grant.
    pub fn csrf() -> String {
        use rand::Rng;
        let ref mut bytes = [0u8; 32];
        rand::rng().fill(bytes);
        hex::encode(bytes)
    }
    /// Everything a caller could have caused collapses into one kind.
    fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
        match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Invalid,
            _ => TokenError::Internal(e),
        }
    }
}
