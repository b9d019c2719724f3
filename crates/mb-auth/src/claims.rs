use super::*;

/// JWT payload. Registered claims plus a custom `csrf` claim.
/// `jti` is present only on refresh tokens.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub csrf: String,
}

impl From<&Token> for Claims {
    fn from(token: &Token) -> Self {
        Self {
            jti: token.id().to_string(),
            iss: token.issuer().to_string(),
            sub: token.subject().to_string(),
            iat: token.issued(),
            nbf: token.issued(),
            exp: token.expires(),
            csrf: token.csrf().to_string(),
        }
    }
}

impl From<Claims> for Token {
    fn from(claims: Claims) -> Self {
        Token::from_parts(
            claims.jti,
            claims.iss,
            claims.sub,
            claims.iat,
            claims.exp,
            claims.csrf,
        )
    }
}
