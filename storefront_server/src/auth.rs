//! Bearer-token issuance and validation.
//!
//! Tokens are compact JWS strings in the HS256 flavour: three base64url segments (no padding) carrying a static
//! header, a claims document and an HMAC-SHA256 signature over the first two segments. [`TokenIssuer`] is the only
//! component that touches the signing secret; everything else in the server deals in already-validated
//! [`TokenClaims`] or the [`AuthenticatedUser`] identity the middleware derives from them.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sfs_common::Secret;
use sha2::Sha256;
use storefront_engine::db_types::{Role, User};

use crate::errors::{AuthError, ServerError};

type HmacSha256 = Hmac<Sha256>;

/// Tokens are valid for 24 hours from the moment of issue.
pub const TOKEN_VALIDITY_SECS: i64 = 24 * 60 * 60;

const B64: base64::Config = base64::URL_SAFE_NO_PAD;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self { alg: "HS256".to_string(), typ: "JWT".to_string() }
    }
}

/// The claims document carried inside a bearer token. The subject is the account's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and validates bearer tokens with a shared HMAC-SHA256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Secret<String>,
}

impl TokenIssuer {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Issues a fresh token for `subject`, valid for [`TOKEN_VALIDITY_SECS`] from now.
    pub fn issue(&self, subject: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = TokenClaims { sub: subject.to_string(), iat: now, exp: now + TOKEN_VALIDITY_SECS };
        self.sign(&claims)
    }

    /// Signs an arbitrary claims document. Exposed within the crate so tests can mint stale tokens.
    pub(crate) fn sign(&self, claims: &TokenClaims) -> String {
        let header = serde_json::to_vec(&TokenHeader::default()).expect("static token header always serializes");
        let payload = serde_json::to_vec(claims).expect("token claims always serialize");
        let message = format!("{}.{}", base64::encode_config(header, B64), base64::encode_config(payload, B64));
        let mut mac = self.mac();
        mac.update(message.as_bytes());
        let signature = base64::encode_config(mac.finalize().into_bytes(), B64);
        format!("{message}.{signature}")
    }

    /// Checks the structure, signature and expiry of `token`, in that order, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, sig_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(AuthError::PoorlyFormattedToken("expected three dot-separated segments".to_string())),
        };
        let header_json = base64::decode_config(header_b64, B64)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("header segment: {e}")))?;
        let header = serde_json::from_slice::<TokenHeader>(&header_json)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("header segment: {e}")))?;
        if header.alg != "HS256" {
            return Err(AuthError::PoorlyFormattedToken(format!("unsupported algorithm {}", header.alg)));
        }
        let signature = base64::decode_config(sig_b64, B64)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("signature segment: {e}")))?;
        // The signature is checked before anything in the payload is trusted.
        let mut mac = self.mac();
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::BadSignature)?;
        let payload = base64::decode_config(payload_b64, B64)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("payload segment: {e}")))?;
        let claims = serde_json::from_slice::<TokenClaims>(&payload)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("payload segment: {e}")))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.reveal().as_bytes()).expect("HMAC accepts keys of any length")
    }
}

/// The resolved identity of the caller, attached to the request by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone(), role: user.role }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(identity.ok_or(ServerError::AuthenticationRequired))
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use sfs_common::Secret;

    use super::{TokenClaims, TokenIssuer, TOKEN_VALIDITY_SECS};
    use crate::errors::AuthError;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Secret::new("correct horse battery staple".to_string()))
    }

    #[test]
    fn issued_tokens_validate_and_carry_the_subject() {
        let issuer = issuer();
        let before = Utc::now().timestamp();
        let token = issuer.issue("alice");
        let claims = issuer.validate(&token).expect("fresh token must validate");
        assert_eq!(claims.sub, "alice");
        assert!(claims.iat >= before);
        assert_eq!(claims.exp, claims.iat + TOKEN_VALIDITY_SECS);
    }

    #[test]
    fn tokens_have_three_base64url_segments() {
        let token = issuer().issue("alice");
        let parts = token.split('.').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        for part in parts {
            base64::decode_config(part, base64::URL_SAFE_NO_PAD).expect("segment must be unpadded base64url");
        }
    }

    #[test]
    fn a_flipped_signature_bit_is_a_bad_signature() {
        let issuer = issuer();
        let token = issuer.issue("alice");
        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut raw = base64::decode_config(signature, super::B64).unwrap();
        raw[0] ^= 0x01;
        let tampered = format!("{message}.{}", base64::encode_config(&raw, super::B64));
        assert_eq!(issuer.validate(&tampered), Err(AuthError::BadSignature));
    }

    #[test]
    fn a_token_signed_with_another_secret_is_rejected() {
        let other = TokenIssuer::new(Secret::new("some other secret".to_string()));
        let token = other.issue("alice");
        assert_eq!(issuer().validate(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn an_expired_token_with_a_valid_signature_is_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = TokenClaims { sub: "alice".to_string(), iat: now - 2 * TOKEN_VALIDITY_SECS, exp: now - 1 };
        let token = issuer.sign(&claims);
        assert_eq!(issuer.validate(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn garbage_is_poorly_formatted_not_a_signature_failure() {
        let issuer = issuer();
        for garbage in ["", "not-a-token", "a.b", "a.b.c.d", "!!!.###.$$$"] {
            match issuer.validate(garbage) {
                Err(AuthError::PoorlyFormattedToken(_)) => {},
                other => panic!("{garbage:?} should be malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn tampering_with_the_payload_invalidates_the_signature() {
        let issuer = issuer();
        let token = issuer.issue("alice");
        let parts = token.split('.').collect::<Vec<_>>();
        let claims = TokenClaims {
            sub: "mallory".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + TOKEN_VALIDITY_SECS,
        };
        let forged_payload = base64::encode_config(serde_json::to_vec(&claims).unwrap(), super::B64);
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(issuer.validate(&forged), Err(AuthError::BadSignature));
    }
}
