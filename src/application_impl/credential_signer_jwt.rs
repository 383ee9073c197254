use crate::application_port::{CredentialSigner, SignerError};
use crate::domain_model::{Claims, TokenId, TokenKind, UserId};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::RS256;
const EPHEMERAL_KEY_BITS: usize = 2048;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
    typ: TokenKind,
}

/// RS256 signer. The verifier only ever accepts RS256 under its own public key.
pub struct JwtRs256Signer {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtRs256Signer {
    /// Build from a PKCS#8 (or PKCS#1) private key and an SPKI public key, both PEM.
    pub fn from_pem(
        cfg: JwtConfig,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, SignerError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| SignerError::Key(format!("private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| SignerError::Key(format!("public key: {e}")))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[cfg.issuer.clone()]);
        validation.set_audience(&[cfg.audience.clone()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(JwtRs256Signer {
            cfg,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Fresh in-memory keypair. Tokens signed with it die with the process.
    pub fn ephemeral(cfg: JwtConfig) -> Result<Self, SignerError> {
        let private = RsaPrivateKey::new(&mut OsRng, EPHEMERAL_KEY_BITS)
            .map_err(|e| SignerError::Key(e.to_string()))?;
        let private_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SignerError::Key(e.to_string()))?;
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SignerError::Key(e.to_string()))?;
        Self::from_pem(cfg, private_pem.as_bytes(), public_pem.as_bytes())
    }

    fn map_decode_error(e: jsonwebtoken::errors::Error) -> SignerError {
        match e.kind() {
            ErrorKind::ExpiredSignature => SignerError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience => SignerError::InvalidSignature,
            _ => SignerError::Malformed,
        }
    }

    fn parse_claims(wire: WireClaims) -> Result<Claims, SignerError> {
        let subject = wire
            .sub
            .parse::<UserId>()
            .map_err(|_| SignerError::Malformed)?;
        let jti = wire
            .jti
            .parse::<TokenId>()
            .map_err(|_| SignerError::Malformed)?;
        let issued_at = DateTime::from_timestamp(wire.iat, 0).ok_or(SignerError::Malformed)?;
        let expires_at = DateTime::from_timestamp(wire.exp, 0).ok_or(SignerError::Malformed)?;
        Ok(Claims {
            subject,
            jti,
            kind: wire.typ,
            issued_at,
            expires_at,
        })
    }
}

impl CredentialSigner for JwtRs256Signer {
    fn sign(&self, claims: &Claims) -> Result<String, SignerError> {
        let wire = WireClaims {
            sub: claims.subject.to_string(),
            jti: claims.jti.to_string(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            typ: claims.kind,
        };
        encode(&Header::new(ALGORITHM), &wire, &self.encoding_key)
            .map_err(|e| SignerError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, SignerError> {
        let data = decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(Self::map_decode_error)?;
        if data.claims.typ != kind {
            return Err(SignerError::Malformed);
        }
        let claims = Self::parse_claims(data.claims)?;
        // jsonwebtoken still accepts a token during the second that starts at `exp`.
        if claims.expires_at <= Utc::now() {
            return Err(SignerError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const PRIVATE_PEM: &str = include_str!("../../testdata/jwt_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../testdata/jwt_public.pem");
    const OTHER_PRIVATE_PEM: &str = include_str!("../../testdata/other_private.pem");
    const OTHER_PUBLIC_PEM: &str = include_str!("../../testdata/other_public.pem");

    fn config() -> JwtConfig {
        JwtConfig {
            issuer: "authgate.test".to_string(),
            audience: "authgate-client".to_string(),
        }
    }

    fn signer() -> JwtRs256Signer {
        JwtRs256Signer::from_pem(config(), PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes())
            .expect("fixture keys")
    }

    fn access_claims(user: i64) -> Claims {
        Claims::new(
            UserId(user),
            TokenKind::Access,
            Utc::now(),
            std::time::Duration::from_secs(900),
        )
    }

    #[test]
    fn verify_returns_signed_subject_and_jti() {
        let signer = signer();
        let claims = access_claims(42);
        let token = signer.sign(&claims).unwrap();

        let verified = signer.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(verified.subject, UserId(42));
        assert_eq!(verified.jti, claims.jti);
        assert_eq!(verified.expires_at.timestamp(), claims.expires_at.timestamp());
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let other = JwtRs256Signer::from_pem(
            config(),
            OTHER_PRIVATE_PEM.as_bytes(),
            OTHER_PUBLIC_PEM.as_bytes(),
        )
        .unwrap();
        let token = other.sign(&access_claims(1)).unwrap();

        assert_eq!(
            signer().verify(&token, TokenKind::Access),
            Err(SignerError::InvalidSignature)
        );
    }

    #[test]
    fn hs256_token_keyed_with_public_pem_is_rejected() {
        let now = Utc::now();
        let wire = WireClaims {
            sub: "1".to_string(),
            jti: TokenId::generate().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(15)).timestamp(),
            iss: config().issuer,
            aud: config().audience,
            typ: TokenKind::Access,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &wire,
            &EncodingKey::from_secret(PUBLIC_PEM.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            signer().verify(&forged, TokenKind::Access),
            Err(SignerError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let signer = signer();
        let issued = Utc::now() - Duration::minutes(20);
        let claims = Claims::new(
            UserId(7),
            TokenKind::Access,
            issued,
            std::time::Duration::from_secs(900),
        );
        let token = signer.sign(&claims).unwrap();

        assert_eq!(
            signer.verify(&token, TokenKind::Access),
            Err(SignerError::Expired)
        );
    }

    #[test]
    fn token_is_expired_from_its_exp_second_on() {
        let signer = signer();
        let now = Utc::now();
        let exp = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        let claims = Claims {
            subject: UserId(7),
            jti: TokenId::generate(),
            kind: TokenKind::Access,
            issued_at: exp - Duration::minutes(15),
            expires_at: exp,
        };
        let token = signer.sign(&claims).unwrap();

        assert_eq!(
            signer.verify(&token, TokenKind::Access),
            Err(SignerError::Expired)
        );
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let signer = signer();
        let claims = Claims::new(
            UserId(7),
            TokenKind::Refresh,
            Utc::now(),
            std::time::Duration::from_secs(3600),
        );
        let token = signer.sign(&claims).unwrap();

        assert_eq!(
            signer.verify(&token, TokenKind::Access),
            Err(SignerError::Malformed)
        );
        assert!(signer.verify(&token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            signer().verify("not.a.token", TokenKind::Access),
            Err(SignerError::Malformed)
        );
    }

    #[test]
    fn foreign_audience_is_rejected() {
        let foreign = JwtRs256Signer::from_pem(
            JwtConfig {
                issuer: config().issuer,
                audience: "someone-else".to_string(),
            },
            PRIVATE_PEM.as_bytes(),
            PUBLIC_PEM.as_bytes(),
        )
        .unwrap();
        let token = foreign.sign(&access_claims(3)).unwrap();

        assert!(signer().verify(&token, TokenKind::Access).is_err());
    }
}
