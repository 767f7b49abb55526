//! JWT 토큰 처리.
//!
//! HS256으로 서명된 Access Token / Refresh Token 생성 및 검증.
//! 서명과 파싱은 (키, 클레임, 시각)의 순수 함수이므로 동기화 없이 동시에 호출할 수 있습니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::principal::{Principal, Role};

/// 토큰 용도 (`type` 클레임).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

/// 디코딩된 JWT 페이로드 (두 용도 공통).
///
/// `email`, `role`은 Access Token에만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID (10진수 문자열)
    pub sub: String,
    /// 이메일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 역할
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// 토큰 용도
    #[serde(rename = "type")]
    pub token_type: TokenPurpose,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// 발급자
    pub iss: String,
    /// 대상
    pub aud: String,
    /// JWT ID - 같은 초에 발급된 토큰도 서로 다른 문자열이 되도록 함
    pub jti: String,
}

impl Claims {
    fn subject_id(&self) -> AuthResult<i64> {
        self.sub.parse().map_err(|_| AuthError::TokenMalformed)
    }

    /// Access Token 클레임으로 변환.
    pub fn into_access(self) -> AuthResult<AccessClaims> {
        if self.token_type != TokenPurpose::Access {
            return Err(AuthError::WrongTokenPurpose);
        }
        let sub = self.subject_id()?;
        match (self.email, self.role) {
            (Some(email), Some(role)) => Ok(AccessClaims {
                sub,
                email,
                role,
                iat: self.iat,
                exp: self.exp,
                jti: self.jti,
            }),
            _ => Err(AuthError::TokenMalformed),
        }
    }

    /// Refresh Token 클레임으로 변환.
    pub fn into_refresh(self) -> AuthResult<RefreshClaims> {
        if self.token_type != TokenPurpose::Refresh {
            return Err(AuthError::WrongTokenPurpose);
        }
        Ok(RefreshClaims {
            sub: self.subject_id()?,
            iat: self.iat,
            exp: self.exp,
            jti: self.jti,
        })
    }
}

/// 검증된 Access Token 클레임.
///
/// 인증 게이트가 만들어 인가 단계와 핸들러에 명시적으로 전달합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessClaims {
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessClaims {
    /// 토큰에 담긴 주체 정보.
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.email.clone(), self.role)
    }
}

/// 검증된 Refresh Token 클레임.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// 서명된 토큰과 만료 시각.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
}

impl TokenPair {
    pub fn bearer(access: IssuedToken, refresh: IssuedToken, access_ttl: Duration) -> Self {
        Self {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: access_ttl.num_seconds(),
        }
    }
}

/// HS256 토큰 서명기.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Access Token 수명.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh Token 수명.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Access Token 생성.
    pub fn sign_access(&self, principal: &Principal) -> AuthResult<IssuedToken> {
        self.sign_access_at(principal, Utc::now())
    }

    /// 지정한 발급 시각으로 Access Token 생성.
    pub fn sign_access_at(
        &self,
        principal: &Principal,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        self.sign(
            principal.id,
            Some((principal.email.clone(), principal.role)),
            TokenPurpose::Access,
            issued_at,
            self.access_ttl,
        )
    }

    /// Refresh Token 생성.
    pub fn sign_refresh(&self, user_id: i64) -> AuthResult<IssuedToken> {
        self.sign_refresh_at(user_id, Utc::now())
    }

    /// 지정한 발급 시각으로 Refresh Token 생성.
    pub fn sign_refresh_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> AuthResult<IssuedToken> {
        self.sign(user_id, None, TokenPurpose::Refresh, issued_at, self.refresh_ttl)
    }

    fn sign(
        &self,
        user_id: i64,
        identity: Option<(String, Role)>,
        purpose: TokenPurpose,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let expires_at = issued_at + ttl;
        let (email, role) = identity.unzip();
        let claims = Claims {
            sub: user_id.to_string(),
            email,
            role,
            token_type: purpose,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// 토큰 디코딩 및 검증 (서명, 만료, 발급자, 대상).
    pub fn parse(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token validation failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::TokenBadSignature,
                    _ => AuthError::TokenMalformed,
                }
            })
    }

    /// Access Token 검증.
    pub fn parse_access(&self, token: &str) -> AuthResult<AccessClaims> {
        self.parse(token)?.into_access()
    }

    /// Refresh Token 검증.
    pub fn parse_refresh(&self, token: &str) -> AuthResult<RefreshClaims> {
        self.parse(token)?.into_refresh()
    }
}
