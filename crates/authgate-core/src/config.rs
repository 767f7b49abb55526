//! 인증 설정.
//!
//! 기본값 → `config/authgate.toml`(선택) → 환경 변수 순서로 설정을 겹쳐 로드합니다.
//! 서명 키(`JWT_SECRET`)가 없으면 서비스는 시작되지 않습니다.

use std::time::Duration as StdDuration;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

/// 서명 키 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 기본 발급자 (`iss`).
pub const DEFAULT_ISSUER: &str = "authgate";

/// 기본 대상 (`aud`).
pub const DEFAULT_AUDIENCE: &str = "authgate-clients";

/// 인증 서비스 설정.
#[derive(Debug)]
pub struct AuthConfig {
    /// HS256 서명 키
    pub jwt_secret: SecretString,
    /// Access Token 수명
    pub access_ttl: Duration,
    /// Refresh Token 수명
    pub refresh_ttl: Duration,
    /// 토큰 발급자
    pub issuer: String,
    /// 토큰 대상
    pub audience: String,
    /// 레지스트리 정리 주기
    pub cleanup_interval: StdDuration,
    /// 폐기 기록 보존 기간
    pub revoked_retention: Duration,
}

/// 설정 소스에서 읽은 원시 값 (모두 문자열).
#[derive(Debug, Deserialize)]
struct RawAuthConfig {
    #[serde(default)]
    jwt_secret: Option<String>,
    jwt_access_ttl: String,
    jwt_refresh_ttl: String,
    jwt_issuer: String,
    jwt_audience: String,
    refresh_cleanup_interval: String,
    refresh_revoked_retention: String,
}

impl AuthConfig {
    /// 기본값으로 설정 생성.
    ///
    /// 서명 키만 지정하면 15분/7일 수명과 1시간 정리 주기가 적용됩니다.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(jwt_secret.into().into()),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            cleanup_interval: StdDuration::from_secs(3600),
            revoked_retention: Duration::days(7),
        }
    }

    /// Access Token 수명 설정.
    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Refresh Token 수명 설정.
    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// # 환경변수
    ///
    /// - `JWT_SECRET` (필수), `JWT_ACCESS_TTL`, `JWT_REFRESH_TTL`
    /// - `JWT_ISSUER`, `JWT_AUDIENCE`
    /// - `REFRESH_CLEANUP_INTERVAL`, `REFRESH_REVOKED_RETENTION`
    /// - 위 키 모두 `AUTHGATE__` 접두사로 덮어쓸 수 있음
    pub fn load() -> AuthResult<Self> {
        Self::load_from("config/authgate")
    }

    /// 지정한 파일 경로(확장자 제외)를 포함해 설정을 로드합니다.
    pub fn load_from(path: &str) -> AuthResult<Self> {
        let raw: RawAuthConfig = config::Config::builder()
            .set_default("jwt_access_ttl", "15m")
            .and_then(|b| b.set_default("jwt_refresh_ttl", "168h"))
            .and_then(|b| b.set_default("jwt_issuer", DEFAULT_ISSUER))
            .and_then(|b| b.set_default("jwt_audience", DEFAULT_AUDIENCE))
            .and_then(|b| b.set_default("refresh_cleanup_interval", "1h"))
            .and_then(|b| b.set_default("refresh_revoked_retention", "168h"))
            .map_err(|e| AuthError::Config(e.to_string()))?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::default())
            .add_source(config::Environment::with_prefix("AUTHGATE").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawAuthConfig) -> AuthResult<Self> {
        let secret = raw
            .jwt_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Config("JWT_SECRET is required".to_string()))?;

        let config = Self {
            jwt_secret: SecretString::new(secret.into()),
            access_ttl: to_chrono(parse_duration(&raw.jwt_access_ttl)?)?,
            refresh_ttl: to_chrono(parse_duration(&raw.jwt_refresh_ttl)?)?,
            issuer: raw.jwt_issuer,
            audience: raw.jwt_audience,
            cleanup_interval: parse_duration(&raw.refresh_cleanup_interval)?,
            revoked_retention: to_chrono(parse_duration(&raw.refresh_revoked_retention)?)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정 유효성 검증.
    pub fn validate(&self) -> AuthResult<()> {
        if self.jwt_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.access_ttl <= Duration::zero() || self.refresh_ttl <= Duration::zero() {
            return Err(AuthError::Config("token TTLs must be positive".to_string()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(AuthError::Config(
                "REFRESH_CLEANUP_INTERVAL must be positive".to_string(),
            ));
        }
        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err(AuthError::Config(
                "JWT_ISSUER and JWT_AUDIENCE must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `15m`, `168h`, `30s`, `7d` 형식의 기간 문자열 파싱.
///
/// 단위가 없으면 초로 해석합니다.
pub fn parse_duration(value: &str) -> AuthResult<StdDuration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| AuthError::Config(format!("invalid duration: {:?}", value)))?;

    let secs = match unit {
        "" | "s" => Some(amount),
        "m" => amount.checked_mul(60),
        "h" => amount.checked_mul(3600),
        "d" => amount.checked_mul(86_400),
        _ => None,
    }
    .ok_or_else(|| AuthError::Config(format!("invalid duration: {:?}", value)))?;

    Ok(StdDuration::from_secs(secs))
}

fn to_chrono(duration: StdDuration) -> AuthResult<Duration> {
    Duration::from_std(duration).map_err(|e| AuthError::Config(e.to_string()))
}
