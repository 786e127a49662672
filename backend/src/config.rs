//! Token configuration parsing and validation.
//!
//! The signing secret and token lifetime come from the environment and a
//! secret file. Debug builds warn and fall back to development defaults;
//! release builds reject anything missing or invalid.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::domain::{TokenSecret, TokenSettings, TokenSettingsError};

const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/token_secret";
const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const SECRET_FILE_ENV: &str = "AUTH_TOKEN_SECRET_FILE";
const TTL_ENV: &str = "AUTH_TOKEN_TTL_SECS";
const ALLOW_EPHEMERAL_ENV: &str = "AUTH_ALLOW_EPHEMERAL_SECRET";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const TTL_EXPECTED: &str = "a whole number of seconds";

/// Token lifetime used when debug builds have none configured (30 days).
pub const DEFAULT_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Shortest accepted token lifetime.
pub const MIN_TTL_SECS: u64 = 60;
/// Longest accepted token lifetime (90 days).
pub const MAX_TTL_SECS: u64 = 90 * 24 * 60 * 60;

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit, valid settings.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sns_backend::config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The secret file exists but is too short for release builds.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("AUTH_ALLOW_EPHEMERAL_SECRET must be 0 in release builds")]
    EphemeralNotAllowed,
    /// The loaded values were rejected by the token settings.
    #[error(transparent)]
    Settings(#[from] TokenSettingsError),
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use mockable::MockEnv;
/// use sns_backend::config::{BuildMode, token_settings_from_env};
/// use sns_backend::test_support::TempSecretFile;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = TempSecretFile::new(&[b'k'; 32])?;
/// let secret_path = secret.path_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "AUTH_TOKEN_SECRET_FILE" => Some(secret_path.clone()),
///     "AUTH_TOKEN_TTL_SECS" => Some("3600".to_owned()),
///     "AUTH_ALLOW_EPHEMERAL_SECRET" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert_eq!(settings.ttl(), Duration::from_secs(3600));
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let ttl = ttl_from_env(env, mode)?;
    ensure_ephemeral_flag_allowed(env, mode)?;
    let secret = secret_from_env(env, mode)?;
    info!(
        secret_fingerprint = %secret.fingerprint(),
        ttl_secs = ttl.as_secs(),
        "loaded token settings"
    );
    Ok(TokenSettings::new(secret, ttl)?)
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, TokenConfigError> {
    let Some(value) = env.string(TTL_ENV) else {
        if mode.is_debug() {
            warn!(
                default_secs = DEFAULT_TTL_SECS,
                "AUTH_TOKEN_TTL_SECS not set; using default"
            );
            return Ok(Duration::from_secs(DEFAULT_TTL_SECS));
        }
        return Err(TokenConfigError::MissingEnv { name: TTL_ENV });
    };

    let secs = match value.trim().parse::<u64>() {
        Ok(secs) => secs,
        Err(_) if mode.is_debug() => {
            warn!(value = %value, "invalid AUTH_TOKEN_TTL_SECS; using default");
            DEFAULT_TTL_SECS
        }
        Err(_) => {
            return Err(TokenConfigError::InvalidEnv {
                name: TTL_ENV,
                value,
                expected: TTL_EXPECTED,
            });
        }
    };

    let clamped = secs.clamp(MIN_TTL_SECS, MAX_TTL_SECS);
    if clamped != secs {
        warn!(
            requested_secs = secs,
            clamped_secs = clamped,
            "AUTH_TOKEN_TTL_SECS out of range; clamping"
        );
    }
    Ok(Duration::from_secs(clamped))
}

/// `AUTH_ALLOW_EPHEMERAL_SECRET` is a release guard only: debug builds always
/// fall back to an ephemeral secret, and release builds refuse to start when
/// the flag is set.
fn ensure_ephemeral_flag_allowed<E: Env>(env: &E, mode: BuildMode) -> Result<(), TokenConfigError> {
    match env.string(ALLOW_EPHEMERAL_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(true) if !mode.is_debug() => Err(TokenConfigError::EphemeralNotAllowed),
            Some(_) => Ok(()),
            None => {
                if mode.is_debug() {
                    warn!(
                        value = %value,
                        "invalid AUTH_ALLOW_EPHEMERAL_SECRET; ignoring"
                    );
                    Ok(())
                } else {
                    Err(TokenConfigError::InvalidEnv {
                        name: ALLOW_EPHEMERAL_ENV,
                        value,
                        expected: BOOL_EXPECTED,
                    })
                }
            }
        },
        None => Ok(()),
    }
}

fn secret_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<TokenSecret, TokenConfigError> {
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_owned()),
    );

    match read_secret_file(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SECRET_MIN_LEN {
                bytes.zeroize();
                return Err(TokenConfigError::SecretTooShort {
                    path,
                    length,
                    min_len: SECRET_MIN_LEN,
                });
            }
            Ok(TokenSecret::new(bytes)?)
        }
        Err(error) => {
            if mode.is_debug() {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using ephemeral token secret (dev only); tokens die with the process"
                );
                Ok(ephemeral_secret()?)
            } else {
                Err(TokenConfigError::SecretRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn read_secret_file(path: &Path) -> io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "secret path must name a file",
        )
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read(file_name)
}

fn ephemeral_secret() -> Result<TokenSecret, TokenSettingsError> {
    let mut bytes = vec![0_u8; EPHEMERAL_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    TokenSecret::new(bytes)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
