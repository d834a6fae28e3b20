use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};
use thiserror::Error;

use crate::constants::{DEFAULT_HOST, DEFAULT_POOL_SIZE, DEFAULT_PORT};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// The three values needed to talk to Firestore as a service account.
#[derive(Clone)]
pub struct FirebaseCredentials {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

// Keeps the private key out of logs.
impl std::fmt::Debug for FirebaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub pool_size: u32,
    pub firebase: Option<FirebaseCredentials>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or_default("PORT", var("PORT"), DEFAULT_PORT)?,
            database_url: var("DATABASE_URL"),
            pool_size: parse_or_default(
                "DATABASE_POOL_SIZE",
                var("DATABASE_POOL_SIZE"),
                DEFAULT_POOL_SIZE,
            )?,
            firebase: firebase_credentials(
                var("VITE_FIREBASE_PROJECT_ID").or_else(|| var("FIREBASE_PROJECT_ID")),
                var("FIREBASE_CLIENT_EMAIL"),
                var("FIREBASE_PRIVATE_KEY"),
            ),
        })
    }
}

fn parse_or_default<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn firebase_credentials(
    project_id: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
) -> Option<FirebaseCredentials> {
    match (project_id, client_email, private_key) {
        (Some(project_id), Some(client_email), Some(private_key)) => Some(FirebaseCredentials {
            project_id,
            client_email,
            private_key,
        }),
        (None, None, None) => None,
        (project_id, client_email, private_key) => {
            warn!(
                "Incomplete Firebase configuration (project id: {}, client email: {}, private key: {}), ignoring it",
                project_id.is_some(),
                client_email.is_some(),
                private_key.is_some()
            );
            None
        }
    }
}
