use std::{env::VarError, fmt, path::PathBuf};

use thiserror::Error;

/// Where the API key is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// First line of a local file.
    File(PathBuf),
    /// Value of an environment variable.
    Env(String),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File(path) => write!(f, "file {}", path.display()),
            CredentialSource::Env(name) => write!(f, "environment variable {}", name),
        }
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("API key file {path} could not be read ({source}). Create it and put your API key on the first line.")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable {0} is not set. Export it or add it to .env.")]
    MissingEnv(String),

    #[error("Environment variable {0} does not hold valid UTF-8")]
    NotUnicode(String),

    #[error("No API key found in {0}")]
    Empty(CredentialSource),
}

/// API key for the mapping service. Formatting never reveals more than the
/// first five characters.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(5).collect();
        write!(f, "{}*****", prefix)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self)
    }
}

pub fn load_credential(source: &CredentialSource) -> Result<Credential, CredentialError> {
    let raw = match source {
        CredentialSource::File(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
                    path: path.clone(),
                    source,
                })?;
            contents.lines().next().unwrap_or_default().to_string()
        }
        CredentialSource::Env(name) => {
            std::env::var(name).map_err(|err| match err {
                VarError::NotPresent => CredentialError::MissingEnv(name.clone()),
                VarError::NotUnicode(_) => CredentialError::NotUnicode(name.clone()),
            })?
        }
    };

    let key = raw.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty(source.clone()));
    }

    Ok(Credential::new(key))
}
