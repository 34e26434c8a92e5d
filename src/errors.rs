use thiserror::Error;

/// Errors raised at the edges of the environment: config loading and
/// key registration. Resolving a key never fails.
#[derive(Debug, Error)]
pub enum EnvError {
    // A different key already claimed this name.
    #[error("key name already taken: {0}")]
    DuplicateKey(&'static str),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    // Override JSON did not match the key's value type.
    #[error("bad value for key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode key {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad override {0:?}, expected KEY=JSON")]
    Override(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnvError>;
