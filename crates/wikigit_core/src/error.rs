use thiserror::Error;

/// Problems detected while setting up an import, before any IO happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("language {language} not supported. Available languages: {available}")]
    UnsupportedLanguage { language: String, available: String },
    #[error("base url for language {language} is invalid: {message}")]
    InvalidBaseUrl { language: String, message: String },
    #[error("OS platform not supported")]
    PlatformNotSupported,
}
