use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email is already in use")]
    EmailInUse,

    #[error("Invalid join code: {0}")]
    InvalidCode(String),

    #[error("Profile creation failed, registration rolled back")]
    ProfileCreationFailed(#[source] anyhow::Error),

    #[error("Backend unavailable: {0}")]
    Remote(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_authorized(message: impl Into<String>) -> Self {
        AppError::NotAuthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures reported by the document-store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::Unavailable(source) => {
                log::error!("Store error: {}", source);
                AppError::Remote(source)
            }
        }
    }
}

/// Failures reported by the authentication collaborator.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Wrong password")]
    WrongPassword,

    #[error("No identity for that email")]
    IdentityNotFound,

    #[error("An identity already exists for that email")]
    EmailTaken,

    #[error("Auth backend unavailable: {0}")]
    Other(#[source] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::EmailTaken => AppError::EmailInUse,
            AuthError::WrongPassword | AuthError::IdentityNotFound => {
                AppError::NotAuthorized(error.to_string())
            }
            AuthError::Other(source) => {
                log::error!("Auth error: {}", source);
                AppError::Remote(source)
            }
        }
    }
}
