pub mod feed;
pub mod identity;
pub mod membership;
pub mod read_ledger;
pub mod session;
pub mod status;

pub use feed::FeedService;
pub use identity::{IdentityService, OrphanCleanup};
pub use membership::MembershipService;
pub use read_ledger::ReadLedger;
pub use session::Session;
pub use status::StatusService;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AppError::validation("email", "not a valid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_email;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@club.example.org").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@signs.com").is_err());
        assert!(validate_email("spaces in@mail.com").is_err());
    }
}
