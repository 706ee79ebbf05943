//! Software license statuses and seat rules.

use crate::error::CoreError;

pub use crate::asset::days_until;

pub const LICENSE_ACTIVE: &str = "Active";
pub const LICENSE_EXPIRED: &str = "Expired";
pub const LICENSE_CANCELLED: &str = "Cancelled";

pub const VALID_LICENSE_STATUSES: &[&str] = &[LICENSE_ACTIVE, LICENSE_EXPIRED, LICENSE_CANCELLED];

/// Maximum length of a software name.
pub const MAX_SOFTWARE_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    Active,
    Expired,
    Cancelled,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => LICENSE_ACTIVE,
            Self::Expired => LICENSE_EXPIRED,
            Self::Cancelled => LICENSE_CANCELLED,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            LICENSE_ACTIVE => Ok(Self::Active),
            LICENSE_EXPIRED => Ok(Self::Expired),
            LICENSE_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid license status '{other}'. Must be one of: {}",
                VALID_LICENSE_STATUSES.join(", ")
            ))),
        }
    }
}

/// A license covers at least one seat.
pub fn validate_seats(seats: i32) -> Result<(), CoreError> {
    if seats < 1 {
        return Err(CoreError::Validation("seats must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse() {
        assert_eq!(LicenseStatus::parse("Cancelled").unwrap(), LicenseStatus::Cancelled);
        assert!(LicenseStatus::parse("active").is_err());
    }

    #[test]
    fn seats_must_be_positive() {
        assert!(validate_seats(1).is_ok());
        assert!(validate_seats(250).is_ok());
        assert!(validate_seats(0).is_err());
        assert!(validate_seats(-3).is_err());
    }
}
