//! License kinds offered for digital products.

use serde::{Deserialize, Serialize};

/// How a buyer may use a purchased digital product.
///
/// Serialized in `SCREAMING_SNAKE_CASE` to match the marketplace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseType {
    /// One installation or use.
    #[default]
    SingleUse,
    /// A fixed number of uses (see the draft's download limit).
    MultipleUse,
    /// No usage restriction.
    Unlimited,
    /// Valid for the draft's license duration.
    TimeLimited,
    /// Renewing access.
    Subscription,
}

impl LicenseType {
    /// Whether this license kind is bounded in time.
    #[must_use]
    pub const fn is_time_bound(self) -> bool {
        matches!(self, Self::TimeLimited | Self::Subscription)
    }
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleUse => write!(f, "SINGLE_USE"),
            Self::MultipleUse => write!(f, "MULTIPLE_USE"),
            Self::Unlimited => write!(f, "UNLIMITED"),
            Self::TimeLimited => write!(f, "TIME_LIMITED"),
            Self::Subscription => write!(f, "SUBSCRIPTION"),
        }
    }
}

impl std::str::FromStr for LicenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE_USE" => Ok(Self::SingleUse),
            "MULTIPLE_USE" => Ok(Self::MultipleUse),
            "UNLIMITED" => Ok(Self::Unlimited),
            "TIME_LIMITED" => Ok(Self::TimeLimited),
            "SUBSCRIPTION" => Ok(Self::Subscription),
            _ => Err(format!("invalid license type: {s}")),
        }
    }
}
