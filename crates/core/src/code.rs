//! Access code value object.

use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lowest value in the code space (keeps every code at exactly 5 digits).
pub const CODE_MIN: u32 = 10_000;

/// Highest value in the code space (inclusive).
pub const CODE_MAX: u32 = 99_999;

/// A short-lived numeric access code: exactly 5 decimal digits.
///
/// Codes are compared by value and used as the key of the live-code map.
/// Construction goes through [`AccessCode::from_str`] (boundary input) or
/// [`AccessCode::random`] (issuance), so an `AccessCode` in hand is always
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    /// Draw a uniformly random code in `[10000, 99999]`.
    ///
    /// Uniqueness against live codes is the store's concern, not ours.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(CODE_MIN..=CODE_MAX).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccessCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccessCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_code(
                "expected exactly 5 decimal digits",
            ));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_accepts_five_digits() {
        let code: AccessCode = "12345".parse().unwrap();
        assert_eq!(code.as_str(), "12345");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("1234".parse::<AccessCode>().is_err());
        assert!("123456".parse::<AccessCode>().is_err());
        assert!("12a45".parse::<AccessCode>().is_err());
        assert!("".parse::<AccessCode>().is_err());
        assert!(" 1234".parse::<AccessCode>().is_err());
    }

    #[test]
    fn random_codes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let code = AccessCode::random(&mut rng);
            let value: u32 = code.as_str().parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
            assert_eq!(code.as_str().len(), 5);
        }
    }
}
