//! Implementation of the patient identifier wrapper.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// A validated patient identifier.
///
/// Construction accepts the hyphenated form used by the clinical API as well as the 32-character
/// simple form, in any letter case. Once constructed the value is a plain [`Uuid`], so two
/// spellings of the same identifier compare equal.
///
/// # Display format
/// `Display` produces the hyphenated lowercase form, matching what the clinical API returns.
/// Use [`PatientUuid::canonical`] for the storage form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatientUuid(Uuid);

impl PatientUuid {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a patient identifier.
    ///
    /// Surrounding whitespace is ignored. Braced and URN forms are rejected because the clinical
    /// API never produces them.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is neither a hyphenated nor a simple UUID.
    pub fn parse(input: &str) -> UuidResult<Self> {
        let trimmed = input.trim();
        if !Self::is_accepted_form(trimmed) {
            return Err(UuidError::InvalidInput(format!(
                "patient UUID must be 36 hyphenated or 32 plain hex characters, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid patient UUID '{input}': {e}")))
    }

    /// Returns true if `input` has the shape of a hyphenated or simple UUID.
    ///
    /// This is a purely syntactic check on length, hyphen positions and hex digits.
    pub fn is_accepted_form(input: &str) -> bool {
        let bytes = input.as_bytes();
        match bytes.len() {
            32 => bytes.iter().all(u8::is_ascii_hexdigit),
            36 => bytes.iter().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => *b == b'-',
                _ => b.is_ascii_hexdigit(),
            }),
            _ => false,
        }
    }

    /// Returns the storage form: 32 lowercase hex characters without hyphens.
    pub fn canonical(&self) -> String {
        self.0.simple().to_string()
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first two pairs of hex
    /// characters of the canonical form.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.canonical();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl Default for PatientUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PatientUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PatientUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PatientUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b";
    const SIMPLE: &str = "5b6e2f9a1c3d4e5f8a9b0c1d2e3f4a5b";

    #[test]
    fn test_parse_accepts_hyphenated() {
        let id = PatientUuid::parse(HYPHENATED).unwrap();
        assert_eq!(id.to_string(), HYPHENATED);
    }

    #[test]
    fn test_parse_accepts_simple() {
        let id = PatientUuid::parse(SIMPLE).unwrap();
        assert_eq!(id.canonical(), SIMPLE);
    }

    #[test]
    fn test_both_forms_compare_equal() {
        let a = PatientUuid::parse(HYPHENATED).unwrap();
        let b = PatientUuid::parse(SIMPLE).unwrap();
        let c = PatientUuid::parse(&HYPHENATED.to_uppercase()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = PatientUuid::parse("  5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b\n").unwrap();
        assert_eq!(id.canonical(), SIMPLE);
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        let bad = [
            "",
            "5b6e2f9a",
            "{5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b}",
            "urn:uuid:5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b",
            "5b6e2f9a1c3d-4e5f-8a9b-0c1d2e3f4a5b-",
            "zb6e2f9a1c3d4e5f8a9b0c1d2e3f4a5b",
            "../../etc/passwd",
        ];
        for input in bad {
            assert!(PatientUuid::parse(input).is_err(), "should reject {input:?}");
        }
    }

    #[test]
    fn test_sharded_dir_structure() {
        let id = PatientUuid::parse(HYPHENATED).unwrap();
        let base = Path::new("/data");
        assert_eq!(
            id.sharded_dir(base),
            PathBuf::from("/data/5b/6e/5b6e2f9a1c3d4e5f8a9b0c1d2e3f4a5b")
        );
    }

    #[test]
    fn test_sharded_dir_under_tempdir() {
        let tmp = tempfile::tempdir().unwrap();
        let id = PatientUuid::new();
        let dir = id.sharded_dir(tmp.path());
        assert!(dir.starts_with(tmp.path()));
        assert!(dir.ends_with(id.canonical()));
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: PatientUuid = HYPHENATED.parse().unwrap();
        assert_eq!(parsed, PatientUuid::parse(HYPHENATED).unwrap());
        assert!("nope".parse::<PatientUuid>().is_err());
    }

    #[test]
    fn test_serde_uses_hyphenated_form() {
        let id = PatientUuid::parse(SIMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{HYPHENATED}\""));
        let back: PatientUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
