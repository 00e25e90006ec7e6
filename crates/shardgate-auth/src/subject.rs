//! Where the subject id carried in a token comes from.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// Upper bound (exclusive) of randomly drawn subject ids.
pub const RANDOM_SUBJECT_BOUND: u64 = 100_000;

/// Policy for the `UserId` claim of minted tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubjectPolicy {
    /// A fresh random id in `[0, 100000)` on every mint. Two tokens for the
    /// same account are not linkable through their subject.
    #[default]
    RandomNonce,
    /// An id derived from the login, identical across mints.
    StableAccountId,
}

impl SubjectPolicy {
    /// Produce the subject id for a token minted for `login`.
    #[must_use]
    pub fn subject_for(self, login: &str) -> u64 {
        match self {
            Self::RandomNonce => rand::thread_rng().gen_range(0..RANDOM_SUBJECT_BOUND),
            Self::StableAccountId => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(login.as_bytes());
                let digest = hasher.finalize();
                let mut prefix = [0u8; 8];
                prefix.copy_from_slice(&digest.as_bytes()[..8]);
                u64::from_le_bytes(prefix)
            }
        }
    }
}

impl fmt::Display for SubjectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomNonce => write!(f, "random"),
            Self::StableAccountId => write!(f, "stable"),
        }
    }
}

impl FromStr for SubjectPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "nonce" => Ok(Self::RandomNonce),
            "stable" | "account" => Ok(Self::StableAccountId),
            other => Err(format!("unknown subject policy: {other}")),
        }
    }
}
