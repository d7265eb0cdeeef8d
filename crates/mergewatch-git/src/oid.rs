// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
// SPDX-License-Identifier: AGPL-3.0

//! Object identifiers
//!
//! Commits and trees are addressed by 40-character lowercase SHA-1 hex
//! strings. Both id types validate on construction, so a value that made it
//! into a [`CommitId`] can always be handed to libgit2.

use crate::error::{GitError, GitResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a hex-encoded SHA-1 object id
pub const OID_HEX_LEN: usize = 40;

/// Length of the abbreviated id shown in changelogs
pub const SHORT_ID_LEN: usize = 7;

fn validate_hex(value: &str) -> GitResult<()> {
    if value.len() != OID_HEX_LEN {
        return Err(GitError::InvalidOid(format!(
            "expected {} hex characters, got {}: {}",
            OID_HEX_LEN,
            value.len(),
            value
        )));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(GitError::InvalidOid(format!(
            "object ids are lowercase: {}",
            value
        )));
    }
    hex::decode(value).map_err(|e| GitError::InvalidOid(format!("{}: {}", value, e)))?;
    Ok(())
}

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses and validates a hex object id
            pub fn parse(value: &str) -> GitResult<Self> {
                validate_hex(value)?;
                Ok(Self(value.to_string()))
            }

            /// Full hex representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Abbreviated form used for display
            pub fn short(&self) -> &str {
                &self.0[..SHORT_ID_LEN]
            }

            /// Converts to a libgit2 object id
            pub fn to_oid(&self) -> GitResult<git2::Oid> {
                Ok(git2::Oid::from_str(&self.0)?)
            }
        }

        impl From<git2::Oid> for $name {
            fn from(oid: git2::Oid) -> Self {
                Self(oid.to_string())
            }
        }

        impl TryFrom<String> for $name {
            type Error = GitError;

            fn try_from(value: String) -> GitResult<Self> {
                validate_hex(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = GitError;

            fn from_str(s: &str) -> GitResult<Self> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

object_id!(
    /// Id of a commit object
    CommitId
);

object_id!(
    /// Id of a tree object
    TreeId
);

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "4d7a214614ab2935c943f9e0ff69d22eadbb8f32";

    #[test]
    fn test_parse_valid() {
        let id = CommitId::parse(SHA).unwrap();
        assert_eq!(id.as_str(), SHA);
        assert_eq!(id.short(), "4d7a214");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(CommitId::parse("abc123").is_err());
        assert!(CommitId::parse(&format!("{}00", SHA)).is_err());
    }

    #[test]
    fn test_parse_rejects_uppercase_and_non_hex() {
        assert!(CommitId::parse(&SHA.to_uppercase()).is_err());
        assert!(CommitId::parse("zz7a214614ab2935c943f9e0ff69d22eadbb8f32").is_err());
    }

    #[test]
    fn test_git2_conversion() {
        let oid = git2::Oid::from_str(SHA).unwrap();
        let id = CommitId::from(oid);
        assert_eq!(id.to_oid().unwrap(), oid);
    }

    #[test]
    fn test_serde_validates() {
        let json = format!("\"{}\"", SHA);
        let id: TreeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id.to_string(), SHA);
        assert!(serde_json::from_str::<TreeId>("\"nope\"").is_err());
    }
}
