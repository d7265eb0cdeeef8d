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

//! Branch name validation
//!
//! Mirrors git's `check-ref-format` rules for the subset that matters to
//! ticket branches. Every rule is checked here so that malformed names never
//! reach libgit2.
//!
//! ## Rejected names
//!
//! - the empty string
//! - any path segment starting with `.`
//! - `..`, `//`, `@{` or a backslash anywhere
//! - a leading `/`
//! - space, DEL, `~`, `^`, `:`, `?`, `*` or `[` anywhere
//! - a trailing `.lock`, `/` or `.`

use std::fmt;

/// Characters that may never appear in a branch name
const FORBIDDEN_CHARS: [char; 8] = [' ', '\u{7f}', '~', '^', ':', '?', '*', '['];

/// The rule a rejected name violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefNameViolation {
    /// Name is empty
    Empty,
    /// A `/`-separated segment starts with `.`
    SegmentStartsWithDot,
    /// Contains `..`
    DoubleDot,
    /// Starts with `/`
    LeadingSlash,
    /// Contains `//`
    DoubleSlash,
    /// Contains `@{`
    AtBrace,
    /// Contains `\`
    Backslash,
    /// Contains a forbidden character
    ForbiddenChar(char),
    /// Ends with `.lock`
    LockSuffix,
    /// Ends with `/`
    TrailingSlash,
    /// Ends with `.`
    TrailingDot,
}

impl fmt::Display for RefNameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefNameViolation::Empty => write!(f, "name is empty"),
            RefNameViolation::SegmentStartsWithDot => {
                write!(f, "a path component starts with '.'")
            }
            RefNameViolation::DoubleDot => write!(f, "contains '..'"),
            RefNameViolation::LeadingSlash => write!(f, "starts with '/'"),
            RefNameViolation::DoubleSlash => write!(f, "contains '//'"),
            RefNameViolation::AtBrace => write!(f, "contains '@{{'"),
            RefNameViolation::Backslash => write!(f, "contains a backslash"),
            RefNameViolation::ForbiddenChar(c) => write!(f, "contains forbidden character {:?}", c),
            RefNameViolation::LockSuffix => write!(f, "ends with '.lock'"),
            RefNameViolation::TrailingSlash => write!(f, "ends with '/'"),
            RefNameViolation::TrailingDot => write!(f, "ends with '.'"),
        }
    }
}

/// Checks a candidate branch name, returning the first violated rule
pub fn validate(name: &str) -> Result<(), RefNameViolation> {
    if name.is_empty() {
        return Err(RefNameViolation::Empty);
    }
    if name.starts_with('/') {
        return Err(RefNameViolation::LeadingSlash);
    }
    if name.split('/').any(|segment| segment.starts_with('.')) {
        return Err(RefNameViolation::SegmentStartsWithDot);
    }
    if name.contains("..") {
        return Err(RefNameViolation::DoubleDot);
    }
    if name.contains("//") {
        return Err(RefNameViolation::DoubleSlash);
    }
    if name.contains("@{") {
        return Err(RefNameViolation::AtBrace);
    }
    if name.contains('\\') {
        return Err(RefNameViolation::Backslash);
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(RefNameViolation::ForbiddenChar(c));
    }
    if name.ends_with(".lock") {
        return Err(RefNameViolation::LockSuffix);
    }
    if name.ends_with('/') {
        return Err(RefNameViolation::TrailingSlash);
    }
    if name.ends_with('.') {
        return Err(RefNameViolation::TrailingDot);
    }
    Ok(())
}

/// Returns whether `name` is a valid branch name
pub fn is_valid_name(name: &str) -> bool {
    validate(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_names() {
        for name in ["develop", "fix/bug", "t/1234", "u/alice/feature-x", "a.b", "v1.0-rc"] {
            assert!(is_valid_name(name), "{} should be valid", name);
        }
    }

    #[test]
    fn test_rejects_each_rule() {
        let cases = [
            ("", RefNameViolation::Empty),
            ("/fix", RefNameViolation::LeadingSlash),
            (".hidden", RefNameViolation::SegmentStartsWithDot),
            ("fix/.hidden", RefNameViolation::SegmentStartsWithDot),
            ("a..b", RefNameViolation::DoubleDot),
            ("fix//bug", RefNameViolation::DoubleSlash),
            ("a@{b", RefNameViolation::AtBrace),
            ("a\\b", RefNameViolation::Backslash),
            ("a b", RefNameViolation::ForbiddenChar(' ')),
            ("a\u{7f}b", RefNameViolation::ForbiddenChar('\u{7f}')),
            ("a~1", RefNameViolation::ForbiddenChar('~')),
            ("a^", RefNameViolation::ForbiddenChar('^')),
            ("a:b", RefNameViolation::ForbiddenChar(':')),
            ("a?", RefNameViolation::ForbiddenChar('?')),
            ("a*", RefNameViolation::ForbiddenChar('*')),
            ("a[0]", RefNameViolation::ForbiddenChar('[')),
            ("x.lock", RefNameViolation::LockSuffix),
            ("fix/", RefNameViolation::TrailingSlash),
            ("fix.", RefNameViolation::TrailingDot),
        ];
        for (name, expected) in cases {
            assert_eq!(validate(name), Err(expected), "name: {:?}", name);
        }
    }

    #[test]
    fn test_at_sign_alone_is_allowed() {
        assert!(is_valid_name("user@host"));
        assert!(is_valid_name("a{b}"));
    }

    #[test]
    fn test_violation_messages() {
        assert_eq!(RefNameViolation::AtBrace.to_string(), "contains '@{'");
        assert_eq!(RefNameViolation::LockSuffix.to_string(), "ends with '.lock'");
    }
}
