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

//! Property tests for branch name validation

use mergewatch_git::is_valid_name;
use proptest::prelude::*;

proptest! {
    #[test]
    fn names_from_safe_alphabet_are_valid(name in "[a-z0-9_-]{1,8}(/[a-z0-9_-]{1,8}){0,3}") {
        prop_assert!(is_valid_name(&name));
    }

    #[test]
    fn forbidden_sequences_are_rejected(
        prefix in "[a-z]{1,6}",
        suffix in "[a-z]{1,6}",
        bad in prop::sample::select(vec![
            "..", "//", "@{", "\\", " ", "\u{7f}", "~", "^", ":", "?", "*", "[", "/.",
        ]),
    ) {
        let name = format!("{}{}{}", prefix, bad, suffix);
        prop_assert!(!is_valid_name(&name), "{:?} should be invalid", name);
    }

    #[test]
    fn forbidden_endings_are_rejected(
        stem in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
        ending in prop::sample::select(vec![".lock", "/", "."]),
    ) {
        let name = format!("{}{}", stem, ending);
        prop_assert!(!is_valid_name(&name));
    }

    #[test]
    fn leading_slash_is_rejected(rest in "[a-z]{1,10}") {
        let name = format!("/{}", rest);
        prop_assert!(!is_valid_name(&name));
    }
}
