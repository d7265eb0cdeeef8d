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
// Command modules for the mergewatch CLI
pub mod cache;
pub mod changelog;
pub mod check_name;
pub mod status;
pub mod ticket_ref;

pub use cache::CacheCmd;
pub use changelog::ChangelogCmd;
pub use check_name::CheckNameCmd;
pub use status::StatusCmd;
pub use ticket_ref::TicketRefCmd;
