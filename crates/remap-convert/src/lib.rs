//! Carries mappings across package builds.
//!
//! Classes of the old and the new build are matched by structural identity ([`ClassMatcher`],
//! [`MatchingSession`]); mappings then move onto the matched classes ([`migrate_mappings`]) and
//! member names are reconciled ([`compute_member_matches`], [`apply_member_matches`]).

#![forbid(unsafe_code)]

mod error;
mod identity;
mod matcher;
mod matches;
mod matching;
mod members;
mod migrate;
mod namer;
mod session;

pub use crate::error::ConvertError;
pub use crate::identity::{ClassIdentifier, ClassIdentity, MatchPhase};
pub use crate::matcher::{spawn_matching, ClassMatcher, MatchOutcome, MatchReport};
pub use crate::matches::ClassMatches;
pub use crate::matching::{ClassMatch, ClassMatching};
pub use crate::members::{apply_member_matches, compute_member_matches, Member, MemberMatches};
pub use crate::migrate::{convert_mappings, migrate_mappings};
pub use crate::namer::{ClassNamer, Side};
pub use crate::session::MatchingSession;
