//! Grantable capabilities: permissions and roles.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

const PART_DIVIDER: char = ':';
const SUBPART_DIVIDER: char = ',';
const WILDCARD: &str = "*";

/// Permission identifier.
///
/// Permissions are colon-separated parts, each part a comma-separated list of
/// alternatives, e.g. `"document:read,write:42"`. A `*` part matches anything,
/// and the plain wildcard `"*"` grants every permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == WILDCARD
    }

    /// A permission is well formed when every part names at least one value.
    /// `"report:"`, `"a::b"` and `""` are not.
    pub fn is_well_formed(&self) -> bool {
        parts(self.as_str()).is_some()
    }

    /// Returns `true` if holding `self` grants `required`.
    ///
    /// Parts are compared position by position. A held permission with fewer
    /// parts implies everything below its last part (`"document"` implies
    /// `"document:read:42"`); extra held parts must be wildcards. Malformed
    /// permissions neither grant nor are granted anything.
    pub fn implies(&self, required: &Permission) -> bool {
        let (Some(held), Some(wanted)) = (parts(self.as_str()), parts(required.as_str())) else {
            return false;
        };

        for (i, wanted_part) in wanted.iter().enumerate() {
            let Some(held_part) = held.get(i) else {
                return true;
            };
            if held_part.contains(&WILDCARD) {
                continue;
            }
            if !wanted_part.iter().all(|sub| held_part.contains(sub)) {
                return false;
            }
        }

        held.iter()
            .skip(wanted.len())
            .all(|part| part.contains(&WILDCARD))
    }
}

/// Split into parts and subparts; `None` if any part is empty.
fn parts(raw: &str) -> Option<Vec<Vec<&str>>> {
    raw.split(PART_DIVIDER)
        .map(|part| {
            let subs: Vec<&str> = part
                .split(SUBPART_DIVIDER)
                .map(str::trim)
                .filter(|sub| !sub.is_empty())
                .collect();
            (!subs.is_empty()).then_some(subs)
        })
        .collect()
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role name, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(s: &'static str) -> Permission {
        Permission::new(s)
    }

    #[test]
    fn exact_match_implies() {
        assert!(p("report:read").implies(&p("report:read")));
        assert!(!p("report:read").implies(&p("report:write")));
    }

    #[test]
    fn wildcard_grants_everything() {
        assert!(p("*").implies(&p("report:read:42")));
        assert!(p("report:*").implies(&p("report:delete")));
        assert!(!p("report:*").implies(&p("invoice:read")));
    }

    #[test]
    fn shorter_held_permission_implies_deeper_ones() {
        assert!(p("report").implies(&p("report:read:42")));
        assert!(!p("report:read:42").implies(&p("report")));
        assert!(p("report:*:*").implies(&p("report")));
    }

    #[test]
    fn subpart_alternatives() {
        assert!(p("report:read,write").implies(&p("report:write")));
        assert!(p("report:read,write").implies(&p("report:read,write")));
        assert!(!p("report:read").implies(&p("report:read,write")));
    }

    #[test]
    fn empty_parts_are_never_granted() {
        assert!(!p("report:read").implies(&p("report:")));
        assert!(!p("report").implies(&p("report:")));
        assert!(!p("*").implies(&p("a::b")));
        assert!(!p("a:*:b").implies(&p("a::b")));
        assert!(!p("*").implies(&p("")));
        assert!(!p("report:").is_well_formed());
        assert!(!p("a::b").is_well_formed());
        assert!(p("a:b,c:*").is_well_formed());
    }

    #[test]
    fn malformed_held_permission_grants_nothing() {
        assert!(!p("report:").implies(&p("report:read")));
        assert!(!p("").implies(&p("report")));
    }

    proptest! {
        #[test]
        fn every_permission_implies_itself(parts in prop::collection::vec("[a-z]{1,6}", 1..4)) {
            let perm = Permission::new(parts.join(":"));
            prop_assert!(perm.implies(&perm));
            prop_assert!(Permission::new("*").implies(&perm));
        }
    }
}
