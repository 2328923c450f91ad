//! # Role Hierarchy Resolution
//!
//! Given the roles a player was found to play, keep only the most specific
//! ones. A role is dropped when one of its sub-roles is also in the set.

use crate::types::{KgraphError, Role};
use std::collections::{BTreeMap, BTreeSet};

/// Access to the role sub-typing hierarchy.
pub trait RoleHierarchy {
    /// All transitive sub-roles of `role`, excluding `role` itself.
    fn subs(&self, role: &Role) -> Result<BTreeSet<Role>, KgraphError>;
}

/// In-memory role hierarchy.
#[derive(Debug, Clone, Default)]
pub struct RoleTree {
    children: BTreeMap<Role, BTreeSet<Role>>,
}

impl RoleTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `sub` as a direct sub-role of `sup`.
    pub fn add_sub(&mut self, sup: Role, sub: Role) -> &mut Self {
        self.children.entry(sub.clone()).or_default();
        self.children.entry(sup).or_default().insert(sub);
        self
    }

    /// Declare a chain `roles[0] ⊃ roles[1] ⊃ ...`.
    pub fn add_chain(&mut self, roles: &[&str]) -> &mut Self {
        for pair in roles.windows(2) {
            self.add_sub(Role::new(pair[0]), Role::new(pair[1]));
        }
        self
    }
}

impl RoleHierarchy for RoleTree {
    fn subs(&self, role: &Role) -> Result<BTreeSet<Role>, KgraphError> {
        let mut found = BTreeSet::new();
        let mut pending: Vec<&Role> = self
            .children
            .get(role)
            .map(|direct| direct.iter().collect())
            .unwrap_or_default();

        while let Some(next) = pending.pop() {
            if next == role || !found.insert(next.clone()) {
                continue;
            }
            if let Some(direct) = self.children.get(next) {
                pending.extend(direct.iter());
            }
        }
        Ok(found)
    }
}

/// Keep the roles that have no sub-role in `roles`.
///
/// Independent branches are resolved separately, so a player holding roles
/// from two unrelated hierarchies keeps one leaf per hierarchy.
pub fn find_specific_roles<H: RoleHierarchy + ?Sized>(
    roles: &BTreeSet<Role>,
    hierarchy: &H,
) -> Result<BTreeSet<Role>, KgraphError> {
    let mut pending: Vec<&Role> = roles.iter().collect();
    let mut specific = BTreeSet::new();

    while let Some(role) = pending.pop() {
        let subs = hierarchy.subs(role)?;
        if subs.is_disjoint(roles) {
            specific.insert(role.clone());
        }
    }
    Ok(specific)
}
