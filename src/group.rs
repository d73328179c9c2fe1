use core::fmt;

use alloc::vec::Vec;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::errors::{GroupDecayError, Result};
use crate::layout::{ParamId, ParamKind};
use crate::policy::DecayPolicy;

/// Named set of parameters sharing one decay coefficient
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterGroup {
    kind: ParamKind,
    members: Vec<ParamId>,
    decay: f64,
}

impl ParameterGroup {
    /// Gets the group name
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Gets the kind shared by all members
    #[inline(always)]
    pub const fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Gets the members in the order they were first seen
    #[inline(always)]
    pub fn members(&self) -> &[ParamId] {
        &self.members
    }

    /// Gets the decay coefficient
    #[inline(always)]
    pub const fn decay(&self) -> f64 {
        self.decay
    }
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}(decay={:?})",
            self.members.len(),
            self.kind,
            self.decay
        )
    }
}

/// Ordered sequence of parameter groups returned by [`group_parameters()`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterGroups {
    groups: Vec<ParameterGroup>,
}

impl ParameterGroups {
    /// Gets the groups in the order their kinds first appeared
    #[inline(always)]
    pub fn as_slice(&self) -> &[ParameterGroup] {
        &self.groups
    }

    /// Gets the number of groups
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Checks if there are no groups
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over the groups
    pub fn iter(&self) -> core::slice::Iter<'_, ParameterGroup> {
        self.groups.iter()
    }

    /// Gets the group with the given name
    pub fn get(&self, name: &str) -> Option<&ParameterGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Gets the group the given parameter belongs to
    pub fn group_of(&self, param: ParamId) -> Option<&ParameterGroup> {
        self.groups.iter().find(|g| g.members.contains(&param))
    }

    /// Gets the total number of grouped parameters
    pub fn n_members(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Unwraps the groups
    pub fn into_vec(self) -> Vec<ParameterGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a ParameterGroups {
    type Item = &'a ParameterGroup;
    type IntoIter = core::slice::Iter<'a, ParameterGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Renders as `64 weight(decay=0.0005), 64 bias(decay=0.0001)`.
impl fmt::Display for ParameterGroups {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(group, f)?;
        }
        Ok(())
    }
}

/// Partitions parameters into one group per distinct kind.
///
/// Groups are ordered by the first appearance of their kind, and each carries the decay
/// coefficient the policy assigns to that kind (0.0 if the policy has no entry). Repeating a
/// parameter under the same kind is harmless.
///
/// # Errors
///
/// Returns [`ConfigurationError`](crate::errors::ConfigurationError) if the same parameter
/// appears under two different kinds.
pub fn group_parameters<I>(params: I, policy: &DecayPolicy) -> Result<ParameterGroups>
where
    I: IntoIterator<Item = (ParamId, ParamKind)>,
{
    let mut groups: Vec<ParameterGroup> = vec![];
    let mut group_ids: HashMap<ParamKind, usize> = HashMap::new();
    let mut assigned: HashMap<ParamId, usize> = HashMap::new();

    for (param, kind) in params {
        let group_id = match group_ids.get(&kind) {
            Some(&group_id) => group_id,
            None => {
                let group_id = groups.len();
                group_ids.insert(kind.clone(), group_id);
                groups.push(ParameterGroup {
                    decay: policy.get(&kind),
                    kind,
                    members: vec![],
                });
                group_id
            }
        };
        match assigned.entry(param) {
            Entry::Occupied(e) => {
                let first_id = *e.get();
                if first_id != group_id {
                    return Err(GroupDecayError::configuration(
                        param,
                        groups[first_id].kind.clone(),
                        groups[group_id].kind.clone(),
                    ));
                }
            }
            Entry::Vacant(e) => {
                e.insert(group_id);
                groups[group_id].members.push(param);
            }
        }
    }

    Ok(ParameterGroups { groups })
}
