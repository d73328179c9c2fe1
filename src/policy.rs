use hashbrown::HashMap;

use crate::errors::{GroupDecayError, Result};
use crate::layout::ParamKind;

/// Immutable mapping from parameter kinds to decay coefficients
///
/// Kinds without an entry are not decayed.
#[derive(Clone, Debug, Default)]
pub struct DecayPolicy {
    decays: HashMap<ParamKind, f64>,
}

impl DecayPolicy {
    /// Creates a builder of an empty policy
    pub fn builder() -> DecayPolicyBuilder {
        DecayPolicyBuilder::default()
    }

    /// Gets the decay coefficient of the given kind, or 0.0 if absent
    #[inline(always)]
    pub fn get(&self, kind: &ParamKind) -> f64 {
        self.decays.get(kind).copied().unwrap_or(0.0)
    }

    /// Checks if the policy has an entry for the given kind
    #[inline(always)]
    pub fn contains(&self, kind: &ParamKind) -> bool {
        self.decays.contains_key(kind)
    }

    /// Gets the number of entries
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.decays.len()
    }

    /// Checks if the policy has no entries
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.decays.is_empty()
    }

    /// Iterates over the entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&ParamKind, f64)> + '_ {
        self.decays.iter().map(|(kind, &decay)| (kind, decay))
    }
}

/// Builder of [`DecayPolicy`]
#[derive(Default)]
pub struct DecayPolicyBuilder {
    decays: HashMap<ParamKind, f64>,
}

impl DecayPolicyBuilder {
    /// Sets the decay coefficient of the given kind.
    ///
    /// Setting the same kind twice overwrites the previous value.
    ///
    /// # Errors
    ///
    /// `decay` must be finite and greater than or equal to 0.0.
    pub fn decay(mut self, kind: ParamKind, decay: f64) -> Result<Self> {
        if !decay.is_finite() || decay < 0.0 {
            return Err(GroupDecayError::invalid_argument(
                "decay must be finite and greater than or equal to 0.0",
            ));
        }
        self.decays.insert(kind, decay);
        Ok(self)
    }

    /// Finishes the policy
    pub fn build(self) -> DecayPolicy {
        DecayPolicy {
            decays: self.decays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults_to_zero() {
        let policy = DecayPolicy::builder()
            .decay(ParamKind::Weight, 0.0005)
            .unwrap()
            .build();
        assert_eq!(0.0005, policy.get(&ParamKind::Weight));
        assert_eq!(0.0, policy.get(&ParamKind::Bias));
        assert!(policy.contains(&ParamKind::Weight));
        assert!(!policy.contains(&ParamKind::Bias));
        assert_eq!(1, policy.len());
    }

    #[test]
    fn test_overwrite() {
        let policy = DecayPolicy::builder()
            .decay(ParamKind::Bias, 0.1)
            .unwrap()
            .decay(ParamKind::Bias, 0.0001)
            .unwrap()
            .build();
        assert_eq!(0.0001, policy.get(&ParamKind::Bias));
        assert_eq!(1, policy.len());
    }

    #[test]
    fn test_reject_invalid_decay() {
        assert!(DecayPolicy::builder().decay(ParamKind::Weight, -1e-4).is_err());
        assert!(DecayPolicy::builder().decay(ParamKind::Weight, f64::NAN).is_err());
        assert!(DecayPolicy::builder()
            .decay(ParamKind::Weight, f64::INFINITY)
            .is_err());
        assert!(DecayPolicy::builder().decay(ParamKind::Weight, 0.0).is_ok());
    }

    #[test]
    fn test_empty_policy() {
        let policy = DecayPolicy::default();
        assert!(policy.is_empty());
        assert_eq!(0.0, policy.get(&ParamKind::NormScale));
        assert_eq!(0, policy.iter().count());
    }
}
