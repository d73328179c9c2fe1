use alloc::vec::Vec;

use argmin::core::{CostFunction, Error, Gradient};
use argmin_math::{ArgminAdd, ArgminMul};

use crate::errors::{GroupDecayError, Result};
use crate::group::ParameterGroups;
use crate::layout::ParameterLayout;

/// Differentiable loss over a flat weight vector
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub trait Objective {
    /// Computes the loss at `params`.
    fn loss(&self, params: &[f64]) -> f64;

    /// Computes the gradient at `params`. The result must have the same length as `params`.
    fn gradient(&self, params: &[f64]) -> Vec<f64>;
}

/// Objective with the per-group decay penalty `0.5 * decay * ||w||^2` added
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct DecayedLoss<'a, O> {
    objective: &'a O,

    // decay coefficient of each scalar weight
    decays: Vec<f64>,
}

impl<'a, O> DecayedLoss<'a, O>
where
    O: Objective,
{
    /// Creates a new loss applying the decay of each group to its members' weights.
    ///
    /// Weights of parameters not in any group are not decayed.
    ///
    /// # Errors
    ///
    /// Every group member must be a parameter of `layout`.
    pub fn new(
        objective: &'a O,
        layout: &ParameterLayout,
        groups: &ParameterGroups,
    ) -> Result<Self> {
        let mut decays = vec![0.0; layout.n_weights()];
        for group in groups {
            for &param in group.members() {
                let range = layout.range(param).ok_or_else(|| {
                    GroupDecayError::invalid_argument("group member is not in the parameter layout")
                })?;
                decays[range].fill(group.decay());
            }
        }
        Ok(Self { objective, decays })
    }

    /// Gets the decay coefficient of each scalar weight
    #[inline(always)]
    pub fn decays(&self) -> &[f64] {
        &self.decays
    }

    /// Computes the penalty term alone
    pub fn penalty(&self, params: &[f64]) -> f64 {
        let mut norm2 = 0.0;
        for (&d, &p) in self.decays.iter().zip(params) {
            norm2 += d * p * p;
        }
        norm2 * 0.5
    }

    fn check_len(&self, len: usize) -> Result<(), Error> {
        if len != self.decays.len() {
            return Err(Error::msg("weight vector does not match the parameter layout"));
        }
        Ok(())
    }
}

impl<'a, O> CostFunction for DecayedLoss<'a, O>
where
    O: Objective,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        self.check_len(param.len())?;
        Ok(self.objective.loss(param) + self.penalty(param))
    }
}

impl<'a, O> Gradient for DecayedLoss<'a, O>
where
    O: Objective,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error> {
        self.check_len(param.len())?;
        let gradients = self.objective.gradient(param);
        self.check_len(gradients.len())?;
        let decayed: Vec<f64> = self.decays.mul(param);
        Ok(gradients.add(&decayed))
    }
}
