use alloc::vec::Vec;

use bincode::{Decode, Encode};

use crate::layout::{ParamId, ParameterLayout};

/// Represents trained weights together with their layout
#[derive(Clone, Debug, Decode, Encode)]
pub struct TrainedParams {
    /// Parameter layout
    pub layout: ParameterLayout,

    /// Flat weight vector
    pub weights: Vec<f64>,
}

impl TrainedParams {
    /// Gets the weights of the given parameter
    pub fn weights_of(&self, id: ParamId) -> Option<&[f64]> {
        self.weights.get(self.layout.range(id)?)
    }

    /// Gets the weights of the parameter with the given path
    pub fn weights_by_name(&self, name: &str) -> Option<&[f64]> {
        self.weights_of(self.layout.id_of(name)?)
    }
}
