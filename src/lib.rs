//! # groupdecay
//!
//! Per-parameter-group weight decay for optimizers
//!
//! Parameters are partitioned by kind (weights, biases, normalization scales, ...), and each
//! group receives its own decay coefficient from a [`DecayPolicy`].
//!
//! ## Examples
//!
//! ```rust
//! use groupdecay::{group_parameters, ParameterLayout, TrainConfig};
//!
//! let mut layout = ParameterLayout::new();
//! layout.add_inferred("model.0.conv.weight", 432)?;
//! layout.add_inferred("model.0.bn.weight", 16)?;
//! layout.add_inferred("model.0.bn.bias", 16)?;
//! layout.add_inferred("linear.weight", 160)?;
//! layout.add_inferred("linear.bias", 10)?;
//!
//! let config = TrainConfig::new("imagenet10")?.bias_decay(0.0001)?;
//! let groups = group_parameters(layout.params(), &config.decay_policy()?)?;
//!
//! assert_eq!(
//!     "2 weight(decay=0.0005), 1 norm-scale(decay=0.0), 2 bias(decay=0.0001)",
//!     groups.to_string(),
//! );
//! # Ok::<(), groupdecay::errors::GroupDecayError>(())
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "alloc"))]
compile_error!("`alloc` feature is currently required to build this crate");

#[macro_use]
extern crate alloc;

mod config;
mod group;
mod layout;
mod model;
mod policy;

pub mod errors;

#[cfg(feature = "train")]
mod penalty;
#[cfg(feature = "train")]
mod trainer;

#[cfg(test)]
mod test_utils;

pub use config::TrainConfig;
pub use group::{group_parameters, ParameterGroup, ParameterGroups};
pub use layout::{CustomKind, ParamId, ParamKind, ParamSpec, ParameterLayout};
pub use model::TrainedParams;
pub use policy::{DecayPolicy, DecayPolicyBuilder};

#[cfg(feature = "train")]
pub use penalty::{DecayedLoss, Objective};
#[cfg(feature = "train")]
pub use trainer::Trainer;
