//! Definition of errors.

use core::fmt;

#[cfg(feature = "train")]
use alloc::string::String;

#[cfg(feature = "std")]
use std::error::Error;

use crate::layout::{ParamId, ParamKind};

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    msg: &'static str,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}", self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for InvalidArgumentError {}

/// Error used when a parameter is assigned to more than one group.
#[derive(Debug)]
pub struct ConfigurationError {
    /// The parameter assigned twice.
    pub param: ParamId,

    /// Kind of the group the parameter was assigned to first.
    pub first: ParamKind,

    /// Kind of the conflicting assignment.
    pub second: ParamKind,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ConfigurationError: parameter {} is assigned to both `{}` and `{}`",
            self.param, self.first, self.second,
        )
    }
}

#[cfg(feature = "std")]
impl Error for ConfigurationError {}

/// Error used when the solver fails.
#[cfg(feature = "train")]
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
#[derive(Debug)]
pub struct SolverError {
    msg: String,
}

#[cfg(feature = "train")]
impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SolverError: {}", self.msg)
    }
}

#[cfg(feature = "train")]
impl Error for SolverError {}

/// The error type for Groupdecay.
#[derive(Debug)]
pub enum GroupDecayError {
    /// The argument is invalid.
    InvalidArgument(InvalidArgumentError),

    /// A parameter belongs to more than one group.
    Configuration(ConfigurationError),

    /// The solver failed.
    #[cfg(feature = "train")]
    #[cfg_attr(docsrs, doc(cfg(feature = "train")))]
    Solver(SolverError),
}

impl GroupDecayError {
    /// Creates a new [`InvalidArgumentError`].
    pub const fn invalid_argument(msg: &'static str) -> Self {
        Self::InvalidArgument(InvalidArgumentError { msg })
    }

    /// Creates a new [`ConfigurationError`].
    pub fn configuration(param: ParamId, first: ParamKind, second: ParamKind) -> Self {
        Self::Configuration(ConfigurationError {
            param,
            first,
            second,
        })
    }

    /// Creates a new [`SolverError`].
    #[cfg(feature = "train")]
    pub fn solver<M>(msg: M) -> Self
    where
        M: fmt::Display,
    {
        Self::Solver(SolverError {
            msg: format!("{msg}"),
        })
    }
}

impl fmt::Display for GroupDecayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => fmt::Display::fmt(e, f),
            Self::Configuration(e) => fmt::Display::fmt(e, f),
            #[cfg(feature = "train")]
            Self::Solver(e) => fmt::Display::fmt(e, f),
        }
    }
}

#[cfg(feature = "std")]
impl Error for GroupDecayError {}

/// A specialized Result type.
pub type Result<T, E = GroupDecayError> = core::result::Result<T, E>;
