use thiserror::Error;

use crate::parse::ParseError;
use crate::types::{BindError, RegistryError, TrialLoadError};

/// Unified error type covering parsing, binding, trial loading, and I/O.
///
/// Returned by convenience methods like [`Engine::compile()`](crate::Engine::compile)
/// and [`Engine::load_trial_file()`](crate::Engine::load_trial_file).
#[derive(Debug, Error)]
pub enum TrialGateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    TrialLoad(#[from] TrialLoadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
