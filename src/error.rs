/// Possible atmospheric profile errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AtmError {
    /// The inputs don't have matching lengths
    InconsistentInputs,
    /// The atmosphere type code is not one of 1 to 5
    UnknownAtmosphereType(u32),
    /// A layer index past the end of the profile
    LayerOutOfRange {
        /// The requested layer
        index: usize,
        /// Number of layers in the profile
        num_layers: usize,
    },
    /// No profile has been built yet
    NotInitialized,
    /// The worker thread pool could not be created
    ThreadPool(String),
    /// The operation was aborted early
    Cancelled,
}

impl std::fmt::Display for AtmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtmError::InconsistentInputs => {
                write!(f, "profile inputs have inconsistent lengths")
            }
            AtmError::UnknownAtmosphereType(code) => {
                write!(f, "unknown atmosphere type {code}, expected 1 to 5")
            }
            AtmError::LayerOutOfRange { index, num_layers } => {
                write!(f, "layer {index} out of range for a profile of {num_layers} layers")
            }
            AtmError::NotInitialized => {
                write!(f, "atmospheric profile not initialized, call init_atm_profile first")
            }
            AtmError::ThreadPool(msg) => write!(f, "couldn't build thread pool: {msg}"),
            AtmError::Cancelled => write!(f, "operation cancelled early"),
        }
    }
}

impl std::error::Error for AtmError {}
