use beep_core::BeepError;

/// Errors surfaced by the simulation layer
#[derive(Debug)]
pub enum SimError {
    /// Configuration rejected before the run started
    InvalidConfig(String),
    /// Fatal engine error (bug-class; recoverable ones are absorbed per agent)
    Engine(BeepError),
    Csv(csv::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidConfig(msg) => write!(f, "Invalid simulation config: {}", msg),
            SimError::Engine(e) => write!(f, "Engine failure: {}", e),
            SimError::Csv(e) => write!(f, "CSV export failed: {}", e),
            SimError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::InvalidConfig(_) => None,
            SimError::Engine(e) => Some(e),
            SimError::Csv(e) => Some(e),
            SimError::Io(e) => Some(e),
        }
    }
}

impl From<BeepError> for SimError {
    fn from(e: BeepError) -> Self {
        SimError::Engine(e)
    }
}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::Csv(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}
