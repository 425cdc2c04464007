use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Simulation is not running (state: {state})")]
    NotRunning { state: String },

    #[error("Simulation already finished")]
    AlreadyFinished,

    #[error("No simulation has been initialized")]
    NoSimulation,

    #[error("A day advance is already in progress")]
    AdvanceInProgress,

    #[error("Reset requires the confirmation token '{expected}'")]
    ResetConfirmation { expected: &'static str },

    #[error("Insufficient capital: need {needed:.2}, free {free:.2}")]
    InsufficientCapital { needed: f64, free: f64 },

    #[error("Insufficient stock: requested {requested:.0}, available {available:.0}")]
    InsufficientStock { requested: f64, available: f64 },

    #[error("Region {region} is unavailable: {reason}")]
    RegionUnavailable { region: String, reason: String },

    #[error("Unknown region '{0}'")]
    UnknownRegion(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Unknown firm {0}")]
    UnknownFirm(i64),

    #[error("Unknown product {0}")]
    UnknownProduct(i64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
