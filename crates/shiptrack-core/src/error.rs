use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("not initialized: run 'shiptrack init'")]
    NotInitialized,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order already exists: {0}")]
    OrderExists(String),

    #[error("invalid order id '{0}': must be a UUID")]
    InvalidOrderId(String),

    #[error("invalid tracking reference '{0}': must be 6-32 alphanumeric characters or hyphens")]
    InvalidTrackingReference(String),

    #[error("order {0} already has a tracking reference")]
    AlreadyDispatched(String),

    #[error("order {order} is {status}: terminal orders cannot be dispatched")]
    TerminalOrder { order: String, status: String },

    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    #[error("a tracking run is already in progress")]
    JobAlreadyRunning,

    #[error("carrier unavailable: {0}")]
    CarrierUnavailable(String),

    #[error("carrier rejected request: {0}")]
    CarrierRejected(String),

    #[error("carrier request timed out: {0}")]
    CarrierTimeout(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TrackError {
    /// True for the per-order carrier failures a reconciliation run
    /// recovers from by skipping the order.
    pub fn is_carrier_failure(&self) -> bool {
        matches!(
            self,
            TrackError::CarrierUnavailable(_)
                | TrackError::CarrierRejected(_)
                | TrackError::CarrierTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
