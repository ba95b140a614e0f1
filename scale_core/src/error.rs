use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaleError {
    #[error("reference weight must be > 0 g")]
    ZeroReferenceWeight,
    #[error("no load detected: count {count} is not above zero point {zero_point}")]
    NoLoadApplied { count: u32, zero_point: u32 },
    #[error("peripheral error: {0}")]
    Peripheral(String),
    #[error("peripheral fault: {0}")]
    PeripheralFault(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sample source")]
    MissingSource,
    #[error("missing buzzer")]
    MissingBuzzer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
