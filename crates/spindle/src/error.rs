use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    #[error("the wheel has no entries")]
    EmptyWheel,
    #[error("entry index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("entry label is empty")]
    EmptyLabel,
    #[error("entry label \"{0}\" contains a line break or control character")]
    InvalidLabel(String),
    #[error("entries cannot change while the wheel is spinning")]
    SpinInProgress,
    #[error("the wheel is not spinning")]
    NotSpinning,
    #[error("frame source ran out before the spin settled")]
    FramesExhausted,
    #[error("invalid spin timing: {0}")]
    InvalidTiming(&'static str),
}
