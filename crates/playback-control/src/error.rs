#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("unsupported playback rate {0}")]
    UnsupportedRate(f64),
}
