/// Errors that can occur during frame reassembly.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Accumulated input exceeded the configured cap without a terminator.
    #[error("accumulated {size} bytes without a terminator (max {max})")]
    Overflow { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
