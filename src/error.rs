use crate::loader::LoadReport;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("impulse response must have exactly 2 channels, got {0}")]
    IrChannels(usize),
    #[error("failed to resample impulse response")]
    Resample,
    #[error("channel lengths differ")]
    ChannelLengthMismatch,
    #[error("wav encoding failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("malformed sample data: {0}")]
    MalformedData(String),
    #[error("{} of {} files failed to load", .0.failed.len(), .0.total)]
    PartialLoad(LoadReport),
}
