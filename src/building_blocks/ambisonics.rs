pub mod rotator;
pub mod virtual_speaker;
