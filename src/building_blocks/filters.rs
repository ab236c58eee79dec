pub mod phase_matched;
pub mod sos;
