//! Event Output

pub mod logger;

pub use logger::EventLogger;
