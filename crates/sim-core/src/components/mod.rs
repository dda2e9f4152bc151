//! Data Model
//!
//! Plain data for every entity the engine reads and writes.

pub mod agent;
pub mod clan;
pub mod mission;
pub mod social;
pub mod species;
pub mod world;

pub use agent::*;
pub use clan::*;
pub use mission::*;
pub use social::*;
pub use species::*;
pub use world::*;
