#![warn(missing_docs)]
//! World-facing half of the ambience core.
//!
//! The world itself (chunks, biomes, blocks) is owned by the host; this crate
//! only defines how it is queried ([`RegionSampler`]) and the scanners that
//! turn those queries into area-weighted [`ScanSnapshot`]s around the observer.

mod ceiling;
mod observer;
mod pos;
mod sampler;
mod scanner;

pub use ceiling::*;
pub use observer::*;
pub use pos::*;
pub use sampler::*;
pub use scanner::*;
