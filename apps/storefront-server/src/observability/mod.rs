//! Observability module - forwarding of error events.

mod beacon;

pub use beacon::BeaconLayer;
