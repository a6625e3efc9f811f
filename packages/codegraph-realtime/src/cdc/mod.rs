//! C7 — CDC Manager (§4.7): fans mutation events from C5 out to a durable
//! append-only stream and a real-time broadcast channel.

pub mod filter;
pub mod manager;

pub use filter::EventFilter;
pub use manager::{CdcManager, Subscription};
