//! YouTube Data API surface used by the agent.
//!
//! This module provides:
//! - The three polling modes ([`Mode`])
//! - Request construction per mode ([`build_request`])
//! - Response decoding and shape checks ([`decode_payload`], [`FetchError`])

mod mode;
mod payload;
mod request;


pub use mode::{Comparison, Mode, ParseModeError};
pub use payload::{FetchError, decode_payload, items};
pub use request::{CHANNELS_ENDPOINT, PLAYLIST_ITEMS_ENDPOINT, SEARCH_ENDPOINT, build_request};
