//! yt-watch: YouTube change watcher
//!
//! A library for polling the YouTube Data API (channel metadata, playlist
//! items, or a channel's latest uploads), detecting what changed since the
//! last poll, and emitting one event per new item.
//!
//! The pipeline lives in [`agent`]; its collaborators (HTTP transport,
//! durable memory, event sink, clock) are traits so hosts and tests can
//! inject their own.

pub mod agent;
pub mod config;
pub mod event;
pub mod health;
pub mod memory;
pub mod snapshot;
pub mod time;
pub mod transport;
pub mod youtube;
