//!  Storage is organized through a [kv_store::KeyValueStore] and the
//!  [persistence::Persistence] adapter on top of it.
//!  The basic idea is:
//!   - Every document lives under its own namespaced key as a JSON string.
//!   - Tracking data is one flat blob: counters, the focus session log, goals and the per-day
//!     usage table keyed by `YYYY-MM-DD` (UTC days).
//!   - Settings live under a separate key and are written by the CLI.

pub mod entities;
pub mod kv_store;
pub mod persistence;
