//! Gameplay events and the match log built from them.

pub mod events;
pub mod log;
