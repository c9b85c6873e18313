//! Flint Core
//!
//! Ambient utilities shared by the flint renderer crates and their hosts:
//! logging setup and small 2D math helpers.

pub mod logging;
pub mod math;
