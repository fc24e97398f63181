//! Cross-module tests that drive a bound engine against an in-memory world.
//!
//! - `scenarios.rs`: End-to-end behaviour of rule sets (casts, links, phases, nesting)
//! - `scheduler.rs`: Timer, retry and determinism behaviour seen through `update`
//! - `targeting.rs`: Target resolution against a populated world
//! - `forwarding.rs`: Hosts that call back into the engine from inside `dispatch`
//! - `helpers.rs`: [`MockWorld`] and rule factories shared by every test module

mod forwarding;
mod helpers;
mod scenarios;
mod scheduler;
mod targeting;

pub use helpers::*;
