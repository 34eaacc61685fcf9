//! Reactive view: page layout, chart specs, the derivations that build them
//! and the registry that re-runs derivations when a control changes.

pub mod chart;
pub mod derive;
pub mod layout;
pub mod registry;
