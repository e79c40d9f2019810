//! Service layer: business logic orchestration.
//!
//! [`LadderService`] serialises every write through one lock, persists the
//! engine's diffs and emits events through the [`super::domain::EventBus`].

pub mod ladder_service;

pub use ladder_service::{LadderService, RosterValidation};
