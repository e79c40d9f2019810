//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::LadderService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ladder service for all business logic.
    pub ladder_service: Arc<LadderService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(ladder_service: LadderService) -> Self {
        let event_bus = ladder_service.event_bus().clone();
        Self {
            ladder_service: Arc::new(ladder_service),
            event_bus,
        }
    }
}
