// --- File: crates/services/booksync_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Holds the provider adapters this binary was built with. Adapters for concrete
//! calendars and booking websites register themselves through the builder
//! methods.
use booksync_common::{DestinationBookingProvider, ServiceFactory, SourceEventProvider};
use std::sync::Arc;

#[derive(Default)]
pub struct BooksyncServiceFactory {
    source: Option<Arc<dyn SourceEventProvider>>,
    destination: Option<Arc<dyn DestinationBookingProvider>>,
}

impl BooksyncServiceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_source(mut self, source: Arc<dyn SourceEventProvider>) -> Self {
        self.source = Some(source);
        self
    }

    #[allow(dead_code)]
    pub fn with_destination(mut self, destination: Arc<dyn DestinationBookingProvider>) -> Self {
        self.destination = Some(destination);
        self
    }
}

impl ServiceFactory for BooksyncServiceFactory {
    fn source_provider(&self) -> Option<Arc<dyn SourceEventProvider>> {
        self.source.clone()
    }

    fn destination_provider(&self) -> Option<Arc<dyn DestinationBookingProvider>> {
        self.destination.clone()
    }
}
