use std::future::Future;
use std::pin::Pin;

use pelot_core::{Assistant, AssistantError};
use pelot_memory::document::IngestReport;

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the HTTP handlers call. Implemented by [`Assistant`].
pub trait QaService: Send + Sync + 'static {
    fn ask<'a>(&'a self, question: &'a str) -> ServiceFuture<'a, Result<String, AssistantError>>;

    fn ingest(&self) -> ServiceFuture<'_, Result<IngestReport, AssistantError>>;
}

impl QaService for Assistant {
    fn ask<'a>(&'a self, question: &'a str) -> ServiceFuture<'a, Result<String, AssistantError>> {
        Box::pin(Assistant::ask(self, question))
    }

    fn ingest(&self) -> ServiceFuture<'_, Result<IngestReport, AssistantError>> {
        Box::pin(Assistant::ingest(self))
    }
}
