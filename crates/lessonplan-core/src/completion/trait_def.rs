//! The `CompletionProvider` trait -- the seam between the generation
//! service and a hosted text model.
//!
//! The trait is object-safe so the service can take `&dyn CompletionProvider`
//! and tests can substitute scripted providers.

use async_trait::async_trait;

use super::types::{Completion, CompletionError, GenerationParams};

/// A hosted text-generation model.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model identifier recorded alongside generated plans.
    fn model(&self) -> &str;

    /// Generate text for `prompt`.
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, CompletionError>;

    /// Round-trip a trivial prompt to confirm the provider is reachable and
    /// the credentials work.
    async fn ping(&self) -> Result<(), CompletionError> {
        self.complete("Responda apenas: OK", &GenerationParams::default())
            .await
            .map(|_| ())
    }
}

const _: () = {
    fn _assert_object_safe(_: &dyn CompletionProvider) {}
};
