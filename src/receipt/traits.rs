//! Trait for document generators.

use super::GeneratorError;

pub trait Generator<Req> {
    type Output;

    /// Generate a document from the request.
    fn generate(&self, request: Req) -> Result<Self::Output, GeneratorError>;
}
