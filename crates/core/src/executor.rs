// Invocation executor: the single catch boundary between handlers and the
// transport. Every call, valid or not, terminates with exactly one envelope.

use crate::error::InvokeError;
use crate::protocol::ResultEnvelope;
use crate::registry::OperationRegistry;
use crate::schema::ArgumentMap;
use std::sync::Arc;

/// Resolves, validates, and executes invocations against a read-only registry.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<OperationRegistry>,
}

impl Executor {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Execute one invocation and wrap the outcome in a result envelope.
    ///
    /// Never returns an error and never panics on handler failure: unknown
    /// operations, invalid arguments, and handler errors all come back as
    /// error envelopes. The handler is not called unless validation passes.
    pub async fn invoke(&self, operation: &str, arguments: ArgumentMap) -> ResultEnvelope {
        let op = match self.registry.resolve(operation) {
            Ok(op) => op,
            Err(err) => {
                tracing::debug!(operation, "invocation of unregistered operation");
                return ResultEnvelope::error(err.to_string());
            }
        };

        if let Err(err) = op.descriptor().validate(&arguments) {
            tracing::debug!(operation, error = %err, "argument validation failed");
            return ResultEnvelope::error(InvokeError::Validation(err).to_string());
        }

        match op.call(arguments).await {
            Ok(value) => ResultEnvelope::success(value),
            Err(err) => {
                tracing::debug!(operation, error = %err, "handler returned an error");
                ResultEnvelope::error(err.to_string())
            }
        }
    }
}
