// Operation registry: late-bound lookup of handlers by name

use crate::error::{InvokeError, RegistryError};
use crate::schema::{ArgumentMap, OperationDescriptor};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// An invocable operation: a declared descriptor plus its handler.
///
/// Handlers are arbitrary async functions over an argument map; anything they
/// return as `Err` is caught at the executor and surfaced as an error
/// envelope, never propagated further.
#[async_trait::async_trait]
pub trait Operation: Send + Sync + std::fmt::Debug {
    /// Declared name, description, and parameter schema.
    fn descriptor(&self) -> OperationDescriptor;

    /// Execute against already-validated arguments.
    async fn call(&self, arguments: ArgumentMap) -> Result<serde_json::Value>;
}

/// Mapping from operation name to handler + schema.
///
/// Populated at startup, then shared read-only (wrap in `Arc`); concurrent
/// reads need no synchronization.
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn Operation>>,
    order: Vec<String>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register an operation under its declared name.
    pub fn register(&mut self, operation: Arc<dyn Operation>) -> Result<(), RegistryError> {
        let name = operation.descriptor().name;
        if self.operations.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(operation = %name, "registered operation");
        self.order.push(name.clone());
        self.operations.insert(name, operation);
        Ok(())
    }

    /// Ordered descriptor list for the capability handshake. No side effects;
    /// repeated calls return identical lists.
    pub fn describe_all(&self) -> Vec<OperationDescriptor> {
        self.order
            .iter()
            .map(|name| self.operations[name].descriptor())
            .collect()
    }

    /// Look up the handler for `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Operation>, InvokeError> {
        self.operations
            .get(name)
            .cloned()
            .ok_or_else(|| InvokeError::UnknownOperation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
