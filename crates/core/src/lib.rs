// Core types for the Tether tool-invocation channel

pub mod error;
pub mod executor;
pub mod protocol;
pub mod registry;
pub mod schema;

pub use error::{InvokeError, RegistryError};
pub use executor::Executor;
pub use protocol::{ClientFrame, InvocationStatus, ResultEnvelope, ServerFrame};
pub use registry::{Operation, OperationRegistry};
pub use schema::{ArgumentMap, OperationDescriptor, ParamSpec, ParamType, ValidationError};
