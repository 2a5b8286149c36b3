//! CostWatch Schema - provider configuration rules
//!
//! The leaf crate of the workspace. It knows, for every supported
//! data-source provider:
//! - which configuration fields are required unconditionally
//! - which requirements come in either/or branches
//! - how to normalize raw form input into a configuration document
//! - how to simulate a connection test without touching the network
//!
//! # Example
//!
//! ```rust,ignore
//! use costwatch_schema::{ProviderKind, RawSourceInput, registry};
//!
//! let input = RawSourceInput::new()
//!     .set("access_key_id", "AKIA1234567890AB")
//!     .set("secret_access_key", "secret")
//!     .set("account_id", "123456789012");
//!
//! registry::validate(ProviderKind::AwsCostExplorer, &input)?;
//! let config = registry::build(ProviderKind::AwsCostExplorer, &input);
//! # Ok::<(), costwatch_schema::SchemaError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod probe;
pub mod provider;
pub mod registry;

// Re-exports for convenience
pub use error::{ParseProviderError, SchemaError};
pub use probe::{run_probe, ProbeConfig, ProbeFailure};
pub use provider::ProviderKind;
pub use registry::{build, validate, RawSourceInput, CONFIG_NOTE};
