//! Force-withdrawal shutdown of a rollup bridge.
//!
//! The shutdown is a sequence of phases run against one deployment:
//! generate a snapshot of bridge positions, deploy it to L1 storage contracts,
//! register those with the bridge, activate force withdrawal, and finally send
//! the claims. Each phase can be run on its own; progress is persisted between
//! invocations.

pub mod artifact;
pub mod context;
pub mod driver;
pub mod error;
pub mod logging;
pub mod operator;
pub mod phase;
pub mod sdk;
pub mod status;
pub mod ui;

pub use context::{ContextOptions, DeploymentContext, DerivedContext};
pub use error::ShutdownError;
pub use phase::Phase;
