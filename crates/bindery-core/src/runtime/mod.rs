//! Runtime value model and call environment.
//!
//! ## Key Types
//!
//! - [`Dynamic`]: the payload of a runtime value
//! - [`Memory`]: shared handle to a value cell, the unit passed between
//!   interpreted code and native code
//! - [`Instance`]: an object receiver
//! - [`Environment`]: diagnostics sink and exception channel for one caller
//! - [`TraceInfo`]: call-site location token

mod dynamic;
mod environment;
mod instance;
mod memory;
mod trace;

pub use dynamic::Dynamic;
pub use environment::{Environment, EnvironmentBuilder};
pub use instance::Instance;
pub use memory::{Checkout, Memory};
pub use trace::TraceInfo;
