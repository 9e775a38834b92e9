pub mod arch;
pub mod registry;
pub mod runtime;

pub use arch::Architecture;
pub use registry::RuntimeRegistry;
pub use runtime::{is_compatible, parse_major_version, RuntimeDescriptor};
