//! Package types and inbound routing.

pub mod dispatcher;
pub mod package_type;

pub use dispatcher::Dispatcher;
pub use package_type::PackageType;
