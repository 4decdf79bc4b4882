// Resource operators
//
// Each operator borrows a `Client` and exposes the calls for one resource
// kind. Protocol failures (unexpected status, malformed body) come back as
// `Ok(None)`; only caller and transport errors are `Err`.

pub mod endpoints;
pub mod sessions;
pub mod static_host_lists;

pub use endpoints::{EndpointExtras, EndpointOperator, EndpointStatus, EndpointUpdate};
pub use sessions::ActiveSessionOperator;
pub use static_host_lists::StaticHostListOperator;
