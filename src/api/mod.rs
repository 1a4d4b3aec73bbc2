//! Local HTTP surface: the browser form and print views plus a small JSON
//! API, served on the loopback interface.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, ReportServer, ServerError, ServerSession};
