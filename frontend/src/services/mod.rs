//! Browser implementations of the seams `common` leaves open: the HTTP
//! transport, the SMTP fallback sender and `localStorage`.

pub mod http;
pub mod storage;

use common::gateway::SheetsClient;

pub use http::{load_runtime_config, GlooTransport, SmtpFallback};
pub use storage::LocalStorageStore;

/// Client handed to every component that talks to the backend.
pub type Client = SheetsClient<GlooTransport>;
