//! API endpoint modules.

mod servers;

pub use servers::{ServerListBuilder, ServersApi, DEFAULT_LIMIT, DEFAULT_TECHNOLOGY};
