mod payload;
mod raw;
mod server;

pub use payload::*;
pub use raw::*;
pub use server::*;
