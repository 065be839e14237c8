mod listener;
mod store;

pub use listener::*;
pub use store::*;
