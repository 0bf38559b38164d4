//! Fee and commission configuration resolution

pub mod resolver;

pub use resolver::{FeeResolver, FeeSchedule};
