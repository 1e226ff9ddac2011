#![forbid(unsafe_code)]

pub mod feed;
pub mod markup;
pub mod matcher;
pub mod model;
pub mod time;

pub use time::Clock;
