pub mod learn;
pub mod log;
pub mod persistence;
pub mod prelude;
pub mod util;
