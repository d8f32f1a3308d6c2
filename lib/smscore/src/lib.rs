pub mod logging;
pub mod shared;
pub mod time;
