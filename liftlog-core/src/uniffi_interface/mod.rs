pub mod errors;
pub mod logging;
pub mod objects;
pub mod session;
