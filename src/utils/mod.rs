pub mod config_loader;
pub mod math;
pub mod token;

pub use config_loader::*;
pub use token::Token;
