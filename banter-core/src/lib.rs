pub mod config;
pub mod credentials;
pub mod error;
pub mod platform;
pub mod types;

pub use config::*;
pub use credentials::*;
pub use error::*;
pub use platform::*;
pub use types::*;
