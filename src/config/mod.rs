//! Configuration: startup environment and the settings file

pub mod environment;
pub mod secret;

pub use environment::{Environment, SetupReport, UserInfo};
pub use secret::{SecretMap, Secrets};
