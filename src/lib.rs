//! Bazaar - client-side notification queue and phone number validation
//! for the produce marketplace front-end.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{Config, NotificationConfig};
pub use error::{AppError, Result};
pub use services::{NotificationQueue, PhoneValidator};
pub use types::*;
