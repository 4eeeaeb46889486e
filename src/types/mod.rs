pub mod notification;
pub mod phone;

pub use notification::*;
pub use phone::*;
