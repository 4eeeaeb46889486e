pub mod notification_queue;
pub mod phone;

pub use notification_queue::NotificationQueue;
pub use phone::PhoneValidator;
