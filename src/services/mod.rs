pub mod analytics;
pub mod media;
pub mod notify;

pub use analytics::AnalyticsService;
pub use media::{MediaFolder, MediaStore};
pub use notify::email::{ContactMessage, EmailNotifier};
