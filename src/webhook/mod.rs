pub mod notifier;
pub mod signature;

pub use notifier::WebhookNotifier;
