//! Microsoft Teams notification channel.
//!
//! Change events are rendered as legacy `MessageCard` payloads and posted
//! to an incoming webhook.

pub mod card;
pub mod notifier;

pub use card::MessageCard;
pub use notifier::TeamsNotifier;
