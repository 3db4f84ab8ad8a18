//! Subscription management.
//!
//! The [`SubscriptionCoordinator`] is the API the rest of the application uses:
//! subscribe addresses, read what was recorded for them and shut everything down.

mod coordinator;
mod error;

pub use coordinator::SubscriptionCoordinator;
pub use error::SubscriptionError;
