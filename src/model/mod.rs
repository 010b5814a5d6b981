mod models;
mod table;

pub use models::{NewSubscription, NewUser, Subscription, SubscriptionListItem, User};
pub use table::Table;
