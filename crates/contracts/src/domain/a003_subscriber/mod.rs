pub mod aggregate;

pub use aggregate::{is_valid_email, SubscribeDto, Subscriber, UpdateSubscriberDto};
