pub mod aggregate;

pub use aggregate::{
    EmailHistoryEntry, SendNotificationDto, SendNotificationResponse, ALL_GRADES,
};
