mod broker;
mod push;
mod subscription;

pub use broker::{
    AckFrame, CreatedMessageNotification, CreatedUserEvent,
    CreatedUserNotification, DeletedUserEvent, Envelope,
    NotificationToOwners, NotificationToUser, ReplyFrame, RestoredUserEvent,
    UpdatedUserEvent, UserRef, WireUser,
};
pub use push::{Claims, PushData, PushHeader, Urgency};
pub use subscription::{
    ListFilters, SubscribeRequest, SubscriptionKeys, UnsubscribeRequest,
    UserRole,
};
