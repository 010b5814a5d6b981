pub use self::{
    broker::{Acknowledge, Broker, WsGateway},
    database::DatabasePool,
    push::{Deliver, DeliveryError, PushClient},
};

mod broker;
mod database;
mod push;
