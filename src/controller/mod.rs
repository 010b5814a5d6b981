pub mod notifications;
pub mod subscribe;
pub mod test_push;
