pub mod audience;
pub mod intake;
pub mod send_push;
pub mod subscription;
pub mod users;
