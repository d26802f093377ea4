pub mod health;
pub mod intake;
pub mod method;

pub use health::health_check;
pub use intake::complete::receive_completion;
pub use intake::forward::forward_intake;
pub use intake::status::poll_status;
pub use method::method_not_allowed;
