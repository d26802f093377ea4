pub mod complete;
pub mod forward;
pub mod status;
