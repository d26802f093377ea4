pub mod callback_secret;

pub use callback_secret::{CALLBACK_SECRET_HEADER, require_callback_secret};
