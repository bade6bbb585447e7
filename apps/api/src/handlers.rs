pub mod forward;
pub mod health;
pub mod password_reset;
