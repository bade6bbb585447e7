//! Rate limiting ports and application services.
//!
//! Both limiters count attempts in an external atomic counter store. The
//! general-traffic limiter approximates a sliding window with two weighted
//! fixed buckets; the password-reset limiter uses a single fixed window whose
//! expiry is set by the first increment.

mod fixed_window;
mod ports;
mod sliding_window;


pub use fixed_window::FixedWindowLimiter;
pub use ports::CounterStore;
pub use sliding_window::SlidingWindowLimiter;
