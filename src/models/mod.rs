pub mod login_attempt;

pub use login_attempt::{Browser, DeviceType, LoginAttempt, Os};
