//! gastos-core: payment-method types and time utilities shared across the workspace

pub mod finance;
pub mod time;

pub use finance::PaymentMethod;
pub use time::{Clock, FixedClock, SystemClock, local_now, to_iso_millis_utc, to_local};
