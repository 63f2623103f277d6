//! Utility functions

pub mod crypto;
pub mod pagination;
pub mod time;
pub mod validation;

pub use crypto::{check_in_code, hash_string};
pub use pagination::{Paginated, Pagination};
pub use time::{Clock, ManualClock, SystemClock};
