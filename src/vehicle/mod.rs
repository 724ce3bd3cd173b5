//! Vehicle valuation records and the search subject derived from them.

mod query;
pub mod types;

pub use query::subject;
pub use types::{Listing, ValuationRecord};
