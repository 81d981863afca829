mod seen;

pub use seen::{Freshness, SeenStore, StoreError};
