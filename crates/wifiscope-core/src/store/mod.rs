// ── State store ──
//
// `transition::apply` is the pure function; `DataStore` owns the current
// value and publishes it.

pub mod collection;
mod data_store;
mod refresh;
pub mod state;
pub mod transition;

pub use collection::EntityCollection;
pub use data_store::DataStore;
pub use state::{AppState, Diagnostics};
pub use transition::{Outcome, Rejection, StatusKind, StoreAction, apply};
