pub mod dune;
pub mod synthetic;

pub use dune::{DuneClient, DuneClientError, DuneRow};
pub use synthetic::{generate_transactions, SyntheticConfig};
