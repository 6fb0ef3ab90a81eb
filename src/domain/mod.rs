pub mod ledger;
pub mod models;

pub use ledger::ScoreLedger;
pub use models::*;
