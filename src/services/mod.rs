pub mod tournament;

pub use tournament::{RoundRecord, StandingRow, TournamentReport, TournamentService};
