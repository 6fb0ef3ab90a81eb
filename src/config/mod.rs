pub mod settings;

pub use settings::{AppConfig, PairingSettings, PuzzleSettings, TieBreakMode, TournamentSettings};
