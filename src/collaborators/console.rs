use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use log::warn;

use super::{Renderer, ResultCollector, pairing_lines, standings_lines};
use crate::bracket::BracketAnnouncer;
use crate::config::{PuzzleSettings, TieBreakMode};
use crate::domain::{Color, Player, PlayoffStage, RoundPairing, RoundResult};
use crate::pairing::assignment::Assignment;
use crate::pairing::{ManualPairing, ManualProposal};
use crate::puzzle::{Puzzle, PuzzleClient};
use crate::standings::DeciderGame;

/// Interactive desk for a tournament director at a terminal
pub struct ConsoleDesk<R, W> {
    input: R,
    output: W,
    puzzle: Option<PuzzleSettings>,
}

impl ConsoleDesk<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(puzzle: Option<PuzzleSettings>) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), puzzle)
    }
}

impl<R: BufRead, W: Write> ConsoleDesk<R, W> {
    /// `puzzle` enables fetching a position before each decider
    pub fn new(input: R, output: W, puzzle: Option<PuzzleSettings>) -> Self {
        Self {
            input,
            output,
            puzzle,
        }
    }

    fn say(&mut self, line: impl AsRef<str>) {
        // A closed terminal only loses the echo
        let _ = writeln!(self.output, "{}", line.as_ref());
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read answer")?;
        if read == 0 {
            anyhow::bail!("input closed while waiting for: {}", prompt.trim());
        }
        Ok(line.trim().to_string())
    }

    /// Keep asking until `parse` accepts the answer
    fn ask_until<T>(
        &mut self,
        prompt: &str,
        mut parse: impl FnMut(&str) -> Option<T>,
    ) -> Result<T> {
        loop {
            let answer = self.ask(prompt)?;
            match parse(&answer) {
                Some(value) => return Ok(value),
                None => self.say(format!("'{}' is not a valid answer", answer).red().to_string()),
            }
        }
    }

    fn ask_winner(&mut self, first: &str, second: &str) -> Result<String> {
        let prompt = format!("Winner of {} - {} [1/2 or name]: ", first, second);
        let (first, second) = (first.to_string(), second.to_string());
        self.ask_until(&prompt, |answer| match answer {
            "1" => Some(first.clone()),
            "2" => Some(second.clone()),
            name if name == first || name == second => Some(name.to_string()),
            _ => None,
        })
    }

    fn show_puzzle(&mut self) {
        let Some(settings) = self.puzzle.clone() else {
            return;
        };
        match fetch_puzzle(&settings) {
            Ok(puzzle) => {
                let side = match puzzle.side_to_move {
                    Color::White => "White",
                    Color::Black => "Black",
                };
                self.say(format!("Puzzle: {}", puzzle.fen).cyan().to_string());
                self.say(format!("{} to move, {} move(s)", side, settings.moves));
            }
            Err(e) => warn!("Could not fetch a decider puzzle: {:#}", e),
        }
    }
}

fn fetch_puzzle(settings: &PuzzleSettings) -> Result<Puzzle> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut client = PuzzleClient::new(settings)?;
        client.fetch(settings.rating, settings.moves).await
    })
}

fn parse_result(answer: &str, white: &str, black: &str) -> Option<RoundResult> {
    match answer.to_lowercase().as_str() {
        "w" | "white" | "1" => Some(RoundResult::Winner(white.to_string())),
        "b" | "black" | "0" => Some(RoundResult::Winner(black.to_string())),
        "d" | "draw" | "=" => Some(RoundResult::Draw),
        _ if answer == white => Some(RoundResult::Winner(white.to_string())),
        _ if answer == black => Some(RoundResult::Winner(black.to_string())),
        _ => None,
    }
}

/// Indices separated by spaces or commas
fn parse_indices(answer: &str) -> Option<Vec<usize>> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}

impl<R: BufRead, W: Write> ResultCollector for ConsoleDesk<R, W> {
    fn collect(&mut self, round: &RoundPairing) -> Result<Vec<RoundResult>> {
        self.say(format!("Results for round {} (w = white won, b = black won, d = draw)", round.round).bold().to_string());
        let mut results = Vec::with_capacity(round.pairings.len());
        for (board, pairing) in round.pairings.iter().enumerate() {
            let prompt = format!("Board {}: {} - {} > ", board + 1, pairing.white, pairing.black);
            let result = self.ask_until(&prompt, |answer| {
                parse_result(answer, &pairing.white, &pairing.black)
            })?;
            results.push(result);
        }
        Ok(results)
    }
}

impl<R: BufRead, W: Write> Renderer for ConsoleDesk<R, W> {
    fn show_pairings(&mut self, round: &RoundPairing) {
        self.say("");
        self.say(format!("Round {}", round.round).bold().green().to_string());
        for note in &round.fallbacks {
            self.say(format!("warning: {}", note).yellow().to_string());
        }
        for line in pairing_lines(round) {
            self.say(line);
        }
    }

    fn show_standings(&mut self, title: &str, standings: &[&Player], mode: TieBreakMode) {
        self.say("");
        self.say(title.bold().to_string());
        for line in standings_lines(standings, mode) {
            self.say(line);
        }
    }
}

impl<R: BufRead, W: Write> DeciderGame for ConsoleDesk<R, W> {
    fn play(&mut self, first: &Player, second: &Player) -> Result<String> {
        self.say(format!("Decider: {} vs {}", first.name, second.name).magenta().bold().to_string());
        self.show_puzzle();
        self.ask_winner(&first.name, &second.name)
    }
}

impl<R: BufRead, W: Write> BracketAnnouncer for ConsoleDesk<R, W> {
    fn announce(&mut self, seeds: &[String], third_place_match: bool) -> Result<()> {
        self.say("");
        self.say("Playoffs".bold().green().to_string());
        for (rank, name) in seeds.iter().enumerate() {
            self.say(format!("  {}. {}", rank + 1, name));
        }
        if third_place_match {
            self.say("Semifinal losers play for third place");
        }
        Ok(())
    }

    fn match_winner(&mut self, stage: PlayoffStage, first: &str, second: &str) -> Result<String> {
        self.say(format!("{}: {} vs {}", stage.as_str(), first, second).bold().to_string());
        self.ask_winner(first, second)
    }
}

impl<R: BufRead, W: Write> ManualPairing for ConsoleDesk<R, W> {
    fn propose(&mut self, hint: Option<&Assignment>, attempt: usize) -> Result<ManualProposal> {
        self.say(format!("Automatic pairing failed, pair by hand (attempt {})", attempt).red().bold().to_string());
        if let Some(hint) = hint {
            self.say(format!("rows:    {:?}", hint.rows));
            self.say(format!("columns: {:?}", hint.cols));
        }
        let first = self.ask_until("First pairing, e.g. 0 3 1 2: ", parse_indices)?;
        let second = self.ask_until("Second pairing (empty to skip): ", parse_indices)?;
        Ok(ManualProposal { first, second })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pairing, Strategy};
    use std::io::Cursor;

    fn console(input: &str) -> ConsoleDesk<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleDesk::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), None)
    }

    fn round() -> RoundPairing {
        RoundPairing {
            round: 2,
            pairings: vec![
                Pairing { white: "Ann".into(), black: "Bob".into() },
                Pairing { white: "Cid".into(), black: "Dee".into() },
            ],
            bye: None,
            strategy: Strategy::Exact,
            fallbacks: Vec::new(),
            total_cost: 0,
        }
    }

    #[test]
    fn test_collect_reprompts_on_bad_input() {
        let mut desk = console("Bob\nmaybe\nd\n");
        let results = desk.collect(&round()).unwrap();
        assert_eq!(results, vec![RoundResult::Winner("Bob".into()), RoundResult::Draw]);
        let output = String::from_utf8(desk.output.clone()).unwrap();
        assert!(output.contains("'maybe' is not a valid answer"));
    }

    #[test]
    fn test_closed_input_is_error() {
        let mut desk = console("w\n");
        assert!(desk.collect(&round()).is_err());
    }

    #[test]
    fn test_decider_by_number() {
        let mut desk = console("3\n2\n");
        let winner = desk.play(&Player::new("Ann"), &Player::new("Bob")).unwrap();
        assert_eq!(winner, "Bob");
    }

    #[test]
    fn test_manual_proposal() {
        let mut desk = console("0 3, 1 2\n\n");
        let hint = Assignment::from_permutation(vec![1, 2, 3, 0]);
        let proposal = desk.propose(Some(&hint), 1).unwrap();
        assert_eq!(proposal.first, vec![0, 3, 1, 2]);
        assert!(proposal.second.is_empty());
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("1,0 3 2"), Some(vec![1, 0, 3, 2]));
        assert_eq!(parse_indices("1 x"), None);
        assert_eq!(parse_indices(""), Some(Vec::new()));
    }
}
