use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::config::PuzzleSettings;
use crate::domain::Color;
use crate::errors::{fetch_context, parse_context, with_parse_context};
use crate::http::RateLimitedClient;

/// A decider position; the side to move solves it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Puzzle {
    pub fen: String,
    pub side_to_move: Color,
    pub moves: Vec<String>,
    pub rating: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PuzzleResponse {
    puzzles: Vec<RawPuzzle>,
}

#[derive(Debug, Deserialize)]
struct RawPuzzle {
    fen: String,
    #[serde(default)]
    moves: Vec<String>,
    #[serde(default)]
    rating: Option<u32>,
}

/// Client for the chess-puzzles API
pub struct PuzzleClient {
    client: RateLimitedClient,
    base_url: String,
    headers: HeaderMap,
}

impl PuzzleClient {
    /// Reads the API key from the environment variable named in the settings
    pub fn new(settings: &PuzzleSettings) -> Result<Self> {
        let api_key = std::env::var(settings.api_key_env)
            .with_context(|| format!("{} is not set", settings.api_key_env))?;
        let client = RateLimitedClient::new(
            settings.user_agent,
            settings.timeout_secs,
            settings.rate_limit_ms,
        )?;

        Ok(Self {
            client,
            base_url: settings.base_url.to_string(),
            headers: Self::build_headers(&api_key, settings.api_host)?,
        })
    }

    fn build_headers(api_key: &str, api_host: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-rapidapi-key",
            HeaderValue::from_str(api_key).context("API key is not a valid header value")?,
        );
        headers.insert(
            "x-rapidapi-host",
            HeaderValue::from_str(api_host).context("API host is not a valid header value")?,
        );
        Ok(headers)
    }

    /// Fetch one puzzle of the given rating that takes `moves` player moves
    pub async fn fetch(&mut self, rating: u32, moves: u32) -> Result<Puzzle> {
        info!("Fetching a {} rated puzzle ({} moves)", rating, moves);
        let query = [
            ("rating", rating.to_string()),
            ("playerMoves", moves.to_string()),
            ("count", "1".to_string()),
        ];
        let response: PuzzleResponse = self
            .client
            .get_json(&self.base_url, &query, self.headers.clone())
            .await
            .with_context(|| fetch_context(&self.base_url))?;
        parse_puzzle(response)
    }
}

fn parse_puzzle(response: PuzzleResponse) -> Result<Puzzle> {
    let raw = response
        .puzzles
        .into_iter()
        .next()
        .context("puzzle response contains no puzzles")?;
    let side_to_move = side_to_move(&raw.fen).with_context(|| parse_context("FEN"))?;
    debug!("Puzzle {} ({:?} to move)", raw.fen, side_to_move);

    Ok(Puzzle {
        fen: raw.fen,
        side_to_move,
        moves: raw.moves,
        rating: raw.rating,
    })
}

/// Second FEN field: `w` or `b`
pub fn side_to_move(fen: &str) -> Result<Color> {
    match fen.split_whitespace().nth(1) {
        Some("w") => Ok(Color::White),
        Some("b") => Ok(Color::Black),
        Some(other) => anyhow::bail!("unknown side to move '{}' in {}", other, fen),
        None => anyhow::bail!("FEN has no side-to-move field: {}", fen),
    }
}

/// Parse a raw API body, as returned by the puzzle endpoint
pub fn parse_puzzle_json(body: &str) -> Result<Puzzle> {
    let response: PuzzleResponse = with_parse_context(serde_json::from_str(body), "puzzle response")?;
    parse_puzzle(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_to_move() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        assert_eq!(side_to_move(fen).unwrap(), Color::White);
        let fen = "8/8/8/8/8/8/8/K6k b - - 0 1";
        assert_eq!(side_to_move(fen).unwrap(), Color::Black);
        assert!(side_to_move("8/8/8/8/8/8/8/K6k").is_err());
        assert!(side_to_move("8/8/8/8/8/8/8/K6k x - - 0 1").is_err());
    }

    #[test]
    fn test_parse_api_body() {
        let body = r#"{
            "puzzles": [{
                "puzzleid": "HxxIU",
                "fen": "2r2rk1/3nqp1p/p3p1p1/np1p4/3P4/P1NBP3/1PQ2PPP/2R2RK1 w - - 0 18",
                "rating": 1683,
                "moves": ["c3d5", "e6d5", "c2c8", "f8c8"]
            }]
        }"#;
        let puzzle = parse_puzzle_json(body).unwrap();
        assert_eq!(puzzle.side_to_move, Color::White);
        assert_eq!(puzzle.moves.len(), 4);
        assert_eq!(puzzle.rating, Some(1683));
    }

    #[test]
    fn test_empty_response_is_error() {
        assert!(parse_puzzle_json(r#"{"puzzles": []}"#).is_err());
        assert!(parse_puzzle_json("not json").is_err());
    }
}
