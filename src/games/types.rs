use crate::errors::ConfigurationError;
use crate::games::code::CodeGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Number of balls in a standard 75-ball game
pub const BALL_COUNT: usize = 75;

/// Seconds between draws when the request does not say otherwise
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Column letter of a bingo ball
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BingoLetter {
    B,
    I,
    N,
    G,
    O,
}

impl BingoLetter {
    /// Column for a ball number: 1-15 B, 16-30 I, 31-45 N, 46-60 G, 61-75 O
    pub fn for_number(number: u8) -> Option<Self> {
        match number {
            1..=15 => Some(BingoLetter::B),
            16..=30 => Some(BingoLetter::I),
            31..=45 => Some(BingoLetter::N),
            46..=60 => Some(BingoLetter::G),
            61..=75 => Some(BingoLetter::O),
            _ => None,
        }
    }
}

impl fmt::Display for BingoLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            BingoLetter::B => "B",
            BingoLetter::I => "I",
            BingoLetter::N => "N",
            BingoLetter::G => "G",
            BingoLetter::O => "O",
        };
        f.write_str(letter)
    }
}

/// A single labeled ball
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawItem {
    number: u8,
    letter: BingoLetter,
    label: String,
}

impl DrawItem {
    /// Ball for `number`, or `None` outside 1..=75
    pub fn new(number: u8) -> Option<Self> {
        let letter = BingoLetter::for_number(number)?;
        Some(Self {
            number,
            letter,
            label: format!("{}{}", letter, number),
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn letter(&self) -> BingoLetter {
        self.letter
    }

    /// Letter and number, e.g. "B7"
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A ball together with its 1-based position in the draw
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawnBall {
    pub item: DrawItem,
    pub position: usize,
}

impl DrawnBall {
    /// Summary line, e.g. "B7 (3/75)"
    pub fn summary_label(&self) -> String {
        format!("{} ({}/{})", self.item.label(), self.position, BALL_COUNT)
    }
}

/// Draws performed so far, in draw order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawResult {
    draws: Vec<DrawnBall>,
}

impl DrawResult {
    pub fn new() -> Self {
        Self {
            draws: Vec::with_capacity(BALL_COUNT),
        }
    }

    pub fn record(&mut self, item: DrawItem, position: usize) {
        self.draws.push(DrawnBall { item, position });
    }

    pub fn draws(&self) -> &[DrawnBall] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn summary_labels(&self) -> Vec<String> {
        self.draws.iter().map(DrawnBall::summary_label).collect()
    }
}

/// Start request parameters as received from the HTTP layer.
///
/// Every field is kept as raw JSON so that one badly typed value does not
/// reject the others; resolution into a [`GameConfig`] applies the defaults
/// field by field. `code` is the English spelling of `codigo`, which wins
/// when both are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_in: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervalo: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeracion: Option<serde_json::Value>,
}

impl GameParams {
    /// Decode params from a JSON document.
    ///
    /// Anything that is not a JSON object with the expected field types
    /// yields empty params, so the game still starts with defaults.
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return GameParams::default();
        }
        match serde_json::from_str::<GameParams>(raw) {
            Ok(params) => params,
            Err(e) => {
                warn!("Could not parse game parameters ({}), using defaults", e);
                GameParams::default()
            }
        }
    }
}

/// Immutable configuration of one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub code: String,
    pub start_in_minutes: u32,
    pub interval_secs: u64,
    pub custom_sequence: Option<String>,
}

impl GameConfig {
    /// Resolve request params, falling back to defaults on invalid values
    pub fn from_params(params: &GameParams, codes: &dyn CodeGenerator) -> Self {
        let requested = [("codigo", &params.codigo), ("code", &params.code)]
            .into_iter()
            .find_map(|(field, value)| value.as_ref().and_then(|v| json_code(field, v)));
        let code = match requested {
            Some(code) => code,
            None => {
                let code = codes.generate();
                info!("Generated game code: {}", code);
                code
            }
        };

        let start_in_minutes = match params.start_in.as_ref().map(parse_start_in) {
            None => 0,
            Some(Ok(minutes)) => {
                info!("Start delay configured: {} minutes", minutes);
                minutes
            }
            Some(Err(e)) => {
                warn!("{}; using 0", e);
                0
            }
        };

        let interval_secs = match params.intervalo.as_ref().map(parse_interval) {
            None => DEFAULT_INTERVAL_SECS,
            Some(Ok(secs)) => secs,
            Some(Err(e)) => {
                warn!("{}; using {} seconds", e, DEFAULT_INTERVAL_SECS);
                DEFAULT_INTERVAL_SECS
            }
        };

        let custom_sequence = match &params.numeracion {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(raw)) if raw.is_empty() => None,
            Some(serde_json::Value::String(raw)) => Some(raw.clone()),
            Some(other) => {
                let e = ConfigurationError::invalid_value(
                    "numeracion",
                    other,
                    "expected a comma-separated string",
                );
                warn!("{}; using a shuffled standard sequence", e);
                None
            }
        };

        Self {
            code,
            start_in_minutes,
            interval_secs,
            custom_sequence,
        }
    }
}

fn parse_start_in(value: &serde_json::Value) -> Result<u32, ConfigurationError> {
    let minutes = json_integer(value)
        .ok_or_else(|| ConfigurationError::invalid_value("start_in", value, "not a number"))?;
    u32::try_from(minutes).map_err(|_| {
        ConfigurationError::invalid_value("start_in", value, "must be a non-negative number")
    })
}

fn parse_interval(value: &serde_json::Value) -> Result<u64, ConfigurationError> {
    let secs = json_integer(value)
        .ok_or_else(|| ConfigurationError::invalid_value("intervalo", value, "not a number"))?;
    match u64::try_from(secs) {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigurationError::invalid_value(
            "intervalo",
            value,
            "must be a positive number",
        )),
    }
}

/// Game code from a JSON string or number; other values are skipped
fn json_code(field: &str, value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => {
            let e = ConfigurationError::invalid_value(field, other, "expected a string or number");
            warn!("{}; ignoring it", e);
            None
        }
    }
}

/// Integer value of a JSON number or numeric string
fn json_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Parse the integer prefix of `raw`, ignoring leading whitespace.
///
/// `"12"` and `"12abc"` both give 12; `"abc"` and `""` give `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Final report of a completed game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub status: String,
    pub message: String,
    pub code: String,
    pub start_in_minutes: u32,
    pub interval_seconds: u64,
    pub sink_endpoint: String,
    pub total_drawn: usize,
    pub drawn_labels: Vec<String>,
}
