//! Game rules: sayer categories, the hint/reward table and hint formatting.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Largest number of hints a player may buy for a single game.
pub const MAX_HINTS: u8 = 5;
/// Separator used when a catalog entry's hints are persisted as one string.
pub const HINT_DELIMITER: &str = "^^";

/// Reward for a game, indexed by the number of hints bought.
const REWARD_TABLE: [u32; MAX_HINTS as usize + 1] = [85, 80, 72, 59, 38, 4];

/// Family of people a saying can be attributed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SayerCategory {
    /// Film and stage actors.
    #[default]
    Actor,
    /// Singers and musicians.
    Singer,
    /// Writers.
    Author,
    /// Business founders.
    Entrepreneur,
}

impl SayerCategory {
    /// Stored representation, matching the serde encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            SayerCategory::Actor => "ACTOR",
            SayerCategory::Singer => "SINGER",
            SayerCategory::Author => "AUTHOR",
            SayerCategory::Entrepreneur => "ENTREPRENEUR",
        }
    }
}

impl std::fmt::Display for SayerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a hint selection cannot be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    /// The requested count is outside `0..=MAX_HINTS`.
    #[error("Number of hints must be between 0 and 5")]
    OutOfRange {
        /// Count asked by the player.
        requested: i64,
    },
    /// The catalog entry does not carry enough hints.
    #[error("only {available} hint(s) available, {requested} requested")]
    NotEnoughHints {
        /// Count asked by the player.
        requested: u8,
        /// Hints stored on the catalog entry.
        available: usize,
    },
}

/// Validate a requested hint count and narrow it to `u8`.
pub fn checked_hint_count(requested: i64) -> Result<u8, HintError> {
    u8::try_from(requested)
        .ok()
        .filter(|count| *count <= MAX_HINTS)
        .ok_or(HintError::OutOfRange { requested })
}

/// Points awarded for a win after buying `num_hints` hints.
pub fn reward_points(num_hints: u8) -> Result<u32, HintError> {
    REWARD_TABLE
        .get(usize::from(num_hints))
        .copied()
        .ok_or(HintError::OutOfRange {
            requested: i64::from(num_hints),
        })
}

/// Render the hint at `position` through its fixed sentence template.
fn format_hint(position: usize, hint: &str) -> Option<String> {
    let sentence = match position {
        0 => format!("The year it was said: {hint}."),
        1 => format!("The genre or industry in which it was said: {hint}."),
        2 => format!("The sayer's gender: {hint}."),
        3 => format!("The medium in which it was said: {hint}."),
        4 => format!("The sayer's initials: {hint}."),
        _ => return None,
    };
    Some(sentence)
}

/// Turn the first `num_hints` catalog hints into player-facing sentences.
pub fn reveal_hints(catalog_hints: &[String], num_hints: u8) -> Result<Vec<String>, HintError> {
    if num_hints > MAX_HINTS {
        return Err(HintError::OutOfRange {
            requested: i64::from(num_hints),
        });
    }

    let requested = usize::from(num_hints);
    if catalog_hints.len() < requested {
        return Err(HintError::NotEnoughHints {
            requested: num_hints,
            available: catalog_hints.len(),
        });
    }

    Ok(catalog_hints
        .iter()
        .take(requested)
        .enumerate()
        .filter_map(|(position, hint)| format_hint(position, hint))
        .collect())
}

/// Split persisted hints back into an ordered list.
pub fn split_hints(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(HINT_DELIMITER).map(str::to_owned).collect()
}

/// Join hints into their persisted form.
pub fn join_hints(hints: &[String]) -> String {
    hints.join(HINT_DELIMITER)
}
