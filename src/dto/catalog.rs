use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::validation::validate_hints, state::game::SayerCategory};

/// Catalog record imported by an administrator.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCatalogEntryRequest {
    /// Category the entry is drawn for.
    pub sayer_category: SayerCategory,
    /// Expected answer; guesses must match it exactly.
    #[validate(length(min = 1))]
    pub sayer: String,
    /// Prompt shown to the player.
    #[validate(length(min = 1))]
    pub saying: String,
    /// Hints in reveal order: year, genre or industry, gender, medium, initials.
    #[serde(default)]
    #[validate(custom(function = "validate_hints"))]
    pub hints: Vec<String>,
}
