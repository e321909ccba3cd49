/// Average points cache refresh and lookup.
pub mod average_service;
/// Catalog import.
pub mod catalog_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle: creation, guesses and cancellation.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background job queue and schedules.
pub mod jobs;
/// Outgoing email delivery.
pub mod mailer;
/// Reminder emails for unfinished games.
pub mod reminder_service;
/// Read-only score, ranking and analysis queries.
pub mod score_service;
/// Storage connection supervision and degraded mode handling.
pub mod storage_supervisor;
/// User registration.
pub mod user_service;

#[cfg(test)]
mod testing;
