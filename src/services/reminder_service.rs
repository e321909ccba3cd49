use std::collections::HashSet;

use tracing::{info, warn};

use crate::{
    dao::models::GameQuery,
    error::ServiceError,
    services::mailer::Email,
    state::{SharedState, state_machine::GameStatus},
};

const REMINDER_SUBJECT: &str = "'Who Says' game reminder!";

/// Email every player holding an address and at least one unfinished game.
///
/// Returns the number of emails handed to the mailer. A failed send is logged
/// and does not stop the run.
pub async fn send_reminders(state: &SharedState) -> Result<usize, ServiceError> {
    let store = state.require_store().await?;

    let pending_owners: HashSet<_> = store
        .list_games(GameQuery::with_status(GameStatus::New))
        .await?
        .into_iter()
        .map(|game| game.user_id)
        .collect();
    if pending_owners.is_empty() {
        return Ok(0);
    }

    let sender = state.config().sender_email.clone();
    let mut sent = 0;
    for user in store.list_users_with_email().await? {
        if !pending_owners.contains(&user.id) {
            continue;
        }
        let Some(address) = user.reminder_address() else {
            continue;
        };

        let email = Email {
            from: sender.clone(),
            to: address.to_owned(),
            subject: REMINDER_SUBJECT.into(),
            body: format!(
                "Hello {}, you have one or more unfinished 'Who Says' games!",
                user.name
            ),
        };
        match state.mailer().send(email).await {
            Ok(()) => sent += 1,
            Err(err) => warn!(user = %user.name, error = %err, "failed to send reminder"),
        }
    }

    info!(sent, candidates = pending_owners.len(), "reminders sent");
    Ok(sent)
}
