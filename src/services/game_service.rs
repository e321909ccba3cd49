use std::{
    future::Future,
    time::{Duration, SystemTime},
};

use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::WinRetryPolicy,
    dao::{
        game_store::WhoSaysStore,
        models::{GameEntity, GameQuery, UserEntity},
        storage::StorageResult,
    },
    dto::{
        common::MessageResponse,
        game::{GameListResponse, GameSnapshot, MakeMoveRequest, NewGameRequest},
    },
    error::ServiceError,
    services::{jobs::Job, user_service::require_user},
    state::{
        SharedState,
        game::{checked_hint_count, reveal_hints, reward_points},
        state_machine::{GameEvent, GameStatus},
    },
};

const MAX_WIN_RETRY_DELAY: Duration = Duration::from_secs(1);

const GAME_STARTED: &str = "Good luck playing Who Says!";
const GAME_PENDING: &str = "Time to take a guess!";
const GAME_IN_PROGRESS: &str = "Game in progress.";
const GAME_OVER: &str = "Game already over!";
const GAME_WON: &str = "You win!";
const GAME_LOST: &str = "You lost.";
const GAME_CANCELLED: &str = "Game cancelled!";
const GAME_NOT_CANCELLABLE: &str = "Game already over or cancelled.";
const GAME_MISSING: &str = "Game not found!";
const NO_GAMES_IN_PROGRESS: &str = "There are no user games in progress.";

/// Start a game for a registered player, buying the requested hints up front.
pub async fn new_game(
    state: &SharedState,
    request: NewGameRequest,
) -> Result<GameSnapshot, ServiceError> {
    let store = state.require_store().await?;

    let user = require_user(store.as_ref(), &request.user_name).await?;
    let num_hints = checked_hint_count(request.num_hints)?;
    let category = request.sayer_category;

    let Some(entry) = store.find_catalog_entry(category).await? else {
        return Err(ServiceError::NotFound(format!(
            "Sayer category {category} not found."
        )));
    };

    let hints = reveal_hints(&entry.hint_list(), num_hints)?;
    let points = reward_points(num_hints)?;
    let now = SystemTime::now();
    let game = GameEntity {
        id: Uuid::new_v4(),
        user_id: user.id,
        sayer: entry.sayer,
        saying: entry.saying,
        sayer_category: category,
        status: GameStatus::New,
        num_hints,
        hints,
        points,
        created_at: now,
        updated_at: now,
    };

    store.insert_game(game.clone()).await?;
    info!(game_id = %game.id, user = %user.name, %category, num_hints, points, "game started");

    Ok(GameSnapshot::new(&game, &user.name, GAME_STARTED))
}

/// Current view of a game.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSnapshot, ServiceError> {
    let store = state.require_store().await?;
    let game = require_game(store.as_ref(), id).await?;
    let owner = require_owner(store.as_ref(), &game).await?;
    Ok(GameSnapshot::new(&game, &owner.name, GAME_PENDING))
}

/// Submit a guess; the game ends whatever the outcome.
///
/// A correct guess flips the game to WON and credits its owner in one storage
/// transaction. Losing the race against another guess or a cancellation
/// answers with the game as it now stands.
pub async fn make_move(
    state: &SharedState,
    id: Uuid,
    request: MakeMoveRequest,
) -> Result<GameSnapshot, ServiceError> {
    let store = state.require_store().await?;
    let game = require_game(store.as_ref(), id).await?;
    let owner = require_owner(store.as_ref(), &game).await?;

    if game.status.is_terminal() {
        return Ok(GameSnapshot::new(&game, &owner.name, GAME_OVER));
    }

    let event = if request.guess == game.sayer {
        GameEvent::CorrectGuess
    } else {
        GameEvent::WrongGuess
    };
    let target = game.status.apply(event)?;

    let updated = if target == GameStatus::Won {
        let policy = state.config().win_retry;
        retry_on_contention(id, policy, || store.record_win(id)).await?
    } else {
        store.transition_game(id, game.status, target).await?
    };

    let Some(updated) = updated else {
        let current = require_game(store.as_ref(), id).await?;
        info!(game_id = %id, status = %current.status, "guess arrived after the game ended");
        return Ok(GameSnapshot::new(&current, &owner.name, GAME_OVER));
    };

    let message = match updated.status {
        GameStatus::Won => {
            info!(game_id = %id, user = %owner.name, points = updated.points, "game won");
            state.jobs().enqueue(Job::RefreshAveragePoints);
            GAME_WON
        }
        _ => {
            info!(game_id = %id, user = %owner.name, "game lost");
            GAME_LOST
        }
    };

    Ok(GameSnapshot::new(&updated, &owner.name, message))
}

/// Give up on a game that is still waiting for a guess.
pub async fn cancel_game(state: &SharedState, id: Uuid) -> Result<MessageResponse, ServiceError> {
    let store = state.require_store().await?;
    let game = require_game(store.as_ref(), id).await?;

    let Ok(target) = game.status.apply(GameEvent::Cancel) else {
        return Ok(MessageResponse::new(GAME_NOT_CANCELLABLE));
    };

    match store.transition_game(id, game.status, target).await? {
        Some(_) => {
            info!(game_id = %id, "game cancelled");
            Ok(MessageResponse::new(GAME_CANCELLED))
        }
        None => Ok(MessageResponse::new(GAME_NOT_CANCELLABLE)),
    }
}

/// Games of a player still waiting for a guess.
pub async fn get_user_games(
    state: &SharedState,
    user_name: &str,
) -> Result<GameListResponse, ServiceError> {
    let store = state.require_store().await?;
    let user = require_user(store.as_ref(), user_name).await?;

    let games = store
        .list_games(GameQuery::for_user(user.id).status(GameStatus::New))
        .await?;
    if games.is_empty() {
        return Err(ServiceError::NotFound(NO_GAMES_IN_PROGRESS.into()));
    }

    Ok(GameListResponse {
        games: games
            .iter()
            .map(|game| GameSnapshot::new(game, &user.name, GAME_IN_PROGRESS))
            .collect(),
    })
}

async fn require_game(store: &dyn WhoSaysStore, id: Uuid) -> Result<GameEntity, ServiceError> {
    store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(GAME_MISSING.into()))
}

async fn require_owner(
    store: &dyn WhoSaysStore,
    game: &GameEntity,
) -> Result<UserEntity, ServiceError> {
    store.find_user(game.user_id).await?.ok_or_else(|| {
        ServiceError::InvalidState(format!(
            "owner `{}` of game `{}` is missing",
            game.user_id, game.id
        ))
    })
}

/// Run `attempt` until it stops failing with contention or the policy is exhausted.
async fn retry_on_contention<T, F, Fut>(
    id: Uuid,
    policy: WinRetryPolicy,
    mut attempt: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut delay = policy.initial_delay;
    let mut tries = 1;

    loop {
        match attempt().await {
            Err(err) if err.is_transient() && tries < policy.attempts => {
                warn!(game_id = %id, attempt = tries, error = %err, "win transaction contended; retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_WIN_RETRY_DELAY);
                tries += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    warn!(game_id = %id, attempts = tries, "win transaction still contended; giving up");
                }
                return Err(err.into());
            }
            Ok(value) => return Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;
    use crate::{
        dao::storage::StorageError,
        services::testing::{SAYER, memory_state, seed_catalog, seed_user},
        state::game::SayerCategory,
    };

    fn new_game_request(user_name: &str, num_hints: i64) -> NewGameRequest {
        NewGameRequest {
            user_name: user_name.into(),
            sayer_category: SayerCategory::Actor,
            num_hints,
        }
    }

    fn guess(value: &str) -> MakeMoveRequest {
        MakeMoveRequest {
            guess: value.into(),
        }
    }

    async fn points_of(store: &dyn WhoSaysStore, name: &str) -> u64 {
        require_user(store, name).await.unwrap().points_earned
    }

    #[tokio::test]
    async fn only_a_win_queues_an_average_refresh() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "Alice", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        let mut jobs = state.jobs().take_receiver().await.unwrap();

        let lost = new_game(&state, new_game_request("Alice", 0)).await.unwrap();
        make_move(&state, lost.game_id, guess("nobody")).await.unwrap();
        assert!(jobs.try_recv().is_err());

        let won = new_game(&state, new_game_request("Alice", 0)).await.unwrap();
        make_move(&state, won.game_id, guess(SAYER)).await.unwrap();
        assert_eq!(jobs.try_recv(), Ok(Job::RefreshAveragePoints));

        make_move(&state, won.game_id, guess(SAYER)).await.unwrap();
        assert!(jobs.try_recv().is_err());
    }

    #[tokio::test]
    async fn alice_wins_with_two_hints() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "Alice", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;

        let started = new_game(&state, new_game_request("Alice", 2)).await.unwrap();
        assert_eq!(started.points_possible, 72);
        assert_eq!(started.status, GameStatus::New);
        assert_eq!(started.message, GAME_STARTED);
        assert_eq!(
            started.hints,
            "The year it was said: 1999. The genre or industry in which it was said: Film."
        );

        let pending = get_game(&state, started.game_id).await.unwrap();
        assert_eq!(pending.message, GAME_PENDING);

        let won = make_move(&state, started.game_id, guess(SAYER))
            .await
            .unwrap();
        assert_eq!(won.status, GameStatus::Won);
        assert_eq!(won.message, GAME_WON);
        assert_eq!(points_of(&store, "Alice").await, 72);
    }

    #[tokio::test]
    async fn terminal_games_ignore_further_guesses() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "bob", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        let game = new_game(&state, new_game_request("bob", 0)).await.unwrap();

        let lost = make_move(&state, game.game_id, guess("keanu reeves"))
            .await
            .unwrap();
        assert_eq!(lost.status, GameStatus::Lost);
        assert_eq!(lost.message, GAME_LOST);

        let again = make_move(&state, game.game_id, guess(SAYER))
            .await
            .unwrap();
        assert_eq!(again.status, GameStatus::Lost);
        assert_eq!(again.message, GAME_OVER);
        assert_eq!(points_of(&store, "bob").await, 0);
    }

    #[tokio::test]
    async fn new_game_rejects_bad_requests() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "carol", None).await;

        let err = new_game(&state, new_game_request("nobody", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = new_game(&state, new_game_request("carol", 6))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::InvalidInput(message) if message == "Number of hints must be between 0 and 5")
        );

        let err = new_game(&state, new_game_request("carol", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancellation_only_applies_to_new_games() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "dave", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        let game = new_game(&state, new_game_request("dave", 1)).await.unwrap();

        let first = cancel_game(&state, game.game_id).await.unwrap();
        assert_eq!(first.message, GAME_CANCELLED);
        let second = cancel_game(&state, game.game_id).await.unwrap();
        assert_eq!(second.message, GAME_NOT_CANCELLABLE);

        let after = make_move(&state, game.game_id, guess(SAYER))
            .await
            .unwrap();
        assert_eq!(after.status, GameStatus::Cancelled);
        assert_eq!(after.message, GAME_OVER);

        let err = cancel_game(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(message) if message == GAME_MISSING));
    }

    #[tokio::test]
    async fn user_games_lists_only_games_in_progress() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "erin", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;

        let err = get_user_games(&state, "erin").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(message) if message == NO_GAMES_IN_PROGRESS));

        let open = new_game(&state, new_game_request("erin", 0)).await.unwrap();
        let finished = new_game(&state, new_game_request("erin", 0)).await.unwrap();
        make_move(&state, finished.game_id, guess("nope"))
            .await
            .unwrap();

        let listed = get_user_games(&state, "erin").await.unwrap();
        assert_eq!(listed.games.len(), 1);
        assert_eq!(listed.games[0].game_id, open.game_id);
        assert_eq!(listed.games[0].message, GAME_IN_PROGRESS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_correct_guesses_credit_once() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "frank", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        let game_id = new_game(&state, new_game_request("frank", 3))
            .await
            .unwrap()
            .game_id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move { make_move(&state, game_id, guess(SAYER)).await })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            let snapshot = handle.await.unwrap().unwrap();
            assert_eq!(snapshot.status, GameStatus::Won);
            if snapshot.message == GAME_WON {
                wins += 1;
            } else {
                assert_eq!(snapshot.message, GAME_OVER);
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(points_of(&store, "frank").await, 59);
    }

    #[tokio::test]
    async fn contention_is_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = WinRetryPolicy {
            attempts: 5,
            initial_delay: Duration::from_millis(1),
        };

        let counter = calls.clone();
        let result = retry_on_contention(Uuid::nil(), policy, move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StorageError::Contention {
                        message: "write conflict".into(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn contention_gives_up_after_configured_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = WinRetryPolicy {
            attempts: 3,
            initial_delay: Duration::from_millis(1),
        };

        let counter = calls.clone();
        let err = retry_on_contention::<(), _, _>(Uuid::nil(), policy, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StorageError::Contention {
                    message: "write conflict".into(),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Contention(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
