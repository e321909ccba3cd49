use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dao::{
        game_store::WhoSaysStore,
        models::{GameEntity, GameOrder, GameQuery},
    },
    dto::{
        scores::{
            GameAnalysis, GameAnalysisResponse, HighScoresResponse, ScoreReport, ScoresResponse,
        },
        user::{RankingsResponse, UserRanking},
    },
    error::ServiceError,
    services::user_service::require_user,
    state::{SharedState, state_machine::GameStatus},
};

const SCORES_MISSING: &str = "Scores not found.";
const RANKINGS_MISSING: &str = "Rankings not found.";
const GAMES_MISSING: &str = "Games not found.";

/// Every won game.
pub async fn get_scores(state: &SharedState) -> Result<ScoresResponse, ServiceError> {
    let store = state.require_store().await?;
    let games = store
        .list_games(GameQuery::with_status(GameStatus::Won))
        .await?;
    let scores = score_reports(store.as_ref(), games).await?;
    Ok(ScoresResponse { scores })
}

/// Every game of one player, whatever its status.
pub async fn get_user_scores(
    state: &SharedState,
    user_name: &str,
) -> Result<ScoresResponse, ServiceError> {
    let store = state.require_store().await?;
    let user = require_user(store.as_ref(), user_name).await?;

    let games = store.list_games(GameQuery::for_user(user.id)).await?;
    if games.is_empty() {
        return Err(ServiceError::NotFound(SCORES_MISSING.into()));
    }

    let scores = games
        .into_iter()
        .map(|game| ScoreReport {
            user_name: user.name.clone(),
            status: game.status,
            points: game.points,
        })
        .collect();
    Ok(ScoresResponse { scores })
}

/// Won games, best first; `limit` of `None` or `0` returns all of them.
pub async fn get_high_scores(
    state: &SharedState,
    limit: Option<i64>,
) -> Result<HighScoresResponse, ServiceError> {
    let limit = match limit {
        None | Some(0) => None,
        Some(value) => Some(usize::try_from(value).map_err(|_| {
            ServiceError::InvalidInput("number_of_results must not be negative".into())
        })?),
    };

    let store = state.require_store().await?;
    let games = store
        .list_games(
            GameQuery::with_status(GameStatus::Won)
                .order(GameOrder::PointsDesc)
                .limit(limit),
        )
        .await?;
    let high_scores = score_reports(store.as_ref(), games).await?;
    Ok(HighScoresResponse { high_scores })
}

/// Players with points, best first and ties by name.
pub async fn get_user_rankings(state: &SharedState) -> Result<RankingsResponse, ServiceError> {
    let store = state.require_store().await?;
    let users = store.list_ranked_users().await?;
    if users.is_empty() {
        return Err(ServiceError::NotFound(RANKINGS_MISSING.into()));
    }

    Ok(RankingsResponse {
        rankings: users.into_iter().map(UserRanking::from).collect(),
    })
}

/// Hints bought and outcome of every game, grouped by player name.
pub async fn get_game_analysis(state: &SharedState) -> Result<GameAnalysisResponse, ServiceError> {
    let store = state.require_store().await?;
    let games = store.list_games(GameQuery::default()).await?;
    if games.is_empty() {
        return Err(ServiceError::NotFound(GAMES_MISSING.into()));
    }

    let names = owner_names(store.as_ref(), &games).await?;
    let mut analysis: Vec<(GameAnalysis, _)> = games
        .into_iter()
        .map(|game| {
            let entry = GameAnalysis {
                user_name: owner_name(&names, &game),
                sayer_category: game.sayer_category,
                hints_purchased: game.num_hints,
                game_status: game.status,
            };
            (entry, game.created_at)
        })
        .collect();
    analysis.sort_by(|(left, left_at), (right, right_at)| {
        left.user_name
            .cmp(&right.user_name)
            .then(left_at.cmp(right_at))
    });

    Ok(GameAnalysisResponse {
        analysis: analysis.into_iter().map(|(entry, _)| entry).collect(),
    })
}

async fn score_reports(
    store: &dyn WhoSaysStore,
    games: Vec<GameEntity>,
) -> Result<Vec<ScoreReport>, ServiceError> {
    if games.is_empty() {
        return Err(ServiceError::NotFound(SCORES_MISSING.into()));
    }

    let names = owner_names(store, &games).await?;
    Ok(games
        .iter()
        .map(|game| ScoreReport {
            user_name: owner_name(&names, game),
            status: game.status,
            points: game.points,
        })
        .collect())
}

async fn owner_names(
    store: &dyn WhoSaysStore,
    games: &[GameEntity],
) -> Result<HashMap<Uuid, String>, ServiceError> {
    let mut ids: Vec<Uuid> = games.iter().map(|game| game.user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let users = store.find_users(ids).await?;
    Ok(users.into_iter().map(|user| (user.id, user.name)).collect())
}

// Games never outlive their owner; an empty name only shows up on corrupted data.
fn owner_name(names: &HashMap<Uuid, String>, game: &GameEntity) -> String {
    names.get(&game.user_id).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::game::{MakeMoveRequest, NewGameRequest},
        services::{
            game_service::{cancel_game, make_move, new_game},
            testing::{SAYER, memory_state, seed_catalog, seed_user},
        },
        state::game::SayerCategory,
    };

    async fn play(state: &SharedState, user: &str, num_hints: i64, guess: &str) -> Uuid {
        let game = new_game(
            state,
            NewGameRequest {
                user_name: user.into(),
                sayer_category: SayerCategory::Actor,
                num_hints,
            },
        )
        .await
        .unwrap();
        make_move(
            state,
            game.game_id,
            MakeMoveRequest {
                guess: guess.into(),
            },
        )
        .await
        .unwrap();
        game.game_id
    }

    #[tokio::test]
    async fn empty_listings_are_not_found() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "alice", None).await;

        assert!(matches!(
            get_scores(&state).await,
            Err(ServiceError::NotFound(message)) if message == SCORES_MISSING
        ));
        assert!(matches!(
            get_user_scores(&state, "alice").await,
            Err(ServiceError::NotFound(message)) if message == SCORES_MISSING
        ));
        assert!(matches!(
            get_high_scores(&state, None).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            get_user_rankings(&state).await,
            Err(ServiceError::NotFound(message)) if message == RANKINGS_MISSING
        ));
        assert!(matches!(
            get_game_analysis(&state).await,
            Err(ServiceError::NotFound(message)) if message == GAMES_MISSING
        ));
    }

    #[tokio::test]
    async fn high_scores_are_sorted_and_limited() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "alice", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        for num_hints in [4, 0, 2, 5, 1] {
            play(&state, "alice", num_hints, SAYER).await;
        }
        play(&state, "alice", 3, "wrong").await;

        let all = get_high_scores(&state, Some(0)).await.unwrap();
        let points: Vec<u32> = all.high_scores.iter().map(|score| score.points).collect();
        assert_eq!(points, vec![85, 80, 72, 38, 4]);

        let top = get_high_scores(&state, Some(2)).await.unwrap();
        let points: Vec<u32> = top.high_scores.iter().map(|score| score.points).collect();
        assert_eq!(points, vec![85, 80]);
        assert!(top.high_scores.iter().all(|score| score.user_name == "alice"));

        assert!(matches!(
            get_high_scores(&state, Some(-1)).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn scores_cover_won_games_and_user_history() {
        let (state, store, _) = memory_state().await;
        seed_user(&store, "alice", None).await;
        seed_user(&store, "bob", None).await;
        seed_catalog(&store, SayerCategory::Actor).await;
        play(&state, "alice", 0, SAYER).await;
        play(&state, "bob", 1, "wrong").await;

        let scores = get_scores(&state).await.unwrap().scores;
        assert_eq!(
            scores,
            vec![ScoreReport {
                user_name: "alice".into(),
                status: GameStatus::Won,
                points: 85,
            }]
        );

        let bob = get_user_scores(&state, "bob").await.unwrap().scores;
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].status, GameStatus::Lost);

        assert!(matches!(
            get_user_scores(&state, "nobody").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rankings_and_analysis_order() {
        let (state, store, _) = memory_state().await;
        for name in ["zoe", "bob", "amy"] {
            seed_user(&store, name, None).await;
        }
        seed_catalog(&store, SayerCategory::Actor).await;
        play(&state, "zoe", 0, SAYER).await;
        play(&state, "bob", 0, SAYER).await;
        play(&state, "amy", 2, SAYER).await;
        let cancelled = new_game(
            &state,
            NewGameRequest {
                user_name: "amy".into(),
                sayer_category: SayerCategory::Actor,
                num_hints: 5,
            },
        )
        .await
        .unwrap();
        cancel_game(&state, cancelled.game_id).await.unwrap();

        let rankings = get_user_rankings(&state).await.unwrap().rankings;
        let order: Vec<(&str, u64)> = rankings
            .iter()
            .map(|ranking| (ranking.name.as_str(), ranking.points_earned))
            .collect();
        assert_eq!(order, vec![("bob", 85), ("zoe", 85), ("amy", 72)]);

        let analysis = get_game_analysis(&state).await.unwrap().analysis;
        let rows: Vec<(&str, u8, GameStatus)> = analysis
            .iter()
            .map(|row| (row.user_name.as_str(), row.hints_purchased, row.game_status))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("amy", 2, GameStatus::Won),
                ("amy", 5, GameStatus::Cancelled),
                ("bob", 0, GameStatus::Won),
                ("zoe", 0, GameStatus::Won),
            ]
        );
    }
}
