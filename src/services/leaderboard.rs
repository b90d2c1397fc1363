use crate::error::{AppError, Resource};
use crate::models::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::models::score::ScoreRecord;
use crate::store::{Directory, ScoreStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Builds ranked leaderboards from stored high scores.
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
    directory: Arc<dyn Directory>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn ScoreStore>, directory: Arc<dyn Directory>) -> Self {
        LeaderboardService { store, directory }
    }

    /// Leaderboard of `ranking_id`, best score first.
    ///
    /// `limit` cuts the list after ranks are assigned, so a truncated board
    /// carries the same ranks as the full one.
    #[instrument(level = "debug", skip(self))]
    pub fn get_leaderboard(
        &self,
        ranking_id: i64,
        limit: Option<usize>,
    ) -> Result<Leaderboard, AppError> {
        let ranking = self
            .directory
            .find_ranking(ranking_id)?
            .ok_or(AppError::NotFound(Resource::Ranking(ranking_id)))?;

        let records = self.store.list_scores(ranking_id)?;
        let user_ids: Vec<i64> = records.iter().map(|r| r.user_id).collect();
        let names = self.directory.user_names(&user_ids)?;

        let mut entries = rank_entries(records, &names)?;
        debug!(target = "leaderboard", ranking_id, entries = entries.len(), "leaderboard built");
        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(Leaderboard {
            ranking_id: ranking.id,
            ranking_name: ranking.name,
            entries,
        })
    }
}

/// Orders records by score descending, then user id ascending, and assigns
/// competition ranks: equal scores share a rank and the next distinct score
/// skips ahead (1, 2, 2, 4).
pub fn rank_entries(
    records: Vec<ScoreRecord>,
    names: &HashMap<i64, String>,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let mut rows = records
        .into_iter()
        .map(|record| match names.get(&record.user_id) {
            Some(name) => Ok((record, name.clone())),
            None => Err(AppError::StoreUnavailable(format!(
                "score of user {} in ranking {} has no matching user",
                record.user_id, record.ranking_id
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by(|(a, _), (b, _)| b.score.cmp(&a.score).then(a.user_id.cmp(&b.user_id)));

    let mut entries = Vec::with_capacity(rows.len());
    let mut rank = 0;
    let mut previous_score = None;
    for (position, (record, user_name)) in rows.into_iter().enumerate() {
        if previous_score != Some(record.score) {
            rank = position as i64 + 1;
            previous_score = Some(record.score);
        }
        entries.push(LeaderboardEntry {
            user_id: record.user_id,
            user_name,
            score: record.score,
            rank,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::services::high_score::ScoreUpsertService;
    use crate::test_support::{seed_ranking, seed_user};

    struct Fixture {
        db: Arc<Db>,
        scores: ScoreUpsertService,
        leaderboard: LeaderboardService,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Db::open_in_memory().unwrap());
        Fixture {
            scores: ScoreUpsertService::new(db.clone(), db.clone()),
            leaderboard: LeaderboardService::new(db.clone(), db.clone()),
            db,
        }
    }

    fn record(user_id: i64, score: i64) -> ScoreRecord {
        ScoreRecord {
            ranking_id: 1,
            user_id,
            score,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn summary(entries: &[LeaderboardEntry]) -> Vec<(&str, i64, i64)> {
        entries
            .iter()
            .map(|e| (e.user_name.as_str(), e.score, e.rank))
            .collect()
    }

    #[test]
    fn test_ties_share_rank_and_next_rank_skips() {
        let f = fixture();
        let ranking = seed_ranking(&f.db, "Stage 1");
        let a = seed_user(&f.db, "A");
        let b = seed_user(&f.db, "B");
        let c = seed_user(&f.db, "C");
        let d = seed_user(&f.db, "D");

        // Submit out of order so the result cannot depend on insertion order.
        for (user, score) in [(d, 50), (c, 80), (a, 100), (b, 80)] {
            f.scores.submit_score(ranking, user, score).unwrap();
        }

        let board = f.leaderboard.get_leaderboard(ranking, None).unwrap();
        assert_eq!(board.ranking_id, ranking);
        assert_eq!(board.ranking_name, "Stage 1");
        assert_eq!(
            summary(&board.entries),
            vec![("A", 100, 1), ("B", 80, 2), ("C", 80, 2), ("D", 50, 4)]
        );
    }

    #[test]
    fn test_tie_order_follows_user_id() {
        let names: HashMap<i64, String> =
            [(3, "x".to_string()), (7, "y".to_string()), (5, "z".to_string())]
                .into_iter()
                .collect();

        let entries = rank_entries(vec![record(7, 10), record(3, 10), record(5, 10)], &names).unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![3, 5, 7]);
        assert!(entries.iter().all(|e| e.rank == 1));
    }

    #[test]
    fn test_rank_counts_strictly_greater_scores() {
        let names: HashMap<i64, String> = (1..=6).map(|id| (id, format!("u{}", id))).collect();
        let records = vec![
            record(1, 5),
            record(2, 9),
            record(3, 9),
            record(4, 9),
            record(5, 1),
            record(6, 5),
        ];

        let entries = rank_entries(records, &names).unwrap();
        for entry in &entries {
            let greater = entries.iter().filter(|other| other.score > entry.score).count();
            assert_eq!(entry.rank, greater as i64 + 1);
        }
        let ranks: Vec<i64> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 1, 4, 4, 6]);
    }

    #[test]
    fn test_missing_user_name_fails_whole_board() {
        let names: HashMap<i64, String> = [(1, "one".to_string())].into_iter().collect();
        let result = rank_entries(vec![record(1, 10), record(2, 20)], &names);
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[test]
    fn test_empty_ranking_yields_empty_board() {
        let f = fixture();
        let ranking = seed_ranking(&f.db, "Stage 1");

        let board = f.leaderboard.get_leaderboard(ranking, None).unwrap();
        assert!(board.entries.is_empty());
    }

    #[test]
    fn test_unknown_ranking_is_not_found() {
        let f = fixture();
        let err = f.leaderboard.get_leaderboard(404, None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Ranking(404))));
    }

    #[test]
    fn test_one_entry_per_user_and_only_this_ranking() {
        let f = fixture();
        let stage1 = seed_ranking(&f.db, "Stage 1");
        let stage2 = seed_ranking(&f.db, "Stage 2");
        let alice = seed_user(&f.db, "alice");
        let bob = seed_user(&f.db, "bob");
        let carol = seed_user(&f.db, "carol");

        for score in [10, 40, 20] {
            f.scores.submit_score(stage1, alice, score).unwrap();
        }
        f.scores.submit_score(stage1, bob, 30).unwrap();
        f.scores.submit_score(stage2, carol, 99).unwrap();

        let board = f.leaderboard.get_leaderboard(stage1, None).unwrap();
        assert_eq!(summary(&board.entries), vec![("alice", 40, 1), ("bob", 30, 2)]);

        let other = f.leaderboard.get_leaderboard(stage2, None).unwrap();
        assert_eq!(summary(&other.entries), vec![("carol", 99, 1)]);
    }

    #[test]
    fn test_limit_keeps_ranks() {
        let f = fixture();
        let ranking = seed_ranking(&f.db, "Stage 1");
        for (name, score) in [("a", 30), ("b", 20), ("c", 20), ("d", 10)] {
            let user = seed_user(&f.db, name);
            f.scores.submit_score(ranking, user, score).unwrap();
        }

        let board = f.leaderboard.get_leaderboard(ranking, Some(3)).unwrap();
        assert_eq!(
            summary(&board.entries),
            vec![("a", 30, 1), ("b", 20, 2), ("c", 20, 2)]
        );
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let f = fixture();
        let ranking = seed_ranking(&f.db, "Stage 1");
        for name in ["p", "q", "r", "s"] {
            let user = seed_user(&f.db, name);
            f.scores.submit_score(ranking, user, 77).unwrap();
        }

        let first = f.leaderboard.get_leaderboard(ranking, None).unwrap();
        let second = f.leaderboard.get_leaderboard(ranking, None).unwrap();
        assert_eq!(first, second);
    }
}
