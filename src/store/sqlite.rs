use super::{Directory, ScoreStore, StoreError};
use crate::db::Db;
use crate::models::directory::Ranking;
use crate::models::score::{PutOutcome, ScoreRecord};
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;

/// Upper bound on bound parameters per `IN (...)` lookup.
const USER_NAME_BATCH: usize = 500;

const SELECT_SCORE: &str = "SELECT ranking_id, user_id, score, created_at, updated_at
     FROM user_scores WHERE ranking_id = ?1 AND user_id = ?2";

pub(crate) fn ranking_from_row(row: &Row<'_>) -> rusqlite::Result<Ranking> {
    Ok(Ranking {
        id: row.get(0)?,
        game_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn score_from_row(row: &Row<'_>) -> rusqlite::Result<ScoreRecord> {
    Ok(ScoreRecord {
        ranking_id: row.get(0)?,
        user_id: row.get(1)?,
        score: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl Directory for Db {
    fn find_ranking(&self, ranking_id: i64) -> Result<Option<Ranking>, StoreError> {
        Ok(self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, game_id, name, created_at, updated_at FROM rankings WHERE id = ?1",
                params![ranking_id],
                ranking_from_row,
            )
            .optional()
        })?)
    }

    fn ranking_exists(&self, ranking_id: i64) -> Result<bool, StoreError> {
        Ok(self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM rankings WHERE id = ?1)",
                params![ranking_id],
                |row| row.get(0),
            )
        })?)
    }

    fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                params![user_id],
                |row| row.get(0),
            )
        })?)
    }

    fn user_names(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>, StoreError> {
        let mut names = HashMap::with_capacity(user_ids.len());
        if user_ids.is_empty() {
            return Ok(names);
        }

        self.with_conn(|conn| {
            for chunk in user_ids.chunks(USER_NAME_BATCH) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!("SELECT id, name FROM users WHERE id IN ({})", placeholders);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (id, name) = row?;
                    names.insert(id, name);
                }
            }
            Ok(())
        })?;

        Ok(names)
    }
}

impl ScoreStore for Db {
    fn get_score(&self, ranking_id: i64, user_id: i64) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self.with_conn(|conn| {
            conn.query_row(SELECT_SCORE, params![ranking_id, user_id], score_from_row)
                .optional()
        })?)
    }

    fn put_score_if_greater(
        &self,
        ranking_id: i64,
        user_id: i64,
        score: i64,
    ) -> Result<(ScoreRecord, PutOutcome), StoreError> {
        let now = Utc::now().to_rfc3339();

        let written = self.with_conn(|conn| {
            // IMMEDIATE takes the write lock up front so a second process
            // cannot slip in between the insert attempt and the update.
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

            let inserted = tx.execute(
                "INSERT INTO user_scores (ranking_id, user_id, score, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT (ranking_id, user_id) DO NOTHING",
                params![ranking_id, user_id, score, now],
            )?;

            let outcome = if inserted == 1 {
                PutOutcome::Inserted
            } else {
                let raised = tx.execute(
                    "UPDATE user_scores SET score = ?3, updated_at = ?4
                     WHERE ranking_id = ?1 AND user_id = ?2 AND score < ?3",
                    params![ranking_id, user_id, score, now],
                )?;
                if raised == 1 {
                    PutOutcome::Raised
                } else {
                    PutOutcome::Kept
                }
            };

            let record = tx
                .query_row(SELECT_SCORE, params![ranking_id, user_id], score_from_row)
                .optional()?;
            if record.is_some() {
                tx.commit()?;
            }
            Ok(record.map(|record| (record, outcome)))
        })?;

        written.ok_or_else(|| {
            StoreError::Conflict(format!(
                "score row for user {} in ranking {} vanished mid-write",
                user_id, ranking_id
            ))
        })
    }

    fn list_scores(&self, ranking_id: i64) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ranking_id, user_id, score, created_at, updated_at
                 FROM user_scores WHERE ranking_id = ?1",
            )?;
            let rows = stmt.query_map(params![ranking_id], score_from_row)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_ranking, seed_user};

    #[test]
    fn test_first_put_inserts() {
        let db = Db::open_in_memory().unwrap();
        let ranking = seed_ranking(&db, "Stage 1");
        let user = seed_user(&db, "alice");

        let (record, outcome) = db.put_score_if_greater(ranking, user, 120).unwrap();
        assert_eq!(outcome, PutOutcome::Inserted);
        assert_eq!(record.score, 120);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(db.get_score(ranking, user).unwrap(), Some(record));
    }

    #[test]
    fn test_higher_put_raises_and_lower_put_keeps() {
        let db = Db::open_in_memory().unwrap();
        let ranking = seed_ranking(&db, "Stage 1");
        let user = seed_user(&db, "alice");

        let (first, _) = db.put_score_if_greater(ranking, user, 100).unwrap();

        let (raised, outcome) = db.put_score_if_greater(ranking, user, 150).unwrap();
        assert_eq!(outcome, PutOutcome::Raised);
        assert_eq!(raised.score, 150);
        assert_eq!(raised.created_at, first.created_at);

        let (kept, outcome) = db.put_score_if_greater(ranking, user, 90).unwrap();
        assert_eq!(outcome, PutOutcome::Kept);
        assert_eq!(kept, raised);

        let (equal, outcome) = db.put_score_if_greater(ranking, user, 150).unwrap();
        assert_eq!(outcome, PutOutcome::Kept);
        assert_eq!(equal.updated_at, raised.updated_at);
    }

    #[test]
    fn test_get_score_missing_is_none() {
        let db = Db::open_in_memory().unwrap();
        let ranking = seed_ranking(&db, "Stage 1");
        assert_eq!(db.get_score(ranking, 42).unwrap(), None);
    }

    #[test]
    fn test_list_scores_is_scoped_to_ranking() {
        let db = Db::open_in_memory().unwrap();
        let first = seed_ranking(&db, "Stage 1");
        let second = seed_ranking(&db, "Stage 2");
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");

        db.put_score_if_greater(first, alice, 10).unwrap();
        db.put_score_if_greater(first, bob, 20).unwrap();
        db.put_score_if_greater(second, alice, 30).unwrap();

        let mut users: Vec<i64> = db
            .list_scores(first)
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        users.sort();
        assert_eq!(users, vec![alice, bob]);
        assert_eq!(db.list_scores(second).unwrap().len(), 1);
    }

    #[test]
    fn test_user_names_spans_several_batches() {
        let db = Db::open_in_memory().unwrap();
        let ids: Vec<i64> = (0..USER_NAME_BATCH + 25)
            .map(|i| seed_user(&db, &format!("player-{}", i)))
            .collect();

        let names = db.user_names(&ids).unwrap();
        assert_eq!(names.len(), ids.len());
        assert_eq!(names[&ids[0]], "player-0");
        assert_eq!(names[&ids[USER_NAME_BATCH]], format!("player-{}", USER_NAME_BATCH));
    }

    #[test]
    fn test_user_names_skips_unknown_ids() {
        let db = Db::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");

        let names = db.user_names(&[alice, 9999]).unwrap();
        assert_eq!(names.len(), 1);
        assert!(db.user_names(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_existence_checks() {
        let db = Db::open_in_memory().unwrap();
        let ranking = seed_ranking(&db, "Stage 1");
        let user = seed_user(&db, "alice");

        assert!(db.ranking_exists(ranking).unwrap());
        assert!(!db.ranking_exists(ranking + 1).unwrap());
        assert!(db.user_exists(user).unwrap());
        assert!(!db.user_exists(user + 1).unwrap());
        assert_eq!(db.find_ranking(ranking).unwrap().unwrap().name, "Stage 1");
    }
}
