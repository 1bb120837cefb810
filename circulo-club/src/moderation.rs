use std::sync::Arc;

use log::info;

use crate::{Database, DatabaseError, PrimaryKey, SuggestionStatus};

/// Bulk administrative commands over reader-submitted suggestions
pub struct Moderation<Db> {
    db: Arc<Db>,
}

impl<Db> Moderation<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Approves the pending suggestions among `ids`, returning how many
    /// actually moved. Already-resolved suggestions are left untouched.
    pub async fn approve(&self, ids: &[PrimaryKey]) -> Result<u64, DatabaseError> {
        let moved = self
            .db
            .resolve_suggestions(ids, SuggestionStatus::Approved)
            .await?;

        info!("{moved} sugerencias aprobadas");

        Ok(moved)
    }

    /// Rejects the pending suggestions among `ids`, returning how many
    /// actually moved
    pub async fn reject(&self, ids: &[PrimaryKey]) -> Result<u64, DatabaseError> {
        let moved = self
            .db
            .resolve_suggestions(ids, SuggestionStatus::Rejected)
            .await?;

        info!("{moved} sugerencias rechazadas");

        Ok(moved)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{NewSuggestion, SqliteDatabase};

    async fn seed(db: &SqliteDatabase, title: &str) -> PrimaryKey {
        db.create_suggestion(NewSuggestion {
            title: title.to_string(),
            author: "Autora".to_string(),
            suggested_by_name: "Lector".to_string(),
            suggested_by_email: "lector@example.com".to_string(),
            reason: "Porque sí".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_only_pending_suggestions_move() {
        let db = Arc::new(SqliteDatabase::in_memory().await.expect("database opens"));
        let moderation = Moderation::new(&db);

        let first = seed(&db, "Primera").await;
        let second = seed(&db, "Segunda").await;
        let third = seed(&db, "Tercera").await;

        let approved = moderation.approve(&[first, second]).await.unwrap();
        assert_eq!(approved, 2);

        // Re-approving includes an already resolved id, which must not count
        let approved = moderation.approve(&[first, third]).await.unwrap();
        assert_eq!(approved, 1);

        // Rejection does not move resolved suggestions either
        let rejected = moderation.reject(&[first, second, third]).await.unwrap();
        assert_eq!(rejected, 0);

        assert_eq!(moderation.approve(&[]).await.unwrap(), 0);

        let pending = db
            .list_suggestions(Some(SuggestionStatus::Pending))
            .await
            .unwrap();
        assert!(pending.is_empty());
    }
}
