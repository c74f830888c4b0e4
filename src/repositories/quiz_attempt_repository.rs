use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::QuizAttempt};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn find_by_session(&self, session_id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn list_recent(&self, offset: i64, limit: i64) -> AppResult<(Vec<QuizAttempt>, i64)>;
    async fn ping(&self) -> AppResult<()>;
}

pub struct MongoQuizAttemptRepository {
    db: Database,
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self {
            db: db.clone(),
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let session_index = IndexModel::builder()
            .keys(doc! { "session_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("session_id_unique".to_string())
                    .build(),
            )
            .build();

        let submitted_at_index = IndexModel::builder()
            .keys(doc! { "submitted_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("submitted_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(session_index).await?;
        self.collection.create_index(submitted_at_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_by_session(&self, session_id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! { "session_id": session_id })
            .await?;
        Ok(attempt)
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let total = self.collection.count_documents(doc! {}).await?;

        let attempts = self
            .collection
            .find(doc! {})
            .skip(offset.max(0) as u64)
            .limit(limit)
            .sort(doc! { "submitted_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}
