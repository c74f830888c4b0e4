use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

const APP_NAME: &str = "quiz-proctor";

/// Handle on the attempts database. Cheap to clone; the driver pools connections.
#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

/// Driver options for `config`: pool bounds and timeouts come from the environment.
pub async fn client_options(config: &Config) -> AppResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;

    options.app_name = Some(APP_NAME.to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    options.max_pool_size = Some(config.mongo_max_pool_size);
    options.min_pool_size = Some(config.mongo_min_pool_size);
    options.connect_timeout = Some(config.mongo_connect_timeout());
    options.server_selection_timeout = Some(config.mongo_connect_timeout());

    Ok(options)
}

impl Database {
    /// Connects and fails fast if the server does not answer a ping.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let client = Client::with_options(client_options(config).await?)?;
        let db = Self {
            client,
            db_name: config.mongo_db_name.clone(),
        };

        db.health_check().await?;
        log::info!(
            "Connected to MongoDB database '{}' (pool {}..={})",
            db.db_name,
            config.mongo_min_pool_size,
            config.mongo_max_pool_size
        );

        Ok(db)
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn client_options_follow_config() {
        let mut config = Config::test_config();
        config.mongo_max_pool_size = 7;
        config.mongo_min_pool_size = 3;
        config.mongo_connect_timeout_seconds = 9;

        let options = client_options(&config).await.unwrap();

        assert_eq!(options.max_pool_size, Some(7));
        assert_eq!(options.min_pool_size, Some(3));
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(9)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(9)));
        assert_eq!(options.app_name.as_deref(), Some(APP_NAME));
        assert!(options.server_api.is_some());
    }

    #[tokio::test]
    async fn malformed_connection_string_is_a_database_error() {
        let mut config = Config::test_config();
        config.mongo_conn_string = "not-a-mongo-uri".to_string();

        let err = client_options(&config).await.unwrap_err();

        assert!(matches!(err, crate::errors::AppError::DatabaseError(_)));
    }
}
