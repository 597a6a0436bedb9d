//! PostgreSQL store
//!
//! Conversations and customer-agent links persisted through `sqlx`.
//! The optimistic compare-and-swap is a single
//! `UPDATE ... WHERE id = $1 AND version = $2` statement; zero affected rows
//! means another writer got there first.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::{ConversationStore, StoreError, Version, VersionedStore};
use crate::shared::{
    Conversation, ConversationChanges, ConversationFilter, CustAgent, NewConversation,
    INITIAL_VERSION,
};

const MAX_CONNECTIONS: u32 = 10;

/// Conversation columns joined with their customer-agent link.
/// Every query that yields conversations selects exactly these.
const CONVERSATION_COLUMNS: &str = r#"
    c.id, c.cust_agent_id, ca.customer_id, ca.agent_id, c.time_date, c.duration,
    c.exchange, c.transcript, c.file, c.version, c.created_at, c.updated_at
"#;

/// Conversation store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool. Migrations are not run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        tracing::info!("Database connection pool created successfully");

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Run pending migrations from `migrations/`
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("Database migrations completed successfully");
        Ok(())
    }
}

fn conversation_from_row(row: &PgRow) -> Result<Conversation, sqlx::Error> {
    Ok(Conversation {
        id: row.try_get("id")?,
        cust_agent_id: row.try_get("cust_agent_id")?,
        customer_id: row.try_get("customer_id")?,
        agent_id: row.try_get("agent_id")?,
        time_date: row.try_get("time_date")?,
        duration: row.try_get("duration")?,
        exchange: row.try_get("exchange")?,
        transcript: row.try_get("transcript")?,
        file: row.try_get("file")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn cust_agent_from_row(row: &PgRow) -> Result<CustAgent, sqlx::Error> {
    Ok(CustAgent {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        agent_id: row.try_get("agent_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl VersionedStore for PgStore {
    type Id = Uuid;
    type Changes = ConversationChanges;
    type Record = Conversation;

    async fn read_version(&self, id: &Uuid) -> Result<Option<Version>, StoreError> {
        let version = sqlx::query_scalar::<_, i64>("SELECT version FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(version)
    }

    async fn update_if_version(
        &self,
        id: &Uuid,
        expected: Version,
        changes: &ConversationChanges,
    ) -> Result<Option<Conversation>, StoreError> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE conversations
                SET time_date = COALESCE($3, time_date),
                    duration = COALESCE($4, duration),
                    exchange = COALESCE($5, exchange),
                    transcript = COALESCE($6, transcript),
                    file = COALESCE($7, file),
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $1 AND version = $2
                RETURNING *
            )
            SELECT {CONVERSATION_COLUMNS}
            FROM c
            JOIN cust_agents ca ON ca.id = c.cust_agent_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(expected)
            .bind(changes.time_date)
            .bind(changes.duration)
            .bind(changes.exchange.as_deref())
            .bind(changes.transcript.as_deref())
            .bind(changes.file.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(conversation_from_row).transpose()?)
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn link_cust_agent(
        &self,
        customer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<CustAgent, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO cust_agents (id, customer_id, agent_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id, agent_id) DO UPDATE SET customer_id = EXCLUDED.customer_id
            RETURNING id, customer_id, agent_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(agent_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(cust_agent_from_row(&row)?)
    }

    async fn get_cust_agent(&self, id: Uuid) -> Result<Option<CustAgent>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, agent_id, created_at
            FROM cust_agents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(cust_agent_from_row).transpose()?)
    }

    async fn create_conversation(
        &self,
        link: &CustAgent,
        input: NewConversation,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(link, input, Utc::now());

        // Return the row as stored so timestamps carry the column precision
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO conversations
                    (id, cust_agent_id, time_date, duration, exchange, transcript, file, version, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            SELECT {CONVERSATION_COLUMNS}
            FROM c
            JOIN cust_agents ca ON ca.id = c.cust_agent_id
            "#
        );
        let row = sqlx::query(&sql)
            .bind(conversation.id)
            .bind(conversation.cust_agent_id)
            .bind(conversation.time_date)
            .bind(conversation.duration)
            .bind(&conversation.exchange)
            .bind(conversation.transcript.as_deref())
            .bind(conversation.file.as_deref())
            .bind(INITIAL_VERSION)
            .bind(conversation.created_at)
            .bind(conversation.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(conversation_from_row(&row)?)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        let sql = format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            JOIN cust_agents ca ON ca.id = c.cust_agent_id
            WHERE c.id = $1
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(conversation_from_row).transpose()?)
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, StoreError> {
        let (start, end) = filter.time_range.unzip();
        let sql = format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            JOIN cust_agents ca ON ca.id = c.cust_agent_id
            WHERE ($1::uuid IS NULL OR ca.customer_id = $1)
              AND ($2::uuid IS NULL OR ca.agent_id = $2)
              AND ($3::timestamptz IS NULL OR c.time_date >= $3)
              AND ($4::timestamptz IS NULL OR c.time_date <= $4)
              AND ($5::int IS NULL OR c.duration >= $5)
              AND ($6::int IS NULL OR c.duration <= $6)
            ORDER BY c.time_date DESC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(filter.customer_id)
            .bind(filter.agent_id)
            .bind(start)
            .bind(end)
            .bind(filter.min_duration)
            .bind(filter.max_duration)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(conversation_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
