//! PostgreSQL implementation of CallRepository
//!
//! Status changes are conditional updates on `status_rank`, so concurrent
//! webhook deliveries for one call cannot regress its status.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use dialer::{
    AmdDecision, AmdResult, AmdStrategy, Call, CallEvent, CallFilter, CallPage, CallRepository,
    CallStatus, CanonicalNumber, DomainError, UserId,
};

/// PostgreSQL implementation of CallRepository
pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CallRow {
    id: Uuid,
    owner_id: String,
    target_number: String,
    amd_strategy: String,
    provider_call_id: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<CallRow> for Call {
    type Error = DomainError;

    fn try_from(row: CallRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner_id: UserId::new(row.owner_id),
            target_number: CanonicalNumber::from_stored(row.target_number),
            amd_strategy: row
                .amd_strategy
                .parse::<AmdStrategy>()
                .map_err(DomainError::Repository)?,
            provider_call_id: row.provider_call_id,
            status: row.status.parse::<CallStatus>().map_err(DomainError::Repository)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CallEventRow {
    id: Uuid,
    call_id: Uuid,
    event_type: String,
    occurred_at: chrono::DateTime<chrono::Utc>,
    payload: serde_json::Value,
}

impl From<CallEventRow> for CallEvent {
    fn from(row: CallEventRow) -> Self {
        Self {
            id: row.id,
            call_id: row.call_id,
            event_type: row.event_type,
            occurred_at: row.occurred_at,
            payload: row.payload,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AmdResultRow {
    id: Uuid,
    call_id: Uuid,
    strategy: String,
    decision: String,
    confidence: Option<f64>,
    details: Option<serde_json::Value>,
    recorded_at: chrono::DateTime<chrono::Utc>,
    fingerprint: String,
}

impl From<AmdResultRow> for AmdResult {
    fn from(row: AmdResultRow) -> Self {
        Self {
            id: row.id,
            call_id: row.call_id,
            strategy: row.strategy,
            decision: AmdDecision::from_label(&row.decision),
            confidence: row.confidence,
            details: row.details,
            recorded_at: row.recorded_at,
            fingerprint: row.fingerprint,
        }
    }
}

fn repo_err(e: sqlx::Error) -> DomainError {
    DomainError::Repository(e.to_string())
}

fn into_calls(rows: Vec<CallRow>) -> Result<Vec<Call>, DomainError> {
    rows.into_iter().map(Call::try_from).collect()
}

#[async_trait]
impl CallRepository for PgCallRepository {
    async fn create_call(&self, call: &Call) -> Result<Call, DomainError> {
        let row = sqlx::query_as::<_, CallRow>(
            r#"
            INSERT INTO calls (id, owner_id, target_number, amd_strategy, provider_call_id, status, status_rank, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, owner_id, target_number, amd_strategy, provider_call_id, status, created_at, updated_at
            "#,
        )
        .bind(call.id)
        .bind(call.owner_id.as_str())
        .bind(call.target_number.as_str())
        .bind(call.amd_strategy.as_str())
        .bind(&call.provider_call_id)
        .bind(call.status.as_str())
        .bind(call.status.rank())
        .bind(call.created_at)
        .bind(call.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(repo_err)?;

        row.try_into()
    }

    async fn find_call_by_id(&self, id: Uuid) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query_as::<_, CallRow>(
            "SELECT id, owner_id, target_number, amd_strategy, provider_call_id, status, created_at, updated_at FROM calls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(repo_err)?;

        row.map(Call::try_from).transpose()
    }

    async fn find_call_by_provider_id(
        &self,
        provider_call_id: &str,
    ) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query_as::<_, CallRow>(
            "SELECT id, owner_id, target_number, amd_strategy, provider_call_id, status, created_at, updated_at FROM calls WHERE provider_call_id = $1",
        )
        .bind(provider_call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(repo_err)?;

        row.map(Call::try_from).transpose()
    }

    async fn find_latest_unbound_call_by_number(
        &self,
        number: &CanonicalNumber,
    ) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query_as::<_, CallRow>(
            r#"
            SELECT id, owner_id, target_number, amd_strategy, provider_call_id, status, created_at, updated_at
            FROM calls
            WHERE target_number = $1 AND provider_call_id IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(repo_err)?;

        row.map(Call::try_from).transpose()
    }

    async fn update_call_status(
        &self,
        call_id: Uuid,
        status: CallStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls
            SET status = $2, status_rank = $3, updated_at = NOW()
            WHERE id = $1 AND status_rank < $3
            "#,
        )
        .bind(call_id)
        .bind(status.as_str())
        .bind(status.rank())
        .execute(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_provider_call_id(
        &self,
        call_id: Uuid,
        provider_call_id: &str,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE calls SET provider_call_id = $2, updated_at = NOW() WHERE id = $1 AND provider_call_id IS NULL",
        )
        .bind(call_id)
        .bind(provider_call_id)
        .execute(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_event(&self, event: &CallEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO call_events (id, call_id, event_type, occurred_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id)
        .bind(event.call_id)
        .bind(&event.event_type)
        .bind(event.occurred_at)
        .bind(&event.payload)
        .execute(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(())
    }

    async fn insert_amd_result(&self, result: &AmdResult) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO amd_results (id, call_id, strategy, decision, confidence, details, recorded_at, fingerprint)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (call_id, fingerprint) DO NOTHING
            "#,
        )
        .bind(result.id)
        .bind(result.call_id)
        .bind(&result.strategy)
        .bind(result.decision.as_str())
        .bind(result.confidence)
        .bind(&result.details)
        .bind(result.recorded_at)
        .bind(&result.fingerprint)
        .execute(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(inserted.rows_affected() > 0)
    }

    async fn list_calls(
        &self,
        owner_id: &UserId,
        filter: &CallFilter,
    ) -> Result<CallPage, DomainError> {
        let strategy = filter.strategy.map(AmdStrategy::as_str);
        let status = filter.status.map(CallStatus::as_str);

        let rows = sqlx::query_as::<_, CallRow>(
            r#"
            SELECT id, owner_id, target_number, amd_strategy, provider_call_id, status, created_at, updated_at
            FROM calls
            WHERE owner_id = $1
              AND ($2::TEXT IS NULL OR amd_strategy = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(owner_id.as_str())
        .bind(strategy)
        .bind(status)
        .bind(i64::from(filter.page_size))
        .bind(filter.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM calls
            WHERE owner_id = $1
              AND ($2::TEXT IS NULL OR amd_strategy = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            "#,
        )
        .bind(owner_id.as_str())
        .bind(strategy)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(CallPage {
            calls: into_calls(rows)?,
            total: total.max(0) as u64,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn list_events(&self, call_id: Uuid) -> Result<Vec<CallEvent>, DomainError> {
        let rows = sqlx::query_as::<_, CallEventRow>(
            "SELECT * FROM call_events WHERE call_id = $1 ORDER BY occurred_at ASC",
        )
        .bind(call_id)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_amd_results(&self, call_id: Uuid) -> Result<Vec<AmdResult>, DomainError> {
        let rows = sqlx::query_as::<_, AmdResultRow>(
            "SELECT * FROM amd_results WHERE call_id = $1 ORDER BY recorded_at ASC",
        )
        .bind(call_id)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
