//! PostgreSQL implementation of the record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safecase_core::{
    Case, CaseId, CaseStatus, EvidenceItem, EvidenceKind, EvidenceMetadata, RecordStore,
    Result as CoreResult, ThreatLevel,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

/// Connection pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 2,
        }
    }
}

/// PostgreSQL-backed case and evidence records.
///
/// Evidence rows reference their case with `ON DELETE CASCADE`; ordering
/// ties on timestamps are broken by the `seq` column (insertion order).
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

/// Row type for case queries.
#[derive(FromRow)]
struct CaseRow {
    id: Uuid,
    owner_id: String,
    title: String,
    description: Option<String>,
    status: String,
    platforms: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CaseRow> for Case {
    type Error = DbError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            status: row
                .status
                .parse::<CaseStatus>()
                .map_err(|e| DbError::Decode(e.to_string()))?,
            platforms: row.platforms,
            created_at: row.created_at,
        })
    }
}

/// Row type for evidence queries.
#[derive(FromRow)]
struct EvidenceRow {
    id: Uuid,
    case_id: Uuid,
    file_url: String,
    kind: String,
    extracted_text: String,
    harm_detected: bool,
    threat_level: String,
    matched_categories: Vec<String>,
    uploaded_at: DateTime<Utc>,
    metadata: Json<EvidenceMetadata>,
}

impl TryFrom<EvidenceRow> for EvidenceItem {
    type Error = DbError;

    fn try_from(row: EvidenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            case_id: row.case_id,
            file_url: row.file_url,
            kind: row
                .kind
                .parse::<EvidenceKind>()
                .map_err(|e| DbError::Decode(e.to_string()))?,
            extracted_text: row.extracted_text,
            harm_detected: row.harm_detected,
            threat_level: row
                .threat_level
                .parse::<ThreatLevel>()
                .map_err(|e| DbError::Decode(e.to_string()))?,
            matched_categories: row.matched_categories,
            uploaded_at: row.uploaded_at,
            metadata: row.metadata.0,
        })
    }
}

const CASE_COLUMNS: &str = "id, owner_id, title, description, status, platforms, created_at";
const EVIDENCE_COLUMNS: &str = "id, case_id, file_url, kind, extracted_text, harm_detected, \
     threat_level, matched_categories, uploaded_at, metadata";

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

impl PostgresRecordStore {
    /// Connect and run migrations.
    pub async fn new(database_url: &str, settings: PoolSettings) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Record store connected and migrations applied"
        );

        Ok(Self { pool })
    }

    /// Create a record store from an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_case(&self, id: CaseId) -> Result<Option<Case>, DbError> {
        let row: Option<CaseRow> =
            sqlx::query_as(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Case::try_from).transpose()
    }

    async fn select_cases(&self, owner_id: &str) -> Result<Vec<Case>, DbError> {
        let rows: Vec<CaseRow> = sqlx::query_as(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE owner_id = $1 \
             ORDER BY created_at DESC, seq DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        decode_all(rows)
    }

    async fn update_status(&self, id: CaseId, status: CaseStatus) -> Result<Option<Case>, DbError> {
        let row: Option<CaseRow> = sqlx::query_as(&format!(
            "UPDATE cases SET status = $2 WHERE id = $1 RETURNING {CASE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Case::try_from).transpose()
    }

    async fn delete_cascade(&self, id: CaseId) -> Result<Option<Vec<EvidenceItem>>, DbError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM cases WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let rows: Vec<EvidenceRow> = sqlx::query_as(&format!(
            "DELETE FROM evidence_items WHERE case_id = $1 RETURNING {EVIDENCE_COLUMNS}"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        decode_all(rows).map(Some)
    }

    async fn select_evidence(&self, case_id: CaseId) -> Result<Vec<EvidenceItem>, DbError> {
        let rows: Vec<EvidenceRow> = sqlx::query_as(&format!(
            "SELECT {EVIDENCE_COLUMNS} FROM evidence_items WHERE case_id = $1 \
             ORDER BY uploaded_at DESC, seq DESC"
        ))
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        decode_all(rows)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert_case(&self, case: &Case) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cases (id, owner_id, title, description, status, platforms, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(case.id)
        .bind(&case.owner_id)
        .bind(&case.title)
        .bind(&case.description)
        .bind(case.status.as_str())
        .bind(&case.platforms)
        .bind(case.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        tracing::debug!(case_id = %case.id, "Stored case");
        Ok(())
    }

    async fn get_case(&self, id: CaseId) -> CoreResult<Option<Case>> {
        Ok(self.select_case(id).await?)
    }

    async fn list_cases(&self, owner_id: &str) -> CoreResult<Vec<Case>> {
        Ok(self.select_cases(owner_id).await?)
    }

    async fn update_case_status(&self, id: CaseId, status: CaseStatus) -> CoreResult<Option<Case>> {
        Ok(self.update_status(id, status).await?)
    }

    async fn delete_case(&self, id: CaseId) -> CoreResult<Option<Vec<EvidenceItem>>> {
        Ok(self.delete_cascade(id).await?)
    }

    async fn insert_evidence(&self, item: &EvidenceItem) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO evidence_items (
                id, case_id, file_url, kind, extracted_text, harm_detected,
                threat_level, matched_categories, uploaded_at, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id)
        .bind(item.case_id)
        .bind(&item.file_url)
        .bind(item.kind.as_str())
        .bind(&item.extracted_text)
        .bind(item.harm_detected)
        .bind(item.threat_level.as_str())
        .bind(&item.matched_categories)
        .bind(item.uploaded_at)
        .bind(Json(&item.metadata))
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        tracing::debug!(evidence_id = %item.id, case_id = %item.case_id, "Stored evidence");
        Ok(())
    }

    async fn list_evidence(&self, case_id: CaseId) -> CoreResult<Vec<EvidenceItem>> {
        Ok(self.select_evidence(case_id).await?)
    }

    async fn check_health(&self) -> CoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
