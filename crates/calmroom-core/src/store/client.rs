//! RestRecordStore: per-user reads and inserts against the hosted row store.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;

use super::records::{
    JournalEntry, MoodEntry, NewJournalEntry, NewMood, NewRecord, RecordKind, StoredRecord,
};
use crate::auth::UserContext;
use crate::config::BackendConfig;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    fn as_param(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "created_at.desc",
            SortOrder::OldestFirst => "created_at.asc",
        }
    }
}

/// Row selection for a listing. Defaults to every row, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub order: SortOrder,
}

impl ListQuery {
    /// Newest `limit` rows.
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            order: SortOrder::NewestFirst,
        }
    }
}

/// Client for the mood and journal tables.
///
/// Every call is filtered to, or stamped with, the user in the supplied
/// [`UserContext`].
pub struct RestRecordStore {
    http_client: Client,
    backend: BackendConfig,
}

impl RestRecordStore {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            http_client: Client::new(),
            backend,
        }
    }

    fn request(&self, method: Method, kind: RecordKind, ctx: &UserContext) -> RequestBuilder {
        self.http_client
            .request(method, self.backend.rest_url(kind.table()))
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(ctx.access_token())
    }

    async fn check(resp: Response) -> Result<Response, StoreError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status { status, body })
    }

    /// The user's rows of kind `R`, ordered by creation time.
    pub async fn list_recent<R: StoredRecord>(
        &self,
        ctx: &UserContext,
        query: ListQuery,
    ) -> Result<Vec<R>, StoreError> {
        let user_filter = format!("eq.{}", ctx.user_id());
        let mut params = vec![
            ("select", "*".to_string()),
            ("user_id", user_filter),
            ("order", query.order.as_param().to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        tracing::debug!(kind = %R::KIND, limit = ?query.limit, "listing records");
        let resp = self
            .request(Method::GET, R::KIND, ctx)
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Exact number of the user's rows of `kind`, without fetching them.
    pub async fn count(&self, ctx: &UserContext, kind: RecordKind) -> Result<u64, StoreError> {
        let user_filter = format!("eq.{}", ctx.user_id());
        let resp = self
            .request(Method::HEAD, kind, ctx)
            .query(&[("select", "id"), ("user_id", user_filter.as_str())])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        let range = resp
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Decode("missing Content-Range header".into()))?;
        parse_total(range)
    }

    /// Insert one row for the signed-in user and return it as stored.
    pub async fn insert<N: NewRecord>(
        &self,
        ctx: &UserContext,
        fields: &N,
    ) -> Result<N::Stored, StoreError> {
        fields.validate()?;

        let mut body = serde_json::to_value(fields)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        match body.as_object_mut() {
            Some(obj) => {
                obj.insert("user_id".into(), Value::String(ctx.user_id().to_string()));
            }
            None => return Err(StoreError::Decode("record fields must be an object".into())),
        }

        let kind = <N::Stored as StoredRecord>::KIND;
        let resp = self
            .request(Method::POST, kind, ctx)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let rows: Vec<N::Stored> = Self::check(resp).await?.json().await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".into()))?;
        tracing::info!(%kind, id = %row.id(), "record saved");
        Ok(row)
    }

    // ── Convenience ──────────────────────────────────────────────────

    pub async fn recent_moods(
        &self,
        ctx: &UserContext,
        limit: usize,
    ) -> Result<Vec<MoodEntry>, StoreError> {
        self.list_recent(ctx, ListQuery::recent(limit)).await
    }

    pub async fn latest_mood(&self, ctx: &UserContext) -> Result<Option<MoodEntry>, StoreError> {
        Ok(self.recent_moods(ctx, 1).await?.into_iter().next())
    }

    pub async fn journal_entries(
        &self,
        ctx: &UserContext,
        limit: Option<usize>,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        self.list_recent(
            ctx,
            ListQuery {
                limit,
                order: SortOrder::NewestFirst,
            },
        )
        .await
    }

    pub async fn log_mood(&self, ctx: &UserContext, mood: &NewMood) -> Result<MoodEntry, StoreError> {
        self.insert(ctx, mood).await
    }

    pub async fn save_journal_entry(
        &self,
        ctx: &UserContext,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntry, StoreError> {
        self.insert(ctx, entry).await
    }
}

/// Total from a `Content-Range` value such as `0-24/3573` or `*/0`.
fn parse_total(range: &str) -> Result<u64, StoreError> {
    range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| StoreError::Decode(format!("unparsable Content-Range: {range}")))
}
