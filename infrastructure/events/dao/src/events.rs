use async_trait::async_trait;
use dao_utils::{PaginationParams, SqlParams};
use events_errors::EventResult;
use events_filters::{Condition, Predicate};
use events_models::Event;
use events_queries::{EventQuery, EventReader};
use sql_connection::SqlConnect;
use tracing::{debug, instrument};

use crate::{
    compiler::{compile, order_by},
    rows::{EVENT_COLUMNS, event_from_row},
};

/// Postgres-backed event reader. Every query is restricted to viewable
/// events.
#[derive(Clone)]
pub struct EventDao {
    db: SqlConnect,
}

impl EventDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    pub fn db(&self) -> &SqlConnect { &self.db }

    fn visible(predicate: &Predicate) -> Predicate {
        Predicate::from(Condition::Viewable).and(predicate.clone())
    }

    /// SQL and bind values for `query`.
    pub fn select_sql(query: &EventQuery) -> (String, SqlParams) {
        let mut params = SqlParams::new();
        let condition = compile(&Self::visible(&query.predicate), &mut params);
        let order = order_by(&query.order, &mut params);
        let base = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE {condition}");

        let (sql, paging) = PaginationParams::new(query.limit, query.offset)
            .build_query_with_existing_params(&base, &order, params.len());
        for value in paging {
            params.push(value);
        }
        (sql, params)
    }
}

#[async_trait]
impl EventReader for EventDao {
    #[instrument(skip(self))]
    async fn find_events(&self, query: &EventQuery) -> EventResult<Vec<Event>> {
        if query.predicate.is_nothing() {
            return Ok(Vec::new());
        }
        let (sql, params) = Self::select_sql(query);
        debug!("Event query: {}", sql);

        let client = self.db.get_read_client().await?;
        let rows = client.query(sql.as_str(), &params.as_refs()).await?;
        Ok(rows.iter().map(event_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn count_events(&self, predicate: &Predicate) -> EventResult<u64> {
        if predicate.is_nothing() {
            return Ok(0);
        }
        let mut params = SqlParams::new();
        let condition = compile(&Self::visible(predicate), &mut params);
        let sql = format!("SELECT COUNT(*) FROM events e WHERE {condition}");

        let client = self.db.get_read_client().await?;
        let row = client.query_one(sql.as_str(), &params.as_refs()).await?;
        Ok(row.get::<_, i64>(0) as u64)
    }

    #[instrument(skip(self))]
    async fn any_event(&self, predicate: &Predicate) -> EventResult<bool> {
        if predicate.is_nothing() {
            return Ok(false);
        }
        let mut params = SqlParams::new();
        let condition = compile(&Self::visible(predicate), &mut params);
        let sql = format!("SELECT EXISTS (SELECT 1 FROM events e WHERE {condition})");

        let client = self.db.get_read_client().await?;
        let row = client.query_one(sql.as_str(), &params.as_refs()).await?;
        Ok(row.get(0))
    }
}
