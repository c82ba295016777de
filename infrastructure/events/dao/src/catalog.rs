use async_trait::async_trait;
use dao_utils::SqlParams;
use events_errors::EventResult;
use events_filters::{Condition, Predicate};
use events_models::{BucketType, Category, City, EventBucket, GeoPoint};
use events_queries::CatalogReader;
use sql_connection::SqlConnect;
use tracing::instrument;

use crate::{
    compiler::compile,
    rows::{CATEGORY_COLUMNS, CITY_COLUMNS, bucket_from_row, category_from_row, city_from_row},
};

/// Reference data: cities, categories and tab buckets.
#[derive(Clone)]
pub struct CatalogDao {
    db: SqlConnect,
}

impl CatalogDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    async fn cities_where(
        &self, condition: &str, params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> EventResult<Vec<City>> {
        let client = self.db.get_read_client().await?;
        let sql = format!("SELECT {CITY_COLUMNS} FROM cities c WHERE {condition} ORDER BY c.id");
        let rows = client.query(sql.as_str(), params).await?;
        Ok(rows.iter().map(city_from_row).collect())
    }
}

#[async_trait]
impl CatalogReader for CatalogDao {
    #[instrument(skip(self))]
    async fn city_by_slug(&self, slug: &str) -> EventResult<Option<City>> {
        Ok(self.cities_where("c.slug = $1", &[&slug]).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn curated_cities_within(
        &self, point: GeoPoint, meters: f64,
    ) -> EventResult<Vec<(City, f64)>> {
        let client = self.db.get_read_client().await?;
        let sql = format!(
            "WITH origin AS (
                 SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point
             )
             SELECT {CITY_COLUMNS}, ST_Distance(c.point, o.point)
             FROM cities c, origin o
             WHERE c.is_curated AND ST_DWithin(c.point, o.point, $3)
             ORDER BY ST_Distance(c.point, o.point), c.id"
        );
        let rows = client
            .query(sql.as_str(), &[&point.longitude, &point.latitude, &meters])
            .await?;
        Ok(rows
            .iter()
            .map(|row| (city_from_row(row), row.get::<_, f64>(10)))
            .collect())
    }

    #[instrument(skip(self, city), fields(city = %city.slug))]
    async fn nearest_cluster_sibling(
        &self, city: &City,
    ) -> EventResult<Option<(City, f64)>> {
        let Some(cluster) = city.cluster.as_deref()
        else {
            return Ok(None);
        };
        let client = self.db.get_read_client().await?;
        let sql = format!(
            "SELECT {CITY_COLUMNS}, ST_Distance(c.point, o.point)
             FROM cities c JOIN cities o ON o.id = $1
             WHERE c.cluster = $2 AND c.id <> o.id
             ORDER BY ST_Distance(c.point, o.point), c.id
             LIMIT 1"
        );
        let row = client.query_opt(sql.as_str(), &[&city.id, &cluster]).await?;
        Ok(row.map(|row| (city_from_row(&row), row.get::<_, f64>(10))))
    }

    #[instrument(skip(self))]
    async fn cities_in_state(&self, state: &str) -> EventResult<Vec<City>> {
        let by_slug = self.cities_where("c.state_slug = $1", &[&state]).await?;
        if !by_slug.is_empty() {
            return Ok(by_slug);
        }
        self.cities_where("upper(c.state_code) = upper($1)", &[&state])
            .await
    }

    #[instrument(skip(self))]
    async fn event_buckets(&self, kind: BucketType) -> EventResult<Vec<EventBucket>> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, bucket, name, sort_order, is_active FROM event_buckets \
                 WHERE bucket_type = $1 AND is_active \
                 ORDER BY sort_order, id",
            )
            .await?;
        let rows = client.query(&stmt, &[&kind.as_str()]).await?;
        Ok(rows.iter().map(|row| bucket_from_row(row, kind)).collect())
    }

    #[instrument(skip(self))]
    async fn category_sections(&self) -> EventResult<Vec<Category>> {
        let client = self.db.get_read_client().await?;
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c \
             WHERE c.is_section ORDER BY c.name, c.id"
        );
        let rows = client.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(category_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn categories_with_events(
        &self, predicate: &Predicate,
    ) -> EventResult<Vec<Category>> {
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        let mut params = SqlParams::new();
        let visible = Predicate::from(Condition::Viewable).and(predicate.clone());
        let condition = compile(&visible, &mut params);
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c \
             WHERE c.is_viewable AND EXISTS ( \
                 SELECT 1 FROM event_categories ecx \
                 JOIN events e ON e.id = ecx.event_id \
                 WHERE ecx.category_id = c.id AND {condition}) \
             ORDER BY c.name, c.id"
        );

        let client = self.db.get_read_client().await?;
        let rows = client.query(sql.as_str(), &params.as_refs()).await?;
        Ok(rows.iter().map(category_from_row).collect())
    }
}
