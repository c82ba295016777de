use tokio_postgres::types::ToSql;

// Type aliases for PostgreSQL parameter types
pub type PgParam = dyn ToSql + Sync;
pub type PgSendParam = dyn ToSql + Sync + Send;
pub type PgParamBox = Box<PgSendParam>;
pub type PgParamVec = Vec<PgParamBox>;

/// Owned, ordered bind values for a dynamically built statement.
#[derive(Debug, Default)]
pub struct SqlParams {
    values: PgParamVec,
}

impl SqlParams {
    pub fn new() -> Self { Self::default() }

    /// Stores `value` and returns its `$n` placeholder.
    pub fn push<T>(&mut self, value: T) -> String
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Borrowed view in the shape `Client::query` expects.
    pub fn as_refs(&self) -> Vec<&PgParam> {
        self.values
            .iter()
            .map(|p| p.as_ref() as &PgParam)
            .collect()
    }
}
