pub trait DbConnectConfig: serde::de::DeserializeOwned {
    fn uri(&self) -> &str;

    /// Replica used for reads; reads go to the primary when absent.
    fn read_replica_uri(&self) -> Option<&str> { None }
}

/// Configure database connection pool data
pub trait DbOptionsConfig {
    fn max_conn(&self) -> Option<u32> { None }
    fn min_conn(&self) -> Option<u32> { None }
    fn read_max_conn(&self) -> Option<u32> { self.max_conn() }
    fn read_min_conn(&self) -> Option<u32> { self.min_conn() }
}

#[derive(Debug, serde::Deserialize)]
pub struct PostgresDbConfig {
    pub uri: String,
    #[serde(default)]
    pub read_uri: Option<String>,
    pub max_conn: Option<u32>,
    pub min_conn: Option<u32>,
    #[serde(default = "read_max_conn_default")]
    pub read_max_conn: Option<u32>,
}

impl DbConnectConfig for PostgresDbConfig {
    fn uri(&self) -> &str { &self.uri }

    fn read_replica_uri(&self) -> Option<&str> {
        self.read_uri.as_deref().filter(|uri| !uri.is_empty())
    }
}

impl DbOptionsConfig for PostgresDbConfig {
    fn max_conn(&self) -> Option<u32> { self.max_conn }

    fn min_conn(&self) -> Option<u32> { self.min_conn }

    fn read_max_conn(&self) -> Option<u32> {
        self.read_max_conn.or(self.max_conn)
    }
}

fn read_max_conn_default() -> Option<u32> { None }
