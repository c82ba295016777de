#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PaginationParams {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    /// Appends `order_by` and LIMIT/OFFSET placeholders numbered after the
    /// query's existing parameters. Returns the values to bind, in order.
    pub fn build_query_with_existing_params(
        &self, base_query: &str, order_by: &str, existing_param_count: usize,
    ) -> (String, Vec<i64>) {
        let mut query = format!("{base_query} {order_by}");
        let mut params = Vec::new();
        let mut param_count = existing_param_count;

        if let Some(limit) = self.limit {
            param_count += 1;
            query.push_str(&format!(" LIMIT ${param_count}"));
            params.push(limit as i64);
        }
        if let Some(offset) = self.offset {
            param_count += 1;
            query.push_str(&format!(" OFFSET ${param_count}"));
            params.push(offset as i64);
        }

        (query, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_follow_existing_params() {
        let (query, params) = PaginationParams::new(Some(20), Some(40))
            .build_query_with_existing_params(
                "SELECT * FROM events e WHERE e.id = $1",
                "ORDER BY e.start_date ASC",
                1,
            );
        assert_eq!(
            query,
            "SELECT * FROM events e WHERE e.id = $1 ORDER BY e.start_date ASC LIMIT $2 OFFSET $3"
        );
        assert_eq!(params, vec![20, 40]);
    }

    #[test]
    fn test_offset_only() {
        let (query, params) = PaginationParams::new(None, Some(5))
            .build_query_with_existing_params("SELECT 1", "", 0);
        assert_eq!(query, "SELECT 1  OFFSET $1");
        assert_eq!(params, vec![5]);
    }
}
