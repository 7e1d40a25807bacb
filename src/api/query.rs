use serde::de::DeserializeOwned;
use serde::Serialize;
use urlencoding::encode;

use crate::api::client::ServiceClient;
use crate::api::error::ApiError;

/// Read/write access to a named collection, PostgREST style: equality and
/// comparison filters, ordering, limits, row counts and relationship
/// expansion through the `select` string.
pub struct QueryBuilder<'a> {
    client: &'a ServiceClient,
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl ServiceClient {
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<'a> QueryBuilder<'a> {
    /// Columns to return; nested `rel(col, ...)` expands a referenced
    /// entity inline.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns
            .split_whitespace()
            .collect::<Vec<_>>()
            .concat();
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", encode(value))));
        self
    }

    pub fn gt(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("gt.{}", value.to_string())));
        self
    }

    /// Case-insensitive equality on a text column.
    pub fn ilike(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("ilike.{}", encode(value))));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push((column.to_string(), "is.null".to_string()));
        self
    }

    pub fn in_list(mut self, column: &str, values: &[&str]) -> Self {
        self.filters
            .push((column.to_string(), format!("in.({})", values.join(","))));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Fetch all matching rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        let url = self.build_url();
        let response = self.client.send(self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// Fetch at most one row, None when nothing matches.
    pub async fn maybe_single<T: DeserializeOwned>(mut self) -> Result<Option<T>, ApiError> {
        self.limit = Some(1);
        let rows: Vec<T> = self.fetch().await?;
        Ok(rows.into_iter().next())
    }

    /// Exact row count without transferring the rows.
    pub async fn count(mut self) -> Result<i64, ApiError> {
        self.select = "id".to_string();
        self.limit = Some(1);
        let url = self.build_url();
        let response = self
            .client
            .send(self.client.get(&url).header("Prefer", "count=exact"))
            .await?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|range| range.rsplit('/').next())
            .and_then(|total| total.parse().ok())
            .unwrap_or(0);
        Ok(total)
    }

    /// Insert one row; the service applies row-level security.
    pub async fn insert<T: Serialize>(self, row: &T) -> Result<(), ApiError> {
        let url = self.client.rest_url(&self.table);
        self.client
            .send(
                self.client
                    .post(&url)
                    .header("Prefer", "return=minimal")
                    .json(row),
            )
            .await?;
        Ok(())
    }

    /// Patch the rows selected by the accumulated filters.
    pub async fn update<T: Serialize>(self, patch: &T) -> Result<(), ApiError> {
        let url = self.build_url();
        self.client
            .send(
                self.client
                    .patch(&url)
                    .header("Prefer", "return=minimal")
                    .json(patch),
            )
            .await?;
        Ok(())
    }

    fn build_url(&self) -> String {
        let mut params = vec![format!("select={}", self.select)];
        for (column, filter) in &self.filters {
            params.push(format!("{}={}", column, filter));
        }
        if !self.order.is_empty() {
            params.push(format!("order={}", self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            params.push(format!("offset={}", offset));
        }
        format!("{}?{}", self.client.rest_url(&self.table), params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ServiceSettings;

    fn test_client() -> ServiceClient {
        let settings = ServiceSettings {
            base_url: "https://club.example.co".to_string(),
            anon_key: "anon".to_string(),
            user_agent: "test",
            timeout_secs: 5,
        };
        ServiceClient::new(&settings).unwrap()
    }

    #[test]
    fn filters_order_and_limit_compose() {
        let client = test_client();
        let url = client
            .from("tournament_weeks")
            .select("id, week_number, tournaments(name, edition)")
            .in_list("status", &["open", "in_progress"])
            .order("match_date", true)
            .limit(1)
            .build_url();
        assert_eq!(
            url,
            "https://club.example.co/rest/v1/tournament_weeks\
             ?select=id,week_number,tournaments(name,edition)\
             &status=in.(open,in_progress)&order=match_date.asc&limit=1"
        );
    }

    #[test]
    fn unclaimed_email_lookup_shape() {
        let client = test_client();
        let url = client
            .from("players")
            .ilike("email", "ana@example.com")
            .is_null("user_id")
            .build_url();
        assert_eq!(
            url,
            "https://club.example.co/rest/v1/players\
             ?select=*&email=ilike.ana%40example.com&user_id=is.null"
        );
    }

    #[test]
    fn gt_filter_for_rank_counting() {
        let client = test_client();
        let url = client.from("players").gt("rating_rapid", 1500).build_url();
        assert_eq!(
            url,
            "https://club.example.co/rest/v1/players?select=*&rating_rapid=gt.1500"
        );
    }

    #[test]
    fn pagination_appends_limit_and_offset() {
        let client = test_client();
        let url = client
            .from("players")
            .order("rating_rapid", false)
            .limit(50)
            .offset(100)
            .build_url();
        assert_eq!(
            url,
            "https://club.example.co/rest/v1/players\
             ?select=*&order=rating_rapid.desc&limit=50&offset=100"
        );
    }
}
