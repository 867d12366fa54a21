//! Hospital directory search.

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{Hospital, ListResponse};
use crate::error::ApiError;

/// Directory filters. Unset filters are omitted from the query string.
#[derive(Debug, Clone, Default)]
pub struct HospitalQuery {
    pub search: Option<String>,
    pub city: Option<String>,
    pub specialty: Option<String>,
    pub page: Option<u32>,
}

impl HospitalQuery {
    /// `?k=v&...` with percent-encoded values, or an empty string.
    pub fn to_query_string(&self) -> String {
        let page = self.page.map(|p| p.to_string());
        let pairs: Vec<String> = [
            ("search", self.search.as_deref()),
            ("city", self.city.as_deref()),
            ("specialty", self.specialty.as_deref()),
            ("page", page.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

pub async fn search<T: Transport>(
    client: &ApiClient<T>,
    query: &HospitalQuery,
) -> Result<Vec<Hospital>, ApiError> {
    let path = format!("{}{}", endpoints::HOSPITALS, query.to_query_string());
    let list: ListResponse<Hospital> = client.get(&path).await?;
    Ok(list.into_vec())
}

pub async fn get<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<Hospital, ApiError> {
    client.get(&endpoints::item(endpoints::HOSPITALS, id)).await
}
