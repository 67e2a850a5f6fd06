use async_trait::async_trait;
use reqwest::{Client, Request};

use crate::error::FetchError;
use crate::pagination::PageRequest;
use crate::recipe::{Recipe, SearchResponse};

pub const SEARCH_PATH: &str = "/recipes/complexSearch";

#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Recipe>, FetchError>;
}

pub struct SpoonacularClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        SpoonacularClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn build_request(&self, request: PageRequest) -> Result<Request, FetchError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let built = self
            .http
            .get(url)
            .query(&[
                ("offset", request.offset().to_string()),
                ("number", request.page_size.to_string()),
                ("apiKey", self.api_key.clone()),
            ])
            .build()?;
        Ok(built)
    }
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Recipe>, FetchError> {
        let http_request = self.build_request(request)?;
        // never log the query string, it carries the api key
        log::debug!("GET {}{} page {}", self.base_url, SEARCH_PATH, request.page);
        let response = self.http.execute(http_request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}
