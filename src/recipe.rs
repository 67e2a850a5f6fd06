use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub image: String,
}

/// Body of a `complexSearch` response. Fields other than `results` are ignored.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Recipe>,
}
