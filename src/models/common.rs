use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Pagination query shared by the admin list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(0)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(25).clamp(1, 200)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let query = PageQuery {
            page: None,
            per_page: None,
        };
        assert_eq!(query.page(), 0);
        assert_eq!(query.per_page(), 25);
    }

    #[test]
    fn test_per_page_clamped() {
        let query = PageQuery {
            page: Some(2),
            per_page: Some(10_000),
        };
        assert_eq!(query.per_page(), 200);

        let query = PageQuery {
            page: Some(0),
            per_page: Some(0),
        };
        assert_eq!(query.per_page(), 1);
    }
}
