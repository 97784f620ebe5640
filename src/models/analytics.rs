use serde::Deserialize;

/// Query for the analytics endpoints. Windows are bounded so the raw log is
/// never scanned unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsWindowQuery {
    pub hours: Option<i64>,
    pub limit: Option<u64>,
}

const MAX_WINDOW_HOURS: i64 = 24 * 30;

impl AnalyticsWindowQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(hours) = self.hours {
            if hours < 1 || hours > MAX_WINDOW_HOURS {
                return Err(format!(
                    "hours must be between 1 and {}, got: {}",
                    MAX_WINDOW_HOURS, hours
                ));
            }
        }
        if let Some(limit) = self.limit {
            if limit < 1 || limit > 100 {
                return Err(format!("limit must be between 1 and 100, got: {}", limit));
            }
        }
        Ok(())
    }

    pub fn hours(&self) -> i64 {
        self.hours.unwrap_or(24)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = AnalyticsWindowQuery {
            hours: None,
            limit: None,
        };
        assert!(query.validate().is_ok());
        assert_eq!(query.hours(), 24);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_window_bounds() {
        let query = AnalyticsWindowQuery {
            hours: Some(0),
            limit: None,
        };
        assert!(query.validate().is_err());

        let query = AnalyticsWindowQuery {
            hours: Some(MAX_WINDOW_HOURS + 1),
            limit: None,
        };
        assert!(query.validate().is_err());

        let query = AnalyticsWindowQuery {
            hours: Some(168),
            limit: Some(50),
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        let query = AnalyticsWindowQuery {
            hours: None,
            limit: Some(101),
        };
        assert!(query.validate().is_err());
    }
}
