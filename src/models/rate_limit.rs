use serde::Deserialize;

const METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "ALL"];

/// Body for POST /api/admin/rate-limit-rules.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRateLimitRuleRequest {
    pub endpoint: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub limit_count: i32,
    pub window_seconds: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub description: Option<String>,
}

fn default_method() -> String {
    "ALL".to_string()
}

fn default_enabled() -> bool {
    true
}

impl CreateRateLimitRuleRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with('/') {
            return Err("endpoint must start with '/'".to_string());
        }
        // A wildcard may only appear as the trailing character
        if let Some(pos) = self.endpoint.find('*') {
            if pos != self.endpoint.len() - 1 {
                return Err("'*' is only allowed at the end of the endpoint".to_string());
            }
        }
        if !METHODS.contains(&self.method.as_str()) {
            return Err(format!(
                "method must be one of {:?}, got: '{}'",
                METHODS, self.method
            ));
        }
        if self.limit_count < 1 {
            return Err("limit_count must be at least 1".to_string());
        }
        if self.window_seconds < 1 {
            return Err("window_seconds must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Body for PUT /api/admin/rate-limit-rules/{id}. Partial update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRateLimitRuleRequest {
    pub limit_count: Option<i32>,
    pub window_seconds: Option<i32>,
    pub enabled: Option<bool>,
    pub description: Option<String>,
}

impl UpdateRateLimitRuleRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit_count) = self.limit_count {
            if limit_count < 1 {
                return Err("limit_count must be at least 1".to_string());
            }
        }
        if let Some(window_seconds) = self.window_seconds {
            if window_seconds < 1 {
                return Err("window_seconds must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

/// Body for POST /api/admin/ip-blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockIpRequest {
    pub ip_address: String,
    pub reason: Option<String>,
    /// Permanent block when absent
    pub expires_in_secs: Option<i64>,
    pub created_by: Option<String>,
}

impl BlockIpRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.ip_address.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid IP address: '{}'", self.ip_address));
        }
        if let Some(expires_in_secs) = self.expires_in_secs {
            if expires_in_secs < 1 {
                return Err("expires_in_secs must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateRateLimitRuleRequest {
        CreateRateLimitRuleRequest {
            endpoint: "/api/prayer-times".to_string(),
            method: "GET".to_string(),
            limit_count: 60,
            window_seconds: 60,
            enabled: true,
            description: None,
        }
    }

    #[test]
    fn test_valid_rule() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn test_endpoint_must_start_with_slash() {
        let mut request = create_request();
        request.endpoint = "api/x".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_wildcard_only_trailing() {
        let mut request = create_request();
        request.endpoint = "/api/*".to_string();
        assert!(request.validate().is_ok());

        request.endpoint = "/api/*/deep".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_method_whitelist() {
        let mut request = create_request();
        request.method = "FETCH".to_string();
        assert!(request.validate().is_err());

        request.method = "ALL".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_counts_must_be_positive() {
        let mut request = create_request();
        request.limit_count = 0;
        assert!(request.validate().is_err());

        let mut request = create_request();
        request.window_seconds = -5;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_block_request_ip_validation() {
        let request = BlockIpRequest {
            ip_address: "203.0.113.9".to_string(),
            reason: None,
            expires_in_secs: Some(3600),
            created_by: None,
        };
        assert!(request.validate().is_ok());

        let request = BlockIpRequest {
            ip_address: "2001:db8::1".to_string(),
            reason: None,
            expires_in_secs: None,
            created_by: None,
        };
        assert!(request.validate().is_ok());

        let request = BlockIpRequest {
            ip_address: "not-an-ip".to_string(),
            reason: None,
            expires_in_secs: None,
            created_by: None,
        };
        assert!(request.validate().is_err());
    }
}
