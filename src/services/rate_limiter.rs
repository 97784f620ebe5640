//! Distributed request-admission control
//!
//! Rules live in the database and are editable at runtime; they are cached
//! in-process for a few seconds to keep the hot path off the DB. Counters
//! are fixed windows in Redis keyed by (ip, endpoint, window_start) with a
//! TTL equal to the window, so state is shared across replicas and expires
//! itself. Any internal error fails open: the request is allowed and the
//! error is logged.

use moka::future::Cache;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::entities::rate_limit_rules::{self, Entity as RateLimitRules};

const RULES_CACHE_KEY: &str = "enabled_rules";

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: i32,
    pub remaining: i32,
    /// Epoch seconds when the current window resets
    pub reset_time: i64,
    pub retry_after: Option<i64>,
}

impl RateLimitDecision {
    /// Unlimited default: no enabled rule matched, or the limiter itself
    /// failed and we fail open.
    fn unlimited() -> Self {
        Self {
            allowed: true,
            limit: 0,
            remaining: 0,
            reset_time: 0,
            retry_after: None,
        }
    }
}

/// Resolve the governing rule for (endpoint, method).
/// Precedence: exact (endpoint, method) > exact endpoint with method=ALL >
/// trailing-`*` wildcard (longest pattern first, then declaration order).
pub fn resolve_rule<'a>(
    rules: &'a [rate_limit_rules::Model],
    endpoint: &str,
    method: &str,
) -> Option<&'a rate_limit_rules::Model> {
    // Exact endpoint + exact method
    if let Some(rule) = rules
        .iter()
        .find(|r| r.endpoint == endpoint && r.method == method)
    {
        return Some(rule);
    }

    // Exact endpoint + ALL
    if let Some(rule) = rules
        .iter()
        .find(|r| r.endpoint == endpoint && r.method == "ALL")
    {
        return Some(rule);
    }

    // Wildcard patterns; longest prefix wins, ties broken by declaration
    // order (rules are sorted by id)
    rules
        .iter()
        .filter(|r| r.endpoint.ends_with('*'))
        .filter(|r| r.method == method || r.method == "ALL")
        .filter(|r| endpoint.starts_with(&r.endpoint[..r.endpoint.len() - 1]))
        .max_by(|a, b| {
            a.endpoint
                .len()
                .cmp(&b.endpoint.len())
                .then(b.id.cmp(&a.id))
        })
}

/// Start of the fixed window containing now_epoch.
pub fn window_start(now_epoch: i64, window_seconds: i64) -> i64 {
    now_epoch - now_epoch.rem_euclid(window_seconds)
}

#[derive(Clone)]
pub struct RateLimiterService {
    redis: ConnectionManager,
    rules_cache: Arc<Cache<&'static str, Arc<Vec<rate_limit_rules::Model>>>>,
}

impl RateLimiterService {
    pub fn new(redis: ConnectionManager) -> Self {
        let rules_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(15))
            .build();

        Self {
            redis,
            rules_cache: Arc::new(rules_cache),
        }
    }

    /// Admission check for one request. Never returns an error: on any
    /// internal failure the request is allowed.
    pub async fn check(
        &self,
        db: &DatabaseConnection,
        ip: &str,
        endpoint: &str,
        method: &str,
    ) -> RateLimitDecision {
        match self.check_inner(db, ip, endpoint, method).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(
                    "Rate limiter error for {} {} from {}: {}. Allowing request",
                    method,
                    endpoint,
                    ip,
                    e
                );
                RateLimitDecision::unlimited()
            }
        }
    }

    async fn check_inner(
        &self,
        db: &DatabaseConnection,
        ip: &str,
        endpoint: &str,
        method: &str,
    ) -> Result<RateLimitDecision, Box<dyn std::error::Error + Send + Sync>> {
        let rules = self.enabled_rules(db).await?;

        let Some(rule) = resolve_rule(&rules, endpoint, method) else {
            // No rule configured: unconfigured endpoints stay reachable
            return Ok(RateLimitDecision::unlimited());
        };

        let now = chrono::Utc::now().timestamp();
        let window = rule.window_seconds as i64;
        let start = window_start(now, window);
        let reset_time = start + window;

        let key = format!("ratelimit:{}:{}:{}", ip, rule.endpoint, start);

        let mut conn = self.redis.clone();
        let count: i64 = conn.incr(&key, 1).await?;
        if count == 1 {
            // First hit in this window owns the expiry
            conn.expire::<_, ()>(&key, window).await?;
        }

        let allowed = count <= rule.limit_count as i64;
        let remaining = (rule.limit_count as i64 - count).max(0) as i32;

        Ok(RateLimitDecision {
            allowed,
            limit: rule.limit_count,
            remaining,
            reset_time,
            retry_after: if allowed { None } else { Some(reset_time - now) },
        })
    }

    async fn enabled_rules(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Arc<Vec<rate_limit_rules::Model>>, sea_orm::DbErr> {
        if let Some(rules) = self.rules_cache.get(&RULES_CACHE_KEY).await {
            return Ok(rules);
        }

        let rules = RateLimitRules::find()
            .filter(rate_limit_rules::Column::Enabled.eq(true))
            .order_by_asc(rate_limit_rules::Column::Id)
            .all(db)
            .await?;

        let rules = Arc::new(rules);
        self.rules_cache
            .insert(RULES_CACHE_KEY, rules.clone())
            .await;

        Ok(rules)
    }

    /// Drop the cached rule set so admin edits take effect immediately.
    pub async fn invalidate_rules(&self) {
        self.rules_cache.invalidate(&RULES_CACHE_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(id: i32, endpoint: &str, method: &str, limit: i32) -> rate_limit_rules::Model {
        rate_limit_rules::Model {
            id,
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            limit_count: limit,
            window_seconds: 60,
            enabled: true,
            description: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_exact_match_beats_wildcard() {
        let rules = vec![rule(1, "/a/*", "ALL", 5), rule(2, "/a/b", "GET", 2)];
        let resolved = resolve_rule(&rules, "/a/b", "GET").unwrap();
        assert_eq!(resolved.limit_count, 2);
    }

    #[test]
    fn test_exact_method_beats_all() {
        let rules = vec![rule(1, "/a/b", "ALL", 10), rule(2, "/a/b", "POST", 3)];
        let resolved = resolve_rule(&rules, "/a/b", "POST").unwrap();
        assert_eq!(resolved.limit_count, 3);
    }

    #[test]
    fn test_wildcard_prefix_match() {
        let rules = vec![rule(1, "/api/admin/*", "ALL", 5)];
        assert!(resolve_rule(&rules, "/api/admin/jobs", "GET").is_some());
        assert!(resolve_rule(&rules, "/api/public", "GET").is_none());
    }

    #[test]
    fn test_longest_wildcard_wins() {
        let rules = vec![rule(1, "/api/*", "ALL", 100), rule(2, "/api/admin/*", "ALL", 5)];
        let resolved = resolve_rule(&rules, "/api/admin/jobs", "GET").unwrap();
        assert_eq!(resolved.limit_count, 5);
    }

    #[test]
    fn test_wildcard_method_must_match() {
        let rules = vec![rule(1, "/api/*", "POST", 5)];
        assert!(resolve_rule(&rules, "/api/jobs", "GET").is_none());
        assert!(resolve_rule(&rules, "/api/jobs", "POST").is_some());
    }

    #[test]
    fn test_no_rule_is_none() {
        let rules = vec![rule(1, "/a/b", "GET", 2)];
        assert!(resolve_rule(&rules, "/c/d", "GET").is_none());
        assert!(resolve_rule(&rules, "/a/b", "POST").is_none());
    }

    #[test]
    fn test_window_start_alignment() {
        assert_eq!(window_start(0, 60), 0);
        assert_eq!(window_start(59, 60), 0);
        assert_eq!(window_start(60, 60), 60);
        assert_eq!(window_start(125, 60), 120);
    }
}
