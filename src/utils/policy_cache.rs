use crate::model::policy::Policy;
use crate::store::{SettingsProvider, StoreError};
use anyhow::Result;
use chrono::FixedOffset;
use moka::future::Cache;
use std::time::Duration;

const POLICY_KEY: &str = "policy";

/// Resolved attendance policy, refreshed from the settings sheet after the TTL.
#[derive(Clone)]
pub struct PolicyCache {
    cache: Cache<&'static str, Policy>,
    zone: FixedOffset,
}

impl PolicyCache {
    pub fn new(ttl: Duration, zone: FixedOffset) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build(),
            zone,
        }
    }

    /// Cached policy, loading it from `settings` on a miss
    pub async fn get_or_load(&self, settings: &dyn SettingsProvider) -> Result<Policy, StoreError> {
        if let Some(policy) = self.cache.get(POLICY_KEY).await {
            return Ok(policy);
        }

        let raw = settings.settings().await?;
        let policy = Policy::from_settings(&raw, &self.zone);
        self.cache.insert(POLICY_KEY, policy.clone()).await;
        Ok(policy)
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(POLICY_KEY).await;
    }
}

/// Load the policy once at startup so the first request does not pay for it
pub async fn warmup_policy_cache(cache: &PolicyCache, settings: &dyn SettingsProvider) -> Result<()> {
    cache.invalidate().await;
    let policy = cache.get_or_load(settings).await?;

    log::info!(
        "Policy cache warmup complete: start {} grace {}m working days {}",
        policy.start_time,
        policy.late_grace_period_minutes,
        policy.working_days
    );

    Ok(())
}
