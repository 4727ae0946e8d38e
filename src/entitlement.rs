//! Gating of exports and uploads by subscription tier and the free-tier daily counter.
//!
//! Subscription state lives outside the crate; callers supply it through [`Entitlement`] and a
//! [`DailyQuota`].

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::media::visual::MediaKind;

/// Whether the current user holds a paid plan.
pub trait Entitlement {
    fn is_entitled(&self) -> bool;
}

impl Entitlement for bool {
    fn is_entitled(&self) -> bool {
        *self
    }
}

/// A per-day usage counter for free users.
pub trait DailyQuota {
    fn limit(&self) -> u32;
    fn used(&self) -> u32;
    fn increment(&mut self);

    fn remaining(&self) -> u32 {
        self.limit().saturating_sub(self.used())
    }
}

/// Counter persisted by the host as JSON, reset whenever the day key changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDailyCounter {
    pub limit: u32,
    pub count: u32,
    /// Opaque day key, e.g. `2026-10-19`.
    pub day: String,
}

impl LocalDailyCounter {
    pub fn new(limit: u32, day: impl Into<String>) -> Self {
        Self {
            limit,
            count: 0,
            day: day.into(),
        }
    }

    /// Move to `day`, zeroing the count if it is a different day.
    pub fn set_day(&mut self, day: &str) {
        if self.day != day {
            self.day = day.to_owned();
            self.count = 0;
        }
    }
}

impl DailyQuota for LocalDailyCounter {
    fn limit(&self) -> u32 {
        self.limit
    }

    fn used(&self) -> u32 {
        self.count
    }

    fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTier {
    /// Full resolution, not counted.
    Full,
    /// Reduced resolution, counted against the daily quota.
    Preview,
}

/// Permission to export once, at `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportGrant {
    pub tier: ExportTier,
    pub scale: f64,
}

impl ExportGrant {
    /// Record the export against `quota` once it has succeeded.
    pub fn commit(&self, quota: &mut dyn DailyQuota) {
        if self.tier == ExportTier::Preview {
            quota.increment();
        }
    }
}

pub fn authorize_export(
    entitlement: &dyn Entitlement,
    quota: &dyn DailyQuota,
    preview_scale: f64,
) -> SafezoneResult<ExportGrant> {
    if entitlement.is_entitled() {
        return Ok(ExportGrant {
            tier: ExportTier::Full,
            scale: 1.0,
        });
    }
    if quota.remaining() == 0 {
        return Err(SafezoneError::entitlement(format!(
            "Daily download limit reached ({}/{})",
            quota.used(),
            quota.limit()
        )));
    }
    Ok(ExportGrant {
        tier: ExportTier::Preview,
        scale: preview_scale,
    })
}

/// Video needs a paid plan; free image uploads are limited per day.
///
/// A free upload that passes here should be counted with [`DailyQuota::increment`] once it has
/// validated.
pub fn authorize_upload(
    entitlement: &dyn Entitlement,
    quota: &dyn DailyQuota,
    kind: MediaKind,
) -> SafezoneResult<()> {
    if entitlement.is_entitled() {
        return Ok(());
    }
    if kind == MediaKind::Video {
        return Err(SafezoneError::entitlement("Video upload is a PRO feature"));
    }
    if quota.remaining() == 0 {
        return Err(SafezoneError::entitlement(format!(
            "Daily upload limit reached ({}/{})",
            quota.used(),
            quota.limit()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/entitlement.rs"]
mod tests;
