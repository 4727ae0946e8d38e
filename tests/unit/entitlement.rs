use super::*;

#[test]
fn entitled_users_export_full_resolution_without_counting() {
    let mut quota = LocalDailyCounter::new(3, "2026-10-19");
    quota.count = 3;
    let grant = authorize_export(&true, &quota, 0.5).unwrap();
    assert_eq!(grant.tier, ExportTier::Full);
    assert_eq!(grant.scale, 1.0);
    grant.commit(&mut quota);
    assert_eq!(quota.count, 3);
}

#[test]
fn free_users_get_preview_scale_until_the_limit() {
    let mut quota = LocalDailyCounter::new(3, "2026-10-19");
    for _ in 0..3 {
        let grant = authorize_export(&false, &quota, 0.5).unwrap();
        assert_eq!(grant.tier, ExportTier::Preview);
        assert_eq!(grant.scale, 0.5);
        grant.commit(&mut quota);
    }
    assert_eq!(quota.remaining(), 0);
    let err = authorize_export(&false, &quota, 0.5).unwrap_err();
    assert!(matches!(err, SafezoneError::Entitlement(_)));
    assert_eq!(err.reason(), "Daily download limit reached (3/3)");
}

#[test]
fn new_day_resets_the_counter() {
    let mut quota = LocalDailyCounter::new(3, "2026-10-19");
    quota.count = 3;
    quota.set_day("2026-10-19");
    assert_eq!(quota.remaining(), 0);
    quota.set_day("2026-10-20");
    assert_eq!(quota.remaining(), 3);
    assert_eq!(quota.day, "2026-10-20");
}

#[test]
fn video_requires_entitlement() {
    let quota = LocalDailyCounter::new(3, "d");
    let err = authorize_upload(&false, &quota, MediaKind::Video).unwrap_err();
    assert_eq!(err.reason(), "Video upload is a PRO feature");
    authorize_upload(&true, &quota, MediaKind::Video).unwrap();
}

#[test]
fn free_image_uploads_are_limited() {
    let mut quota = LocalDailyCounter::new(1, "d");
    authorize_upload(&false, &quota, MediaKind::Image).unwrap();
    quota.increment();
    let err = authorize_upload(&false, &quota, MediaKind::Image).unwrap_err();
    assert_eq!(err.reason(), "Daily upload limit reached (1/1)");
}

#[test]
fn counter_round_trips_through_json() {
    let quota = LocalDailyCounter {
        limit: 3,
        count: 2,
        day: "Mon Oct 19 2026".to_string(),
    };
    let json = serde_json::to_string(&quota).unwrap();
    let back: LocalDailyCounter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, quota);
}
