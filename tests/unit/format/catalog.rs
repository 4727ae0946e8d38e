use super::*;

fn record(platform: &str, format: &str, sort_order: i32) -> FormatRecord {
    FormatRecord {
        platform: platform.to_string(),
        format_name: format.to_string(),
        width: 1080,
        height: 1920,
        description: None,
        reference_link: None,
        sort_order,
        active: true,
        safe_zone: Some(SafeZone {
            top: 250,
            right: 0,
            bottom: 250,
            left: 0,
        }),
        danger_zones: None,
    }
}

#[test]
fn snapshot_orders_by_sort_order_and_groups_platforms() {
    let snap = CatalogSnapshot::from_records(vec![
        record("TikTok", "Feed", 3),
        record("Instagram", "Story (9:16)", 1),
        record("Instagram", "Reel", 2),
    ]);
    assert_eq!(snap.platforms(), vec!["Instagram", "TikTok"]);
    assert_eq!(snap.formats("Instagram"), vec!["Story (9:16)", "Reel"]);
    assert_eq!(snap.first_format("TikTok"), Some("Feed"));
    assert_eq!(snap.first_format("Snapchat"), None);
}

#[test]
fn inactive_rows_are_hidden() {
    let mut off = record("Instagram", "Legacy", 0);
    off.active = false;
    let snap = CatalogSnapshot::from_records(vec![off, record("Instagram", "Story", 1)]);
    assert_eq!(snap.len(), 1);
    assert!(snap.get("Instagram", "Legacy").is_none());

    let mut off = record("Instagram", "Legacy", 0);
    off.active = false;
    let listed = StaticCatalog::new(vec![off]).list_active_formats().unwrap();
    assert!(listed.is_empty());
}

#[test]
fn duplicate_key_replaces_spec_in_place() {
    let mut newer = record("Instagram", "Story", 5);
    newer.width = 720;
    let snap = CatalogSnapshot::from_records(vec![
        record("Instagram", "Story", 1),
        record("Instagram", "Reel", 2),
        newer,
    ]);
    assert_eq!(snap.formats("Instagram"), vec!["Story", "Reel"]);
    assert_eq!(snap.get("Instagram", "Story").unwrap().width, 720);
}

#[test]
fn invalid_rows_are_skipped_not_fatal() {
    let mut bad = record("Instagram", "Broken", 0);
    bad.width = 0;
    let snap = CatalogSnapshot::from_records(vec![bad, record("Instagram", "Story", 1)]);
    assert_eq!(snap.len(), 1);
    assert!(snap.get("Instagram", "Broken").is_none());
}

#[test]
fn mask_geometry_lookup() {
    let mut plain = record("Custom", "Banner", 0);
    plain.safe_zone = None;
    let snap = CatalogSnapshot::from_records(vec![plain, record("Instagram", "Story", 1)]);
    assert!(snap.has_mask_geometry("Instagram", "Story"));
    assert!(!snap.has_mask_geometry("Custom", "Banner"));
    assert!(!snap.has_mask_geometry("Nope", "Nope"));
}

#[test]
fn records_parse_from_backend_rows() {
    let json = r#"[
        {"platform":"Instagram","format_name":"Story (9:16)","width":1080,"height":1920,
         "description":"Full screen vertical","reference_link":"https://example.com",
         "sort_order":1,"active":true,
         "safe_zone":{"top":250,"right":0,"bottom":250,"left":0},"danger_zones":null},
        {"platform":"TikTok","format_name":"Feed","width":1080,"height":1920,
         "danger_zones":[{"x":0,"y":1500,"width":1080,"height":420}]}
    ]"#;
    let records: Vec<FormatRecord> = serde_json::from_str(json).unwrap();
    assert!(records[1].active);
    assert_eq!(records[1].sort_order, 0);

    let snap = CatalogSnapshot::from_records(records);
    let entry = snap.entry("Instagram", "Story (9:16)").unwrap();
    assert_eq!(entry.description.as_deref(), Some("Full screen vertical"));
    assert_eq!(
        snap.get("TikTok", "Feed").unwrap().danger_zones.as_ref().unwrap().len(),
        1
    );
    assert_eq!(snap.platforms(), vec!["TikTok", "Instagram"]);
}

#[test]
fn json_file_catalog_reports_missing_file() {
    let catalog = JsonFileCatalog::new("target/does-not-exist/formats.json");
    let err = CatalogSnapshot::load(&catalog).unwrap_err();
    assert!(err.to_string().contains("read format catalog"));
}
