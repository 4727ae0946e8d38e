use std::sync::Arc;

use super::*;
use crate::entitlement::LocalDailyCounter;
use crate::foundation::core::Rgba8Premul;
use crate::format::catalog::FormatRecord;
use crate::format::model::SafeZone;
use crate::media::blob::InMemoryBlobStore;
use crate::media::visual::{Bitmap, VideoStream};
use crate::render::placeholder::PlaceholderStyle;
use crate::session::frame_loop::ManualFrameScheduler;

fn record(platform: &str, format: &str, w: u32, h: u32, order: i32) -> FormatRecord {
    FormatRecord {
        platform: platform.to_string(),
        format_name: format.to_string(),
        width: w,
        height: h,
        description: None,
        reference_link: None,
        sort_order: order,
        active: true,
        safe_zone: Some(SafeZone {
            top: 4,
            right: 0,
            bottom: 4,
            left: 0,
        }),
        danger_zones: None,
    }
}

struct Harness {
    sched: ManualFrameScheduler,
    blobs: Rc<InMemoryBlobStore>,
    session: PreviewSession,
}

fn harness() -> Harness {
    let catalog = CatalogSnapshot::from_records(vec![
        record("Instagram", "Story", 20, 40, 1),
        record("Instagram", "Feed", 20, 20, 2),
        record("TikTok", "In-Feed", 30, 60, 3),
    ]);
    let sched = ManualFrameScheduler::new();
    let blobs = Rc::new(InMemoryBlobStore::new());
    let session = PreviewSession::new(catalog, Rc::new(sched.clone()), blobs.clone());
    Harness {
        sched,
        blobs,
        session,
    }
}

fn image() -> Visual {
    Visual::Image(Arc::new(Bitmap {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 0, 255, 255]),
    }))
}

fn video(blobs: &InMemoryBlobStore) -> Visual {
    let handle = blobs.create(Arc::new(vec![0; 8]), "video/mp4").unwrap();
    Visual::Video(VideoStream {
        handle,
        file_name: "clip.mp4".to_string(),
        content_type: "video/mp4".to_string(),
    })
}

fn quiet_compositor() -> Compositor {
    Compositor::new(PlaceholderStyle {
        label: String::new(),
        ..PlaceholderStyle::default()
    })
}

#[test]
fn selecting_a_platform_picks_its_first_format() {
    let mut h = harness();
    assert!(h.session.select_platform("Instagram"));
    assert_eq!(
        h.session.selection(),
        Some(&Selection::Catalog(FormatKey::new("Instagram", "Story")))
    );
    assert!(!h.session.select_platform("Snapchat"));
}

#[test]
fn render_sizes_target_to_the_format() {
    let mut h = harness();
    let mut c = quiet_compositor();
    let mut t = RenderTarget::new(Canvas {
        width: 1,
        height: 1,
    })
    .unwrap();
    assert_eq!(
        h.session.render(&mut c, &mut t).unwrap(),
        RenderOutcome::NothingSelected
    );

    h.session.select_platform("TikTok");
    assert_eq!(
        h.session.render(&mut c, &mut t).unwrap(),
        RenderOutcome::Rendered
    );
    assert_eq!((t.width(), t.height()), (30, 60));
}

#[test]
fn unknown_format_leaves_the_canvas_alone() {
    let mut h = harness();
    let mut c = quiet_compositor();
    let mut t = RenderTarget::new(Canvas {
        width: 1,
        height: 1,
    })
    .unwrap();
    h.session.select_platform("Instagram");
    h.session.render(&mut c, &mut t).unwrap();
    let before = t.data_premul().to_vec();

    h.session
        .on_format_changed(FormatKey::new("Instagram", "Reel"));
    assert_eq!(
        h.session.render(&mut c, &mut t).unwrap(),
        RenderOutcome::SkippedUnknownFormat
    );
    assert_eq!((t.width(), t.height()), (20, 40));
    assert_eq!(t.data_premul(), before.as_slice());
}

#[test]
fn custom_canvas_has_no_mask() {
    let mut h = harness();
    let mut c = quiet_compositor();
    let mut t = RenderTarget::new(Canvas {
        width: 1,
        height: 1,
    })
    .unwrap();
    h.session.set_custom_canvas(
        "Billboard",
        Canvas {
            width: 12,
            height: 6,
        },
    );
    h.session.render(&mut c, &mut t).unwrap();
    assert_eq!((t.width(), t.height()), (12, 6));
    assert_eq!(
        t.pixel(0, 0).unwrap(),
        Rgba8Premul {
            r: 0xf0,
            g: 0xf0,
            b: 0xf0,
            a: 255
        }
    );
    assert!(h.session.export_mask(&mut Exporter::new(), 1.0).is_err());
}

#[test]
fn stale_decode_does_not_overwrite_newer_visual() {
    let mut h = harness();
    let slow = h.session.begin_decode();
    let fast = h.session.begin_decode();
    assert!(h.session.on_visual_changed(fast, image()));

    let late = video(&h.blobs);
    let handle = late.video_handle().unwrap().clone();
    assert!(!h.session.on_visual_changed(slow, late));
    assert!(matches!(h.session.visual(), Some(Visual::Image(_))));
    assert_eq!(h.blobs.revocations(&handle), 1);
    assert!(!h.session.is_animating());
}

#[test]
fn video_to_image_revokes_once_and_stops_the_loop() {
    let mut h = harness();
    let mut c = quiet_compositor();
    h.session.select_platform("Instagram");
    let mut t = RenderTarget::new(Canvas {
        width: 20,
        height: 40,
    })
    .unwrap();

    let v = video(&h.blobs);
    let handle = v.video_handle().unwrap().clone();
    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, v);
    assert!(h.session.is_animating());

    let first = h.sched.take_due();
    assert!(h.session.on_animation_frame(first[0], &mut c, &mut t).unwrap());
    assert_eq!(h.sched.pending(), 1);

    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, image());
    assert_eq!(h.blobs.revocations(&handle), 1);
    assert!(!h.session.is_animating());
    assert!(h.sched.take_due().is_empty());
    assert!(!h.session.on_animation_frame(first[0], &mut c, &mut t).unwrap());

    h.session.close();
    drop(h.session);
    assert_eq!(h.blobs.revocations(&handle), 1);
}

#[test]
fn animation_frame_follows_format_changes() {
    let mut h = harness();
    let mut c = quiet_compositor();
    let mut t = RenderTarget::new(Canvas {
        width: 1,
        height: 1,
    })
    .unwrap();
    h.session.select_platform("Instagram");
    let v = video(&h.blobs);
    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, v);

    let due = h.sched.take_due();
    assert!(h.session.on_animation_frame(due[0], &mut c, &mut t).unwrap());
    assert_eq!((t.width(), t.height()), (20, 40));

    h.session
        .on_format_changed(FormatKey::new("TikTok", "In-Feed"));
    let due = h.sched.take_due();
    assert!(h.session.on_animation_frame(due[0], &mut c, &mut t).unwrap());
    assert_eq!((t.width(), t.height()), (30, 60));
    assert_eq!(t.pixel(0, 0).unwrap().a, 102);
    assert_eq!(t.pixel(15, 30).unwrap().a, 0);

    h.session
        .on_format_changed(FormatKey::new("TikTok", "Gone"));
    let due = h.sched.take_due();
    assert!(!h.session.on_animation_frame(due[0], &mut c, &mut t).unwrap());
    assert_eq!((t.width(), t.height()), (30, 60));
    assert_eq!(h.sched.pending(), 1);
}

#[test]
fn clear_and_drop_revoke_exactly_once() {
    let mut h = harness();
    let v = video(&h.blobs);
    let handle = v.video_handle().unwrap().clone();
    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, v);
    assert!(h.session.clear());
    assert!(h.session.visual().is_none());
    h.session.clear();
    drop(h.session);
    assert_eq!(h.blobs.revocations(&handle), 1);
    assert_eq!(h.blobs.live_count(), 0);
    assert_eq!(h.sched.pending(), 0);
}

#[test]
fn dropping_the_session_releases_a_playing_video() {
    let h = harness();
    let Harness {
        sched,
        blobs,
        mut session,
    } = h;
    let v = video(&blobs);
    let handle = v.video_handle().unwrap().clone();
    let ticket = session.begin_decode();
    session.on_visual_changed(ticket, v);
    drop(session);
    assert_eq!(blobs.revocations(&handle), 1);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn failed_video_returns_to_empty_state() {
    let mut h = harness();
    let v = video(&h.blobs);
    let handle = v.video_handle().unwrap().clone();
    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, v);

    assert!(!h.session.on_video_failed(&BlobHandle::new("blob:other")));
    assert!(h.session.on_video_failed(&handle));
    assert!(h.session.visual().is_none());
    assert!(!h.session.is_animating());
    assert_eq!(h.blobs.revocations(&handle), 1);
}

#[test]
fn opening_another_creative_cancels_in_flight_decode() {
    let mut h = harness();
    let ticket = h.session.begin_decode();
    h.session.open_creative(Selection::Catalog(FormatKey::new("TikTok", "In-Feed")));
    assert!(!h.session.on_visual_changed(ticket, image()));
    assert!(h.session.visual().is_none());
}

#[test]
fn style_changes_are_validated() {
    let mut h = harness();
    let style = MaskStyle::parse("#00ff00", 0.8).unwrap();
    assert!(h.session.on_style_changed(style).unwrap());
    assert_eq!(h.session.style(), &style);
    let bad = MaskStyle {
        opacity: -0.1,
        ..style
    };
    assert!(h.session.on_style_changed(bad).is_err());
    assert_eq!(h.session.style(), &style);
}

#[test]
fn export_names_the_file_after_the_selection() {
    let mut h = harness();
    h.session.select_platform("Instagram");
    let (name, export) = h.session.export_mask(&mut Exporter::new(), 0.5).unwrap();
    assert_eq!(name, "Instagram_Story_mask.png");
    assert_eq!((export.width, export.height), (10, 20));
}

#[test]
fn video_layout_only_for_video() {
    let mut h = harness();
    let rendered = ScreenBox {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 200.0,
    };
    assert!(
        h.session
            .video_layout(rendered, OverlayStacking::default())
            .is_none()
    );
    let v = video(&h.blobs);
    let ticket = h.session.begin_decode();
    h.session.on_visual_changed(ticket, v);
    let layout = h
        .session
        .video_layout(rendered, OverlayStacking::default())
        .unwrap();
    assert_eq!((layout.width_px, layout.height_px), (100.0, 200.0));
}

#[test]
fn oversized_upload_is_rejected_without_side_effects() {
    let mut h = harness();
    let loader = MediaLoader::with_default_policies(h.blobs.clone());
    let mut quota = LocalDailyCounter::new(3, "day");

    let big = Upload::new("big.png", "image/png", vec![0; 10 * 1024 * 1024 + 1]);
    let err = h
        .session
        .load_upload(&loader, Some(&big), MediaKind::Image, &false, &mut quota)
        .unwrap_err();
    assert!(err.reason().starts_with("File too large"));
    assert!(h.session.visual().is_none());
    assert_eq!(quota.count, 0);
}

#[test]
fn free_users_cannot_load_video() {
    let mut h = harness();
    let loader = MediaLoader::with_default_policies(h.blobs.clone());
    let mut quota = LocalDailyCounter::new(3, "day");
    let clip = Upload::new("clip.mp4", "video/mp4", vec![0; 16]);
    let err = h
        .session
        .load_upload(&loader, Some(&clip), MediaKind::Video, &false, &mut quota)
        .unwrap_err();
    assert_eq!(err.reason(), "Video upload is a PRO feature");
    assert_eq!(h.blobs.live_count(), 0);

    assert!(
        h.session
            .load_upload(&loader, Some(&clip), MediaKind::Video, &true, &mut quota)
            .unwrap()
    );
    assert!(h.session.is_animating());
    assert_eq!(quota.count, 0);
}
