use chrono::TimeZone;

use super::*;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap() + chrono::Duration::milliseconds(123)
}

#[test]
fn deterministic_for_a_timestamp() {
    assert_eq!(
        export_filename(at(), false, ExportFormat::Png),
        "caption-art-2026-10-19T08-30-00-123Z.png"
    );
    assert_eq!(
        export_filename(at(), true, ExportFormat::Jpeg),
        "caption-art-2026-10-19T08-30-00-123Z-watermarked.jpg"
    );
}

#[test]
fn structure_holds_for_now() {
    let name = export_filename(Utc::now(), true, ExportFormat::Png);
    assert!(name.starts_with("caption-art-"));
    assert!(name.ends_with("-watermarked.png"));
    let stamp = &name["caption-art-".len()..name.len() - "-watermarked.png".len()];
    assert_eq!(stamp.len(), "2026-10-19T08-30-00-123Z".len());
    assert!(!stamp.contains(':') && !stamp.contains('.'));
}
