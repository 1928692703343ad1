// Duration parsing and the long-form 16:9 acceptance rules

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::ResolveError;
use super::models::VideoRecord;

/// Videos at or below this length are not long-form.
pub const MIN_DURATION_SECS: u64 = 60;

/// Tolerance when comparing a thumbnail ratio against 16:9.
const ASPECT_TOLERANCE: f64 = 0.02;

/// Parse the `PT#H#M#S` subset of ISO-8601 durations into seconds.
/// Absent components contribute 0; unrecognizable input yields 0.
pub fn duration_seconds(iso: &str) -> u64 {
    lazy_static! {
        static ref DURATION_RE: Regex =
            Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap();
    }

    let caps = match DURATION_RE.captures(iso) {
        Some(caps) => caps,
        None => return 0,
    };
    let component = |index: usize| {
        caps.get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    component(1) * 3600 + component(2) * 60 + component(3)
}

/// Whether the video's medium thumbnail is approximately 16:9.
///
/// Missing or non-positive dimensions accept the video: thumbnail data is
/// advisory, and rejecting on absent metadata would drop valid uploads.
pub fn is_aspect_16x9(video: &VideoRecord) -> bool {
    let thumb = match video.snippet.thumbnails.medium.as_ref() {
        Some(thumb) => thumb,
        None => return true,
    };
    let (width, height) = match (thumb.width, thumb.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (f64::from(w), f64::from(h)),
        _ => return true,
    };
    (width / height - 16.0 / 9.0).abs() < ASPECT_TOLERANCE
}

/// Acceptance rule for a single resolved video.
pub fn check_long_form(video: &VideoRecord) -> Result<(), ResolveError> {
    if duration_seconds(&video.content_details.duration) <= MIN_DURATION_SECS {
        return Err(ResolveError::TooShort);
    }
    if !is_aspect_16x9(video) {
        return Err(ResolveError::WrongAspectRatio);
    }
    Ok(())
}

/// Silent variant of the acceptance rule, used for playlist and channel
/// listings where non-matching videos are dropped rather than errored.
pub fn passes_filter(video: &VideoRecord) -> bool {
    check_long_form(video).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::models::{Thumbnail, Thumbnails};

    fn make_video(duration: &str, dimensions: Option<(u32, u32)>) -> VideoRecord {
        let mut video = VideoRecord {
            id: "abcdefghijk".to_string(),
            ..VideoRecord::default()
        };
        video.content_details.duration = duration.to_string();
        if let Some((width, height)) = dimensions {
            video.snippet.thumbnails = Thumbnails {
                medium: Some(Thumbnail {
                    url: String::new(),
                    width: Some(width),
                    height: Some(height),
                }),
                ..Thumbnails::default()
            };
        }
        video
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(duration_seconds("PT1H2M3S"), 3723);
        assert_eq!(duration_seconds("PT45S"), 45);
        assert_eq!(duration_seconds("PT2M"), 120);
        assert_eq!(duration_seconds("PT3H"), 10800);
        assert_eq!(duration_seconds(""), 0);
        assert_eq!(duration_seconds("1:02:03"), 0);
        assert_eq!(duration_seconds("PT"), 0);
    }

    #[test]
    fn test_duration_boundary_at_sixty_seconds() {
        assert!(matches!(
            check_long_form(&make_video("PT1M", None)),
            Err(ResolveError::TooShort)
        ));
        assert!(check_long_form(&make_video("PT1M1S", None)).is_ok());
    }

    #[test]
    fn test_exact_16x9_accepted() {
        assert!(is_aspect_16x9(&make_video("PT5M", Some((320, 180)))));
        assert!(is_aspect_16x9(&make_video("PT5M", Some((1280, 720)))));
    }

    #[test]
    fn test_off_ratio_rejected() {
        // 16/9 + ~0.03
        assert!(!is_aspect_16x9(&make_video("PT5M", Some((325, 180)))));
        // portrait
        assert!(!is_aspect_16x9(&make_video("PT5M", Some((180, 320)))));
        assert!(matches!(
            check_long_form(&make_video("PT5M", Some((180, 320)))),
            Err(ResolveError::WrongAspectRatio)
        ));
    }

    #[test]
    fn test_missing_thumbnail_accepted() {
        assert!(is_aspect_16x9(&make_video("PT5M", None)));
        assert!(check_long_form(&make_video("PT5M", None)).is_ok());
    }

    #[test]
    fn test_zero_dimensions_accepted() {
        assert!(is_aspect_16x9(&make_video("PT5M", Some((0, 180)))));
    }

    #[test]
    fn test_silent_filter_matches_acceptance_rule() {
        assert!(passes_filter(&make_video("PT5M", Some((320, 180)))));
        assert!(!passes_filter(&make_video("PT30S", Some((320, 180)))));
        assert!(!passes_filter(&make_video("PT5M", Some((320, 320)))));
    }
}
