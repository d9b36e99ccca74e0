use rand::{Rng, distr::Alphanumeric};

use crate::types::VideoCategory;

/// Longest caption shown in the gallery before it is cut with `...`.
pub const CAPTION_MAX_CHARS: usize = 120;

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Formats an ISO-8601 video duration (`PT1H23M45S`) as `1:23:45`.
///
/// Hours are only shown when non-zero (`PT4M5S` becomes `4:05`). Input
/// without a `PT` marker yields `0:00`.
pub fn format_duration(iso: &str) -> String {
    let Some(start) = iso.find("PT") else {
        return "0:00".to_string();
    };

    let mut rest = &iso[start + 2..];
    let hours = take_component(&mut rest, 'H');
    let minutes = take_component(&mut rest, 'M');
    let seconds = take_component(&mut rest, 'S');

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Consumes `<digits><unit>` from the front of `rest` if present.
fn take_component(rest: &mut &str, unit: char) -> u64 {
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !rest[digits..].starts_with(unit) {
        return 0;
    }

    let value = rest[..digits].parse().unwrap_or(0);
    *rest = &rest[digits + unit.len_utf8()..];
    value
}

/// Abbreviates a raw view count: `1234567` becomes `1.2M`, `45300` becomes
/// `45.3K`. Counts below a thousand, and anything that is not a number, are
/// returned unchanged.
pub fn format_view_count(raw: &str) -> String {
    let Ok(count) = raw.trim().parse::<u64>() else {
        return raw.to_string();
    };

    let (divisor, suffix) = if count >= 1_000_000 {
        (1_000_000, 'M')
    } else if count >= 1_000 {
        (1_000, 'K')
    } else {
        return raw.to_string();
    };

    // one decimal, half rounded up
    let tenths = (count * 10 + divisor / 2) / divisor;
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// Assigns a video to a site category from its title and description.
///
/// Rules are checked in order (live, music, behind, interview) and the first
/// match wins. Anything unmatched is filed under music.
pub fn categorize_video(title: &str, description: &str) -> VideoCategory {
    let title = title.to_lowercase();
    let description = description.to_lowercase();
    let title_has = |needles: &[&str]| needles.iter().any(|n| title.contains(n));
    let description_has = |needles: &[&str]| needles.iter().any(|n| description.contains(n));

    if title_has(&["live", "perform"]) || description_has(&["live", "performance"]) {
        VideoCategory::Live
    } else if title_has(&["music video", "official video", "official audio"]) {
        VideoCategory::Music
    } else if title_has(&["behind", "making of"]) || description.contains("behind the scenes") {
        VideoCategory::Behind
    } else if title.contains("interview") || description.contains("interview") {
        VideoCategory::Interview
    } else {
        VideoCategory::Music
    }
}

/// Strips hashtags from an Instagram caption and shortens it for display.
///
/// A hashtag is `#` followed by at least one character that is neither
/// whitespace nor another `#`. A lone `#` is kept.
pub fn clean_caption(caption: &str) -> String {
    let mut cleaned = String::with_capacity(caption.len());
    let mut chars = caption.chars().peekable();

    while let Some(c) = chars.next() {
        let starts_tag = c == '#'
            && chars
                .peek()
                .is_some_and(|next| !next.is_whitespace() && *next != '#');

        if starts_tag {
            while chars
                .peek()
                .is_some_and(|next| !next.is_whitespace() && *next != '#')
            {
                chars.next();
            }
        } else {
            cleaned.push(c);
        }
    }

    let cleaned = cleaned.trim();
    if cleaned.chars().count() > CAPTION_MAX_CHARS {
        let cut: String = cleaned.chars().take(CAPTION_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        cleaned.to_string()
    }
}
