//! Date pattern formatting
//!
//! Patterns use the familiar letter codes: `yyyy-MM-dd`, `EEEE d MMMM`,
//! `hh:mm a`. A run of one letter is one field and the run length selects the
//! width or the text form. Text between single quotes is copied verbatim and
//! `''` is a literal quote. Month and day names come from the requested
//! locale.

use super::datetime::{week_of_month, week_of_year};
use chrono::{DateTime, Datelike, FixedOffset, Locale, Timelike};
use log::warn;

/// Format an instant with a date pattern
pub(crate) fn format_pattern(
    dt: &DateTime<FixedOffset>,
    pattern: &str,
    locale: Option<&str>,
) -> Result<String, String> {
    let locale = resolve_locale(locale);
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            i = quoted(&chars, i, &mut out)?;
            continue;
        }
        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i] == c {
            i += 1;
        }
        out.push_str(&field(dt, c, i - start, locale)?);
    }
    Ok(out)
}

/// Copy quoted text starting at `start`, returning the index after it
fn quoted(chars: &[char], start: usize, out: &mut String) -> Result<usize, String> {
    if chars.get(start + 1) == Some(&'\'') {
        out.push('\'');
        return Ok(start + 2);
    }
    let mut i = start + 1;
    loop {
        match chars.get(i) {
            None => return Err("unterminated quote".to_string()),
            Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                out.push('\'');
                i += 2;
            }
            Some('\'') => return Ok(i + 1),
            Some(&c) => {
                out.push(c);
                i += 1;
            }
        }
    }
}

fn pad(value: impl Into<i64>, width: usize) -> String {
    format!("{:0width$}", value.into(), width = width)
}

fn localized(dt: &DateTime<FixedOffset>, specifier: &str, locale: Locale) -> String {
    dt.format_localized(specifier, locale).to_string()
}

fn field(dt: &DateTime<FixedOffset>, letter: char, count: usize, locale: Locale) -> Result<String, String> {
    Ok(match letter {
        'G' => (if dt.year() > 0 { "AD" } else { "BC" }).to_string(),
        'y' | 'Y' if count == 2 => pad(dt.year().rem_euclid(100), 2),
        'y' | 'Y' => pad(dt.year(), count),
        'M' | 'L' if count >= 4 => localized(dt, "%B", locale),
        'M' | 'L' if count == 3 => localized(dt, "%b", locale),
        'M' | 'L' => pad(dt.month(), count),
        'd' => pad(dt.day(), count),
        'D' => pad(dt.ordinal(), count),
        'F' => pad(dt.day0() / 7 + 1, count),
        'w' => pad(week_of_year(dt.date_naive()), count),
        'W' => pad(week_of_month(dt.date_naive()), count),
        'E' if count >= 4 => localized(dt, "%A", locale),
        'E' => localized(dt, "%a", locale),
        'u' => pad(dt.weekday().number_from_monday(), count),
        'a' => localized(dt, "%p", locale),
        'H' => pad(dt.hour(), count),
        'k' => pad(if dt.hour() == 0 { 24 } else { dt.hour() }, count),
        'K' => pad(dt.hour() % 12, count),
        'h' => pad(dt.hour12().1, count),
        'm' => pad(dt.minute(), count),
        's' => pad(dt.second(), count),
        'S' => pad(dt.timestamp_subsec_millis(), count),
        'z' if dt.offset().local_minus_utc() == 0 => "UTC".to_string(),
        'z' => dt.format("GMT%:z").to_string(),
        'Z' => dt.format("%z").to_string(),
        'X' if dt.offset().local_minus_utc() == 0 => "Z".to_string(),
        'X' if count == 1 => dt.format("%z").to_string().chars().take(3).collect(),
        'X' if count == 2 => dt.format("%z").to_string(),
        'X' => dt.format("%:z").to_string(),
        other => return Err(format!("illegal pattern character '{}'", other)),
    })
}

/// Map a `language[_COUNTRY]` tag to formatting data
///
/// A bare language falls back to its main country (`fr` to `fr_FR`).
fn resolve_locale(tag: Option<&str>) -> Locale {
    let Some(tag) = tag else {
        return Locale::en_US;
    };
    let tag = tag.replace('-', "_");
    let language = tag.split('_').next().unwrap_or_default().to_lowercase();
    let candidates = [
        tag.clone(),
        format!("{}_{}", language, language.to_uppercase()),
    ];
    for candidate in &candidates {
        if let Ok(locale) = Locale::try_from(candidate.as_str()) {
            return locale;
        }
    }
    warn!("No formatting data for locale {}, using en_US", tag);
    Locale::en_US
}
