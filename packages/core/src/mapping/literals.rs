//! Literal codecs
//!
//! Text leaves of a value tree hold canonical literals. Parsing is lenient
//! (several date shapes, locale tags with `_` or `-`), formatting is strict:
//! dates use one of two fixed shapes, normalized to the configured offset.

use crate::models::{Locale, QualifiedName, UnitOfMeasure, UnlimitedInteger, Value, ValueKind};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Prefix of the locale entry inside a localized free-text group
pub const LOCALE_MARKER: &str = "#locale-";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"];

fn locale_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{2,3})(?:[_-]([A-Za-z]{2}))?$").unwrap_or_else(|_| unreachable!())
    })
}

/// Parse a literal into a scalar of `kind`
///
/// `Ok(None)` means the literal denotes no value (empty boolean); `Err`
/// carries a description of a malformed literal.
pub fn parse_literal(
    kind: ValueKind,
    literal: &str,
    offset: FixedOffset,
) -> Result<Option<Value>, String> {
    let trimmed = literal.trim();
    let value = match kind {
        ValueKind::Text => Value::Text(literal.to_string()),
        ValueKind::FreeText => Value::FreeText(crate::models::InternationalString::new(literal)),
        ValueKind::Integer => Value::Integer(
            trimmed
                .parse()
                .map_err(|_| format!("'{}' is not an integer", literal))?,
        ),
        ValueKind::Decimal => Value::Decimal(
            trimmed
                .parse()
                .map_err(|_| format!("'{}' is not a decimal", literal))?,
        ),
        ValueKind::Boolean => match parse_boolean(trimmed)? {
            Some(b) => Value::Boolean(b),
            None => return Ok(None),
        },
        ValueKind::Date => Value::Date(
            parse_date(trimmed, offset).ok_or_else(|| format!("'{}' is not a date", literal))?,
        ),
        ValueKind::Uri => Value::Uri(parse_uri(trimmed)?),
        ValueKind::Locale => match parse_locale(trimmed) {
            Some(locale) => Value::Locale(locale),
            None => return Ok(None),
        },
        ValueKind::Unit => Value::Unit(
            UnitOfMeasure::parse(trimmed).ok_or_else(|| format!("'{}' is not a unit", literal))?,
        ),
        ValueKind::QualifiedName => Value::QualifiedName(parse_qualified_name(trimmed)),
        ValueKind::UnlimitedInteger => Value::UnlimitedInteger(parse_unlimited(trimmed)?),
        other => return Err(format!("{} values have no literal form", other)),
    };
    Ok(Some(value))
}

/// Empty and `null` literals denote no value
pub fn parse_boolean(literal: &str) -> Result<Option<bool>, String> {
    match literal.to_ascii_lowercase().as_str() {
        "" | "null" => Ok(None),
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(format!("'{}' is not a boolean", literal)),
    }
}

/// Lenient date parsing; naive values are placed in `offset`
pub fn parse_date(literal: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(literal) {
        return Some(date);
    }
    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(literal, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(literal, format).ok())
                .or_else(|| partial_date(literal))
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;
    offset.from_local_datetime(&naive).single()
}

/// `yyyy-MM` and `yyyy`
fn partial_date(literal: &str) -> Option<NaiveDate> {
    let mut parts = literal.splitn(2, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    let month: u32 = match parts.next() {
        Some(month) => month.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Canonical date literal in `offset`
///
/// Midnight renders as `yyyy-MM-ddT00:00:00<tz>`, any other time as the
/// full timestamp.
pub fn format_date(date: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    let local = date.with_timezone(&offset);
    if local.time() == NaiveTime::MIN {
        local.format("%Y-%m-%dT00:00:00%:z").to_string()
    } else if local.nanosecond() == 0 {
        local.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        local.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
    }
}

/// Backslashes are escaped to `%5C`; relative references are accepted
///
/// A literal that `url` cannot parse strictly (`file://server\share` puts
/// `%5C` in the host) is kept as an opaque reference. Only whitespace,
/// control characters and malformed schemes are rejected.
pub fn parse_uri(literal: &str) -> Result<String, String> {
    if literal.is_empty() || literal.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("'{}' is not a URI: empty or contains whitespace", literal));
    }
    let escaped = literal.replace('\\', "%5C");
    if Url::parse(&escaped).is_ok() {
        return Ok(escaped);
    }

    match scheme_of(&escaped) {
        Some(scheme) if Url::parse(&format!("{}://localhost/", scheme)).is_err() => {
            Err(format!("'{}' is not a URI: invalid scheme '{}'", literal, scheme))
        }
        Some(_) => Ok(escaped),
        None => {
            let base = Url::parse("http://localhost/").map_err(|e| e.to_string())?;
            if let Err(e) = base.join(&escaped) {
                tracing::debug!("Keeping '{}' as an opaque reference: {}", literal, e);
            }
            Ok(escaped)
        }
    }
}

/// Text before the first `:`, when no `/`, `?` or `#` comes earlier
fn scheme_of(uri: &str) -> Option<&str> {
    let end = uri.find([':', '/', '?', '#'])?;
    (end > 0 && uri[end..].starts_with(':')).then(|| &uri[..end])
}

/// Inverse of the backslash escape applied by [`parse_uri`]
pub fn restore_uri(uri: &str) -> String {
    uri.replace("%5C", "\\")
}

/// `fr`, `fr_FR`, `fr-FR`; anything else non-empty is kept as a language
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    match locale_pattern().captures(tag) {
        Some(caps) => {
            let language = caps.get(1).map_or(tag, |m| m.as_str()).to_ascii_lowercase();
            Some(match caps.get(2) {
                Some(country) => {
                    Locale::with_country(language, country.as_str().to_ascii_uppercase())
                }
                None => Locale::new(language),
            })
        }
        None => {
            tracing::debug!("Locale tag '{}' kept verbatim", tag);
            Some(Locale::new(tag))
        }
    }
}

/// `{namespace}local` or a bare local part
pub fn parse_qualified_name(literal: &str) -> QualifiedName {
    match literal
        .strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
    {
        Some((namespace, local)) => QualifiedName::new(Some(namespace.to_string()), local),
        None => QualifiedName::new(None, literal),
    }
}

pub fn parse_unlimited(literal: &str) -> Result<UnlimitedInteger, String> {
    match literal {
        "*" | "unbounded" | "inf" => Ok(UnlimitedInteger::infinite()),
        _ => literal
            .parse()
            .map(UnlimitedInteger::finite)
            .map_err(|_| format!("'{}' is not an unlimited integer", literal)),
    }
}

pub fn locale_entry(locale: &Locale) -> String {
    format!("{}{}", LOCALE_MARKER, locale.tag())
}

pub fn parse_locale_entry(entry: &str) -> Option<Locale> {
    parse_locale(entry.trim().strip_prefix(LOCALE_MARKER)?)
}
