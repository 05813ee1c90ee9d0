//! Cookie-date parsing per RFC 6265bis section 5.1.1.
//!
//! The grammar is deliberately permissive: the date is split into tokens on a
//! wide delimiter class and each token is classified as a time, day of month,
//! month, or year regardless of where it appears. The first token that fits a
//! still-unfilled category claims it.

use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Inputs longer than this are rejected without tokenizing.
pub const MAX_DATE_LENGTH: usize = 4096;

const MONTHS: [&[u8; 3]; 12] = [
    b"jan", b"feb", b"mar", b"apr", b"may", b"jun", b"jul", b"aug", b"sep", b"oct", b"nov",
    b"dec",
];

/// delimiter = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
fn is_delimiter(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x20..=0x2F | 0x3B..=0x40 | 0x5B..=0x60 | 0x7B..=0x7E)
}

/// Reads the maximal run of leading digits and accepts it when its length is
/// within `min..=max`. Because the run is maximal, whatever follows is either
/// empty or a non-digit, which is exactly the `( non-digit *OCTET )` trailer.
fn leading_number(input: &[u8], min: usize, max: usize) -> Option<(u32, &[u8])> {
    let len = input.iter().take_while(|b| b.is_ascii_digit()).count();
    if len < min || len > max {
        return None;
    }
    let value = input[..len]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some((value, &input[len..]))
}

// time = hms-time [ non-digit *OCTET ]
// hms-time = time-field ":" time-field ":" time-field
fn parse_time(token: &[u8]) -> Option<(u32, u32, u32)> {
    let (hour, rest) = leading_number(token, 1, 2)?;
    let rest = rest.strip_prefix(b":")?;
    let (minute, rest) = leading_number(rest, 1, 2)?;
    let rest = rest.strip_prefix(b":")?;
    let (second, _) = leading_number(rest, 1, 2)?;
    Some((hour, minute, second))
}

// day-of-month = 1*2DIGIT [ non-digit *OCTET ]
fn parse_day_of_month(token: &[u8]) -> Option<u32> {
    leading_number(token, 1, 2).map(|(day, _)| day)
}

// month = ( "jan" / "feb" / ... / "dec" ) *OCTET
fn parse_month(token: &[u8]) -> Option<u8> {
    let prefix = token.get(..3)?;
    MONTHS
        .iter()
        .position(|m| prefix.eq_ignore_ascii_case(&m[..]))
        .map(|idx| idx as u8 + 1)
}

// year = 2*4DIGIT [ non-digit *OCTET ]
fn parse_year(token: &[u8]) -> Option<u32> {
    leading_number(token, 2, 4).map(|(year, _)| year)
}

/// Parse a cookie-date into a UTC timestamp.
///
/// Returns `None` when the date is unusable; callers ignore the attribute
/// carrying it rather than the whole cookie.
pub fn parse_cookie_date(input: &str) -> Option<OffsetDateTime> {
    if input.len() > MAX_DATE_LENGTH {
        return None;
    }

    let mut time: Option<(u32, u32, u32)> = None;
    let mut day_of_month: Option<u32> = None;
    let mut month: Option<u8> = None;
    let mut year: Option<u32> = None;

    for token in input
        .as_bytes()
        .split(|b| is_delimiter(*b))
        .filter(|t| !t.is_empty())
    {
        if time.is_none() {
            if let Some(hms) = parse_time(token) {
                time = Some(hms);
                continue;
            }
        }
        if day_of_month.is_none() {
            if let Some(day) = parse_day_of_month(token) {
                day_of_month = Some(day);
                continue;
            }
        }
        if month.is_none() {
            if let Some(m) = parse_month(token) {
                month = Some(m);
                continue;
            }
        }
        if year.is_none() {
            if let Some(y) = parse_year(token) {
                year = Some(y);
                continue;
            }
        }
    }

    let ((hour, minute, second), day, month, year) = (time?, day_of_month?, month?, year?);

    let year = match year {
        70..=99 => year + 1900,
        0..=69 => year + 2000,
        _ => year,
    };

    if !(1..=31).contains(&day) || year < 1601 || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let date = Date::from_calendar_date(
        year as i32,
        Month::try_from(month).ok()?,
        day as u8,
    )
    .ok()?;
    let time = Time::from_hms(hour as u8, minute as u8, second as u8).ok()?;

    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Format a timestamp as an RFC 1123 date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_cookie_date(datetime: OffsetDateTime) -> Option<String> {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    datetime
        .to_offset(time::UtcOffset::UTC)
        .format(&format)
        .ok()
}
