use bstr::{BStr, BString, ByteSlice};

use crate::ObjectError;

/// Author/committer identity with a timestamp.
///
/// Wire form: `Name <email> <unix_ts> ±HHMM`. The timezone is stored as an
/// offset in minutes east of UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub timestamp: i64,
    pub tz_offset: i32,
}

impl Signature {
    pub fn new(
        name: impl Into<BString>,
        email: impl Into<BString>,
        timestamp: i64,
        tz_offset: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp,
            tz_offset,
        }
    }

    /// Parse from the wire form: `Name <email> timestamp tz`.
    pub fn parse(input: &BStr) -> Result<Self, ObjectError> {
        let bytes: &[u8] = input.as_ref();

        let gt_pos = bytes
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| ObjectError::InvalidSignature("missing '>'".into()))?;
        let lt_pos = bytes[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| ObjectError::InvalidSignature("missing '<'".into()))?;

        let name = BString::from(bytes[..lt_pos].trim());
        let email = BString::from(&bytes[lt_pos + 1..gt_pos]);

        let date = bytes[gt_pos + 1..].trim();
        let date = std::str::from_utf8(date)
            .map_err(|_| ObjectError::InvalidSignature("non-UTF-8 date".into()))?;
        let (ts_str, tz_str) = date
            .split_once(' ')
            .ok_or_else(|| ObjectError::InvalidSignature("missing timezone".into()))?;

        let timestamp: i64 = ts_str
            .parse()
            .map_err(|_| ObjectError::InvalidSignature(format!("invalid timestamp: {ts_str}")))?;
        let tz_offset = parse_tz(tz_str)?;

        Ok(Self {
            name,
            email,
            timestamp,
            tz_offset,
        })
    }

    /// Format in the canonical wire form.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::from(Vec::new());
        out.extend_from_slice(&self.name);
        out.extend_from_slice(b" <");
        out.extend_from_slice(&self.email);
        out.extend_from_slice(b"> ");
        out.extend_from_slice(format!("{} {}", self.timestamp, format_tz(self.tz_offset)).as_bytes());
        out
    }
}

/// Parse a `±HHMM` timezone into minutes east of UTC.
fn parse_tz(s: &str) -> Result<i32, ObjectError> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || (bytes[0] != b'+' && bytes[0] != b'-') {
        return Err(ObjectError::InvalidSignature(format!("invalid timezone: {s}")));
    }
    if !bytes[1..].iter().all(u8::is_ascii_digit) {
        return Err(ObjectError::InvalidSignature(format!("invalid timezone: {s}")));
    }
    let digit = |i: usize| i32::from(bytes[i] - b'0');
    let offset = (digit(1) * 10 + digit(2)) * 60 + digit(3) * 10 + digit(4);
    Ok(if bytes[0] == b'-' { -offset } else { offset })
}

fn format_tz(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let abs = offset.abs();
    format!("{}{:02}{:02}", sign, abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let sig =
            Signature::parse(BStr::new("John Doe <john@example.com> 1234567890 +0000")).unwrap();
        assert_eq!(sig.name, "John Doe");
        assert_eq!(sig.email, "john@example.com");
        assert_eq!(sig.timestamp, 1234567890);
        assert_eq!(sig.tz_offset, 0);
    }

    #[test]
    fn parse_negative_tz() {
        let sig = Signature::parse(BStr::new("A <a@b.com> 1234567890 -0500")).unwrap();
        assert_eq!(sig.tz_offset, -300);
    }

    #[test]
    fn parse_half_hour_tz() {
        let sig = Signature::parse(BStr::new("A <a@b.com> 1234567890 +0530")).unwrap();
        assert_eq!(sig.tz_offset, 330);
    }

    #[test]
    fn parse_name_with_angle_bracket_lookalike() {
        // rposition keeps emails containing '<'-ish names intact.
        let sig = Signature::parse(BStr::new("Weird > Name <w@n.io> 1 +0000")).unwrap();
        assert_eq!(sig.email, "w@n.io");
    }

    #[test]
    fn to_bytes_roundtrip() {
        let sig = Signature::new("Jane Doe", "jane@example.com", 1234567890, -300);
        let bytes = sig.to_bytes();
        assert_eq!(&bytes[..], b"Jane Doe <jane@example.com> 1234567890 -0500");
        assert_eq!(Signature::parse(bytes.as_bstr()).unwrap(), sig);
    }

    #[test]
    fn rejects_malformed() {
        assert!(Signature::parse(BStr::new("no brackets 1 +0000")).is_err());
        assert!(Signature::parse(BStr::new("A <a@b.com> notanumber +0000")).is_err());
        assert!(Signature::parse(BStr::new("A <a@b.com> 1 0000")).is_err());
        assert!(Signature::parse(BStr::new("A <a@b.com> 1")).is_err());
    }
}
