use std::sync::OnceLock;

use regex::Regex;

use crate::core::{
    Marker,
    RepairProfile,
};

/// `=TAG` followed by whitespace. The tag is 3-4 alphanumerics.
fn field_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^=([0-9A-Za-z]{3,4})\s+").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    RecordStart,
    Field(FieldLine<'a>),
    Other,
}

impl<'a> LineKind<'a> {
    pub fn classify(line: &'a str, profile: &RepairProfile) -> Self {
        if line.starts_with(profile.record_start.as_str()) {
            return LineKind::RecordStart;
        }

        match FieldLine::parse(line, profile.subfield_delimiter) {
            Some(field) => LineKind::Field(field),
            None => LineKind::Other,
        }
    }

    pub fn field(&self) -> Option<&FieldLine<'a>> {
        match self {
            LineKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_field_with_tag(&self, tag: &str) -> bool {
        self.field().is_some_and(|field| field.tag == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield<'a> {
    pub code: char,
    pub value: &'a str,
    pub offset: usize, // Byte offset of `value` within the line
}

impl Subfield<'_> {
    /// Byte range of the digit run the value starts with, relative to the line.
    pub fn leading_digits(&self) -> Option<(usize, usize)> {
        let len = self.value.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        Some((self.offset, self.offset + len))
    }
}

/// One field line split into tag and sub-fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine<'a> {
    pub line: &'a str,
    pub tag: &'a str,
    pub subfields: Vec<Subfield<'a>>,
}

impl<'a> FieldLine<'a> {
    pub fn parse(line: &'a str, delimiter: char) -> Option<Self> {
        let captures = field_header().captures(line)?;
        let tag = captures.get(1)?.as_str();
        let body_start = captures.get(0)?.end();
        let body = &line[body_start..];

        let positions: Vec<usize> =
            body.match_indices(delimiter).map(|(i, _)| body_start + i).collect();

        let mut subfields = Vec::with_capacity(positions.len());
        for (n, &start) in positions.iter().enumerate() {
            let end = positions.get(n + 1).copied().unwrap_or(line.len());
            let code_start = start + delimiter.len_utf8();
            // "$$" or a trailing "$" carries no code
            let Some(code) = line[code_start..end].chars().next() else {
                continue;
            };
            let offset = code_start + code.len_utf8();
            subfields.push(Subfield { code, value: &line[offset..end], offset });
        }

        Some(Self { line, tag, subfields })
    }

    /// The first sub-field with `code` that starts with digits, parsed.
    /// Runs that overflow `u64` are not markers.
    pub fn marker(&self, code: char) -> Option<Marker> {
        let subfield = self
            .subfields
            .iter()
            .find(|sf| sf.code == code && sf.leading_digits().is_some())?;
        let (start, end) = subfield.leading_digits()?;
        self.line[start..end].parse().ok()
    }

    /// Digit runs of every sub-field with `code`, in line order.
    pub fn marker_spans(&self, code: char) -> Vec<(usize, usize)> {
        self.subfields
            .iter()
            .filter(|sf| sf.code == code)
            .filter_map(Subfield::leading_digits)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> RepairProfile {
        RepairProfile::default()
    }

    #[test]
    fn test_classify_lines() {
        let p = profile();
        assert_eq!(LineKind::classify("=LDR  00000nam a2200000 a 4500", &p), LineKind::RecordStart);
        assert_eq!(LineKind::classify("some continuation text", &p), LineKind::Other);
        assert_eq!(LineKind::classify("", &p), LineKind::Other);
        // Tag must be followed by whitespace
        assert_eq!(LineKind::classify("=852$p1", &p), LineKind::Other);
        assert_eq!(LineKind::classify("=85  $p1", &p), LineKind::Other);

        let kind = LineKind::classify("=653  \\\\$aHistory", &p);
        assert!(kind.is_field_with_tag("653"));
        assert!(!kind.is_field_with_tag("852"));
    }

    #[test]
    fn test_field_line_parts() {
        let field = FieldLine::parse("=852  01$aMain$bStacks$p17", '$').unwrap();
        assert_eq!(field.tag, "852");
        let codes: Vec<char> = field.subfields.iter().map(|sf| sf.code).collect();
        assert_eq!(codes, vec!['a', 'b', 'p']);
        assert_eq!(field.subfields[1].value, "Stacks");
        assert_eq!(field.marker('p'), Some(17));
    }

    #[test]
    fn test_marker_tolerates_intervening_subfields() {
        let field = FieldLine::parse("=852  \\\\$aLib$hQA76$p700", '$').unwrap();
        assert_eq!(field.marker('p'), Some(700));

        let first = FieldLine::parse("=852  \\\\$p3$aLib", '$').unwrap();
        assert_eq!(first.marker('p'), Some(3));
    }

    #[test]
    fn test_marker_needs_digits_right_after_code() {
        let field = FieldLine::parse("=852  \\\\$p 12$aLib", '$').unwrap();
        assert_eq!(field.marker('p'), None);

        let field = FieldLine::parse("=852  \\\\$pabc$p42x", '$').unwrap();
        assert_eq!(field.marker('p'), Some(42));

        let field = FieldLine::parse("=852  \\\\$p99999999999999999999999", '$').unwrap();
        assert_eq!(field.marker('p'), None);
    }

    #[test]
    fn test_empty_subfields_are_skipped() {
        let field = FieldLine::parse("=852  \\\\$$p5$", '$').unwrap();
        assert_eq!(field.subfields.len(), 1);
        assert_eq!(field.marker('p'), Some(5));
    }

    #[test]
    fn test_marker_spans_point_at_digits() {
        let line = "=852  \\\\$p12$aX$p345";
        let field = FieldLine::parse(line, '$').unwrap();
        let spans = field.marker_spans('p');
        let digits: Vec<&str> = spans.iter().map(|&(s, e)| &line[s..e]).collect();
        assert_eq!(digits, vec!["12", "345"]);
    }
}
