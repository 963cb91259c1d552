use super::line::{
    FieldLine,
    LineKind,
};
use crate::core::{
    Marker,
    Record,
    RepairProfile,
};

/// First target field found in the batch, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate {
    line: String,
    marker_code: char,
    delimiter: char,
}

impl FieldTemplate {
    pub fn find(records: &[Record], profile: &RepairProfile) -> Option<Self> {
        records
            .iter()
            .flat_map(|record| record.text.lines())
            .find(|line| LineKind::classify(line, profile).is_field_with_tag(&profile.target_tag))
            .map(|line| Self {
                line: line.to_string(),
                marker_code: profile.marker_code,
                delimiter: profile.subfield_delimiter,
            })
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// The template with every numeric marker sub-field set to `value`.
    /// A template without one gets the sub-field appended.
    pub fn render(&self, value: Marker) -> String {
        let spans = FieldLine::parse(&self.line, self.delimiter)
            .map(|field| field.marker_spans(self.marker_code))
            .unwrap_or_default();

        if spans.is_empty() {
            return format!("{}{}{}{}", self.line, self.delimiter, self.marker_code, value);
        }

        let digits = value.to_string();
        let mut rendered = String::with_capacity(self.line.len() + digits.len() * spans.len());
        let mut cursor = 0;
        for (start, end) in spans {
            rendered.push_str(&self.line[cursor..start]);
            rendered.push_str(&digits);
            cursor = end;
        }
        rendered.push_str(&self.line[cursor..]);
        rendered
    }
}

/// Line index the new fields go in front of: after the last line starting
/// with the subject token, or in front of an embedded record start, or at the end.
pub fn insertion_point(lines: &[&str], profile: &RepairProfile) -> usize {
    let subject = profile.subject_token();
    let mut index = lines.len();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 && LineKind::classify(line, profile) == LineKind::RecordStart {
            index = i;
            break;
        }
        if line.starts_with(&subject) {
            index = i + 1;
        }
    }

    index
}

pub fn add_missing_fields(
    text: &str,
    values: &[Marker],
    template: Option<&FieldTemplate>,
    profile: &RepairProfile,
) -> String {
    let Some(template) = template else {
        return text.to_string();
    };
    if values.is_empty() {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let at = insertion_point(&lines, profile);

    let mut new_lines: Vec<String> = Vec::with_capacity(lines.len() + values.len());
    new_lines.extend(lines[..at].iter().map(|line| line.to_string()));
    new_lines.extend(values.iter().map(|&value| template.render(value)));
    new_lines.extend(lines[at..].iter().map(|line| line.to_string()));

    new_lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(line: &str) -> FieldTemplate {
        let records = vec![Record::new(0, line)];
        FieldTemplate::find(&records, &RepairProfile::default()).unwrap()
    }

    #[test]
    fn test_template_is_first_target_field_in_batch() {
        let records = vec![
            Record::new(0, "=LDR  a\n=245  10$aNo holdings"),
            Record::new(1, "=LDR  b\n=852  \\\\$aMain$bStacks$p12\n=852  \\\\$p13"),
        ];
        let template = FieldTemplate::find(&records, &RepairProfile::default()).unwrap();
        assert_eq!(template.line(), "=852  \\\\$aMain$bStacks$p12");
    }

    #[test]
    fn test_no_template_without_target_field() {
        let records = vec![Record::new(0, "=LDR  a\n=245  10$aNothing\n=8520  \\\\$p1")];
        assert!(FieldTemplate::find(&records, &RepairProfile::default()).is_none());
    }

    #[test]
    fn test_render_replaces_only_the_digits() {
        let t = template("=852  01$aMain Library$p0012$xnote");
        assert_eq!(t.render(7), "=852  01$aMain Library$p7$xnote");
    }

    #[test]
    fn test_render_replaces_every_numeric_marker() {
        let t = template("=852  \\\\$p1$aX$p2");
        assert_eq!(t.render(40), "=852  \\\\$p40$aX$p40");
    }

    #[test]
    fn test_render_appends_marker_when_template_has_none() {
        let t = template("=852  \\\\$aMain");
        assert_eq!(t.render(3), "=852  \\\\$aMain$p3");
    }

    #[test]
    fn test_insert_after_last_subject_line() {
        let text = "=LDR  a\n=245  10$aTitle\n=653  \\\\$aOne\n=653  \\\\$aTwo\n=700  1\\$aAuthor";
        let t = template("=852  \\\\$aMain$p1");
        let result = add_missing_fields(text, &[2, 3], Some(&t), &RepairProfile::default());
        assert_eq!(
            result,
            "=LDR  a\n=245  10$aTitle\n=653  \\\\$aOne\n=653  \\\\$aTwo\n\
             =852  \\\\$aMain$p2\n=852  \\\\$aMain$p3\n=700  1\\$aAuthor"
        );
    }

    #[test]
    fn test_insert_at_end_without_subject_lines() {
        let text = "=LDR  a\n=245  10$aTitle";
        let t = template("=852  \\\\$p1");
        let result = add_missing_fields(text, &[9], Some(&t), &RepairProfile::default());
        assert_eq!(result, "=LDR  a\n=245  10$aTitle\n=852  \\\\$p9");
    }

    #[test]
    fn test_insert_before_embedded_record_start() {
        let lines = vec!["=LDR  a", "=653  \\\\$aTopic", "=500  \\\\$aNote", "=LDR  b", "=653  x"];
        assert_eq!(insertion_point(&lines, &RepairProfile::default()), 3);
    }

    #[test]
    fn test_bare_subject_line_is_an_anchor() {
        let lines = vec!["=LDR  a", "=653", "=653\\$aNo gap", "=500  \\$aNote"];
        assert_eq!(insertion_point(&lines, &RepairProfile::default()), 3);
    }

    #[test]
    fn test_first_line_record_start_is_not_a_stop() {
        let lines = vec!["=LDR  a", "=245  10$aTitle"];
        assert_eq!(insertion_point(&lines, &RepairProfile::default()), 2);
    }

    #[test]
    fn test_no_values_or_template_is_a_no_op() {
        let text = "=LDR  a\n=245  10$aTitle\n";
        let t = template("=852  \\\\$p1");
        assert_eq!(add_missing_fields(text, &[], Some(&t), &RepairProfile::default()), text);
        assert_eq!(add_missing_fields(text, &[4], None, &RepairProfile::default()), text);
    }
}
