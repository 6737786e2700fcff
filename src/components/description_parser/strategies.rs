use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref EMAIL_LINE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

pub const BOOKED_BY_MARKER: &str = "<b>Booked by</b>";
pub const FIRST_NAME_PREFIX: &str = "First name";
pub const LAST_NAME_PREFIX: &str = "Last name";

/// Replace HTML line breaks with newlines and split into lines
pub fn split_lines(description: &str) -> Vec<String> {
    LINE_BREAK
        .replace_all(description, "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Guardian contact block that follows the "Booked by" marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedBy {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Read the name, email and phone lines after the "Booked by" marker.
///
/// Returns `None` when there is no marker or nothing follows it.
pub fn booked_by_block(lines: &[String]) -> Option<BookedBy> {
    let marker = lines
        .iter()
        .position(|line| line.trim().contains(BOOKED_BY_MARKER))?;
    let name_line = lines.get(marker + 1)?.trim();

    let mut block = BookedBy::default();

    let mut tokens = name_line.split_whitespace();
    if let Some(first) = tokens.next() {
        block.first_name = Some(first.to_string());
        let rest = tokens.collect::<Vec<_>>();
        if !rest.is_empty() {
            block.last_name = Some(rest.join(" "));
        }
    }

    let email_at = lines
        .iter()
        .enumerate()
        .skip(marker + 2)
        .find(|(_, line)| EMAIL_LINE.is_match(line.trim()))
        .map(|(index, _)| index);

    match email_at {
        Some(index) => {
            block.email = Some(lines[index].trim().to_string());
            block.phone = lines.get(index + 1).map(|line| line.trim().to_string());
        }
        None => {
            // No email-shaped line: assume the form's fixed positions
            block.email = lines.get(marker + 2).map(|line| line.trim().to_string());
            block.phone = lines.get(marker + 3).map(|line| line.trim().to_string());
        }
    }

    Some(block)
}

/// Name fields given as "First name ..." / "Last name ..." lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledNames {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Scan every line for the plain-text name prefixes. The last matching line wins.
pub fn labeled_names(lines: &[String]) -> LabeledNames {
    let mut names = LabeledNames::default();

    for line in lines {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(FIRST_NAME_PREFIX) {
            names.first_name = Some(label_value(rest));
        } else if let Some(rest) = trimmed.strip_prefix(LAST_NAME_PREFIX) {
            names.last_name = Some(label_value(rest));
        }
    }

    names
}

fn label_value(rest: &str) -> String {
    let rest = rest.trim();
    rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
}

/// Value on the line after the first line carrying `<b>{label}</b>`
pub fn labeled_field(lines: &[String], label: &str) -> Option<String> {
    let bold = format!("<b>{}</b>", label);
    let index = lines.iter().position(|line| line.contains(&bold))?;
    lines.get(index + 1).map(|line| line.trim().to_string())
}

/// Line following the first line equal to `email`
pub fn phone_after_email(lines: &[String], email: &str) -> Option<String> {
    let index = lines.iter().position(|line| line.trim() == email)?;
    lines.get(index + 1).map(|line| line.trim().to_string())
}
