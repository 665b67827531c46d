use once_cell::sync::Lazy;
use regex::Regex;
use serde::{ Deserialize, Serialize };

static CASE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"CASE\s+\d+:\s*.*").expect("case header pattern")
});

static BULLET_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*[-\x{2022}\x{2023}\x{25E6}\x{2043}\x{2219}*\x{00B7}\x{2013}\x{2014}]\s+(.+?)\s*$"
    ).expect("bullet pattern")
});

static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+[.)]\s+(.+?)\s*$").expect("numbered list pattern")
});

/// Plain lines longer than this are treated as prose, not list items.
const MAX_PLAIN_ITEM_CHARS: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCase {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ForbiddenWords,
    ToneGuidelines,
    ExampleStructure,
}

impl Section {
    fn from_heading(normalized: &str) -> Option<Self> {
        match normalized {
            "forbidden words" => Some(Section::ForbiddenWords),
            "tone guidelines" => Some(Section::ToneGuidelines),
            "good apology example structure" => Some(Section::ExampleStructure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseSections {
    pub forbidden_words: Vec<String>,
    pub tone_guidelines: Vec<String>,
    pub example_structure: Vec<String>,
}

impl CaseSections {
    fn items_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::ForbiddenWords => &mut self.forbidden_words,
            Section::ToneGuidelines => &mut self.tone_guidelines,
            Section::ExampleStructure => &mut self.example_structure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCase {
    pub case_name: String,
    pub forbidden_words: Vec<String>,
    pub tone_guidelines: Vec<String>,
    pub example_structure: Vec<String>,
    pub raw_body: String,
}

impl ParsedCase {
    /// The single text blob a case is retrieved and cited by.
    pub fn chunk_text(&self) -> String {
        format!(
            "{}\n\nForbidden Words:\n{}\n\nTone Guidelines:\n{}\n\nGood Apology Example Structure:\n{}\n\n{}",
            self.case_name,
            self.forbidden_words.join("\n"),
            self.tone_guidelines.join("\n"),
            self.example_structure.join("\n"),
            self.raw_body
        )
    }
}

/// Splits a rules document on `CASE <n>: <title>` headers. Text before the
/// first header is discarded.
pub fn split_into_cases(text: &str) -> Vec<RawCase> {
    let headers: Vec<_> = CASE_HEADER.find_iter(text).collect();
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let body_end = headers.get(i + 1).map(|next| next.start()).unwrap_or(text.len());
            RawCase {
                title: header.as_str().trim().to_string(),
                body: text[header.end()..body_end].trim().to_string(),
            }
        })
        .collect()
}

/// Drops leading icons and a trailing colon, then lowercases.
pub fn normalize_heading(line: &str) -> String {
    let cleaned = line.trim_start_matches(|c: char| !c.is_ascii_alphabetic()).trim();
    let cleaned = cleaned.strip_suffix(':').unwrap_or(cleaned).trim_end();
    cleaned.to_lowercase()
}

pub fn scan_sections(body: &str) -> CaseSections {
    let mut sections = CaseSections::default();
    let mut current: Option<Section> = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(section) = Section::from_heading(&normalize_heading(line)) {
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            continue;
        };

        let item = BULLET_LINE.captures(line)
            .or_else(|| NUMBERED_LINE.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        match item {
            Some(item) => sections.items_mut(section).push(item),
            // OCR output sometimes loses the bullet glyph.
            None if line.chars().count() <= MAX_PLAIN_ITEM_CHARS && !line.ends_with('.') => {
                sections.items_mut(section).push(line.to_string());
            }
            None => {}
        }
    }

    sections
}

pub fn parse_case(raw: &RawCase) -> ParsedCase {
    let sections = scan_sections(&raw.body);
    ParsedCase {
        case_name: raw.title.clone(),
        forbidden_words: sections.forbidden_words,
        tone_guidelines: sections.tone_guidelines,
        example_structure: sections.example_structure,
        raw_body: raw.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RULES: &str = "Relationship Compliance Handbook\n\
        CASE 1: She Is Hungry\n\
        ✖ Forbidden Words:\n\
        • calm down\n\
        - you're overreacting\n\
        ⭐ Tone Guidelines\n\
        1. Gentle and warm\n\
        2) Offer food immediately\n\
        Good Apology Example Structure:\n\
        * Acknowledge the hunger\n\
        Propose a restaurant\n\
        This sentence is prose and ends with a period.\n\
        CASE 2: Forgot The Anniversary\n\
        Tone Guidelines:\n\
        – Sincere, no excuses\n";

    #[test]
    fn splits_on_case_headers() {
        let cases = split_into_cases(RULES);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].title, "CASE 1: She Is Hungry");
        assert_eq!(cases[1].title, "CASE 2: Forgot The Anniversary");
        assert!(cases[0].body.starts_with("✖ Forbidden Words:"));
        assert!(!cases[0].body.contains("CASE 2"));
        assert_eq!(cases[1].body, "Tone Guidelines:\n– Sincere, no excuses");
    }

    #[test]
    fn no_headers_means_no_cases() {
        assert!(split_into_cases("").is_empty());
        assert!(split_into_cases("just a preamble\nwith no cases").is_empty());
    }

    #[test]
    fn header_without_body_yields_empty_body() {
        let cases = split_into_cases("CASE 7: Lonely Title");
        assert_eq!(cases, vec![RawCase { title: "CASE 7: Lonely Title".into(), body: String::new() }]);
    }

    #[test]
    fn normalizes_decorated_headings() {
        assert_eq!(normalize_heading("⭐ Tone Guidelines"), "tone guidelines");
        assert_eq!(normalize_heading("✖ Forbidden Words:"), "forbidden words");
        assert_eq!(normalize_heading("Good Apology Example Structure :"), "good apology example structure");
    }

    #[test]
    fn scans_bullets_numbers_and_plain_items() {
        let cases = split_into_cases(RULES);
        let sections = scan_sections(&cases[0].body);
        assert_eq!(sections.forbidden_words, vec!["calm down", "you're overreacting"]);
        assert_eq!(sections.tone_guidelines, vec!["Gentle and warm", "Offer food immediately"]);
        assert_eq!(
            sections.example_structure,
            vec!["Acknowledge the hunger", "Propose a restaurant"]
        );
    }

    #[test]
    fn lines_outside_sections_are_ignored() {
        let sections = scan_sections("- stray bullet\nintro line\nForbidden Words\n- never");
        assert_eq!(sections.forbidden_words, vec!["never"]);
        assert!(sections.tone_guidelines.is_empty());
    }

    #[test]
    fn chunk_text_lists_every_section() {
        let parsed = parse_case(&split_into_cases(RULES)[1]);
        assert_eq!(parsed.case_name, "CASE 2: Forgot The Anniversary");
        let chunk = parsed.chunk_text();
        assert!(chunk.starts_with("CASE 2: Forgot The Anniversary\n\nForbidden Words:\n\n\nTone Guidelines:\nSincere, no excuses"));
        assert!(chunk.ends_with(&parsed.raw_body));
    }
}
