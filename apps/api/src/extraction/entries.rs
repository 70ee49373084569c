//! Entry parsing: splits a repeating section (education, experience) into
//! entries and pulls structured fields out of each one.
//!
//! Header fields are found by an ordered list of strategies. Each strategy
//! may fill either field; the first strategy to produce a value for a field
//! wins it.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extraction::dates::{find_date_range, is_date_range_line, remove_date};
use crate::extraction::normalize::{collapse_whitespace, normalize_lines, trim_separators};
use crate::models::resume::{EducationEntry, ExperienceEntry};
use crate::ner::{Entity, EntityLabel};

pub const EDUCATION_MIN_CHARS: usize = 10;
pub const EXPERIENCE_MIN_CHARS: usize = 15;

/// Lines at the top of an entry searched for header fields.
const HEADER_LINES: usize = 3;
const MAX_HEADER_LINE_CHARS: usize = 100;
/// A neighbouring line only counts as a company/institution name when short.
const MAX_NEIGHBOUR_CHARS: usize = 60;

const DEGREE: &str = r"(?:(?:B|M)\.(?:S|A|Sc|Eng|Ed|Tech)\.?|Ph\.\s?D\.?|BS|MS|BSc|MSc|BEng|MEng|BTech|MTech|BBA|MBA|PhD|(?i:bachelor(?:'s)?|master(?:'s)?|doctor(?:ate)?|associate(?:'s)?|diploma|certificate))";

static DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:^|[^\w]){DEGREE}(?:[^\w]|$)")).expect("valid degree regex")
});

static DEGREE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s*{DEGREE}(?:[^\w]|$)")).expect("valid degree line regex")
});

/// Words that end a job title ("Senior Data Engineer", "Product Manager").
pub(crate) const TITLE_KEYWORDS: &str = "engineer|developer|programmer|manager|analyst|specialist|lead|architect|consultant|designer|scientist|director|intern|administrator|researcher|officer|coordinator|technician|head|president|vp";

pub(crate) static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{TITLE_KEYWORDS})s?\b")).expect("valid title regex")
});

static INSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:university|college|institute|school|academy|polytechnic|conservatory)\b")
        .expect("valid institution regex")
});

pub(crate) static COMPANY_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:Inc|LLC|Ltd|Corp|Corporation|GmbH|PLC|LLP|Limited|Technologies|Solutions|Systems|Labs|Group|Partners|Consulting)\b\.?",
    )
    .expect("valid company suffix regex")
});

static AT_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+at\s+|\s*@\s*").expect("valid at-split regex"));

static FIELD_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[|•·]\s*|\s+[-–—]\s+|\s*,\s*|\t+").expect("valid field separator regex")
});

static HEADER_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\sat\s|@|\s*[|•·]\s*|\s[-–—]\s|,\s").expect("valid header separator regex")
});

static DANGLING_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:at|@)\s+|\s+(?:at|@)$").expect("valid dangling-at regex"));

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*•·▪◦‣]\s*").expect("valid bullet regex"));

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank-line regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Education,
    Experience,
}

impl EntryKind {
    /// Blocks shorter than this (trimmed, in characters) are discarded.
    pub fn min_chars(self) -> usize {
        match self {
            EntryKind::Education => EDUCATION_MIN_CHARS,
            EntryKind::Experience => EXPERIENCE_MIN_CHARS,
        }
    }

    /// Whether `line` looks like the first line of a new entry.
    fn starts_entry(self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || is_bullet(line) || line.chars().count() > MAX_HEADER_LINE_CHARS {
            return false;
        }
        match self {
            EntryKind::Education => DEGREE_LINE_RE.is_match(line) || INSTITUTION_RE.is_match(line),
            EntryKind::Experience => {
                is_date_range_line(line)
                    || (starts_uppercase(line)
                        && TITLE_RE.is_match(line)
                        && HEADER_SEPARATOR_RE.is_match(line))
            }
        }
    }

    /// A header line that already carries everything an entry header needs,
    /// so the next signature line must belong to a new entry.
    fn is_complete_header(self, line: &str) -> bool {
        if !self.starts_entry(line) {
            return false;
        }
        match self {
            EntryKind::Education => {
                (DEGREE_RE.is_match(line) && INSTITUTION_RE.is_match(line))
                    || find_date_range(line).is_some()
            }
            EntryKind::Experience => !is_date_range_line(line) && find_date_range(line).is_some(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Segmentation
// ────────────────────────────────────────────────────────────────────────────

/// Splits a section into candidate entry blocks: first on blank lines, then
/// at "new entry" signature lines inside blocks that hold more than one.
pub fn split_entries(section: &str, kind: EntryKind) -> Vec<String> {
    let text = normalize_lines(section);
    BLANK_LINES_RE
        .split(&text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .flat_map(|block| resplit_block(block, kind))
        .collect()
}

fn resplit_block(block: &str, kind: EntryKind) -> Vec<String> {
    let lines: Vec<&str> = block.lines().collect();
    let signatures: Vec<bool> = lines.iter().map(|line| kind.starts_entry(line)).collect();

    if signatures.iter().filter(|s| **s).count() < 2 {
        return vec![block.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let starts_new = idx > 0
            && signatures[idx]
            && (!signatures[idx - 1] || kind.is_complete_header(lines[idx - 1]));
        if starts_new && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
        }
        current.push(*line);
    }
    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}

// ────────────────────────────────────────────────────────────────────────────
// Header strategies
// ────────────────────────────────────────────────────────────────────────────

/// A field value and the index of the line it came from.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    value: String,
    line: usize,
}

impl Candidate {
    fn new(value: &str, line: usize) -> Option<Self> {
        let value = collapse_whitespace(trim_separators(value));
        (value.chars().any(char::is_alphanumeric)).then_some(Self { value, line })
    }
}

/// `primary` is the job title or degree, `secondary` the company or institution.
#[derive(Debug, Default)]
struct HeaderGuess {
    primary: Option<Candidate>,
    secondary: Option<Candidate>,
}

type HeaderStrategy = fn(EntryKind, &[&str], &[Entity]) -> HeaderGuess;

const HEADER_STRATEGIES: &[(&str, HeaderStrategy)] = &[
    ("separator", separator_split),
    ("entity", organization_entity),
    ("keyword", keyword_match),
];

/// "Title at Company", "Degree, Institution", "Title | Company" on the first line.
fn separator_split(kind: EntryKind, lines: &[&str], _entities: &[Entity]) -> HeaderGuess {
    let Some(first) = lines.first().copied() else {
        return HeaderGuess::default();
    };
    if is_bullet(first) || first.chars().count() > MAX_HEADER_LINE_CHARS {
        return HeaderGuess::default();
    }

    if let Some(m) = AT_SPLIT_RE.find(first) {
        let left = first_field(&first[..m.start()]);
        let right = first_field(&first[m.end()..]);
        if let (Some(left), Some(right)) = (left, right) {
            return HeaderGuess {
                primary: Candidate::new(left, 0),
                secondary: Candidate::new(right, 0),
            };
        }
    }

    let parts = fields(first);
    if parts.len() < 2 {
        return HeaderGuess::default();
    }

    let (primary_re, secondary_re): (&Regex, &Regex) = match kind {
        EntryKind::Education => (&*DEGREE_RE, &*INSTITUTION_RE),
        EntryKind::Experience => (&*TITLE_RE, &*COMPANY_SUFFIX_RE),
    };

    let primary_idx = parts.iter().position(|p| primary_re.is_match(p));
    let secondary_idx = parts
        .iter()
        .enumerate()
        .position(|(idx, p)| Some(idx) != primary_idx && secondary_re.is_match(p))
        .or_else(|| {
            // With a recognised title/degree, the next field is the other half.
            primary_idx.and_then(|p| (0..parts.len()).find(|idx| *idx != p))
        });

    HeaderGuess {
        primary: primary_idx.and_then(|idx| Candidate::new(parts[idx], 0)),
        secondary: secondary_idx.and_then(|idx| Candidate::new(parts[idx], 0)),
    }
}

/// An ORG entity on one of the first lines is the company or institution;
/// whatever else is on that line is the title or degree.
fn organization_entity(kind: EntryKind, lines: &[&str], entities: &[Entity]) -> HeaderGuess {
    let mut orgs: Vec<&str> = entities
        .iter()
        .filter(|e| e.label == EntityLabel::Org)
        .map(|e| e.text.as_str())
        .collect();
    if orgs.is_empty() {
        return HeaderGuess::default();
    }
    if kind == EntryKind::Education {
        orgs.sort_by_key(|org| !INSTITUTION_RE.is_match(org));
    }

    for (idx, line) in lines.iter().take(HEADER_LINES).enumerate() {
        if is_bullet(line) {
            continue;
        }
        let Some(org) = orgs.iter().find(|org| line.contains(**org)) else {
            continue;
        };
        let remainder = line.replacen(org, " ", 1);
        let remainder = trim_separators(&remainder);
        let remainder = DANGLING_AT_RE.replace_all(remainder, "");
        return HeaderGuess {
            primary: first_field(&remainder).and_then(|r| Candidate::new(r, idx)),
            secondary: Candidate::new(org, idx),
        };
    }
    HeaderGuess::default()
}

/// Title suffixes / degree prefixes on the first lines, plus the company or
/// institution keyword line (or the neighbouring line) for the other field.
fn keyword_match(kind: EntryKind, lines: &[&str], _entities: &[Entity]) -> HeaderGuess {
    let (primary_re, secondary_re): (&Regex, &Regex) = match kind {
        EntryKind::Education => (&*DEGREE_RE, &*INSTITUTION_RE),
        EntryKind::Experience => (&*TITLE_RE, &*COMPANY_SUFFIX_RE),
    };

    let header: Vec<(usize, &str)> = lines
        .iter()
        .take(HEADER_LINES)
        .enumerate()
        .filter(|(_, line)| !is_bullet(line) && line.chars().count() <= MAX_HEADER_LINE_CHARS)
        .map(|(idx, line)| (idx, *line))
        .collect();

    let primary = header
        .iter()
        .find(|(_, line)| primary_re.is_match(line))
        .and_then(|(idx, line)| Candidate::new(matching_field(line, primary_re), *idx));

    let primary_line = primary.as_ref().map(|c| c.line);
    let secondary = header
        .iter()
        .find(|(idx, line)| Some(*idx) != primary_line && secondary_re.is_match(line))
        .and_then(|(idx, line)| Candidate::new(matching_field(line, secondary_re), *idx))
        .or_else(|| {
            let p = primary_line?;
            let neighbour = if p == 0 { 1 } else { 0 };
            let (idx, line) = header.iter().find(|(idx, _)| *idx == neighbour)?;
            let usable = line.chars().count() <= MAX_NEIGHBOUR_CHARS
                && !primary_re.is_match(line)
                && !is_date_range_line(line);
            if usable {
                first_field(line).and_then(|f| Candidate::new(f, *idx))
            } else {
                None
            }
        });

    HeaderGuess { primary, secondary }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-entry parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ParsedEntry {
    primary: Option<String>,
    secondary: Option<String>,
    date_range: Option<String>,
    body: Option<String>,
}

impl ParsedEntry {
    fn has_header(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some() || self.date_range.is_some()
    }

    fn append_body(&mut self, more: String) {
        self.body = Some(match self.body.take() {
            Some(body) => format!("{body}\n{more}"),
            None => more,
        });
    }
}

fn parse_block(block: &str, kind: EntryKind, entities: &[Entity]) -> Option<ParsedEntry> {
    if block.trim().chars().count() < kind.min_chars() {
        debug!("Skipping {kind:?} block below minimum length: {block:?}");
        return None;
    }

    let date = find_date_range(block);
    let text = match &date {
        Some(date) => remove_date(block, date),
        None => block.to_string(),
    };

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !trim_separators(line).is_empty())
        .collect();

    let mut primary: Option<Candidate> = None;
    let mut secondary: Option<Candidate> = None;
    for (name, strategy) in HEADER_STRATEGIES {
        if primary.is_some() && secondary.is_some() {
            break;
        }
        let guess = strategy(kind, &lines, entities);
        if primary.is_none() && guess.primary.is_some() {
            debug!("{kind:?} primary field from {name} strategy");
            primary = guess.primary;
        }
        if secondary.is_none() && guess.secondary.is_some() {
            debug!("{kind:?} secondary field from {name} strategy");
            secondary = guess.secondary;
        }
    }

    let consumed: BTreeSet<usize> = primary
        .iter()
        .chain(secondary.iter())
        .map(|c| c.line)
        .collect();

    let body = lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !consumed.contains(idx))
        .map(|(_, line)| normalize_bullet(line))
        .collect::<Vec<_>>()
        .join("\n");

    Some(ParsedEntry {
        primary: primary.map(|c| c.value),
        secondary: secondary.map(|c| c.value),
        date_range: date.map(|d| d.text),
        body: (!body.is_empty()).then_some(body),
    })
}

/// Parses every block of a section. A block with no header fields is a
/// continuation of the entry above it; with no entry above, it is dropped.
fn parse_section(section: &str, kind: EntryKind, entities: &[Entity]) -> Vec<ParsedEntry> {
    let mut entries: Vec<ParsedEntry> = Vec::new();

    for block in split_entries(section, kind) {
        let Some(entry) = parse_block(&block, kind, entities) else {
            continue;
        };
        if entry.has_header() {
            entries.push(entry);
            continue;
        }
        match (entries.last_mut(), entry.body) {
            (Some(previous), Some(body)) => previous.append_body(body),
            _ => debug!("Dropping {kind:?} block with no usable field"),
        }
    }

    debug!("Parsed {} {kind:?} entries", entries.len());
    entries
}

pub fn parse_education(section: &str, entities: &[Entity]) -> Vec<EducationEntry> {
    parse_section(section, EntryKind::Education, entities)
        .into_iter()
        .map(|e| EducationEntry {
            degree: e.primary,
            institution: e.secondary,
            date_range: e.date_range,
            details: e.body,
        })
        .collect()
}

pub fn parse_experience(section: &str, entities: &[Entity]) -> Vec<ExperienceEntry> {
    parse_section(section, EntryKind::Experience, entities)
        .into_iter()
        .map(|e| ExperienceEntry {
            job_title: e.primary,
            company: e.secondary,
            date_range: e.date_range,
            description: e.body,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Line helpers
// ────────────────────────────────────────────────────────────────────────────

fn is_bullet(line: &str) -> bool {
    BULLET_RE.is_match(line.trim_start())
}

fn starts_uppercase(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_uppercase)
}

fn normalize_bullet(line: &str) -> String {
    match BULLET_RE.find(line) {
        Some(m) => format!("• {}", line[m.end()..].trim()),
        None => line.trim().to_string(),
    }
}

/// Non-empty fields of a header line, split on separators.
fn fields(line: &str) -> Vec<&str> {
    FIELD_SEPARATOR_RE
        .split(line)
        .map(trim_separators)
        .filter(|part| !part.is_empty())
        .collect()
}

fn first_field(text: &str) -> Option<&str> {
    fields(text).into_iter().next()
}

/// The field of `line` that matches `re`, or the whole line.
fn matching_field<'a>(line: &'a str, re: &Regex) -> &'a str {
    fields(line)
        .into_iter()
        .find(|part| re.is_match(part))
        .unwrap_or(line)
}
