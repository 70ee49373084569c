//! Section segmentation: splits raw text into canonical sections by header
//! detection.
//!
//! Header tables are declarative and compiled once. Every known header
//! (canonical or not) participates in one alternation sorted longest-first,
//! so "professional experience" wins over a bare "experience", and any
//! header line terminates the section above it.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::normalize::{fold, normalize_lines};

/// The canonical resume sections the parser cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    Skills,
    Education,
    Experience,
}

/// One row of a header table: a canonical section and its synonyms.
#[derive(Debug, Clone)]
pub struct SectionRule<K> {
    pub section: K,
    pub synonyms: &'static [&'static str],
}

pub const RESUME_SECTION_TABLE: &[SectionRule<Section>] = &[
    SectionRule {
        section: Section::Summary,
        synonyms: &[
            "summary",
            "professional summary",
            "career summary",
            "objective",
            "career objective",
            "profile",
            "professional profile",
            "about me",
            "personal statement",
        ],
    },
    SectionRule {
        section: Section::Skills,
        synonyms: &[
            "skills",
            "technical skills",
            "key skills",
            "skill set",
            "technologies",
            "proficiencies",
            "technical proficiencies",
            "core competencies",
        ],
    },
    SectionRule {
        section: Section::Education,
        synonyms: &[
            "education",
            "academic background",
            "qualifications",
            "academic training",
            "education and training",
        ],
    },
    SectionRule {
        section: Section::Experience,
        synonyms: &[
            "experience",
            "work experience",
            "professional experience",
            "relevant experience",
            "employment history",
            "work history",
            "career history",
        ],
    },
];

/// Headers that end a canonical section but are never returned themselves.
pub const TERMINATOR_HEADERS: &[&str] = &[
    "contact",
    "contact information",
    "personal details",
    "projects",
    "personal projects",
    "awards",
    "honors",
    "publications",
    "references",
    "certifications",
    "languages",
    "interests",
    "hobbies",
    "volunteer experience",
    "volunteering",
];

static RESUME_SEGMENTER: Lazy<SectionSegmenter<Section>> = Lazy::new(|| {
    SectionSegmenter::new(RESUME_SECTION_TABLE, TERMINATOR_HEADERS)
        .expect("resume section table compiles")
});

/// The captured body of each canonical section found in a document.
///
/// Spans are byte ranges into the `normalize_lines` form of the input and
/// cover the header line through the end of the body.
#[derive(Debug, Clone)]
pub struct SectionMap<K> {
    sections: HashMap<K, String>,
    spans: HashMap<K, Range<usize>>,
}

impl<K: Copy + Eq + Hash> SectionMap<K> {
    pub fn get(&self, section: K) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    pub fn span(&self, section: K) -> Option<Range<usize>> {
        self.spans.get(&section).cloned()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

/// A header line located in the text.
#[derive(Debug)]
struct HeaderHit {
    header: String,
    line_start: usize,
    body_start: usize,
    inline: Option<String>,
}

pub struct SectionSegmenter<K> {
    header_line: Regex,
    lookup: HashMap<String, K>,
}

impl SectionSegmenter<Section> {
    /// The shared segmenter for resume text.
    pub fn resume() -> &'static SectionSegmenter<Section> {
        &RESUME_SEGMENTER
    }
}

impl<K: Copy + Eq + Hash> SectionSegmenter<K> {
    /// Compiles a segmenter from a header table plus extra terminator headers.
    pub fn new(table: &[SectionRule<K>], terminators: &[&str]) -> Result<Self, regex::Error> {
        let mut lookup = HashMap::new();
        let mut headers: Vec<String> = Vec::new();

        for rule in table {
            for synonym in rule.synonyms {
                let key = fold(synonym);
                lookup.entry(key.clone()).or_insert(rule.section);
                headers.push(key);
            }
        }
        headers.extend(terminators.iter().map(|h| fold(h)));
        headers.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        headers.dedup();

        let alternation = headers
            .iter()
            .map(|h| regex::escape(h).replace(' ', r"[ \t]+"))
            .collect::<Vec<_>>()
            .join("|");

        let header_line = Regex::new(&format!(
            r"(?im)^[ \t]*(?P<header>{alternation})[ \t]*(?:[:\-–][ \t]*(?P<inline>[^\n]*))?$"
        ))?;

        Ok(Self {
            header_line,
            lookup,
        })
    }

    /// Splits `text` into canonical sections. Never fails; absent sections
    /// are simply missing from the returned map.
    pub fn segment(&self, text: &str) -> SectionMap<K> {
        let text = normalize_lines(text);
        let hits = self.find_headers(&text);
        let mut sections = HashMap::new();
        let mut spans = HashMap::new();

        for (idx, hit) in hits.iter().enumerate() {
            let Some(section) = self.lookup.get(&hit.header).copied() else {
                continue;
            };
            if sections.contains_key(&section) {
                continue;
            }

            let body_end = hits
                .get(idx + 1)
                .map(|next| next.line_start)
                .unwrap_or(text.len());
            let body = text.get(hit.body_start..body_end).unwrap_or("");

            let mut content = String::new();
            if let Some(inline) = hit.inline.as_deref() {
                content.push_str(inline);
                content.push('\n');
            }
            content.push_str(body);

            let content = content.trim();
            if !content.is_empty() {
                sections.insert(section, content.to_string());
                spans.insert(section, hit.line_start..body_end);
            }
        }

        SectionMap { sections, spans }
    }

    /// True when `line` on its own is a known header (canonical or terminator).
    pub fn is_header(&self, line: &str) -> bool {
        self.header_line.is_match(line.trim())
    }

    fn find_headers(&self, text: &str) -> Vec<HeaderHit> {
        self.header_line
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let header = caps.name("header")?.as_str();
                let header = header.split_whitespace().collect::<Vec<_>>().join(" ");
                let inline = caps
                    .name("inline")
                    .map(|m| m.as_str().trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                // Body starts after the newline that ends the header line.
                let body_start = (whole.end() + 1).min(text.len());
                Some(HeaderHit {
                    header: fold(&header),
                    line_start: whole.start(),
                    body_start,
                    inline,
                })
            })
            .collect()
    }
}
