//! Job description analysis: title, company, seniority, experience, skills
//! and summary keywords from free-form posting text.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::extraction::entries::TITLE_KEYWORDS;
use crate::extraction::normalize::{char_prefix, collapse_whitespace, fold, is_blank, normalize_lines};
use crate::extraction::sections::{SectionRule, SectionSegmenter};
use crate::extraction::skills::SkillExtractor;
use crate::models::job::JobDescriptionRecord;
use crate::ner::{Entity, EntityExtractor, EntityLabel};

/// Lines searched for a known job title.
const TITLE_SCAN_LINES: usize = 10;
const MAX_TITLE_LINE_CHARS: usize = 60;
const FALLBACK_TITLE_CHARS: usize = 50;
const SUMMARY_KEYWORDS: usize = 20;
const MIN_KEYWORD_CHARS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

const COMMON_TITLES: &[&str] = &[
    "Machine Learning Engineer",
    "Full Stack Developer",
    "Database Administrator",
    "System Administrator",
    "Site Reliability Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Software Engineer",
    "Security Engineer",
    "Android Developer",
    "Mobile Developer",
    "DevOps Engineer",
    "Product Manager",
    "Project Manager",
    "Data Scientist",
    "Cloud Engineer",
    "Data Engineer",
    "iOS Developer",
    "Web Developer",
    "Data Analyst",
    "QA Engineer",
    "UX Designer",
    "UI Designer",
];

/// Highest priority first: the first level whose pattern matches wins.
const SENIORITY_TABLE: &[(&str, &str)] = &[
    ("Manager", r"\b(?:manager|manage)\b"),
    ("Principal", r"\bprincipal\b"),
    ("Staff", r"\bstaff\s+(?:engineer|software|developer|scientist)"),
    ("Lead", r"\b(?:tech\s+lead|team\s+lead|lead)\b"),
    ("Senior", r"\b(?:senior|sr\.)"),
    ("Mid-Level", r"\b(?:mid-level|mid\s+level|intermediate)\b"),
    ("Junior", r"\b(?:junior|jr\.|entry-level|entry\s+level|graduate)"),
];

const SPELLED_NUMBERS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
    "twenty",
];

/// Org entities that are corporate boilerplate rather than a company name.
const ORG_NOISE: &[&str] = &[
    "inc", "llc", "ltd", "co", "corp", "company", "corporation", "group", "solutions",
    "technologies", "team",
];

/// Words that may start an "About ..." heading without naming a company.
const ABOUT_STOP_WORDS: &[&str] = &[
    "us", "the", "you", "this", "our", "we", "role", "company", "team", "position", "job",
];

/// Capitalized words that precede a company name in running text.
const LEADING_STOP_WORDS: &[&str] = &["about", "at", "join", "the", "we", "our", "with", "for"];

/// Words of three or more letters that carry no signal about the posting.
const KEYWORD_STOP_WORDS: &[&str] = &[
    "and", "the", "for", "with", "are", "has", "had", "was", "were", "will", "this", "that",
    "your", "our", "they", "them", "just", "than", "then", "not", "all", "any", "some", "such",
    "nor", "can", "get", "out", "about", "who", "what", "when", "where", "why", "how", "job",
    "role", "company", "experience", "skill", "skills", "work", "team", "position", "candidate",
    "description", "responsibilities", "requirements", "preferred", "qualification",
    "qualifications", "etc", "e.g", "i.e", "div", "span", "strong",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JobSection {
    Preferred,
}

const JOB_SECTION_TABLE: &[SectionRule<JobSection>] = &[SectionRule {
    section: JobSection::Preferred,
    synonyms: &[
        "preferred qualifications",
        "preferred skills",
        "preferred",
        "nice to have",
        "nice-to-have",
        "nice to haves",
        "good to have",
        "bonus points",
        "bonus",
        "pluses",
        "plus",
    ],
}];

const JOB_TERMINATOR_HEADERS: &[&str] = &[
    "requirements",
    "required qualifications",
    "required skills",
    "minimum qualifications",
    "basic qualifications",
    "qualifications",
    "must have",
    "must-have",
    "responsibilities",
    "what you'll do",
    "what you will do",
    "about us",
    "about the role",
    "about the company",
    "about you",
    "benefits",
    "perks",
    "what we offer",
    "how to apply",
    "job description",
    "overview",
];

// ────────────────────────────────────────────────────────────────────────────
// Compiled patterns
// ────────────────────────────────────────────────────────────────────────────

static JOB_SEGMENTER: Lazy<SectionSegmenter<JobSection>> = Lazy::new(|| {
    SectionSegmenter::new(JOB_SECTION_TABLE, JOB_TERMINATOR_HEADERS)
        .expect("job section table compiles")
});

static SENIORITY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    SENIORITY_TABLE
        .iter()
        .map(|(level, pattern)| {
            let regex = Regex::new(&format!("(?i){pattern}")).expect("valid seniority pattern");
            (*level, regex)
        })
        .collect()
});

static TITLE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:job[ \t]+title|position|role|title)[ \t]*:[ \t]*(?P<title>[^\n]+)$")
        .expect("valid title label regex")
});

static TITLE_AT_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{TITLE_KEYWORDS})s?[ \t]*$")).expect("valid title suffix regex")
});

static ABOUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bAbout[ \t]+(?P<company>[A-Z][\w&.'-]*(?:[ \t]+[A-Z][\w&.'-]*){0,3})")
        .expect("valid about regex")
});

static COMPANY_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Z][\w&'-]*(?:[ \t]+[A-Z][\w&'-]*){0,3}[ \t]*,?[ \t]+(?:Inc|LLC|Ltd|Corp|Corporation|GmbH|PLC|Limited)\b\.?",
    )
    .expect("valid company name regex")
});

/// "Preferred: ...", "nice to have ...:" or "Bonus points if you know:" inside
/// running text. The clause runs to the end of its line, or to the next blank
/// line when nothing follows the colon.
static PREFERRED_CLAUSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:preferred|nice[ -]to[ -]haves?|good[ -]to[ -]have|bonus|pluses|plus)\b[^\n:.]{0,40}:[ \t]*(?P<body>[^\n]*)",
    )
    .expect("valid preferred clause regex")
});

static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?;](?:\s|$)|\n").expect("valid sentence break regex"));

static REQUIRED_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:required|requires?|must[ -]have|must[ \t]+be|necessity|essential)\b")
        .expect("valid required cue regex")
});

static PREFERRED_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:preferred|nice[ -]to[ -]have|plus|advantage|advantageous|beneficial|bonus)\b")
        .expect("valid preferred cue regex")
});

static KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9][a-z0-9.-]*").expect("valid keyword regex"));

/// Maps one pattern's captures to the normalized phrase.
type YearsFormatter = fn(&Captures) -> Option<String>;

static EXPERIENCE_PATTERNS: Lazy<Vec<(Regex, YearsFormatter)>> = Lazy::new(|| {
    let mut words: Vec<&str> = SPELLED_NUMBERS.to_vec();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let n = format!(r"(?:\d{{1,2}}|{})", words.join("|"));
    let years = r"(?:years?|yrs?)\b";
    let compile = |pattern: String| Regex::new(&pattern).expect("valid experience pattern");

    vec![
        (
            compile(format!(
                r"(?i)\b(?P<low>{n})\s*(?:-|–|—|to)\s*(?P<high>{n})\s*\+?\s*{years}"
            )),
            ranged_years as YearsFormatter,
        ),
        (
            compile(format!(r"(?i)(?:\b(?P<n>{n})\s*\+|\+\s*(?P<m>\d{{1,2}}))\s*{years}")),
            minimum_years as YearsFormatter,
        ),
        (
            compile(format!(
                r"(?i)\b(?:at\s+least|minimum(?:\s+of)?|min\.?|no\s+less\s+than)\s+(?P<n>{n})\s*\+?\s*{years}"
            )),
            minimum_years as YearsFormatter,
        ),
        (
            compile(format!(
                r"(?i)\b(?P<n>{n})\s+{years}(?:\s+of)?\s+(?:[\w/+#.-]+\s+){{0,4}}?experience\b"
            )),
            exact_years as YearsFormatter,
        ),
    ]
});

fn ranged_years(caps: &Captures) -> Option<String> {
    let low = parse_number(caps.name("low")?.as_str())?;
    let high = parse_number(caps.name("high")?.as_str())?;
    Some(format!("{low}-{high} years"))
}

fn minimum_years(caps: &Captures) -> Option<String> {
    let raw = caps.name("n").or_else(|| caps.name("m"))?.as_str();
    Some(format!("{}+ years", parse_number(raw)?))
}

fn exact_years(caps: &Captures) -> Option<String> {
    Some(format!("{} years", parse_number(caps.name("n")?.as_str())?))
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub fn analyze_job(text: &str, ner: &EntityExtractor) -> JobDescriptionRecord {
    let text = normalize_lines(text);
    if is_blank(&text) {
        debug!("Empty job text; returning empty record");
        return JobDescriptionRecord::default();
    }

    let entities = ner.infer(&text);
    let skills = SkillExtractor::shared().extract(&text, None, &entities);
    let (required_skills, nice_to_have_skills) = split_required_skills(&text, &skills, &entities);

    let record = JobDescriptionRecord {
        job_title: detect_job_title(&text),
        company_name: detect_company(&text, &entities),
        seniority: detect_seniority(&text).map(str::to_string),
        experience_years: extract_experience_years(&text),
        skills,
        required_skills,
        nice_to_have_skills,
        summary_keywords: summary_keywords(&text),
    };

    debug!(
        "Analyzed job: title={:?} seniority={:?} years={:?} skills={}",
        record.job_title,
        record.seniority,
        record.experience_years,
        record.skills.len()
    );
    record
}

// ────────────────────────────────────────────────────────────────────────────
// Field detectors
// ────────────────────────────────────────────────────────────────────────────

/// Explicit label, then a known title near the top, then a line ending in a
/// title word, then the first line.
pub fn detect_job_title(text: &str) -> Option<String> {
    if let Some(caps) = TITLE_LABEL_RE.captures(text) {
        let title = collapse_whitespace(caps.name("title")?.as_str());
        if !title.is_empty() {
            return Some(title);
        }
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let head = &lines[..lines.len().min(TITLE_SCAN_LINES)];

    for line in head {
        let folded = fold(line);
        if let Some(title) = COMMON_TITLES.iter().find(|t| folded.contains(&fold(t))) {
            return Some(if line.chars().count() <= MAX_TITLE_LINE_CHARS {
                collapse_whitespace(line)
            } else {
                title.to_string()
            });
        }
    }

    if let Some(line) = head
        .iter()
        .find(|line| line.chars().count() <= MAX_TITLE_LINE_CHARS && TITLE_AT_END_RE.is_match(line))
    {
        return Some(collapse_whitespace(line));
    }

    let first = lines.first()?.replace(['(', ')', ':'], "");
    let first = char_prefix(first.trim(), FALLBACK_TITLE_CHARS).trim().to_string();
    (!first.is_empty()).then_some(first)
}

/// First level of the priority table that appears anywhere in the text.
pub fn detect_seniority(text: &str) -> Option<&'static str> {
    SENIORITY_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(level, _)| *level)
}

/// The earliest years phrase in the text. Pattern classes are ranged, "+",
/// "at least"/"minimum", and a plain count tied to the word "experience";
/// when two start at the same offset the earlier class wins.
pub fn extract_experience_years(text: &str) -> Option<String> {
    EXPERIENCE_PATTERNS
        .iter()
        .filter_map(|(regex, normalize)| {
            let caps = regex.captures(text)?;
            let start = caps.get(0)?.start();
            Some((start, normalize(&caps)?))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, years)| years)
}

fn parse_number(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| {
        let raw = fold(raw);
        SPELLED_NUMBERS
            .iter()
            .position(|word| *word == raw)
            .map(|idx| idx as u32 + 1)
    })
}

/// The most frequent words of the posting, ignoring stop words and words
/// shorter than three characters. Ties keep first-appearance order.
pub fn summary_keywords(text: &str) -> Vec<String> {
    let folded = fold(text);
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (order, m) in KEYWORD_RE.find_iter(&folded).enumerate() {
        let word = m.as_str().trim_end_matches(['.', '-']);
        if word.chars().count() < MIN_KEYWORD_CHARS
            || KEYWORD_STOP_WORDS.contains(&word)
            || !word.chars().any(char::is_alphabetic)
        {
            continue;
        }
        counts
            .entry(word)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, order));
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then_with(|| a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(SUMMARY_KEYWORDS)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// "About {Company}", else the most frequent ORG entity, else a
/// "Name Inc./LLC/..." phrase.
pub fn detect_company(text: &str, entities: &[Entity]) -> Option<String> {
    company_from_about(text)
        .or_else(|| company_from_entities(entities))
        .or_else(|| company_from_suffix(text))
}

fn company_from_about(text: &str) -> Option<String> {
    ABOUT_RE.captures_iter(text).find_map(|caps| {
        let company = caps.name("company")?.as_str().trim_end_matches(['.', ',']);
        let first_word = fold(company.split_whitespace().next()?);
        if ABOUT_STOP_WORDS.contains(&first_word.as_str()) {
            return None;
        }
        Some(collapse_whitespace(company))
    })
}

fn company_from_entities(entities: &[Entity]) -> Option<String> {
    let skills = SkillExtractor::shared();
    let mut counts: HashMap<String, (usize, usize, &str)> = HashMap::new();

    for (order, entity) in entities
        .iter()
        .filter(|e| e.label == EntityLabel::Org)
        .enumerate()
    {
        let name = entity.text.trim();
        let key = fold(name);
        if name.chars().count() <= 2 || ORG_NOISE.contains(&key.as_str()) || skills.is_known(name) {
            continue;
        }
        counts
            .entry(key)
            .and_modify(|(count, _, _)| *count += 1)
            .or_insert((1, order, name));
    }

    counts
        .into_values()
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
        .map(|(_, _, name)| collapse_whitespace(name))
}

fn company_from_suffix(text: &str) -> Option<String> {
    COMPANY_NAME_RE.find_iter(text).find_map(|m| {
        let words: Vec<&str> = m.as_str().split_whitespace().collect();
        let skip = words
            .iter()
            .take_while(|w| LEADING_STOP_WORDS.contains(&fold(w).as_str()))
            .count();
        // Keep at least one word in front of the suffix.
        (words.len() - skip >= 2).then(|| words[skip..].join(" "))
    })
}

/// Splits the extracted skills into those required by the posting and those
/// it only prefers.
///
/// Skills mentioned only inside a "Preferred / Nice to have / Bonus" block or
/// inline clause are nice to have. Without such a block, each skill takes the
/// cue of the first sentence that mentions it alongside "required"/"must
/// have" or "preferred"/"a plus". Anything else is required.
fn split_required_skills(
    text: &str,
    skills: &[String],
    entities: &[Entity],
) -> (Vec<String>, Vec<String>) {
    let spans = preferred_spans(text);
    if spans.is_empty() {
        return skills
            .iter()
            .cloned()
            .partition(|skill| !is_preferred_in_context(text, skill));
    }

    let rest = remove_spans(text, spans);
    let rest_entities: Vec<Entity> = entities
        .iter()
        .filter(|e| rest.contains(&e.text))
        .cloned()
        .collect();
    let required: HashSet<String> = SkillExtractor::shared()
        .extract(&rest, None, &rest_entities)
        .iter()
        .map(|s| fold(s))
        .collect();

    skills
        .iter()
        .cloned()
        .partition(|skill| required.contains(&fold(skill)))
}

/// Byte ranges of the preferred section and every inline preferred clause.
fn preferred_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = JOB_SEGMENTER
        .segment(text)
        .span(JobSection::Preferred)
        .into_iter()
        .collect();

    for caps in PREFERRED_CLAUSE_RE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.name("body")) else {
            continue;
        };
        let end = if body.as_str().trim().is_empty() {
            text[whole.end()..]
                .find("\n\n")
                .map_or(text.len(), |offset| whole.end() + offset)
        } else {
            whole.end()
        };
        spans.push(whole.start()..end);
    }
    spans
}

/// `text` with the given byte ranges cut out. Each cut leaves a line break so
/// the surrounding words stay apart.
fn remove_spans(text: &str, mut spans: Vec<Range<usize>>) -> String {
    spans.sort_by_key(|span| span.start);
    let mut rest = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            rest.push_str(text.get(cursor..span.start).unwrap_or(""));
            rest.push('\n');
        }
        cursor = cursor.max(span.end);
    }
    rest.push_str(text.get(cursor..).unwrap_or(""));
    rest
}

fn is_preferred_in_context(text: &str, skill: &str) -> bool {
    let skill = fold(skill);
    SENTENCE_BREAK_RE
        .split(text)
        .filter(|sentence| mentions(&fold(sentence), &skill))
        .find_map(|sentence| {
            if REQUIRED_CUE_RE.is_match(sentence) {
                Some(false)
            } else if PREFERRED_CUE_RE.is_match(sentence) {
                Some(true)
            } else {
                None
            }
        })
        .unwrap_or(false)
}

/// True when `needle` occurs in `haystack` between non-alphanumeric characters.
fn mentions(haystack: &str, needle: &str) -> bool {
    !needle.is_empty()
        && haystack.match_indices(needle).any(|(idx, _)| {
            let before = haystack[..idx].chars().next_back();
            let after = haystack[idx + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::testing::StubModel;

    // JD fixture: Aggressive startup
    const STARTUP_JD: &str = r#"
        Senior Rust Engineer — Core Infrastructure
        We move fast and own everything end-to-end. You will architect distributed systems,
        spearhead performance initiatives, and drive reliability from zero to production.
        Requirements: 5+ years Rust required, systems programming required, distributed systems expertise required.
        Nice to have: Kubernetes, Kafka experience a plus.
        About Us: Fast-paced Series B startup disrupting fintech infrastructure.
    "#;

    // JD fixture: Collaborative enterprise
    const ENTERPRISE_JD: &str = r#"
        Software Engineer — Platform Team
        Join our collaborative team to contribute to our microservices platform.
        You will partner with product managers and support reliability goals.
        Required: Java, Spring Boot, SQL. Preferred: Kubernetes, CI/CD experience.
        About Globex
        Global enterprise with 50,000 employees focused on financial services.
    "#;

    // JD fixture: Mid-size product company, preferences stated in prose
    const PROSE_JD: &str = "Senior Software Engineer - Backend
ExampleCorp - San Francisco, CA

About ExampleCorp
ExampleCorp is a leading innovator in the tech industry, dedicated to creating solutions that change the world.

We are looking for a Senior Software Engineer with 5+ years of experience in backend development.
The ideal candidate will have a strong background in Python, Java, and cloud platforms like AWS or GCP.
Experience with microservices architecture, Docker, and Kubernetes is a big plus.
You should be proficient in SQL and NoSQL databases, such as PostgreSQL and MongoDB.
Must have excellent communication and problem-solving skills.
A Bachelor's degree in Computer Science or related field is required. M.S. preferred.
Relevant experience: 3-5 years of professional software development.";

    fn analyze(text: &str) -> JobDescriptionRecord {
        analyze_job(text, &EntityExtractor::disabled())
    }

    #[test]
    fn test_experience_years_plus() {
        assert_eq!(
            extract_experience_years("5+ years of experience").as_deref(),
            Some("5+ years")
        );
    }

    #[test]
    fn test_experience_years_range() {
        assert_eq!(
            extract_experience_years("3-5 years of experience").as_deref(),
            Some("3-5 years")
        );
        assert_eq!(
            extract_experience_years("two to four years in a similar role").as_deref(),
            Some("2-4 years")
        );
    }

    #[test]
    fn test_experience_years_at_least_and_plain() {
        assert_eq!(
            extract_experience_years("at least 3 years of experience in ML").as_deref(),
            Some("3+ years")
        );
        assert_eq!(
            extract_experience_years("Minimum of five years experience").as_deref(),
            Some("5+ years")
        );
        assert_eq!(
            extract_experience_years("7 years of professional software experience").as_deref(),
            Some("7 years")
        );
        assert!(extract_experience_years("Founded in 2015 with 40 staff").is_none());
    }

    #[test]
    fn test_earliest_years_phrase_wins() {
        let text = "5+ years preferred.\nRelevant experience: 3-5 years of professional work.";
        assert_eq!(extract_experience_years(text).as_deref(), Some("5+ years"));
        let text = "3-5 years of Go. Overall 8+ years in software.";
        assert_eq!(extract_experience_years(text).as_deref(), Some("3-5 years"));
    }

    #[test]
    fn test_seniority_priority() {
        assert_eq!(detect_seniority("Senior Engineering Manager"), Some("Manager"));
        assert_eq!(detect_seniority("Principal or Senior engineer"), Some("Principal"));
        assert_eq!(detect_seniority("Staff Engineer, platform"), Some("Staff"));
        assert_eq!(detect_seniority("Tech Lead (Senior)"), Some("Lead"));
        assert_eq!(detect_seniority("Senior and Junior roles open"), Some("Senior"));
        assert_eq!(detect_seniority("Mid-level backend engineer"), Some("Mid-Level"));
        assert_eq!(detect_seniority("Entry-level analyst"), Some("Junior"));
        assert_eq!(detect_seniority("Backend engineer"), None);
    }

    #[test]
    fn test_job_title_label_wins() {
        let text = "ACME HIRING\nJob Title: Staff Data Engineer\nWe need a Software Engineer";
        assert_eq!(detect_job_title(text).as_deref(), Some("Staff Data Engineer"));
    }

    #[test]
    fn test_job_title_common_title_line() {
        assert_eq!(
            detect_job_title(ENTERPRISE_JD).as_deref(),
            Some("Software Engineer — Platform Team")
        );
    }

    #[test]
    fn test_job_title_first_line_fallback() {
        assert_eq!(
            detect_job_title(STARTUP_JD).as_deref(),
            Some("Senior Rust Engineer — Core Infrastructure")
        );
        assert_eq!(
            detect_job_title("Join our amazing team of builders who love shipping great products fast").as_deref(),
            Some("Join our amazing team of builders who love shippin")
        );
    }

    #[test]
    fn test_company_from_about() {
        assert_eq!(detect_company(ENTERPRISE_JD, &[]).as_deref(), Some("Globex"));
        // "About Us" is not a company name.
        assert_eq!(detect_company(STARTUP_JD, &[]), None);
    }

    #[test]
    fn test_company_from_most_frequent_org() {
        let entities = vec![
            Entity {
                text: "Initech".to_string(),
                label: EntityLabel::Org,
                score: 0.9,
                start: 0,
                end: 7,
            },
            Entity {
                text: "Inc".to_string(),
                label: EntityLabel::Org,
                score: 0.9,
                start: 10,
                end: 13,
            },
            Entity {
                text: "Initech".to_string(),
                label: EntityLabel::Org,
                score: 0.9,
                start: 20,
                end: 27,
            },
            Entity {
                text: "AWS".to_string(),
                label: EntityLabel::Org,
                score: 0.9,
                start: 30,
                end: 33,
            },
        ];
        assert_eq!(company_from_entities(&entities).as_deref(), Some("Initech"));
    }

    #[test]
    fn test_company_suffix_fallback() {
        let text = "We need a data scientist.\nJoin DataDriven Inc. and build models.";
        assert_eq!(detect_company(text, &[]).as_deref(), Some("DataDriven Inc."));
    }

    #[test]
    fn test_required_and_nice_to_have_split() {
        let record = analyze(STARTUP_JD);
        assert!(record.skills.contains(&"Rust".to_string()));
        assert!(record.skills.contains(&"Kubernetes".to_string()));
        assert!(record.required_skills.contains(&"Rust".to_string()));
        assert_eq!(
            record.nice_to_have_skills,
            vec!["Kafka".to_string(), "Kubernetes".to_string()]
        );
        assert_eq!(record.experience_years.as_deref(), Some("5+ years"));
        assert_eq!(record.seniority.as_deref(), Some("Senior"));
    }

    #[test]
    fn test_skill_in_both_blocks_stays_required() {
        let text = "Requirements\n- Python and SQL\nNice to have\n- Python notebooks, Airflow";
        let record = analyze(text);
        assert_eq!(record.required_skills, vec!["Python".to_string(), "SQL".to_string()]);
        assert_eq!(record.nice_to_have_skills, vec!["Airflow".to_string()]);
    }

    #[test]
    fn test_inline_preferred_clause() {
        let record = analyze(ENTERPRISE_JD);
        assert_eq!(
            record.nice_to_have_skills,
            vec!["CI/CD".to_string(), "Kubernetes".to_string()]
        );
        assert!(record.required_skills.contains(&"Java".to_string()));
        assert!(record.required_skills.contains(&"SQL".to_string()));
        assert!(!record.required_skills.contains(&"Kubernetes".to_string()));
    }

    #[test]
    fn test_preference_from_sentence_context() {
        let record = analyze(PROSE_JD);
        assert_eq!(record.experience_years.as_deref(), Some("5+ years"));
        assert_eq!(record.job_title.as_deref(), Some("Senior Software Engineer - Backend"));
        assert_eq!(record.company_name.as_deref(), Some("ExampleCorp"));
        assert!(record.nice_to_have_skills.contains(&"Docker".to_string()));
        assert!(record.nice_to_have_skills.contains(&"Kubernetes".to_string()));
        for skill in ["Python", "Java", "AWS", "SQL"] {
            assert!(record.required_skills.contains(&skill.to_string()), "{skill}");
        }
    }

    #[test]
    fn test_preferred_block_removed_by_position() {
        let text = "Requirements\n- Dockerfile authoring, Python\nNice to have\n- Docker";
        let record = analyze(text);
        assert_eq!(record.required_skills, vec!["Python".to_string()]);
        assert_eq!(record.nice_to_have_skills, vec!["Docker".to_string()]);
    }

    #[test]
    fn test_remove_spans_merges_overlaps() {
        let text = "keep one. drop this. and this. keep two";
        assert_eq!(remove_spans(text, vec![21..30, 10..25]), "keep one. \n keep two");
        assert_eq!(remove_spans(text, Vec::new()), text);
    }

    #[test]
    fn test_summary_keywords_rank_by_frequency() {
        let keywords = summary_keywords(
            "Rust services. We write Rust and Kafka pipelines; Kafka runs on AWS. Rust is the team language for our services.",
        );
        assert_eq!(&keywords[..3], ["rust", "services", "kafka"]);
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"team".to_string()));
        assert!(!keywords.contains(&"on".to_string()));
        assert!(keywords.contains(&"aws".to_string()));

        let record = analyze(PROSE_JD);
        assert!(record.summary_keywords.len() <= 20);
        assert_eq!(&record.summary_keywords[..2], ["software", "examplecorp"]);
    }

    #[test]
    fn test_ner_orgs_feed_company_and_skills() {
        let ner = StubModel::extractor(vec![
            ("Umbrella", EntityLabel::Org),
            ("Stripe API", EntityLabel::Product),
        ]);
        let record = analyze_job(
            "Backend Developer\nUmbrella is hiring. You will integrate the Stripe API.",
            &ner,
        );
        assert_eq!(record.company_name.as_deref(), Some("Umbrella"));
        assert!(record.skills.contains(&"Stripe API".to_string()));
    }

    #[test]
    fn test_empty_job_text() {
        assert_eq!(analyze(""), JobDescriptionRecord::default());
        assert_eq!(analyze("   \n "), JobDescriptionRecord::default());
    }
}
