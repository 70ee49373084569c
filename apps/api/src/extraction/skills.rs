//! Skill extraction: dictionary keywords, NER augmentation and free-form
//! skills-section tokens, merged into one case-insensitively deduplicated,
//! sorted list.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use tracing::debug;

use crate::extraction::contact::strip_contact_spans;
use crate::extraction::normalize::{collapse_whitespace, fold};
use crate::ner::{Entity, EntityLabel};

/// How a dictionary term is displayed once matched.
#[derive(Debug, Clone, Copy)]
enum Casing {
    /// Upper-cased: "aws" -> "AWS".
    Acronym,
    /// Title-cased word by word: "machine learning" -> "Machine Learning".
    Title,
    /// Fixed spelling for names with their own casing.
    Exact(&'static str),
}

use Casing::{Acronym, Exact, Title};

const SKILL_DICTIONARY: &[(&str, Casing)] = &[
    // Programming languages
    ("python", Title),
    ("java", Title),
    ("javascript", Exact("JavaScript")),
    ("typescript", Exact("TypeScript")),
    ("c++", Exact("C++")),
    ("c#", Exact("C#")),
    ("golang", Exact("Go")),
    ("rust", Title),
    ("ruby", Title),
    ("php", Acronym),
    ("swift", Title),
    ("kotlin", Title),
    ("scala", Title),
    ("perl", Title),
    ("r programming", Exact("R Programming")),
    ("matlab", Exact("MATLAB")),
    ("sql", Acronym),
    ("nosql", Exact("NoSQL")),
    ("bash", Title),
    ("powershell", Exact("PowerShell")),
    ("html", Acronym),
    ("css", Acronym),
    ("graphql", Exact("GraphQL")),
    // Web frameworks and libraries
    ("react", Title),
    ("react native", Title),
    ("angular", Title),
    ("vue", Title),
    ("vue.js", Exact("Vue.js")),
    ("node.js", Exact("Node.js")),
    ("next.js", Exact("Next.js")),
    ("express.js", Exact("Express.js")),
    ("jquery", Exact("jQuery")),
    ("redux", Title),
    ("bootstrap", Title),
    ("django", Title),
    ("flask", Title),
    ("fastapi", Exact("FastAPI")),
    ("spring", Title),
    ("spring boot", Title),
    (".net", Exact(".NET")),
    ("asp.net", Exact("ASP.NET")),
    ("ruby on rails", Title),
    ("laravel", Title),
    ("flutter", Title),
    // Databases
    ("mysql", Exact("MySQL")),
    ("postgresql", Exact("PostgreSQL")),
    ("sqlite", Exact("SQLite")),
    ("mongodb", Exact("MongoDB")),
    ("redis", Title),
    ("cassandra", Title),
    ("elasticsearch", Title),
    ("dynamodb", Exact("DynamoDB")),
    ("oracle", Title),
    ("sql server", Exact("SQL Server")),
    ("firebase", Title),
    ("neo4j", Exact("Neo4j")),
    // Cloud and DevOps
    ("aws", Acronym),
    ("azure", Title),
    ("gcp", Acronym),
    ("google cloud", Title),
    ("docker", Title),
    ("kubernetes", Title),
    ("k8s", Acronym),
    ("openshift", Exact("OpenShift")),
    ("terraform", Title),
    ("ansible", Title),
    ("jenkins", Title),
    ("ci/cd", Exact("CI/CD")),
    ("git", Title),
    ("github", Exact("GitHub")),
    ("gitlab", Exact("GitLab")),
    ("svn", Acronym),
    ("linux", Title),
    ("unix", Title),
    ("serverless", Title),
    ("microservices", Title),
    ("lambda", Title),
    ("ec2", Acronym),
    ("s3", Acronym),
    ("heroku", Title),
    ("kafka", Title),
    ("airflow", Title),
    // Data science and machine learning
    ("machine learning", Title),
    ("deep learning", Title),
    ("ai", Acronym),
    ("nlp", Acronym),
    ("natural language processing", Title),
    ("computer vision", Title),
    ("data analysis", Title),
    ("data science", Title),
    ("data visualization", Title),
    ("big data", Title),
    ("statistics", Title),
    ("pandas", Title),
    ("numpy", Exact("NumPy")),
    ("scipy", Exact("SciPy")),
    ("scikit-learn", Exact("scikit-learn")),
    ("tensorflow", Exact("TensorFlow")),
    ("keras", Title),
    ("pytorch", Exact("PyTorch")),
    ("spark", Title),
    ("hadoop", Title),
    ("tableau", Title),
    ("power bi", Exact("Power BI")),
    // Practices and methodologies
    ("agile", Title),
    ("scrum", Title),
    ("kanban", Title),
    ("devops", Exact("DevOps")),
    ("restful api", Exact("RESTful API")),
    ("rest api", Exact("REST API")),
    ("tdd", Acronym),
    ("bdd", Acronym),
    ("unit testing", Title),
    ("integration testing", Title),
    ("system design", Title),
    ("software architecture", Title),
    ("design patterns", Title),
    ("object-oriented programming", Title),
    ("ui/ux", Exact("UI/UX")),
    // Business and soft skills
    ("communication", Title),
    ("teamwork", Title),
    ("problem solving", Title),
    ("leadership", Title),
    ("project management", Title),
    ("product management", Title),
    ("stakeholder management", Title),
    ("time management", Title),
    ("critical thinking", Title),
    ("customer service", Title),
    ("negotiation", Title),
    ("sales", Title),
    ("marketing", Title),
    // Tools
    ("jira", Exact("Jira")),
    ("confluence", Title),
    ("salesforce", Title),
    ("sap", Acronym),
    ("excel", Title),
    ("powerpoint", Exact("PowerPoint")),
    ("selenium", Title),
];

/// Entity substrings that suggest a technology even outside the dictionary.
const SPECULATIVE_MARKERS: &[&str] = &["sdk", "api", "framework", "library"];

/// Entity labels that may carry skill names.
const SKILL_ENTITY_LABELS: &[EntityLabel] =
    &[EntityLabel::Org, EntityLabel::Misc, EntityLabel::Product];

pub const MIN_SKILL_TOKEN_CHARS: usize = 2;
pub const MAX_SKILL_TOKEN_CHARS: usize = 30;

const MINOR_WORDS: &[&str] = &["on", "of", "and", "in", "for", "the", "to"];

static SHARED: Lazy<SkillExtractor> =
    Lazy::new(|| SkillExtractor::new().expect("skill dictionary compiles"));

static SECTION_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n•|·]").expect("valid skill split regex"));

struct SkillTerm {
    key: &'static str,
    display: String,
}

pub struct SkillExtractor {
    terms: Vec<SkillTerm>,
    matcher: RegexSet,
    finders: Vec<Regex>,
    lookup: HashMap<&'static str, usize>,
}

impl SkillExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let terms: Vec<SkillTerm> = SKILL_DICTIONARY
            .iter()
            .map(|&(key, casing)| SkillTerm {
                key,
                display: apply_casing(key, casing),
            })
            .collect();

        // Whole-word match where "word" excludes letters, digits and underscore,
        // so "c++", "c#" and ".net" still anchor correctly.
        let keys: Vec<String> = terms
            .iter()
            .map(|term| regex::escape(term.key).replace(' ', r"\s+"))
            .collect();
        let matcher = RegexSet::new(
            keys.iter()
                .map(|key| format!(r"(?i)(?:^|[^a-z0-9_]){key}(?:[^a-z0-9_]|$)")),
        )?;
        // Per-term finders locate the spans of the terms the set reports.
        let finders = keys
            .iter()
            .map(|key| Regex::new(&format!("(?i){key}")))
            .collect::<Result<Vec<_>, _>>()?;

        let lookup = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.key, idx))
            .collect();

        Ok(Self {
            terms,
            matcher,
            finders,
            lookup,
        })
    }

    /// The shared, compiled-once extractor.
    pub fn shared() -> &'static SkillExtractor {
        &SHARED
    }

    /// Runs the full extraction cascade.
    ///
    /// 1. dictionary scan of the whole text
    /// 2. ORG/MISC/PRODUCT entities that match the dictionary, plus entities
    ///    that look like SDKs, APIs or frameworks
    /// 3. free-form tokens from the isolated skills section
    ///
    /// Earlier stages win when two stages produce the same skill with
    /// different casing.
    pub fn extract(
        &self,
        text: &str,
        skills_section: Option<&str>,
        entities: &[Entity],
    ) -> Vec<String> {
        let mut found: BTreeMap<String, String> = BTreeMap::new();
        let mut add = |skill: String| {
            found.entry(fold(&skill)).or_insert(skill);
        };

        let dictionary_hits = self.dictionary_matches(text);
        let dictionary_count = dictionary_hits.len();
        dictionary_hits.into_iter().for_each(&mut add);

        let entity_hits = self.entity_skills(entities);
        let entity_count = entity_hits.len();
        entity_hits.into_iter().for_each(&mut add);

        let section_hits = skills_section
            .map(|section| self.section_skills(section))
            .unwrap_or_default();
        let section_count = section_hits.len();
        section_hits.into_iter().for_each(&mut add);

        debug!(
            "Skill extraction: {} dictionary, {} entity, {} section candidates -> {} skills",
            dictionary_count,
            entity_count,
            section_count,
            found.len()
        );

        found.into_values().collect()
    }

    /// Whole-word, case-insensitive dictionary scan, canonicalized.
    ///
    /// Contact links and emails are blanked first so "github.com/..." is not
    /// a skill. A term whose every occurrence sits inside a longer matched
    /// term ("Spring" in "Spring Boot") is dropped.
    pub fn dictionary_matches(&self, text: &str) -> Vec<String> {
        let text = strip_contact_spans(text);
        let hits: Vec<(usize, Vec<Range<usize>>)> = self
            .matcher
            .matches(&text)
            .into_iter()
            .map(|idx| (idx, self.occurrences(idx, &text)))
            .collect();

        hits.iter()
            .filter(|(idx, spans)| {
                let nested = !spans.is_empty()
                    && spans.iter().all(|span| {
                        hits.iter().any(|(other, outer)| {
                            other != idx
                                && outer.iter().any(|o| {
                                    o.start <= span.start && span.end <= o.end && o.len() > span.len()
                                })
                        })
                    });
                !nested
            })
            .map(|(idx, _)| self.terms[*idx].display.clone())
            .collect()
    }

    /// Whole-word byte spans of one dictionary term in `text`.
    fn occurrences(&self, idx: usize, text: &str) -> Vec<Range<usize>> {
        self.finders[idx]
            .find_iter(text)
            .filter(|m| {
                let before = text[..m.start()].chars().next_back();
                let after = text[m.end()..].chars().next();
                !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
            })
            .map(|m| m.range())
            .collect()
    }

    /// Canonical display form for a dictionary term, or the trimmed input
    /// (source casing preserved) when the term is unknown.
    pub fn canonicalize(&self, term: &str) -> String {
        let cleaned = collapse_whitespace(term);
        match self.lookup.get(fold(&cleaned).as_str()) {
            Some(&idx) => self.terms[idx].display.clone(),
            None => cleaned,
        }
    }

    pub fn is_known(&self, term: &str) -> bool {
        self.lookup
            .contains_key(fold(&collapse_whitespace(term)).as_str())
    }

    fn entity_skills(&self, entities: &[Entity]) -> Vec<String> {
        entities
            .iter()
            .filter(|entity| SKILL_ENTITY_LABELS.contains(&entity.label))
            .filter_map(|entity| {
                let text = collapse_whitespace(&entity.text);
                if self.is_known(&text) {
                    return Some(self.canonicalize(&text));
                }
                let folded = fold(&text);
                let speculative = SPECULATIVE_MARKERS.iter().any(|m| folded.contains(m));
                (speculative && within_token_bounds(&text)).then_some(text)
            })
            .collect()
    }

    /// Splits a skills section on commas, semicolons, bullets, pipes and
    /// newlines, cleaning labels ("Programming:") and proficiency notes
    /// ("(Expert)") from each token.
    pub fn section_skills(&self, section: &str) -> Vec<String> {
        SECTION_SPLIT_RE
            .split(section)
            .filter_map(clean_section_token)
            .filter(|token| within_token_bounds(token))
            .map(|token| self.canonicalize(&token))
            .collect()
    }
}

fn clean_section_token(raw: &str) -> Option<String> {
    let token = raw.trim().trim_start_matches(['-', '*', '•', '·', '>']);
    let token = match token.rfind(':') {
        Some(idx) => &token[idx + 1..],
        None => token,
    };
    let token = token.split('(').next().unwrap_or("");
    let token = token.trim_end_matches([')', '.']).trim();
    let token = collapse_whitespace(token);

    (!token.is_empty() && token.chars().any(char::is_alphabetic)).then_some(token)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn within_token_bounds(token: &str) -> bool {
    let len = token.chars().count();
    (MIN_SKILL_TOKEN_CHARS..=MAX_SKILL_TOKEN_CHARS).contains(&len)
}

fn apply_casing(key: &str, casing: Casing) -> String {
    match casing {
        Casing::Acronym => key.to_uppercase(),
        Casing::Exact(display) => display.to_string(),
        Casing::Title => key
            .split(' ')
            .enumerate()
            .map(|(idx, word)| {
                if idx > 0 && MINOR_WORDS.contains(&word) {
                    return word.to_string();
                }
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
