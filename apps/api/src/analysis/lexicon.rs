//! Lexicon Store — the fixed vocabularies the extractor matches against.
//!
//! Every phrase is stored in its canonical lowercase form. Lookups are
//! ASCII case-insensitive and whole-word: a phrase only counts when the
//! characters on either side of it are not word characters, so `java` never
//! fires inside `javascript` and `c++` still fires in `C++, Rust`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};

// ────────────────────────────────────────────────────────────────────────────
// Vocabularies
// ────────────────────────────────────────────────────────────────────────────

pub const SKILLS: &[&str] = &[
    "python", "java", "html5", "php", "css", "mysql", "c++", "c#", "javascript", "typescript",
    "sql", "html", "react", "node.js", "angular", "vue.js", "django", "flask", "spring",
    "ruby on rails", "tensorflow", "pytorch", "scikit-learn", "keras", "aws", "azure",
    "google cloud", "docker", "kubernetes", "linux", "windows server", "git", "jenkins", "ci/cd",
    "rest api", "graphql", "networking", "firewalls", "vmware", "data analysis", "big data",
    "hadoop", "spark", "etl", "sql server", "oracle", "mongodb", "nosql", "machine learning",
    "deep learning", "nlp", "computer vision", "ai", "qa", "testing", "automation testing",
    "manual testing", "selenium", "jira", "project management", "agile", "scrum", "kanban",
    "leadership", "teamwork", "communication", "problem solving", "critical thinking",
    "time management", "sales", "marketing", "seo", "content writing", "business analysis",
    "accounting", "finance", "budgeting", "customer service", "crm", "microsoft word", "ms word",
    "word", "microsoft excel", "ms excel", "excel", "microsoft powerpoint", "ms powerpoint",
    "powerpoint", "microsoft outlook", "ms outlook", "outlook", "microsoft access", "ms access",
    "access", "google docs", "google sheets", "google slides", "google drive", "notion", "trello",
    "slack", "asana", "photoshop", "illustrator", "indesign", "figma", "sketch", "ux/ui design",
    "video editing", "after effects", "premiere pro", "coreldraw", "animation", "english",
    "spanish", "french", "german", "mandarin", "hindi", "research", "data visualization",
    "reporting", "presentation", "writing", "adaptability", "mentoring", "coaching", "training",
];

pub const EDUCATION_KEYWORDS: &[&str] = &[
    "bachelor", "b.sc", "b.a", "b.com", "b.tech", "b.eng", "bba", "bachelor of science",
    "bachelor of arts", "bachelor of commerce", "bachelor of technology",
    "bachelor of engineering", "bachelor of business administration", "master", "m.sc", "m.a",
    "m.com", "m.tech", "mba", "master of science", "master of arts", "master of commerce",
    "master of technology", "master of business administration", "data science", "phd",
    "doctor of philosophy", "d.phil", "doctorate", "associate", "associate degree", "diploma",
    "certificate", "certification", "vocational training", "professional course", "law degree",
    "llb", "llm", "medical degree", "md", "bds", "mds", "bachelors in nursing",
    "masters in nursing", "degree", "bsc", "computer science", "msc", "mtech", "b.e.", "m.e.",
    "data analytics",
];

pub const JOB_TITLES: &[&str] = &[
    "database developer", "java developer", "developer", "software engineer", "web developer",
    "frontend developer", "backend developer", "fullstack developer", "data engineer",
    "data scientist", "machine learning engineer", "ai engineer", "nlp engineer",
    "devops engineer", "cloud engineer", "qa engineer", "system administrator",
    "network engineer", "security analyst", "it specialist", "database administrator",
    "product manager", "technical lead", "cto", "cio", "business analyst", "financial analyst",
    "accountant", "auditor", "consultant", "project manager", "operations manager",
    "sales manager", "marketing manager", "hr manager", "recruiter", "customer service manager",
    "strategist", "risk manager", "investment analyst", "portfolio manager", "graphic designer",
    "ux designer", "ui designer", "product designer", "visual designer", "animator",
    "video editor", "content writer", "copywriter", "creative director", "photographer",
    "illustrator", "doctor", "nurse", "pharmacist", "research scientist", "lab technician",
    "biologist", "chemist", "physicist", "clinical researcher", "administrator", "specialist",
    "coordinator", "trainer", "mentor", "lecturer", "teacher", "executive", "assistant", "intern",
    "technician", "supervisor", "data analyst",
];

pub static SKILLS_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(SKILLS));
pub static EDUCATION_LEXICON: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new(EDUCATION_KEYWORDS));
pub static JOB_TITLE_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(JOB_TITLES));

// ────────────────────────────────────────────────────────────────────────────
// Matcher
// ────────────────────────────────────────────────────────────────────────────

/// A read-only vocabulary compiled into a single multi-pattern automaton.
pub struct Lexicon {
    phrases: &'static [&'static str],
    automaton: AhoCorasick,
}

impl Lexicon {
    /// Compiles a vocabulary. Phrases must already be lowercase.
    pub fn new(phrases: &'static [&'static str]) -> Self {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(phrases)
            .expect("lexicon phrases are plain literals and always compile");
        Self { phrases, automaton }
    }

    /// Returns every canonical phrase that occurs in `text` as a whole word or
    /// contiguous word sequence.
    ///
    /// Overlapping matches are all considered, so `java developer` and
    /// `developer` both register from the same span of text.
    pub fn find_in(&self, text: &str) -> BTreeSet<&'static str> {
        self.automaton
            .find_overlapping_iter(text)
            .filter(|m| is_whole_word(text, m.start(), m.end()))
            .map(|m| self.phrases[m.pattern().as_usize()])
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}
