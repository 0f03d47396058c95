//! Catalog data models: careers, quiz questions, roadmaps and the college/exam directory.
//!
//! All records are reference data. They are written once by the seeder and only read
//! at runtime. JSON field names are camelCase to match what the frontend consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six RIASEC interest categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiasecType {
    #[serde(rename = "R")]
    Realistic,
    #[serde(rename = "I")]
    Investigative,
    #[serde(rename = "A")]
    Artistic,
    #[serde(rename = "S")]
    Social,
    #[serde(rename = "E")]
    Enterprising,
    #[serde(rename = "C")]
    Conventional,
}

impl RiasecType {
    /// Canonical R, I, A, S, E, C order
    pub const ALL: [RiasecType; 6] = [
        RiasecType::Realistic,
        RiasecType::Investigative,
        RiasecType::Artistic,
        RiasecType::Social,
        RiasecType::Enterprising,
        RiasecType::Conventional,
    ];

    pub fn code(self) -> &'static str {
        match self {
            RiasecType::Realistic => "R",
            RiasecType::Investigative => "I",
            RiasecType::Artistic => "A",
            RiasecType::Social => "S",
            RiasecType::Enterprising => "E",
            RiasecType::Conventional => "C",
        }
    }

    /// Human readable label shown on the results page
    pub fn label(self) -> &'static str {
        match self {
            RiasecType::Realistic => "Realistic (Doers)",
            RiasecType::Investigative => "Investigative (Thinkers)",
            RiasecType::Artistic => "Artistic (Creators)",
            RiasecType::Social => "Social (Helpers)",
            RiasecType::Enterprising => "Enterprising (Persuaders)",
            RiasecType::Conventional => "Conventional (Organizers)",
        }
    }
}

impl fmt::Display for RiasecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RiasecType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiasecType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| format!("unknown RIASEC type '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCareer {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RiasecType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Omitted from listing responses; present on single-career lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_careers: Option<Vec<SubCareer>>,
}

impl Career {
    /// Listing view of this career (sub-careers stripped)
    pub fn summary(&self) -> Career {
        Career {
            sub_careers: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: RiasecType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

/// A roadmap; `steps` are kept in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<RoadmapStep>,
}

/// Discriminant of a college/exam directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Exam,
    College,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Exam => "Exam",
            EntryKind::College => "College",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exam" => Ok(EntryKind::Exam),
            "College" => Ok(EntryKind::College),
            other => Err(format!("unknown entry type '{}'", other)),
        }
    }
}

/// Fields that only exist for one kind of entry, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryDetails {
    Exam {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
    },
    College {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        /// Entrance exam required for admission
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exam: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeExam {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl CollegeExam {
    pub fn kind(&self) -> EntryKind {
        match self.details {
            EntryDetails::Exam { .. } => EntryKind::Exam,
            EntryDetails::College { .. } => EntryKind::College,
        }
    }
}
