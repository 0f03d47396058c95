//! RIASEC assessment scoring.
//!
//! Each "yes" answer adds one point to the type of its question. The three highest types
//! (ties broken by R, I, A, S, E, C order) pick the recommended careers.

use crate::catalog::{Career, Question, RiasecType};
use crate::error::{CatalogError, Result};
use crate::store::{CareerFilter, CatalogStore, PageWindow};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOP_TYPES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: i64,
    pub yes: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Points per RIASEC type, serialized as `{"R": n, "I": n, ...}` in canonical order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiasecScores([u32; 6]);

impl RiasecScores {
    fn slot(kind: RiasecType) -> usize {
        RiasecType::ALL
            .iter()
            .position(|t| *t == kind)
            .unwrap_or_default()
    }

    pub fn get(&self, kind: RiasecType) -> u32 {
        self.0[Self::slot(kind)]
    }

    pub fn add(&mut self, kind: RiasecType) {
        self.0[Self::slot(kind)] += 1;
    }

    /// Highest scoring types first. The sort is stable over canonical order, so ties
    /// keep R, I, A, S, E, C order.
    pub fn top_types(&self, n: usize) -> Vec<RiasecType> {
        let mut ranked = RiasecType::ALL.to_vec();
        ranked.sort_by(|a, b| self.get(*b).cmp(&self.get(*a)));
        ranked.truncate(n);
        ranked
    }
}

impl Serialize for RiasecScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RiasecType::ALL.len()))?;
        for kind in RiasecType::ALL {
            map.serialize_entry(kind.code(), &self.get(kind))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RiasecScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = HashMap::<String, u32>::deserialize(deserializer)?;
        let mut scores = RiasecScores::default();
        for (code, points) in raw {
            let kind = code.parse::<RiasecType>().map_err(<D::Error as serde::de::Error>::custom)?;
            scores.0[Self::slot(kind)] = points;
        }
        Ok(scores)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub scores: RiasecScores,
    pub top_types: Vec<RiasecType>,
    pub careers: Vec<Career>,
}

/// Tally answers against the question bank. A repeated question counts once, using
/// its last answer.
pub fn score(questions: &[Question], answers: &[Answer]) -> Result<RiasecScores> {
    let by_id: HashMap<i64, RiasecType> = questions.iter().map(|q| (q.id, q.kind)).collect();

    let mut latest: HashMap<i64, bool> = HashMap::new();
    for answer in answers {
        if !by_id.contains_key(&answer.question_id) {
            return Err(CatalogError::validation(format!(
                "unknown question id {}",
                answer.question_id
            )));
        }
        latest.insert(answer.question_id, answer.yes);
    }

    let mut scores = RiasecScores::default();
    for (id, yes) in latest {
        if yes && let Some(kind) = by_id.get(&id) {
            scores.add(*kind);
        }
    }
    Ok(scores)
}

/// Careers whose type is among `top`, in catalog order
pub fn match_careers(careers: Vec<Career>, top: &[RiasecType]) -> Vec<Career> {
    careers
        .into_iter()
        .filter(|c| top.contains(&c.kind))
        .collect()
}

pub async fn assess(store: &dyn CatalogStore, request: &AssessmentRequest) -> Result<AssessmentResult> {
    let everything = CareerFilter::default();
    let (questions, total) = tokio::try_join!(store.questions(), store.count_careers(&everything))?;

    let scores = score(&questions, &request.answers)?;
    let top_types = scores.top_types(TOP_TYPES);

    let careers = store
        .find_careers(&everything, PageWindow { skip: 0, limit: total.max(1) })
        .await?;

    Ok(AssessmentResult {
        scores,
        careers: match_careers(careers, &top_types),
        top_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;
    use crate::seed::tests::career;
    use crate::store::MemoryStore;
    use RiasecType::*;

    fn bank() -> Vec<Question> {
        RiasecType::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, kind)| {
                (0..2).map(move |j| Question {
                    id: (i * 2 + j + 1) as i64,
                    question: format!("Question {}", i * 2 + j + 1),
                    kind: *kind,
                })
            })
            .collect()
    }

    fn yes(ids: &[i64]) -> Vec<Answer> {
        ids.iter()
            .map(|id| Answer {
                question_id: *id,
                yes: true,
            })
            .collect()
    }

    #[test]
    fn test_scores_count_only_yes_answers() {
        let mut answers = yes(&[1, 2, 3, 9]);
        answers.push(Answer {
            question_id: 4,
            yes: false,
        });
        let scores = score(&bank(), &answers).unwrap();
        assert_eq!(scores.get(Realistic), 2);
        assert_eq!(scores.get(Investigative), 1);
        assert_eq!(scores.get(Enterprising), 1);
        assert_eq!(scores.get(Artistic), 0);
    }

    #[test]
    fn test_repeated_answer_uses_last() {
        let answers = vec![
            Answer { question_id: 1, yes: true },
            Answer { question_id: 1, yes: true },
            Answer { question_id: 1, yes: false },
        ];
        assert_eq!(score(&bank(), &answers).unwrap().get(Realistic), 0);
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let err = score(&bank(), &yes(&[404])).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
    }

    #[test]
    fn test_top_types_ties_keep_canonical_order() {
        let none = RiasecScores::default();
        assert_eq!(none.top_types(3), vec![Realistic, Investigative, Artistic]);

        let scores = score(&bank(), &yes(&[11, 12, 7, 9])).unwrap();
        // C=2, then S=1 and E=1 tied
        assert_eq!(scores.top_types(3), vec![Conventional, Social, Enterprising]);
    }

    #[test]
    fn test_scores_serialize_in_canonical_order() {
        let scores = score(&bank(), &yes(&[5])).unwrap();
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"R":0,"I":0,"A":1,"S":0,"E":0,"C":0}"#);
        let back: RiasecScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }

    #[tokio::test]
    async fn test_assess_matches_careers_by_top_types() {
        let store = MemoryStore::new(SeedData {
            careers: vec![
                career(1, "Mechanic", Realistic),
                career(2, "Nurse", Social),
                career(3, "Accountant", Conventional),
                career(4, "Painter", Artistic),
                career(5, "Teacher", Social),
            ],
            questions: bank(),
            ..Default::default()
        });
        let request = AssessmentRequest {
            answers: yes(&[7, 8, 11, 1]),
        };
        let result = assess(&store, &request).await.unwrap();
        assert_eq!(result.top_types, vec![Social, Realistic, Conventional]);
        let ids: Vec<i64> = result.careers.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 5]);
        assert!(result.careers.iter().all(|c| c.sub_careers.is_none()));
    }
}
