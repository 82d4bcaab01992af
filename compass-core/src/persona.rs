//! Persona classification
//!
//! A persona ("assessment path") decides which priority tiers a user is
//! asked, how verbose explanations are, and the expected time budget. Each
//! persona lists trigger conditions; the persona with the most satisfied
//! triggers wins, earlier personas win ties, and a user matching nothing is
//! treated as a beginner.

use serde::{Deserialize, Serialize};

use crate::catalog::{ExplanationLevel, Priority};
use crate::expr::{self, Responses};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    BeginnerEntrepreneur,
    ExperiencedProfessional,
    SerialEntrepreneur,
    IndustrySpecialist,
    CreativeInnovator,
}

impl Persona {
    /// Declaration order; earlier entries win ties
    pub const ALL: [Persona; 5] = [
        Persona::BeginnerEntrepreneur,
        Persona::ExperiencedProfessional,
        Persona::SerialEntrepreneur,
        Persona::IndustrySpecialist,
        Persona::CreativeInnovator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeginnerEntrepreneur => "beginner_entrepreneur",
            Self::ExperiencedProfessional => "experienced_professional",
            Self::SerialEntrepreneur => "serial_entrepreneur",
            Self::IndustrySpecialist => "industry_specialist",
            Self::CreativeInnovator => "creative_innovator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            Self::BeginnerEntrepreneur => &[
                r#"entrepreneurship_experience == "none""#,
                "business_knowledge_level <= 2",
            ],
            Self::ExperiencedProfessional => &["work_experience >= 5", "leadership_roles > 0"],
            Self::SerialEntrepreneur => &[
                "previous_businesses > 0",
                r#"startup_experience == "extensive""#,
            ],
            Self::IndustrySpecialist => &[
                "industry_experience >= 7",
                r#"domain_expertise == "high""#,
            ],
            Self::CreativeInnovator => &[
                r#"creative_background == "yes""#,
                r#"innovation_focus == "high""#,
            ],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BeginnerEntrepreneur => {
                "Comprehensive assessment for new entrepreneurs with detailed guidance"
            }
            Self::ExperiencedProfessional => {
                "Accelerated assessment focusing on strategic business development"
            }
            Self::SerialEntrepreneur => "Expert validation track for experienced business founders",
            Self::IndustrySpecialist => "Industry-focused assessment leveraging domain expertise",
            Self::CreativeInnovator => "Innovation-centered assessment for creative entrepreneurs",
        }
    }

    /// Static configuration snapshot for this persona
    pub fn config(&self) -> PathConfig {
        use Priority::*;

        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match self {
            Self::BeginnerEntrepreneur => PathConfig {
                question_priorities: vec![Critical, Important, Optional],
                explanation_level: ExplanationLevel::Detailed,
                estimated_minutes: 180,
                focus_areas: vec![],
                pre_populate_areas: vec![],
                skip_advanced: true,
            },
            Self::ExperiencedProfessional => PathConfig {
                question_priorities: vec![Critical, Important],
                explanation_level: ExplanationLevel::Standard,
                estimated_minutes: 60,
                focus_areas: strings(&["strategic_thinking", "market_opportunity", "execution"]),
                pre_populate_areas: vec![],
                skip_advanced: false,
            },
            Self::SerialEntrepreneur => PathConfig {
                question_priorities: vec![Critical],
                explanation_level: ExplanationLevel::Minimal,
                estimated_minutes: 30,
                focus_areas: strings(&[
                    "scaling",
                    "advanced_market_dynamics",
                    "investor_readiness",
                ]),
                pre_populate_areas: vec![],
                skip_advanced: false,
            },
            Self::IndustrySpecialist => PathConfig {
                question_priorities: vec![Critical, Important],
                explanation_level: ExplanationLevel::Technical,
                estimated_minutes: 45,
                focus_areas: vec![],
                pre_populate_areas: strings(&["market_knowledge", "competitive_landscape"]),
                skip_advanced: false,
            },
            Self::CreativeInnovator => PathConfig {
                question_priorities: vec![Critical, Important],
                explanation_level: ExplanationLevel::Visual,
                estimated_minutes: 75,
                focus_areas: strings(&[
                    "product_development",
                    "design_thinking",
                    "user_experience",
                ]),
                pre_populate_areas: vec![],
                skip_advanced: false,
            },
        }
    }

    /// Number of trigger conditions satisfied by the responses
    pub fn score(&self, responses: &Responses) -> usize {
        self.triggers()
            .iter()
            .filter(|condition| expr::evaluate_condition(condition, responses))
            .count()
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration snapshot stored on a user's assessment path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    pub question_priorities: Vec<Priority>,
    pub explanation_level: ExplanationLevel,
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_populate_areas: Vec<String>,
    #[serde(default)]
    pub skip_advanced: bool,
}

impl PathConfig {
    pub fn includes(&self, priority: Priority) -> bool {
        self.question_priorities.contains(&priority)
    }
}

/// Result of classifying a set of responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub persona: Persona,
    pub config: PathConfig,
    pub score: usize,
}

/// Pick the persona whose triggers best match the responses.
pub fn classify(responses: &Responses) -> Classification {
    let mut best = Persona::BeginnerEntrepreneur;
    let mut best_score = 0;
    for persona in Persona::ALL {
        let score = persona.score(responses);
        if score > best_score {
            best = persona;
            best_score = score;
        }
    }
    Classification {
        persona: best,
        config: best.config(),
        score: best_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses(pairs: &[(&str, serde_json::Value)]) -> Responses {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn no_responses_means_beginner() {
        let result = classify(&Responses::new());
        assert_eq!(result.persona, Persona::BeginnerEntrepreneur);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn beginner_scenario() {
        let result = classify(&responses(&[
            ("experience", json!("none")),
            ("business_knowledge_level", json!(1)),
        ]));
        assert_eq!(result.persona, Persona::BeginnerEntrepreneur);
        assert_eq!(
            result.config.question_priorities,
            vec![Priority::Critical, Priority::Important, Priority::Optional]
        );
    }

    #[test]
    fn experienced_professional_scenario() {
        let result = classify(&responses(&[
            ("work_experience", json!(6)),
            ("leadership_roles", json!(1)),
        ]));
        assert_eq!(result.persona, Persona::ExperiencedProfessional);
        assert_eq!(result.score, 2);
        assert_eq!(
            result.config.question_priorities,
            vec![Priority::Critical, Priority::Important]
        );
    }

    #[test]
    fn ties_go_to_earlier_persona() {
        // one trigger each for experienced professional and creative innovator
        let result = classify(&responses(&[
            ("work_experience", json!(10)),
            ("creative_background", json!("yes")),
        ]));
        assert_eq!(result.persona, Persona::ExperiencedProfessional);
    }

    #[test]
    fn higher_score_beats_declaration_order() {
        let result = classify(&responses(&[
            ("work_experience", json!(10)),
            ("previous_businesses", json!(2)),
            ("startup_experience", json!("extensive")),
        ]));
        assert_eq!(result.persona, Persona::SerialEntrepreneur);
        assert_eq!(result.config.question_priorities, vec![Priority::Critical]);
    }

    #[test]
    fn mistyped_answers_do_not_trigger() {
        let result = classify(&responses(&[("work_experience", json!("ten years"))]));
        assert_eq!(result.persona, Persona::BeginnerEntrepreneur);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn persona_names_round_trip() {
        for persona in Persona::ALL {
            assert_eq!(Persona::parse(persona.as_str()), Some(persona));
        }
        assert_eq!(Persona::parse("astronaut"), None);
    }

    #[test]
    fn config_serializes_priorities_as_integers() {
        let json = serde_json::to_value(Persona::ExperiencedProfessional.config()).unwrap();
        assert_eq!(json["question_priorities"], json!([1, 2]));
        assert_eq!(json["explanation_level"], json!("standard"));
    }
}
