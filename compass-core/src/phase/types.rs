//! Phase catalog and per-user phase records

use serde::{Deserialize, Serialize};

/// One of the seven fixed phases of the full assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SelfDiscovery,
    IdeaDiscovery,
    MarketResearch,
    BusinessPillars,
    ProductConceptTesting,
    BusinessDevelopment,
    BusinessPrototypeTesting,
}

impl Phase {
    /// Phases in the order they are presented
    pub const ALL: [Phase; 7] = [
        Phase::SelfDiscovery,
        Phase::IdeaDiscovery,
        Phase::MarketResearch,
        Phase::BusinessPillars,
        Phase::ProductConceptTesting,
        Phase::BusinessDevelopment,
        Phase::BusinessPrototypeTesting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfDiscovery => "self_discovery",
            Self::IdeaDiscovery => "idea_discovery",
            Self::MarketResearch => "market_research",
            Self::BusinessPillars => "business_pillars",
            Self::ProductConceptTesting => "product_concept_testing",
            Self::BusinessDevelopment => "business_development",
            Self::BusinessPrototypeTesting => "business_prototype_testing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SelfDiscovery => "Self Discovery",
            Self::IdeaDiscovery => "Idea Discovery",
            Self::MarketResearch => "Market Research",
            Self::BusinessPillars => "Business Pillars",
            Self::ProductConceptTesting => "Product Concept Testing",
            Self::BusinessDevelopment => "Business Development",
            Self::BusinessPrototypeTesting => "Business Prototype Testing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SelfDiscovery => "Understand your entrepreneurial personality and motivations",
            Self::IdeaDiscovery => "Transform insights into concrete business opportunities",
            Self::MarketResearch => "Validate assumptions and understand competitive dynamics",
            Self::BusinessPillars => "Define foundational elements for strategic planning",
            Self::ProductConceptTesting => "Validate product concepts with real customer feedback",
            Self::BusinessDevelopment => "Strategic decision-making and resource optimization",
            Self::BusinessPrototypeTesting => {
                "Complete business model validation in real market conditions"
            }
        }
    }

    pub fn group(&self) -> &'static str {
        match self {
            Self::SelfDiscovery
            | Self::IdeaDiscovery
            | Self::MarketResearch
            | Self::BusinessPillars => "Foundation & Strategy",
            Self::ProductConceptTesting
            | Self::BusinessDevelopment
            | Self::BusinessPrototypeTesting => "Implementation & Testing",
        }
    }

    /// Human-readable time estimate
    pub fn duration(&self) -> &'static str {
        match self {
            Self::SelfDiscovery => "60-90 minutes",
            Self::IdeaDiscovery => "90-120 minutes",
            Self::MarketResearch => "2-3 weeks",
            Self::BusinessPillars => "1-2 weeks",
            Self::ProductConceptTesting => "2-4 weeks",
            Self::BusinessDevelopment => "1-2 weeks",
            Self::BusinessPrototypeTesting => "3-6 weeks",
        }
    }

    /// 1-based position in [`Phase::ALL`]
    pub fn order(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|p| p == self)
            .map_or(0, |idx| idx as u8 + 1)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's run through one phase (unique per user and phase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseAssessment {
    pub id: i64,
    pub user_id: i64,
    pub phase_id: Phase,
    pub phase_name: String,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub is_completed: bool,
    /// 0..=100
    pub progress_percentage: f64,
    /// Free-form results the client attaches to the phase
    pub assessment_data: serde_json::Value,
}

/// Static phase description merged with the user's progress on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOverview {
    pub id: Phase,
    pub name: String,
    pub description: String,
    pub phase_group: String,
    pub duration: String,
    pub order: u8,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub is_completed: bool,
    pub progress_percentage: f64,
    pub assessment_id: Option<i64>,
}

impl PhaseOverview {
    pub fn new(phase: Phase, assessment: Option<&PhaseAssessment>) -> Self {
        Self {
            id: phase,
            name: phase.name().to_string(),
            description: phase.description().to_string(),
            phase_group: phase.group().to_string(),
            duration: phase.duration().to_string(),
            order: phase.order(),
            started_at: assessment.map(|a| a.started_at),
            completed_at: assessment.and_then(|a| a.completed_at),
            is_completed: assessment.is_some_and(|a| a.is_completed),
            progress_percentage: assessment.map_or(0.0, |a| a.progress_percentage),
            assessment_id: assessment.map(|a| a.id),
        }
    }
}

/// An answer within a phase (unique per assessment and question)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResponse {
    pub id: i64,
    pub assessment_id: i64,
    pub section_id: String,
    pub question_id: String,
    pub question_text: String,
    /// e.g. `multiple_choice`, `text`, `scale`, `matrix`
    pub response_type: String,
    pub response_value: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Client-supplied answer for a phase question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseResponseInput {
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub response_value: serde_json::Value,
}

impl PhaseResponseInput {
    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("section_id", &self.section_id),
            ("question_id", &self.question_id),
            ("question_text", &self.question_text),
            ("response_type", &self.response_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Clamped to 0..=100
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    /// Completing a phase pins progress to 100
    #[serde(default)]
    pub is_completed: bool,
    /// Replaces the stored data when it is not empty
    #[serde(default)]
    pub assessment_data: Option<serde_json::Value>,
}

/// A phase with every answer recorded for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResponses {
    pub assessment: PhaseAssessment,
    pub responses: Vec<PhaseResponse>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Structured results collected across phases, stored as one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSections {
    #[serde(default = "empty_object")]
    pub primary_opportunity: serde_json::Value,
    #[serde(default = "empty_object")]
    pub skills_assessment: serde_json::Value,
    #[serde(default = "empty_object")]
    pub market_analysis: serde_json::Value,
    #[serde(default = "empty_object")]
    pub competitive_analysis: serde_json::Value,
    #[serde(default = "empty_object")]
    pub target_customers: serde_json::Value,
    #[serde(default = "empty_object")]
    pub business_model: serde_json::Value,
    #[serde(default = "empty_object")]
    pub financial_projections: serde_json::Value,
    #[serde(default = "empty_object")]
    pub go_to_market_strategy: serde_json::Value,
    #[serde(default = "empty_object")]
    pub product_concept_results: serde_json::Value,
    #[serde(default = "empty_object")]
    pub business_development_plan: serde_json::Value,
    #[serde(default = "empty_object")]
    pub prototype_testing_results: serde_json::Value,
    #[serde(default = "empty_object")]
    pub ai_recommendations: serde_json::Value,
}

impl Default for ProfileSections {
    fn default() -> Self {
        Self {
            primary_opportunity: empty_object(),
            skills_assessment: empty_object(),
            market_analysis: empty_object(),
            competitive_analysis: empty_object(),
            target_customers: empty_object(),
            business_model: empty_object(),
            financial_projections: empty_object(),
            go_to_market_strategy: empty_object(),
            product_concept_results: empty_object(),
            business_development_plan: empty_object(),
            prototype_testing_results: empty_object(),
            ai_recommendations: empty_object(),
        }
    }
}

/// A user's consolidated entrepreneur profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrepreneurProfile {
    pub id: i64,
    pub user_id: i64,
    pub entrepreneur_archetype: Option<String>,
    pub core_motivation: Option<String>,
    pub risk_tolerance: Option<f64>,
    pub confidence_level: Option<f64>,
    pub opportunity_score: Option<f64>,
    pub success_probability: Option<f64>,
    #[serde(flatten)]
    pub sections: ProfileSections,
    pub created_at: i64,
    pub updated_at: i64,
}

impl EntrepreneurProfile {
    /// Blank profile; `id` is assigned when stored
    pub fn new(user_id: i64, now: i64) -> Self {
        Self {
            id: 0,
            user_id,
            entrepreneur_archetype: None,
            core_motivation: None,
            risk_tolerance: None,
            confidence_level: None,
            opportunity_score: None,
            success_probability: None,
            sections: ProfileSections::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update; absent or null fields are left unchanged.
///
/// Section values that are not objects or arrays are stored as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub entrepreneur_archetype: Option<String>,
    pub core_motivation: Option<String>,
    pub risk_tolerance: Option<f64>,
    pub confidence_level: Option<f64>,
    pub opportunity_score: Option<f64>,
    pub success_probability: Option<f64>,
    pub primary_opportunity: Option<serde_json::Value>,
    pub skills_assessment: Option<serde_json::Value>,
    pub market_analysis: Option<serde_json::Value>,
    pub competitive_analysis: Option<serde_json::Value>,
    pub target_customers: Option<serde_json::Value>,
    pub business_model: Option<serde_json::Value>,
    pub financial_projections: Option<serde_json::Value>,
    pub go_to_market_strategy: Option<serde_json::Value>,
    pub product_concept_results: Option<serde_json::Value>,
    pub business_development_plan: Option<serde_json::Value>,
    pub prototype_testing_results: Option<serde_json::Value>,
    pub ai_recommendations: Option<serde_json::Value>,
}

fn section_value(value: serde_json::Value) -> serde_json::Value {
    if value.is_object() || value.is_array() {
        value
    } else {
        empty_object()
    }
}

impl ProfileUpdate {
    /// Apply the present fields to `profile`
    pub fn apply(self, profile: &mut EntrepreneurProfile) {
        fn set<T>(target: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *target = value;
            }
        }
        fn set_section(target: &mut serde_json::Value, value: Option<serde_json::Value>) {
            if let Some(value) = value {
                *target = section_value(value);
            }
        }

        set(&mut profile.entrepreneur_archetype, self.entrepreneur_archetype);
        set(&mut profile.core_motivation, self.core_motivation);
        set(&mut profile.risk_tolerance, self.risk_tolerance);
        set(&mut profile.confidence_level, self.confidence_level);
        set(&mut profile.opportunity_score, self.opportunity_score);
        set(&mut profile.success_probability, self.success_probability);

        let sections = &mut profile.sections;
        set_section(&mut sections.primary_opportunity, self.primary_opportunity);
        set_section(&mut sections.skills_assessment, self.skills_assessment);
        set_section(&mut sections.market_analysis, self.market_analysis);
        set_section(&mut sections.competitive_analysis, self.competitive_analysis);
        set_section(&mut sections.target_customers, self.target_customers);
        set_section(&mut sections.business_model, self.business_model);
        set_section(&mut sections.financial_projections, self.financial_projections);
        set_section(&mut sections.go_to_market_strategy, self.go_to_market_strategy);
        set_section(&mut sections.product_concept_results, self.product_concept_results);
        set_section(&mut sections.business_development_plan, self.business_development_plan);
        set_section(&mut sections.prototype_testing_results, self.prototype_testing_results);
        set_section(&mut sections.ai_recommendations, self.ai_recommendations);
    }
}
