//! Typed views of the structured (JSON) responses requested by the catalog.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub answer: usize,
}

impl QuizQuestion {
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchModule {
    pub title: String,
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub technical_specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub sensor: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAnalysis {
    pub title: String,
    pub scientific_breakthroughs: Vec<String>,
    pub technical_challenges: Vec<Challenge>,
    pub legacy_impact: String,
    pub telemetry_sim: Vec<TelemetryReading>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleBriefing {
    pub module_title: String,
    pub briefing: String,
    pub technical_specs: Vec<Spec>,
    pub key_concepts: Vec<String>,
    pub simulation_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub system: String,
    pub severity: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceWeatherAnalysis {
    pub hazard_level: String,
    pub summary: String,
    pub impacts: Vec<Impact>,
    pub aurora_prediction: String,
    pub technical_telemetry: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerateResponse;

    #[test]
    fn research_module_without_specs_defaults_to_empty() {
        let json = r#"{
            "title": "Pulsars",
            "summary": "Rotating neutron stars.",
            "keyTakeaways": ["Very dense"],
            "sections": [{"heading": "Discovery", "body": "1967, Jocelyn Bell Burnell."}]
        }"#;
        let module: ResearchModule = serde_json::from_str(json).unwrap();
        assert_eq!(module.sections.len(), 1);
        assert!(module.technical_specs.is_empty());
    }

    #[test]
    fn quiz_from_response_text() {
        let response = GenerateResponse::from_text(
            r#"[{"question": "Closest star?", "options": ["Sirius", "Sun", "Vega", "Rigel"], "answer": 1}]"#,
        );
        let questions: Vec<QuizQuestion> = response.parse_json_or("[]").unwrap();
        assert_eq!(questions[0].correct_option(), Some("Sun"));
        assert!(questions[0].is_correct(1));
    }

    #[test]
    fn weather_analysis_uses_camel_case_keys() {
        let json = r#"{
            "hazardLevel": "Moderate",
            "summary": "G2 storm watch.",
            "impacts": [{"system": "GPS", "severity": "Low", "advice": "Expect drift."}],
            "auroraPrediction": "Visible to 55N",
            "technicalTelemetry": "Kp 6"
        }"#;
        let analysis: SpaceWeatherAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.hazard_level, "Moderate");
        assert_eq!(analysis.impacts[0].system, "GPS");
    }
}
