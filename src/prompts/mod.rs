// The `prompts` module builds every generation request the SpaceScope
// front-end issues, each paired with the response schema it expects.

pub mod archive;
pub mod outputs;
pub mod schema;

use crate::llm::request::{GenerateRequest, Tool};
use crate::llm::settings::DEFAULT_MODEL;
use crate::utils::{TEngine, TEngineError};
use archive::Course;
use serde_json::json;
use thiserror::Error;

pub use archive::{COURSES, CourseModule, fallback_quiz, find_course, quiz_or_fallback};
pub use outputs::{
    MissionAnalysis, ModuleBriefing, QuizQuestion, ResearchModule, SpaceWeatherAnalysis,
};

/// Persona for the cosmic chat assistant.
pub const SYSTEM_INSTRUCTION: &str = "You are the 'SpaceScope AI Navigator', a high-tech, helpful cosmic guide for the SpaceScope platform.
Your persona is a mix of a mission controller and a friendly astrophysicist.
Keep responses concise, scientific yet accessible, and always stay in character.
You know about:
1. Real-time Near Earth Objects (Asteroids)
2. Space Weather (Solar flares, Kp-index)
3. NASA Missions (Apollo, Voyager, Chandrayaan, Artemis)
4. General Astronomy (Black holes, Exoplanets)
If users ask about pricing, mention SpaceScope Pro is ₹49/mo.";

pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Number of feed entries included in a space-weather analysis.
pub const WEATHER_FEED_ENTRIES: usize = 3;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "quiz_topic",
        "Generate 5 challenging multiple-choice questions about {{topic}}. Ensure questions are different from common knowledge.",
    ),
    (
        "quiz_general",
        "Generate 5 unique multiple-choice questions about general astronomy and space exploration. Each restart should provide new questions.",
    ),
    (
        "research",
        "Research the following space topic and provide a structured learning module: {{query}}",
    ),
    (
        "mission",
        "Perform a deep technical and scientific analysis of the space mission: {{name}} ({{year}}). Provide historical context, key breakthroughs, and engineering hurdles.",
    ),
    (
        "briefing",
        "Create a professional space briefing for \"{{module.title}}\" ({{course}}). Subject: {{module.context}}. Focus on technical depth. Output JSON.",
    ),
    (
        "exam",
        "Generate 5 expert MCQ questions for \"{{course}}\" exam. Coverage: {{#each titles}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}. Format as JSON array.",
    ),
    ("weather", "Analyze this live NASA Mission Control Feed: {{feed}}."),
];

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt rendering failed: {0}")]
    Template(#[from] TEngineError),
    #[error("Course {course} has no module at index {index}")]
    UnknownModule { course: String, index: usize },
}

/// Renders prompts into ready-to-send [`GenerateRequest`]s.
pub struct PromptCatalog {
    engine: TEngine,
    model: String,
}

impl PromptCatalog {
    pub fn new() -> Result<Self, PromptError> {
        let mut engine = TEngine::new();
        for (name, template) in TEMPLATES {
            engine.register_template_string(name, template)?;
        }
        Ok(Self {
            engine,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(
        &self,
        template: &str,
        data: serde_json::Value,
    ) -> Result<GenerateRequest, PromptError> {
        let prompt = self.engine.render(template, &data)?;
        Ok(GenerateRequest::new(self.model.as_str(), prompt))
    }

    /// A chat turn for the navigator persona.
    pub fn chat(&self, message: &str) -> GenerateRequest {
        GenerateRequest::new(self.model.as_str(), message)
            .with_system_instruction(SYSTEM_INSTRUCTION)
            .with_temperature(CHAT_TEMPERATURE)
    }

    /// Five multiple-choice questions, on `topic` or on astronomy in general.
    pub fn quiz(&self, topic: Option<&str>) -> Result<GenerateRequest, PromptError> {
        let request = match topic {
            Some(topic) => self.request("quiz_topic", json!({ "topic": topic }))?,
            None => self.request("quiz_general", json!({}))?,
        };
        Ok(request.with_json_schema(schema::quiz_questions()))
    }

    /// A learning module grounded with Google Search results.
    pub fn research(&self, query: &str) -> Result<GenerateRequest, PromptError> {
        Ok(self
            .request("research", json!({ "query": query }))?
            .with_tool(Tool::GoogleSearch)
            .with_json_schema(schema::research_module()))
    }

    pub fn mission_analysis(&self, name: &str, year: &str) -> Result<GenerateRequest, PromptError> {
        Ok(self
            .request("mission", json!({ "name": name, "year": year }))?
            .with_json_schema(schema::mission_analysis()))
    }

    pub fn module_briefing(
        &self,
        course: &Course,
        index: usize,
    ) -> Result<GenerateRequest, PromptError> {
        let module = course.module(index).ok_or_else(|| PromptError::UnknownModule {
            course: course.name.to_string(),
            index,
        })?;
        Ok(self
            .request("briefing", json!({ "course": course.name, "module": module }))?
            .with_json_schema(schema::module_briefing()))
    }

    pub fn certification_exam(&self, course: &Course) -> Result<GenerateRequest, PromptError> {
        let data = json!({ "course": course.name, "titles": course.module_titles() });
        Ok(self
            .request("exam", data)?
            .with_json_schema(schema::quiz_questions()))
    }

    /// Analysis of the most recent entries of a space-weather notification
    /// feed, newest first.
    pub fn space_weather_analysis<S: AsRef<str>>(
        &self,
        feed: &[S],
    ) -> Result<GenerateRequest, PromptError> {
        let recent = feed
            .iter()
            .take(WEATHER_FEED_ENTRIES)
            .map(|entry| entry.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");
        Ok(self
            .request("weather", json!({ "feed": recent }))?
            .with_json_schema(schema::space_weather_analysis()))
    }
}
