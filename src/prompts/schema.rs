//! Response schemas, in the OpenAPI subset the Gemini API accepts.

use serde_json::{Map, Value, json};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

fn pairs(key: &str, value: &str) -> Value {
    let mut properties = Map::new();
    properties.insert(key.to_owned(), string());
    properties.insert(value.to_owned(), string());
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": [key, value]
        }
    })
}

/// Multiple-choice questions with four options each.
pub fn quiz_questions() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": string(),
                "options": { "type": "ARRAY", "items": string(), "minItems": 4, "maxItems": 4 },
                "answer": {
                    "type": "INTEGER",
                    "description": "The 0-based index of the correct option"
                }
            },
            "required": ["question", "options", "answer"]
        }
    })
}

pub fn research_module() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": string(),
            "summary": string(),
            "keyTakeaways": string_array(),
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "heading": string(), "body": string() },
                    "required": ["heading", "body"]
                }
            },
            "technicalSpecs": pairs("label", "value")
        },
        "required": ["title", "summary", "keyTakeaways", "sections"]
    })
}

pub fn mission_analysis() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": string(),
            "scientificBreakthroughs": string_array(),
            "technicalChallenges": pairs("title", "description"),
            "legacyImpact": string(),
            "telemetrySim": pairs("sensor", "value")
        },
        "required": [
            "title",
            "scientificBreakthroughs",
            "technicalChallenges",
            "legacyImpact",
            "telemetrySim"
        ]
    })
}

pub fn module_briefing() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "moduleTitle": string(),
            "briefing": string(),
            "technicalSpecs": pairs("label", "value"),
            "keyConcepts": string_array(),
            "simulationData": string()
        },
        "required": ["moduleTitle", "briefing", "technicalSpecs", "keyConcepts", "simulationData"]
    })
}

pub fn space_weather_analysis() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "hazardLevel": string(),
            "summary": string(),
            "impacts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "system": string(),
                        "severity": string(),
                        "advice": string()
                    },
                    "required": ["system", "severity", "advice"]
                }
            },
            "auroraPrediction": string(),
            "technicalTelemetry": string()
        },
        "required": [
            "hazardLevel",
            "summary",
            "impacts",
            "auroraPrediction",
            "technicalTelemetry"
        ]
    })
}
