//! Local content that does not come from the model: the offline quiz shown
//! when generation fails, and the premium course catalogue.

use crate::llm::request::GenerateResponse;
use serde::Serialize;
use tracing::warn;

use super::outputs::QuizQuestion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseModule {
    pub id: &'static str,
    pub title: &'static str,
    pub context: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: &'static str,
    pub name: &'static str,
    pub level: &'static str,
    pub modules: &'static [CourseModule],
}

impl Course {
    pub fn module(&self, index: usize) -> Option<&CourseModule> {
        self.modules.get(index)
    }

    pub fn module_titles(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.title).collect()
    }
}

pub const COURSES: &[Course] = &[
    Course {
        id: "c1",
        name: "Orbital Mechanics Specialist",
        level: "Advanced",
        modules: &[
            CourseModule {
                id: "m1-1",
                title: "Gravitational Slingshots",
                context: "Using planetary mass for acceleration.",
            },
            CourseModule {
                id: "m1-2",
                title: "L-Point Stability",
                context: "Lagrange point positioning for telescopes.",
            },
        ],
    },
    Course {
        id: "c2",
        name: "Solar Weather Analysis",
        level: "Expert",
        modules: &[
            CourseModule {
                id: "m2-1",
                title: "Photosphere Dynamics",
                context: "Understanding sunspots and solar cycles.",
            },
            CourseModule {
                id: "m2-2",
                title: "CME Impact Modeling",
                context: "Predicting geomagnetic storm severity.",
            },
        ],
    },
    Course {
        id: "c3",
        name: "Exoplanet Hunting",
        level: "Mastery",
        modules: &[
            CourseModule {
                id: "m3-1",
                title: "Transit Photometry",
                context: "Detecting dips in stellar luminosity.",
            },
            CourseModule {
                id: "m3-2",
                title: "Direct Imaging Tech",
                context: "Starshades and high-contrast imaging.",
            },
        ],
    },
];

pub fn find_course(id: &str) -> Option<&'static Course> {
    COURSES.iter().find(|c| c.id == id)
}

fn question(question: &str, options: [&str; 4], answer: usize) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer,
    }
}

/// The quiz served when the model cannot be reached.
pub fn fallback_quiz() -> Vec<QuizQuestion> {
    vec![
        question(
            "What is the largest planet in our solar system?",
            ["Mars", "Saturn", "Jupiter", "Neptune"],
            2,
        ),
        question(
            "Which galaxy is the nearest neighbor to our Milky Way?",
            ["Sombrero", "Andromeda", "Triangulum", "Whirlpool"],
            1,
        ),
        question(
            "What is the 'KP Index' used to measure?",
            ["Star Brightness", "Tidal Waves", "Geomagnetic Activity", "Lunar Cycles"],
            2,
        ),
        question(
            "Which mission was the first to land a human on the Moon?",
            ["Apollo 13", "Apollo 11", "Artemis I", "Voyager 1"],
            1,
        ),
        question(
            "What causes a Meteor Shower?",
            [
                "Sun Flares",
                "Space Trash",
                "Earth passing through comet debris",
                "Moonquakes",
            ],
            2,
        ),
    ]
}

/// Questions decoded from a quiz response, or the offline quiz when the
/// payload is unreadable or empty.
pub fn quiz_or_fallback(response: &GenerateResponse) -> Vec<QuizQuestion> {
    match response.parse_json_or::<Vec<QuizQuestion>>("[]") {
        Ok(questions) if !questions.is_empty() => questions,
        Ok(_) => {
            warn!("Quiz response was empty, loading localized quiz archive");
            fallback_quiz()
        }
        Err(e) => {
            warn!(error = %e, "Quiz response unreadable, loading localized quiz archive");
            fallback_quiz()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_quiz_is_kept() {
        let response = GenerateResponse::from_text(
            r#"[{"question": "Hottest planet?", "options": ["Mercury", "Venus", "Mars", "Earth"], "answer": 1}]"#,
        );
        let quiz = quiz_or_fallback(&response);
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].correct_option(), Some("Venus"));
    }

    #[test]
    fn empty_quiz_falls_back_to_archive() {
        assert_eq!(quiz_or_fallback(&GenerateResponse::from_text("[]")), fallback_quiz());
        assert_eq!(quiz_or_fallback(&GenerateResponse::default()), fallback_quiz());
    }

    #[test]
    fn unreadable_quiz_falls_back_to_archive() {
        let response = GenerateResponse::from_text("Sorry, the quiz generator is offline.");
        assert_eq!(quiz_or_fallback(&response), fallback_quiz());
    }

    #[test]
    fn fallback_answers_index_into_options() {
        let quiz = fallback_quiz();
        assert_eq!(quiz.len(), 5);
        for q in &quiz {
            assert!(q.correct_option().is_some(), "{}", q.question);
        }
        assert_eq!(quiz[3].correct_option(), Some("Apollo 11"));
    }

    #[test]
    fn courses_lookup_by_id() {
        let course = find_course("c2").unwrap();
        assert_eq!(course.name, "Solar Weather Analysis");
        assert_eq!(
            course.module_titles(),
            vec!["Photosphere Dynamics", "CME Impact Modeling"]
        );
        assert!(course.module(2).is_none());
        assert!(find_course("c9").is_none());
    }
}
