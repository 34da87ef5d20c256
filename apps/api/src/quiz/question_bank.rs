use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub text: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "question")]
    pub prompt: &'static str,
    pub emoji: &'static str,
    pub options: &'static [QuizOption],
}

impl Question {
    pub fn has_option(&self, text: &str) -> bool {
        self.options.iter().any(|o| o.text == text)
    }
}

const fn opt(text: &'static str, icon: &'static str) -> QuizOption {
    QuizOption { text, icon }
}

/// The fixed career quiz, in presentation order.
pub static QUESTION_BANK: &[Question] = &[
    Question {
        id: 1,
        prompt: "What interests you most in tech?",
        emoji: "🎯",
        options: &[
            opt("Building apps and websites", "💻"),
            opt("Analyzing data and finding patterns", "📊"),
            opt("Designing beautiful user experiences", "🎨"),
            opt("Solving complex algorithmic problems", "🧩"),
            opt("Managing teams and projects", "👥"),
        ],
    },
    Question {
        id: 2,
        prompt: "What's your ideal work style?",
        emoji: "💼",
        options: &[
            opt("Deep focus, independent work", "🎧"),
            opt("Collaborative team projects", "🤝"),
            opt("Mix of both collaboration and solo work", "⚖️"),
            opt("Client-facing, lots of communication", "🗣️"),
            opt("Remote and flexible schedule", "🌍"),
        ],
    },
    Question {
        id: 3,
        prompt: "Technical or Creative?",
        emoji: "🎭",
        options: &[
            opt("Very technical - love logic and systems", "⚙️"),
            opt("Very creative - love design and aesthetics", "🎨"),
            opt("Perfect balance of both", "🌈"),
            opt("Technical with creative problem-solving", "🔬"),
            opt("Creative with technical implementation", "✨"),
        ],
    },
    Question {
        id: 4,
        prompt: "Which subjects did you enjoy most?",
        emoji: "📚",
        options: &[
            opt("Math and Logic", "🔢"),
            opt("Art and Design", "🖼️"),
            opt("Science and Research", "🔬"),
            opt("Business and Communication", "💼"),
            opt("Technology and Engineering", "🛠️"),
        ],
    },
    Question {
        id: 5,
        prompt: "Current coding experience?",
        emoji: "👨‍💻",
        options: &[
            opt("Complete beginner", "🌱"),
            opt("Basic HTML/CSS", "📝"),
            opt("Some programming experience", "🚀"),
            opt("Comfortable with multiple languages", "💪"),
            opt("Advanced developer", "🏆"),
        ],
    },
    Question {
        id: 6,
        prompt: "What problems excite you?",
        emoji: "💡",
        options: &[
            opt("Making interfaces beautiful and intuitive", "✨"),
            opt("Optimizing performance and efficiency", "⚡"),
            opt("Understanding user needs and behavior", "🧠"),
            opt("Working with big data and patterns", "📈"),
            opt("Building scalable systems", "🏗️"),
        ],
    },
    Question {
        id: 7,
        prompt: "Dream work environment?",
        emoji: "🏢",
        options: &[
            opt("Startup - fast-paced, innovative", "🚀"),
            opt("Big Tech - structured, great resources", "🏛️"),
            opt("Freelance - independent, flexible", "🌴"),
            opt("Agency - variety of projects", "🎪"),
            opt("Non-profit - mission-driven", "❤️"),
        ],
    },
    Question {
        id: 8,
        prompt: "Which skill sounds most exciting?",
        emoji: "🎓",
        options: &[
            opt("Mastering programming languages", "💻"),
            opt("Design tools (Figma, Adobe XD)", "🎨"),
            opt("Data science and ML", "🤖"),
            opt("Cloud computing (AWS, Azure)", "☁️"),
            opt("Product management", "📱"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_bank_has_eight_questions() {
        assert_eq!(QUESTION_BANK.len(), 8);
    }

    #[test]
    fn test_question_ids_are_unique() {
        let ids: HashSet<u32> = QUESTION_BANK.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), QUESTION_BANK.len());
    }

    #[test]
    fn test_every_question_has_distinct_options() {
        for question in QUESTION_BANK {
            assert_eq!(question.options.len(), 5, "question {}", question.id);
            let labels: HashSet<&str> = question.options.iter().map(|o| o.text).collect();
            assert_eq!(labels.len(), question.options.len(), "question {}", question.id);
        }
    }

    #[test]
    fn test_has_option_is_exact_match() {
        let first = &QUESTION_BANK[0];
        assert!(first.has_option("Building apps and websites"));
        assert!(!first.has_option("building apps and websites"));
    }

    #[test]
    fn test_question_serializes_prompt_as_question() {
        let value = serde_json::to_value(QUESTION_BANK[0]).unwrap();
        assert_eq!(value["question"], "What interests you most in tech?");
        assert_eq!(value["options"][1]["text"], "Analyzing data and finding patterns");
    }
}
