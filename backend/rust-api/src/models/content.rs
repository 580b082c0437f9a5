use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Daily,
    Interests,
    Choice,
}

/// One entry in the static prompt bank. Difficulty is cumulative: a session
/// configured at difficulty `d` draws from every prompt with difficulty <= d.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: &'static str,
    pub category: PromptCategory,
    pub difficulty: u8,
    pub question_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<&'static str>,
}

pub const PROMPTS: &[Prompt] = &[
    // Daily reflection
    Prompt {
        id: "daily-1",
        category: PromptCategory::Daily,
        difficulty: 2,
        question_text: "What did you do today?",
        follow_up: Some("What was your favorite part?"),
    },
    Prompt {
        id: "daily-2",
        category: PromptCategory::Daily,
        difficulty: 2,
        question_text: "What did you eat for lunch?",
        follow_up: Some("Did you like it?"),
    },
    Prompt {
        id: "daily-3",
        category: PromptCategory::Daily,
        difficulty: 3,
        question_text: "What are you thinking about right now?",
        follow_up: None,
    },
    Prompt {
        id: "daily-4",
        category: PromptCategory::Daily,
        difficulty: 2,
        question_text: "What did you see today?",
        follow_up: Some("What color was it?"),
    },
    Prompt {
        id: "daily-5",
        category: PromptCategory::Daily,
        difficulty: 2,
        question_text: "How are you feeling?",
        follow_up: Some("What made you feel that way?"),
    },
    // Interests
    Prompt {
        id: "interest-1",
        category: PromptCategory::Interests,
        difficulty: 2,
        question_text: "What do you like to do on your iPad?",
        follow_up: Some("What app do you like most?"),
    },
    Prompt {
        id: "interest-2",
        category: PromptCategory::Interests,
        difficulty: 2,
        question_text: "What did you write in Notepad today?",
        follow_up: Some("Can you tell me more about it?"),
    },
    Prompt {
        id: "interest-3",
        category: PromptCategory::Interests,
        difficulty: 2,
        question_text: "What do you like about ChatGPT?",
        follow_up: Some("What do you like to ask it?"),
    },
    Prompt {
        id: "interest-4",
        category: PromptCategory::Interests,
        difficulty: 2,
        question_text: "What's your favorite app?",
        follow_up: Some("Why do you like it?"),
    },
    Prompt {
        id: "interest-5",
        category: PromptCategory::Interests,
        difficulty: 2,
        question_text: "What do you like to watch?",
        follow_up: Some("What is it about?"),
    },
    // Simple choices
    Prompt {
        id: "choice-1",
        category: PromptCategory::Choice,
        difficulty: 1,
        question_text: "What's your favorite color: red, blue, or green?",
        follow_up: None,
    },
    Prompt {
        id: "choice-2",
        category: PromptCategory::Choice,
        difficulty: 1,
        question_text: "Would you rather draw or write?",
        follow_up: None,
    },
    Prompt {
        id: "choice-3",
        category: PromptCategory::Choice,
        difficulty: 1,
        question_text: "Do you like morning or night better?",
        follow_up: None,
    },
    Prompt {
        id: "choice-4",
        category: PromptCategory::Choice,
        difficulty: 1,
        question_text: "True or false: You like pizza.",
        follow_up: None,
    },
    Prompt {
        id: "choice-5",
        category: PromptCategory::Choice,
        difficulty: 1,
        question_text: "Pick one: Cat, dog, or bird.",
        follow_up: None,
    },
];

// ============ Mini-game content ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameTopic {
    Emotions,
    Greetings,
    Colors,
    Animals,
    Numbers,
    Objects,
}

impl GameTopic {
    pub const ALL: [GameTopic; 6] = [
        GameTopic::Emotions,
        GameTopic::Greetings,
        GameTopic::Colors,
        GameTopic::Animals,
        GameTopic::Numbers,
        GameTopic::Objects,
    ];
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameImage {
    pub id: &'static str,
    pub emoji: &'static str,
    pub label: &'static str,
}

pub const EMOTIONS: &[GameImage] = &[
    GameImage { id: "happy", emoji: "\u{1F60A}", label: "Happy" },
    GameImage { id: "sad", emoji: "\u{1F622}", label: "Sad" },
    GameImage { id: "angry", emoji: "\u{1F620}", label: "Angry" },
    GameImage { id: "scared", emoji: "\u{1F628}", label: "Scared" },
    GameImage { id: "surprised", emoji: "\u{1F632}", label: "Surprised" },
    GameImage { id: "excited", emoji: "\u{1F929}", label: "Excited" },
    GameImage { id: "tired", emoji: "\u{1F634}", label: "Tired" },
    GameImage { id: "confused", emoji: "\u{1F615}", label: "Confused" },
];

pub const GREETINGS: &[GameImage] = &[
    GameImage { id: "wave", emoji: "\u{1F44B}", label: "Wave" },
    GameImage { id: "smile", emoji: "\u{1F603}", label: "Smile" },
    GameImage { id: "handshake", emoji: "\u{1F91D}", label: "Handshake" },
    GameImage { id: "hug", emoji: "\u{1F917}", label: "Hug" },
    GameImage { id: "hello", emoji: "\u{1F64B}", label: "Hello" },
    GameImage { id: "goodbye", emoji: "\u{1F44B}", label: "Goodbye" },
];

pub const COLORS: &[GameImage] = &[
    GameImage { id: "red", emoji: "\u{1F534}", label: "Red" },
    GameImage { id: "blue", emoji: "\u{1F535}", label: "Blue" },
    GameImage { id: "green", emoji: "\u{1F7E2}", label: "Green" },
    GameImage { id: "yellow", emoji: "\u{1F7E1}", label: "Yellow" },
    GameImage { id: "orange", emoji: "\u{1F7E0}", label: "Orange" },
    GameImage { id: "purple", emoji: "\u{1F7E3}", label: "Purple" },
    GameImage { id: "pink", emoji: "\u{1F497}", label: "Pink" },
    GameImage { id: "brown", emoji: "\u{1F7E4}", label: "Brown" },
];

pub const ANIMALS: &[GameImage] = &[
    GameImage { id: "cat", emoji: "\u{1F431}", label: "Cat" },
    GameImage { id: "dog", emoji: "\u{1F415}", label: "Dog" },
    GameImage { id: "bird", emoji: "\u{1F426}", label: "Bird" },
    GameImage { id: "fish", emoji: "\u{1F41F}", label: "Fish" },
    GameImage { id: "rabbit", emoji: "\u{1F430}", label: "Rabbit" },
    GameImage { id: "turtle", emoji: "\u{1F422}", label: "Turtle" },
    GameImage { id: "elephant", emoji: "\u{1F418}", label: "Elephant" },
    GameImage { id: "lion", emoji: "\u{1F981}", label: "Lion" },
];

pub const NUMBERS: &[GameImage] = &[
    GameImage { id: "one", emoji: "1\u{FE0F}\u{20E3}", label: "One" },
    GameImage { id: "two", emoji: "2\u{FE0F}\u{20E3}", label: "Two" },
    GameImage { id: "three", emoji: "3\u{FE0F}\u{20E3}", label: "Three" },
    GameImage { id: "four", emoji: "4\u{FE0F}\u{20E3}", label: "Four" },
    GameImage { id: "five", emoji: "5\u{FE0F}\u{20E3}", label: "Five" },
    GameImage { id: "six", emoji: "6\u{FE0F}\u{20E3}", label: "Six" },
    GameImage { id: "seven", emoji: "7\u{FE0F}\u{20E3}", label: "Seven" },
    GameImage { id: "eight", emoji: "8\u{FE0F}\u{20E3}", label: "Eight" },
];

pub const OBJECTS: &[GameImage] = &[
    GameImage { id: "apple", emoji: "\u{1F34E}", label: "Apple" },
    GameImage { id: "book", emoji: "\u{1F4DA}", label: "Book" },
    GameImage { id: "car", emoji: "\u{1F697}", label: "Car" },
    GameImage { id: "house", emoji: "\u{1F3E0}", label: "House" },
    GameImage { id: "ball", emoji: "\u{26BD}", label: "Ball" },
    GameImage { id: "phone", emoji: "\u{1F4F1}", label: "Phone" },
    GameImage { id: "star", emoji: "\u{2B50}", label: "Star" },
    GameImage { id: "heart", emoji: "\u{2764}\u{FE0F}", label: "Heart" },
];

pub fn content_by_topic(topic: GameTopic) -> &'static [GameImage] {
    match topic {
        GameTopic::Emotions => EMOTIONS,
        GameTopic::Greetings => GREETINGS,
        GameTopic::Colors => COLORS,
        GameTopic::Animals => ANIMALS,
        GameTopic::Numbers => NUMBERS,
        GameTopic::Objects => OBJECTS,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInfo {
    pub topic: GameTopic,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

pub fn topic_info(topic: GameTopic) -> TopicInfo {
    let (name, emoji, description) = match topic {
        GameTopic::Emotions => ("Emotions", "\u{1F60A}", "Learn about feelings"),
        GameTopic::Greetings => ("Greetings", "\u{1F44B}", "Ways to say hello"),
        GameTopic::Colors => ("Colors", "\u{1F308}", "Learn your colors"),
        GameTopic::Animals => ("Animals", "\u{1F43E}", "Fun with animals"),
        GameTopic::Numbers => ("Numbers", "\u{1F522}", "Count with me"),
        GameTopic::Objects => ("Objects", "\u{1F381}", "Everyday things"),
    };
    TopicInfo { topic, name, emoji, description }
}

/// Short sentences for the echo game, keyed by topic. Kept at an early
/// reading level so the child can repeat them comfortably.
pub fn echo_phrases_for(topic: GameTopic) -> &'static [&'static str] {
    match topic {
        GameTopic::Emotions => &[
            "I feel happy today",
            "The boy is sad",
            "She looks excited",
            "I am not scared",
            "He seems tired now",
        ],
        GameTopic::Greetings => &[
            "Hello my friend",
            "Nice to see you",
            "Good morning everyone",
            "Goodbye see you soon",
            "Wave and say hi",
        ],
        GameTopic::Colors => &[
            "The sky is blue",
            "I like the red car",
            "Green grass grows fast",
            "The sun is yellow",
            "My shirt is purple",
        ],
        GameTopic::Animals => &[
            "The cat is sleeping",
            "My dog likes to run",
            "A bird can fly high",
            "The fish swims slowly",
            "The lion is very big",
        ],
        GameTopic::Numbers => &[
            "I can count to ten",
            "Two plus two is four",
            "I have five fingers",
            "Three birds on a tree",
            "Seven days in a week",
        ],
        GameTopic::Objects => &[
            "The apple is sweet",
            "I read a good book",
            "The car goes fast",
            "My house is warm",
            "Kick the ball to me",
        ],
    }
}

/// Sing-along lines for the karaoke game; every word maps to one beat.
pub const KARAOKE_LINES: &[&str] = &[
    "Twinkle twinkle little star",
    "Row row row your boat",
    "The wheels on the bus",
    "Rain rain go away",
    "Head shoulders knees and toes",
    "If you are happy clap",
];

/// Eight-beat rhythm patterns for the beat maker game.
pub const BEAT_PATTERNS: &[&[bool]] = &[
    &[true, false, true, false, true, false, true, false],
    &[true, true, false, false, true, true, false, false],
    &[true, false, false, true, false, false, true, false],
    &[true, true, true, false, false, true, true, false],
    &[false, true, false, true, true, false, true, true],
    &[true, false, true, true, false, true, false, true],
];
