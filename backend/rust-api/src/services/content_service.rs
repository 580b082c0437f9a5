use rand::seq::SliceRandom;

use crate::models::content::{
    self, GameImage, GameTopic, Prompt, PromptCategory, BEAT_PATTERNS, KARAOKE_LINES, PROMPTS,
};
use crate::models::games::{
    KaraokeLine, KaraokeWord, MatchingRound, MemoryCard, MemoryCardKind, QuizChoice, QuizQuestion,
    WordChallenge,
};

/// Unbiased Fisher-Yates shuffle; every permutation equally likely.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::rng());
}

pub fn prompts_by_category(category: PromptCategory) -> Vec<&'static Prompt> {
    PROMPTS.iter().filter(|p| p.category == category).collect()
}

pub fn prompt_by_id(id: &str) -> Option<&'static Prompt> {
    PROMPTS.iter().find(|p| p.id == id)
}

/// Draw `count` prompts at or below `difficulty`, shuffled. Returns the
/// whole eligible pool when `count` exceeds it.
pub fn session_prompts(difficulty: u8, count: usize, exclude_ids: &[String]) -> Vec<Prompt> {
    let mut pool: Vec<Prompt> = PROMPTS
        .iter()
        .filter(|p| p.difficulty <= difficulty)
        .filter(|p| !exclude_ids.iter().any(|id| id == p.id))
        .cloned()
        .collect();
    shuffle(&mut pool);
    pool.truncate(count);
    pool
}

/// One correct item plus three distinct wrong items from the rest of the
/// pool, shuffled together so the correct position is uniformly random.
pub fn quiz_questions(topic: GameTopic, count: usize) -> Vec<QuizQuestion> {
    let mut pool: Vec<GameImage> = content::content_by_topic(topic).to_vec();
    shuffle(&mut pool);

    let mut questions = Vec::new();
    for (i, correct) in pool.iter().take(count.min(pool.len())).enumerate() {
        let mut wrong: Vec<GameImage> =
            pool.iter().filter(|item| item.id != correct.id).cloned().collect();
        shuffle(&mut wrong);

        let mut choices: Vec<QuizChoice> = vec![QuizChoice {
            id: correct.id.to_string(),
            emoji: correct.emoji.to_string(),
            label: correct.label.to_string(),
            is_correct: true,
        }];
        choices.extend(wrong.into_iter().take(3).map(|item| QuizChoice {
            id: item.id.to_string(),
            emoji: item.emoji.to_string(),
            label: item.label.to_string(),
            is_correct: false,
        }));
        shuffle(&mut choices);

        questions.push(QuizQuestion {
            id: format!("quiz-{:?}-{}", topic, i).to_lowercase(),
            question_text: quiz_question_text(topic, correct.label),
            choices,
        });
    }
    questions
}

fn quiz_question_text(topic: GameTopic, label: &str) -> String {
    match topic {
        GameTopic::Emotions => format!("Which face shows \"{}\"?", label),
        GameTopic::Greetings => format!("Which one means \"{}\"?", label),
        GameTopic::Colors => format!("Which one is {}?", label),
        GameTopic::Animals => format!("Which one is a {}?", label),
        GameTopic::Numbers => format!("Which one shows {}?", label),
        GameTopic::Objects => format!("Which one is a {}?", label),
    }
}

/// A word card and an emoji card per pair, all shuffled together.
pub fn memory_cards(topic: GameTopic, pair_count: usize) -> Vec<MemoryCard> {
    let mut pool: Vec<GameImage> = content::content_by_topic(topic).to_vec();
    shuffle(&mut pool);

    let mut cards = Vec::new();
    for item in pool.iter().take(pair_count.min(pool.len())) {
        cards.push(MemoryCard {
            id: format!("word-{}", item.id),
            pair_id: item.id.to_string(),
            kind: MemoryCardKind::Word,
            content: item.label.to_string(),
            label: item.label.to_string(),
        });
        cards.push(MemoryCard {
            id: format!("emoji-{}", item.id),
            pair_id: item.id.to_string(),
            kind: MemoryCardKind::Emoji,
            content: item.emoji.to_string(),
            label: item.label.to_string(),
        });
    }
    shuffle(&mut cards);
    cards
}

pub fn matching_rounds(topic: GameTopic, rounds: usize, items_per_round: usize) -> Vec<MatchingRound> {
    (0..rounds)
        .map(|_| {
            let mut pool: Vec<GameImage> = content::content_by_topic(topic).to_vec();
            shuffle(&mut pool);
            pool.truncate(items_per_round);

            let mut shuffled = pool.clone();
            shuffle(&mut shuffled);

            MatchingRound { items: pool, shuffled }
        })
        .collect()
}

pub fn echo_phrases(topic: GameTopic, rounds: usize) -> Vec<String> {
    let mut pool: Vec<String> =
        content::echo_phrases_for(topic).iter().map(|p| p.to_string()).collect();
    shuffle(&mut pool);
    pool.truncate(rounds);
    pool
}

pub fn karaoke_lines(rounds: usize) -> Vec<KaraokeLine> {
    let mut pool: Vec<&str> = KARAOKE_LINES.to_vec();
    shuffle(&mut pool);

    pool.iter()
        .take(rounds.min(pool.len()))
        .enumerate()
        .map(|(line_idx, line)| KaraokeLine {
            words: line
                .split_whitespace()
                .enumerate()
                .map(|(word_idx, word)| KaraokeWord {
                    id: format!("l{}-w{}", line_idx, word_idx),
                    text: word.to_string(),
                    beat_index: word_idx as u32,
                })
                .collect(),
        })
        .collect()
}

/// Topic labels of at least three letters, scrambled into letter tiles.
pub fn word_challenges(topic: GameTopic, rounds: usize) -> Vec<WordChallenge> {
    let mut pool: Vec<GameImage> = content::content_by_topic(topic)
        .iter()
        .filter(|item| item.label.len() >= 3)
        .cloned()
        .collect();
    shuffle(&mut pool);

    pool.iter()
        .take(rounds.min(pool.len()))
        .map(|item| {
            let word = item.label.to_uppercase();
            let mut letters: Vec<String> = word.chars().map(|c| c.to_string()).collect();
            shuffle(&mut letters);
            WordChallenge { word, letters }
        })
        .collect()
}

pub fn beat_patterns(rounds: usize) -> Vec<Vec<bool>> {
    let mut pool: Vec<Vec<bool>> = BEAT_PATTERNS.iter().map(|p| p.to_vec()).collect();
    shuffle(&mut pool);
    pool.truncate(rounds);
    pool
}
