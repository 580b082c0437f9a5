use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::content::{GameImage, GameTopic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Quiz,
    Matching,
    Memory,
    Echo,
    Karaoke,
    WordBuilder,
    BeatMaker,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Quiz => "quiz",
            GameKind::Matching => "matching",
            GameKind::Memory => "memory",
            GameKind::Echo => "echo",
            GameKind::Karaoke => "karaoke",
            GameKind::WordBuilder => "wordbuilder",
            GameKind::BeatMaker => "beatmaker",
        }
    }
}

impl FromStr for GameKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(GameKind::Quiz),
            "matching" => Ok(GameKind::Matching),
            "memory" => Ok(GameKind::Memory),
            "echo" => Ok(GameKind::Echo),
            "karaoke" => Ok(GameKind::Karaoke),
            "wordbuilder" => Ok(GameKind::WordBuilder),
            "beatmaker" => Ok(GameKind::BeatMaker),
            _ => Err(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found")]
    NotFound,
    #[error("Game is already complete")]
    AlreadyComplete,
    #[error("{0}")]
    InvalidAction(String),
}

/// Reported to the gamification engine when a game finishes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub kind: GameKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<GameTopic>,
    pub final_score: i64,
    pub is_perfect: bool,
    pub rounds: u32,
}

// ============ Quiz ============

pub const QUIZ_ROUNDS: usize = 5;
pub const QUIZ_POINTS_PER_CORRECT: i64 = 10;
pub const QUIZ_PERFECT_BONUS: i64 = 15;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizChoice {
    pub id: String,
    pub emoji: String,
    pub label: String,
    /// Never serialized: the client must not see the answer ahead of play.
    #[serde(skip_serializing)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question_text: String,
    pub choices: Vec<QuizChoice>,
}

#[derive(Debug)]
pub struct QuizEngine {
    questions: Vec<QuizQuestion>,
    round: usize,
    score: i64,
    correct_count: usize,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub correct: bool,
    pub points: i64,
    pub correct_choice_id: String,
}

impl QuizEngine {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions, round: 0, score: 0, correct_count: 0, complete: false }
    }

    pub fn answer(&mut self, choice_id: &str) -> Result<QuizOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let question = &self.questions[self.round];
        let choice = question
            .choices
            .iter()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| GameError::InvalidAction(format!("Unknown choice '{}'", choice_id)))?;
        let correct_choice_id = question
            .choices
            .iter()
            .find(|c| c.is_correct)
            .map(|c| c.id.clone())
            .unwrap_or_default();

        let correct = choice.is_correct;
        let points = if correct { QUIZ_POINTS_PER_CORRECT } else { 0 };
        if correct {
            self.correct_count += 1;
        }
        self.score += points;

        self.round += 1;
        if self.round >= self.questions.len() {
            if self.correct_count == self.questions.len() {
                self.score += QUIZ_PERFECT_BONUS;
            }
            self.complete = true;
        }

        Ok(QuizOutcome { correct, points, correct_choice_id })
    }

    fn is_perfect(&self) -> bool {
        self.correct_count == self.questions.len()
    }
}

// ============ Matching ============

pub const MATCHING_ROUNDS: usize = 3;
pub const MATCHING_ITEMS: usize = 4;
pub const MATCHING_POINTS_PER_PAIR: i64 = 10;
pub const MATCHING_COMPLETION_BONUS: i64 = 15;

#[derive(Debug)]
pub struct MatchingRound {
    pub items: Vec<GameImage>,
    pub shuffled: Vec<GameImage>,
}

#[derive(Debug)]
pub struct MatchingEngine {
    rounds: Vec<MatchingRound>,
    round: usize,
    matched: HashSet<String>,
    mistakes: u32,
    score: i64,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub correct: bool,
    pub points: i64,
    pub round_complete: bool,
}

impl MatchingEngine {
    pub fn new(rounds: Vec<MatchingRound>) -> Self {
        Self { rounds, round: 0, matched: HashSet::new(), mistakes: 0, score: 0, complete: false }
    }

    pub fn try_match(&mut self, word_id: &str, emoji_id: &str) -> Result<MatchOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let current = &self.rounds[self.round];
        if !current.items.iter().any(|i| i.id == word_id) {
            return Err(GameError::InvalidAction(format!("Unknown item '{}'", word_id)));
        }
        if self.matched.contains(word_id) {
            return Err(GameError::InvalidAction(format!("'{}' is already matched", word_id)));
        }

        let correct = word_id == emoji_id;
        let mut points = 0;
        let mut round_complete = false;

        if correct {
            points = MATCHING_POINTS_PER_PAIR;
            self.score += points;
            self.matched.insert(word_id.to_string());

            if self.matched.len() == current.items.len() {
                round_complete = true;
                self.round += 1;
                self.matched.clear();
                if self.round >= self.rounds.len() {
                    self.score += MATCHING_COMPLETION_BONUS;
                    self.complete = true;
                }
            }
        } else {
            self.mistakes += 1;
        }

        Ok(MatchOutcome { correct, points, round_complete })
    }

    fn is_perfect(&self) -> bool {
        self.mistakes == 0
    }
}

// ============ Memory ============

pub const MEMORY_PAIRS: usize = 6;
pub const MEMORY_POINTS_PER_PAIR: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCardKind {
    Word,
    Emoji,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCard {
    pub id: String,
    pub pair_id: String,
    pub kind: MemoryCardKind,
    pub content: String,
    pub label: String,
}

#[derive(Debug)]
pub struct MemoryEngine {
    cards: Vec<MemoryCard>,
    pairs: usize,
    first_flipped: Option<MemoryCard>,
    matched: HashSet<String>,
    moves: u32,
    score: i64,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipOutcome {
    pub card: MemoryCard,
    /// `None` while waiting for the second card of the move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_bonus: Option<i64>,
    pub moves: u32,
}

impl MemoryEngine {
    pub fn new(cards: Vec<MemoryCard>, pairs: usize) -> Self {
        Self {
            cards,
            pairs,
            first_flipped: None,
            matched: HashSet::new(),
            moves: 0,
            score: 0,
            complete: false,
        }
    }

    /// Bonus for finishing at or near the minimum number of moves.
    pub fn move_bonus(moves: u32, pairs: u32) -> i64 {
        (30 - (moves as i64 - pairs as i64) * 2).max(0)
    }

    pub fn flip(&mut self, card_id: &str) -> Result<FlipOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let card = self
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or_else(|| GameError::InvalidAction(format!("Unknown card '{}'", card_id)))?;
        if self.matched.contains(&card.pair_id) {
            return Err(GameError::InvalidAction("Card is already matched".to_string()));
        }
        if self.first_flipped.as_ref().map(|c| c.id.as_str()) == Some(card_id) {
            return Err(GameError::InvalidAction("Card is already face up".to_string()));
        }

        let Some(first) = self.first_flipped.take() else {
            self.first_flipped = Some(card.clone());
            return Ok(FlipOutcome {
                card,
                matched: None,
                points: None,
                move_bonus: None,
                moves: self.moves,
            });
        };

        self.moves += 1;
        if first.pair_id == card.pair_id {
            self.matched.insert(card.pair_id.clone());
            self.score += MEMORY_POINTS_PER_PAIR;

            let mut bonus = None;
            if self.matched.len() == self.pairs {
                let extra = Self::move_bonus(self.moves, self.pairs as u32);
                self.score += extra;
                bonus = Some(extra);
                self.complete = true;
            }

            Ok(FlipOutcome {
                card,
                matched: Some(true),
                points: Some(MEMORY_POINTS_PER_PAIR),
                move_bonus: bonus,
                moves: self.moves,
            })
        } else {
            // Both cards flip back.
            Ok(FlipOutcome {
                card,
                matched: Some(false),
                points: Some(0),
                move_bonus: None,
                moves: self.moves,
            })
        }
    }

    fn is_perfect(&self) -> bool {
        self.moves as usize == self.pairs
    }
}

// ============ Echo ============

pub const ECHO_ROUNDS: usize = 4;
pub const ECHO_PERFECT_POINTS: i64 = 15;
pub const ECHO_GOOD_POINTS: i64 = 8;
pub const ECHO_PARTICIPATION_POINTS: i64 = 3;
pub const ECHO_PERFECT_GAME_BONUS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EchoResult {
    Perfect,
    Good,
    TryAgain,
}

#[derive(Debug)]
pub struct EchoEngine {
    phrases: Vec<String>,
    round: usize,
    score: i64,
    perfect_count: usize,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoOutcome {
    pub result: EchoResult,
    pub points: i64,
    pub match_ratio: f64,
}

fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

impl EchoEngine {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases, round: 0, score: 0, perfect_count: 0, complete: false }
    }

    pub fn submit(&mut self, transcript: &str) -> Result<EchoOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }

        let expected = normalize_words(&self.phrases[self.round]);
        let actual: HashSet<String> = normalize_words(transcript).into_iter().collect();
        let matched = expected.iter().filter(|w| actual.contains(*w)).count();
        let ratio = matched as f64 / expected.len() as f64;

        let (result, points) = if ratio >= 0.9 {
            self.perfect_count += 1;
            (EchoResult::Perfect, ECHO_PERFECT_POINTS)
        } else if ratio >= 0.5 {
            (EchoResult::Good, ECHO_GOOD_POINTS)
        } else {
            (EchoResult::TryAgain, ECHO_PARTICIPATION_POINTS)
        };
        self.score += points;

        self.round += 1;
        if self.round >= self.phrases.len() {
            if self.perfect_count == self.phrases.len() {
                self.score += ECHO_PERFECT_GAME_BONUS;
            }
            self.complete = true;
        }

        Ok(EchoOutcome { result, points, match_ratio: ratio })
    }

    fn is_perfect(&self) -> bool {
        self.perfect_count == self.phrases.len()
    }
}

// ============ Karaoke ============

pub const KARAOKE_ROUNDS: usize = 4;
pub const KARAOKE_PERFECT_POINTS: i64 = 15;
pub const KARAOKE_GOOD_POINTS: i64 = 8;
pub const KARAOKE_PERFECT_GAME_BONUS: i64 = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KaraokeWord {
    pub id: String,
    pub text: String,
    pub beat_index: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KaraokeLine {
    pub words: Vec<KaraokeWord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TapResult {
    Perfect,
    Good,
    Miss,
}

#[derive(Debug)]
pub struct KaraokeEngine {
    lines: Vec<KaraokeLine>,
    round: usize,
    score: i64,
    perfect_hits: usize,
    total_words: usize,
    tapped: HashSet<String>,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapOutcome {
    pub result: TapResult,
    pub points: i64,
    pub line_complete: bool,
}

impl KaraokeEngine {
    pub fn new(lines: Vec<KaraokeLine>) -> Self {
        let total_words = lines.iter().map(|l| l.words.len()).sum();
        Self {
            lines,
            round: 0,
            score: 0,
            perfect_hits: 0,
            total_words,
            tapped: HashSet::new(),
            complete: false,
        }
    }

    pub fn tap(&mut self, word_id: &str, beat_index: u32) -> Result<TapOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let line = &self.lines[self.round];
        let word = line
            .words
            .iter()
            .find(|w| w.id == word_id)
            .ok_or_else(|| GameError::InvalidAction(format!("Unknown word '{}'", word_id)))?;
        if self.tapped.contains(word_id) {
            return Err(GameError::InvalidAction("Word already tapped".to_string()));
        }
        self.tapped.insert(word_id.to_string());

        let diff = beat_index.abs_diff(word.beat_index);
        let (result, points) = match diff {
            0 => {
                self.perfect_hits += 1;
                (TapResult::Perfect, KARAOKE_PERFECT_POINTS)
            }
            1 => (TapResult::Good, KARAOKE_GOOD_POINTS),
            _ => (TapResult::Miss, 0),
        };
        self.score += points;

        let line_complete = self.tapped.len() == line.words.len();
        if line_complete {
            self.end_round();
        }

        Ok(TapOutcome { result, points, line_complete })
    }

    /// Ends the current line; words never tapped count as misses.
    pub fn advance(&mut self) -> Result<(), GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        self.end_round();
        Ok(())
    }

    fn end_round(&mut self) {
        self.tapped.clear();
        self.round += 1;
        if self.round >= self.lines.len() {
            if self.perfect_hits == self.total_words {
                self.score += KARAOKE_PERFECT_GAME_BONUS;
            }
            self.complete = true;
        }
    }

    fn is_perfect(&self) -> bool {
        self.perfect_hits == self.total_words
    }
}

// ============ Word builder ============

pub const WORD_BUILDER_ROUNDS: usize = 4;
pub const WORD_BUILDER_POINTS: i64 = 15;
pub const WORD_BUILDER_PERFECT_BONUS: i64 = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordChallenge {
    /// Never serialized; the child reassembles it from the letters.
    #[serde(skip_serializing)]
    pub word: String,
    pub letters: Vec<String>,
}

#[derive(Debug)]
pub struct WordBuilderEngine {
    challenges: Vec<WordChallenge>,
    round: usize,
    score: i64,
    wrong_submissions: u32,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOutcome {
    pub correct: bool,
    pub points: i64,
}

impl WordBuilderEngine {
    pub fn new(challenges: Vec<WordChallenge>) -> Self {
        Self { challenges, round: 0, score: 0, wrong_submissions: 0, complete: false }
    }

    pub fn submit_word(&mut self, word: &str) -> Result<WordOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let target = &self.challenges[self.round].word;
        let correct = word.trim().eq_ignore_ascii_case(target);

        if !correct {
            self.wrong_submissions += 1;
            return Ok(WordOutcome { correct: false, points: 0 });
        }

        self.score += WORD_BUILDER_POINTS;
        self.round += 1;
        if self.round >= self.challenges.len() {
            if self.wrong_submissions == 0 {
                self.score += WORD_BUILDER_PERFECT_BONUS;
            }
            self.complete = true;
        }

        Ok(WordOutcome { correct: true, points: WORD_BUILDER_POINTS })
    }

    fn is_perfect(&self) -> bool {
        self.wrong_submissions == 0
    }
}

// ============ Beat maker ============

pub const BEAT_MAKER_ROUNDS: usize = 4;
pub const BEAT_PERFECT_POINTS: i64 = 20;
pub const BEAT_GOOD_POINTS: i64 = 10;
pub const BEAT_PARTICIPATION_POINTS: i64 = 5;
pub const BEAT_ALL_PERFECT_BONUS: i64 = 25;

#[derive(Debug)]
pub struct BeatMakerEngine {
    patterns: Vec<Vec<bool>>,
    round: usize,
    score: i64,
    perfect_rounds: usize,
    complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatOutcome {
    pub accuracy: f64,
    pub points: i64,
    pub perfect: bool,
}

impl BeatMakerEngine {
    pub fn new(patterns: Vec<Vec<bool>>) -> Self {
        Self { patterns, round: 0, score: 0, perfect_rounds: 0, complete: false }
    }

    pub fn submit_pattern(&mut self, tapped: &[bool]) -> Result<BeatOutcome, GameError> {
        if self.complete {
            return Err(GameError::AlreadyComplete);
        }
        let target = &self.patterns[self.round];
        let matches = target
            .iter()
            .enumerate()
            .filter(|(i, beat)| tapped.get(*i).copied().unwrap_or(false) == **beat)
            .count();
        let accuracy = matches as f64 / target.len() as f64;
        let perfect = accuracy >= 1.0;

        let points = if perfect {
            self.perfect_rounds += 1;
            BEAT_PERFECT_POINTS
        } else if accuracy >= 0.75 {
            BEAT_GOOD_POINTS
        } else {
            BEAT_PARTICIPATION_POINTS
        };
        self.score += points;

        self.round += 1;
        if self.round >= self.patterns.len() {
            if self.perfect_rounds == self.patterns.len() {
                self.score += BEAT_ALL_PERFECT_BONUS;
            }
            self.complete = true;
        }

        Ok(BeatOutcome { accuracy, points, perfect })
    }

    fn is_perfect(&self) -> bool {
        self.perfect_rounds == self.patterns.len()
    }
}

// ============ Engine wrapper ============

#[derive(Debug)]
pub enum GameEngine {
    Quiz(QuizEngine),
    Matching(MatchingEngine),
    Memory(MemoryEngine),
    Echo(EchoEngine),
    Karaoke(KaraokeEngine),
    WordBuilder(WordBuilderEngine),
    BeatMaker(BeatMakerEngine),
}

impl GameEngine {
    pub fn kind(&self) -> GameKind {
        match self {
            GameEngine::Quiz(_) => GameKind::Quiz,
            GameEngine::Matching(_) => GameKind::Matching,
            GameEngine::Memory(_) => GameKind::Memory,
            GameEngine::Echo(_) => GameKind::Echo,
            GameEngine::Karaoke(_) => GameKind::Karaoke,
            GameEngine::WordBuilder(_) => GameKind::WordBuilder,
            GameEngine::BeatMaker(_) => GameKind::BeatMaker,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            GameEngine::Quiz(e) => e.complete,
            GameEngine::Matching(e) => e.complete,
            GameEngine::Memory(e) => e.complete,
            GameEngine::Echo(e) => e.complete,
            GameEngine::Karaoke(e) => e.complete,
            GameEngine::WordBuilder(e) => e.complete,
            GameEngine::BeatMaker(e) => e.complete,
        }
    }

    pub fn score(&self) -> i64 {
        match self {
            GameEngine::Quiz(e) => e.score,
            GameEngine::Matching(e) => e.score,
            GameEngine::Memory(e) => e.score,
            GameEngine::Echo(e) => e.score,
            GameEngine::Karaoke(e) => e.score,
            GameEngine::WordBuilder(e) => e.score,
            GameEngine::BeatMaker(e) => e.score,
        }
    }

    pub fn is_perfect(&self) -> bool {
        match self {
            GameEngine::Quiz(e) => e.is_perfect(),
            GameEngine::Matching(e) => e.is_perfect(),
            GameEngine::Memory(e) => e.is_perfect(),
            GameEngine::Echo(e) => e.is_perfect(),
            GameEngine::Karaoke(e) => e.is_perfect(),
            GameEngine::WordBuilder(e) => e.is_perfect(),
            GameEngine::BeatMaker(e) => e.is_perfect(),
        }
    }

    pub fn round(&self) -> usize {
        match self {
            GameEngine::Quiz(e) => e.round,
            GameEngine::Matching(e) => e.round,
            GameEngine::Memory(e) => e.matched.len(),
            GameEngine::Echo(e) => e.round,
            GameEngine::Karaoke(e) => e.round,
            GameEngine::WordBuilder(e) => e.round,
            GameEngine::BeatMaker(e) => e.round,
        }
    }

    pub fn total_rounds(&self) -> usize {
        match self {
            GameEngine::Quiz(e) => e.questions.len(),
            GameEngine::Matching(e) => e.rounds.len(),
            GameEngine::Memory(e) => e.pairs,
            GameEngine::Echo(e) => e.phrases.len(),
            GameEngine::Karaoke(e) => e.lines.len(),
            GameEngine::WordBuilder(e) => e.challenges.len(),
            GameEngine::BeatMaker(e) => e.patterns.len(),
        }
    }

    /// Client-visible board for the current round. Answers stay hidden:
    /// quiz correctness and word-builder targets are not exposed, memory
    /// cards only reveal matched pairs.
    pub fn board(&self) -> serde_json::Value {
        match self {
            GameEngine::Quiz(e) => {
                if e.complete {
                    json!(null)
                } else {
                    json!(e.questions[e.round])
                }
            }
            GameEngine::Matching(e) => {
                if e.complete {
                    json!(null)
                } else {
                    let current = &e.rounds[e.round];
                    json!({
                        "items": current.items,
                        "shuffled": current.shuffled,
                        "matched": e.matched,
                        "mistakes": e.mistakes,
                    })
                }
            }
            GameEngine::Memory(e) => {
                let cards: Vec<serde_json::Value> = e
                    .cards
                    .iter()
                    .map(|c| {
                        let matched = e.matched.contains(&c.pair_id);
                        let face_up = matched
                            || e.first_flipped.as_ref().map(|f| f.id.as_str())
                                == Some(c.id.as_str());
                        if face_up {
                            json!({
                                "id": c.id,
                                "faceUp": true,
                                "matched": matched,
                                "kind": c.kind,
                                "content": c.content,
                                "label": c.label,
                            })
                        } else {
                            json!({ "id": c.id, "faceUp": false, "matched": false })
                        }
                    })
                    .collect();
                json!({ "cards": cards, "moves": e.moves, "pairsFound": e.matched.len() })
            }
            GameEngine::Echo(e) => {
                if e.complete {
                    json!(null)
                } else {
                    json!({ "phrase": e.phrases[e.round] })
                }
            }
            GameEngine::Karaoke(e) => {
                if e.complete {
                    json!(null)
                } else {
                    json!({ "line": e.lines[e.round], "tapped": e.tapped })
                }
            }
            GameEngine::WordBuilder(e) => {
                if e.complete {
                    json!(null)
                } else {
                    json!({
                        "letters": e.challenges[e.round].letters,
                        "wordLength": e.challenges[e.round].word.len(),
                    })
                }
            }
            GameEngine::BeatMaker(e) => {
                if e.complete {
                    json!(null)
                } else {
                    json!({ "pattern": e.patterns[e.round], "beats": e.patterns[e.round].len() })
                }
            }
        }
    }
}
