//! Heuristic answer scoring.
//!
//! The score is a crude quality proxy, not a calibrated metric. Runners take
//! any [`Scorer`], so the heuristic can be replaced without touching them.

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 100;

const BASE_SCORE: i32 = 50;
const SHORT_ANSWER_CHARS: usize = 50;
const LONG_ANSWER_CHARS: usize = 500;
const DETAILED_ANSWER_WORDS: usize = 100;
const HEDGING_PHRASES: [&str; 2] = ["sorry", "not sure"];

/// Maps an answer to an integer score in `[MIN_SCORE, MAX_SCORE]`
pub trait Scorer: Send + Sync {
    fn score(&self, answer: &str, question_id: u32) -> u8;
}

impl<F> Scorer for F
where
    F: Fn(&str, u32) -> u8 + Send + Sync,
{
    fn score(&self, answer: &str, question_id: u32) -> u8 {
        self(answer, question_id)
    }
}

/// Question-specific keyword that earns a bonus when present
#[derive(Debug, Clone)]
pub struct KeywordBonus {
    pub question_id: u32,
    pub keyword: &'static str,
    pub points: i32,
}

/// Length, hedging and keyword heuristics
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    bonuses: Vec<KeywordBonus>,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self {
            bonuses: vec![
                KeywordBonus {
                    question_id: 1,
                    keyword: "vada pav",
                    points: 20,
                },
                KeywordBonus {
                    question_id: 12,
                    keyword: "financial capital",
                    points: 15,
                },
            ],
        }
    }
}

impl HeuristicScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scorer for HeuristicScorer {
    fn score(&self, answer: &str, question_id: u32) -> u8 {
        let length = answer.chars().count();
        let mut score = BASE_SCORE;

        // Independent checks, not an if/else chain
        if length < SHORT_ANSWER_CHARS {
            score -= 20;
        }
        if length > LONG_ANSWER_CHARS {
            score += 10;
        }
        if HEDGING_PHRASES.iter().any(|phrase| answer.contains(phrase)) {
            score -= 15;
        }
        if answer.split_whitespace().count() > DETAILED_ANSWER_WORDS {
            score += 5;
        }

        let lowered = answer.to_lowercase();
        for bonus in &self.bonuses {
            if bonus.question_id == question_id && lowered.contains(bonus.keyword) {
                score += bonus.points;
            }
        }

        score.clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u8
    }
}

/// Score with the default heuristic
pub fn score(answer: &str, question_id: u32) -> u8 {
    HeuristicScorer::default().score(answer, question_id)
}
