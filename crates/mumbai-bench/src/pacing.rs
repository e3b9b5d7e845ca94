use std::time::Duration;

/// Fixed pauses between chat calls so a local model server is not flooded.
///
/// Pauses are taken regardless of whether the preceding call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    between_questions: Duration,
    between_languages: Duration,
}

impl Pacer {
    pub fn new(between_questions: Duration, between_languages: Duration) -> Self {
        Self {
            between_questions,
            between_languages,
        }
    }

    /// No pauses at all
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn between_questions(&self) -> Duration {
        self.between_questions
    }

    pub fn between_languages(&self) -> Duration {
        self.between_languages
    }

    pub async fn after_question(&self) {
        pause(self.between_questions).await;
    }

    pub async fn between_language_variants(&self) {
        pause(self.between_languages).await;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
