//! Builds the image prompt around the recognised label.

use rand::Rng;

use crate::constants::{MOODS, STYLES};

/// Picks an index in `0..count`. `count` is never zero.
pub trait PhraseChooser: Send + Sync {
    /// Returns an index into a vocabulary of `count` phrases.
    fn pick(&self, count: usize) -> usize;
}

/// Uniform picks from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomChooser;

impl PhraseChooser for RandomChooser {
    fn pick(&self, count: usize) -> usize {
        rand::rng().random_range(0..count)
    }
}

/// The prompt sent to the image model, plus the phrases it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Full prompt text
    pub text: String,
    /// Style phrase used
    pub style: &'static str,
    /// Mood phrase used
    pub mood: &'static str,
}

impl std::fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fills the prompt template with the label and one style and one mood.
///
/// The label isn't validated, an empty one goes straight into the template.
pub fn compose(label: &str, chooser: &dyn PhraseChooser) -> GenerationPrompt {
    let style = STYLES[chooser.pick(STYLES.len()) % STYLES.len()];
    let mood = MOODS[chooser.pick(MOODS.len()) % MOODS.len()];
    GenerationPrompt {
        text: format!("A {label}, {style}, {mood}, professional quality, highly detailed"),
        style,
        mood,
    }
}
