use rand::Rng;
use rand::seq::IndexedRandom;

use wellness_types::models::{MOOD_MAX, MOOD_MIN};

/// Position of the mood slider, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoodLevel(i64);

impl MoodLevel {
    pub fn new(level: i64) -> Option<Self> {
        (MOOD_MIN..=MOOD_MAX).contains(&level).then_some(Self(level))
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            1 => "😢",
            2 => "😔",
            3 => "😐",
            4 => "😊",
            _ => "😄",
        }
    }

    pub fn color(self) -> &'static str {
        match self.0 {
            1 => "red",
            2 => "orange",
            3 => "yellow",
            4 => "green",
            _ => "blue",
        }
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Very sad",
            2 => "Sad",
            3 => "Okay",
            4 => "Happy",
            _ => "Very happy",
        }
    }

    pub fn quotes(self) -> &'static [&'static str] {
        match self.0 {
            1 => &[
                "Hard days make strong people stronger. 💪",
                "This storm will pass too. You are stronger than you think. 🌈",
                "Every day is a new chance to start over. ✨",
            ],
            2 => &[
                "It is normal to feel this way sometimes. Be kind to yourself. 💙",
                "Small steps count too. Move at your own pace. 🚶",
                "Tomorrow can be different. Rest today. 🌙",
            ],
            3 => &[
                "You are on your way. Every day is a step forward. 🌱",
                "Consistency is the key. Keep going. 🔑",
                "Small progress is still progress. 📈",
            ],
            4 => &[
                "You are doing great! Keep that positive energy. ⚡",
                "Your good mood is contagious. Keep shining. ✨",
                "You are building an amazing life. Carry on! 🌟",
            ],
            _ => &[
                "You are glowing! Share that energy with the world. 🌞",
                "Your happiness is inspiring. Keep it up! 🎉",
                "You are unstoppable when you feel like this. Seize the moment! 🚀",
            ],
        }
    }

    pub fn random_quote<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        // Every level has at least one quote.
        self.quotes().choose(rng).copied().unwrap_or_default()
    }
}

impl Default for MoodLevel {
    fn default() -> Self {
        Self(MOOD_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(MoodLevel::new(0).is_none());
        assert!(MoodLevel::new(6).is_none());
        assert_eq!(MoodLevel::new(3).map(MoodLevel::value), Some(3));
    }

    #[test]
    fn every_level_has_label_and_quotes() {
        for level in MOOD_MIN..=MOOD_MAX {
            let mood = MoodLevel::new(level).unwrap();
            assert!(!mood.quotes().is_empty());
            assert!(!mood.emoji().is_empty());
            assert!(!mood.label().is_empty());
        }
        assert_eq!(MoodLevel::new(1).unwrap().color(), "red");
        assert_eq!(MoodLevel::new(4).unwrap().emoji(), "😊");
    }

    #[test]
    fn random_quote_comes_from_level() {
        let mut rng = rand::rng();
        let mood = MoodLevel::new(2).unwrap();
        for _ in 0..20 {
            assert!(mood.quotes().contains(&mood.random_quote(&mut rng)));
        }
    }
}
