//! Built-in challenge catalog.
//!
//! The catalog is compiled into the binary and never changes at runtime.
//! Both the API (to validate challenge ids) and the client (to render the
//! dashboard and challenge view) read from it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeCategory {
    Physical,
    Mental,
    Creative,
}

impl ChallengeCategory {
    pub const ALL: [ChallengeCategory; 3] = [Self::Physical, Self::Mental, Self::Creative];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeDefinition {
    pub id: u32,
    pub category: ChallengeCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub steps: &'static [&'static str],
    pub duration: &'static str,
    pub difficulty: &'static str,
}

pub static CHALLENGES: &[ChallengeDefinition] = &[
    ChallengeDefinition {
        id: 1,
        category: ChallengeCategory::Physical,
        name: "Morning Exercise Routine",
        description: "Start your day with energy",
        steps: &[
            "Get up 15 minutes earlier than usual",
            "Drink a glass of water",
            "Do 10 jumping jacks",
            "Do 10 push-ups (modified is fine)",
            "Do 20 squats",
            "Stretch for 3 minutes",
            "Take 5 deep breaths",
        ],
        duration: "15 minutes",
        difficulty: "Easy",
    },
    ChallengeDefinition {
        id: 2,
        category: ChallengeCategory::Physical,
        name: "Mindful Walk",
        description: "Walk with full awareness",
        steps: &[
            "Pick a familiar 20 minute route",
            "Put your phone on silent",
            "Walk at a normal pace for the first 5 minutes",
            "Focus on your breathing",
            "Notice 5 new things around you",
            "Feel your feet touching the ground",
            "Finish with 3 deep breaths",
        ],
        duration: "20 minutes",
        difficulty: "Easy",
    },
    ChallengeDefinition {
        id: 3,
        category: ChallengeCategory::Mental,
        name: "Gratitude Meditation",
        description: "Grow a daily habit of gratitude",
        steps: &[
            "Find a quiet place",
            "Sit comfortably",
            "Close your eyes",
            "Breathe deeply 3 times",
            "Think of 3 things you are grateful for",
            "Feel the gratitude in your chest",
            "Hold that feeling for 5 minutes",
        ],
        duration: "10 minutes",
        difficulty: "Easy",
    },
    ChallengeDefinition {
        id: 4,
        category: ChallengeCategory::Mental,
        name: "Reflective Journaling",
        description: "Look back on your day",
        steps: &[
            "Grab paper and a pen",
            "Write down the date",
            "Answer: what made me feel good today?",
            "Write: what challenge did I face?",
            "Note: what did I learn?",
            "Write: how do I feel right now?",
            "Close with a positive affirmation",
        ],
        duration: "15 minutes",
        difficulty: "Easy",
    },
    ChallengeDefinition {
        id: 5,
        category: ChallengeCategory::Creative,
        name: "Expressive Art",
        description: "Express your emotions through art",
        steps: &[
            "Gather materials: paper, colors, pencils",
            "Put on some relaxing music",
            "Close your eyes and notice how you feel",
            "Pick colors that match your mood",
            "Draw without judging, just express",
            "Aim for expression, not perfection",
            "When done, look at your work kindly",
        ],
        duration: "20 minutes",
        difficulty: "Easy",
    },
];

pub fn all() -> &'static [ChallengeDefinition] {
    CHALLENGES
}

pub fn find(id: u32) -> Option<&'static ChallengeDefinition> {
    CHALLENGES.iter().find(|c| c.id == id)
}

pub fn by_category(
    category: ChallengeCategory,
) -> impl Iterator<Item = &'static ChallengeDefinition> {
    CHALLENGES.iter().filter(move |c| c.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<u32> = CHALLENGES.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CHALLENGES.len());
    }

    #[test]
    fn every_category_has_challenges() {
        for category in ChallengeCategory::ALL {
            assert!(by_category(category).count() > 0, "{category:?} is empty");
        }
        assert_eq!(by_category(ChallengeCategory::Physical).count(), 2);
        assert_eq!(by_category(ChallengeCategory::Mental).count(), 2);
        assert_eq!(by_category(ChallengeCategory::Creative).count(), 1);
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find(3).map(|c| c.category), Some(ChallengeCategory::Mental));
        assert!(find(0).is_none());
        assert!(find(99).is_none());
    }

    #[test]
    fn steps_are_ordered_and_non_empty() {
        for c in CHALLENGES {
            assert!(!c.steps.is_empty());
            assert!(c.steps.iter().all(|s| !s.trim().is_empty()));
        }
    }

    #[test]
    fn serializes_category_lowercase() {
        let json = serde_json::to_value(find(5).unwrap()).unwrap();
        assert_eq!(json["category"], "creative");
        assert_eq!(json["steps"].as_array().unwrap().len(), 7);
    }
}
