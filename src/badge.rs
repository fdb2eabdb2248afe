use crate::store::schema::UserStats;

/// What a badge asks of the aggregate stats. Every variant is answerable
/// from `UserStats` alone, so evaluation needs no history replay.
#[derive(Clone, Copy, Debug)]
pub enum Requirement {
    LessonsCompleted(u32),
    /// Completions at exactly 100% accuracy.
    PerfectAccuracy(u32),
    /// Completions at 95% accuracy or better.
    HighAccuracy(u32),
    Wpm(u32),
    Streak(u32),
    Points(u64),
    Stars(u32),
}

pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
}

pub const BADGES: &[Badge] = &[
    Badge {
        id: "first_steps",
        name: "First Steps",
        description: "Complete your first typing lesson",
        requirement: Requirement::LessonsCompleted(1),
    },
    Badge {
        id: "dedicated_learner",
        name: "Dedicated Learner",
        description: "Complete 10 lessons",
        requirement: Requirement::LessonsCompleted(10),
    },
    Badge {
        id: "keyboard_explorer",
        name: "Keyboard Explorer",
        description: "Complete 25 lessons",
        requirement: Requirement::LessonsCompleted(25),
    },
    Badge {
        id: "accuracy_ace",
        name: "Accuracy Ace",
        description: "Finish 5 lessons without a single miss",
        requirement: Requirement::PerfectAccuracy(5),
    },
    Badge {
        id: "perfectionist",
        name: "Perfectionist",
        description: "Finish 10 lessons at 95% accuracy or better",
        requirement: Requirement::HighAccuracy(10),
    },
    Badge {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Reach 20 wpm",
        requirement: Requirement::Wpm(20),
    },
    Badge {
        id: "lightning_fast",
        name: "Lightning Fast",
        description: "Reach 30 wpm",
        requirement: Requirement::Wpm(30),
    },
    Badge {
        id: "streak_starter",
        name: "Streak Starter",
        description: "Type 25 correct keys in a row",
        requirement: Requirement::Streak(25),
    },
    Badge {
        id: "streak_master",
        name: "Streak Master",
        description: "Type 50 correct keys in a row",
        requirement: Requirement::Streak(50),
    },
    Badge {
        id: "unstoppable",
        name: "Unstoppable",
        description: "Type 100 correct keys in a row",
        requirement: Requirement::Streak(100),
    },
    Badge {
        id: "point_collector",
        name: "Point Collector",
        description: "Earn 5,000 points",
        requirement: Requirement::Points(5_000),
    },
    Badge {
        id: "point_hoarder",
        name: "Point Hoarder",
        description: "Earn 25,000 points",
        requirement: Requirement::Points(25_000),
    },
    Badge {
        id: "star_collector",
        name: "Star Collector",
        description: "Collect 25 stars",
        requirement: Requirement::Stars(25),
    },
    Badge {
        id: "superstar",
        name: "Superstar",
        description: "Collect 50 stars",
        requirement: Requirement::Stars(50),
    },
];

impl Badge {
    pub fn earned_by(&self, stats: &UserStats) -> bool {
        match self.requirement {
            Requirement::LessonsCompleted(count) => stats.lessons_completed >= count,
            Requirement::PerfectAccuracy(count) => stats.perfect_completions >= count,
            Requirement::HighAccuracy(count) => stats.high_accuracy_completions >= count,
            Requirement::Wpm(value) => stats.best_wpm >= value,
            Requirement::Streak(count) => stats.longest_streak >= count,
            Requirement::Points(value) => stats.total_points >= value,
            Requirement::Stars(count) => stats.total_stars >= count,
        }
    }
}

#[allow(dead_code)] // Used by library consumers and tests
pub fn get(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|badge| badge.id == id)
}

/// Badges whose requirement is now met but which the user has not earned
/// yet. The earned set only grows; stats fields are all monotonic, so a
/// badge once earned stays earned.
pub fn newly_earned(stats: &UserStats) -> Vec<&'static Badge> {
    BADGES
        .iter()
        .filter(|badge| badge.earned_by(stats) && !stats.badges.iter().any(|id| id == badge.id))
        .collect()
}
