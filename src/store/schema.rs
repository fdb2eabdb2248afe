use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badge::{self, Badge};
use crate::metrics::FinalStats;

const SCHEMA_VERSION: u32 = 1;

/// Per-lesson best results. Stars and bests only increase; attempts and
/// time only accumulate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LessonProgress {
    pub completed: bool,
    pub stars: u8,
    pub best_wpm: u32,
    pub best_accuracy: u32,
    pub attempts: u32,
    pub total_time_secs: u64,
    pub last_attempt: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_points: u64,
    pub total_stars: u32,
    pub lessons_completed: u32,
    pub total_time_secs: u64,
    /// Mean of per-lesson best wpm over completed lessons.
    pub average_wpm: u32,
    /// Mean of per-lesson best accuracy over completed lessons.
    pub average_accuracy: u32,
    pub best_wpm: u32,
    pub longest_streak: u32,
    pub perfect_completions: u32,
    pub high_accuracy_completions: u32,
    pub badges: Vec<String>,
}

/// Everything the progress store persists, under one schema version.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub lessons: HashMap<u32, LessonProgress>,
    pub stats: UserStats,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            lessons: HashMap::new(),
            stats: UserStats::default(),
        }
    }
}

impl ProgressData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    /// Fold one completed session into the record for `lesson_id`.
    ///
    /// The store owns the merge semantics: bests and stars take the max,
    /// attempts and time add, averages are recomputed over completed
    /// lessons. Returns any badges this completion unlocked.
    pub fn record_completion(
        &mut self,
        lesson_id: u32,
        result: &FinalStats,
        completed_at: DateTime<Utc>,
    ) -> Vec<&'static Badge> {
        let record = self.lessons.entry(lesson_id).or_default();
        let star_gain = u32::from(result.stars.saturating_sub(record.stars));

        record.completed = true;
        record.stars = record.stars.max(result.stars);
        record.best_wpm = record.best_wpm.max(result.wpm);
        record.best_accuracy = record.best_accuracy.max(result.accuracy);
        record.attempts += 1;
        record.total_time_secs += result.elapsed_secs;
        record.last_attempt = Some(completed_at);

        let stats = &mut self.stats;
        stats.total_points += u64::from(result.points);
        stats.total_stars += star_gain;
        stats.lessons_completed = self
            .lessons
            .values()
            .filter(|record| record.completed)
            .count() as u32;
        stats.total_time_secs += result.elapsed_secs;
        stats.best_wpm = stats.best_wpm.max(result.wpm);
        stats.longest_streak = stats.longest_streak.max(result.best_streak);
        if result.accuracy == 100 {
            stats.perfect_completions += 1;
        }
        if result.accuracy >= 95 {
            stats.high_accuracy_completions += 1;
        }

        let completed: Vec<&LessonProgress> = self
            .lessons
            .values()
            .filter(|record| record.completed)
            .collect();
        if !completed.is_empty() {
            let n = completed.len() as f64;
            let wpm_sum: u64 = completed.iter().map(|r| u64::from(r.best_wpm)).sum();
            let acc_sum: u64 = completed.iter().map(|r| u64::from(r.best_accuracy)).sum();
            self.stats.average_wpm = (wpm_sum as f64 / n).round() as u32;
            self.stats.average_accuracy = (acc_sum as f64 / n).round() as u32;
        }

        let earned = badge::newly_earned(&self.stats);
        self.stats
            .badges
            .extend(earned.iter().map(|badge| badge.id.to_string()));
        earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(wpm: u32, accuracy: u32, stars: u8, elapsed_secs: u64) -> FinalStats {
        FinalStats {
            wpm,
            accuracy,
            stars,
            points: crate::metrics::points(wpm, accuracy, stars),
            elapsed_secs,
            correct_chars: 0,
            total_chars: 0,
            error_count: 0,
            best_streak: 0,
        }
    }

    #[test]
    fn test_first_completion_creates_record() {
        let mut data = ProgressData::default();
        data.record_completion(2, &result(12, 90, 4, 30), Utc::now());

        let record = &data.lessons[&2];
        assert!(record.completed);
        assert_eq!(record.stars, 4);
        assert_eq!(record.best_wpm, 12);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.total_time_secs, 30);
        assert!(record.last_attempt.is_some());
        assert_eq!(data.stats.lessons_completed, 1);
    }

    #[test]
    fn test_bests_are_monotonic_and_attempts_accumulate() {
        let mut data = ProgressData::default();
        data.record_completion(2, &result(20, 95, 5, 30), Utc::now());
        data.record_completion(2, &result(10, 80, 2, 45), Utc::now());

        let record = &data.lessons[&2];
        assert_eq!(record.stars, 5);
        assert_eq!(record.best_wpm, 20);
        assert_eq!(record.best_accuracy, 95);
        assert_eq!(record.attempts, 2);
        assert_eq!(record.total_time_secs, 75);
        // A repeated lesson counts once toward completion.
        assert_eq!(data.stats.lessons_completed, 1);
    }

    #[test]
    fn test_star_gain_only_counts_improvement() {
        let mut data = ProgressData::default();
        data.record_completion(2, &result(12, 86, 3, 30), Utc::now());
        assert_eq!(data.stats.total_stars, 3);
        // Same stars again: no gain.
        data.record_completion(2, &result(12, 86, 3, 30), Utc::now());
        assert_eq!(data.stats.total_stars, 3);
        // Improvement counts only the delta.
        data.record_completion(2, &result(12, 97, 5, 30), Utc::now());
        assert_eq!(data.stats.total_stars, 5);
    }

    #[test]
    fn test_averages_over_completed_lessons() {
        let mut data = ProgressData::default();
        data.record_completion(2, &result(10, 80, 2, 30), Utc::now());
        data.record_completion(3, &result(20, 90, 4, 30), Utc::now());
        assert_eq!(data.stats.average_wpm, 15);
        assert_eq!(data.stats.average_accuracy, 85);
    }

    #[test]
    fn test_completion_awards_badges_once() {
        let mut data = ProgressData::default();
        let earned = data.record_completion(2, &result(25, 100, 5, 30), Utc::now());
        let ids: Vec<&str> = earned.iter().map(|badge| badge.id).collect();
        assert!(ids.contains(&"first_steps"));
        assert!(ids.contains(&"speed_demon"));

        let earned_again = data.record_completion(3, &result(25, 100, 5, 30), Utc::now());
        assert!(earned_again.iter().all(|badge| badge.id != "first_steps"));
        assert!(earned_again.iter().all(|badge| badge.id != "speed_demon"));
    }

    #[test]
    fn test_streak_and_accuracy_counters_feed_badges() {
        let mut data = ProgressData::default();
        let mut r = result(10, 100, 5, 30);
        r.best_streak = 30;
        let earned = data.record_completion(2, &r, Utc::now());
        assert!(earned.iter().any(|badge| badge.id == "streak_starter"));
        assert_eq!(data.stats.perfect_completions, 1);
        assert_eq!(data.stats.high_accuracy_completions, 1);
    }

    #[test]
    fn test_needs_reset_on_stale_schema() {
        let mut data = ProgressData::default();
        assert!(!data.needs_reset());
        data.schema_version = 99;
        assert!(data.needs_reset());
    }
}
