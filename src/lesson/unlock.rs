use std::collections::HashMap;

use crate::lesson::Lesson;
use crate::store::schema::LessonProgress;

/// Stars required on a prerequisite before the next lesson opens.
pub const UNLOCK_MIN_STARS: u8 = 3;

/// Whether a lesson is selectable given the current progress map.
///
/// Pure predicate, re-evaluated on every render of the lesson list;
/// progress changes between evaluations, so the result is never cached.
pub fn is_unlocked(lesson: &Lesson, progress: &HashMap<u32, LessonProgress>) -> bool {
    let Some(required) = lesson.unlock_requirement else {
        return true;
    };
    progress
        .get(&required)
        .is_some_and(|record| record.completed && record.stars >= UNLOCK_MIN_STARS)
}
