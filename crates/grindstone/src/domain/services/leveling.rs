//! Level curve
//!
//! `threshold(L) = L² × 75`. A user is at the largest level whose threshold
//! their experience reaches, never below 1 and never above `MAX_LEVEL`.

pub const MAX_LEVEL: i32 = 100;

const THRESHOLD_FACTOR: i64 = 75;

/// Experience required to be at `level`
pub fn threshold_for_level(level: i32) -> i64 {
    let level = i64::from(level.clamp(1, MAX_LEVEL));
    level * level * THRESHOLD_FACTOR
}

pub fn level_for_experience(experience: i64) -> i32 {
    if experience <= 0 {
        return 1;
    }
    // isqrt(experience / 75) gives a candidate; adjust for integer rounding
    let mut level = ((experience / THRESHOLD_FACTOR) as f64).sqrt() as i32;
    level = level.clamp(1, MAX_LEVEL);
    while level < MAX_LEVEL && threshold_for_level(level + 1) <= experience {
        level += 1;
    }
    while level > 1 && threshold_for_level(level) > experience {
        level -= 1;
    }
    level
}

/// Progress toward the next level, 0..=100. Always 100 at the cap.
pub fn level_progress_percent(experience: i64) -> i32 {
    let level = level_for_experience(experience);
    if level >= MAX_LEVEL {
        return 100;
    }
    let floor = if level == 1 { 0 } else { threshold_for_level(level) };
    let ceiling = threshold_for_level(level + 1);
    let gained = (experience - floor).clamp(0, ceiling - floor);
    ((gained * 100) / (ceiling - floor)) as i32
}
