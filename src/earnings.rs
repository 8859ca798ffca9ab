use std::collections::HashMap;

use crate::models::Lesson;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fills in `net_earned` on every lesson: gross earned times the retention
/// rate for its pay method. A method missing from `tax_rates` retains
/// everything. Always recomputes from `earned`, so reapplying the same rates
/// is a no-op. Rates outside [0, 1] pass through unvalidated.
pub fn apply_tax(lessons: &mut [Lesson], tax_rates: &HashMap<String, f64>) {
    for lesson in lessons.iter_mut() {
        let retention = 1.0 - tax_rates.get(&lesson.pay_method).copied().unwrap_or(0.0);
        lesson.net_earned = Some(round2(lesson.earned * retention));
    }
}
