/// Characters counted as one word for WPM
pub const CHARS_PER_WORD: f64 = 5.0;

/// Elapsed time below which WPM reads as zero
pub const MIN_ELAPSED_MS: i64 = 1000;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Words per minute for `chars` characters typed over `elapsed_ms`, rounded.
/// Zero when no time has passed.
pub fn words_per_minute(chars: usize, elapsed_ms: i64) -> f64 {
    if elapsed_ms <= 0 {
        return 0.0;
    }
    let minutes = elapsed_ms as f64 / 60_000.0;
    ((chars as f64 / CHARS_PER_WORD) / minutes).round()
}

/// Rate shown while typing. Reads 0 until `MIN_ELAPSED_MS` has passed so the
/// first keystrokes don't flash absurd numbers.
pub fn live_words_per_minute(chars: usize, elapsed_ms: i64) -> f64 {
    if elapsed_ms < MIN_ELAPSED_MS {
        return 0.0;
    }
    words_per_minute(chars, elapsed_ms)
}

/// Percentage of `typed` characters that were not mistakes, rounded and
/// floored at zero. 100 when nothing has been typed.
pub fn accuracy_percent(typed: usize, mistakes: u32) -> f64 {
    if typed == 0 {
        return 100.0;
    }
    let correct = typed as f64 - mistakes as f64;
    ((correct / typed as f64) * 100.0).round().max(0.0)
}
