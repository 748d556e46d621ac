use ll_domain::models::ExerciseCounts;

#[derive(Debug, Clone, Copy)]
pub struct CountWindow {
    pub min: usize,
    pub max: usize,
}

impl CountWindow {
    pub fn contains(self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TargetWindows {
    pub flashcards: CountWindow,
    pub cloze: CountWindow,
    pub grammar: CountWindow,
    pub sentence: CountWindow,
}

impl Default for TargetWindows {
    fn default() -> Self {
        Self {
            flashcards: CountWindow { min: 8, max: 15 },
            cloze: CountWindow { min: 6, max: 10 },
            grammar: CountWindow { min: 6, max: 10 },
            sentence: CountWindow { min: 6, max: 10 },
        }
    }
}

/// Hard floor below which a type triggers a relaxed second construction
/// pass regardless of the overall score.
pub const HARD_FLOOR: usize = 3;

pub struct QualityInputs {
    pub counts: ExerciseCounts,
    pub windows: TargetWindows,
    pub translation_coverage: f64,
    pub mistake_derived_present: bool,
    pub sanitization_dropped_any: bool,
}

/// Scores an exercise set on a 0-100 scale. Weighting: 40 points split
/// evenly across the four per-type count windows, 25 for flashcard
/// translation coverage, 20 for having at least one mistake-derived item,
/// 15 for a clean sanitization pass.
pub fn score(inputs: &QualityInputs) -> u8 {
    let mut total = 0.0f64;

    let per_type = 10.0;
    if inputs.windows.flashcards.contains(inputs.counts.flashcards) {
        total += per_type;
    }
    if inputs.windows.cloze.contains(inputs.counts.cloze) {
        total += per_type;
    }
    if inputs.windows.grammar.contains(inputs.counts.grammar) {
        total += per_type;
    }
    if inputs.windows.sentence.contains(inputs.counts.sentence) {
        total += per_type;
    }

    total += 25.0 * inputs.translation_coverage.clamp(0.0, 1.0);

    if inputs.mistake_derived_present {
        total += 20.0;
    }

    if !inputs.sanitization_dropped_any {
        total += 15.0;
    }

    total.round().clamp(0.0, 100.0) as u8
}

/// Returns the subset of the four type counts that are below [`HARD_FLOOR`]
/// and therefore warrant a relaxed second pass.
pub fn below_hard_floor(counts: &ExerciseCounts) -> Vec<&'static str> {
    let mut below = Vec::new();
    if counts.flashcards < HARD_FLOOR {
        below.push("flashcards");
    }
    if counts.cloze < HARD_FLOOR {
        below.push("cloze");
    }
    if counts.grammar < HARD_FLOOR {
        below.push("grammar");
    }
    if counts.sentence < HARD_FLOOR {
        below.push("sentence");
    }
    below
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_marks_when_everything_passes() {
        let inputs = QualityInputs {
            counts: ExerciseCounts {
                flashcards: 10,
                cloze: 8,
                grammar: 8,
                sentence: 8,
            },
            windows: TargetWindows::default(),
            translation_coverage: 1.0,
            mistake_derived_present: true,
            sanitization_dropped_any: false,
        };
        assert_eq!(score(&inputs), 100);
    }

    #[test]
    fn zero_when_nothing_passes() {
        let inputs = QualityInputs {
            counts: ExerciseCounts::default(),
            windows: TargetWindows::default(),
            translation_coverage: 0.0,
            mistake_derived_present: false,
            sanitization_dropped_any: true,
        };
        assert_eq!(score(&inputs), 0);
    }
}
