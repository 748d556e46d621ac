pub mod class;
pub mod exercise;
pub mod transcript;

pub use class::{Class, ClassStatus, DispatchPayload, Teacher};
pub use exercise::{
    ClozeExercise, Difficulty, ExerciseCounts, ExerciseMetadata, ExerciseSet, ExerciseSetStatus,
    ExerciseSource, ExercisesDocument, Flashcard, GrammarExercise, Mistake, MistakeType,
    SentenceBuilderExercise,
};
pub use transcript::{TranscriptArtifact, TranscriptSource, TranscriptStatus};
