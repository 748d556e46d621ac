use crate::quality::TargetWindows;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub n_vocab: usize,
    pub n_sent: usize,
    pub min_sentence_chars: usize,
    pub max_sentence_chars: usize,
    pub translation_target_language: Option<String>,
    pub quality_min: u8,
    pub windows: TargetWindows,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_vocab: 15,
            n_sent: 10,
            min_sentence_chars: 12,
            max_sentence_chars: 280,
            translation_target_language: None,
            quality_min: 60,
            windows: TargetWindows::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_domain(config: &ll_domain::config::Config) -> Self {
        Self {
            translation_target_language: config.translation_target_language.clone(),
            quality_min: config.quality_min,
            ..Self::default()
        }
    }
}
