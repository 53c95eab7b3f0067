use crate::config::SpeechConfig;

use super::platform::Voice;

/// Filtered view of the platform's voices that are acceptable for reading.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    candidates: Vec<Voice>,
}

impl VoiceCatalog {
    /// Keep the voices matching the configured language prefix, locality and
    /// denylist. Platform order is preserved.
    pub fn from_platform(voices: Vec<Voice>, config: &SpeechConfig) -> Self {
        let candidates = voices
            .into_iter()
            .filter(|v| v.lang.starts_with(config.language_prefix.as_str()))
            .filter(|v| v.local_service || !config.local_only)
            .filter(|v| !config.voice_denylist.iter().any(|name| *name == v.name))
            .collect();
        Self { candidates }
    }

    /// The preferred voice if present, otherwise the first candidate.
    pub fn pick_default(&self, preferred: Option<&str>) -> Option<&Voice> {
        preferred
            .and_then(|prefix| {
                self.candidates
                    .iter()
                    .find(|v| v.voice_uri.starts_with(prefix))
            })
            .or_else(|| self.candidates.first())
    }

    pub fn find_by_uri(&self, voice_uri: &str) -> Option<&Voice> {
        self.candidates.iter().find(|v| v.voice_uri == voice_uri)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str, local: bool) -> Voice {
        Voice {
            name: name.to_string(),
            lang: lang.to_string(),
            voice_uri: format!("{name}-{lang}"),
            local_service: local,
            default: false,
        }
    }

    fn platform_voices() -> Vec<Voice> {
        vec![
            voice("Amelie", "fr-CA", true),
            voice("Zarvox", "en-US", true),
            voice("Google UK English", "en-GB", false),
            voice("Samantha", "en-US", true),
            voice("Arthur", "en-GB", true),
        ]
    }

    #[test]
    fn filters_language_locality_and_denylist() {
        let catalog = VoiceCatalog::from_platform(platform_voices(), &SpeechConfig::default());
        let names: Vec<&str> = catalog.voices().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Samantha", "Arthur"]);
    }

    #[test]
    fn remote_voices_allowed_when_not_local_only() {
        let config = SpeechConfig {
            local_only: false,
            ..Default::default()
        };
        let catalog = VoiceCatalog::from_platform(platform_voices(), &config);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn prefers_named_voice() {
        let catalog = VoiceCatalog::from_platform(platform_voices(), &SpeechConfig::default());
        let picked = catalog.pick_default(Some("Arthur")).unwrap();
        assert_eq!(picked.name, "Arthur");
    }

    #[test]
    fn falls_back_to_first_candidate() {
        let catalog = VoiceCatalog::from_platform(platform_voices(), &SpeechConfig::default());
        assert_eq!(catalog.pick_default(Some("Daniel")).unwrap().name, "Samantha");
        assert_eq!(catalog.pick_default(None).unwrap().name, "Samantha");
    }

    #[test]
    fn empty_catalog_picks_nothing() {
        let catalog = VoiceCatalog::from_platform(vec![], &SpeechConfig::default());
        assert!(catalog.is_empty());
        assert!(catalog.pick_default(Some("Arthur")).is_none());
    }

    #[test]
    fn finds_exact_uri_only() {
        let catalog = VoiceCatalog::from_platform(platform_voices(), &SpeechConfig::default());
        assert!(catalog.find_by_uri("Arthur-en-GB").is_some());
        assert!(catalog.find_by_uri("Arthur").is_none());
    }
}
