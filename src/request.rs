use anyhow::{bail, Context, Result};
use std::path::Path;

/// Topic presets offered by the service, keyed by the form value it expects.
pub const TOPIC_PRESETS: &[(&str, &str)] = &[
    ("tech", "AI and technology news"),
    ("politics", "US political news"),
    ("sports", "sports news"),
    ("medicine", "medical and healthcare news"),
    ("finance", "financial markets and business news"),
    ("climate", "climate and environment news"),
    ("entertainment", "entertainment and media news"),
];

pub fn preset_description(key: &str) -> Option<&'static str> {
    TOPIC_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(key.trim()))
        .map(|(_, description)| *description)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicChoice {
    Preset(String),
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingSample {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl WritingSample {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read writing sample {}", path.display()))?;
        if bytes.is_empty() {
            bail!("writing sample {} is empty", path.display());
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sample.txt".to_string());

        Ok(Self { file_name, bytes })
    }
}

/// A validated generation request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    topic: TopicChoice,
    samples: Vec<WritingSample>,
    use_sample_style: bool,
}

impl GenerateRequest {
    pub fn new(
        topic: TopicChoice,
        samples: Vec<WritingSample>,
        use_sample_style: bool,
    ) -> Result<Self> {
        let topic = match topic {
            TopicChoice::Preset(key) => {
                let key = key.trim().to_ascii_lowercase();
                if preset_description(&key).is_none() {
                    let known: Vec<&str> = TOPIC_PRESETS.iter().map(|(key, _)| *key).collect();
                    bail!(
                        "Unknown topic '{key}'. Expected one of: {}",
                        known.join(", ")
                    );
                }
                TopicChoice::Preset(key)
            }
            TopicChoice::Custom(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    bail!("Custom topic must not be blank");
                }
                TopicChoice::Custom(text)
            }
        };

        if samples.is_empty() && !use_sample_style {
            bail!("Upload at least one writing sample");
        }

        Ok(Self {
            topic,
            samples,
            use_sample_style,
        })
    }

    pub fn topic(&self) -> &TopicChoice {
        &self.topic
    }

    pub fn samples(&self) -> &[WritingSample] {
        &self.samples
    }

    pub fn use_sample_style(&self) -> bool {
        self.use_sample_style
    }

    pub fn topic_description(&self) -> &str {
        match &self.topic {
            TopicChoice::Preset(key) => preset_description(key).unwrap_or(key.as_str()),
            TopicChoice::Custom(text) => text.as_str(),
        }
    }

    /// Text form fields, in the shape the `/generate` endpoint reads them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(2);
        match &self.topic {
            TopicChoice::Preset(key) => fields.push(("topic", key.clone())),
            TopicChoice::Custom(text) => {
                fields.push(("topic", "custom".to_string()));
                fields.push(("custom_topic", text.clone()));
            }
        }
        if self.use_sample_style {
            fields.push(("use_sample_style", "on".to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> WritingSample {
        WritingSample {
            file_name: "letter.txt".to_string(),
            bytes: b"I'm excited to apply".to_vec(),
        }
    }

    #[test]
    fn test_preset_topic_is_normalized_and_described() {
        let request =
            GenerateRequest::new(TopicChoice::Preset(" Tech ".to_string()), vec![sample()], false)
                .unwrap();
        assert_eq!(request.topic(), &TopicChoice::Preset("tech".to_string()));
        assert_eq!(request.topic_description(), "AI and technology news");
        assert_eq!(request.form_fields(), vec![("topic", "tech".to_string())]);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let error =
            GenerateRequest::new(TopicChoice::Preset("gardening".to_string()), vec![sample()], false)
                .unwrap_err();
        assert!(error.to_string().contains("Unknown topic 'gardening'"));
    }

    #[test]
    fn test_blank_custom_topic_is_rejected() {
        assert!(
            GenerateRequest::new(TopicChoice::Custom("   ".to_string()), vec![sample()], false)
                .is_err()
        );
    }

    #[test]
    fn test_samples_required_unless_sample_style() {
        let error = GenerateRequest::new(TopicChoice::Custom("rust".to_string()), vec![], false)
            .unwrap_err();
        assert_eq!(error.to_string(), "Upload at least one writing sample");

        let request =
            GenerateRequest::new(TopicChoice::Custom("rust".to_string()), vec![], true).unwrap();
        assert_eq!(
            request.form_fields(),
            vec![
                ("topic", "custom".to_string()),
                ("custom_topic", "rust".to_string()),
                ("use_sample_style", "on".to_string()),
            ]
        );
    }

    #[test]
    fn test_writing_sample_from_path_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.md");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"my voice").unwrap();

        let sample = WritingSample::from_path(&path).unwrap();
        assert_eq!(sample.file_name, "essay.md");
        assert_eq!(sample.bytes, b"my voice");
    }

    #[test]
    fn test_empty_writing_sample_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::File::create(&path).unwrap();

        assert!(WritingSample::from_path(&path).is_err());
    }
}
