use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub intake: Intake,
    #[serde(default)]
    pub normalize: Normalize,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
    pub overwrite: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub api_base: String,
    pub model: String,
    pub fallback_model: String,
    pub known_models: Vec<String>,
    pub credential_env: String,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
    pub retry_delay_ms: u64,
    pub content_type: String,
}
impl Default for Service {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.5-flash".into(),
            fallback_model: "gemini-2.5-flash".into(),
            known_models: [
                "gemini-2.5-flash",
                "gemini-2.0-flash",
                "gemini-2.0-pro-exp-02-05",
                "gemini-1.5-pro",
                "gemini-1.5-pro-002",
                "gemini-1.5-flash",
                "gemini-1.5-flash-002",
                "gemini-1.5-flash-8b",
                "gemini-1.0-pro",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            credential_env: "GEMINI_API_KEY".into(),
            temperature: 0.1,
            request_timeout_seconds: 120,
            retry_delay_ms: 1200,
            content_type: "application/pdf".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub max_documents: usize,
    pub chunk_size: usize,
}
impl Default for Batch {
    fn default() -> Self {
        Self {
            max_documents: 150,
            chunk_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Intake {
    pub accepted_extensions: Vec<String>,
    pub check_magic: bool,
    pub max_document_bytes: u64,
    pub recursive: bool,
}
impl Default for Intake {
    fn default() -> Self {
        Self {
            accepted_extensions: vec!["pdf".into()],
            check_magic: true,
            max_document_bytes: 20 * 1024 * 1024,
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalize {
    pub max_list_items: usize,
    pub max_item_chars: usize,
    pub max_summary_chars: usize,
    pub normalize_unicode: bool,
}
impl Default for Normalize {
    fn default() -> Self {
        Self {
            max_list_items: 8,
            max_item_chars: 160,
            max_summary_chars: 1200,
            normalize_unicode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_report_json: bool,
    pub write_markdown: bool,
    pub write_index_json: bool,
    pub report_filename: String,
    pub markdown_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_report_json: true,
            write_markdown: true,
            write_index_json: true,
            report_filename: "report.json".into(),
            markdown_filename: "report.md".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_effective_config: true,
        }
    }
}
