//! Configuration management.

mod settings;

pub use settings::{
    EmbeddingSettings, FetchSettings, GeneralSettings, LlmSettings, RagSettings, Settings,
    SourceSettings,
};
