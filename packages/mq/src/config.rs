use serde::Deserialize;

/// Stream broker configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MqConfig {
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Stream submissions are appended to. Default: "code_submissions".
    #[serde(default = "default_mq_stream")]
    pub stream: String,
    /// Consumer group the worker pool reads as. Default: "judgers".
    #[serde(default = "default_mq_group")]
    pub group: String,
}

fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_stream() -> String {
    "code_submissions".into()
}
fn default_mq_group() -> String {
    "judgers".into()
}

impl Default for MqConfig {
    fn default() -> Self {
        Self {
            url: default_mq_url(),
            stream: default_mq_stream(),
            group: default_mq_group(),
        }
    }
}
