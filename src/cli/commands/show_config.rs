use crate::services::DefaultPipelineConfig;
use anyhow::Result;
use std::path::Path;

/// Load the configuration (or the defaults) and render it as pretty JSON
pub fn render_config(config_path: Option<&Path>) -> Result<String> {
    let config = match config_path {
        Some(path) => DefaultPipelineConfig::from_json_file(path)?,
        None => DefaultPipelineConfig::default(),
    };
    Ok(serde_json::to_string_pretty(&config)?)
}

/// Execute the show-config command
pub fn execute_show_config(config_path: Option<&Path>) -> Result<()> {
    println!("{}", render_config(config_path)?);
    Ok(())
}
