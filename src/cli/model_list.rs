//! Model listing and connection status

use std::error::Error;

use crate::api::models::sort_models;
use crate::api::ModelDescriptor;
use crate::core::client::ModelServerClient;
use crate::core::config::{SettingsProvider, SharedSettings};
use crate::core::render::classify;

pub async fn show_status(settings: &SharedSettings) -> Result<(), Box<dyn Error>> {
    let config = settings.server_config();
    let client = ModelServerClient::new();

    if !client.test_connection(&config).await {
        eprintln!("❌ Cannot reach Ollama at {}", config.base_url);
        eprintln!();
        eprintln!("💡 Make sure Ollama is running, or point at another server with:");
        eprintln!("  ollama-assistant set base-url http://host:11434");
        std::process::exit(1);
    }

    let count = client.list_models(&config).await.len();
    println!("✅ Connected to Ollama at {}", config.base_url);
    println!("   {count} model(s) installed");
    match settings.selected_model() {
        Some(model) => println!("   Selected model: {model}"),
        None => println!("   No model selected"),
    }
    Ok(())
}

pub async fn list_models(settings: &SharedSettings) -> Result<(), Box<dyn Error>> {
    let config = settings.server_config();
    let client = ModelServerClient::new();

    let mut models = match client.try_list_models(&config).await {
        Ok(models) => models,
        Err(err) => {
            eprintln!("❌ {}", classify(&err).message);
            std::process::exit(1);
        }
    };

    println!("🤖 Models installed on {}", config.base_url);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if models.is_empty() {
        println!("No models installed. Pull one with: ollama pull llama3.2");
        return Ok(());
    }

    sort_models(&mut models);
    let selected = settings.selected_model();
    for model in &models {
        println!("{}", format_model_line(model, selected.as_deref()));
    }
    Ok(())
}

fn format_model_line(model: &ModelDescriptor, selected: Option<&str>) -> String {
    let marker = if selected == Some(model.name.as_str()) {
        "🎯"
    } else {
        " •"
    };
    format!("{marker} {} ({})", model.name, model.size_display())
}
