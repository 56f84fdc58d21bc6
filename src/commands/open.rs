use anyhow::{Context, Result};

use crate::commands::build_source;
use crate::config::Config;
use crate::models::Visibility;
use crate::watch::actions;

/// URLs the `open` command would launch: one provider, or every visible one.
pub async fn resolve_targets(config: &Config, name: Option<&str>, debug: bool) -> Result<Vec<String>> {
    let source = build_source(config)?;
    let set = source
        .load()
        .await
        .with_context(|| format!("Could not load {}", source.location()))?;
    let visibility = Visibility::new(config.display.sentinel_name.clone(), debug);

    match name {
        Some(name) => {
            let record = set
                .visible(&visibility)
                .find(|r| r.name == name)
                .with_context(|| {
                    let known: Vec<&str> = set.visible(&visibility).map(|r| r.name.as_str()).collect();
                    format!("Unknown provider '{}'. Known providers: {}", name, known.join(", "))
                })?;
            Ok(vec![record.open_url().to_string()])
        }
        None => Ok(set.visible(&visibility).map(|r| r.open_url().to_string()).collect()),
    }
}

pub async fn handle_open_command(config: &Config, name: Option<String>, debug: bool, json: bool) -> Result<()> {
    let urls = resolve_targets(config, name.as_deref(), debug).await?;

    let opened = tokio::task::spawn_blocking({
        let urls = urls.clone();
        move || actions::open_all(&urls)
    })
    .await
    .context("Browser launcher task failed")?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "success", "opened": opened, "urls": urls })
        );
    } else {
        println!("Opened {} of {} site(s)", opened, urls.len());
    }
    Ok(())
}
