use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::Config;

fn config_path(custom: Option<&Path>) -> Result<PathBuf> {
    match custom {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::default_path(),
    }
}

fn report_success(json_output: bool, message: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "status": "success", "message": message }));
    } else {
        println!("{}", message);
    }
}

fn report_failure(json_output: bool, what: &str, e: &anyhow::Error) -> ! {
    if json_output {
        println!(
            "{}",
            serde_json::json!({ "status": "error", "message": format!("{}: {:#}", what, e) })
        );
    } else {
        eprintln!("Error: {}: {:#}", what, e);
    }
    std::process::exit(1);
}

/// Render `config show` output.
pub fn show_config(config: &Config, path: &Path, json_output: bool) -> Result<String> {
    if json_output {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(format!(
            "Configuration ({})\n{}",
            path.display(),
            toml::to_string_pretty(config)?
        ))
    }
}

/// Apply `key = value` to the config at `path` and save it.
pub fn set_config_value(path: &Path, key: &str, value: &str) -> Result<Config> {
    let mut config = Config::load(Some(path))?;
    config.set_value(key, value)?;
    config.save_to(path)?;
    Ok(config)
}

pub fn handle_config_action(action: ConfigAction, custom_path: Option<&Path>, json_output: bool) {
    let path = match config_path(custom_path) {
        Ok(p) => p,
        Err(e) => report_failure(json_output, "Failed to locate config", &e),
    };

    match action {
        ConfigAction::Init => match Config::default().save_to(&path) {
            Ok(()) => report_success(
                json_output,
                &format!("Configuration initialized at: {}", path.display()),
            ),
            Err(e) => report_failure(json_output, "Failed to initialize config", &e),
        },
        ConfigAction::Show => {
            let rendered = Config::load(Some(&path)).and_then(|config| show_config(&config, &path, json_output));
            match rendered {
                Ok(text) => println!("{}", text),
                Err(e) => report_failure(json_output, "Failed to load config", &e),
            }
        }
        ConfigAction::Set { key, value } => match set_config_value(&path, &key, &value) {
            Ok(_) => report_success(
                json_output,
                &format!("Configuration updated: {} = {}", key, value),
            ),
            Err(e) => report_failure(json_output, "Failed to update config", &e),
        },
    }
}
