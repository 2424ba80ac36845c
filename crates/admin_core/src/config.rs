use std::{collections::HashMap, fs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_limit: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api".into(),
            page_limit: 10,
        }
    }
}

/// Loads settings from an optional `admin.toml` in the working directory,
/// then applies `ADMIN__*` environment overrides on top.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("admin.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("ADMIN__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("ADMIN__PAGE_LIMIT") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.page_limit = parsed;
        }
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("page_limit") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.page_limit = parsed;
        }
    }
}
