use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub notify_base_url: String,
    /// RFC 3339; parsed where the countdown needs it.
    pub registration_closes_at: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://gdg-backend.onrender.com".into(),
            notify_base_url: "http://localhost:3001".into(),
            registration_closes_at: "2024-12-28T00:00:00Z".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("registrar.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("notify_base_url") {
                settings.notify_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("registration_closes_at") {
                settings.registration_closes_at = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("NOTIFY_BASE_URL") {
        settings.notify_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__NOTIFY_BASE_URL") {
        settings.notify_base_url = v;
    }

    if let Ok(v) = std::env::var("APP__REGISTRATION_CLOSES_AT") {
        settings.registration_closes_at = v;
    }

    settings
}
