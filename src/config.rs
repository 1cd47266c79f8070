//! Runtime settings for external tools and the image host
//!
//! Settings come from an optional JSON file (by default
//! `<config_dir>/snapup/config.json`), then environment variables override
//! individual fields. Missing fields fall back to the macOS defaults.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SnapError, SnapResult};

/// Anonymous Gyazo upload endpoint
pub const GYAZO_UPLOAD_ENDPOINT: &str = "https://upload.gyazo.com/upload.cgi";

/// Imgur v3 image endpoint
pub const IMGUR_UPLOAD_ENDPOINT: &str = "https://api.imgur.com/3/image";

/// Image host protocol spoken by the uploader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadHost {
    /// Gyazo `upload.cgi`: anonymous, no credentials
    #[default]
    Gyazo,
    /// Imgur API v3: needs an application client id
    Imgur,
}

impl UploadHost {
    /// Endpoint used when `upload_endpoint` is not set
    pub fn default_endpoint(self) -> &'static str {
        match self {
            UploadHost::Gyazo => GYAZO_UPLOAD_ENDPOINT,
            UploadHost::Imgur => IMGUR_UPLOAD_ENDPOINT,
        }
    }
}

impl FromStr for UploadHost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gyazo" => Ok(UploadHost::Gyazo),
            "imgur" => Ok(UploadHost::Imgur),
            other => Err(format!("unknown upload host {:?} (expected gyazo or imgur)", other)),
        }
    }
}

impl fmt::Display for UploadHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadHost::Gyazo => write!(f, "gyazo"),
            UploadHost::Imgur => write!(f, "imgur"),
        }
    }
}

/// Density at or above which a capture counts as retina (2x of 72 dpi)
pub const DEFAULT_RETINA_DPI: f64 = 144.0;

/// Settings that are not part of the command line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which upload protocol to speak
    pub host:              UploadHost,
    /// Overrides the host's default endpoint
    pub upload_endpoint:   Option<String>,
    /// Imgur application client id
    pub imgur_client_id:   Option<String>,
    /// Gyazo device id sent with uploads, if any
    pub gyazo_id:          Option<String>,
    /// Interactive capture utility, invoked as `<cmd> -i <path>`
    pub capture_command:   String,
    /// Clipboard utility fed through stdin
    pub clipboard_command: String,
    /// URL opener, invoked as `<cmd> <url>...`
    pub open_command:      String,
    /// Retina threshold in dots per inch
    pub retina_dpi:        f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host:              UploadHost::default(),
            upload_endpoint:   None,
            imgur_client_id:   None,
            gyazo_id:          None,
            capture_command:   "screencapture".to_string(),
            clipboard_command: "pbcopy".to_string(),
            open_command:      "open".to_string(),
            retina_dpi:        DEFAULT_RETINA_DPI,
        }
    }
}

impl Settings {
    /// Endpoint uploads are sent to
    pub fn endpoint(&self) -> &str {
        self.upload_endpoint
            .as_deref()
            .unwrap_or_else(|| self.host.default_endpoint())
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snapup").join("config.json"))
    }

    /// Loads settings from `path` (or the default location) plus environment
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> SnapResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Parses a JSON settings file
    pub fn from_file(path: &Path) -> SnapResult<Self> {
        debug!("Loading settings from {:?}", path);
        let raw = fs::read_to_string(path).map_err(|e| SnapError::ConfigError {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| SnapError::ConfigError {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Overrides fields from `SNAPUP_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SNAPUP_HOST") {
            match v.parse() {
                Ok(host) => self.host = host,
                Err(e) => warn!("Ignoring SNAPUP_HOST: {}", e),
            }
        }
        if let Ok(v) = std::env::var("SNAPUP_UPLOAD_URL") {
            if !v.trim().is_empty() {
                self.upload_endpoint = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SNAPUP_IMGUR_CLIENT_ID") {
            if !v.trim().is_empty() {
                self.imgur_client_id = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SNAPUP_GYAZO_ID") {
            if !v.trim().is_empty() {
                self.gyazo_id = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SNAPUP_CAPTURE_CMD") {
            self.capture_command = v;
        }
        if let Ok(v) = std::env::var("SNAPUP_CLIPBOARD_CMD") {
            self.clipboard_command = v;
        }
        if let Ok(v) = std::env::var("SNAPUP_OPEN_CMD") {
            self.open_command = v;
        }
        if let Ok(v) = std::env::var("SNAPUP_RETINA_DPI") {
            match v.parse::<f64>() {
                Ok(dpi) if dpi > 0.0 => self.retina_dpi = dpi,
                _ => warn!("Ignoring invalid SNAPUP_RETINA_DPI value {:?}", v),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ALL_VARS: [&str; 8] = [
        "SNAPUP_UPLOAD_URL",
        "SNAPUP_IMGUR_CLIENT_ID",
        "SNAPUP_CAPTURE_CMD",
        "SNAPUP_CLIPBOARD_CMD",
        "SNAPUP_OPEN_CMD",
        "SNAPUP_RETINA_DPI",
        "SNAPUP_HOST",
        "SNAPUP_GYAZO_ID",
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.host, UploadHost::Gyazo);
        assert_eq!(settings.endpoint(), GYAZO_UPLOAD_ENDPOINT);
        assert_eq!(settings.capture_command, "screencapture");
        assert_eq!(settings.clipboard_command, "pbcopy");
        assert_eq!(settings.open_command, "open");
        assert_eq!(settings.retina_dpi, 144.0);
        assert!(settings.imgur_client_id.is_none());
    }

    #[test]
    fn test_endpoint_follows_host_unless_overridden() {
        let mut settings = Settings {
            host: UploadHost::Imgur,
            ..Settings::default()
        };
        assert_eq!(settings.endpoint(), IMGUR_UPLOAD_ENDPOINT);

        settings.upload_endpoint = Some("http://localhost:8080/upload".to_string());
        assert_eq!(settings.endpoint(), "http://localhost:8080/upload");
    }

    #[test]
    fn test_host_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host": "imgur", "imgur_client_id": "abc"}}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.host, UploadHost::Imgur);
        assert_eq!(settings.endpoint(), IMGUR_UPLOAD_ENDPOINT);
    }

    #[test]
    fn test_host_parse() {
        assert_eq!("Imgur".parse::<UploadHost>(), Ok(UploadHost::Imgur));
        assert_eq!(" gyazo ".parse::<UploadHost>(), Ok(UploadHost::Gyazo));
        assert!("flickr".parse::<UploadHost>().is_err());
        assert_eq!(UploadHost::Imgur.to_string(), "imgur");
    }

    #[test]
    fn test_from_file_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"imgur_client_id": "abc123", "open_command": "xdg-open"}}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.imgur_client_id.as_deref(), Some("abc123"));
        assert_eq!(settings.open_command, "xdg-open");
        assert_eq!(settings.capture_command, "screencapture");
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = Settings::from_file(file.path());
        assert!(matches!(result, Err(SnapError::ConfigError { .. })));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        temp_env::with_vars(unset_all(), || {
            let result = Settings::load(Some(Path::new("/definitely/not/here.json")));
            assert!(matches!(result, Err(SnapError::ConfigError { .. })));
        });
    }

    #[test]
    fn test_env_overrides() {
        let mut vars = unset_all();
        vars[1] = ("SNAPUP_IMGUR_CLIENT_ID", Some("env-id"));
        vars[4] = ("SNAPUP_OPEN_CMD", Some("xdg-open"));
        vars[5] = ("SNAPUP_RETINA_DPI", Some("192"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            settings.apply_env();
            assert_eq!(settings.imgur_client_id.as_deref(), Some("env-id"));
            assert_eq!(settings.open_command, "xdg-open");
            assert_eq!(settings.retina_dpi, 192.0);
        });
    }

    #[test]
    fn test_env_host_and_endpoint() {
        let mut vars = unset_all();
        vars[0] = ("SNAPUP_UPLOAD_URL", Some("http://127.0.0.1:1/up"));
        vars[6] = ("SNAPUP_HOST", Some("imgur"));
        vars[7] = ("SNAPUP_GYAZO_ID", Some("device"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            settings.apply_env();
            assert_eq!(settings.host, UploadHost::Imgur);
            assert_eq!(settings.endpoint(), "http://127.0.0.1:1/up");
            assert_eq!(settings.gyazo_id.as_deref(), Some("device"));
        });
    }

    #[test]
    fn test_env_unknown_host_ignored() {
        let mut vars = unset_all();
        vars[6] = ("SNAPUP_HOST", Some("flickr"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            settings.apply_env();
            assert_eq!(settings.host, UploadHost::Gyazo);
        });
    }

    #[test]
    fn test_env_invalid_dpi_ignored() {
        let mut vars = unset_all();
        vars[5] = ("SNAPUP_RETINA_DPI", Some("lots"));

        temp_env::with_vars(vars, || {
            let mut settings = Settings::default();
            settings.apply_env();
            assert_eq!(settings.retina_dpi, DEFAULT_RETINA_DPI);
        });
    }
}
