use serde::{Deserialize, Serialize};
use stagecraft_common::{Color, ColorError};
use stagecraft_render_wgpu::ToneMapping;
use std::path::{Path, PathBuf};

/// Errors from loading renderer options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read options file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("unknown tone mapping {0:?}, expected \"none\" or \"linear\"")]
    ToneMapping(String),
}

/// Renderer and window settings. Each stage supplies its own defaults; an
/// options file may override any subset of them.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    /// 4x multisampling when set.
    pub antialias: bool,
    pub clear_color: Color,
    /// Upper bound on the device pixel ratio, `None` to use the device ratio.
    pub max_pixel_ratio: Option<f64>,
    /// Multiplier on lit color; only applies under tone mapping.
    pub exposure: f32,
    pub tone_mapping: ToneMapping,
    /// Initial window size in logical pixels.
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: Color::BLACK,
            max_pixel_ratio: None,
            exposure: 1.0,
            tone_mapping: ToneMapping::None,
            window_width: 1280,
            window_height: 720,
            vsync: true,
        }
    }
}

/// On-disk form: every field optional, colors as hex strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OptionsFile {
    antialias: Option<bool>,
    clear_color: Option<String>,
    max_pixel_ratio: Option<f64>,
    exposure: Option<f32>,
    tone_mapping: Option<String>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    vsync: Option<bool>,
}

impl RendererOptions {
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    /// Override fields present in the JSON document.
    pub fn merge_json(mut self, json: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = serde_json::from_str(json)?;
        if let Some(v) = file.antialias {
            self.antialias = v;
        }
        if let Some(v) = file.clear_color {
            self.clear_color = Color::parse(&v)?;
        }
        if let Some(v) = file.max_pixel_ratio {
            self.max_pixel_ratio = (v > 0.0).then_some(v);
        }
        if let Some(v) = file.exposure {
            self.exposure = v;
        }
        if let Some(v) = file.tone_mapping {
            self.tone_mapping = match v.as_str() {
                "none" => ToneMapping::None,
                "linear" => ToneMapping::Linear,
                _ => return Err(ConfigError::ToneMapping(v)),
            };
        }
        if let Some(v) = file.window_width {
            self.window_width = v.max(1);
        }
        if let Some(v) = file.window_height {
            self.window_height = v.max(1);
        }
        if let Some(v) = file.vsync {
            self.vsync = v;
        }
        Ok(self)
    }

    /// Defaults overridden by the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::default().merge_file(Some(path))
    }

    /// Override from an options file when one is given.
    pub fn merge_file(self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(self);
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let merged = self.merge_json(&json)?;
        tracing::info!(path = %path.display(), "loaded renderer options");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let opts = RendererOptions::default().merge_json("{}").unwrap();
        assert_eq!(opts, RendererOptions::default());
    }

    #[test]
    fn fields_override_individually() {
        let base = RendererOptions {
            exposure: 0.5,
            ..RendererOptions::default()
        };
        let opts = base
            .merge_json(r##"{ "clear_color": "#2c3e50", "antialias": false, "max_pixel_ratio": 2.0 }"##)
            .unwrap();
        assert_eq!(opts.clear_color, Color::from_hex(0x2c3e50));
        assert!(!opts.antialias);
        assert_eq!(opts.sample_count(), 1);
        assert_eq!(opts.max_pixel_ratio, Some(2.0));
        assert_eq!(opts.exposure, 0.5);
    }

    #[test]
    fn non_positive_ratio_removes_cap() {
        let base = RendererOptions {
            max_pixel_ratio: Some(2.0),
            ..RendererOptions::default()
        };
        let opts = base.merge_json(r#"{ "max_pixel_ratio": 0 }"#).unwrap();
        assert_eq!(opts.max_pixel_ratio, None);
    }

    #[test]
    fn bad_color_is_reported() {
        let err = RendererOptions::default()
            .merge_json(r#"{ "clear_color": "blue" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Color(_)));
    }

    #[test]
    fn tone_mapping_is_parsed() {
        let opts = RendererOptions::default()
            .merge_json(r#"{ "tone_mapping": "linear", "exposure": 0.5 }"#)
            .unwrap();
        assert_eq!(opts.tone_mapping, ToneMapping::Linear);
        assert_eq!(opts.exposure, 0.5);

        let err = RendererOptions::default()
            .merge_json(r#"{ "tone_mapping": "aces" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ToneMapping(ref name) if name == "aces"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RendererOptions::default()
            .merge_json(r#"{ "scene": [] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn merge_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "window_width": 640, "vsync": false }"#).unwrap();

        let opts = RendererOptions::default().merge_file(Some(&path)).unwrap();
        assert_eq!(opts.window_width, 640);
        assert!(!opts.vsync);

        let missing = RendererOptions::default().merge_file(Some(&dir.path().join("nope.json")));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        assert_eq!(
            RendererOptions::default().merge_file(None).unwrap(),
            RendererOptions::default()
        );
    }
}
