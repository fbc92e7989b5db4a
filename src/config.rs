use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualStarConfig {
    pub canvas_width: f32,
    pub min_height: f32,
    pub gateway_y: f32,
    pub switch_y: f32,
    pub switch_a_ratio: f32,
    pub switch_b_ratio: f32,
    pub leaf_start_y: f32,
    pub row_height: f32,
    /// Horizontal slot per device, node plus gap.
    pub slot_width: f32,
    /// Total horizontal margin kept free of devices.
    pub side_margin: f32,
    pub bottom_padding: f32,
    /// Draw declared device-to-device connections as A/B curve pairs.
    pub show_logical_links: bool,
}

impl Default for DualStarConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            min_height: 600.0,
            gateway_y: 80.0,
            switch_y: 200.0,
            switch_a_ratio: 0.25,
            switch_b_ratio: 0.75,
            leaf_start_y: 350.0,
            row_height: 120.0,
            slot_width: 140.0,
            side_margin: 100.0,
            bottom_padding: 50.0,
            show_logical_links: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub base_radius: f32,
    pub radius_step: f32,
    pub max_radius: f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 600.0,
            center_x: 600.0,
            center_y: 300.0,
            base_radius: 150.0,
            radius_step: 10.0,
            max_radius: 250.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedConfig {
    pub viewport_width: f32,
    /// Share of the viewport the canvas may occupy.
    pub viewport_fill: f32,
    pub gateway_y: f32,
    pub switch_y: f32,
    pub box_y: f32,
    pub leaf_y: f32,
    /// Switch distance from the centre line as a share of canvas width.
    pub switch_offset_ratio: f32,
    pub edge_margin: f32,
    /// Share of leftover slot width used to pull a group off the slot edge.
    pub centering_share: f32,
    pub bottom_padding: f32,
    /// Bow applied to the two box uplinks so they separate visually.
    pub uplink_offset: f32,
}

impl Default for MixedConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1920.0,
            viewport_fill: 0.98,
            gateway_y: 50.0,
            switch_y: 160.0,
            box_y: 280.0,
            leaf_y: 400.0,
            switch_offset_ratio: 0.3,
            edge_margin: 10.0,
            centering_share: 0.15,
            bottom_padding: 100.0,
            uplink_offset: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub min_columns: usize,
    pub max_columns: usize,
    pub target_columns: usize,
    pub min_scale: f32,
    pub device_width: f32,
    pub device_height: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    pub fallback_columns: usize,
    pub fallback_scale: f32,
}

impl OptimizerConfig {
    pub fn unit_width(&self) -> f32 {
        self.device_width + self.gap_x
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_columns: 18,
            max_columns: 30,
            target_columns: 20,
            min_scale: 0.35,
            device_width: 125.0,
            device_height: 80.0,
            gap_x: 15.0,
            gap_y: 30.0,
            fallback_columns: 10,
            fallback_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Perpendicular bow of each curve in an A/B pair.
    pub dual_offset: f32,
    /// Horizontal distance from a box centre to its entry and exit lanes.
    pub lane_offset: f32,
    pub vertical_clearance: f32,
    /// Distance kept between the exit corridor and the outermost device.
    pub outer_margin: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            dual_offset: 8.0,
            lane_offset: 25.0,
            vertical_clearance: 60.0,
            outer_margin: 100.0,
        }
    }
}

/// Naming conventions used to pair ring devices with their redundancy box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Regexes matched against the upper-cased leaf name.
    pub leaf_a_pattern: String,
    pub leaf_b_pattern: String,
    /// Suffix markers that tag an owner unambiguously.
    pub owner_a_marker: String,
    pub owner_b_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            leaf_a_pattern: r"RING[ _]?A".to_string(),
            leaf_b_pattern: r"RING[ _]?B".to_string(),
            owner_a_marker: "_A".to_string(),
            owner_b_marker: "_B".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub dual_star: DualStarConfig,
    pub ring: RingConfig,
    pub mixed: MixedConfig,
    pub optimizer: OptimizerConfig,
    pub routing: RoutingConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            background: "#0f172a".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::control_room();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_fill: Option<String>,
    text_color: Option<String>,
    network_a_color: Option<String>,
    network_b_color: Option<String>,
    ring_color: Option<String>,
    ring_entry_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    viewport_width: Option<f32>,
    canvas_width: Option<f32>,
    show_logical_links: Option<bool>,
    min_columns: Option<usize>,
    max_columns: Option<usize>,
    target_columns: Option<usize>,
    min_scale: Option<f32>,
    ring_max_radius: Option<f32>,
    classifier: Option<ClassifierFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifierFile {
    leaf_a_pattern: Option<String>,
    leaf_b_pattern: Option<String>,
    owner_a_marker: Option<String>,
    owner_b_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "light" {
            config.theme = Theme::light();
        } else if theme_name == "dark" || theme_name == "default" {
            config.theme = Theme::control_room();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.network_a_color {
            config.theme.network_a_color = v;
        }
        if let Some(v) = vars.network_b_color {
            config.theme.network_b_color = v;
        }
        if let Some(v) = vars.ring_color {
            config.theme.ring_color = v;
        }
        if let Some(v) = vars.ring_entry_color {
            config.theme.ring_entry_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.viewport_width {
            target.mixed.viewport_width = v;
        }
        if let Some(v) = layout.canvas_width {
            target.dual_star.canvas_width = v;
            target.ring.canvas_width = v;
            target.ring.center_x = v / 2.0;
        }
        if let Some(v) = layout.show_logical_links {
            target.dual_star.show_logical_links = v;
        }
        if let Some(v) = layout.min_columns {
            target.optimizer.min_columns = v;
        }
        if let Some(v) = layout.max_columns {
            target.optimizer.max_columns = v;
        }
        if let Some(v) = layout.target_columns {
            target.optimizer.target_columns = v;
        }
        if let Some(v) = layout.min_scale {
            target.optimizer.min_scale = v;
        }
        if let Some(v) = layout.ring_max_radius {
            target.ring.max_radius = v;
        }
        if let Some(classifier) = layout.classifier {
            if let Some(v) = classifier.leaf_a_pattern {
                target.classifier.leaf_a_pattern = v;
            }
            if let Some(v) = classifier.leaf_b_pattern {
                target.classifier.leaf_b_pattern = v;
            }
            if let Some(v) = classifier.owner_a_marker {
                target.classifier.owner_a_marker = v;
            }
            if let Some(v) = classifier.owner_b_marker {
                target.classifier.owner_b_marker = v;
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.optimizer.min_columns, 18);
        assert_eq!(config.layout.optimizer.unit_width(), 140.0);
        assert_eq!(config.render.background, config.theme.background);
    }

    #[test]
    fn applies_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{
                "theme": "light",
                "themeVariables": {{ "ringColor": "#ff00ff" }},
                "layout": {{
                    "viewportWidth": 2560,
                    "canvasWidth": 1400,
                    "showLogicalLinks": true,
                    "classifier": {{ "leafAPattern": "LOOP[_]?1" }}
                }}
            }}"##
        )
        .unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.theme.ring_color, "#ff00ff");
        assert_eq!(config.theme.background, "#FFFFFF");
        assert_eq!(config.layout.mixed.viewport_width, 2560.0);
        assert_eq!(config.layout.ring.center_x, 700.0);
        assert!(config.layout.dual_star.show_logical_links);
        assert_eq!(config.layout.classifier.leaf_a_pattern, "LOOP[_]?1");
        assert_eq!(config.layout.classifier.leaf_b_pattern, r"RING[ _]?B");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/definitely/not/here.json"))).is_err());
    }
}
