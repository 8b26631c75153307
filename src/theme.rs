use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub label_color: String,
    pub axis_color: String,
    pub grid_color: String,
    pub connector_color: String,
    pub background: String,
    /// Fill for bars of a chart without dimensions.
    pub standalone_color: String,
    pub baseline_color: String,
    pub total_color: String,
}

impl Theme {
    pub fn looker() -> Self {
        Self {
            font_family: "Roboto, \"Noto Sans\", sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#3a4245".to_string(),
            label_color: "#333333".to_string(),
            axis_color: "#000000".to_string(),
            grid_color: "#E6E6E6".to_string(),
            connector_color: "lightgrey".to_string(),
            background: "#FFFFFF".to_string(),
            standalone_color: "#369dc1".to_string(),
            baseline_color: "#7f8c99".to_string(),
            total_color: "steelblue".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#1C2430".to_string(),
            label_color: "#1C2430".to_string(),
            axis_color: "#7A8AA6".to_string(),
            grid_color: "#EEF2F8".to_string(),
            connector_color: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
            standalone_color: "#4e79a7".to_string(),
            baseline_color: "#8C99AD".to_string(),
            total_color: "#2F5D8A".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::looker()
    }
}
