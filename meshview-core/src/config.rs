/// Window and loop settings for the two viewers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound on rendered frames per second.
    pub frame_rate: u32,
}

impl ViewerConfig {
    pub fn model_viewer() -> Self {
        Self {
            title: "Model Viewer".to_string(),
            width: 900,
            height: 900,
            frame_rate: 100,
        }
    }

    pub fn bunny_viewer() -> Self {
        Self {
            title: "Bunny Viewer".to_string(),
            width: 500,
            height: 500,
            frame_rate: 100,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::model_viewer()
    }
}
