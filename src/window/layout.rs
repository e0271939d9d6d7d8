use serde::{Deserialize, Serialize};

/// Visibility state of a pane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowState {
    /// `SPLIT` is what older databases stored for a visible pane.
    #[default]
    #[serde(alias = "SPLIT")]
    Visible,
    Minimised,
    Closed,
}

impl WindowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowState::Visible => "VISIBLE",
            WindowState::Minimised => "MINIMISED",
            WindowState::Closed => "CLOSED",
        }
    }

    /// Parse a persisted state string. Unknown values fall back to visible.
    pub fn from_persisted(value: &str) -> Self {
        match value {
            "VISIBLE" | "SPLIT" => WindowState::Visible,
            "MINIMISED" => WindowState::Minimised,
            "CLOSED" => WindowState::Closed,
            other => {
                log::warn!("Unknown window state {:?}, treating as visible", other);
                WindowState::Visible
            }
        }
    }
}

pub const DEFAULT_WEIGHT: f32 = 1.0;

fn default_weight() -> f32 {
    DEFAULT_WEIGHT
}

/// Persisted form of a pane layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowLayoutEntity {
    pub state: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Visibility state plus relative size weight of one pane.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowLayout {
    pub state: WindowState,
    weight: f32,
}

impl Default for WindowLayout {
    fn default() -> Self {
        Self {
            state: WindowState::Visible,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl WindowLayout {
    pub fn new(state: WindowState, weight: f32) -> Self {
        Self {
            state,
            weight: sanitize_weight(weight),
        }
    }

    pub fn from_entity(entity: &WindowLayoutEntity) -> Self {
        Self::new(WindowState::from_persisted(&entity.state), entity.weight)
    }

    pub fn to_entity(&self) -> WindowLayoutEntity {
        WindowLayoutEntity {
            state: self.state.as_str().to_string(),
            weight: self.weight,
        }
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Set the weight. Returns false (and keeps the old value) for weights that are not positive.
    pub fn set_weight(&mut self, weight: f32) -> bool {
        if !is_valid_weight(weight) {
            return false;
        }
        self.weight = weight;
        true
    }

    pub fn is_visible_state(&self) -> bool {
        !matches!(self.state, WindowState::Minimised | WindowState::Closed)
    }
}

pub fn is_valid_weight(weight: f32) -> bool {
    weight.is_finite() && weight > 0.0
}

fn sanitize_weight(weight: f32) -> f32 {
    if is_valid_weight(weight) {
        weight
    } else {
        log::warn!("Invalid window weight {}, using {}", weight, DEFAULT_WEIGHT);
        DEFAULT_WEIGHT
    }
}
