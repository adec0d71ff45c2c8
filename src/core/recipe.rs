//! Pour-over recipes.
//!
//! A recipe is caller-owned configuration: how much coffee, how much water
//! relative to it, and the ordered pour steps. The engine only reads it.

use serde::{Deserialize, Serialize};

/// One pour step of a recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Label shown while the step is active ("Bloom", "First Pour", ...)
    pub name: String,
    /// Share of the total water poured during this step, in percent
    pub water_percentage: f64,
    /// How long the step lasts, in whole seconds
    pub duration: u32,
}

impl RecipeStep {
    pub fn new(name: impl Into<String>, water_percentage: f64, duration: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            water_percentage,
            duration,
        }
    }
}

/// A brew recipe.
///
/// The engine requires `steps` to be non-empty and every step duration to be
/// positive. Use [`Recipe::validate`] before handing a recipe over.
///
/// # Example
///
/// ```rust
/// use brew_engine::core::{Recipe, RecipeStep};
///
/// let recipe = Recipe::new(
///     15.0,
///     16.0,
///     vec![
///         RecipeStep::new("Bloom", 20.0, 45),
///         RecipeStep::new("First Pour", 40.0, 45),
///         RecipeStep::new("Second Pour", 40.0, 45),
///     ],
/// );
///
/// assert_eq!(recipe.total_water(), 240.0);
/// assert_eq!(recipe.step_water(0), 48.0);
/// assert_eq!(recipe.total_duration(), 135);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dose in grams
    pub bean_weight: f64,
    /// Water-to-bean multiplier (16 means 1:16)
    pub ratio: f64,
    /// Brew water temperature in Celsius, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub steps: Vec<RecipeStep>,
}

/// Identity of a recipe for swap detection.
///
/// Two recipes with the same id, name and step count are treated as the
/// same recipe being edited, so the running brew is left alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeSignature {
    pub id: Option<String>,
    pub name: Option<String>,
    pub step_count: usize,
}

impl Recipe {
    pub fn new(bean_weight: f64, ratio: f64, steps: Vec<RecipeStep>) -> Self {
        Self {
            id: None,
            name: None,
            bean_weight,
            ratio,
            temperature: None,
            steps,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Parse a recipe document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total brew water in grams: `bean_weight * ratio`.
    pub fn total_water(&self) -> f64 {
        self.bean_weight * self.ratio
    }

    /// Water poured during step `index`, in grams.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn step_water(&self, index: usize) -> f64 {
        self.total_water() * (self.steps[index].water_percentage / 100.0)
    }

    /// Sum of all step durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration)).sum()
    }

    /// Cumulative end time of each step, in seconds.
    ///
    /// `thresholds()[i]` is the sum of the durations of steps `0..=i`.
    pub fn thresholds(&self) -> Vec<f64> {
        self.steps
            .iter()
            .scan(0.0, |acc, step| {
                *acc += f64::from(step.duration);
                Some(*acc)
            })
            .collect()
    }

    pub fn signature(&self) -> RecipeSignature {
        RecipeSignature {
            id: self.id.clone(),
            name: self.name.clone(),
            step_count: self.steps.len(),
        }
    }
}

impl Default for Recipe {
    /// The standard V60 template: 15 g at 1:16, 93 °C, bloom plus two pours.
    fn default() -> Self {
        let mut steps = vec![
            RecipeStep::new("Bloom", 20.0, 45),
            RecipeStep::new("First Pour", 40.0, 45),
            RecipeStep::new("Second Pour", 40.0, 45),
        ];
        for (i, step) in steps.iter_mut().enumerate() {
            step.id = Some((i + 1).to_string());
        }
        Recipe::new(15.0, 16.0, steps).with_temperature(93.0)
    }
}
