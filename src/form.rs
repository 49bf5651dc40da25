use crate::{
    config::ApiKeyProfiles,
    error::{Result, SeedreamError},
    images::normalize_images,
    models::{AspectRatioChoice, Orientation, ResolvedSize},
    planner,
};

pub const DEFAULT_SIZE: &str = "3072*4096";
pub const DEFAULT_LONG_SIDE_INPUT: &str = "4096";

/// Everything the edit form holds between submits.
///
/// Ratio selection is stored as an index into the orientation's ratio table,
/// so flipping orientation keeps the counterpart ratio selected.
#[derive(Clone)]
pub struct FormState {
    prompt: String,
    images: Vec<String>,
    size: String,
    orientation: Orientation,
    selected_ratio: Option<usize>,
    long_side: String,
    api_key: String,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            prompt: String::new(),
            images: Vec::new(),
            size: DEFAULT_SIZE.to_string(),
            orientation: Orientation::Portrait,
            selected_ratio: None,
            long_side: DEFAULT_LONG_SIDE_INPUT.to_string(),
            api_key: String::new(),
        }
    }
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("prompt", &self.prompt)
            .field("images", &self.images.len())
            .field("size", &self.size)
            .field("orientation", &self.orientation)
            .field("selected_ratio", &self.selected_ratio_label())
            .field("long_side", &self.long_side)
            .field("api_key_set", &!self.api_key.trim().is_empty())
            .finish()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.set_prompt(prompt);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.add_image(image);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.set_size(size);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.set_api_key(api_key);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Raw image list, blanks included.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Image list as it would be sent: trimmed, blanks dropped.
    pub fn filtered_images(&self) -> Vec<String> {
        normalize_images(&self.images)
    }

    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
    }

    pub fn add_image(&mut self, image: impl Into<String>) {
        self.images.push(image.into());
    }

    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    /// Manual size entry; does not touch the ratio selection.
    pub fn set_size(&mut self, size: impl Into<String>) {
        self.size = size.into();
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn toggle_orientation(&mut self) {
        self.set_orientation(self.orientation.flipped());
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.recompute_size();
        }
    }

    pub fn available_ratios(&self) -> Vec<AspectRatioChoice> {
        planner::ratio_choices(self.orientation)
    }

    pub fn selected_ratio(&self) -> Option<AspectRatioChoice> {
        self.selected_ratio
            .and_then(|index| planner::ratio_at(self.orientation, index))
    }

    pub fn selected_ratio_label(&self) -> Option<String> {
        self.selected_ratio().map(|choice| choice.label)
    }

    /// Selects a ratio by its label in the current orientation and updates
    /// the size.
    pub fn select_ratio(&mut self, label: &str) -> Result<ResolvedSize> {
        let index = planner::find_ratio(self.orientation, label)
            .ok_or_else(|| SeedreamError::UnknownRatio(label.to_string()))?;
        self.selected_ratio = Some(index);
        let choice = planner::ratio_at(self.orientation, index)
            .ok_or_else(|| SeedreamError::UnknownRatio(label.to_string()))?;
        let size = planner::compute_size_for(&choice, &self.long_side);
        self.size = size.to_string();
        Ok(size)
    }

    pub fn long_side(&self) -> &str {
        &self.long_side
    }

    pub fn set_long_side(&mut self, long_side: impl Into<String>) {
        self.long_side = long_side.into();
        self.recompute_size();
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Switches to the token stored under `name`.
    pub fn use_profile(&mut self, name: &str, profiles: &ApiKeyProfiles) -> Result<()> {
        let token = profiles.get(name)?;
        self.api_key = token.to_string();
        log::info!("Using API key profile '{}'", name);
        Ok(())
    }

    fn recompute_size(&mut self) {
        if let Some(choice) = self.selected_ratio() {
            self.size = planner::compute_size_for(&choice, &self.long_side).to_string();
        }
    }
}
