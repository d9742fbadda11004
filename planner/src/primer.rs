//! System primer installed into a backend's context.

use std::path::{Path, PathBuf};

use crate::error::PlannerError;

/// Files the primer is built from.
#[derive(Debug, Clone)]
pub struct ContextSources {
    /// Schema the documents must conform to.
    pub schema: PathBuf,
    /// Text description of the operating area layout.
    pub layout: PathBuf,
    /// Optional image of the operating area, for multimodal models.
    pub image: Option<PathBuf>,
}

impl ContextSources {
    /// Schema and layout without an image.
    #[must_use]
    pub const fn new(schema: PathBuf, layout: PathBuf) -> Self {
        Self {
            schema,
            layout,
            image: None,
        }
    }

    /// Adds an image for multimodal priming.
    #[must_use]
    pub fn with_image(mut self, image: PathBuf) -> Self {
        self.image = Some(image);
        self
    }

    /// Reads both files and renders the primer.
    pub fn load_primer(&self, fence_tag: &str) -> Result<String, PlannerError> {
        let schema = read(&self.schema)?;
        let layout = read(&self.layout)?;
        Ok(build_primer(&schema, &layout, fence_tag))
    }
}

fn read(path: &Path) -> Result<String, PlannerError> {
    std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders the primer text.
#[must_use]
pub fn build_primer(schema: &str, layout: &str, fence_tag: &str) -> String {
    format!(
        "You translate mission requests into mission plans.\n\
         Answer with exactly one complete document inside a ```{fence_tag} fenced block.\n\
         The document must validate against this schema:\n\n\
         {schema}\n\n\
         Layout of the operating area:\n\n\
         {layout}\n\n\
         When a message reports validation errors, correct your previous document \
         and answer again with the complete corrected document."
    )
}
