//! Tera composition engine — [`PromptComposer`].
//!
//! Templates are baked into the binary via `include_str!`; a user override
//! directory may replace any of them by relative name. Rendering is pure:
//! identical contexts always produce identical text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::{
    to_tera_context, CascadeCtx, CascadeOnlyCtx, DirectInstructionCtx, EditReviewCtx,
};
use crate::error::{io_err, RenderError};

// ---------------------------------------------------------------------------
// Embedded templates
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "prompts/direct_instruction.tera",
        include_str!("templates/direct_instruction.tera"),
    ),
    (
        "prompts/edit_review.tera",
        include_str!("templates/edit_review.tera"),
    ),
    (
        "prompts/cascade_context.tera",
        include_str!("templates/cascade_context.tera"),
    ),
];

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// PromptComposer
// ---------------------------------------------------------------------------

/// Deterministic renderer for regeneration-service instruction payloads.
///
/// Create once with [`PromptComposer::new`] and reuse; it holds no mutable
/// state and never touches the network.
pub struct PromptComposer {
    tera: Tera,
}

impl PromptComposer {
    /// Construct with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Construct with embedded templates plus any `.tera` overrides found in
    /// `user_template_dir`.
    pub fn with_overrides(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(PromptComposer {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Render a direct-instruction prompt: user free text + entity context +
    /// (truncated) current content.
    pub fn direct_instruction(&self, ctx: &DirectInstructionCtx) -> Result<String, RenderError> {
        self.render("prompts/direct_instruction.tera", ctx)
    }

    /// Render an edit-review prompt: diff payload + corrections +
    /// instruction block.
    pub fn edit_review(&self, ctx: &EditReviewCtx) -> Result<String, RenderError> {
        self.render("prompts/edit_review.tera", ctx)
    }

    /// Render the cascade-context appendix on its own.
    pub fn cascade_context(&self, cascade: &CascadeCtx) -> Result<String, RenderError> {
        self.render(
            "prompts/cascade_context.tera",
            &CascadeOnlyCtx {
                cascade: cascade.clone(),
            },
        )
    }

    fn render<T: serde::Serialize>(&self, name: &str, ctx: &T) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(ctx)?;
        let rendered = self.tera.render(name, &tera_ctx)?;
        Ok(rendered.trim_end().to_string())
    }
}
