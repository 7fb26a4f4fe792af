//! Simple variable substitution renderer.

use std::path::Path;

use svcgen_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{
        DomainValidator as validator, ProjectStructure, RelativePath, RenderContext, Template,
        TemplateContent, TemplateNode,
    },
    error::{ScaffoldError, ScaffoldResult},
};
use tracing::instrument;

/// Renderer using `{{VAR}}` substitution in both paths and file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(template = %template.id))]
    fn render(
        &self,
        template: &Template,
        context: &RenderContext,
        output_root: &Path,
    ) -> ScaffoldResult<ProjectStructure> {
        validator::validate_template(template).map_err(ScaffoldError::Domain)?;

        let mut structure = ProjectStructure::new(output_root);

        for node in &template.tree.nodes {
            let path = render_path(node.path(), context)?;
            match node {
                TemplateNode::File(spec) => {
                    let content = render_content(&spec.content, context);
                    structure.add_file(path.into_path_buf(), content, spec.permissions);
                }
                TemplateNode::Directory(spec) => {
                    structure.add_directory(path.into_path_buf(), spec.permissions);
                }
            }
        }

        // A substituted variable can produce duplicates or escaping paths.
        validator::validate_project_structure(&structure).map_err(ScaffoldError::Domain)?;

        Ok(structure)
    }
}

fn render_path(path: &RelativePath, ctx: &RenderContext) -> ScaffoldResult<RelativePath> {
    let rendered = ctx.render(path.as_str());
    if rendered.is_empty() {
        return Err(ApplicationError::RenderingFailed {
            reason: format!("path '{path}' renders to an empty string"),
        }
        .into());
    }
    RelativePath::try_new(rendered).map_err(ScaffoldError::Domain)
}

fn render_content(content: &TemplateContent, ctx: &RenderContext) -> String {
    match content {
        TemplateContent::Literal(source) => source.as_str().to_string(),
        TemplateContent::Parameterized(source) => ctx.render(source.as_str()),
    }
}
