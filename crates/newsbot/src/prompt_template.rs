use include_dir::{include_dir, Dir};
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the prompt templates bundled with the crate
pub fn load_prompt_file<T: Serialize>(
    template_file: &str,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_content = PROMPTS_DIR
        .get_file(template_file)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Unknown prompt template: {}", template_file)))?;

    load_prompt(template_content, context_data)
        .map(|rendered| rendered.trim().to_string())
}
