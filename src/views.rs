use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;

pub fn init_templates() -> Tera {
    Tera::new("templates/**/*.html").expect("Templates misconfigured!")
}

pub fn render(templates: &Tera, name: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(templates.render(name, context)?))
}
