use std::sync::Arc;

use axum::response::Html;
use circulo_club::{Club, SqliteDatabase};
use serde_json::Value;

use crate::{
    errors::{ServerError, ServerResult},
    templates::TemplateEngine,
};

#[derive(Clone)]
pub struct ServerContext {
    pub club: Arc<Club<SqliteDatabase>>,
    pub templates: Arc<dyn TemplateEngine>,
}

impl ServerContext {
    pub fn new(club: Club<SqliteDatabase>, templates: Arc<dyn TemplateEngine>) -> Self {
        Self {
            club: Arc::new(club),
            templates,
        }
    }

    /// Renders a template with its named context mapping
    pub fn render(&self, template: &str, context: Value) -> ServerResult<Html<String>> {
        self.templates
            .render(template, &context)
            .map(Html)
            .map_err(|e| ServerError::Unknown(e.to_string()))
    }
}
