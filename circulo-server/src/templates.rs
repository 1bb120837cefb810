use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not render template {template}: {reason}")]
pub struct TemplateError {
    pub template: String,
    pub reason: String,
}

/// The presentation boundary. Receives a template identifier and a named
/// context mapping, returns rendered markup. The real club theme plugs in
/// here; the server never inspects the produced markup.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<String, TemplateError>;
}

/// Fallback engine that shows the template name and its context as a bare
/// page. Keeps the site inspectable while the theme lives elsewhere.
pub struct DevTemplateEngine;

impl TemplateEngine for DevTemplateEngine {
    fn render(&self, template: &str, context: &Value) -> Result<String, TemplateError> {
        let pretty = serde_json::to_string_pretty(context).map_err(|e| TemplateError {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>{template}</title></head>\n<body>\n<h1>{template}</h1>\n<pre>{}</pre>\n</body>\n</html>\n",
            escape_html(&pretty)
        ))
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dev_engine_escapes_content() {
        let markup = DevTemplateEngine
            .render("main/home", &json!({ "title": "<script>alert(1)</script>" }))
            .unwrap();

        assert!(markup.contains("main/home"));
        assert!(markup.contains("&lt;script&gt;"));
        assert!(!markup.contains("<script>"));
    }
}
