//! Rendering service
//!
//! Templates are embedded in the binary and compiled once at startup into a
//! [`Renderer`], which is passed to the handlers through application state.
//! A template that fails to parse aborts startup instead of failing requests.
//!
//! Registered filters:
//! - `date3339`: stored `YYYY-MM-DD HH:MM:SS` timestamp to RFC 3339
//! - `markdown`: Markdown source to an HTML fragment (combine with `safe`)

use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::models::{parse_timestamp, to_rfc3339};
use crate::services::markdown::render_markdown;

mod error;

pub use error::ThemeError;

/// Templates shipped with the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
#[include = "*.xml"]
struct EmbeddedTemplates;

/// Compiled templates plus the filters they use
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Compile the embedded templates
    pub fn new() -> Result<Self, ThemeError> {
        let mut templates = Vec::new();
        for name in EmbeddedTemplates::iter() {
            let file = EmbeddedTemplates::get(&name).ok_or_else(|| ThemeError::LoadError {
                name: name.to_string(),
                reason: "listed but not embedded".to_string(),
            })?;
            let content =
                String::from_utf8(file.data.into_owned()).map_err(|e| ThemeError::LoadError {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
            templates.push((name.to_string(), content));
        }

        let renderer = Self::from_templates(templates)?;
        tracing::info!(
            "Loaded {} templates",
            renderer.tera.get_template_names().count()
        );
        Ok(renderer)
    }

    /// Compile an explicit set of `(name, source)` templates
    pub fn from_templates<I>(templates: I) -> Result<Self, ThemeError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_markup);
        register_filters(&mut tera);

        // Inheritance chains are built once every template is in
        tera.add_raw_templates(templates).map_err(|e| ThemeError::LoadError {
            name: "templates".to_string(),
            reason: error_chain(&e),
        })?;

        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ThemeError> {
        self.tera.render(template, context).map_err(|e| {
            ThemeError::TemplateError(format!("Failed to render '{}': {}", template, error_chain(&e)))
        })
    }

    /// Render the error page, degrading to a bare page if that fails too
    pub fn render_error_page(&self, status: u16, message: &str) -> String {
        let mut context = TeraContext::new();
        context.insert("status", &status);
        context.insert("message", message);

        match self.render("error.html", &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Error page failed to render: {}", e);
                simple_error_page(status, message)
            }
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }
}

/// Escape for HTML and XML text and attribute values
fn escape_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
    output
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("date3339", date3339_filter);
    tera.register_filter("markdown", markdown_filter);
}

fn date3339_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("date3339 expects a string"))?;
    let parsed = parse_timestamp(raw)
        .map_err(|e| tera::Error::msg(format!("date3339: invalid date '{}': {}", raw, e)))?;
    Ok(Value::String(to_rfc3339(&parsed)))
}

fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    if value.is_null() {
        return Ok(Value::String(String::new()));
    }
    let source = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("markdown expects a string"))?;
    Ok(Value::String(render_markdown(source)))
}

fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn simple_error_page(status: u16, message: &str) -> String {
    let escaped = escape_markup(message);
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"UTF-8\"><title>{status}</title></head>\
         <body><h1>{status}</h1><p>{escaped}</p></body></html>"
    )
}
