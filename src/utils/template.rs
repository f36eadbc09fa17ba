use handlebars::{Handlebars, handlebars_helper, no_escape};
use serde::Serialize;
use serde_json::{self, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TEngineError {
    #[error("Template error")]
    TemplateError(#[from] handlebars::TemplateError),
    #[error("Render error")]
    RenderError(#[from] handlebars::RenderError),
}

/// Prompt template engine. HTML escaping is off: prompts are plain text.
pub struct TEngine {
    handlebars: Handlebars<'static>,
}

impl Default for TEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TEngine {
    pub fn new() -> Self {
        let mut te = TEngine {
            handlebars: Handlebars::new(),
        };
        handlebars_helper!(obj: |v: Value| serde_json::to_string(&v).unwrap_or_default());
        te.handlebars.set_strict_mode(true);
        te.handlebars.register_escape_fn(no_escape);
        te.handlebars.register_helper("verbatim", Box::new(obj));
        te
    }

    pub fn register_template_string(
        &mut self,
        name: &str,
        template: &str,
    ) -> Result<(), TEngineError> {
        self.handlebars.register_template_string(name, template)?;
        Ok(())
    }

    /// Render a template previously registered under `name`.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TEngineError> {
        Ok(self.handlebars.render(name, data)?)
    }
}
