// driftwatch-core/src/infrastructure/template/jinja.rs

// minijinja environment holding the embedded report templates. Templates
// ending in `.html` are auto-escaped.

use minijinja::Environment;

use crate::application::ports::TemplateEngine;
use crate::error::DriftwatchError;
use crate::infrastructure::error::InfrastructureError;

pub const REPORT_TEMPLATE: &str = "report.html";

pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> Result<Self, InfrastructureError> {
        let mut env = Environment::new();
        env.add_template(REPORT_TEMPLATE, include_str!("../../../templates/report.html"))?;

        env.add_filter("percent", |value: f64| format!("{:.1}%", value * 100.0));

        Ok(Self { env })
    }

    /// Registers an extra template, replacing any template with that name.
    pub fn with_template(
        mut self,
        name: &'static str,
        source: &'static str,
    ) -> Result<Self, InfrastructureError> {
        self.env.add_template(name, source)?;
        Ok(self)
    }
}

impl TemplateEngine for JinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, DriftwatchError> {
        let tmpl = self
            .env
            .get_template(template)
            .map_err(InfrastructureError::TemplateError)?;
        let rendered = tmpl.render(context).map_err(InfrastructureError::TemplateError)?;
        Ok(rendered)
    }
}
