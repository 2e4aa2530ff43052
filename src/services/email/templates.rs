//! Email template registry
//!
//! Templates are compiled into the binary and registered with the
//! rendering engine once at service construction. Adding a mail means
//! adding a variant, its subject, and its markup here.

use tera::Tera;

use super::EmailError;

/// Mails the application can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    Welcome,
}

impl EmailTemplate {
    /// Registry name of the template
    pub fn template_name(self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "welcome",
        }
    }

    /// Subject line for the rendered mail
    pub fn subject(self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "Welcome to Reelbox",
        }
    }
}

const WELCOME_HTML: &str = r#"<!doctype html>
<html>
  <body style="font-family: sans-serif; color: #1a1a1a;">
    <h1>Welcome, {{ name }}!</h1>
    <p>Your Reelbox account is ready. Share your first reel whenever you are.</p>
    <p>
      <a href="{{ home_url | default(value="https://reelbox.dev/home") }}">Open your feed</a>
    </p>
    <p style="color: #777; font-size: 12px;">
      You are receiving this because an account was created with this address.
    </p>
  </body>
</html>
"#;

/// Compiled template set
pub struct TemplateRegistry {
    tera: Tera,
}

impl TemplateRegistry {
    pub fn new() -> Result<Self, EmailError> {
        let mut tera = Tera::default();
        tera.add_raw_template(EmailTemplate::Welcome.template_name(), WELCOME_HTML)
            .map_err(|err| EmailError::template(err.to_string()))?;
        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(
        &self,
        template: EmailTemplate,
        context: &tera::Context,
    ) -> Result<String, EmailError> {
        self.tera
            .render(template.template_name(), context)
            .map_err(|err| EmailError::template(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_renders_with_name() {
        let registry = TemplateRegistry::new().unwrap();
        let mut context = tera::Context::new();
        context.insert("name", "Ada");

        let html = registry.render(EmailTemplate::Welcome, &context).unwrap();
        assert!(html.contains("Welcome, Ada!"));
        assert!(html.contains("https://reelbox.dev/home"));
    }

    #[test]
    fn missing_context_is_a_template_error() {
        let registry = TemplateRegistry::new().unwrap();
        let err = registry
            .render(EmailTemplate::Welcome, &tera::Context::new())
            .unwrap_err();
        assert!(matches!(err, EmailError::Template { .. }));
    }
}
