//! HTML templates, compiled into the binary.

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

use crate::error::Result;

fn source(name: &str) -> Option<&'static str> {
    match name {
        "base.html" => Some(include_str!("../../templates/base.html")),
        "attach.html" => Some(include_str!("../../templates/attach.html")),
        "view.html" => Some(include_str!("../../templates/view.html")),
        "confirmation.html" => Some(include_str!("../../templates/confirmation.html")),
        "error.html" => Some(include_str!("../../templates/error.html")),
        _ => None,
    }
}

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        // `.html` names get HTML auto-escaping by default.
        env.set_loader(|name| Ok(source(name).map(str::to_owned)));
        env
    })
}

/// Render a template with the given context.
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String> {
    let template = environment().get_template(name)?;
    Ok(template.render(ctx)?)
}
