use crate::config::BrandingConfig;

use super::{dashboard_page, escape};

pub fn home_page(branding: &BrandingConfig, email: Option<&str>) -> String {
    let greeting = match email {
        Some(email) => format!("<p class=\"hint\">Conectado como {}</p>", escape(email)),
        None => String::new(),
    };
    let body = format!(
        r#"<div class="card">
  <h1>Bem-vindo ao Dashboard!</h1>
  <p>Selecione uma opção no menu lateral para começar.</p>
  {}
</div>"#,
        greeting
    );
    dashboard_page(branding, "/dashboard", "Dashboard", &body)
}
