//! Server-rendered HTML for the dashboard. Pages are built with `format!`;
//! every value that came from a user or the database goes through `escape`.

use axum::http::StatusCode;

pub mod cadernos;
pub mod dashboard;
pub mod layout;
pub mod login;
pub mod noticias;

pub use layout::{dashboard_page, standalone_page};

/// Whether a form creates a row or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// HTML-escape text for element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Banner for a `?message=` flash, empty when there is none
pub fn flash(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<div class="flash" role="status">{}</div>"#, escape(message)),
        None => String::new(),
    }
}

pub(crate) fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

pub(crate) fn selected(on: bool) -> &'static str {
    if on {
        " selected"
    } else {
        ""
    }
}

/// A POST form rendered as a single button, with an optional confirm prompt
pub(crate) fn action_button(action: &str, label: &str, class: &str, confirm: Option<&str>) -> String {
    let onsubmit = match confirm {
        Some(prompt) => format!(r#" onsubmit="return confirm('{}');""#, escape(&prompt.replace('\'', "\\'"))),
        None => String::new(),
    };
    format!(
        r#"<form method="post" action="{}" class="inline"{}><button type="submit" class="{}">{}</button></form>"#,
        escape(action),
        onsubmit,
        class,
        escape(label)
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="card error-card">
  <h1>{}</h1>
  <p>{}</p>
  <p><a href="/dashboard">Voltar ao painel</a></p>
</div>"#,
        status.as_u16(),
        escape(message)
    );
    standalone_page("Erro", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape("Notícia"), "Notícia");
    }

    #[test]
    fn test_flash_and_error_page() {
        assert_eq!(flash(None), "");
        assert!(flash(Some("<b>ok</b>")).contains("&lt;b&gt;ok&lt;/b&gt;"));

        let html = error_page(StatusCode::NOT_FOUND, "Caderno não encontrado.");
        assert!(html.contains("404"));
        assert!(html.contains("Caderno não encontrado."));
    }

    #[test]
    fn test_action_button_confirm() {
        let html = action_button("/dashboard/cadernos/3/delete", "Remover", "danger", Some("Tem certeza?"));
        assert!(html.contains(r#"action="/dashboard/cadernos/3/delete""#));
        assert!(html.contains("return confirm('Tem certeza?');"));
    }
}
