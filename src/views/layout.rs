use crate::config::BrandingConfig;

use super::escape;

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: #f3f4f6; color: #1f2937; }
a { color: #2563eb; }
.shell { display: flex; min-height: 100vh; }
.sidebar { width: 16rem; background: #1f2937; color: #e5e7eb; padding: 1rem; display: flex; flex-direction: column; }
.sidebar .brand { text-align: center; margin: 1rem 0 2rem; }
.sidebar .brand img { height: 6rem; max-width: 100%; object-fit: contain; }
.sidebar .brand p { font-size: .875rem; margin-top: .5rem; }
.sidebar nav a { display: block; padding: .75rem; border-radius: .375rem; color: #e5e7eb; text-decoration: none; font-size: .875rem; }
.sidebar nav a:hover, .sidebar nav a.active { background: #374151; }
.sidebar .logout { margin-top: auto; }
main { flex: 1; padding: 2rem; overflow-y: auto; }
.card { background: #fff; border-radius: .5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); padding: 1.5rem; }
.error-card { max-width: 32rem; margin: 4rem auto; text-align: center; }
.flash { background: #dbeafe; border: 1px solid #93c5fd; padding: .75rem 1rem; border-radius: .375rem; margin-bottom: 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: .75rem; border-bottom: 1px solid #e5e7eb; text-align: left; vertical-align: middle; }
th { background: #f9fafb; font-size: .75rem; text-transform: uppercase; color: #6b7280; }
.badge { display: inline-block; padding: .125rem .5rem; border-radius: 9999px; font-size: .75rem; font-weight: 600; }
.badge.on { background: #d1fae5; color: #065f46; }
.badge.off { background: #fee2e2; color: #991b1b; }
.inline { display: inline; }
button, .button { cursor: pointer; border: 0; border-radius: .375rem; padding: .5rem 1rem; font-size: .875rem; background: #2563eb; color: #fff; text-decoration: none; display: inline-block; }
button.secondary, .button.secondary { background: #6b7280; }
button.danger { background: #dc2626; }
label { display: block; font-size: .875rem; font-weight: 500; margin-bottom: .25rem; }
input[type=text], input[type=email], input[type=password], select, textarea { width: 100%; padding: .5rem .75rem; border: 1px solid #d1d5db; border-radius: .375rem; }
textarea { min-height: 16rem; font-family: inherit; }
.field { margin-bottom: 1rem; }
.hint { font-size: .75rem; color: #6b7280; }
.filters { display: flex; gap: 1rem; align-items: flex-end; margin-bottom: 1rem; }
.thumb { width: 4rem; height: 3rem; object-fit: cover; border-radius: .25rem; }
.actions { white-space: nowrap; }
.header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1.5rem; }
"#;

/// Full HTML document without navigation (login and error pages)
pub fn standalone_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{} | Fato Real</title>
<style>{}</style>
</head>
<body>
{}
</body>
</html>"#,
        escape(title),
        STYLE,
        body
    )
}

const NAV: &[(&str, &str)] = &[("/dashboard/noticias", "Notícias"), ("/dashboard/cadernos", "Cadernos")];

/// Dashboard document: sidebar with the logo and the section links, the
/// link whose path prefixes `current_path` marked active.
pub fn dashboard_page(branding: &BrandingConfig, current_path: &str, title: &str, body: &str) -> String {
    let links: String = NAV
        .iter()
        .map(|(href, label)| {
            let class = if current_path.starts_with(href) { " class=\"active\"" } else { "" };
            format!(r#"<a href="{}"{}><span>{}</span></a>"#, href, class, label)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let shell = format!(
        r#"<div class="shell">
<aside class="sidebar">
  <div class="brand">
    <img src="{logo}" alt="Fato Real Logo">
    <p>{label}</p>
  </div>
  <nav>
{links}
  </nav>
  <form method="post" action="/logout" class="logout"><button type="submit" class="secondary">Sair</button></form>
</aside>
<main>
{body}
</main>
</div>"#,
        logo = escape(&branding.logo_url),
        label = escape(&branding.site_label),
        links = links,
        body = body
    );
    standalone_page(title, &shell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_active_link_by_prefix() {
        let branding = AppConfig::development().branding;
        let html = dashboard_page(&branding, "/dashboard/cadernos/4/edit", "Cadernos", "<p>x</p>");
        assert!(html.contains(r#"<a href="/dashboard/cadernos" class="active">"#));
        assert!(html.contains(r#"<a href="/dashboard/noticias"><span>"#));
        assert!(html.contains("Acesse www.fatoreal.com.br"));
        assert!(html.contains("Logo-fato-real-sf.png"));
    }
}
