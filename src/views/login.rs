use super::{escape, flash, standalone_page};

pub fn login_page(message: Option<&str>, email: &str) -> String {
    let body = format!(
        r#"<div class="card" style="max-width:28rem;margin:6rem auto;">
  <h1 style="text-align:center;">Login no Painel Fato Real</h1>
  {flash}
  <form method="post" action="/login">
    <div class="field">
      <label for="email">E-mail</label>
      <input id="email" name="email" type="email" placeholder="seu.email@exemplo.com" value="{email}" required>
    </div>
    <div class="field">
      <label for="password">Senha</label>
      <input id="password" name="password" type="password" placeholder="Sua senha secreta" required>
    </div>
    <button type="submit" style="width:100%;">Entrar</button>
  </form>
</div>"#,
        flash = flash(message),
        email = escape(email)
    );
    standalone_page("Login", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_shows_message() {
        let html = login_page(Some("Invalid login credentials"), "");
        assert!(html.contains("Invalid login credentials"));
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains(r#"name="password""#));
    }
}
