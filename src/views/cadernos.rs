use crate::config::BrandingConfig;
use crate::models::{Caderno, CadernoDraft};

use super::{action_button, checked, dashboard_page, escape, flash, FormMode};

const PATH: &str = "/dashboard/cadernos";

pub fn list_page(branding: &BrandingConfig, cadernos: &[Caderno], message: Option<&str>) -> String {
    let table = if cadernos.is_empty() {
        r#"<p class="card">Nenhum caderno encontrado. Adicione um novo!</p>"#.to_string()
    } else {
        let rows: String = cadernos.iter().map(row).collect::<Vec<_>>().join("\n");
        format!(
            r#"<table>
<thead><tr><th>Nome</th><th>Status</th><th>Ações</th></tr></thead>
<tbody>
{}
</tbody>
</table>"#,
            rows
        )
    };

    let body = format!(
        r#"<div class="header">
  <h1>Gerenciar Cadernos</h1>
  <a class="button" href="{PATH}/novo">Adicionar Caderno</a>
</div>
{flash}
{table}"#,
        flash = flash(message),
        table = table
    );
    dashboard_page(branding, PATH, "Cadernos", &body)
}

fn row(caderno: &Caderno) -> String {
    let (badge, toggle_label, toggle_verb) = if caderno.ativo {
        (r#"<span class="badge on">Ativo</span>"#, "Desativar", "desativar")
    } else {
        (r#"<span class="badge off">Inativo</span>"#, "Ativar", "ativar")
    };
    let toggle_prompt = format!("Tem certeza que deseja {} este caderno?", toggle_verb);

    format!(
        r#"<tr>
  <td>{nome}</td>
  <td>{badge}</td>
  <td class="actions">
    <a class="button secondary" href="{PATH}/{id}/edit">Editar</a>
    {toggle}
    {delete}
  </td>
</tr>"#,
        nome = escape(&caderno.nomecaderno),
        badge = badge,
        id = caderno.id,
        toggle = action_button(&format!("{}/{}/toggle", PATH, caderno.id), toggle_label, "secondary", Some(&toggle_prompt)),
        delete = action_button(
            &format!("{}/{}/delete", PATH, caderno.id),
            "Remover",
            "danger",
            Some("Tem certeza que deseja remover este caderno?")
        ),
    )
}

pub fn form_page(branding: &BrandingConfig, mode: FormMode, draft: &CadernoDraft, message: Option<&str>) -> String {
    let (title, action, submit) = match mode {
        FormMode::Create => ("Adicionar Novo Caderno".to_string(), PATH.to_string(), "Adicionar Caderno"),
        FormMode::Edit(id) => ("Editar Caderno".to_string(), format!("{}/{}", PATH, id), "Salvar Alterações"),
    };

    let body = format!(
        r#"<div class="card" style="max-width:36rem;">
  <h1>{title}</h1>
  {flash}
  <form method="post" action="{action}">
    <div class="field">
      <label for="nomecaderno">Nome do Caderno</label>
      <input id="nomecaderno" name="nomecaderno" type="text" value="{nome}" required>
    </div>
    <div class="field">
      <label><input type="checkbox" name="ativo" value="true"{ativo}> Ativo</label>
    </div>
    <button type="submit">{submit}</button>
    <a class="button secondary" href="{PATH}">Cancelar</a>
  </form>
</div>"#,
        title = escape(&title),
        flash = flash(message),
        action = escape(&action),
        nome = escape(&draft.nomecaderno),
        ativo = checked(draft.ativo),
        submit = submit,
    );
    dashboard_page(branding, PATH, &title, &body)
}
