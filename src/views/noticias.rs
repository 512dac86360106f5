use crate::config::BrandingConfig;
use crate::models::{CadernoOption, Noticia, NoticiaDraft, NoticiaFilters};

use super::{action_button, checked, dashboard_page, escape, flash, selected, FormMode};

const PATH: &str = "/dashboard/noticias";

pub fn list_page(
    branding: &BrandingConfig,
    noticias: &[Noticia],
    cadernos: &[CadernoOption],
    filters: &NoticiaFilters,
    message: Option<&str>,
) -> String {
    let table = if noticias.is_empty() {
        r#"<p class="card">Nenhuma notícia encontrada.</p>"#.to_string()
    } else {
        let rows: String = noticias.iter().map(row).collect::<Vec<_>>().join("\n");
        format!(
            r#"<table>
<thead><tr><th>Capa</th><th>Título</th><th>Caderno</th><th>Autor</th><th>Status</th><th>Ações</th></tr></thead>
<tbody>
{}
</tbody>
</table>"#,
            rows
        )
    };

    let body = format!(
        r#"<div class="header">
  <h1>Gerenciar Notícias</h1>
  <a class="button" href="{PATH}/nova">Adicionar Notícia</a>
</div>
{flash}
{filters}
{table}"#,
        flash = flash(message),
        filters = filter_form(cadernos, filters),
        table = table
    );
    dashboard_page(branding, PATH, "Notícias", &body)
}

fn filter_form(cadernos: &[CadernoOption], filters: &NoticiaFilters) -> String {
    let current_caderno = filters.caderno_id();
    let caderno_options: String = cadernos
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                c.id,
                selected(current_caderno == Some(c.id)),
                escape(&c.nomecaderno)
            )
        })
        .collect();

    let publico = filters.publico_flag();
    format!(
        r#"<form method="get" action="{PATH}" class="filters card">
  <div>
    <label for="f-caderno">Caderno</label>
    <select id="f-caderno" name="caderno">
      <option value="">Todos</option>
      {caderno_options}
    </select>
  </div>
  <div>
    <label for="f-publico">Status</label>
    <select id="f-publico" name="publico">
      <option value="">Todas</option>
      <option value="true"{pub_true}>Publicado</option>
      <option value="false"{pub_false}>Não Publicado</option>
    </select>
  </div>
  <div>
    <label for="f-autor">Autor</label>
    <input id="f-autor" name="autor" type="text" value="{autor}">
  </div>
  <div>
    <button type="submit">Filtrar</button>
    <a class="button secondary" href="{PATH}">Limpar</a>
  </div>
</form>"#,
        caderno_options = caderno_options,
        pub_true = selected(publico == Some(true)),
        pub_false = selected(publico == Some(false)),
        autor = escape(filters.autor_needle().unwrap_or_default()),
    )
}

fn row(noticia: &Noticia) -> String {
    let capa = match noticia.capa.as_deref().filter(|c| !c.is_empty()) {
        Some(url) => format!(r#"<img class="thumb" src="{}" alt="Capa">"#, escape(url)),
        None => r#"<span class="hint">Sem capa</span>"#.to_string(),
    };
    let (badge, toggle_label) = if noticia.publico {
        (r#"<span class="badge on">Publicado</span>"#, "Despublicar")
    } else {
        (r#"<span class="badge off">Não Publicado</span>"#, "Publicar")
    };

    format!(
        r#"<tr>
  <td>{capa}</td>
  <td>{titulo}</td>
  <td>{caderno}</td>
  <td>{autor}</td>
  <td>{badge}</td>
  <td class="actions">
    <a class="button secondary" href="{PATH}/{id}/edit">Editar</a>
    {toggle}
    {delete}
  </td>
</tr>"#,
        capa = capa,
        titulo = escape(&noticia.titulo),
        caderno = escape(noticia.caderno_name().unwrap_or("-")),
        autor = escape(noticia.autor.as_deref().unwrap_or("-")),
        badge = badge,
        id = noticia.id,
        toggle = action_button(&format!("{}/{}/toggle", PATH, noticia.id), toggle_label, "secondary", None),
        delete = action_button(
            &format!("{}/{}/delete", PATH, noticia.id),
            "Excluir",
            "danger",
            Some("Tem certeza que deseja excluir esta notícia? Esta ação é irreversível.")
        ),
    )
}

/// Everything the create and edit forms need besides the draft itself
pub struct NoticiaForm<'a> {
    pub mode: FormMode,
    pub draft: &'a NoticiaDraft,
    pub cadernos: &'a [CadernoOption],
    /// Cover already stored for the noticia being edited
    pub capa: Option<&'a str>,
    pub message: Option<&'a str>,
}

pub fn form_page(branding: &BrandingConfig, form: &NoticiaForm<'_>) -> String {
    let (title, action, submit) = match form.mode {
        FormMode::Create => ("Adicionar Nova Notícia".to_string(), PATH.to_string(), "Criar Notícia"),
        FormMode::Edit(id) => ("Editar Notícia".to_string(), format!("{}/{}", PATH, id), "Salvar Alterações"),
    };

    let draft = form.draft;
    let caderno_options: String = form
        .cadernos
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                c.id,
                selected(draft.id_caderno.trim() == c.id.to_string()),
                escape(&c.nomecaderno)
            )
        })
        .collect();

    let current_capa = match form.capa.filter(|c| !c.is_empty()) {
        Some(url) => format!(
            r#"<p class="hint">Capa atual:</p><img class="thumb" src="{}" alt="Capa atual">"#,
            escape(url)
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<div class="card" style="max-width:48rem;">
  <h1>{title}</h1>
  {flash}
  <form method="post" action="{action}" enctype="multipart/form-data">
    <div class="field">
      <label for="titulo">Título</label>
      <input id="titulo" name="titulo" type="text" value="{titulo}" required>
    </div>
    <div class="field">
      <label for="subtitulo">Subtítulo (Opcional)</label>
      <input id="subtitulo" name="subtitulo" type="text" value="{subtitulo}">
    </div>
    <div class="field">
      <label for="conteudo">Conteúdo</label>
      <textarea id="conteudo" name="conteudo" required>{conteudo}</textarea>
    </div>
    <div class="field">
      <label for="capa">Capa (Opcional)</label>
      {current_capa}
      <input id="capa" name="capa" type="file" accept="image/*">
      <p class="hint">Selecione um arquivo de imagem para a capa.</p>
    </div>
    <div class="field">
      <label for="id_caderno">Caderno</label>
      <select id="id_caderno" name="id_caderno" required>
        <option value="">Selecione um Caderno</option>
        {caderno_options}
      </select>
    </div>
    <div class="field">
      <label for="autor">Autor</label>
      <input id="autor" name="autor" type="text" value="{autor}" required>
    </div>
    <div class="field">
      <label for="slugs">Tags / Palavras-chave (separadas por vírgula)</label>
      <input id="slugs" name="slugs" type="text" value="{slugs}">
      <p class="hint">Use vírgulas para separar as tags.</p>
    </div>
    <div class="field">
      <label><input type="checkbox" name="publicidade" value="true"{publicidade}> É Publicidade?</label>
      <label><input type="checkbox" name="publico" value="true"{publico}> Público</label>
    </div>
    <button type="submit">{submit}</button>
    <a class="button secondary" href="{PATH}">Cancelar</a>
  </form>
</div>"#,
        title = escape(&title),
        flash = flash(form.message),
        action = escape(&action),
        titulo = escape(&draft.titulo),
        subtitulo = escape(&draft.subtitulo),
        conteudo = escape(&draft.conteudo),
        current_capa = current_capa,
        caderno_options = caderno_options,
        autor = escape(&draft.autor),
        slugs = escape(&draft.slugs),
        publicidade = checked(draft.publicidade),
        publico = checked(draft.publico),
        submit = submit,
    );
    dashboard_page(branding, PATH, &title, &body)
}

/// Draft pre-filled from a stored noticia, for the edit form
pub fn draft_from(noticia: &Noticia) -> NoticiaDraft {
    NoticiaDraft {
        titulo: noticia.titulo.clone(),
        subtitulo: noticia.subtitulo.clone().unwrap_or_default(),
        conteudo: noticia.conteudo.clone().unwrap_or_default(),
        id_caderno: noticia.id_caderno.map(|id| id.to_string()).unwrap_or_default(),
        autor: noticia.autor.clone().unwrap_or_default(),
        publicidade: noticia.publicidade,
        publico: noticia.publico,
        slugs: noticia.slugs_field(),
    }
}
