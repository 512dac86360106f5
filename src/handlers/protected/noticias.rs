// handlers/protected/noticias.rs - /dashboard/noticias pages and actions

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Response},
    Extension,
};
use serde::Deserialize;

use super::{action_failure, form_failure, multipart_error};
use crate::app::AppState;
use crate::error::{ApiError, PageError};
use crate::handlers::{redirect_with_message, FlashQuery};
use crate::middleware::SessionUser;
use crate::models::{CadernoOption, NoticiaDraft, NoticiaFilters};
use crate::storage::ImageUpload;
use crate::views::noticias::{draft_from, NoticiaForm};
use crate::views::{self, FormMode};

const LIST: &str = "/dashboard/noticias";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(flatten)]
    pub filters: NoticiaFilters,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, PageError> {
    let token = &user.access_token;
    let (noticias, cadernos) = futures::try_join!(
        state.noticias.list(token, &query.filters),
        state.cadernos.all_for_select(token)
    )?;
    let flash = FlashQuery { message: query.message };

    Ok(Html(views::noticias::list_page(
        &state.config.branding,
        &noticias,
        &cadernos,
        &query.filters,
        flash.message(),
    )))
}

pub async fn new_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>, PageError> {
    let cadernos = state.cadernos.all_for_select(&user.access_token).await?;
    let draft = NoticiaDraft {
        publico: true,
        ..Default::default()
    };

    Ok(Html(views::noticias::form_page(
        &state.config.branding,
        &NoticiaForm {
            mode: FormMode::Create,
            draft: &draft,
            cadernos: &cadernos,
            capa: None,
            message: flash.message(),
        },
    )))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let (draft, cover) = read_noticia_form(multipart).await?;
    let token = &user.access_token;

    match state.noticias.create(token, &draft, cover).await {
        Ok(_) => Ok(redirect_with_message(LIST, "Notícia criada com sucesso!").into_response()),
        Err(e) => {
            let cadernos = dropdown_or_empty(&state, token).await;
            Ok(form_failure(e, "criar notícia", |message| {
                views::noticias::form_page(
                    &state.config.branding,
                    &NoticiaForm {
                        mode: FormMode::Create,
                        draft: &draft,
                        cadernos: &cadernos,
                        capa: None,
                        message: Some(message),
                    },
                )
            }))
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>, PageError> {
    let (noticia, cadernos) = state.noticias.edit_context(&user.access_token, id).await?;
    let draft = draft_from(&noticia);

    Ok(Html(views::noticias::form_page(
        &state.config.branding,
        &NoticiaForm {
            mode: FormMode::Edit(id),
            draft: &draft,
            cadernos: &cadernos,
            capa: noticia.capa.as_deref(),
            message: flash.message(),
        },
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let (draft, cover) = read_noticia_form(multipart).await?;
    let token = &user.access_token;

    match state.noticias.update(token, id, &draft, cover).await {
        Ok(_) => Ok(redirect_with_message(LIST, "Notícia atualizada com sucesso!").into_response()),
        Err(e) => {
            let (capa, cadernos) = match state.noticias.edit_context(token, id).await {
                Ok((noticia, cadernos)) => (noticia.capa, cadernos),
                Err(_) => (None, dropdown_or_empty(&state, token).await),
            };
            Ok(form_failure(e, "atualizar notícia", |message| {
                views::noticias::form_page(
                    &state.config.branding,
                    &NoticiaForm {
                        mode: FormMode::Edit(id),
                        draft: &draft,
                        cadernos: &cadernos,
                        capa: capa.as_deref(),
                        message: Some(message),
                    },
                )
            }))
        }
    }
}

pub async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Response {
    match state.noticias.toggle_publico(&user.access_token, id).await {
        Ok(true) => redirect_with_message(LIST, "Notícia publicada com sucesso!").into_response(),
        Ok(false) => redirect_with_message(LIST, "Notícia despublicada com sucesso!").into_response(),
        Err(e) => action_failure(e, "atualizar status da notícia", LIST),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Response {
    match state.noticias.delete(&user.access_token, id).await {
        Ok(()) => redirect_with_message(LIST, "Notícia excluída com sucesso!").into_response(),
        Err(e) => action_failure(e, "excluir notícia", LIST),
    }
}

async fn dropdown_or_empty(state: &AppState, token: &str) -> Vec<CadernoOption> {
    state.cadernos.all_for_select(token).await.unwrap_or_else(|e| {
        tracing::warn!("Could not reload cadernos for the form: {}", e);
        Vec::new()
    })
}

/// Text fields into a draft; a non-empty `capa` part becomes the cover upload
async fn read_noticia_form(mut multipart: Multipart) -> Result<(NoticiaDraft, Option<ImageUpload>), ApiError> {
    let mut draft = NoticiaDraft::default();
    let mut cover = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "capa" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty part when no file was picked
            if !bytes.is_empty() {
                cover = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "titulo" => draft.titulo = value,
            "subtitulo" => draft.subtitulo = value,
            "conteudo" => draft.conteudo = value,
            "id_caderno" => draft.id_caderno = value,
            "autor" => draft.autor = value,
            "slugs" => draft.slugs = value,
            "publicidade" => draft.publicidade = true,
            "publico" => draft.publico = true,
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    Ok((draft, cover))
}
