// handlers/protected/cadernos.rs - /dashboard/cadernos pages and actions

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use super::{action_failure, form_failure};
use crate::app::AppState;
use crate::error::PageError;
use crate::handlers::{redirect_with_message, FlashQuery};
use crate::middleware::SessionUser;
use crate::models::CadernoDraft;
use crate::views::{self, FormMode};

const LIST: &str = "/dashboard/cadernos";

#[derive(Debug, Deserialize)]
pub struct CadernoForm {
    #[serde(default)]
    pub nomecaderno: String,
    /// Unchecked checkboxes are simply absent
    #[serde(default)]
    pub ativo: Option<String>,
}

impl From<CadernoForm> for CadernoDraft {
    fn from(form: CadernoForm) -> Self {
        CadernoDraft {
            nomecaderno: form.nomecaderno,
            ativo: form.ativo.is_some(),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>, PageError> {
    let cadernos = state.cadernos.list(&user.access_token).await?;
    Ok(Html(views::cadernos::list_page(&state.config.branding, &cadernos, flash.message())))
}

pub async fn new_form(State(state): State<AppState>, Query(flash): Query<FlashQuery>) -> Html<String> {
    let draft = CadernoDraft {
        nomecaderno: String::new(),
        ativo: true,
    };
    Html(views::cadernos::form_page(
        &state.config.branding,
        FormMode::Create,
        &draft,
        flash.message(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<CadernoForm>,
) -> Response {
    let draft = CadernoDraft::from(form);
    match state.cadernos.create(&user.access_token, &draft).await {
        Ok(_) => redirect_with_message(LIST, "Caderno adicionado com sucesso!").into_response(),
        Err(e) => form_failure(e, "adicionar caderno", |message| {
            views::cadernos::form_page(&state.config.branding, FormMode::Create, &draft, Some(message))
        }),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>, PageError> {
    let caderno = state.cadernos.get(&user.access_token, id).await?;
    let draft = CadernoDraft {
        nomecaderno: caderno.nomecaderno,
        ativo: caderno.ativo,
    };
    Ok(Html(views::cadernos::form_page(
        &state.config.branding,
        FormMode::Edit(id),
        &draft,
        flash.message(),
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<CadernoForm>,
) -> Response {
    let draft = CadernoDraft::from(form);
    match state.cadernos.update(&user.access_token, id, &draft).await {
        Ok(_) => redirect_with_message(LIST, "Caderno atualizado com sucesso!").into_response(),
        Err(e) => form_failure(e, "atualizar caderno", |message| {
            views::cadernos::form_page(&state.config.branding, FormMode::Edit(id), &draft, Some(message))
        }),
    }
}

pub async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Response {
    match state.cadernos.toggle_ativo(&user.access_token, id).await {
        Ok(true) => redirect_with_message(LIST, "Caderno ativado com sucesso!").into_response(),
        Ok(false) => redirect_with_message(LIST, "Caderno desativado com sucesso!").into_response(),
        Err(e) => action_failure(e, "atualizar status do caderno", LIST),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Response {
    match state.cadernos.delete(&user.access_token, id).await {
        Ok(()) => redirect_with_message(LIST, "Caderno removido com sucesso!").into_response(),
        Err(e) => action_failure(e, "remover caderno", LIST),
    }
}
