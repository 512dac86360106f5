//! Row types for the two dashboard tables and the drafts submitted by forms

use serde::{Deserialize, Deserializer};

pub mod caderno;
pub mod noticia;

pub use caderno::{Caderno, CadernoDraft, CadernoInput, CadernoOption};
pub use noticia::{Noticia, NoticiaDraft, NoticiaFilters, NoticiaInput};

/// Columns without NOT NULL come back as `null`; treat that as the default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
