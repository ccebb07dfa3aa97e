use heapless::String as HeaplessString;
use solar_core_db::repository::error::RepositoryError;
use sqlx::{postgres::PgRow, PgConnection, Row};
use std::error::Error;
use std::str::FromStr;
use uuid::Uuid;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Retrieves a required `HeaplessString` from a row.
pub fn get_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<HeaplessString<N>, Box<dyn Error + Send + Sync>> {
    let s: String = row.try_get(col_name)?;
    HeaplessString::from_str(&s).map_err(|_| {
        format!("Value for column '{col_name}' is too long (max {N} chars)").into()
    })
}

/// Retrieves an optional `HeaplessString` from a row.
pub fn get_optional_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<Option<HeaplessString<N>>, Box<dyn Error + Send + Sync>> {
    let s: Option<String> = row.try_get(col_name)?;
    s.map(|val| HeaplessString::from_str(&val))
        .transpose()
        .map_err(|_| {
            format!("Value for column '{col_name}' is too long (max {N} chars)").into()
        })
}

/// Decodes every row, failing on the first one that does not fit the model.
pub fn rows_into<T: TryFromRow<PgRow>>(
    rows: &[PgRow],
) -> Result<Vec<T>, Box<dyn Error + Send + Sync>> {
    rows.iter().map(T::try_from_row).collect()
}

/// Explains why a version-checked write on `table` matched no row.
pub async fn stale_write_error(
    conn: &mut PgConnection,
    table: &'static str,
    id: Uuid,
) -> RepositoryError {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
    match sqlx::query_scalar::<_, bool>(&query).bind(id).fetch_one(conn).await {
        Ok(true) => RepositoryError::ConcurrentModification { entity: table, id },
        Ok(false) => RepositoryError::NotFound(id),
        Err(e) => e.into(),
    }
}
