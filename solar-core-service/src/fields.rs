use heapless::String as HeaplessString;

use solar_core_api::error::{ApiError, ApiResult};

/// Copies `value` into a fixed-capacity string, rejecting values that do not fit.
pub(crate) fn bounded<const N: usize>(field: &str, value: &str) -> ApiResult<HeaplessString<N>> {
    HeaplessString::try_from(value)
        .map_err(|_| ApiError::ValidationError(format!("{field} must be at most {N} bytes")))
}

pub(crate) fn bounded_opt<const N: usize>(
    field: &str,
    value: Option<&str>,
) -> ApiResult<Option<HeaplessString<N>>> {
    value.map(|v| bounded(field, v)).transpose()
}

/// Trims `value`; blank input counts as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
