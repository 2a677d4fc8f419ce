use serde::Serialize;
use utoipa::ToSchema;

/// Listing metadata. Lists are never paged, so `total` is the only field most
/// endpoints fill in.
#[derive(Debug, Serialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl Meta {
    pub fn total(total: usize) -> Self {
        Self {
            total: Some(total as i64),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Wrap a full list, recording its length in `meta.total`.
    pub fn listed(message: impl Into<String>, data: T, count: usize) -> Self {
        Self::success(message, data, Some(Meta::total(count)))
    }
}
