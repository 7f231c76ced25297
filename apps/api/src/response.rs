use serde::Serialize;

/// Envelope for a single resource: `{success, data}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        DataResponse {
            success: true,
            data,
        }
    }
}

/// Envelope for a mutation: `{success, message, data}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MessageResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl MessageResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Envelope for a paginated listing:
/// `count` is the size of this page, `total` the pre-pagination match count,
/// `pages` = ceil(total / limit).
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            ((total as u64).div_ceil(limit.max(1) as u64)) as u32
        };
        ListResponse {
            success: true,
            count: data.len(),
            total,
            page,
            pages,
            data,
        }
    }
}
