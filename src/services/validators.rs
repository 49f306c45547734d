use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ServiceError, ServiceResult};

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,19}$").expect("symbol regex"));

/// Trims and uppercases a ticker, rejecting anything that is not ticker-shaped.
pub fn normalize_symbol(raw: &str) -> ServiceResult<String> {
    let sym = raw.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ServiceError::Validation("symbol can't be empty".into()));
    }
    if !SYMBOL_RE.is_match(&sym) {
        return Err(ServiceError::Validation(format!("not a valid symbol: {sym}")));
    }
    Ok(sym)
}

pub fn validate_order_id(raw: &str) -> ServiceResult<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ServiceError::Validation("orderId can't be empty".into()));
    }
    uuid::Uuid::parse_str(id)
        .map(|u| u.to_string())
        .map_err(|_| ServiceError::Validation("not a valid format for orderId".into()))
}
