use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
}

/// Validate a hex chain address and return it in its canonical lower-case form.
///
/// Mixed-case (checksummed) input is accepted; the stored form is always lower case
/// so that addresses coming back from the provider compare equal.
pub fn normalize_address(address: &str) -> Result<String, ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let hex = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => hex,
        None => return Err(ValidationError::InvalidAddress(address.to_string())),
    };

    // 20 bytes
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}

pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    normalize_address(address).map(|_| ())
}
