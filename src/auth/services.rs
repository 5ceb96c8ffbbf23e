use crate::error::{ClientError, ClientResult};
use crate::transport::ApiResponse;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Local credential checks; a failure here never reaches the network.
pub fn validate_credentials(email: &str, password: &str) -> ClientResult<()> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(ClientError::InvalidCredentials(
            "email and password are required".into(),
        ));
    }
    if !email.contains('@') {
        return Err(ClientError::InvalidCredentials(
            "email must contain '@'".into(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::InvalidCredentials(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Register failures caused by an existing account, recognised by status
/// or by the backend's error text.
pub fn is_email_in_use(response: &ApiResponse) -> bool {
    if response.status == 409 {
        return true;
    }
    let message = response.error_message().to_lowercase();
    message.contains("already") || message.contains("exists") || message.contains("in use")
}
