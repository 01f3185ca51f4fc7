pub mod admin_reset_password;
pub mod forgot_password;
pub mod login;
pub mod reset_password;
pub mod verify_2fa;

#[cfg(test)]
pub(crate) mod test_support;
