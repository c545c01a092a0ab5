use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use log::warn;

/// bcrypt hashing with a fixed work factor.
///
/// The salt is embedded in the produced hash string, so nothing else needs storing.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Checks `password` against a stored hash.
    ///
    /// A stored hash that cannot be parsed yields `false`, the same as a wrong password.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("stored password hash is unreadable: {}", e);
                false
            }
        }
    }
}
