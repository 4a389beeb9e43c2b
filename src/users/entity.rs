//! Stored user records.

/// A persisted user. `password_hash` is a PHC string and never leaves the
/// service layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub password_hash: String,
}

/// A user about to be inserted; the id is assigned by storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub password_hash: String,
}

impl NewUser {
    /// Attach the storage-assigned id.
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            password_hash: self.password_hash,
        }
    }
}
