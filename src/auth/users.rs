//! Demo-grade in-memory user table.
//!
//! Credentials are plaintext on purpose: this service audits login attempts,
//! it does not pretend to be an identity provider.

/// A demo user the credential check runs against.
#[derive(Debug, Clone, Copy)]
pub struct MockUser {
    pub username: &'static str,
    pub password: &'static str,
    pub role: &'static str,
    pub id: &'static str,
}

pub const MOCK_USERS: &[MockUser] = &[
    MockUser {
        username: "admin",
        password: "admin123",
        role: "CEO",
        id: "1",
    },
    MockUser {
        username: "john.doe",
        password: "password123",
        role: "staff",
        id: "2",
    },
    MockUser {
        username: "jane.smith",
        password: "password456",
        role: "staff",
        id: "3",
    },
    MockUser {
        username: "bob.wilson",
        password: "password789",
        role: "staff",
        id: "4",
    },
    MockUser {
        username: "zeo1",
        password: "zeo123",
        role: "zeo",
        id: "5",
    },
    MockUser {
        username: "school1",
        password: "school123",
        role: "admin",
        id: "6",
    },
    MockUser {
        username: "staff1",
        password: "staff123",
        role: "staff",
        id: "7",
    },
];

/// Look up a demo user by exact username.
pub fn find_user(username: &str) -> Option<&'static MockUser> {
    MOCK_USERS.iter().find(|u| u.username == username)
}
