use std::fmt;

use crate::SessionUser;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SteeringBoard,
    CoOrganizer,
    Speaker,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SteeringBoard => "Steering Board",
            Role::CoOrganizer => "Co-Organizer",
            Role::Speaker => "Speaker",
            Role::Member => "Member",
        }
    }

    /// CSS class of the badge shown next to an author name
    pub fn badge_class(&self) -> &'static str {
        match self {
            Role::SteeringBoard => "role-steering",
            Role::CoOrganizer => "role-organizer",
            Role::Speaker => "role-speaker",
            Role::Member => "role-member",
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Role {
        match s {
            "Steering Board" => Role::SteeringBoard,
            "Co-Organizer" => Role::CoOrganizer,
            "Speaker" => Role::Speaker,
            // rows written by other clients may carry anything here
            _ => Role::Member,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Role {
        Role::from(&s as &str)
    }
}

impl From<Role> for String {
    fn from(r: Role) -> String {
        String::from(r.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Member {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub affiliation: String,
}

impl Member {
    pub fn new(email: &str, name: &str, role: Role, affiliation: &str) -> Member {
        Member {
            email: String::from(email),
            name: String::from(name),
            role,
            affiliation: String::from(affiliation),
        }
    }
}

/// Snapshot of a member taken when they write something
///
/// This is copied into every record and never joined back to the directory,
/// so later directory edits do not rewrite history.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub affiliation: String,
}

impl From<&SessionUser> for Author {
    fn from(u: &SessionUser) -> Author {
        Author {
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            affiliation: u.affiliation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings() {
        for r in [
            Role::SteeringBoard,
            Role::CoOrganizer,
            Role::Speaker,
            Role::Member,
        ] {
            assert_eq!(Role::from(r.as_str()), r);
        }
        assert_eq!(Role::from("Keynote"), Role::Member);
        assert_eq!(Role::CoOrganizer.badge_class(), "role-organizer");
    }

    #[test]
    fn role_json() {
        assert_eq!(
            serde_json::to_string(&Role::SteeringBoard).unwrap(),
            "\"Steering Board\""
        );
        let r: Role = serde_json::from_str("\"Co-Organizer\"").unwrap();
        assert_eq!(r, Role::CoOrganizer);
        let r: Role = serde_json::from_str("\"something else\"").unwrap();
        assert_eq!(r, Role::Member);
    }
}
