use crate::{Author, Member, Role, Time};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub affiliation: String,
    pub login_time: Time,
}

impl SessionUser {
    pub fn new(m: &Member, login_time: Time) -> SessionUser {
        SessionUser {
            email: m.email.clone(),
            name: m.name.clone(),
            role: m.role,
            affiliation: m.affiliation.clone(),
            login_time,
        }
    }

    pub fn author(&self) -> Author {
        Author::from(self)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    pub expires_at: Time,
}

impl Session {
    pub fn is_valid_at(&self, now: Time) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn example_session() -> Session {
        let login_time = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();
        Session {
            user: SessionUser::new(
                &Member::new("alice@example.edu", "Alice Liddell", Role::Member, "Wonderland U"),
                login_time,
            ),
            expires_at: login_time + Duration::days(180),
        }
    }

    #[test]
    fn validity_is_strict() {
        let s = example_session();
        assert!(s.is_valid_at(s.user.login_time));
        assert!(s.is_valid_at(s.expires_at - Duration::seconds(1)));
        assert!(!s.is_valid_at(s.expires_at));
        assert!(!s.is_valid_at(s.expires_at + Duration::days(1)));
    }

    #[test]
    fn stored_layout() {
        let s = example_session();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["user"]["email"], "alice@example.edu");
        assert_eq!(v["user"]["role"], "Member");
        assert!(v["user"]["loginTime"].is_string());
        assert!(v["expiresAt"].is_string());
        let back: Session = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }
}
