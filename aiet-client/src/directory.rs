use crate::api::{same_email, Member, Role};

/// Registered members, the only identities that can log in
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Directory(Vec<Member>);

impl Directory {
    pub fn new(members: Vec<Member>) -> Directory {
        Directory(members)
    }

    /// Steering board, organizers and speakers of the conference
    pub fn conference() -> Directory {
        use Role::{CoOrganizer, SteeringBoard};
        Directory(vec![
            Member::new("krajcik@msu.edu", "Joseph Krajcik", SteeringBoard, "Michigan State University"),
            Member::new("uramnarain@uj.ac.za", "Umesh Ramnarain", SteeringBoard, "University of Johannesburg"),
            Member::new("neumann@leibniz-ipn.de", "Knut Neumann", SteeringBoard, "IPN Leibniz Institute"),
            Member::new("namsoo@msu.edu", "Namsoo Shin", CoOrganizer, "Michigan State University"),
            Member::new("tangjili@msu.edu", "Jiliang Tang", SteeringBoard, "Michigan State University"),
            Member::new("janice.gobert@gse.rutgers.edu", "Janice Gobert", SteeringBoard, "Rutgers University"),
            Member::new("mhchiu@gapps.ntnu.edu.tw", "Mei-Hung Chiu", SteeringBoard, "National Taiwan Normal University"),
            Member::new("copurgen@usc.edu", "Yasemin Copur-Gencturk", SteeringBoard, "University of Southern California"),
            Member::new("quintana@umich.edu", "Chris Quintana", SteeringBoard, "University of Michigan"),
            Member::new("edsona@msu.edu", "Alden Jack Edson", SteeringBoard, "Michigan State University"),
            Member::new("ethelcormier@aol.com", "Ethel Cormier", SteeringBoard, "Education Consultant"),
            Member::new("belzebut@jejutp.or.kr", "Cheolwoong Kang", SteeringBoard, "Jeju National University / RISE Initiative"),
            Member::new("87dooly@naver.com", "Chungjae Lim", SteeringBoard, "Keimyung University"),
            Member::new("ahn@anarchy.io", "Ahn Munhwan", CoOrganizer, "Anarchy Inc."),
        ])
    }

    pub fn find(&self, email: &str) -> Option<&Member> {
        self.0.iter().find(|m| same_email(&m.email, email))
    }

    pub fn members(&self) -> &[Member] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conference_members() {
        let d = Directory::conference();
        assert_eq!(d.members().len(), 14);
        let m = d.find("  NAMSOO@msu.edu ").expect("namsoo is registered");
        assert_eq!(m.name, "Namsoo Shin");
        assert_eq!(m.role, Role::CoOrganizer);
        assert!(d.find("nobody@msu.edu").is_none());
        assert!(d.find("").is_none());
    }

    #[test]
    fn emails_are_unique() {
        let d = Directory::conference();
        for (i, a) in d.members().iter().enumerate() {
            for b in &d.members()[i + 1..] {
                assert!(!same_email(&a.email, &b.email), "{} is duplicated", a.email);
            }
        }
    }
}
