use std::{fs, io::Write, path::Path};

use aiet_client::{
    api::{
        Attachment, Comment, CommentId, KeyValueStore, ObjectStorage, PostId, RemoteStore,
        Submission, SubmissionId,
    },
    display, Client, Error,
};
use anyhow::{anyhow, bail, Context};
use chrono::Utc;

use crate::{Command, CommentsCommand, SubmissionsCommand};

pub async fn run<R, S>(client: &Client<R, S>, cmd: Command, out: &mut impl Write) -> anyhow::Result<()>
where
    R: RemoteStore + ObjectStorage,
    S: KeyValueStore + Clone,
{
    match cmd {
        Command::Login { email, password } => {
            let user = client
                .session
                .login(&email, &password)
                .with_context(|| format!("logging in as {email}"))?;
            writeln!(out, "Welcome, {}!", user.name)?;
        }
        Command::Logout => {
            client.session.logout();
            writeln!(out, "You have been logged out.")?;
        }
        Command::Whoami => match client.session.session() {
            None => writeln!(out, "Not logged in.")?,
            Some(s) => {
                let admin = if client.session.is_admin() { ", administrator" } else { "" };
                writeln!(out, "{} <{}> ({}{admin})", s.user.name, s.user.email, s.user.role.as_str())?;
                writeln!(out, "Session valid until {}", display::format_date_time(s.expires_at))?;
            }
        },
        Command::Members => {
            for m in client.session.directory().members() {
                writeln!(out, "{:<28} {:<32} {:<10} {}", m.name, m.email, m.role.as_str(), m.affiliation)?;
            }
        }
        Command::Comments(cmd) => comments(client, cmd, out).await?,
        Command::Submissions(cmd) => submissions(client, cmd, out).await?,
        Command::Schema => writeln!(out, "{}", crate::SCHEMA.trim_end())?,
    }
    Ok(())
}

async fn comments<R, S>(client: &Client<R, S>, cmd: CommentsCommand, out: &mut impl Write) -> anyhow::Result<()>
where
    R: RemoteStore,
    S: KeyValueStore + Clone,
{
    match cmd {
        CommentsCommand::List { post } => {
            let comments = client.comments.list(&PostId::new(post)).await;
            writeln!(out, "Discussion ({})", comments.len())?;
            for c in &comments {
                print_comment(c, out)?;
            }
        }
        CommentsCommand::Add { post, content } => {
            let c = client
                .comments
                .add_comment(&PostId::new(post), &content)
                .await
                .context("posting comment")?;
            writeln!(out, "Posted comment {}", c.id)?;
        }
        CommentsCommand::Reply { post, comment, content } => {
            let r = client
                .comments
                .add_reply(&PostId::new(post), CommentId(comment), &content)
                .await
                .context("posting reply")?;
            writeln!(out, "Posted reply {}", r.id)?;
        }
        CommentsCommand::Delete { post, comment } => {
            if !client
                .comments
                .delete_comment(&PostId::new(post), CommentId(comment))
                .await
            {
                bail!("comment {comment} was not deleted");
            }
            writeln!(out, "Deleted comment {comment}")?;
        }
    }
    Ok(())
}

async fn submissions<R, S>(
    client: &Client<R, S>,
    cmd: SubmissionsCommand,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RemoteStore + ObjectStorage,
    S: KeyValueStore + Clone,
{
    match cmd {
        SubmissionsCommand::Submit {
            kind,
            title,
            content,
            tags,
            attachment,
        } => {
            let attachment = attachment.as_deref().map(read_attachment).transpose()?;
            let s = client
                .submissions
                .submit(&kind, &title, &content, &tags, attachment)
                .await
                .context("submitting")?;
            writeln!(out, "Submission received! Pending review. ({})", s.id)?;
            if let Some(url) = &s.attachment_url {
                writeln!(out, "Attachment: {url}")?;
            }
        }
        SubmissionsCommand::List { status } => {
            require_admin(client).context("listing all submissions")?;
            print_submissions(&client.submissions.list_all(status).await, true, out)?;
        }
        SubmissionsCommand::Mine => {
            if !client.session.is_logged_in() {
                return Err(Error::AuthRequired).context("listing your submissions");
            }
            print_submissions(&client.submissions.list_mine().await, true, out)?;
        }
        SubmissionsCommand::Approved { kind } => {
            print_submissions(&client.submissions.list_approved(kind).await, false, out)?;
        }
        SubmissionsCommand::SetStatus { id, status } => {
            require_admin(client).context("reviewing a submission")?;
            if !client.submissions.set_status(SubmissionId(id), status).await {
                bail!("submission {id} was not updated");
            }
            writeln!(out, "Submission {id} is now {}", status.as_str())?;
        }
        SubmissionsCommand::Delete { id } => {
            if !client.session.is_logged_in() {
                return Err(Error::AuthRequired).context("deleting a submission");
            }
            if !client.submissions.delete(SubmissionId(id)).await {
                bail!("submission {id} was not deleted");
            }
            writeln!(out, "Deleted submission {id}")?;
        }
    }
    Ok(())
}

fn require_admin<R, S: KeyValueStore>(client: &Client<R, S>) -> Result<(), Error> {
    match (client.session.is_logged_in(), client.session.is_admin()) {
        (false, _) => Err(Error::AuthRequired),
        (true, false) => Err(Error::Unauthorized),
        (true, true) => Ok(()),
    }
}

fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    Ok(Attachment {
        name: String::from(name),
        content_type: String::from(content_type(ext)),
        bytes,
    })
}

fn content_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn print_comment(c: &Comment, out: &mut impl Write) -> anyhow::Result<()> {
    let now = Utc::now();
    writeln!(
        out,
        "[{}] {} ({}, {}) {}",
        c.id,
        c.author.name,
        c.author.role.as_str(),
        c.author.affiliation,
        display::format_timestamp(c.timestamp, now),
    )?;
    for l in display::lines(&c.content) {
        writeln!(out, "  {l}")?;
    }
    for r in &c.replies {
        writeln!(
            out,
            "    [{}] {} ({}) {}",
            r.id,
            r.author.name,
            r.author.role.as_str(),
            display::format_timestamp(r.timestamp, now),
        )?;
        for l in display::lines(&r.content) {
            writeln!(out, "      {l}")?;
        }
    }
    Ok(())
}

fn print_submissions(list: &[Submission], show_status: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if list.is_empty() {
        writeln!(out, "No submissions.")?;
    }
    for s in list {
        let status = if show_status { format!(" [{}]", s.status.as_str()) } else { String::new() };
        writeln!(out, "{} {}{status}: {}", s.id, s.kind.display_name(), s.title)?;
        writeln!(out, "  by {} on {}", s.author_name, display::format_date(s.created_at))?;
        let tags = s.tag_list();
        if !tags.is_empty() {
            writeln!(out, "  tags: {}", tags.join(", "))?;
        }
        if let (Some(name), Some(url)) = (&s.attachment_name, &s.attachment_url) {
            writeln!(out, "  attachment: {name} <{url}>")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use aiet_client::{
        api::{SubmissionStatus, Table},
        ClientConfig, Directory, MemoryStorage,
    };
    use aiet_mock_server::MockServer;

    use super::*;

    fn client(server: &Rc<MockServer>) -> Client<MockServer, MemoryStorage> {
        Client::new(
            server.clone(),
            MemoryStorage::new(),
            Directory::conference(),
            &ClientConfig::default(),
        )
    }

    async fn run_ok(client: &Client<MockServer, MemoryStorage>, cmd: Command) -> String {
        let mut out = Vec::new();
        run(client, cmd, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn login(email: &str) -> Command {
        Command::Login {
            email: String::from(email),
            password: String::from("stem2025"),
        }
    }

    #[tokio::test]
    async fn login_and_whoami() {
        let server = Rc::new(MockServer::new());
        let c = client(&server);
        assert_eq!(run_ok(&c, Command::Whoami).await, "Not logged in.\n");

        let mut out = Vec::<u8>::new();
        let err = run(
            &c,
            Command::Login {
                email: String::from("krajcik@msu.edu"),
                password: String::from("wrong"),
            },
            &mut out,
        )
        .await
        .unwrap_err();
        assert_eq!(err.root_cause().to_string(), "Incorrect password.");

        assert_eq!(run_ok(&c, login("KRAJCIK@msu.edu")).await, "Welcome, Joseph Krajcik!\n");
        assert!(run_ok(&c, Command::Whoami).await.starts_with("Joseph Krajcik <krajcik@msu.edu>"));
        assert_eq!(run_ok(&c, Command::Logout).await, "You have been logged out.\n");
        assert!(!c.session.is_logged_in());
    }

    #[tokio::test]
    async fn discussion() {
        let server = Rc::new(MockServer::new());
        let c = client(&server);
        run_ok(&c, login("krajcik@msu.edu")).await;
        run_ok(
            &c,
            Command::Comments(CommentsCommand::Add {
                post: String::from("ai-in-stem"),
                content: String::from("First line\nsecond line"),
            }),
        )
        .await;
        let listed = run_ok(
            &c,
            Command::Comments(CommentsCommand::List {
                post: String::from("ai-in-stem"),
            }),
        )
        .await;
        assert!(listed.starts_with("Discussion (1)\n"));
        assert!(listed.contains("Joseph Krajcik"));
        assert!(listed.contains("  First line\n  second line\n"));
        assert_eq!(server.test_num_rows(Table::Comments), 1);
    }

    #[tokio::test]
    async fn review_needs_the_administrator() {
        let server = Rc::new(MockServer::new());
        let c = client(&server);
        run_ok(&c, login("krajcik@msu.edu")).await;
        let out = run_ok(
            &c,
            Command::Submissions(SubmissionsCommand::Submit {
                kind: String::from("essay"),
                title: String::from("Tutors"),
                content: String::from("On AI tutors"),
                tags: String::from("ai, tutoring"),
                attachment: None,
            }),
        )
        .await;
        assert!(out.starts_with("Submission received! Pending review."));
        let id = c.submissions.list_mine().await[0].id.0;

        let err = run(
            &c,
            Command::Submissions(SubmissionsCommand::SetStatus {
                id,
                status: SubmissionStatus::Approved,
            }),
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Unauthorized)));

        run_ok(&c, login("ahn@anarchy.io")).await;
        run_ok(
            &c,
            Command::Submissions(SubmissionsCommand::SetStatus {
                id,
                status: SubmissionStatus::Approved,
            }),
        )
        .await;
        let board = run_ok(&c, Command::Submissions(SubmissionsCommand::Approved { kind: None })).await;
        assert!(board.contains("Essay: Tutors"));
        assert!(board.contains("tags: ai, tutoring"));
        assert!(!board.contains("[approved]"));
    }

    #[tokio::test]
    async fn authors_delete_their_submissions() {
        let server = Rc::new(MockServer::new());
        let c = client(&server);
        let submit = || {
            Command::Submissions(SubmissionsCommand::Submit {
                kind: String::from("discussion"),
                title: String::from("Assessment"),
                content: String::from("How do we grade with AI?"),
                tags: String::new(),
                attachment: None,
            })
        };
        run_ok(&c, login("krajcik@msu.edu")).await;
        run_ok(&c, submit()).await;
        let mine = c.submissions.list_mine().await[0].id.0;
        run_ok(&c, login("namsoo@msu.edu")).await;
        run_ok(&c, submit()).await;
        let theirs = c.submissions.list_mine().await[0].id.0;

        run_ok(&c, login("krajcik@msu.edu")).await;
        let err = run(
            &c,
            Command::Submissions(SubmissionsCommand::Delete { id: theirs }),
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), format!("submission {theirs} was not deleted"));
        let out = run_ok(&c, Command::Submissions(SubmissionsCommand::Delete { id: mine })).await;
        assert_eq!(out, format!("Deleted submission {mine}\n"));
        assert_eq!(server.test_num_rows(Table::Submissions), 1);

        run_ok(&c, Command::Logout).await;
        let err = run(
            &c,
            Command::Submissions(SubmissionsCommand::Delete { id: theirs }),
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::AuthRequired)));
        assert_eq!(server.test_num_rows(Table::Submissions), 1);
    }

    #[test]
    fn attachments_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Slides.PDF");
        fs::write(&path, b"%PDF").unwrap();
        let a = read_attachment(&path).unwrap();
        assert_eq!(a.name, "Slides.PDF");
        assert_eq!(a.content_type, "application/pdf");
        assert_eq!(a.bytes, b"%PDF");
        assert_eq!(content_type("bin"), "application/octet-stream");
        assert!(read_attachment(&dir.path().join("missing.txt")).is_err());
    }
}
