//! Subjects and bodies of the notification mails.
use inkpost_domain::{BlogPost, Comment, User};

use crate::mail::Mail;

/// Mail telling `author` that `comment` was left on `post`.
///
/// `commenter` is `None` for anonymous comments.
pub fn comment_notification(
    from: &str,
    author: &User,
    post: &BlogPost,
    commenter: Option<&User>,
    comment: &Comment,
) -> Mail {
    let commenter = commenter.map_or("Anonymous", |user| user.username.as_str());
    let body = format!(
        "Hello {author},\n\n\
         Someone has commented on your blog post \"{title}\".\n\n\
         Comment by: {commenter}\n\
         Comment: {text}\n\n\
         Visit your blog to see the comment and respond.\n\n\
         Best regards,\n\
         The Inkpost Team\n",
        author = author.username,
        title = post.title,
        text = comment.comment,
    );
    Mail::new(format!("New comment on your blog post: {}", post.title), body, from).to(&author.email)
}

/// Mail announcing `post` to `recipient`.
///
/// `author` is `None` when the owning user no longer resolves.
pub fn new_blog_notification(from: &str, recipient: &User, post: &BlogPost, author: Option<&User>) -> Mail {
    let author = author.map_or("Anonymous", |user| user.username.as_str());
    let mut body = format!(
        "Hello {name},\n\n\
         A new blog post has been published!\n\n\
         Title: {title}\n\
         Author: {author}\n",
        name = recipient.username,
        title = post.title,
    );
    if !post.subtitle.is_empty() {
        body.push_str(&post.subtitle);
        body.push('\n');
    }
    body.push_str("\nCheck it out now on Inkpost!\n\nBest regards,\nThe Inkpost Team\n");
    Mail::new(format!("New Blog Post: {}", post.title), body, from).to(&recipient.email)
}

/// Mail relaying a contact form submission to `to`.
pub fn contact_message(to: &str, name: &str, email: &str, subject: &str, message: &str) -> Mail {
    Mail::new(subject, format!("From: {name} <{email}>\n\n{message}"), email).to(to)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use inkpost_domain::PostStatus;

    use super::*;

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            username: name.into(),
            email: format!("{name}@example.com"),
            is_active: true,
            is_email_verified: true,
        }
    }

    fn post(subtitle: &str) -> BlogPost {
        BlogPost {
            id: 1,
            title: "Test Blog".into(),
            slug: "test-blog".into(),
            subtitle: subtitle.into(),
            content: "Test content".into(),
            published_date: Utc::now(),
            status: PostStatus::Published,
            author: 1,
        }
    }

    #[test]
    fn test_comment_notification() {
        let author = user(1, "author");
        let comment = Comment {
            id: 1,
            comment: "Great post!".into(),
            created_at: Utc::now(),
            post: 1,
            user: None,
            reply: None,
        };
        let mail = comment_notification("noreply@example.com", &author, &post(""), None, &comment);
        assert_eq!(mail.subject, "New comment on your blog post: Test Blog");
        assert_eq!(mail.to, ["author@example.com"]);
        assert_eq!(mail.from, "noreply@example.com");
        assert!(mail.body.contains("Comment by: Anonymous"));
        assert!(mail.body.contains("Comment: Great post!"));
        assert!(mail.body.contains("\"Test Blog\""));

        let commenter = user(2, "commenter");
        let mail = comment_notification("noreply@example.com", &author, &post(""), Some(&commenter), &comment);
        assert!(mail.body.contains("Comment by: commenter"));
    }

    #[test]
    fn test_new_blog_notification() {
        let author = user(1, "author");
        let reader = user(2, "reader");
        let mail = new_blog_notification("noreply@example.com", &reader, &post("A subtitle"), Some(&author));
        assert_eq!(mail.subject, "New Blog Post: Test Blog");
        assert_eq!(mail.to, ["reader@example.com"]);
        assert!(mail.body.starts_with("Hello reader,"));
        assert!(mail.body.contains("Title: Test Blog\nAuthor: author\nA subtitle\n"));

        let mail = new_blog_notification("noreply@example.com", &reader, &post(""), Some(&author));
        assert!(mail.body.contains("Author: author\n\nCheck it out"));
    }

    #[test]
    fn test_contact_message() {
        let mail = contact_message("contact@example.com", "Ada", "ada@example.com", "Hello", "Nice blog");
        assert_eq!(mail.subject, "Hello");
        assert_eq!(mail.from, "ada@example.com");
        assert_eq!(mail.to, ["contact@example.com"]);
        assert_eq!(mail.body, "From: Ada <ada@example.com>\n\nNice blog");
    }
}
