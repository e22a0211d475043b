//! Email notifications for inkpost.
//!
//! Request handlers submit [`Job`]s through a [`JobQueue`] and return
//! immediately. A [`Worker`] drains the queue and hands each job to a
//! [`Notifier`], which reads the store, composes mails and passes them to a
//! [`MailSender`]. A [`Sweeper`] periodically submits
//! [`Job::CheckForNewBlogs`] so that recently published posts get announced.
//!
//! ```
//! use std::sync::Arc;
//!
//! use inkpost_domain::{MemoryStore, NewPost, NewUser, PostStatus, Store};
//! use inkpost_notify::{MemoryMailer, MemoryQueue, Notifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! let mailer = Arc::new(MemoryMailer::new());
//! let notifier = Notifier::new(store.clone(), mailer.clone(), Arc::new(MemoryQueue::new()));
//!
//! let author = store.create_user(NewUser::new("ada", "ada@example.com")).await.unwrap();
//! store
//!     .create_user(NewUser::new("bob", "bob@example.com").verified(true))
//!     .await
//!     .unwrap();
//! let post = store
//!     .create_post(NewPost::new("Hello", "World", author.id).status(PostStatus::Published))
//!     .await
//!     .unwrap();
//!
//! let outcome = notifier.send_new_blog_notification(post.id).await;
//! assert_eq!(outcome, "New blog notification sent to 1 users");
//! assert_eq!(mailer.sent_to("bob@example.com").len(), 1);
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod job;
pub mod mail;
pub mod notifier;
pub mod queue;
pub mod sweep;
pub mod template;
pub mod worker;

pub use job::Job;
pub use mail::{LogMailer, Mail, MailError, MailSender, MemoryMailer};
pub use notifier::{NotifyError, Notifier};
pub use queue::{ChannelQueue, JobQueue, JobReceiver, MemoryQueue, QueueError, channel};
pub use sweep::Sweeper;
pub use worker::Worker;
