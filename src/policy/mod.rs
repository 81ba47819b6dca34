//! Mutation and listing rules shared by the news and notes handlers.
//!
//! Everything here is a synchronous decision over values already loaded from the
//! repository, except [`slug::assign_slug`], which also consults the repository for
//! uniqueness.

pub mod moderation;
pub mod ordering;
pub mod ownership;
pub mod slug;

pub use moderation::{BAD_WORDS, Verdict, WARNING, validate_text};
pub use ordering::{comments_by_created_asc, news_by_date_desc};
pub use ownership::{Decision, Owned, authorize};
pub use slug::{assign_slug, slugify};
