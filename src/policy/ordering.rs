use std::cmp::Ordering;

use crate::models::{Comment, News};

/// Newest publication date first.
pub fn news_by_date_desc(a: &News, b: &News) -> Ordering {
    b.date.cmp(&a.date)
}

/// Oldest comment first.
pub fn comments_by_created_asc(a: &Comment, b: &Comment) -> Ordering {
    a.created.cmp(&b.created)
}

/// First page of the news feed. The sort is stable, so items sharing a date keep the
/// order they were given in.
pub fn news_page(mut news: Vec<News>, page_size: usize) -> Vec<News> {
    news.sort_by(news_by_date_desc);
    news.truncate(page_size);
    news
}

/// A news item's comments in thread order.
pub fn comment_thread(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by(comments_by_created_asc);
    comments
}
