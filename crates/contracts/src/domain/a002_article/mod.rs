pub mod aggregate;

pub use aggregate::{Article, ArticleListResponse, CreateArticleDto, UpdateArticleDto};
