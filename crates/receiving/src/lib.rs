//! Receiving domain module (incoming articles and their QC workflow).
//!
//! An incoming article is one delivered consignment of a single part number.
//! It moves `pending → counted → qc_complete → approved`; approval is the
//! moment the accepted quantity becomes stock.

pub mod article;

pub use article::{
    Approve, ArticleApproved, ArticleCommand, ArticleCounted, ArticleEvent, ArticleId,
    ArticlePatch, ArticleRegistered, ArticleRemoved, ArticleReverted, ArticleStatus,
    ArticleUpdated, CompleteQc, CostBreakdown, IncomingArticle, QcCompleted, RecordCount,
    RegisterArticle, RemoveArticle, UpdateArticle, Verify,
};
