use chrono::Utc;
use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;
use stockroom_events::EventBus;
use stockroom_inventory::{AdjustStock, Part, PartCommand, StockMovementReason};
use stockroom_receiving::{
    Approve, ArticleCommand, ArticleId, ArticlePatch, CompleteQc, CostBreakdown, IncomingArticle,
    RecordCount, RegisterArticle, RemoveArticle, UpdateArticle, Verify,
};
use stockroom_vendors::VendorId;

use super::{ARTICLE, Applied, InventoryStore, PART, State, decide, missing};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

/// A delivery to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub part_number: String,
    pub vendor_id: VendorId,
    pub quantity: u64,
    pub costs: CostBreakdown,
}

/// The verification form: two checkboxes plus what each one unlocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub counted: bool,
    #[serde(default)]
    pub final_accepted_quantity: Option<u64>,
    pub qc_complete: bool,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub checklist_url: Option<String>,
}

/// Result of approving an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    pub article: IncomingArticle,
    /// The part whose stock grew, with its new level. `None` when no part
    /// carries the article's part number or nothing was accepted.
    pub part: Option<Part>,
}

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn list_articles(&self) -> StoreResult<Vec<IncomingArticle>> {
        Ok(self.read()?.articles.list().into_iter().cloned().collect())
    }

    pub fn article(&self, id: ArticleId) -> StoreResult<IncomingArticle> {
        self.read()?.articles.get(&id).cloned().ok_or_else(missing)
    }

    pub fn register_article(&self, new: NewArticle) -> StoreResult<IncomingArticle> {
        let article_id = ArticleId::generate();
        let command = ArticleCommand::RegisterArticle(RegisterArticle {
            article_id,
            part_number: new.part_number,
            vendor_id: new.vendor_id,
            quantity: new.quantity,
            costs: new.costs,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let (article, events) = decide(&IncomingArticle::empty(article_id), &command)?;
            state.ensure_vendor(article.vendor_id())?;

            let entries = state.journal_events(article_id.0, ARTICLE, &events)?;
            state.articles.upsert(article_id, article.clone());
            tracing::info!(
                "registered incoming article {article_id}: {} x {}",
                article.part_number(),
                article.quantity()
            );
            Ok((article, entries))
        })
    }

    /// Edit a pending article; landed cost is recomputed.
    pub fn update_article(&self, article_id: ArticleId, patch: ArticlePatch) -> StoreResult<IncomingArticle> {
        let vendor_changed = patch.vendor_id;
        let command = ArticleCommand::UpdateArticle(UpdateArticle {
            article_id,
            patch,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            if let Some(vendor_id) = vendor_changed {
                state.ensure_vendor(vendor_id)?;
            }
            state.apply_article(article_id, &command)
        })
    }

    pub fn record_count(&self, article_id: ArticleId, final_accepted_quantity: u64) -> StoreResult<IncomingArticle> {
        let command = ArticleCommand::RecordCount(RecordCount {
            article_id,
            final_accepted_quantity,
            occurred_at: Utc::now(),
        });
        self.mutate(|state| state.apply_article(article_id, &command))
    }

    pub fn complete_qc(
        &self,
        article_id: ArticleId,
        remarks: Option<String>,
        checklist_url: Option<String>,
    ) -> StoreResult<IncomingArticle> {
        let command = ArticleCommand::CompleteQc(CompleteQc {
            article_id,
            remarks,
            checklist_url,
            occurred_at: Utc::now(),
        });
        self.mutate(|state| state.apply_article(article_id, &command))
    }

    /// Save the verification form; the article moves to whatever status the
    /// checkboxes describe, including back to pending.
    pub fn verify_article(&self, article_id: ArticleId, form: Verification) -> StoreResult<IncomingArticle> {
        let command = ArticleCommand::Verify(Verify {
            article_id,
            counted: form.counted,
            final_accepted_quantity: form.final_accepted_quantity,
            qc_complete: form.qc_complete,
            remarks: form.remarks,
            checklist_url: form.checklist_url,
            occurred_at: Utc::now(),
        });
        self.mutate(|state| state.apply_article(article_id, &command))
    }

    /// Approve a QC-complete article and book its accepted quantity into stock.
    ///
    /// The part is found by part number. When none matches the article is
    /// still approved and the stock update is skipped with a warning.
    pub fn approve_article(&self, article_id: ArticleId) -> StoreResult<ApprovalOutcome> {
        let occurred_at = Utc::now();
        let command = ArticleCommand::Approve(Approve {
            article_id,
            occurred_at,
        });

        self.mutate(|state| {
            let current = state.articles.get(&article_id).ok_or_else(missing)?;
            let (article, article_events) = decide(current, &command)?;
            let accepted = article.accepted_quantity();

            let restock = match state.part_id_by_number(article.part_number()) {
                Some(_) if accepted == 0 => None,
                Some(part_id) => {
                    let part = state.parts.get(&part_id).ok_or_else(missing)?;
                    let delta = i64::try_from(accepted)
                        .map_err(|_| DomainError::validation("accepted quantity is too large"))?;
                    let adjust = PartCommand::AdjustStock(AdjustStock {
                        part_id,
                        delta,
                        reason: StockMovementReason::Receipt {
                            article_id: article_id.0,
                        },
                        occurred_at,
                    });
                    Some(decide(part, &adjust)?)
                }
                None => {
                    tracing::warn!(
                        "approved article {article_id} matches no part with number {}; stock unchanged",
                        article.part_number()
                    );
                    None
                }
            };

            let mut batch = state.journal.batch();
            batch.push(article_id.0, ARTICLE, &article_events)?;
            if let Some((part, part_events)) = &restock {
                batch.push(part.id_typed().0, PART, part_events)?;
            }
            let entries = state.journal.commit(batch);

            state.articles.upsert(article_id, article.clone());
            let part = restock.map(|(part, _)| {
                state.parts.upsert(part.id_typed(), part.clone());
                part
            });

            tracing::info!(
                "approved article {article_id}: {accepted} x {} accepted",
                article.part_number()
            );
            Ok((ApprovalOutcome { article, part }, entries))
        })
    }

    /// Delete an article that has not been approved yet.
    pub fn delete_article(&self, article_id: ArticleId) -> StoreResult<()> {
        let command = ArticleCommand::RemoveArticle(RemoveArticle {
            article_id,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.articles.get(&article_id).ok_or_else(missing)?;
            let (_, events) = decide(current, &command)?;
            let entries = state.journal_events(article_id.0, ARTICLE, &events)?;
            state.articles.remove(&article_id);
            Ok(((), entries))
        })
    }
}

impl State {
    fn apply_article(&mut self, article_id: ArticleId, command: &ArticleCommand) -> StoreResult<Applied<IncomingArticle>> {
        let current = self.articles.get(&article_id).ok_or_else(missing)?;
        let (article, events) = decide(current, command)?;
        let entries = self.journal_events(article_id.0, ARTICLE, &events)?;
        tracing::debug!("article {article_id} is now {}", article.status().as_str());
        self.articles.upsert(article_id, article.clone());
        Ok((article, entries))
    }
}
