//! The stock analyst: grounded question answering with an audit trail.

use thiserror::Error;

use stockpilot_core::{AuditMeta, NewAuditedQuery};
use stockpilot_insights::{build_context, InsightsService};
use stockpilot_store::{CommerceStore, StoreError};

use crate::chat::ChatMessage;
use crate::client::{CompletionClient, CompletionError};

/// Audit record tag for this subsystem.
pub const QUERY_TYPE: &str = "stock_analyst";

/// Upper bound on question length, matched by the HTTP layer.
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Fixed persona and answer contract for every analysis.
pub const SYSTEM_PROMPT: &str = "\
You are a senior commerce back-office analyst for an e-commerce cosmetics brand.
You have access to inventory, sales, and promotion data.

GOALS:
1. Analyse stock levels, sales performance, discounts and expiries.
2. Highlight risks (stockouts, overstock, expiring items).
3. Suggest clear, practical actions (reorder, change discounts, run promotions, stop discounts, etc.).

RULES:
- Base your advice ONLY on the provided context. Do NOT invent data.
- If the user asks for something you don't have data for, say so and suggest what data is needed.
- Always structure your answer with these sections (if relevant):

   1) Inventory Health
   2) Sales Performance & Best Sellers
   3) Promotions & Discounts
   4) Risks & Alerts (stockout / expiry)
   5) Recommended Actions (bullet point list)

- Use bullet points and short paragraphs suitable for a commerce back-office dashboard.";

/// Canned question behind the daily-summary endpoint.
pub const DAILY_SUMMARY_QUESTION: &str = "\
Provide a concise daily commerce back-office summary.
Focus on:
- today's total sales and orders (if visible in the context),
- any obvious best-selling items,
- urgent stock risks (low stock / near expiry),
- any important notes on discounts.

Keep it under 10 bullet points.";

#[derive(Debug, Error)]
pub enum AnalystError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Grounded analyst over a store / completion-client pair.
pub struct StockAnalyst<S, C> {
    store: S,
    insights: InsightsService<S>,
    completion: C,
    /// Label stamped into each audit record's metadata.
    generated_by: String,
}

impl<S, C> StockAnalyst<S, C>
where
    S: CommerceStore + Clone,
    C: CompletionClient,
{
    pub fn new(store: S, completion: C, generated_by: impl Into<String>) -> Self {
        Self {
            insights: InsightsService::new(store.clone()),
            store,
            completion,
            generated_by: generated_by.into(),
        }
    }

    /// Answer a question grounded in the current aggregates.
    ///
    /// On success one audit record is persisted; audit persistence is
    /// best-effort and can neither fail nor delay the returned answer
    /// beyond the write itself.
    pub async fn analyse(&self, question: &str) -> Result<String, AnalystError> {
        if question.trim().is_empty() {
            return Err(AnalystError::Validation(
                "question must not be empty".to_string(),
            ));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(AnalystError::Validation(format!(
                "question must be at most {MAX_QUESTION_CHARS} characters"
            )));
        }

        let snapshot = self.insights.analyst_snapshot().await?;
        let context = build_context(&snapshot);

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Here is the current commerce back-office context:\n\n{context}\n\nUser question:\n{question}"
            )),
        ];

        let answer = self.completion.complete(&messages).await?;

        let audit = NewAuditedQuery {
            query_type: QUERY_TYPE.to_string(),
            question: question.to_string(),
            answer: Some(answer.clone()),
            meta: AuditMeta::new(
                snapshot.totals.total_products,
                snapshot.totals.total_orders,
                snapshot.totals.total_revenue,
                self.generated_by.clone(),
            ),
        };
        // The answer is already in hand; a failed audit write must not take
        // it away from the caller.
        if let Err(err) = self.store.record_query(audit).await {
            tracing::warn!(error = %err, "failed to persist analyst audit record");
        }

        Ok(answer)
    }

    /// The fixed daily briefing, delegated to [`Self::analyse`].
    pub async fn daily_summary(&self) -> Result<String, AnalystError> {
        self.analyse(DAILY_SUMMARY_QUESTION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};
    use stockpilot_core::{Order, Product};
    use stockpilot_store::InMemoryStore;

    struct FakeCompletion {
        reply: Option<String>,
        calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    impl FakeCompletion {
        fn answering(reply: &str) -> (Self, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    reply: Some(reply.to_string()),
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn failing() -> (Self, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    reply: None,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl CompletionClient for FakeCompletion {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(CompletionError::Api(502, "upstream down".to_string())),
            }
        }
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::arc();
        store.seed_product(Product {
            shopify_id: 1,
            title: "Lip Gloss".to_string(),
            total_inventory: 3,
            ..Default::default()
        });
        store.seed_order(Order {
            shopify_id: 100,
            total_price: "19.00".parse().unwrap(),
            ..Default::default()
        });
        store
    }

    #[tokio::test]
    async fn empty_question_fails_before_any_external_call() {
        let store = seeded_store();
        let (completion, calls) = FakeCompletion::answering("fine");
        let analyst = StockAnalyst::new(store.clone(), completion, "test");

        for question in ["", "   "] {
            let err = analyst.analyse(question).await.unwrap_err();
            assert!(matches!(err, AnalystError::Validation(_)));
        }
        assert!(calls.lock().unwrap().is_empty());
        assert!(store.audited_queries().is_empty());
    }

    #[tokio::test]
    async fn oversize_question_is_rejected() {
        let store = seeded_store();
        let (completion, calls) = FakeCompletion::answering("fine");
        let analyst = StockAnalyst::new(store, completion, "test");

        let err = analyst.analyse(&"x".repeat(2001)).await.unwrap_err();
        assert!(matches!(err, AnalystError::Validation(_)));
        assert!(calls.lock().unwrap().is_empty());

        // 2000 characters is still acceptable.
        analyst.analyse(&"x".repeat(2000)).await.unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn successful_analysis_persists_one_audit_record() {
        let store = seeded_store();
        let (completion, _calls) = FakeCompletion::answering("Stock looks healthy.");
        let analyst = StockAnalyst::new(store.clone(), completion, "stockpilot");

        let answer = analyst.analyse("How is stock?").await.unwrap();
        assert_eq!(answer, "Stock looks healthy.");

        let queries = store.audited_queries();
        assert_eq!(queries.len(), 1);
        let record = &queries[0];
        assert_eq!(record.query_type, "stock_analyst");
        assert_eq!(record.question, "How is stock?");
        assert_eq!(record.answer.as_deref(), Some("Stock looks healthy."));
        assert_eq!(record.meta.schema_version, 1);
        assert_eq!(record.meta.total_products, 1);
        assert_eq!(record.meta.total_orders, 1);
        assert_eq!(record.meta.total_revenue, "19.00".parse::<Decimal>().unwrap());
        assert_eq!(record.meta.generated_by, "stockpilot");
    }

    #[tokio::test]
    async fn completion_failure_persists_nothing() {
        let store = seeded_store();
        let (completion, calls) = FakeCompletion::failing();
        let analyst = StockAnalyst::new(store.clone(), completion, "test");

        let err = analyst.analyse("How is stock?").await.unwrap_err();
        assert!(matches!(err, AnalystError::Completion(_)));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(store.audited_queries().is_empty());
    }

    #[tokio::test]
    async fn conversation_is_system_then_grounded_user_turn() {
        let store = seeded_store();
        let (completion, calls) = FakeCompletion::answering("ok");
        let analyst = StockAnalyst::new(store, completion, "test");

        analyst.analyse("How is stock?").await.unwrap();

        let calls = calls.lock().unwrap();
        let messages = &calls[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, crate::chat::Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);

        assert_eq!(messages[1].role, crate::chat::Role::User);
        assert!(messages[1].content.contains("=== High-level Summary ==="));
        assert!(messages[1].content.contains("Lip Gloss"));
        assert!(messages[1].content.ends_with("User question:\nHow is stock?"));
    }

    #[tokio::test]
    async fn daily_summary_delegates_with_the_canned_question() {
        let store = seeded_store();
        let (completion, calls) = FakeCompletion::answering("ok");
        let analyst = StockAnalyst::new(store.clone(), completion, "test");

        analyst.daily_summary().await.unwrap();

        let calls = calls.lock().unwrap();
        assert!(calls[0][1]
            .content
            .ends_with(&format!("User question:\n{DAILY_SUMMARY_QUESTION}")));

        let queries = store.audited_queries();
        assert_eq!(queries[0].question, DAILY_SUMMARY_QUESTION);
    }
}
