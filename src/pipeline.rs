//! Ticket intake: classify, route, number, draft a reply, store.
//!
//! Every stage must succeed for the ticket to be persisted.

use crate::classifier::{ClassificationSource, TicketClassifier};
use crate::error::{TriageError, TriageResult};
use crate::observability::metrics::metrics;
use crate::reply::{PromptContext, ReplyGenerator};
use crate::routing::{department_for, Department};
use crate::store::{NewTicket, Store, TicketStatus};
use crate::ticket_number::generate_ticket_number;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    pub description: String,
    pub client_id: i64,
    pub client_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub ticket_number: String,
    pub queue: String,
    pub auto_reply: String,
    pub assigned_department: String,
}

/// Queue and department without drafting or storing anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedClassification {
    pub queue: String,
    pub source: ClassificationSource,
    pub department: Department,
}

#[derive(Clone)]
pub struct TriagePipeline {
    classifier: TicketClassifier,
    replies: ReplyGenerator,
    store: Store,
}

impl TriagePipeline {
    pub fn new(classifier: TicketClassifier, replies: ReplyGenerator, store: Store) -> Self {
        Self {
            classifier,
            replies,
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn classify_only(&self, text: &str) -> TriageResult<RoutedClassification> {
        let classification = self.classifier.classify(text).await.map_err(|e| {
            metrics().record_classifier_failure();
            TriageError::from(e)
        })?;

        Ok(RoutedClassification {
            department: department_for(&classification.queue),
            queue: classification.queue,
            source: classification.source,
        })
    }

    pub async fn process(&self, request: TicketRequest) -> TriageResult<TicketResponse> {
        let request_id = Uuid::new_v4();
        let span = crate::ticket_span!(request_id = %request_id, client_id = request.client_id);

        let started = Instant::now();
        let _in_flight = metrics().ticket_received();

        match self.run_stages(request).instrument(span.clone()).await {
            Ok((response, department)) => {
                metrics().ticket_created(department, started.elapsed());
                span.in_scope(|| {
                    info!(
                        ticket_number = %response.ticket_number,
                        queue = %response.queue,
                        department = %department,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Ticket created"
                    )
                });
                Ok(response)
            }
            Err(e) => {
                metrics().ticket_failed(started.elapsed());
                span.in_scope(|| error!(error = %e, "Ticket processing failed"));
                Err(e)
            }
        }
    }

    async fn run_stages(&self, request: TicketRequest) -> TriageResult<(TicketResponse, Department)> {
        let routed = self.classify_only(&request.description).await?;
        let ticket_number = generate_ticket_number();

        let ctx = PromptContext {
            ticket_text: &request.description,
            queue: &routed.queue,
            ticket_number: &ticket_number,
            client_name: &request.client_name,
        };
        let auto_reply = self.replies.generate_reply(&ctx).await.map_err(|e| {
            metrics().record_reply_failure();
            TriageError::from(e)
        })?;

        let new_ticket = NewTicket {
            ticket_number,
            client_id: request.client_id,
            client_name: request.client_name,
            body: request.description,
            predicted_queue: routed.queue.clone(),
            generated_reply: auto_reply.clone(),
            assigned_department: routed.department,
            status: TicketStatus::Pending,
        };
        let stored = self
            .store
            .run(move |store| store.insert_ticket(&new_ticket))
            .await?;

        Ok((
            TicketResponse {
                ticket_number: stored.ticket_number,
                queue: routed.queue,
                auto_reply,
                assigned_department: routed.department.as_str().to_string(),
            },
            routed.department,
        ))
    }
}
