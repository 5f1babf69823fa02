//! Acknowledgement prompt templates
//!
//! One of four tone profiles is picked from the predicted queue and rendered
//! into a prompt that fixes the reply's subject line, greeting and signature.

use serde::Serialize;

/// Reply tone selected from the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneProfile {
    SalesInquiry,
    TechnicalSupport,
    BillingReturns,
    General,
}

impl ToneProfile {
    pub fn for_queue(queue: &str) -> Self {
        match queue {
            "Sales and Pre-Sales" | "General Inquiry" => ToneProfile::SalesInquiry,
            "Technical Support" | "IT Support" | "Product Support" => {
                ToneProfile::TechnicalSupport
            }
            "Billing and Payments" | "Returns and Exchanges" => ToneProfile::BillingReturns,
            _ => ToneProfile::General,
        }
    }

    /// Noun used in the subject line
    pub fn subject_type(&self) -> &'static str {
        match self {
            ToneProfile::SalesInquiry => "inquiry",
            ToneProfile::TechnicalSupport => "support request",
            ToneProfile::BillingReturns | ToneProfile::General => "request",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ToneProfile::SalesInquiry => {
                "IMPORTANT: This is a SALES/INQUIRY ticket. The customer is interested in our products or services.
Your response should be:
- Warm, enthusiastic, and welcoming
- Express gratitude and excitement about their interest
- Show eagerness to help them with their purchase/inquiry
- DO NOT apologize - there is no issue or problem to apologize for
- Use positive language like \"We're thrilled\", \"We're excited to help\", \"Great choice\""
            }
            ToneProfile::TechnicalSupport => {
                "IMPORTANT: This is a TECHNICAL SUPPORT ticket. The customer has a problem that needs solving.
Your response should be:
- Professional and empathetic
- Acknowledge their issue and express understanding
- Apologize for any inconvenience they're experiencing
- Assure them the issue will be investigated and resolved"
            }
            ToneProfile::BillingReturns => {
                "IMPORTANT: This is a BILLING/RETURNS ticket. The customer has a financial or return-related concern.
Your response should be:
- Professional, reassuring, and understanding
- Acknowledge their concern
- Express appropriate empathy if it's a problem
- Assure them the matter will be reviewed promptly"
            }
            ToneProfile::General => {
                "Your response should be professional, helpful, and appropriately match the customer's message tone.
If they're reporting a problem, be empathetic and apologize.
If they're making an inquiry or showing interest, be welcoming and enthusiastic."
            }
        }
    }
}

/// Persona the reply is signed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotPersona {
    pub name: String,
    pub company: String,
}

impl Default for BotPersona {
    fn default() -> Self {
        Self {
            name: "Shanyan AI Bot".to_string(),
            company: "Shanyan AI".to_string(),
        }
    }
}

/// Everything the template needs about one ticket
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub ticket_text: &'a str,
    pub queue: &'a str,
    pub ticket_number: &'a str,
    pub client_name: &'a str,
}

pub fn subject_line(queue: &str, ticket_number: &str) -> String {
    format!(
        "Subject: Regarding your recent {} {} - [Ticket Number - {}]",
        queue.to_lowercase(),
        ToneProfile::for_queue(queue).subject_type(),
        ticket_number
    )
}

pub fn build_prompt(persona: &BotPersona, ctx: &PromptContext<'_>) -> String {
    let tone = ToneProfile::for_queue(ctx.queue);
    let bot = &persona.name;
    let company = &persona.company;

    format!(
        "You are {bot}, a customer support assistant for {company} company.

Ticket Number: {number}
Ticket Category: {queue}
Customer Name: {client}
Customer Message: {text}

{instruction}

Write a professional acknowledgement reply with this format:

{subject}

Dear {client},

[Write 2-3 sentences that appropriately respond to their message based on the tone instruction above. Summarize what they're asking about and express the appropriate sentiment.]

[Write 1-2 sentences about next steps - either how you'll help them with their purchase/inquiry OR how you'll investigate their issue.]

Sincerely,
{bot}
{company} Customer Support

CRITICAL: Match your tone to the ticket category. Sales inquiries should be enthusiastic. Support issues should be empathetic with apologies.
",
        number = ctx.ticket_number,
        queue = ctx.queue,
        client = ctx.client_name,
        text = ctx.ticket_text,
        instruction = tone.instruction(),
        subject = subject_line(ctx.queue, ctx.ticket_number),
    )
}
