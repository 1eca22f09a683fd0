//! The accumulating lead record and its merge semantics.

use serde::{Deserialize, Serialize};

/// Structured lead data accumulated across wizard turns.
///
/// Fields only ever transition absent → present; a later extraction never
/// overwrites or retracts a value that is already known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
}

/// Fields extracted from a single wizard turn.
///
/// Same shape as `LeadRecord`, but parsed from untrusted provider output:
/// missing keys, explicit nulls, and empty strings all count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub bot_name: Option<String>,
}

impl ExtractedFields {
    /// Whether this snapshot carries any usable value at all.
    pub fn is_empty(&self) -> bool {
        let fields = [
            &self.customer_name,
            &self.email,
            &self.business_name,
            &self.industry,
            &self.channel,
            &self.problem,
            &self.bot_name,
        ];
        fields
            .iter()
            .all(|f| f.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

/// First non-empty value wins; an already-present field is never touched.
fn merge_field(current: &mut Option<String>, incoming: &Option<String>) {
    if current.is_some() {
        return;
    }
    if let Some(value) = incoming {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *current = Some(trimmed.to_string());
        }
    }
}

impl LeadRecord {
    /// Merge one turn's extraction into the record.
    ///
    /// Idempotent under a fixed snapshot: re-applying the same
    /// `ExtractedFields` a second time is a no-op.
    pub fn merge(&mut self, extracted: &ExtractedFields) {
        merge_field(&mut self.customer_name, &extracted.customer_name);
        merge_field(&mut self.email, &extracted.email);
        merge_field(&mut self.business_name, &extracted.business_name);
        merge_field(&mut self.industry, &extracted.industry);
        merge_field(&mut self.channel, &extracted.channel);
        merge_field(&mut self.problem, &extracted.problem);
        merge_field(&mut self.bot_name, &extracted.bot_name);
    }

    /// Names of fields still absent, in display order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.customer_name.is_none() {
            missing.push("customer_name");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.business_name.is_none() {
            missing.push("business_name");
        }
        if self.industry.is_none() {
            missing.push("industry");
        }
        if self.channel.is_none() {
            missing.push("channel");
        }
        if self.problem.is_none() {
            missing.push("problem");
        }
        if self.bot_name.is_none() {
            missing.push("bot_name");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
