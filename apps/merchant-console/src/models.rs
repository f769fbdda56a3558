//! Data models for the merchant console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tui_table::TableRow;

/// Unique merchant identifier. Higher ids are newer merchants.
pub type MerchantId = u64;

/// Lifecycle status of a merchant account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MerchantStatus {
    #[default]
    Pending,
    UnderReview,
    Active,
    Suspended,
    Rejected,
}

impl MerchantStatus {
    pub const ALL: [MerchantStatus; 5] = [
        MerchantStatus::Pending,
        MerchantStatus::UnderReview,
        MerchantStatus::Active,
        MerchantStatus::Suspended,
        MerchantStatus::Rejected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MerchantStatus::Pending => "Pending",
            MerchantStatus::UnderReview => "Under review",
            MerchantStatus::Active => "Active",
            MerchantStatus::Suspended => "Suspended",
            MerchantStatus::Rejected => "Rejected",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            MerchantStatus::Pending => "pending",
            MerchantStatus::UnderReview => "under_review",
            MerchantStatus::Active => "active",
            MerchantStatus::Suspended => "suspended",
            MerchantStatus::Rejected => "rejected",
        }
    }

    /// Color name used by the status badge.
    pub fn color(&self) -> &'static str {
        match self {
            MerchantStatus::Pending => "yellow",
            MerchantStatus::UnderReview => "cyan",
            MerchantStatus::Active => "green",
            MerchantStatus::Suspended => "red",
            MerchantStatus::Rejected => "darkgray",
        }
    }

    /// Waiting for an approve/reject decision.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, MerchantStatus::Pending | MerchantStatus::UnderReview)
    }

    /// Transitions allowed from this status.
    pub fn transitions(&self) -> Vec<StatusTransition> {
        StatusTransition::ALL
            .into_iter()
            .filter(|t| self.apply(*t).is_some())
            .collect()
    }

    /// Status reached by applying `transition`, if it is allowed.
    pub fn apply(&self, transition: StatusTransition) -> Option<MerchantStatus> {
        match (self, transition) {
            (MerchantStatus::Pending | MerchantStatus::UnderReview, StatusTransition::Approve) => {
                Some(MerchantStatus::Active)
            }
            (MerchantStatus::Pending | MerchantStatus::UnderReview, StatusTransition::Reject) => {
                Some(MerchantStatus::Rejected)
            }
            (MerchantStatus::Active, StatusTransition::Suspend) => Some(MerchantStatus::Suspended),
            (MerchantStatus::Suspended, StatusTransition::Activate) => Some(MerchantStatus::Active),
            _ => None,
        }
    }
}

impl fmt::Display for MerchantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Know-your-customer verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KycStatus {
    #[default]
    NotStarted,
    Submitted,
    Verified,
    Failed,
}

impl KycStatus {
    pub fn label(&self) -> &'static str {
        match self {
            KycStatus::NotStarted => "KYC not started",
            KycStatus::Submitted => "KYC submitted",
            KycStatus::Verified => "KYC verified",
            KycStatus::Failed => "KYC failed",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            KycStatus::NotStarted => "not_started",
            KycStatus::Submitted => "submitted",
            KycStatus::Verified => "verified",
            KycStatus::Failed => "failed",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            KycStatus::NotStarted => "gray",
            KycStatus::Submitted => "yellow",
            KycStatus::Verified => "green",
            KycStatus::Failed => "red",
        }
    }
}

/// Risk rating assigned during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "red",
        }
    }
}

/// Operations that move a merchant between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTransition {
    Approve,
    Reject,
    Suspend,
    Activate,
}

impl StatusTransition {
    pub const ALL: [StatusTransition; 4] = [
        StatusTransition::Approve,
        StatusTransition::Reject,
        StatusTransition::Suspend,
        StatusTransition::Activate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatusTransition::Approve => "Approve",
            StatusTransition::Reject => "Reject",
            StatusTransition::Suspend => "Suspend",
            StatusTransition::Activate => "Activate",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            StatusTransition::Approve => "approve",
            StatusTransition::Reject => "reject",
            StatusTransition::Suspend => "suspend",
            StatusTransition::Activate => "activate",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            StatusTransition::Approve => "approved",
            StatusTransition::Reject => "rejected",
            StatusTransition::Suspend => "suspended",
            StatusTransition::Activate => "activated",
        }
    }
}

/// Settlement bank account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub routing_code: String,
}

impl BankDetails {
    /// Account number with all but the last four characters hidden.
    pub fn masked_account(&self) -> String {
        let compact: Vec<char> = self
            .account_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if compact.len() <= 4 {
            return compact.into_iter().collect();
        }
        let tail: String = compact[compact.len() - 4..].iter().collect();
        format!("\u{2022}\u{2022}\u{2022}\u{2022} {}", tail)
    }
}

/// Entry in a merchant's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// A merchant account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub business_name: String,
    pub legal_name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub category: String,
    /// ISO 3166 alpha-2
    pub country: String,
    /// ISO 4217
    pub currency: String,
    pub status: MerchantStatus,
    pub kyc: KycStatus,
    pub risk: RiskLevel,
    /// Processed volume over the last 30 days, in minor units
    pub monthly_volume: i64,
    pub transaction_count: u64,
    pub bank: BankDetails,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub activity: Vec<ActivityEvent>,
}

impl Merchant {
    /// A new pending merchant built from a submitted draft.
    pub fn from_draft(id: MerchantId, draft: MerchantDraft, now: DateTime<Utc>) -> Self {
        let mut merchant = Self {
            id,
            business_name: String::new(),
            legal_name: String::new(),
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            category: String::new(),
            country: String::new(),
            currency: String::new(),
            status: MerchantStatus::Pending,
            kyc: KycStatus::Submitted,
            risk: RiskLevel::default(),
            monthly_volume: 0,
            transaction_count: 0,
            bank: BankDetails::default(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
            activity: Vec::new(),
        };
        merchant.apply_draft(draft);
        merchant.log(now, "Merchant created");
        merchant
    }

    /// Overwrite the editable fields.
    pub fn apply_draft(&mut self, draft: MerchantDraft) {
        self.business_name = draft.business_name;
        self.legal_name = draft.legal_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.website = draft.website;
        self.category = draft.category;
        self.country = draft.country;
        self.currency = draft.currency;
        self.bank = draft.bank;
        self.notes = draft.notes;
    }

    /// Append to the activity log and bump `updated_at`.
    pub fn log(&mut self, at: DateTime<Utc>, message: impl Into<String>) {
        self.updated_at = at;
        self.activity.push(ActivityEvent {
            at,
            message: message.into(),
        });
    }

    fn label_value(label: &str, key: &str, color: &str) -> Value {
        json!({ "label": label, "value": key, "color": color })
    }
}

/// Field names exposed to the table, in display order.
pub const MERCHANT_FIELDS: [&str; 15] = [
    "id",
    "business_name",
    "legal_name",
    "email",
    "phone",
    "website",
    "category",
    "country",
    "currency",
    "status",
    "kyc",
    "risk",
    "monthly_volume",
    "transaction_count",
    "created_at",
];

impl TableRow for Merchant {
    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.to_string()),
            "business_name" => Value::from(self.business_name.as_str()),
            "legal_name" => Value::from(self.legal_name.as_str()),
            "email" => Value::from(self.email.as_str()),
            "phone" => Value::from(self.phone.as_str()),
            "website" => Value::from(self.website.as_str()),
            "category" => Value::from(self.category.as_str()),
            "country" => Value::from(self.country.as_str()),
            "currency" => Value::from(self.currency.as_str()),
            "status" => {
                Self::label_value(self.status.label(), self.status.key(), self.status.color())
            }
            "kyc" => Self::label_value(self.kyc.label(), self.kyc.key(), self.kyc.color()),
            "risk" => Self::label_value(self.risk.label(), self.risk.key(), self.risk.color()),
            "monthly_volume" => Value::from(self.monthly_volume),
            "transaction_count" => Value::from(self.transaction_count),
            "created_at" => Value::from(self.created_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }

    fn fields(&self) -> Vec<(String, Value)> {
        MERCHANT_FIELDS
            .iter()
            .filter_map(|name| self.field(name).map(|value| (name.to_string(), value)))
            .collect()
    }
}

/// Editable merchant fields, as collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerchantDraft {
    pub business_name: String,
    pub legal_name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub category: String,
    pub country: String,
    pub currency: String,
    pub bank: BankDetails,
    pub notes: String,
}

impl From<&Merchant> for MerchantDraft {
    fn from(merchant: &Merchant) -> Self {
        Self {
            business_name: merchant.business_name.clone(),
            legal_name: merchant.legal_name.clone(),
            email: merchant.email.clone(),
            phone: merchant.phone.clone(),
            website: merchant.website.clone(),
            category: merchant.category.clone(),
            country: merchant.country.clone(),
            currency: merchant.currency.clone(),
            bank: merchant.bank.clone(),
            notes: merchant.notes.clone(),
        }
    }
}
