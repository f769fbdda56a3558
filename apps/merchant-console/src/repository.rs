//! Merchant storage.

use crate::models::{
    BankDetails, KycStatus, Merchant, MerchantDraft, MerchantId, MerchantStatus, RiskLevel,
    StatusTransition,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;

/// Repository errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Merchant not found: {0}")]
    NotFound(MerchantId),
    #[error("Cannot {} a merchant that is {}", .transition.verb(), .from.label().to_lowercase())]
    InvalidTransition {
        from: MerchantStatus,
        transition: StatusTransition,
    },
    #[error("Invalid merchant: {0}")]
    Validation(String),
    #[error("A merchant with email {0} already exists")]
    Duplicate(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Source of merchant records.
pub trait MerchantRepository {
    /// All merchants, in id order.
    fn list(&self) -> Vec<Merchant>;

    fn get(&self, id: MerchantId) -> RepoResult<Merchant>;

    /// Store a new pending merchant.
    fn create(&mut self, draft: MerchantDraft) -> RepoResult<Merchant>;

    /// Replace the editable fields of a merchant.
    fn update(&mut self, id: MerchantId, draft: MerchantDraft) -> RepoResult<Merchant>;

    fn set_status(&mut self, id: MerchantId, transition: StatusTransition) -> RepoResult<Merchant>;

    /// Remove a merchant. Active merchants must be suspended first.
    fn delete(&mut self, id: MerchantId) -> RepoResult<Merchant>;

    /// Merchants waiting for an approve/reject decision.
    fn review_queue(&self) -> Vec<Merchant> {
        self.list()
            .into_iter()
            .filter(|m| m.status.is_reviewable())
            .collect()
    }
}

/// In-memory repository seeded with mock merchants.
#[derive(Debug, Clone)]
pub struct MockMerchantRepository {
    merchants: Vec<Merchant>,
    next_id: MerchantId,
}

impl Default for MockMerchantRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMerchantRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self {
            merchants: Vec::new(),
            next_id: 1,
        }
    }

    /// Repository holding the deterministic mock data set.
    pub fn seeded() -> Self {
        let merchants = seed_merchants();
        let next_id = merchants.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        Self { merchants, next_id }
    }

    fn position(&self, id: MerchantId) -> RepoResult<usize> {
        self.merchants
            .iter()
            .position(|m| m.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }

    fn check_draft(&self, draft: &MerchantDraft, except: Option<MerchantId>) -> RepoResult<()> {
        if draft.business_name.trim().is_empty() {
            return Err(RepositoryError::Validation("business name is required".into()));
        }
        if !draft.email.contains('@') {
            return Err(RepositoryError::Validation("email address is invalid".into()));
        }
        let duplicate = self.merchants.iter().any(|m| {
            Some(m.id) != except && m.email.eq_ignore_ascii_case(draft.email.trim())
        });
        if duplicate {
            return Err(RepositoryError::Duplicate(draft.email.trim().to_string()));
        }
        Ok(())
    }
}

impl MerchantRepository for MockMerchantRepository {
    fn list(&self) -> Vec<Merchant> {
        let mut merchants = self.merchants.clone();
        merchants.sort_by_key(|m| m.id);
        merchants
    }

    fn get(&self, id: MerchantId) -> RepoResult<Merchant> {
        let idx = self.position(id)?;
        Ok(self.merchants[idx].clone())
    }

    fn create(&mut self, draft: MerchantDraft) -> RepoResult<Merchant> {
        self.check_draft(&draft, None)?;
        let id = self.next_id;
        self.next_id += 1;
        let merchant = Merchant::from_draft(id, draft, Utc::now());
        tracing::info!(id, name = %merchant.business_name, "merchant created");
        self.merchants.push(merchant.clone());
        Ok(merchant)
    }

    fn update(&mut self, id: MerchantId, draft: MerchantDraft) -> RepoResult<Merchant> {
        let idx = self.position(id)?;
        self.check_draft(&draft, Some(id))?;
        let merchant = &mut self.merchants[idx];
        merchant.apply_draft(draft);
        merchant.log(Utc::now(), "Details updated");
        tracing::info!(id, "merchant updated");
        Ok(merchant.clone())
    }

    fn set_status(&mut self, id: MerchantId, transition: StatusTransition) -> RepoResult<Merchant> {
        let idx = self.position(id)?;
        let merchant = &mut self.merchants[idx];
        let from = merchant.status;
        let Some(to) = from.apply(transition) else {
            tracing::warn!(id, ?from, ?transition, "rejected status transition");
            return Err(RepositoryError::InvalidTransition { from, transition });
        };

        merchant.status = to;
        match transition {
            StatusTransition::Approve => merchant.kyc = KycStatus::Verified,
            StatusTransition::Reject => merchant.kyc = KycStatus::Failed,
            StatusTransition::Suspend | StatusTransition::Activate => {}
        }
        merchant.log(
            Utc::now(),
            format!("Status changed from {} to {}", from.label(), to.label()),
        );
        tracing::info!(id, ?from, ?to, "merchant status changed");
        Ok(merchant.clone())
    }

    fn delete(&mut self, id: MerchantId) -> RepoResult<Merchant> {
        let idx = self.position(id)?;
        if self.merchants[idx].status == MerchantStatus::Active {
            return Err(RepositoryError::Validation(
                "active merchants must be suspended before deletion".into(),
            ));
        }
        let merchant = self.merchants.remove(idx);
        tracing::info!(id, name = %merchant.business_name, "merchant deleted");
        Ok(merchant)
    }
}

struct Seed {
    name: &'static str,
    legal: &'static str,
    domain: &'static str,
    category: &'static str,
    country: &'static str,
    currency: &'static str,
    status: MerchantStatus,
    kyc: KycStatus,
    risk: RiskLevel,
    volume: i64,
    transactions: u64,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Blue Fern Cafe",
        legal: "Blue Fern Hospitality Ltd",
        domain: "bluefern.example",
        category: "Food & Beverage",
        country: "GB",
        currency: "GBP",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 4_812_350,
        transactions: 1_920,
    },
    Seed {
        name: "Kora Textiles",
        legal: "Kora Textiles Limited",
        domain: "koratextiles.example",
        category: "Retail",
        country: "NG",
        currency: "NGN",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Medium,
        volume: 152_400_000,
        transactions: 3_410,
    },
    Seed {
        name: "Northwind Outfitters",
        legal: "Northwind Outfitters Inc",
        domain: "northwind.example",
        category: "Retail",
        country: "US",
        currency: "USD",
        status: MerchantStatus::Suspended,
        kyc: KycStatus::Verified,
        risk: RiskLevel::High,
        volume: 980_000,
        transactions: 212,
    },
    Seed {
        name: "Sakura Ramen",
        legal: "Sakura Foods KK",
        domain: "sakuraramen.example",
        category: "Food & Beverage",
        country: "JP",
        currency: "JPY",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 2_450_000,
        transactions: 880,
    },
    Seed {
        name: "Atlas Travel Co",
        legal: "Atlas Travel Company SA",
        domain: "atlastravel.example",
        category: "Travel",
        country: "FR",
        currency: "EUR",
        status: MerchantStatus::Pending,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::Medium,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Pixel Forge",
        legal: "Pixel Forge Studios Ltd",
        domain: "pixelforge.example",
        category: "Digital Goods",
        country: "GB",
        currency: "GBP",
        status: MerchantStatus::UnderReview,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::Low,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Masala Junction",
        legal: "Masala Junction Pvt Ltd",
        domain: "masalajunction.example",
        category: "Food & Beverage",
        country: "IN",
        currency: "INR",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 31_275_000,
        transactions: 5_120,
    },
    Seed {
        name: "Harbor Freight Lines",
        legal: "Harbor Freight Lines LLC",
        domain: "harborfreight.example",
        category: "Logistics",
        country: "US",
        currency: "USD",
        status: MerchantStatus::Rejected,
        kyc: KycStatus::Failed,
        risk: RiskLevel::High,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Lumen Fitness",
        legal: "Lumen Fitness GmbH",
        domain: "lumenfit.example",
        category: "Services",
        country: "DE",
        currency: "EUR",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Medium,
        volume: 1_204_990,
        transactions: 640,
    },
    Seed {
        name: "Quokka Games",
        legal: "Quokka Games Pty Ltd",
        domain: "quokkagames.example",
        category: "Digital Goods",
        country: "AU",
        currency: "AUD",
        status: MerchantStatus::Pending,
        kyc: KycStatus::NotStarted,
        risk: RiskLevel::Medium,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Savanna Crafts",
        legal: "Savanna Crafts Enterprises",
        domain: "savannacrafts.example",
        category: "Retail",
        country: "KE",
        currency: "KES",
        status: MerchantStatus::UnderReview,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::High,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Golden Gate Bikes",
        legal: "Golden Gate Bikes Inc",
        domain: "ggbikes.example",
        category: "Retail",
        country: "US",
        currency: "USD",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 7_730_115,
        transactions: 2_045,
    },
    Seed {
        name: "Fjord Coffee Roasters",
        legal: "Fjord Kaffe AS",
        domain: "fjordcoffee.example",
        category: "Food & Beverage",
        country: "NO",
        currency: "NOK",
        status: MerchantStatus::Suspended,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Medium,
        volume: 310_000,
        transactions: 95,
    },
    Seed {
        name: "Cedar Legal Services",
        legal: "Cedar Legal Services LLP",
        domain: "cedarlegal.example",
        category: "Services",
        country: "GB",
        currency: "GBP",
        status: MerchantStatus::Pending,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::Low,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Lagos Eats",
        legal: "Lagos Eats Nigeria Ltd",
        domain: "lagoseats.example",
        category: "Food & Beverage",
        country: "NG",
        currency: "NGN",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Medium,
        volume: 88_900_000,
        transactions: 7_311,
    },
    Seed {
        name: "Nimbus Cloud Tools",
        legal: "Nimbus Software BV",
        domain: "nimbustools.example",
        category: "Digital Goods",
        country: "NL",
        currency: "EUR",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 5_600_000,
        transactions: 1_402,
    },
    Seed {
        name: "Andes Adventures",
        legal: "Andes Adventures SAC",
        domain: "andesadventures.example",
        category: "Travel",
        country: "PE",
        currency: "USD",
        status: MerchantStatus::UnderReview,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::Medium,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Maple Leaf Books",
        legal: "Maple Leaf Books Corp",
        domain: "mapleleafbooks.example",
        category: "Retail",
        country: "CA",
        currency: "CAD",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 640_250,
        transactions: 318,
    },
    Seed {
        name: "Orbit Electronics",
        legal: "Orbit Electronics Ltd",
        domain: "orbitelectronics.example",
        category: "Retail",
        country: "IN",
        currency: "INR",
        status: MerchantStatus::Rejected,
        kyc: KycStatus::Failed,
        risk: RiskLevel::High,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Tidewater Spa",
        legal: "Tidewater Wellness LLC",
        domain: "tidewaterspa.example",
        category: "Services",
        country: "US",
        currency: "USD",
        status: MerchantStatus::Pending,
        kyc: KycStatus::NotStarted,
        risk: RiskLevel::Low,
        volume: 0,
        transactions: 0,
    },
    Seed {
        name: "Alpine Rentals",
        legal: "Alpine Rentals AG",
        domain: "alpinerentals.example",
        category: "Travel",
        country: "CH",
        currency: "CHF",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Medium,
        volume: 2_199_900,
        transactions: 402,
    },
    Seed {
        name: "Coral Reef Divers",
        legal: "Coral Reef Divers Ltd",
        domain: "coralreef.example",
        category: "Travel",
        country: "AU",
        currency: "AUD",
        status: MerchantStatus::Suspended,
        kyc: KycStatus::Verified,
        risk: RiskLevel::High,
        volume: 120_000,
        transactions: 31,
    },
    Seed {
        name: "Urban Greens",
        legal: "Urban Greens Market Inc",
        domain: "urbangreens.example",
        category: "Food & Beverage",
        country: "US",
        currency: "USD",
        status: MerchantStatus::Active,
        kyc: KycStatus::Verified,
        risk: RiskLevel::Low,
        volume: 3_318_470,
        transactions: 2_760,
    },
    Seed {
        name: "Marrakech Rugs",
        legal: "Marrakech Rugs SARL",
        domain: "marrakechrugs.example",
        category: "Retail",
        country: "MA",
        currency: "MAD",
        status: MerchantStatus::UnderReview,
        kyc: KycStatus::Submitted,
        risk: RiskLevel::Medium,
        volume: 0,
        transactions: 0,
    },
];

fn seed_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

fn seed_merchants() -> Vec<Merchant> {
    let base = seed_base();
    SEEDS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let id = i as MerchantId + 1;
            let created_at = base + Duration::days(i as i64 * 9) + Duration::hours(i as i64 % 7);
            let slug: String = seed
                .name
                .split_whitespace()
                .next()
                .unwrap_or("merchant")
                .to_lowercase();
            let mut merchant = Merchant {
                id,
                business_name: seed.name.to_string(),
                legal_name: seed.legal.to_string(),
                email: format!("billing@{}", seed.domain),
                phone: format!("+1 555 01{:02}", id),
                website: format!("https://{}", seed.domain),
                category: seed.category.to_string(),
                country: seed.country.to_string(),
                currency: seed.currency.to_string(),
                status: seed.status,
                kyc: seed.kyc,
                risk: seed.risk,
                monthly_volume: seed.volume,
                transaction_count: seed.transactions,
                bank: BankDetails {
                    bank_name: format!("{} National Bank", seed.country),
                    account_name: seed.legal.to_string(),
                    account_number: format!(
                        "{}{:02} 0000 {:04} {:04}",
                        seed.country,
                        10 + id,
                        id * 37,
                        id * 113
                    ),
                    routing_code: format!("{}BANK{:02}", seed.country, id),
                },
                notes: format!("Onboarded via {} partner program.", slug),
                created_at,
                updated_at: created_at,
                activity: Vec::new(),
            };
            merchant.log(created_at, "Merchant created");
            if seed.status != MerchantStatus::Pending {
                merchant.log(
                    created_at + Duration::days(2),
                    format!("Status changed from Pending to {}", seed.status.label()),
                );
            }
            merchant
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str) -> MerchantDraft {
        MerchantDraft {
            business_name: name.into(),
            legal_name: format!("{} Ltd", name),
            email: email.into(),
            country: "GB".into(),
            currency: "GBP".into(),
            ..MerchantDraft::default()
        }
    }

    #[test]
    fn test_seeded_data() {
        let repo = MockMerchantRepository::seeded();
        let merchants = repo.list();
        assert_eq!(merchants.len(), SEEDS.len());
        assert_eq!(merchants[0].id, 1);
        assert!(merchants.windows(2).all(|w| w[0].id < w[1].id));

        let queue = repo.review_queue();
        assert!(!queue.is_empty());
        assert!(queue.iter().all(|m| m.status.is_reviewable()));
    }

    #[test]
    fn test_create_assigns_next_id() {
        let mut repo = MockMerchantRepository::seeded();
        let created = repo.create(draft("Zephyr Kites", "hi@zephyr.example")).unwrap();
        assert_eq!(created.id, SEEDS.len() as MerchantId + 1);
        assert_eq!(created.status, MerchantStatus::Pending);
        assert_eq!(repo.get(created.id).unwrap().business_name, "Zephyr Kites");
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let mut repo = MockMerchantRepository::new();
        repo.create(draft("One", "same@example.com")).unwrap();
        let err = repo.create(draft("Two", "SAME@example.com")).unwrap_err();
        assert_eq!(err, RepositoryError::Duplicate("SAME@example.com".into()));
    }

    #[test]
    fn test_create_validates() {
        let mut repo = MockMerchantRepository::new();
        let err = repo.create(draft(" ", "a@b.example")).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn test_update_keeps_own_email() {
        let mut repo = MockMerchantRepository::new();
        let created = repo.create(draft("One", "one@example.com")).unwrap();
        let mut edit = MerchantDraft::from(&created);
        edit.business_name = "One Renamed".into();
        let updated = repo.update(created.id, edit).unwrap();
        assert_eq!(updated.business_name, "One Renamed");
        assert_eq!(updated.activity.last().unwrap().message, "Details updated");
    }

    #[test]
    fn test_status_transitions() {
        let mut repo = MockMerchantRepository::new();
        let id = repo.create(draft("One", "one@example.com")).unwrap().id;

        let err = repo.set_status(id, StatusTransition::Suspend).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::InvalidTransition {
                from: MerchantStatus::Pending,
                transition: StatusTransition::Suspend,
            }
        );
        insta::assert_snapshot!(err.to_string(), @"Cannot suspend a merchant that is pending");

        let approved = repo.set_status(id, StatusTransition::Approve).unwrap();
        assert_eq!(approved.status, MerchantStatus::Active);
        assert_eq!(approved.kyc, KycStatus::Verified);
        assert!(repo.review_queue().is_empty());

        assert_eq!(
            repo.set_status(id, StatusTransition::Suspend).unwrap().status,
            MerchantStatus::Suspended
        );
        assert_eq!(
            repo.set_status(id, StatusTransition::Activate).unwrap().status,
            MerchantStatus::Active
        );
    }

    #[test]
    fn test_delete() {
        let mut repo = MockMerchantRepository::new();
        let id = repo.create(draft("One", "one@example.com")).unwrap().id;
        repo.set_status(id, StatusTransition::Approve).unwrap();
        assert!(matches!(repo.delete(id), Err(RepositoryError::Validation(_))));

        repo.set_status(id, StatusTransition::Suspend).unwrap();
        assert_eq!(repo.delete(id).unwrap().id, id);
        assert_eq!(repo.get(id), Err(RepositoryError::NotFound(id)));
        assert_eq!(repo.delete(id), Err(RepositoryError::NotFound(id)));
    }
}
