//! Multi-step merchant creation and edit wizard.

use crate::models::{BankDetails, Merchant, MerchantDraft, MerchantId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use regex::Regex;
use std::collections::HashMap;

/// Validator for a wizard field.
#[derive(Clone)]
pub enum Validator {
    /// Field is required
    Required,
    /// Minimum length in characters
    MinLength(usize),
    /// Maximum length in characters
    MaxLength(usize),
    /// Pattern with the message shown on mismatch; empty values pass
    Pattern(Regex, &'static str),
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::MinLength(n) => write!(f, "MinLength({})", n),
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Pattern(r, _) => write!(f, "Pattern({})", r.as_str()),
        }
    }
}

impl Validator {
    /// Create a pattern validator.
    pub fn pattern(pattern: &str, message: &'static str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?, message))
    }

    /// Validate a value.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            Self::Required => {
                if value.is_empty() {
                    Err("This field is required".into())
                } else {
                    Ok(())
                }
            }
            Self::MinLength(min) => {
                if !value.is_empty() && value.chars().count() < *min {
                    Err(format!("Must be at least {} characters", min))
                } else {
                    Ok(())
                }
            }
            Self::MaxLength(max) => {
                if value.chars().count() > *max {
                    Err(format!("Must be at most {} characters", max))
                } else {
                    Ok(())
                }
            }
            Self::Pattern(regex, message) => {
                if value.is_empty() || regex.is_match(value) {
                    Ok(())
                } else {
                    Err((*message).to_string())
                }
            }
        }
    }
}

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Business,
    Contact,
    Banking,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Business,
        WizardStep::Contact,
        WizardStep::Banking,
        WizardStep::Review,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::Business => "Business",
            WizardStep::Contact => "Contact",
            WizardStep::Banking => "Banking",
            WizardStep::Review => "Review",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Business => 0,
            WizardStep::Contact => 1,
            WizardStep::Banking => 2,
            WizardStep::Review => 3,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        WizardStep::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| WizardStep::ALL[i])
    }

    /// Fields collected on this step.
    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            WizardStep::Business => &[
                FieldId::BusinessName,
                FieldId::LegalName,
                FieldId::Category,
                FieldId::Website,
            ],
            WizardStep::Contact => &[
                FieldId::Email,
                FieldId::Phone,
                FieldId::Country,
                FieldId::Currency,
            ],
            WizardStep::Banking => &[
                FieldId::BankName,
                FieldId::AccountName,
                FieldId::AccountNumber,
                FieldId::RoutingCode,
                FieldId::Notes,
            ],
            WizardStep::Review => &[],
        }
    }
}

/// Wizard input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    BusinessName,
    LegalName,
    Category,
    Website,
    Email,
    Phone,
    Country,
    Currency,
    BankName,
    AccountName,
    AccountNumber,
    RoutingCode,
    Notes,
}

impl FieldId {
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::BusinessName => "Business name",
            FieldId::LegalName => "Legal name",
            FieldId::Category => "Category",
            FieldId::Website => "Website",
            FieldId::Email => "Email",
            FieldId::Phone => "Phone",
            FieldId::Country => "Country (ISO code)",
            FieldId::Currency => "Currency (ISO code)",
            FieldId::BankName => "Bank name",
            FieldId::AccountName => "Account name",
            FieldId::AccountNumber => "Account number / IBAN",
            FieldId::RoutingCode => "Routing / SWIFT code",
            FieldId::Notes => "Notes",
        }
    }
}

/// Validators per field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    rules: HashMap<FieldId, Vec<Validator>>,
}

impl FieldRules {
    /// The rules used by the console.
    pub fn standard() -> Result<Self, regex::Error> {
        use Validator::{MaxLength, MinLength, Required};

        let rules = HashMap::from([
            (FieldId::BusinessName, vec![Required, MinLength(2), MaxLength(80)]),
            (FieldId::LegalName, vec![Required, MaxLength(120)]),
            (FieldId::Category, vec![Required, MaxLength(40)]),
            (
                FieldId::Website,
                vec![
                    Validator::pattern(
                        r"^https?://[^\s/$.?#].[^\s]*$",
                        "Enter a full URL, e.g. https://shop.example",
                    )?,
                ],
            ),
            (
                FieldId::Email,
                vec![
                    Required,
                    Validator::pattern(
                        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
                        "Enter a valid email address",
                    )?,
                ],
            ),
            (
                FieldId::Phone,
                vec![
                    Required,
                    Validator::pattern(
                        r"^\+?[0-9][0-9 ()-]{6,19}$",
                        "Enter a valid phone number",
                    )?,
                ],
            ),
            (
                FieldId::Country,
                vec![
                    Required,
                    Validator::pattern(
                        r"^[A-Za-z]{2}$",
                        "Use a two-letter country code",
                    )?,
                ],
            ),
            (
                FieldId::Currency,
                vec![
                    Required,
                    Validator::pattern(
                        r"^[A-Za-z]{3}$",
                        "Use a three-letter currency code",
                    )?,
                ],
            ),
            (FieldId::BankName, vec![Required, MaxLength(80)]),
            (FieldId::AccountName, vec![Required, MaxLength(120)]),
            (
                FieldId::AccountNumber,
                vec![
                    Required,
                    Validator::pattern(
                        r"^[A-Za-z0-9 ]{8,34}$",
                        "Use 8-34 letters or digits",
                    )?,
                ],
            ),
            (
                FieldId::RoutingCode,
                vec![
                    Validator::pattern(
                        r"^[A-Za-z0-9]{4,11}$",
                        "Use 4-11 letters or digits",
                    )?,
                ],
            ),
            (FieldId::Notes, vec![MaxLength(500)]),
        ]);

        Ok(Self { rules })
    }

    /// First failing validator's message.
    pub fn check(&self, field: FieldId, value: &str) -> Result<(), String> {
        match self.rules.get(&field) {
            Some(validators) => validators.iter().try_for_each(|v| v.validate(value)),
            None => Ok(()),
        }
    }

    pub fn is_required(&self, field: FieldId) -> bool {
        self.rules
            .get(&field)
            .is_some_and(|validators| validators.iter().any(|v| matches!(v, Validator::Required)))
    }
}

/// Whether the wizard creates a merchant or edits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit(MerchantId),
}

/// Result of a key press in the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Continue,
    Cancel,
    Submit(MerchantDraft),
}

/// Wizard state.
#[derive(Debug, Clone)]
pub struct Wizard {
    pub mode: WizardMode,
    pub step: WizardStep,
    /// Focused field within the step
    pub focused: usize,
    values: HashMap<FieldId, String>,
    errors: HashMap<FieldId, String>,
    rules: FieldRules,
}

impl Wizard {
    /// Empty wizard for a new merchant.
    pub fn create(rules: FieldRules) -> Self {
        Self {
            mode: WizardMode::Create,
            step: WizardStep::Business,
            focused: 0,
            values: HashMap::new(),
            errors: HashMap::new(),
            rules,
        }
    }

    /// Wizard pre-filled from an existing merchant.
    pub fn edit(merchant: &Merchant, rules: FieldRules) -> Self {
        let mut wizard = Self::create(rules);
        wizard.mode = WizardMode::Edit(merchant.id);
        wizard.load_draft(&MerchantDraft::from(merchant));
        wizard
    }

    fn load_draft(&mut self, draft: &MerchantDraft) {
        let pairs = [
            (FieldId::BusinessName, &draft.business_name),
            (FieldId::LegalName, &draft.legal_name),
            (FieldId::Category, &draft.category),
            (FieldId::Website, &draft.website),
            (FieldId::Email, &draft.email),
            (FieldId::Phone, &draft.phone),
            (FieldId::Country, &draft.country),
            (FieldId::Currency, &draft.currency),
            (FieldId::BankName, &draft.bank.bank_name),
            (FieldId::AccountName, &draft.bank.account_name),
            (FieldId::AccountNumber, &draft.bank.account_number),
            (FieldId::RoutingCode, &draft.bank.routing_code),
            (FieldId::Notes, &draft.notes),
        ];
        for (field, value) in pairs {
            self.values.insert(field, value.clone());
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            WizardMode::Create => "New merchant",
            WizardMode::Edit(_) => "Edit merchant",
        }
    }

    pub fn fields(&self) -> &'static [FieldId] {
        self.step.fields()
    }

    pub fn focused_field(&self) -> Option<FieldId> {
        self.fields().get(self.focused).copied()
    }

    pub fn value(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, field: FieldId, value: impl Into<String>) {
        self.values.insert(field, value.into());
        self.errors.remove(&field);
    }

    pub fn error(&self, field: FieldId) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_required(&self, field: FieldId) -> bool {
        self.rules.is_required(field)
    }

    pub fn focus_next(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focused = (self.focused + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focused = (self.focused + count - 1) % count;
        }
    }

    /// Validate the fields of `step`, recording errors. Returns whether all passed.
    fn validate(&mut self, step: WizardStep) -> bool {
        let mut ok = true;
        for &field in step.fields() {
            match self.rules.check(field, self.value(field)) {
                Ok(()) => {
                    self.errors.remove(&field);
                }
                Err(message) => {
                    self.errors.insert(field, message);
                    ok = false;
                }
            }
        }
        ok
    }

    /// Advance when the current step is valid.
    pub fn next_step(&mut self) -> bool {
        if !self.validate(self.step) {
            tracing::debug!(step = self.step.label(), "wizard step has errors");
            self.focus_first_error();
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.focused = 0;
                true
            }
            None => false,
        }
    }

    /// Go back one step, keeping entered values.
    pub fn prev_step(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                self.focused = 0;
                true
            }
            None => false,
        }
    }

    fn focus_first_error(&mut self) {
        if let Some(pos) = self.fields().iter().position(|f| self.errors.contains_key(f)) {
            self.focused = pos;
        }
    }

    /// Validate every step; on failure jump to the first invalid one.
    pub fn submit(&mut self) -> Option<MerchantDraft> {
        for step in WizardStep::ALL {
            if !self.validate(step) {
                self.step = step;
                self.focused = 0;
                self.focus_first_error();
                return None;
            }
        }
        Some(self.draft())
    }

    /// Collected values, trimmed and normalized.
    pub fn draft(&self) -> MerchantDraft {
        let get = |field| self.value(field).trim().to_string();
        MerchantDraft {
            business_name: get(FieldId::BusinessName),
            legal_name: get(FieldId::LegalName),
            email: get(FieldId::Email).to_lowercase(),
            phone: get(FieldId::Phone),
            website: get(FieldId::Website),
            category: get(FieldId::Category),
            country: get(FieldId::Country).to_uppercase(),
            currency: get(FieldId::Currency).to_uppercase(),
            bank: BankDetails {
                bank_name: get(FieldId::BankName),
                account_name: get(FieldId::AccountName),
                account_number: get(FieldId::AccountNumber).to_uppercase(),
                routing_code: get(FieldId::RoutingCode).to_uppercase(),
            },
            notes: get(FieldId::Notes),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> WizardOutcome {
        match key.code {
            KeyCode::Esc => return WizardOutcome::Cancel,
            KeyCode::PageDown => {
                self.next_step();
            }
            KeyCode::PageUp => {
                self.prev_step();
            }
            KeyCode::Enter if self.step == WizardStep::Review => {
                if let Some(draft) = self.submit() {
                    return WizardOutcome::Submit(draft);
                }
            }
            KeyCode::Backspace if self.step == WizardStep::Review => {
                self.prev_step();
            }
            KeyCode::Enter => {
                if self.focused + 1 < self.fields().len() {
                    self.focus_next();
                } else {
                    self.next_step();
                }
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field() {
                    let mut value = self.value(field).to_string();
                    value.pop();
                    self.set_value(field, value);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.focused_field() {
                    let mut value = self.value(field).to_string();
                    value.push(c);
                    self.set_value(field, value);
                }
            }
            _ => {}
        }
        WizardOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FieldRules {
        FieldRules::standard().unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(wizard: &mut Wizard, text: &str) {
        for c in text.chars() {
            wizard.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn fill_valid(wizard: &mut Wizard) {
        let values = [
            (FieldId::BusinessName, "Zephyr Kites"),
            (FieldId::LegalName, "Zephyr Kites Ltd"),
            (FieldId::Category, "Retail"),
            (FieldId::Email, "Hello@Zephyr.example"),
            (FieldId::Phone, "+44 20 7946 0958"),
            (FieldId::Country, "gb"),
            (FieldId::Currency, "gbp"),
            (FieldId::BankName, "Northern Bank"),
            (FieldId::AccountName, "Zephyr Kites Ltd"),
            (FieldId::AccountNumber, "GB29 NWBK 6016 1331 9268 19"),
        ];
        for (field, value) in values {
            wizard.set_value(field, value);
        }
    }

    #[test]
    fn test_validators() {
        assert!(Validator::Required.validate("  ").is_err());
        assert!(Validator::MinLength(2).validate("a").is_err());
        assert!(Validator::MinLength(2).validate("").is_ok());
        assert!(Validator::MaxLength(3).validate("abcd").is_err());

        let rules = rules();
        assert!(rules.check(FieldId::Email, "not-an-email").is_err());
        assert!(rules.check(FieldId::Email, "a@b.io").is_ok());
        assert!(rules.check(FieldId::Website, "").is_ok());
        assert!(rules.check(FieldId::Website, "shop.example").is_err());
        assert!(rules.check(FieldId::Country, "GBR").is_err());
        assert!(rules.check(FieldId::AccountNumber, "1234").is_err());
        assert!(rules.is_required(FieldId::Email));
        assert!(!rules.is_required(FieldId::Website));
    }

    #[test]
    fn test_refuses_to_advance_on_invalid_step() {
        let mut wizard = Wizard::create(rules());
        assert!(!wizard.next_step());
        assert_eq!(wizard.step, WizardStep::Business);
        assert_eq!(wizard.error(FieldId::BusinessName), Some("This field is required"));
        assert_eq!(wizard.focused, 0);

        type_text(&mut wizard, "Zephyr Kites");
        assert_eq!(wizard.error(FieldId::BusinessName), None);
        assert!(!wizard.next_step());
        assert_eq!(wizard.focused_field(), Some(FieldId::LegalName));
    }

    #[test]
    fn test_enter_walks_fields_then_steps() {
        let mut wizard = Wizard::create(rules());
        fill_valid(&mut wizard);
        for _ in 0..3 {
            wizard.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(wizard.focused_field(), Some(FieldId::Website));
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.step, WizardStep::Contact);
        assert_eq!(wizard.focused, 0);
    }

    #[test]
    fn test_back_keeps_values() {
        let mut wizard = Wizard::create(rules());
        fill_valid(&mut wizard);
        assert!(wizard.next_step());
        wizard.set_value(FieldId::Phone, "+1 555 0100");
        assert!(wizard.prev_step());
        assert_eq!(wizard.step, WizardStep::Business);
        assert_eq!(wizard.value(FieldId::BusinessName), "Zephyr Kites");
        assert_eq!(wizard.value(FieldId::Phone), "+1 555 0100");
        assert!(!wizard.prev_step());
    }

    #[test]
    fn test_submit_from_review() {
        let mut wizard = Wizard::create(rules());
        fill_valid(&mut wizard);
        assert!(wizard.next_step());
        assert!(wizard.next_step());
        assert!(wizard.next_step());
        assert_eq!(wizard.step, WizardStep::Review);

        let WizardOutcome::Submit(draft) = wizard.handle_key(key(KeyCode::Enter)) else {
            panic!("expected submit");
        };
        assert_eq!(draft.email, "hello@zephyr.example");
        assert_eq!(draft.country, "GB");
        assert_eq!(draft.currency, "GBP");
        assert_eq!(draft.bank.account_number, "GB29 NWBK 6016 1331 9268 19");
    }

    #[test]
    fn test_submit_jumps_to_first_invalid_step() {
        let mut wizard = Wizard::create(rules());
        fill_valid(&mut wizard);
        wizard.step = WizardStep::Review;
        wizard.set_value(FieldId::Country, "Britain");
        assert_eq!(wizard.handle_key(key(KeyCode::Enter)), WizardOutcome::Continue);
        assert_eq!(wizard.step, WizardStep::Contact);
        assert_eq!(wizard.focused_field(), Some(FieldId::Country));
        assert_eq!(wizard.error(FieldId::Country), Some("Use a two-letter country code"));
    }

    #[test]
    fn test_edit_prefills() {
        use crate::repository::{MerchantRepository, MockMerchantRepository};

        let merchant = MockMerchantRepository::seeded().get(1).unwrap();
        let wizard = Wizard::edit(&merchant, rules());
        assert_eq!(wizard.mode, WizardMode::Edit(1));
        assert_eq!(wizard.title(), "Edit merchant");
        assert_eq!(wizard.value(FieldId::BusinessName), merchant.business_name);
        assert_eq!(wizard.draft(), MerchantDraft::from(&merchant));
    }

    #[test]
    fn test_escape_cancels() {
        let mut wizard = Wizard::create(rules());
        assert_eq!(wizard.handle_key(key(KeyCode::Esc)), WizardOutcome::Cancel);
    }
}
