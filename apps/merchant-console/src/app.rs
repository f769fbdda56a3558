//! Application state and logic.

use crate::config::Config;
use crate::models::{Merchant, MerchantId, MerchantStatus, StatusTransition};
use crate::repository::{MerchantRepository, MockMerchantRepository};
use crate::wizard::{FieldRules, Wizard, WizardMode, WizardOutcome};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders};
use std::cell::RefCell;
use std::rc::Rc;
use tui_table::format::{format_relative_time, initials};
use tui_table::{
    CellContent, ColumnDef, DataTable, Focus, LayoutFlags, PaginationConfig, RowAction,
    TableState, TableView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Merchants,
    Review,
    Detail,
    Wizard,
}

/// Tabs of the merchant detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Overview,
    Business,
    Banking,
    Activity,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Overview,
        DetailTab::Business,
        DetailTab::Banking,
        DetailTab::Activity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Business => "Business",
            DetailTab::Banking => "Banking",
            DetailTab::Activity => "Activity",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DetailTab::Overview => 0,
            DetailTab::Business => 1,
            DetailTab::Banking => 2,
            DetailTab::Activity => 3,
        }
    }

    pub fn next(&self) -> DetailTab {
        DetailTab::ALL[(self.index() + 1) % DetailTab::ALL.len()]
    }

    pub fn prev(&self) -> DetailTab {
        DetailTab::ALL[(self.index() + DetailTab::ALL.len() - 1) % DetailTab::ALL.len()]
    }
}

/// Work requested by table callbacks, run after the key event is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    View(MerchantId),
    Edit(MerchantId),
    Transition(MerchantId, StatusTransition),
    Delete(MerchantId),
}

pub type CommandQueue = Rc<RefCell<Vec<Command>>>;

/// Delete waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: MerchantId,
    pub name: String,
}

pub struct App {
    pub repo: Box<dyn MerchantRepository>,
    pub config: Config,
    pub view: View,
    /// Last list shown; the detail view returns here
    pub list_view: View,
    /// Where the wizard returns on submit or cancel
    pub wizard_return: View,
    pub merchants: DataTable<Merchant>,
    pub merchants_state: TableState,
    pub review: DataTable<Merchant>,
    pub review_state: TableState,
    pub detail: Option<Merchant>,
    pub detail_tab: DetailTab,
    pub wizard: Option<Wizard>,
    pub confirm_delete: Option<PendingDelete>,
    pub message: Option<String>,
    pub show_help: bool,
    commands: CommandQueue,
    rules: FieldRules,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_repository(Box::new(MockMerchantRepository::seeded()), config)
    }

    pub fn with_repository(
        repo: Box<dyn MerchantRepository>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let rules = FieldRules::standard()?;
        let commands: CommandQueue = Rc::new(RefCell::new(Vec::new()));

        let merchants = merchant_table(&config, &commands);
        let review = review_table(&config, &commands);
        let merchants_state = merchants.initial_state();
        let review_state = review.initial_state();

        let mut app = Self {
            repo,
            config,
            view: View::Merchants,
            list_view: View::Merchants,
            wizard_return: View::Merchants,
            merchants,
            merchants_state,
            review,
            review_state,
            detail: None,
            detail_tab: DetailTab::default(),
            wizard: None,
            confirm_delete: None,
            message: None,
            show_help: false,
            commands,
            rules,
        };

        app.refresh();
        Ok(app)
    }

    /// Reload table data and the open detail record from the repository.
    pub fn refresh(&mut self) {
        self.merchants.set_data(self.repo.list());
        self.review.set_data(self.repo.review_queue());
        self.merchants.sync_selection(&mut self.merchants_state);
        self.review.sync_selection(&mut self.review_state);
        if let Some(id) = self.detail.as_ref().map(|m| m.id) {
            self.detail = self.repo.get(id).ok();
        }
        tracing::debug!(
            merchants = self.merchants.data().len(),
            review = self.review.data().len(),
            "refreshed"
        );
    }

    fn active_state(&self) -> &TableState {
        match self.list_view {
            View::Review => &self.review_state,
            _ => &self.merchants_state,
        }
    }

    pub fn can_quit(&self) -> bool {
        match self.view {
            View::Wizard => false,
            View::Merchants | View::Review => {
                self.confirm_delete.is_none() && self.active_state().focus != Focus::Search
            }
            View::Detail => self.confirm_delete.is_none(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.confirm_delete.is_some() {
            self.handle_confirm_key(key);
            return;
        }

        match self.view {
            View::Merchants | View::Review => self.handle_list_key(key),
            View::Detail => self.handle_detail_key(key),
            View::Wizard => self.handle_wizard_key(key),
        }

        self.drain_commands();
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if self.active_state().focus == Focus::Rows {
            match key.code {
                KeyCode::Char('1') => return self.show_list(View::Merchants),
                KeyCode::Char('2') => return self.show_list(View::Review),
                KeyCode::Char('n') => return self.start_create(),
                KeyCode::Char('d') | KeyCode::Delete => {
                    if let Some(id) = self.cursor_merchant() {
                        self.commands.borrow_mut().push(Command::Delete(id));
                    }
                    return;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                    return;
                }
                _ => {}
            }
        }

        let consumed = match self.view {
            View::Review => self.review.handle_key(key, &mut self.review_state),
            _ => self.merchants.handle_key(key, &mut self.merchants_state),
        };
        if !consumed {
            tracing::trace!(?key, "key not handled");
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some((id, status)) = self.detail.as_ref().map(|m| (m.id, m.status)) else {
            self.view = self.list_view;
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.detail_tab = self.detail_tab.next();
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.detail_tab = self.detail_tab.prev();
            }
            KeyCode::Char('e') => self.commands.borrow_mut().push(Command::Edit(id)),
            KeyCode::Char('a') => {
                let transition = if status == MerchantStatus::Suspended {
                    StatusTransition::Activate
                } else {
                    StatusTransition::Approve
                };
                self.commands
                    .borrow_mut()
                    .push(Command::Transition(id, transition));
            }
            KeyCode::Char('r') => self
                .commands
                .borrow_mut()
                .push(Command::Transition(id, StatusTransition::Reject)),
            KeyCode::Char('s') => self
                .commands
                .borrow_mut()
                .push(Command::Transition(id, StatusTransition::Suspend)),
            KeyCode::Char('d') | KeyCode::Delete => {
                self.commands.borrow_mut().push(Command::Delete(id));
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc | KeyCode::Backspace => self.close_detail(),
            _ => {}
        }
    }

    fn handle_wizard_key(&mut self, key: KeyEvent) {
        let Some(wizard) = self.wizard.as_mut() else {
            self.view = self.wizard_return;
            return;
        };
        let outcome = wizard.handle_key(key);
        let mode = wizard.mode;

        match outcome {
            WizardOutcome::Continue => {}
            WizardOutcome::Cancel => {
                self.close_wizard();
                self.message = Some("Changes discarded".to_string());
            }
            WizardOutcome::Submit(draft) => {
                let result = match mode {
                    WizardMode::Create => self.repo.create(draft),
                    WizardMode::Edit(id) => self.repo.update(id, draft),
                };
                match result {
                    Ok(merchant) => {
                        let verb = match mode {
                            WizardMode::Create => "Created",
                            WizardMode::Edit(_) => "Saved",
                        };
                        self.message = Some(format!("{} {}", verb, merchant.business_name));
                        self.close_wizard();
                        self.refresh();
                    }
                    Err(err) => {
                        tracing::warn!(%err, "merchant not saved");
                        self.message = Some(err.to_string());
                    }
                }
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Some(pending) = self.confirm_delete.clone() else {
            return;
        };

        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.confirm_delete = None;
                match self.repo.delete(pending.id) {
                    Ok(merchant) => {
                        self.message = Some(format!("Deleted {}", merchant.business_name));
                        if self.detail.as_ref().is_some_and(|m| m.id == pending.id) {
                            self.close_detail();
                        }
                        self.refresh();
                    }
                    Err(err) => {
                        tracing::warn!(%err, id = pending.id, "delete failed");
                        self.message = Some(err.to_string());
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.message = Some("Delete cancelled".to_string());
            }
            _ => {}
        }
    }

    fn drain_commands(&mut self) {
        let commands: Vec<Command> = self.commands.borrow_mut().drain(..).collect();
        for command in commands {
            self.execute(command);
        }
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) {
        tracing::debug!(?command, "executing command");
        match command {
            Command::View(id) => self.open_detail(id),
            Command::Edit(id) => self.start_edit(id),
            Command::Transition(id, transition) => self.apply_transition(id, transition),
            Command::Delete(id) => self.request_delete(id),
        }
    }

    fn show_list(&mut self, view: View) {
        self.view = view;
        self.list_view = view;
    }

    /// Id of the merchant under the cursor of the current list.
    pub fn cursor_merchant(&mut self) -> Option<MerchantId> {
        let (table, state) = match self.list_view {
            View::Review => (&self.review, &mut self.review_state),
            _ => (&self.merchants, &mut self.merchants_state),
        };
        match table.view(state) {
            TableView::Ready(model) => model.cursor_row(state).map(|m| m.id),
            _ => None,
        }
    }

    fn open_detail(&mut self, id: MerchantId) {
        match self.repo.get(id) {
            Ok(merchant) => {
                self.detail = Some(merchant);
                self.detail_tab = DetailTab::Overview;
                self.view = View::Detail;
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn close_detail(&mut self) {
        self.detail = None;
        self.view = self.list_view;
    }

    fn start_create(&mut self) {
        self.wizard = Some(Wizard::create(self.rules.clone()));
        self.wizard_return = self.view;
        self.view = View::Wizard;
    }

    fn start_edit(&mut self, id: MerchantId) {
        match self.repo.get(id) {
            Ok(merchant) => {
                self.wizard = Some(Wizard::edit(&merchant, self.rules.clone()));
                self.wizard_return = self.view;
                self.view = View::Wizard;
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn close_wizard(&mut self) {
        self.wizard = None;
        self.view = self.wizard_return;
    }

    fn apply_transition(&mut self, id: MerchantId, transition: StatusTransition) {
        match self.repo.set_status(id, transition) {
            Ok(merchant) => {
                self.message = Some(format!(
                    "{} {}",
                    merchant.business_name,
                    transition.past_tense()
                ));
                self.refresh();
            }
            Err(err) => {
                self.message = Some(err.to_string());
            }
        }
    }

    fn request_delete(&mut self, id: MerchantId) {
        match self.repo.get(id) {
            Ok(merchant) if merchant.status == MerchantStatus::Active => {
                self.message = Some(format!(
                    "Suspend {} before deleting it",
                    merchant.business_name
                ));
            }
            Ok(merchant) => {
                self.confirm_delete = Some(PendingDelete {
                    id,
                    name: merchant.business_name,
                });
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }
}

fn send<F>(queue: &CommandQueue, make: F) -> impl Fn(&Merchant) + 'static
where
    F: Fn(MerchantId) -> Command + 'static,
{
    let queue = Rc::clone(queue);
    move |merchant: &Merchant| queue.borrow_mut().push(make(merchant.id))
}

fn id_column() -> ColumnDef<Merchant> {
    ColumnDef::computed("id", "ID", |m: &Merchant| CellContent::from(m.id))
        .size(60)
        .align(Alignment::Right)
}

fn name_column() -> ColumnDef<Merchant> {
    ColumnDef::computed("business_name", "Merchant", |m: &Merchant| {
        CellContent::text(m.business_name.clone())
    })
    .cell(|m: &Merchant| {
        CellContent::text(format!("{:<2} {}", initials(&m.business_name), m.business_name))
    })
    .size(260)
    .hideable(false)
}

fn created_column(config: &Config) -> ColumnDef<Merchant> {
    let relative = config.display.relative_dates;
    ColumnDef::computed("created_at", "Created", |m: &Merchant| CellContent::Date(m.created_at))
        .cell(move |m: &Merchant| {
            if relative {
                CellContent::text(format_relative_time(&m.created_at, &Utc::now()))
            } else {
                CellContent::Date(m.created_at)
            }
        })
        .size(140)
}

fn merchant_columns(config: &Config) -> Vec<ColumnDef<Merchant>> {
    let display = config.display.clone();
    vec![
        id_column(),
        name_column(),
        ColumnDef::key("email", "Email").size(260),
        ColumnDef::key("country", "Country").size(90),
        ColumnDef::key("status", "Status").size(140),
        ColumnDef::key("kyc", "KYC").size(160),
        ColumnDef::key("risk", "Risk").size(130),
        ColumnDef::computed("monthly_volume", "Volume (30d)", move |m: &Merchant| {
            let currency = display.currency_or_default(&m.currency);
            CellContent::money(m.monthly_volume, currency)
        })
        .size(170)
        .align(Alignment::Right),
        created_column(config),
    ]
}

fn toolbar(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in keys {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}   ", label)));
    }
    Line::from(spans)
}

fn merchant_table(config: &Config, commands: &CommandQueue) -> DataTable<Merchant> {
    let actions = vec![
        RowAction::new("View", send(commands, Command::View)),
        RowAction::new("Edit", send(commands, Command::Edit)),
        RowAction::new(
            "Suspend",
            send(commands, |id| Command::Transition(id, StatusTransition::Suspend)),
        )
        .hidden_when(|m: &Merchant| m.status != MerchantStatus::Active),
        RowAction::new(
            "Activate",
            send(commands, |id| Command::Transition(id, StatusTransition::Activate)),
        )
        .hidden_when(|m: &Merchant| m.status != MerchantStatus::Suspended),
        RowAction::new("Delete", send(commands, Command::Delete))
            .destructive()
            .disabled_when(|m: &Merchant| m.status == MerchantStatus::Active),
    ];

    DataTable::new(merchant_columns(config), Vec::new())
        .title("Merchants")
        .subtitle("Every merchant account on the platform")
        .search_fields(["business_name", "email", "id", "country"])
        .search_placeholder("Search name, email, ID or country...")
        .default_sort(config.table.default_sort)
        .actions(actions)
        .selectable(true)
        .pagination(PaginationConfig::with_page_size(config.display.page_size))
        .layout(LayoutFlags {
            columns_pinnable: true,
            columns_movable: true,
            columns_visibility: true,
            cell_border: config.table.cell_border,
        })
        .toolbar(toolbar(&[
            ("n", "New merchant"),
            ("m", "Actions"),
            ("d", "Delete"),
            ("?", "Help"),
        ]))
        .empty_description("No merchants yet. Press n to onboard the first one.")
        .on_row_click(send(commands, Command::View))
        .block(Block::default().borders(Borders::ALL))
}

fn review_table(config: &Config, commands: &CommandQueue) -> DataTable<Merchant> {
    let actions = vec![
        RowAction::new(
            "Approve",
            send(commands, |id| Command::Transition(id, StatusTransition::Approve)),
        ),
        RowAction::new(
            "Reject",
            send(commands, |id| Command::Transition(id, StatusTransition::Reject)),
        )
        .destructive(),
        RowAction::new("View", send(commands, Command::View)),
    ];

    let columns = vec![
        id_column(),
        name_column(),
        ColumnDef::key("category", "Category").size(170),
        ColumnDef::key("country", "Country").size(90),
        ColumnDef::key("status", "Status").size(140),
        ColumnDef::key("kyc", "KYC").size(160),
        ColumnDef::key("risk", "Risk").size(130),
        created_column(config),
    ];

    DataTable::new(columns, Vec::new())
        .title("Review queue")
        .subtitle("Merchants waiting for an approval decision")
        .search_fields(["business_name", "email", "id", "country"])
        .search_placeholder("Search applications...")
        .default_sort(config.table.default_sort)
        .actions(actions)
        .pagination(PaginationConfig::with_page_size(config.display.page_size))
        .layout(LayoutFlags {
            cell_border: config.table.cell_border,
            ..LayoutFlags::default()
        })
        .empty_description("Nothing to review. New applications appear here.")
        .on_row_click(send(commands, Command::View))
        .block(Block::default().borders(Borders::ALL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use crate::wizard::FieldId;
    use crossterm::event::KeyModifiers;
    use tui_table::TableRow;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn page_ids(app: &mut App) -> Vec<String> {
        match app.merchants.view(&mut app.merchants_state) {
            TableView::Ready(model) => model.row_ids,
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_starts_on_latest_merchants() {
        let mut app = app();
        assert_eq!(app.view, View::Merchants);
        let ids = page_ids(&mut app);
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], app.merchants.data().len().to_string());
    }

    #[test]
    fn test_search_then_view_from_menu() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "blue fern");
        press(&mut app, KeyCode::Enter);
        assert_eq!(page_ids(&mut app), vec!["1"]);

        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail.as_ref().map(|m| m.id), Some(1));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.detail_tab, DetailTab::Business);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.detail_tab, DetailTab::Activity);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Merchants);
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_status_filter_from_derived_options() {
        let mut app = app();
        // first derived option is the first merchant's status
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Esc);

        let ids = page_ids(&mut app);
        assert_eq!(ids.len(), 10);
        for id in ids {
            assert_eq!(app.merchants.row(&id).unwrap().status, MerchantStatus::Active);
        }
        assert!(app
            .merchants
            .filters()
            .state()
            .selected_filters
            .contains("Active"));
    }

    #[test]
    fn test_suspend_from_menu() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "blue fern");
        press(&mut app, KeyCode::Enter);

        // View, Edit, Suspend, Delete (disabled)
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.repo.get(1).unwrap().status, MerchantStatus::Suspended);
        assert_eq!(app.message.as_deref(), Some("Blue Fern Cafe suspended"));
        let row = app.merchants.row("1").unwrap();
        assert_eq!(row.status, MerchantStatus::Suspended);
    }

    #[test]
    fn test_delete_active_is_refused() {
        let mut app = app();
        app.execute(Command::Delete(1));
        assert!(app.confirm_delete.is_none());
        assert_eq!(app.message.as_deref(), Some("Suspend Blue Fern Cafe before deleting it"));
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let mut app = app();
        app.execute(Command::Delete(3));
        assert_eq!(app.confirm_delete.as_ref().map(|p| p.id), Some(3));
        assert!(!app.can_quit());

        press(&mut app, KeyCode::Char('n'));
        assert!(app.confirm_delete.is_none());
        assert!(app.repo.get(3).is_ok());

        app.execute(Command::Delete(3));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.repo.get(3), Err(RepositoryError::NotFound(3)));
        assert!(app.merchants.row("3").is_none());
        assert_eq!(app.message.as_deref(), Some("Deleted Northwind Outfitters"));
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "northwind");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.merchants_state.row_selection.is_selected("3"));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.repo.get(3).is_err());
        assert!(app.merchants_state.row_selection.is_empty());
    }

    #[test]
    fn test_page_size_from_config() {
        let mut config = Config::default();
        config.display.page_size = 20;
        let mut app = App::new(config).unwrap();
        assert_eq!(page_ids(&mut app).len(), 20);
        assert_eq!(app.config.display.page_size, 20);
    }

    #[test]
    fn test_review_queue_approve() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view, View::Review);
        let queued = app.review.data().len();
        let first = app.cursor_merchant().unwrap();

        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.review.data().len(), queued - 1);
        assert_eq!(app.repo.get(first).unwrap().status, MerchantStatus::Active);
        assert!(app.review.data().iter().all(|m| m.row_id() != first.to_string()));
    }

    #[test]
    fn test_invalid_transition_reports() {
        let mut app = app();
        app.execute(Command::Transition(1, StatusTransition::Approve));
        assert_eq!(
            app.message.as_deref(),
            Some("Cannot approve a merchant that is active")
        );
    }

    #[test]
    fn test_create_through_wizard() {
        let mut app = app();
        let before = app.merchants.data().len();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.view, View::Wizard);
        assert!(!app.can_quit());

        let wizard = app.wizard.as_mut().unwrap();
        for (field, value) in [
            (FieldId::BusinessName, "Zephyr Kites"),
            (FieldId::LegalName, "Zephyr Kites Ltd"),
            (FieldId::Category, "Retail"),
            (FieldId::Email, "hello@zephyr.example"),
            (FieldId::Phone, "+44 20 7946 0958"),
            (FieldId::Country, "GB"),
            (FieldId::Currency, "GBP"),
            (FieldId::BankName, "Northern Bank"),
            (FieldId::AccountName, "Zephyr Kites Ltd"),
            (FieldId::AccountNumber, "GB29NWBK60161331926819"),
        ] {
            wizard.set_value(field, value);
        }
        for _ in 0..3 {
            press(&mut app, KeyCode::PageDown);
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view, View::Merchants);
        assert!(app.wizard.is_none());
        assert_eq!(app.merchants.data().len(), before + 1);
        assert_eq!(app.message.as_deref(), Some("Created Zephyr Kites"));
        let created = app.merchants.data().last().unwrap();
        assert_eq!(created.status, MerchantStatus::Pending);
        assert!(app.review.data().iter().any(|m| m.id == created.id));
    }

    #[test]
    fn test_edit_from_detail_returns_to_detail() {
        let mut app = app();
        app.execute(Command::View(1));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.view, View::Wizard);

        app.wizard
            .as_mut()
            .unwrap()
            .set_value(FieldId::BusinessName, "Blue Fern Coffee");
        for _ in 0..3 {
            press(&mut app, KeyCode::PageDown);
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail.as_ref().unwrap().business_name, "Blue Fern Coffee");
        assert_eq!(app.message.as_deref(), Some("Saved Blue Fern Coffee"));
    }

    #[test]
    fn test_wizard_cancel() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Merchants);
        assert!(app.wizard.is_none());
        assert_eq!(app.message.as_deref(), Some("Changes discarded"));
    }

    #[test]
    fn test_help_overlay_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.show_help);
        assert_eq!(app.view, View::Merchants);
    }
}
