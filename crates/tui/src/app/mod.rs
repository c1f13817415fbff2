use std::{cell::Cell, rc::Rc, time::Duration};

use chrono::{Local, NaiveDate};
use client::{
    FETCH_FAILED, HttpExpenseService, ManageExpense, WorkflowError, load_expenses,
};
use crossterm::event::{self, Event, KeyEvent};
use engine::{Expense, ExpenseId, ExpenseStore, SubscriptionId};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    form::{ExpenseForm, FieldErrors, INVALID_INPUT},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Recent,
    All,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Recent => "Recent Expenses",
            Self::All => "All Expenses",
        }
    }

    fn toggle(self) -> Self {
        match self {
            Self::Recent => Self::All,
            Self::All => Self::Recent,
        }
    }
}

/// The open manage-expense screen.
pub struct ManageState {
    pub workflow: ManageExpense<HttpExpenseService>,
    pub form: ExpenseForm,
    /// Validation message shown under the form.
    pub message: Option<String>,
    /// Overlay label while a request is in flight.
    pub pending: Option<&'static str>,
}

pub struct AppState {
    pub tab: Tab,
    pub today: NaiveDate,
    pub recent_days: u64,
    pub expenses: Rc<[Expense]>,
    pub selected: usize,
    pub loading: bool,
    pub load_error: Option<String>,
    pub manage: Option<ManageState>,
    pub base_url: String,
}

impl AppState {
    /// Expenses shown by the active tab, newest first.
    pub fn visible(&self) -> Vec<&Expense> {
        match self.tab {
            Tab::All => self.expenses.iter().collect(),
            Tab::Recent => self
                .expenses
                .iter()
                .filter(|e| e.is_recent(self.today, self.recent_days))
                .collect(),
        }
    }

    pub fn period_label(&self) -> String {
        match self.tab {
            Tab::All => "Total".to_string(),
            Tab::Recent => format!("Last {} Days", self.recent_days),
        }
    }

    fn selected_id(&self) -> Option<ExpenseId> {
        self.visible().get(self.selected).map(|e| e.id.clone())
    }

    fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

pub struct App {
    config: AppConfig,
    client: HttpExpenseService,
    store: ExpenseStore,
    dirty: Rc<Cell<bool>>,
    subscription: SubscriptionId,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client =
            HttpExpenseService::new(&config.base_url, Duration::from_secs(config.timeout_secs))?
                .with_json_suffix(config.json_suffix);

        let store = ExpenseStore::new();
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let subscription = store.subscribe(move |_| flag.set(true));

        let state = AppState {
            tab: Tab::Recent,
            today: Local::now().date_naive(),
            recent_days: config.recent_days,
            expenses: store.expenses(),
            selected: 0,
            loading: false,
            load_error: None,
            manage: None,
            base_url: config.base_url.clone(),
        };

        Ok(Self {
            config,
            client,
            store,
            dirty,
            subscription,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut session = ui::TerminalSession::start()?;
        let result = self.event_loop(&mut session.terminal).await;
        drop(session);
        self.store.unsubscribe(self.subscription);
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        self.reload(terminal).await?;
        while !self.should_quit {
            self.draw(terminal)?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key, terminal).await?;
                }
            }
        }

        if let Some(manage) = self.state.manage.as_mut() {
            manage.workflow.close();
        }
        Ok(())
    }

    fn draw(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        self.state.today = Local::now().date_naive();
        if self.dirty.replace(false) {
            self.state.expenses = self.store.expenses();
            self.state.clamp_selection();
        }
        terminal
            .draw(|frame| ui::render(frame, &self.state))
            .map_err(|err| AppError::Terminal(err.to_string()))?;
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent, terminal: &mut ui::Terminal) -> Result<()> {
        let action = map_key(key);
        if self.state.manage.is_some() {
            self.handle_manage_key(action, terminal).await
        } else {
            self.handle_list_key(action, terminal).await
        }
    }

    async fn handle_list_key(&mut self, action: AppAction, terminal: &mut ui::Terminal) -> Result<()> {
        match action {
            AppAction::Quit | AppAction::Input('q') => self.should_quit = true,
            AppAction::NextField | AppAction::PrevField => {
                self.state.tab = self.state.tab.toggle();
                self.state.selected = 0;
            }
            AppAction::Up | AppAction::Input('k') => self.state.select_prev(),
            AppAction::Down | AppAction::Input('j') => self.state.select_next(),
            AppAction::Input('a') => self.open_manage(None),
            AppAction::Submit => {
                if let Some(id) = self.state.selected_id() {
                    self.open_manage(Some(id));
                }
            }
            AppAction::Input('r') => self.reload(terminal).await?,
            AppAction::Cancel => self.state.load_error = None,
            _ => {}
        }
        Ok(())
    }

    async fn handle_manage_key(
        &mut self,
        action: AppAction,
        terminal: &mut ui::Terminal,
    ) -> Result<()> {
        let Some(manage) = self.state.manage.as_mut() else {
            return Ok(());
        };

        if manage.workflow.status().error().is_some() {
            match action {
                AppAction::Quit => self.should_quit = true,
                AppAction::Cancel | AppAction::Submit => manage.workflow.dismiss_error(),
                _ => {}
            }
            return Ok(());
        }

        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::Cancel => self.close_manage(),
            AppAction::NextField | AppAction::Down => manage.form.next_field(),
            AppAction::PrevField | AppAction::Up => manage.form.prev_field(),
            AppAction::Backspace => {
                manage.form.active_mut().pop();
            }
            AppAction::Input(ch) => manage.form.active_mut().push(ch),
            AppAction::Submit => self.submit(terminal).await?,
            AppAction::Delete => {
                if manage.workflow.is_editing() {
                    self.remove(terminal).await?;
                }
            }
            AppAction::None => {}
        }
        Ok(())
    }

    fn open_manage(&mut self, id: Option<ExpenseId>) {
        let workflow = ManageExpense::new(self.store.clone(), self.client.clone(), id)
            .with_policy(self.config.sync_policy);
        let form = ExpenseForm::new(workflow.defaults().as_ref());
        self.state.manage = Some(ManageState {
            workflow,
            form,
            message: None,
            pending: None,
        });
    }

    fn close_manage(&mut self) {
        if let Some(mut manage) = self.state.manage.take() {
            manage.workflow.close();
        }
    }

    async fn submit(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let Some(manage) = self.state.manage.as_mut() else {
            return Ok(());
        };
        let data = match manage.form.validate() {
            Ok(data) => {
                manage.form.errors = FieldErrors::default();
                manage.message = None;
                data
            }
            Err(errors) => {
                manage.form.errors = errors;
                manage.message = Some(INVALID_INPUT.to_string());
                return Ok(());
            }
        };
        manage.pending = Some("Saving...");
        self.draw(terminal)?;

        let result = match self.state.manage.as_mut() {
            Some(manage) => manage.workflow.confirm(data).await.map(|_| ()),
            None => return Ok(()),
        };
        self.settle(result);
        Ok(())
    }

    async fn remove(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        if let Some(manage) = self.state.manage.as_mut() {
            manage.pending = Some("Deleting...");
        }
        self.draw(terminal)?;

        let result = match self.state.manage.as_mut() {
            Some(manage) => manage.workflow.remove().await,
            None => return Ok(()),
        };
        self.settle(result);
        Ok(())
    }

    fn settle(&mut self, result: std::result::Result<(), WorkflowError>) {
        match result {
            Ok(()) => self.state.manage = None,
            Err(err) => {
                tracing::warn!("manage expense failed: {err}");
                if let Some(manage) = self.state.manage.as_mut() {
                    manage.pending = None;
                }
            }
        }
    }

    async fn reload(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        self.state.loading = true;
        self.draw(terminal)?;

        match load_expenses(&self.client, &self.store).await {
            Ok(_) => self.state.load_error = None,
            Err(err) => {
                tracing::error!(base_url = %self.state.base_url, "initial fetch failed: {err}");
                self.state.load_error = Some(FETCH_FAILED.to_string());
            }
        }
        self.state.loading = false;
        Ok(())
    }
}
