//! Terminal dashboard shell.
//!
//! One synchronous draw loop over four pages: procedure intake, retroactive
//! audit, rule management and reports. Background work (the stats poller, a
//! running audit batch) reports in over channels drained once per tick, so
//! drawing never blocks on the network.

pub mod views;

use std::io::stdout;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;

use crate::api::ComplianceApi;
use crate::audit::{
    AuditBatchHandle, AuditEvent, AuditProgress, AuditReview, MSG_NO_XRAY_CANDIDATES,
};
use crate::config;
use crate::grid::{rows_from_procedures, TableModel, TableSchema};
use crate::intake::{IntakeField, IntakeFlow};
use crate::models::enums::{LABEL_APPROVED, LABEL_REJECTED, LABEL_REQUIRES_REVIEW};
use crate::models::{Procedure, ProcedureFilter, StatsSnapshot, StatusFilter};
use crate::poller::StatsPollerHandle;
use crate::report;
use crate::rules::RuleManager;

/// Palette lifted from the clinic web theme's badge colors.
pub(crate) mod colors {
    use ratatui::style::Color;

    pub const BLUE: Color = Color::Rgb(37, 99, 235);
    pub const GREEN: Color = Color::Rgb(22, 163, 74);
    pub const AMBER: Color = Color::Rgb(217, 119, 6);
    pub const RED: Color = Color::Rgb(220, 38, 38);
    pub const SLATE: Color = Color::Rgb(148, 163, 184);
    pub const WHITE: Color = Color::Rgb(248, 250, 252);
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42);
    pub const BG_PANEL: Color = Color::Rgb(30, 41, 59);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Check,
    Audit,
    Rules,
    Reports,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Check => "בדיקת פרוצדורה",
            Page::Audit => "ביקורת רטרואקטיבית",
            Page::Rules => "ניהול חוקיות",
            Page::Reports => "דוחות ותובנות",
        }
    }

    pub fn all() -> [Page; 4] {
        [Page::Check, Page::Audit, Page::Rules, Page::Reports]
    }
}

/// What keystrokes currently edit on the audit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuditInput {
    Browse,
    GlobalSearch,
    /// Editing one of the sidebar dimensions (0 from, 1 to, 2 doctor, 3 code).
    FilterField(usize),
}

/// Intake form focus order; the last slot is the X-ray path input.
pub(crate) const INTAKE_FIELDS: [(&str, Option<IntakeField>); 7] = [
    ("תעודת זהות מטופל", Some(IntakeField::PatientId)),
    ("קוד פרוצדורה", Some(IntakeField::ProcedureCode)),
    ("שם פרוצדורה", Some(IntakeField::ProcedureName)),
    ("שם רופא", Some(IntakeField::DoctorName)),
    ("תאריך ביצוע", Some(IntakeField::ExecutionDate)),
    ("הערות", Some(IntakeField::Notes)),
    ("נתיב קובץ רנטגן", None),
];

/// Rule form focus order.
pub(crate) const RULE_FIELDS: [&str; 7] = [
    "שם הכלל",
    "תנאי הכלל",
    "תיאור נוסף",
    "קוד פרוצדורה (Enter להוספה)",
    "פעולה",
    "חומרה",
    "פעיל",
];

const STATUS_CHOICES: [&str; 4] = ["all", LABEL_APPROVED, LABEL_REQUIRES_REVIEW, LABEL_REJECTED];

pub struct App {
    api: Arc<dyn ComplianceApi>,
    pub(crate) demo: bool,
    pub(crate) page: Page,
    pub(crate) should_quit: bool,
    pub(crate) status_line: Option<String>,

    // Live stats
    pub(crate) stats: Option<StatsSnapshot>,
    stats_rx: mpsc::Receiver<StatsSnapshot>,
    _poller: StatsPollerHandle,

    // Intake
    pub(crate) intake: IntakeFlow,
    pub(crate) intake_focus: usize,
    pub(crate) xray_path: String,

    // Audit review
    pub(crate) review: AuditReview,
    pub(crate) table: TableModel,
    pub(crate) audit_input: AuditInput,
    pub(crate) filter_inputs: [String; 4],
    pub(crate) filter_status_idx: usize,
    pub(crate) audit_selected: usize,
    pub(crate) detail_open: bool,
    batch: Option<AuditBatchHandle>,
    pub(crate) progress: Option<AuditProgress>,

    // Rules
    pub(crate) rules: RuleManager,
    pub(crate) rules_selected: usize,
    pub(crate) rule_focus: usize,
    pub(crate) rule_code_input: String,

    // Reports
    pub(crate) report_window: (String, String),
    pub(crate) report_procedures: Vec<Procedure>,
}

impl App {
    pub fn new(api: Arc<dyn ComplianceApi>, demo: bool) -> Self {
        let (stats_tx, stats_rx) = mpsc::channel();
        let poller = crate::poller::start(
            api.clone(),
            config::STATS_POLL_INTERVAL,
            move |snapshot| {
                let _ = stats_tx.send(snapshot);
            },
        );

        let mut app = Self {
            api,
            demo,
            page: Page::Check,
            should_quit: false,
            status_line: None,
            stats: None,
            stats_rx,
            _poller: poller,
            intake: IntakeFlow::new(),
            intake_focus: 0,
            xray_path: String::new(),
            review: AuditReview::new(),
            table: TableModel::new(TableSchema::procedures(), Vec::new()),
            audit_input: AuditInput::Browse,
            filter_inputs: Default::default(),
            filter_status_idx: 0,
            audit_selected: 0,
            detail_open: false,
            batch: None,
            progress: None,
            rules: RuleManager::new(),
            rules_selected: 0,
            rule_focus: 0,
            rule_code_input: String::new(),
            report_window: report::default_window(),
            report_procedures: Vec::new(),
        };
        app.reload_procedures();
        app.reload_rules();
        app
    }

    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.drain_background();
            let app = &*self;
            terminal.draw(|frame| views::draw(frame, app))?;

            if event::poll(Duration::from_millis(150))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Pull in everything the background workers produced since last tick.
    fn drain_background(&mut self) {
        while let Ok(snapshot) = self.stats_rx.try_recv() {
            self.stats = Some(snapshot);
        }

        let mut batch_done = false;
        if let Some(ref batch) = self.batch {
            for event in batch.poll_events() {
                match event {
                    AuditEvent::Started { total } => {
                        self.progress = Some(AuditProgress { current: 0, total });
                    }
                    AuditEvent::Progress(p) => self.progress = Some(p),
                    AuditEvent::ItemFailed { procedure_id, error } => {
                        tracing::warn!(procedure_id, error, "Audit item failed");
                    }
                    AuditEvent::Completed(summary) => {
                        self.status_line = Some(format!(
                            "הביקורת הסתיימה: {} הצליחו, {} נכשלו",
                            summary.succeeded, summary.failed
                        ));
                        batch_done = true;
                    }
                    AuditEvent::Cancelled(summary) => {
                        self.status_line = Some(format!(
                            "הביקורת בוטלה לאחר {} מתוך {}",
                            summary.processed, summary.total
                        ));
                        batch_done = true;
                    }
                }
            }
            if batch.is_finished() && self.progress.is_none() {
                batch_done = true;
            }
        }
        if batch_done {
            self.batch = None;
            self.progress = None;
            // Reflect server-side note updates.
            self.reload_procedures();
        }
    }

    // ── Data loading ──

    fn reload_procedures(&mut self) {
        match self.review.load(self.api.as_ref()) {
            Ok(()) => self.refresh_table(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load procedures");
                self.status_line = Some(format!("שגיאה בטעינת פרוצדורות: {e}"));
            }
        }
        self.report_procedures = report::window(
            self.review.procedures(),
            &self.report_window.0,
            &self.report_window.1,
        );
    }

    fn reload_rules(&mut self) {
        if let Err(e) = self.rules.load(self.api.as_ref()) {
            tracing::warn!(error = %e, "Failed to load rules");
            self.status_line = Some(format!("שגיאה בטעינת חוקים: {e}"));
        }
    }

    fn refresh_table(&mut self) {
        self.table.set_rows(rows_from_procedures(&self.review.filtered()));
        self.audit_selected = 0;
    }

    fn apply_filters(&mut self) {
        let field = |s: &String| ProcedureFilter::field_from_input(s);
        let status = match STATUS_CHOICES[self.filter_status_idx] {
            "all" => StatusFilter::All,
            label => StatusFilter::Label(label.to_string()),
        };
        self.review.set_filter(ProcedureFilter {
            date_from: field(&self.filter_inputs[0]),
            date_to: field(&self.filter_inputs[1]),
            doctor_name: field(&self.filter_inputs[2]),
            procedure_code: field(&self.filter_inputs[3]),
            status,
        });
        self.refresh_table();
    }

    pub(crate) fn status_choice(&self) -> &'static str {
        STATUS_CHOICES[self.filter_status_idx]
    }

    pub(crate) fn batch_running(&self) -> bool {
        self.batch.is_some()
    }

    // ── Key handling ──

    fn handle_key(&mut self, key: KeyEvent) {
        // Page switching and quit work everywhere.
        match key.code {
            KeyCode::F(1) => return self.switch_page(Page::Check),
            KeyCode::F(2) => return self.switch_page(Page::Audit),
            KeyCode::F(3) => return self.switch_page(Page::Rules),
            KeyCode::F(4) => return self.switch_page(Page::Reports),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        match self.page {
            Page::Check => self.handle_check_key(key),
            Page::Audit => self.handle_audit_key(key),
            Page::Rules => self.handle_rules_key(key),
            Page::Reports => self.handle_reports_key(key),
        }
    }

    fn switch_page(&mut self, page: Page) {
        self.page = page;
        self.status_line = None;
        self.audit_input = AuditInput::Browse;
    }

    fn handle_check_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => {
                self.intake_focus = (self.intake_focus + 1) % INTAKE_FIELDS.len();
            }
            KeyCode::BackTab => {
                self.intake_focus =
                    (self.intake_focus + INTAKE_FIELDS.len() - 1) % INTAKE_FIELDS.len();
            }
            KeyCode::Char('s') if ctrl => self.submit_intake(),
            KeyCode::Char('u') if ctrl => self.upload_xray(),
            KeyCode::Char('r') if ctrl => {
                self.intake.reset();
                self.xray_path.clear();
                self.status_line = None;
            }
            KeyCode::Char(c) if !ctrl => self.intake_type(c),
            KeyCode::Backspace => self.intake_backspace(),
            _ => {}
        }
    }

    /// What the form draws for a field slot.
    pub(crate) fn intake_field_display(&self, index: usize) -> String {
        self.intake_field_value(index)
    }

    fn intake_field_value(&self, index: usize) -> String {
        match INTAKE_FIELDS[index].1 {
            Some(IntakeField::PatientId) => self.intake.form().patient_id.clone(),
            Some(IntakeField::ProcedureCode) => self.intake.form().procedure_code.clone(),
            Some(IntakeField::ProcedureName) => self.intake.form().procedure_name.clone(),
            Some(IntakeField::DoctorName) => self.intake.form().doctor_name.clone(),
            Some(IntakeField::ExecutionDate) => self.intake.form().execution_date.clone(),
            Some(IntakeField::Notes) => self.intake.form().notes.clone(),
            None => self.xray_path.clone(),
        }
    }

    fn intake_type(&mut self, c: char) {
        let index = self.intake_focus;
        match INTAKE_FIELDS[index].1 {
            Some(field) => {
                let mut value = self.intake_field_value(index);
                value.push(c);
                if self.intake.set_field(field, &value).is_err() {
                    self.status_line = Some("הטופס נעול — אפס כדי להתחיל בדיקה חדשה".to_string());
                }
            }
            None => self.xray_path.push(c),
        }
    }

    fn intake_backspace(&mut self) {
        let index = self.intake_focus;
        match INTAKE_FIELDS[index].1 {
            Some(field) => {
                let mut value = self.intake_field_value(index);
                value.pop();
                let _ = self.intake.set_field(field, &value);
            }
            None => {
                self.xray_path.pop();
            }
        }
    }

    fn upload_xray(&mut self) {
        let path = self.xray_path.trim().to_string();
        if path.is_empty() {
            self.status_line = Some("הזן נתיב לקובץ צילום רנטגן".to_string());
            return;
        }
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if self.demo => {
                tracing::debug!(error = %e, "Demo mode: uploading placeholder bytes");
                vec![0u8; 16]
            }
            Err(e) => {
                self.status_line = Some(format!("לא ניתן לקרוא את הקובץ: {e}"));
                return;
            }
        };

        match self.intake.upload(self.api.as_ref(), &file_name, bytes) {
            Ok(()) => self.status_line = Some(format!("הצילום הועלה: {file_name}")),
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed");
                self.status_line = self.intake.error().map(str::to_string);
            }
        }
    }

    fn submit_intake(&mut self) {
        match self.intake.submit(self.api.as_ref()) {
            Ok(outcome) => {
                self.status_line = Some(format!(
                    "הפרוצדורה נבדקה: {}",
                    outcome.status.label()
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intake submit failed");
                self.status_line = self.intake.error().map(str::to_string);
            }
        }
    }

    fn handle_audit_key(&mut self, key: KeyEvent) {
        match self.audit_input {
            AuditInput::GlobalSearch => match key.code {
                KeyCode::Esc | KeyCode::Enter => self.audit_input = AuditInput::Browse,
                KeyCode::Backspace => {
                    let mut needle = self.table.global_filter().to_string();
                    needle.pop();
                    self.table.set_global_filter(&needle);
                }
                KeyCode::Char(c) => {
                    let needle = format!("{}{c}", self.table.global_filter());
                    self.table.set_global_filter(&needle);
                }
                _ => {}
            },
            AuditInput::FilterField(index) => match key.code {
                KeyCode::Esc => self.audit_input = AuditInput::Browse,
                KeyCode::Enter => {
                    self.apply_filters();
                    self.audit_input = AuditInput::Browse;
                }
                KeyCode::Tab => {
                    self.audit_input = AuditInput::FilterField((index + 1) % 5);
                }
                KeyCode::Left if index == 4 => {
                    self.filter_status_idx =
                        (self.filter_status_idx + STATUS_CHOICES.len() - 1) % STATUS_CHOICES.len();
                }
                KeyCode::Right if index == 4 => {
                    self.filter_status_idx = (self.filter_status_idx + 1) % STATUS_CHOICES.len();
                }
                KeyCode::Backspace if index < 4 => {
                    self.filter_inputs[index].pop();
                }
                KeyCode::Char(c) if index < 4 => {
                    self.filter_inputs[index].push(c);
                }
                _ => {}
            },
            AuditInput::Browse => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('/') => self.audit_input = AuditInput::GlobalSearch,
                KeyCode::Char('f') => self.audit_input = AuditInput::FilterField(0),
                KeyCode::Char('x') => {
                    self.filter_inputs = Default::default();
                    self.filter_status_idx = 0;
                    self.table.set_global_filter("");
                    self.review.clear_filter();
                    self.refresh_table();
                }
                KeyCode::Char('r') => self.reload_procedures(),
                KeyCode::Char('a') => self.start_batch(),
                KeyCode::Char('c') => {
                    if let Some(ref batch) = self.batch {
                        batch.cancel();
                        self.status_line = Some("מבטל לאחר הפריט הנוכחי...".to_string());
                    }
                }
                KeyCode::Char('s') => self.table.toggle_sort("evaluation_result"),
                KeyCode::Char('d') => self.table.toggle_sort("created_at"),
                KeyCode::Char('e') => self.table.toggle_sort("execution_date"),
                KeyCode::Up => self.audit_selected = self.audit_selected.saturating_sub(1),
                KeyCode::Down => {
                    if self.audit_selected + 1 < self.table.page_rows().len() {
                        self.audit_selected += 1;
                    }
                }
                KeyCode::Enter => self.detail_open = !self.detail_open,
                KeyCode::Char('w') => self.download_selected_xray(),
                KeyCode::Left | KeyCode::Char('n') => {
                    self.table.next_page();
                    self.audit_selected = 0;
                }
                KeyCode::Right | KeyCode::Char('p') => {
                    self.table.prev_page();
                    self.audit_selected = 0;
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let index = (c as usize) - ('1' as usize);
                    let key = self
                        .table
                        .schema()
                        .columns
                        .get(index)
                        .map(|col| col.key.clone());
                    if let Some(key) = key {
                        self.table.toggle_column(&key);
                    }
                }
                _ => {}
            },
        }
    }

    /// Save the selected record's X-ray into the exports directory.
    fn download_selected_xray(&mut self) {
        let name = self
            .table
            .page_rows()
            .get(self.audit_selected)
            .and_then(|r| r.get("xray_url"))
            .and_then(|v| v.as_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let Some(name) = name else {
            self.status_line = Some("לרשומה שנבחרה אין צילום רנטגן".to_string());
            return;
        };

        match self.api.download_image(&name) {
            Ok(bytes) => {
                let dir = config::exports_dir();
                let written = std::fs::create_dir_all(&dir).and_then(|()| {
                    let path = dir.join(&name);
                    std::fs::write(&path, &bytes).map(|()| path)
                });
                match written {
                    Ok(path) => {
                        self.status_line = Some(format!("הצילום נשמר אל {}", path.display()));
                    }
                    Err(e) => self.status_line = Some(format!("שגיאה בשמירת הקובץ: {e}")),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, name, "X-ray download failed");
                self.status_line = Some(format!("שגיאה בהורדת הצילום: {e}"));
            }
        }
    }

    fn start_batch(&mut self) {
        if self.batch.is_some() {
            self.status_line = Some("ביקורת כבר רצה".to_string());
            return;
        }
        match self.review.start_batch(self.api.clone()) {
            Ok(handle) => {
                self.progress = Some(AuditProgress {
                    current: 0,
                    total: self.review.auditable_count(),
                });
                self.batch = Some(handle);
                self.status_line = None;
            }
            Err(_) => {
                self.status_line = Some(MSG_NO_XRAY_CANDIDATES.to_string());
            }
        }
    }

    fn handle_rules_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.rules.form().is_some() {
            match key.code {
                KeyCode::Esc => self.rules.cancel(),
                KeyCode::Tab => self.rule_focus = (self.rule_focus + 1) % RULE_FIELDS.len(),
                KeyCode::BackTab => {
                    self.rule_focus = (self.rule_focus + RULE_FIELDS.len() - 1) % RULE_FIELDS.len();
                }
                KeyCode::Char('s') if ctrl => match self.rules.save(self.api.as_ref()) {
                    Ok(()) => self.status_line = Some("הכלל נשמר".to_string()),
                    Err(e) => {
                        tracing::warn!(error = %e, "Rule save failed");
                        self.status_line = Some(crate::rules::MSG_RULE_FIELDS_REQUIRED.to_string());
                    }
                },
                KeyCode::Enter if self.rule_focus == 3 => {
                    let code = self.rule_code_input.clone();
                    if let Some(form) = self.rules.form_mut() {
                        form.add_code(&code);
                    }
                    self.rule_code_input.clear();
                }
                KeyCode::Left | KeyCode::Right if self.rule_focus == 4 => {
                    if let Some(form) = self.rules.form_mut() {
                        let all = crate::models::RuleAction::all();
                        let at = all.iter().position(|a| *a == form.action).unwrap_or(0);
                        form.action = all[(at + 1) % all.len()];
                    }
                }
                KeyCode::Left | KeyCode::Right if self.rule_focus == 5 => {
                    if let Some(form) = self.rules.form_mut() {
                        let all = crate::models::RuleSeverity::all();
                        let at = all.iter().position(|s| *s == form.severity).unwrap_or(0);
                        form.severity = all[(at + 1) % all.len()];
                    }
                }
                KeyCode::Char(' ') if self.rule_focus == 6 => {
                    if let Some(form) = self.rules.form_mut() {
                        form.is_active = !form.is_active;
                    }
                }
                KeyCode::Backspace => self.rule_form_backspace(),
                KeyCode::Char(c) if !ctrl => self.rule_form_type(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.rules_selected = self.rules_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.rules_selected + 1 < self.rules.rules().len() {
                    self.rules_selected += 1;
                }
            }
            KeyCode::Char('r') => self.reload_rules(),
            KeyCode::Char('n') => {
                self.rules.begin_create();
                self.rule_focus = 0;
                self.rule_code_input.clear();
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let id = self
                    .rules
                    .rules()
                    .get(self.rules_selected)
                    .map(|r| r.id.clone());
                if let Some(id) = id {
                    let _ = self.rules.begin_edit(&id);
                    self.rule_focus = 0;
                    self.rule_code_input.clear();
                }
            }
            KeyCode::Char('t') => {
                let id = self
                    .rules
                    .rules()
                    .get(self.rules_selected)
                    .map(|r| r.id.clone());
                if let Some(id) = id {
                    if let Err(e) = self.rules.toggle(self.api.as_ref(), &id) {
                        tracing::warn!(error = %e, "Rule toggle failed");
                        self.status_line = Some(format!("שגיאה בעדכון הכלל: {e}"));
                    }
                }
            }
            _ => {}
        }
    }

    fn rule_form_type(&mut self, c: char) {
        let focus = self.rule_focus;
        if focus == 3 {
            self.rule_code_input.push(c);
            return;
        }
        if let Some(form) = self.rules.form_mut() {
            match focus {
                0 => form.rule_name.push(c),
                1 => form.condition.push(c),
                2 => form.description.push(c),
                _ => {}
            }
        }
    }

    fn rule_form_backspace(&mut self) {
        let focus = self.rule_focus;
        if focus == 3 {
            self.rule_code_input.pop();
            return;
        }
        if let Some(form) = self.rules.form_mut() {
            match focus {
                0 => {
                    form.rule_name.pop();
                }
                1 => {
                    form.condition.pop();
                }
                2 => {
                    form.description.pop();
                }
                _ => {}
            }
        }
    }

    fn handle_reports_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.reload_procedures(),
            KeyCode::Char('e') => {
                match report::csv::export_to_default(&self.report_procedures) {
                    Ok(path) => {
                        self.status_line = Some(format!("הדוח יוצא אל {}", path.display()));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "CSV export failed");
                        self.status_line = Some(format!("שגיאה בייצוא הדוח: {e}"));
                    }
                }
            }
            _ => {}
        }
    }
}
