//! Draw functions for the dashboard pages.

use ratatui::{prelude::*, widgets::*};

use crate::audit::MSG_NO_XRAY_CANDIDATES;
use crate::grid::{render, CellView, MSG_NO_ROWS, PLACEHOLDER};
use crate::intake::IntakePhase;
use crate::models::ApprovalStatus;
use crate::report;

use super::{colors, App, AuditInput, Page, INTAKE_FIELDS, RULE_FIELDS};

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Stats cards
            Constraint::Min(10),   // Page body
            Constraint::Length(3), // Status + footer
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    draw_stats_cards(frame, chunks[1], app);
    match app.page {
        Page::Check => draw_check_page(frame, chunks[2], app),
        Page::Audit => draw_audit_page(frame, chunks[2], app),
        Page::Rules => draw_rules_page(frame, chunks[2], app),
        Page::Reports => draw_reports_page(frame, chunks[2], app),
    }
    draw_footer(frame, chunks[3], app);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

fn status_color(status: ApprovalStatus) -> Color {
    match status {
        ApprovalStatus::Approved => colors::GREEN,
        ApprovalStatus::RequiresReview => colors::AMBER,
        ApprovalStatus::Rejected => colors::RED,
        ApprovalStatus::Unknown => colors::SLATE,
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mode = if app.demo { "DEMO" } else { "LIVE" };
    let mode_color = if app.demo { colors::AMBER } else { colors::GREEN };

    let mut spans = vec![
        Span::styled(
            " MEDGUARD ",
            Style::default().fg(colors::WHITE).bg(colors::BLUE).bold(),
        ),
        Span::raw("  "),
        Span::styled(format!("[{mode}]"), Style::default().fg(mode_color).bold()),
        Span::raw("  "),
    ];
    for (i, page) in Page::all().iter().enumerate() {
        let style = if *page == app.page {
            Style::default().fg(colors::WHITE).bold()
        } else {
            Style::default().fg(colors::SLATE)
        };
        spans.push(Span::styled(format!("F{} {} ", i + 1, page.title()), style));
        spans.push(Span::raw(" "));
    }
    if app.batch_running() {
        spans.push(Span::styled(
            "[ביקורת פעילה]",
            Style::default().fg(colors::AMBER).bold(),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::BLUE))
                .style(Style::default().bg(colors::BG_DARK)),
        );
    frame.render_widget(header, area);
}

/// Sidebar counters; `-` until the first successful poll.
fn draw_stats_cards(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let value = |f: fn(&crate::models::StatsSnapshot) -> u64| {
        app.stats
            .as_ref()
            .map(|s| f(s).to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    draw_stat_box(frame, chunks[0], "סה\"כ", &value(|s| s.total), colors::WHITE);
    draw_stat_box(
        frame,
        chunks[1],
        "7 ימים אחרונים",
        &value(|s| s.last_7_days),
        colors::BLUE,
    );
    draw_stat_box(
        frame,
        chunks[2],
        "דרוש בדיקה",
        &value(|s| s.needs_review),
        colors::AMBER,
    );
    draw_stat_box(
        frame,
        chunks[3],
        "נדחו",
        &value(|s| s.rejected),
        colors::RED,
    );
}

fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(label, Style::default().fg(colors::SLATE))),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(value_color).bold(),
        )),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

// ── Intake page ──

fn draw_check_page(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_intake_form(frame, chunks[0], app);
    draw_intake_result(frame, chunks[1], app);
}

fn draw_intake_form(frame: &mut Frame, area: Rect, app: &App) {
    let locked = app.intake.phase() == IntakePhase::Locked;
    let title = if locked {
        "פרטי פרוצדורה (נעול)"
    } else {
        "פרטי פרוצדורה"
    };
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, (label, _)) in INTAKE_FIELDS.iter().enumerate() {
        let focused = i == app.intake_focus && !locked;
        let marker = if focused { "▸ " } else { "  " };
        let value = app.intake_field_display(i);
        let value_style = if locked {
            Style::default().fg(colors::SLATE)
        } else {
            Style::default().fg(colors::WHITE)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{label}: "),
                if focused {
                    Style::default().fg(colors::BLUE).bold()
                } else {
                    Style::default().fg(colors::SLATE)
                },
            ),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::from(""));
    let xray = match app.intake.xray_url() {
        Some(url) => Line::from(vec![
            Span::styled("צילום רנטגן: ", Style::default().fg(colors::SLATE)),
            Span::styled(url.to_string(), Style::default().fg(colors::GREEN)),
        ]),
        None => Line::from(Span::styled(
            "טרם הועלה צילום רנטגן",
            Style::default().fg(colors::SLATE),
        )),
    };
    lines.push(xray);

    let phase_line = match app.intake.phase() {
        IntakePhase::Editing if app.intake.can_submit() => Line::from(Span::styled(
            "מוכן לבדיקה — Ctrl+S",
            Style::default().fg(colors::GREEN).bold(),
        )),
        IntakePhase::Editing => Line::from(Span::styled(
            "נדרשים מזהה מטופל וצילום רנטגן",
            Style::default().fg(colors::SLATE),
        )),
        IntakePhase::Uploading => Line::from(Span::styled(
            "מעלה קובץ...",
            Style::default().fg(colors::AMBER),
        )),
        IntakePhase::Analyzing => Line::from(Span::styled(
            "מנתח פרוצדורה...",
            Style::default().fg(colors::AMBER).bold(),
        )),
        IntakePhase::Locked => Line::from(Span::styled(
            "פרוצדורה נבדקה — Ctrl+R לבדיקה חדשה",
            Style::default().fg(colors::BLUE).bold(),
        )),
    };
    lines.push(Line::from(""));
    lines.push(phase_line);

    if let Some(error) = app.intake.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(colors::RED).bold(),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_intake_result(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("תוצאות ניתוח AI");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(outcome) = app.intake.result() else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "טרם בוצעה בדיקה",
                Style::default().fg(colors::SLATE),
            )))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let analysis = &outcome.evaluation.ai_analysis;
    let flag = |b: bool| if b { "כן" } else { "לא" };
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", outcome.evaluation.approval_status),
            Style::default()
                .fg(colors::WHITE)
                .bg(status_color(outcome.status))
                .bold(),
        )),
        Line::from(""),
        kv_line("רמת סיכון", &analysis.risk_level),
        kv_line("רמת ודאות", &format!("{:.0}%", analysis.confidence * 100.0)),
        kv_line("ממצאים", &analysis.findings),
        kv_line("המלצות", &analysis.recommendations),
        kv_line("הצדקה רפואית", flag(analysis.medical_justification)),
        kv_line("התוויות נגד", flag(analysis.contraindications)),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn kv_line<'a>(label: &'a str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(colors::SLATE)),
        Span::styled(value.to_string(), Style::default().fg(colors::WHITE)),
    ])
}

// ── Audit page ──

fn draw_audit_page(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(area);

    draw_filter_sidebar(frame, chunks[0], app);

    if app.detail_open {
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(9)])
            .split(chunks[1]);
        draw_procedure_table(frame, main[0], app);
        draw_row_detail(frame, main[1], app);
    } else {
        draw_procedure_table(frame, chunks[1], app);
    }
}

/// Expanded view of the selected row: the AI-analysis sub-table plus the
/// full notes text and the X-ray reference.
fn draw_row_detail(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("פירוט רשומה");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = app.table.page_rows();
    let Some(&record) = rows.get(app.audit_selected) else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "לא נבחרה רשומה",
                Style::default().fg(colors::SLATE),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    if let Some(column) = app.table.schema().column("evaluation_result") {
        match render::render_cell(record, column) {
            CellView::Analysis { status, fields } => {
                lines.push(Line::from(Span::styled(
                    format!(" {} ", status.label()),
                    Style::default()
                        .fg(colors::WHITE)
                        .bg(status_color(status))
                        .bold(),
                )));
                for (label, value) in fields {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{label}: "), Style::default().fg(colors::SLATE)),
                        Span::styled(value, Style::default().fg(colors::WHITE)),
                    ]));
                }
            }
            _ => lines.push(Line::from(Span::styled(
                "טרם בוצע ניתוח לרשומה זו",
                Style::default().fg(colors::SLATE),
            ))),
        }
    }

    if let Some(column) = app.table.schema().column("notes") {
        if let CellView::Notes(text) = render::render_cell(record, column) {
            lines.push(Line::from(vec![
                Span::styled("הערות: ", Style::default().fg(colors::SLATE)),
                Span::styled(text, Style::default().fg(colors::WHITE)),
            ]));
        }
    }

    if let Some(column) = app.table.schema().column("xray_url") {
        if let CellView::FileRef(name) = render::render_cell(record, column) {
            lines.push(Line::from(vec![
                Span::styled("צילום רנטגן: ", Style::default().fg(colors::SLATE)),
                Span::styled(name, Style::default().fg(colors::BLUE)),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_filter_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("סינון פרוצדורות");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let labels = ["מתאריך", "עד תאריך", "רופא", "קוד פרוצדורה"];
    let mut lines: Vec<Line> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let focused = app.audit_input == AuditInput::FilterField(i);
        let marker = if focused { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{label}: "),
                if focused {
                    Style::default().fg(colors::BLUE).bold()
                } else {
                    Style::default().fg(colors::SLATE)
                },
            ),
            Span::styled(
                app.filter_inputs[i].clone(),
                Style::default().fg(colors::WHITE),
            ),
        ]));
    }
    let status_focused = app.audit_input == AuditInput::FilterField(4);
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}סטטוס: ", if status_focused { "▸ " } else { "  " }),
            if status_focused {
                Style::default().fg(colors::BLUE).bold()
            } else {
                Style::default().fg(colors::SLATE)
            },
        ),
        Span::styled(
            if app.status_choice() == "all" {
                "כל הסטטוסים".to_string()
            } else {
                app.status_choice().to_string()
            },
            Style::default().fg(colors::WHITE),
        ),
    ]));

    lines.push(Line::from(""));
    let auditable = app.review.auditable_count();
    lines.push(Line::from(Span::styled(
        format!("{auditable} פרוצדורות עם צילום לביקורת"),
        Style::default().fg(if auditable > 0 {
            colors::WHITE
        } else {
            colors::SLATE
        }),
    )));
    if auditable == 0 {
        lines.push(Line::from(Span::styled(
            MSG_NO_XRAY_CANDIDATES,
            Style::default().fg(colors::SLATE),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    // Progress gauge under the filters while a batch runs.
    if let Some(progress) = app.progress {
        let gauge_area = Rect {
            x: inner.x,
            y: inner.bottom().saturating_sub(3),
            width: inner.width,
            height: 3.min(inner.height),
        };
        let gauge = Gauge::default()
            .block(panel("התקדמות ביקורת"))
            .gauge_style(Style::default().fg(colors::AMBER).bg(colors::BG_DARK))
            .percent(progress.percent())
            .label(format!(
                "{}% ({}/{})",
                progress.percent(),
                progress.current,
                progress.total
            ));
        frame.render_widget(gauge, gauge_area);
    }
}

fn cell_text(view: &CellView) -> Text<'static> {
    match view {
        CellView::DateTime { date, time } => Text::from(vec![
            Line::from(date.clone()),
            Line::from(Span::styled(
                time.clone(),
                Style::default().fg(colors::SLATE),
            )),
        ]),
        CellView::Status { label, status } => Text::from(Line::from(Span::styled(
            label.clone(),
            Style::default().fg(status_color(*status)),
        ))),
        CellView::Analysis { status, .. } => Text::from(Line::from(Span::styled(
            status.label().to_string(),
            Style::default().fg(status_color(*status)).bold(),
        ))),
        other => Text::from(render::cell_summary(other)),
    }
}

fn draw_procedure_table(frame: &mut Frame, area: Rect, app: &App) {
    let search = if app.audit_input == AuditInput::GlobalSearch {
        format!("חיפוש: {}_", app.table.global_filter())
    } else if app.table.global_filter().is_empty() {
        String::new()
    } else {
        format!("חיפוש: {}", app.table.global_filter())
    };
    let cards = app.review.cards();
    let title = format!(
        "רשימת פרוצדורות ({} / {} מאושרות {} בבדיקה {} נדחו) {}",
        cards.total, cards.approved, cards.pending, cards.rejected, search
    );
    let block = panel(&title);

    if app.table.is_empty_state() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    MSG_NO_ROWS,
                    Style::default().fg(colors::SLATE).bold(),
                )),
                Line::from(Span::styled(
                    "נסה לשנות את קריטריוני החיפוש",
                    Style::default().fg(colors::SLATE),
                )),
            ])
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let columns = app.table.visible_columns();
    let sort = app.table.sort_state();

    let header = Row::new(
        columns
            .iter()
            .map(|col| {
                let arrow = match sort {
                    Some(s) if s.key == col.key && s.descending => " ↓",
                    Some(s) if s.key == col.key => " ↑",
                    _ => "",
                };
                Cell::from(Span::styled(
                    format!("{}{arrow}", col.label),
                    Style::default().fg(colors::BLUE).bold(),
                ))
            })
            .collect::<Vec<_>>(),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = app
        .table
        .page_rows()
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let cells: Vec<Cell> = columns
                .iter()
                .map(|col| Cell::from(cell_text(&render::render_cell(record, col))))
                .collect();
            let row = Row::new(cells).height(2);
            if i == app.audit_selected {
                row.style(Style::default().bg(colors::BG_DARK))
            } else {
                row
            }
        })
        .collect();

    let widths = vec![Constraint::Min(12); columns.len()];
    let footer = format!(
        " עמוד {}/{}  {} רשומות ",
        app.table.page() + 1,
        app.table.page_count(),
        app.table.row_count()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title_bottom(Line::from(Span::styled(
            footer,
            Style::default().fg(colors::SLATE),
        ))));

    frame.render_widget(table, area);
}

// ── Rules page ──

fn draw_rules_page(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.rules.form().is_some();
    let chunks = if editing {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(area)
    };

    draw_rules_list(frame, chunks[0], app);
    if editing {
        draw_rule_form(frame, chunks[1], app);
    }
}

fn draw_rules_list(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("כללי חוקיות");

    let header = Row::new(vec![
        Cell::from(Span::styled("שם", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("פעולה", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("חומרה", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("קודים", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("פעיל", Style::default().fg(colors::BLUE).bold())),
    ])
    .bottom_margin(1);

    let rows: Vec<Row> = app
        .rules
        .rules()
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let selected = i == app.rules_selected;
            let base = if selected {
                Style::default().fg(colors::WHITE).bg(colors::BG_DARK).bold()
            } else {
                Style::default().fg(colors::WHITE)
            };
            let active = if rule.is_active {
                Span::styled("פעיל", Style::default().fg(colors::GREEN))
            } else {
                Span::styled("כבוי", Style::default().fg(colors::SLATE))
            };
            Row::new(vec![
                Cell::from(Span::styled(rule.rule_name.clone(), base)),
                Cell::from(rule.action.as_str().to_string()),
                Cell::from(rule.severity.as_str().to_string()),
                Cell::from(rule.procedure_codes.join(", ")),
                Cell::from(active),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn draw_rule_form(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.rules.form() else {
        return;
    };
    let title = if form.id.is_some() {
        "עריכת כלל חוקיות"
    } else {
        "כלל חוקיות חדש"
    };
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let values = [
        form.rule_name.clone(),
        form.condition.clone(),
        form.description.clone(),
        app.rule_code_input.clone(),
        form.action.as_str().to_string(),
        form.severity.as_str().to_string(),
        if form.is_active { "כן" } else { "לא" }.to_string(),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (i, label) in RULE_FIELDS.iter().enumerate() {
        let focused = i == app.rule_focus;
        let marker = if focused { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{label}: "),
                if focused {
                    Style::default().fg(colors::BLUE).bold()
                } else {
                    Style::default().fg(colors::SLATE)
                },
            ),
            Span::styled(values[i].clone(), Style::default().fg(colors::WHITE)),
        ]));
    }
    if !form.procedure_codes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("קודים: ", Style::default().fg(colors::SLATE)),
            Span::styled(
                form.procedure_codes.join(", "),
                Style::default().fg(colors::WHITE),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Ctrl+S שמור  Esc ביטול",
        Style::default().fg(colors::SLATE),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ── Reports page ──

fn draw_reports_page(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(area);

    let rollup = report::status_rollup(&app.report_procedures);
    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                "חלון דיווח {} עד {}  |  {} פרוצדורות",
                app.report_window.0, app.report_window.1, rollup.total
            ),
            Style::default().fg(colors::WHITE),
        )),
        Line::from(vec![
            Span::styled(
                format!(
                    "מאושרות {} ({}%)  ",
                    rollup.approved,
                    rollup.percent(rollup.approved)
                ),
                Style::default().fg(colors::GREEN),
            ),
            Span::styled(
                format!(
                    "בבדיקה {} ({}%)  ",
                    rollup.pending,
                    rollup.percent(rollup.pending)
                ),
                Style::default().fg(colors::AMBER),
            ),
            Span::styled(
                format!(
                    "נדחו {} ({}%)",
                    rollup.rejected,
                    rollup.percent(rollup.rejected)
                ),
                Style::default().fg(colors::RED),
            ),
        ]),
    ])
    .block(panel("התפלגות פרוצדורות"));
    frame.render_widget(summary, chunks[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_doctor_panel(frame, bottom[0], app);
    draw_trends_panel(frame, bottom[1], app);
}

fn draw_doctor_panel(frame: &mut Frame, area: Rect, app: &App) {
    let doctors = report::doctor_performance(&app.report_procedures);
    let block = panel("ביצועי רופאים מובילים");

    if doctors.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "אין נתונים להצגה",
                Style::default().fg(colors::SLATE),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from(Span::styled("רופא", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("סה\"כ", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("מאושרות", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("נדחו", Style::default().fg(colors::BLUE).bold())),
        Cell::from(Span::styled("% אישור", Style::default().fg(colors::BLUE).bold())),
    ])
    .bottom_margin(1);

    let rows: Vec<Row> = doctors
        .iter()
        .map(|d| {
            let rate_color = if d.approval_rate >= 90 {
                colors::GREEN
            } else if d.approval_rate >= 75 {
                colors::AMBER
            } else {
                colors::RED
            };
            Row::new(vec![
                Cell::from(d.name.clone()),
                Cell::from(d.total.to_string()),
                Cell::from(Span::styled(
                    d.approved.to_string(),
                    Style::default().fg(colors::GREEN),
                )),
                Cell::from(Span::styled(
                    d.rejected.to_string(),
                    Style::default().fg(colors::RED),
                )),
                Cell::from(Span::styled(
                    format!("{}%", d.approval_rate),
                    Style::default().fg(rate_color).bold(),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn draw_trends_panel(frame: &mut Frame, area: Rect, app: &App) {
    let buckets = report::monthly_trends(&app.report_procedures);
    let block = panel("מגמות חודשיות");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if buckets.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "אין נתונים להצגה",
                Style::default().fg(colors::SLATE),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let max = buckets.iter().map(|b| b.total).max().unwrap_or(1).max(1);
    let bar_width = (inner.width as usize).saturating_sub(24).max(8);

    let lines: Vec<Line> = buckets
        .iter()
        .map(|b| {
            let filled = b.total * bar_width / max;
            Line::from(vec![
                Span::styled(
                    format!("{} ", b.month),
                    Style::default().fg(colors::SLATE),
                ),
                Span::styled(
                    "█".repeat(filled.max(1)),
                    Style::default().fg(colors::BLUE),
                ),
                Span::styled(
                    format!(
                        " {} ({} מאושרות, {} בבדיקה, {} נדחו)",
                        b.total, b.approved, b.pending, b.rejected
                    ),
                    Style::default().fg(colors::WHITE),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

// ── Footer ──

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let keys = match app.page {
        Page::Check => "Tab שדה הבא  Ctrl+U העלאת צילום  Ctrl+S בדיקה  Ctrl+R איפוס",
        Page::Audit => match app.audit_input {
            AuditInput::Browse => {
                "f סינון  / חיפוש  ↑/↓ בחירה  Enter פירוט  w הורדה  a ביקורת  c ביטול  r רענון  s/d/e מיון  n/p עמוד  1-9 עמודות  x ניקוי  q יציאה"
            }
            AuditInput::GlobalSearch => "הקלד לחיפוש  Enter/Esc סיום",
            AuditInput::FilterField(_) => "Tab שדה הבא  ←/→ סטטוס  Enter החלה  Esc ביטול",
        },
        Page::Rules => {
            if app.rules.form().is_some() {
                "Tab שדה הבא  ←/→ ערך  Ctrl+S שמור  Esc ביטול"
            } else {
                "↑/↓ בחירה  n חדש  e עריכה  t הפעלה/כיבוי  r רענון  q יציאה"
            }
        }
        Page::Reports => "e ייצוא CSV  r רענון  q יציאה",
    };

    let mut lines = Vec::new();
    if let Some(ref status) = app.status_line {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(colors::AMBER).bold(),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        keys,
        Style::default().fg(colors::SLATE),
    )));

    let footer = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(colors::BLUE))
            .style(Style::default().bg(colors::BG_DARK)),
    );
    frame.render_widget(footer, area);
}
