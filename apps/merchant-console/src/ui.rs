//! UI rendering for the merchant console.

use crate::app::{App, DetailTab, PendingDelete, View};
use crate::config::DisplayConfig;
use crate::models::{Merchant, MerchantStatus};
use crate::wizard::{Wizard, WizardStep};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_table::format::{format_currency, format_date_time, format_relative_time, initials};

/// Draw the application.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Content
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);

    match app.view {
        View::Merchants => {
            f.render_stateful_widget(&app.merchants, chunks[1], &mut app.merchants_state)
        }
        View::Review => f.render_stateful_widget(&app.review, chunks[1], &mut app.review_state),
        View::Detail => draw_detail(f, app, chunks[1]),
        View::Wizard => draw_wizard(f, app, chunks[1]),
    }

    draw_status(f, app, chunks[2]);

    if let Some(pending) = &app.confirm_delete {
        draw_confirm_delete(f, pending);
    }

    if app.show_help {
        draw_help(f);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles = vec![
        format!("1:Merchants ({})", app.merchants.data().len()),
        format!("2:Review ({})", app.review.data().len()),
    ];

    let selected = match app.list_view {
        View::Review => 1,
        _ => 0,
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Merchant Console "))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn badge_color(name: &str) -> Color {
    name.parse().unwrap_or(Color::Gray)
}

fn field_line<'a>(label: &'a str, value: impl Into<String>) -> Line<'a> {
    let value = value.into();
    let value = if value.is_empty() { "-".to_string() } else { value };
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(merchant) = app.detail.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let header = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", initials(&merchant.business_name)),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::styled(
                merchant.business_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                merchant.status.label(),
                Style::default().fg(badge_color(merchant.status.color())),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "#{} · {} · {} · {}",
                merchant.id, merchant.category, merchant.country, merchant.email
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let header = Paragraph::new(header).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let tabs = Tabs::new(DetailTab::ALL.iter().map(|t| t.label()).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL))
        .select(app.detail_tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[1]);

    let lines = match app.detail_tab {
        DetailTab::Overview => overview_lines(merchant, &app.config.display),
        DetailTab::Business => business_lines(merchant),
        DetailTab::Banking => banking_lines(merchant),
        DetailTab::Activity => activity_lines(merchant, &app.config.display),
    };

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.detail_tab.label())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(body, chunks[2]);
}

/// Relative or absolute, per the display settings.
fn timestamp(at: &DateTime<Utc>, now: &DateTime<Utc>, display: &DisplayConfig) -> String {
    if display.relative_dates {
        format_relative_time(at, now)
    } else {
        format_date_time(at)
    }
}

fn overview_lines<'a>(merchant: &'a Merchant, display: &DisplayConfig) -> Vec<Line<'a>> {
    let now = Utc::now();
    vec![
        Line::from(vec![
            Span::styled(format!("{:<18}", "Status"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                merchant.status.label(),
                Style::default().fg(badge_color(merchant.status.color())),
            ),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<18}", "KYC"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                merchant.kyc.label(),
                Style::default().fg(badge_color(merchant.kyc.color())),
            ),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<18}", "Risk"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                merchant.risk.label(),
                Style::default().fg(badge_color(merchant.risk.color())),
            ),
        ]),
        Line::from(""),
        field_line(
            "Volume (30d)",
            format_currency(
                merchant.monthly_volume,
                display.currency_or_default(&merchant.currency),
            ),
        ),
        field_line("Transactions", merchant.transaction_count.to_string()),
        Line::from(""),
        field_line("Created", format_date_time(&merchant.created_at)),
        field_line("Updated", timestamp(&merchant.updated_at, &now, display)),
        Line::from(""),
        field_line(
            "Actions",
            merchant
                .status
                .transitions()
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ]
}

fn business_lines(merchant: &Merchant) -> Vec<Line<'_>> {
    vec![
        field_line("Business name", merchant.business_name.clone()),
        field_line("Legal name", merchant.legal_name.clone()),
        field_line("Category", merchant.category.clone()),
        field_line("Website", merchant.website.clone()),
        Line::from(""),
        field_line("Email", merchant.email.clone()),
        field_line("Phone", merchant.phone.clone()),
        field_line("Country", merchant.country.clone()),
        field_line("Currency", merchant.currency.clone()),
        Line::from(""),
        field_line("Notes", merchant.notes.clone()),
    ]
}

fn banking_lines(merchant: &Merchant) -> Vec<Line<'_>> {
    vec![
        field_line("Bank", merchant.bank.bank_name.clone()),
        field_line("Account name", merchant.bank.account_name.clone()),
        field_line("Account number", merchant.bank.masked_account()),
        field_line("Routing code", merchant.bank.routing_code.clone()),
    ]
}

fn activity_lines<'a>(merchant: &'a Merchant, display: &DisplayConfig) -> Vec<Line<'a>> {
    if merchant.activity.is_empty() {
        return vec![Line::from(Span::styled(
            "No activity recorded",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let now = Utc::now();
    merchant
        .activity
        .iter()
        .rev()
        .map(|event| {
            Line::from(vec![
                Span::styled(
                    format!("{:<20}", timestamp(&event.at, &now, display)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(event.message.as_str()),
            ])
        })
        .collect()
}

fn draw_wizard(f: &mut Frame, app: &App, area: Rect) {
    let Some(wizard) = app.wizard.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let steps: Vec<String> = WizardStep::ALL
        .iter()
        .map(|s| format!("{}. {}", s.index() + 1, s.label()))
        .collect();
    let tabs = Tabs::new(steps)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", wizard.title())),
        )
        .select(wizard.step.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let lines = if wizard.step == WizardStep::Review {
        review_lines(wizard)
    } else {
        form_lines(wizard)
    };

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", wizard.step.label())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(form, chunks[1]);
}

fn form_lines(wizard: &Wizard) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    for (i, field) in wizard.fields().iter().enumerate() {
        let focused = i == wizard.focused;
        let marker = if wizard.is_required(*field) { " *" } else { "" };
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let mut value = wizard.value(*field).to_string();
        if focused {
            value.push('_');
        }

        lines.push(Line::from(vec![
            Span::styled(format!("{:<24}", format!("{}{}", field.label(), marker)), label_style),
            Span::styled(value, Style::default().fg(Color::White)),
        ]));

        if let Some(error) = wizard.error(*field) {
            lines.push(Line::from(Span::styled(
                format!("{:<24}{}", "", error),
                Style::default().fg(Color::Red),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab/Enter: Next field  PgDn: Next step  PgUp: Back  Esc: Cancel",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn review_lines(wizard: &Wizard) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    for step in WizardStep::ALL.iter().filter(|s| !s.fields().is_empty()) {
        lines.push(section(step.label()));
        for field in step.fields() {
            lines.push(field_line(field.label(), wizard.value(*field).trim()));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(": Submit  "),
        Span::styled("Backspace", Style::default().fg(Color::Yellow)),
        Span::raw(": Back  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(": Cancel"),
    ]));
    lines
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let context = match app.view {
        View::Merchants => MerchantStatus::ALL
            .iter()
            .filter_map(|status| {
                let count = app.merchants.data().iter().filter(|m| m.status == *status).count();
                (count > 0).then(|| format!("{} {}", status.label(), count))
            })
            .collect::<Vec<_>>()
            .join(" · "),
        View::Review => format!("{} awaiting review", app.review.data().len()),
        View::Detail => app
            .detail
            .as_ref()
            .map(|m| format!("{} · {}", m.business_name, m.status))
            .unwrap_or_default(),
        View::Wizard => app
            .wizard
            .as_ref()
            .map(|w| format!("{} · step {} of 4", w.title(), w.step.index() + 1))
            .unwrap_or_default(),
    };

    let left = Paragraph::new(context).block(Block::default().borders(Borders::ALL));
    f.render_widget(left, chunks[0]);

    let (text, style) = match &app.message {
        Some(message) => (message.clone(), Style::default().fg(Color::Yellow)),
        None => {
            let hint = match app.view {
                View::Merchants | View::Review => "? for help | q to quit",
                View::Detail => "Tab:Switch tab  e:Edit  Esc:Back  ?:Help",
                View::Wizard => "Esc to cancel",
            };
            (hint.to_string(), Style::default().fg(Color::DarkGray))
        }
    };

    let right = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(right, chunks[1]);
}

fn draw_confirm_delete(f: &mut Frame, pending: &PendingDelete) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(format!("Delete {}?", pending.name)),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(": Delete   "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(": Cancel"),
        ]),
    ];

    let dialog = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Delete merchant "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(dialog, area);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Merchant Console Keybindings", bold)),
        Line::from(""),
        Line::from(Span::styled("Views:", bold)),
        Line::from("  1 / 2           Merchants / Review queue"),
        Line::from("  n               New merchant"),
        Line::from(""),
        Line::from(Span::styled("Table:", bold)),
        Line::from("  j/k, Up/Down    Move cursor"),
        Line::from("  Left/Right      Previous/next page"),
        Line::from("  + / -           Page size"),
        Line::from("  /               Search"),
        Line::from("  f               Filters"),
        Line::from("  s               Cycle sort order"),
        Line::from("  < / >  o        Focus column, sort by it"),
        Line::from("  h H p [ ] { }   Hide, show all, pin, move, resize"),
        Line::from("  Space / A       Select row / page"),
        Line::from("  Enter           Open merchant"),
        Line::from("  m               Row actions"),
        Line::from("  d               Delete merchant"),
        Line::from("  Esc             Clear search, then filters"),
        Line::from(""),
        Line::from(Span::styled("Merchant:", bold)),
        Line::from("  Tab/Left/Right  Switch tab"),
        Line::from("  e               Edit"),
        Line::from("  a / r / s       Approve or activate / reject / suspend"),
        Line::from("  Esc             Back to list"),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });

    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
